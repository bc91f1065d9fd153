//! Per-step progress observer

use crate::LogEntry;

/// Callback invoked once after every completed step with the log entry the
/// step produced. Purely observational; use the problem's termination
/// predicate to stop a search early.
pub trait ProgressFn<P, I>: Fn(&LogEntry<P, I>) {}

impl<T: Fn(&LogEntry<P, I>), P, I> ProgressFn<P, I> for T {}
