use std::fmt;

use thiserror::Error;

/// Identifies which of the six problem callbacks an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    /// `init`, producing the initial parameters
    Init,
    /// `draw`, sampling one instance from the parameters
    Draw,
    /// `score`, evaluating one instance
    Score,
    /// `update`, refitting parameters to the elite instances
    Update,
    /// `smooth`, blending refitted and previous parameters
    Smooth,
    /// `terminate`, the termination predicate
    Terminate,
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Callback::Init => "init",
            Callback::Draw => "draw",
            Callback::Score => "score",
            Callback::Update => "update",
            Callback::Smooth => "smooth",
            Callback::Terminate => "terminate",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while building a problem or running a search.
#[derive(Error, Debug)]
pub enum CemError {
    /// A required callback was not supplied to the problem builder.
    #[error("missing callback `{0}`")]
    MissingCallback(&'static str),
    /// A search option failed validation.
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption {
        /// Name of the offending option
        name: &'static str,
        /// Why the supplied value was rejected
        reason: String,
    },
    /// A problem callback returned an error. `step` is 0 for `init`,
    /// which runs before the first step.
    #[error("callback `{callback}` failed at step {step}")]
    CallbackFailed {
        /// The callback that failed
        callback: Callback,
        /// The step at which it failed
        step: usize,
        /// The underlying error reported by the callback
        #[source]
        source: anyhow::Error,
    },
    /// The sample could not be fit, e.g. a score came out NaN.
    #[error("degenerate sample at step {step}: {detail}")]
    Degenerate {
        /// The step at which the degeneracy was detected
        step: usize,
        /// What was degenerate about the sample
        detail: String,
    },
}

impl CemError {
    pub(crate) fn callback_failed(callback: Callback, step: usize, source: anyhow::Error) -> Self {
        Self::CallbackFailed {
            callback,
            step,
            source,
        }
    }
}
