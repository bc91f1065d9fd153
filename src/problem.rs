//! Problem descriptor: the bundle of six callbacks that parameterize a search

use std::sync::Arc;

use anyhow::Result as AnyResult;

use crate::{CemError, Log, SearchOptions};

/// Produces the initial parameters. Called once per search, before step 1.
pub trait InitFn<P, O>: Fn(&SearchOptions<O>) -> AnyResult<P> + Send + Sync {}

impl<T, P, O> InitFn<P, O> for T where T: Fn(&SearchOptions<O>) -> AnyResult<P> + Send + Sync {}

/// Samples one instance from the parameters. All randomness must come from
/// the RNG handed in, which the engine owns and seeds.
pub trait DrawFn<P, I>: Fn(&P, &mut dyn rand::Rng) -> AnyResult<I> + Send + Sync {}

impl<T, P, I> DrawFn<P, I> for T where
    T: Fn(&P, &mut dyn rand::Rng) -> AnyResult<I> + Send + Sync
{
}

/// Scores one instance. Must be a pure function of the instance.
pub trait ScoreFn<I>: Fn(&I) -> AnyResult<f64> + Send + Sync {}

impl<T, I> ScoreFn<I> for T where T: Fn(&I) -> AnyResult<f64> + Send + Sync {}

/// Refits parameters to the elite instances. The previous parameters are
/// deliberately not supplied.
pub trait UpdateFn<P, I>: Fn(&[I]) -> AnyResult<P> + Send + Sync {}

impl<T, P, I> UpdateFn<P, I> for T where T: Fn(&[I]) -> AnyResult<P> + Send + Sync {}

/// Blends refitted parameters (first argument) with the previous ones
/// (second argument). The third argument is `f_interp`, the weight of the
/// *previous* value: 0 keeps the refitted parameters, 1 keeps the previous.
pub trait SmoothFn<P>: Fn(P, &P, f64) -> AnyResult<P> + Send + Sync {}

impl<T, P> SmoothFn<P> for T where T: Fn(P, &P, f64) -> AnyResult<P> + Send + Sync {}

/// Termination predicate, consulted after every step with the log most
/// recent entry first. Return `true` to stop the search.
pub trait TerminateFn<P, I, O>:
    Fn(&Log<P, I>, &SearchOptions<O>) -> AnyResult<bool> + Send + Sync
{
}

impl<T, P, I, O> TerminateFn<P, I, O> for T where
    T: Fn(&Log<P, I>, &SearchOptions<O>) -> AnyResult<bool> + Send + Sync
{
}

/// A problem to optimize: six callbacks over an opaque parameter type `P`
/// and an opaque instance type `I`.
///
/// The engine never inspects or constructs values of `P` and `I`; it only
/// passes them between the callbacks. Problems are cheap to clone and the
/// `with_*` methods return a new problem with exactly one callback replaced,
/// leaving the original untouched.
pub struct Problem<P, I, O = ()> {
    pub(crate) init: Arc<dyn InitFn<P, O>>,
    pub(crate) draw: Arc<dyn DrawFn<P, I>>,
    pub(crate) score: Arc<dyn ScoreFn<I>>,
    pub(crate) update: Arc<dyn UpdateFn<P, I>>,
    pub(crate) smooth: Arc<dyn SmoothFn<P>>,
    pub(crate) terminate: Arc<dyn TerminateFn<P, I, O>>,
}

impl<P, I, O> std::fmt::Debug for Problem<P, I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Problem").finish_non_exhaustive()
    }
}

impl<P, I, O> Clone for Problem<P, I, O> {
    fn clone(&self) -> Self {
        Self {
            init: Arc::clone(&self.init),
            draw: Arc::clone(&self.draw),
            score: Arc::clone(&self.score),
            update: Arc::clone(&self.update),
            smooth: Arc::clone(&self.smooth),
            terminate: Arc::clone(&self.terminate),
        }
    }
}

impl<P, I, O> Problem<P, I, O> {
    /// Start building a problem. All six callbacks are required.
    pub fn builder() -> ProblemBuilder<P, I, O> {
        ProblemBuilder::new()
    }

    /// Replace the `init` callback.
    pub fn with_init<F: InitFn<P, O> + 'static>(&self, f: F) -> Self {
        let mut p = self.clone();
        p.init = Arc::new(f);
        p
    }

    /// Replace the `draw` callback.
    pub fn with_draw<F: DrawFn<P, I> + 'static>(&self, f: F) -> Self {
        let mut p = self.clone();
        p.draw = Arc::new(f);
        p
    }

    /// Replace the `score` callback.
    pub fn with_score<F: ScoreFn<I> + 'static>(&self, f: F) -> Self {
        let mut p = self.clone();
        p.score = Arc::new(f);
        p
    }

    /// Replace the `update` callback.
    pub fn with_update<F: UpdateFn<P, I> + 'static>(&self, f: F) -> Self {
        let mut p = self.clone();
        p.update = Arc::new(f);
        p
    }

    /// Replace the `smooth` callback.
    pub fn with_smooth<F: SmoothFn<P> + 'static>(&self, f: F) -> Self {
        let mut p = self.clone();
        p.smooth = Arc::new(f);
        p
    }

    /// Replace the `terminate` callback.
    pub fn with_terminate<F: TerminateFn<P, I, O> + 'static>(&self, f: F) -> Self {
        let mut p = self.clone();
        p.terminate = Arc::new(f);
        p
    }
}

impl<P: Clone, I: Clone, O> Problem<P, I, O> {
    /// Run a search with these options. See [`crate::search`].
    pub fn search(
        &self,
        options: SearchOptions<O>,
    ) -> Result<crate::SearchResult<P, I>, CemError> {
        crate::search(self, options)
    }

    /// Run a search, invoking `callback` after every completed step.
    /// See [`crate::search_with`].
    pub fn search_with<F>(
        &self,
        options: SearchOptions<O>,
        callback: Option<&F>,
    ) -> Result<crate::SearchResult<P, I>, CemError>
    where
        F: crate::ProgressFn<P, I>,
    {
        crate::search_with(self, options, callback)
    }
}

/// Builder of a [`Problem`]. Each callback has one setter; `build` fails
/// with [`CemError::MissingCallback`] if any is absent.
pub struct ProblemBuilder<P, I, O = ()> {
    init: Option<Arc<dyn InitFn<P, O>>>,
    draw: Option<Arc<dyn DrawFn<P, I>>>,
    score: Option<Arc<dyn ScoreFn<I>>>,
    update: Option<Arc<dyn UpdateFn<P, I>>>,
    smooth: Option<Arc<dyn SmoothFn<P>>>,
    terminate: Option<Arc<dyn TerminateFn<P, I, O>>>,
}

impl<P, I, O> Default for ProblemBuilder<P, I, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, I, O> ProblemBuilder<P, I, O> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            init: None,
            draw: None,
            score: None,
            update: None,
            smooth: None,
            terminate: None,
        }
    }

    /// Set the `init` callback.
    pub fn init<F: InitFn<P, O> + 'static>(mut self, f: F) -> Self {
        self.init = Some(Arc::new(f));
        self
    }

    /// Set the `draw` callback.
    pub fn draw<F: DrawFn<P, I> + 'static>(mut self, f: F) -> Self {
        self.draw = Some(Arc::new(f));
        self
    }

    /// Set the `score` callback.
    pub fn score<F: ScoreFn<I> + 'static>(mut self, f: F) -> Self {
        self.score = Some(Arc::new(f));
        self
    }

    /// Set the `update` callback.
    pub fn update<F: UpdateFn<P, I> + 'static>(mut self, f: F) -> Self {
        self.update = Some(Arc::new(f));
        self
    }

    /// Set the `smooth` callback.
    pub fn smooth<F: SmoothFn<P> + 'static>(mut self, f: F) -> Self {
        self.smooth = Some(Arc::new(f));
        self
    }

    /// Set the `terminate` callback.
    pub fn terminate<F: TerminateFn<P, I, O> + 'static>(mut self, f: F) -> Self {
        self.terminate = Some(Arc::new(f));
        self
    }

    /// Assemble the problem, failing if any callback is missing.
    pub fn build(self) -> Result<Problem<P, I, O>, CemError> {
        Ok(Problem {
            init: self.init.ok_or(CemError::MissingCallback("init"))?,
            draw: self.draw.ok_or(CemError::MissingCallback("draw"))?,
            score: self.score.ok_or(CemError::MissingCallback("score"))?,
            update: self.update.ok_or(CemError::MissingCallback("update"))?,
            smooth: self.smooth.ok_or(CemError::MissingCallback("smooth"))?,
            terminate: self
                .terminate
                .ok_or(CemError::MissingCallback("terminate"))?,
        })
    }
}
