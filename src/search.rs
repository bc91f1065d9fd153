//! The CEM step engine and search driver

use std::cmp::Reverse;

use ordered_float::NotNan;
use rand::{RngExt as _, SeedableRng as _, rngs::StdRng};

use crate::{
    Callback, CemError, Instant, Log, LogEntry, Mode, Problem, ProgressFn, Scored, SearchOptions,
};

/// Why a search stopped.
#[derive(Debug)]
pub enum StopReason {
    /// The termination predicate returned `true`.
    Converged,
    /// `n_step_max` steps completed without the predicate firing.
    StepCapReached,
    /// The wall-clock limit was hit at a step boundary.
    TimeLimitReached,
    /// A callback failed mid-run. The log up to the failed step is kept.
    Failed(CemError),
}

impl StopReason {
    /// `true` if the search ended because a callback failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::Failed(_))
    }
}

/// Terminal state of a search.
#[derive(Debug)]
pub struct SearchResult<P, I> {
    /// Parameters after the last completed step (the initial parameters if
    /// the search failed before completing any step)
    pub params: P,
    /// Best scored instance observed across all steps, with respect to
    /// `mode`. `None` only when no step completed.
    pub best: Option<Scored<I>>,
    /// Number of completed steps
    pub n_steps: usize,
    /// Why the search stopped
    pub reason: StopReason,
    /// The RNG seed the search ran with
    pub seed: u64,
    /// Full per-step log, most recent entry first
    pub log: Log<P, I>,
}

/// Run a search without a progress callback. See [`search_with`].
pub fn search<P, I, O>(
    problem: &Problem<P, I, O>,
    options: SearchOptions<O>,
) -> Result<SearchResult<P, I>, CemError>
where
    P: Clone,
    I: Clone,
{
    search_with(problem, options, None::<&fn(&LogEntry<P, I>)>)
}

/// Run a search to termination.
///
/// The options are validated first; an invalid option or a failing `init`
/// aborts before any step and is returned as `Err`. From step 1 onward a
/// failing callback stops the search but still yields an `Ok` result whose
/// `reason` carries the error and whose log holds every step completed
/// before the failure.
pub fn search_with<P, I, O, F>(
    problem: &Problem<P, I, O>,
    options: SearchOptions<O>,
    callback: Option<&F>,
) -> Result<SearchResult<P, I>, CemError>
where
    P: Clone,
    I: Clone,
    F: ProgressFn<P, I>,
{
    options.validate()?;

    let seed = options.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    let start_time = Instant::now();

    let init = problem.init.as_ref();
    let terminate = problem.terminate.as_ref();

    let initial_params =
        init(&options).map_err(|e| CemError::callback_failed(Callback::Init, 0, e))?;

    let mut log = Log::new();
    let mut best: Option<Scored<I>> = None;
    let mut reason = None;

    for step in 1..=options.n_step_max {
        if let Some(limit) = options.time_limit {
            let duration = Instant::now().duration_since(start_time);
            if duration > limit {
                reason = Some(StopReason::TimeLimitReached);
                break;
            }
        }

        let params_prev = log.latest().map_or(&initial_params, |e| &e.params);
        let entry = match run_step(problem, &options, params_prev, step, &mut rng) {
            Ok(entry) => entry,
            Err(e) => {
                reason = Some(StopReason::Failed(e));
                break;
            }
        };

        let step_best = &entry.best;
        let improved = best
            .as_ref()
            .is_none_or(|b| options.mode.improves(step_best.score, b.score));
        if improved {
            best = Some(step_best.clone());
        }

        log.push(entry);
        if let Some(cb) = callback {
            if let Some(latest) = log.latest() {
                cb(latest);
            }
        }

        match terminate(&log, &options) {
            Ok(true) => {
                reason = Some(StopReason::Converged);
                break;
            }
            Ok(false) => {}
            Err(e) => {
                reason = Some(StopReason::Failed(CemError::callback_failed(
                    Callback::Terminate,
                    step,
                    e,
                )));
                break;
            }
        }
    }

    let reason = reason.unwrap_or(StopReason::StepCapReached);
    let n_steps = log.len();
    let params = log.latest().map_or(initial_params, |e| e.params.clone());

    Ok(SearchResult {
        params,
        best,
        n_steps,
        reason,
        seed,
        log,
    })
}

/// One CEM iteration: sample, score, select elites, fit, smooth.
fn run_step<P, I, O>(
    problem: &Problem<P, I, O>,
    options: &SearchOptions<O>,
    params_prev: &P,
    step: usize,
    rng: &mut StdRng,
) -> Result<LogEntry<P, I>, CemError>
where
    I: Clone,
{
    let draw = problem.draw.as_ref();
    let score_fn = problem.score.as_ref();
    let update = problem.update.as_ref();
    let smooth = problem.smooth.as_ref();

    let mut sample: Vec<(I, NotNan<f64>)> = Vec::with_capacity(options.n_sample);
    for _ in 0..options.n_sample {
        let instance = draw(params_prev, rng)
            .map_err(|e| CemError::callback_failed(Callback::Draw, step, e))?;
        let score = score_fn(&instance)
            .map_err(|e| CemError::callback_failed(Callback::Score, step, e))?;
        let score = NotNan::new(score).map_err(|_| CemError::Degenerate {
            step,
            detail: "score is NaN".to_string(),
        })?;
        sample.push((instance, score));
    }

    // Stable sort: equal scores keep their generation order, so runs with
    // the same seed select the same elites.
    match options.mode {
        Mode::Max => sample.sort_by_key(|&(_, score)| Reverse(score)),
        Mode::Min => sample.sort_by_key(|&(_, score)| score),
    }

    let n_elite = options.n_elite();
    let elite_score = sample[n_elite - 1].1.into_inner();
    let best = Scored {
        instance: sample[0].0.clone(),
        score: sample[0].1.into_inner(),
    };

    let elites: Vec<I> = sample
        .into_iter()
        .take(n_elite)
        .map(|(instance, _)| instance)
        .collect();

    let fitted =
        update(&elites).map_err(|e| CemError::callback_failed(Callback::Update, step, e))?;
    let params = smooth(fitted, params_prev, options.f_interp)
        .map_err(|e| CemError::callback_failed(Callback::Smooth, step, e))?;

    Ok(LogEntry {
        step,
        params,
        elite_score,
        best,
    })
}
