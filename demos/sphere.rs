use anyhow::Result;

use cem::{LogEntry, Problem, SearchOptions, utils};

#[derive(Debug, Clone, PartialEq)]
struct Gaussian {
    mean: f64,
    std: f64,
}

fn main() -> Result<()> {
    let problem: Problem<Gaussian, f64> = Problem::builder()
        .init(|_opts| {
            Ok(Gaussian {
                mean: 0.0,
                std: 30.0,
            })
        })
        .draw(|p: &Gaussian, rng: &mut dyn rand::Rng| Ok(utils::draw_normal(p.mean, p.std, rng)))
        .score(|&x: &f64| Ok(if x.abs() <= 1.0 { 1.0 - x * x } else { 0.0 }))
        .update(|elites: &[f64]| {
            let mean = utils::mean(elites);
            Ok(Gaussian {
                mean,
                std: utils::std_dev(elites, mean),
            })
        })
        .smooth(|new: Gaussian, prev: &Gaussian, f_interp: f64| {
            Ok(Gaussian {
                mean: utils::lerp(new.mean, prev.mean, f_interp),
                std: utils::lerp(new.std, prev.std, f_interp),
            })
        })
        .terminate(|log, _opts| Ok(log.latest().is_some_and(|e| e.params.std < 1e-3)))
        .build()?;

    let report = |entry: &LogEntry<Gaussian, f64>| {
        println!(
            "step {:3}: best {:.6} at x={:+.6}, elite threshold {:.6}, mean {:+.4}, std {:.4}",
            entry.step,
            entry.best.score,
            entry.best.instance,
            entry.elite_score,
            entry.params.mean,
            entry.params.std,
        );
    };

    let result = problem.search_with(
        SearchOptions {
            seed: Some(1),
            ..SearchOptions::default()
        },
        Some(&report),
    )?;

    let best = result.best.expect("at least one step completed");
    println!(
        "{:?} after {} steps (seed {}): best score {:.6} at x={:+.6}",
        result.reason, result.n_steps, result.seed, best.score, best.instance
    );
    Ok(())
}
