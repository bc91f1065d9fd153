use cem::{
    Log, Problem, SearchOptions, StopReason,
    utils::{draw_bernoulli, lerp},
};

// OneMax over independent Bernoulli probabilities, large enough that the
// default options stall before reaching the optimum.
fn onemax_problem(n_bits: usize) -> Problem<Vec<f64>, Vec<bool>> {
    Problem::builder()
        .init(move |_opts: &SearchOptions| Ok(vec![0.5; n_bits]))
        .draw(|probs: &Vec<f64>, rng: &mut dyn rand::Rng| {
            let mut bits = Vec::with_capacity(probs.len());
            for &p in probs {
                bits.push(draw_bernoulli(p, rng));
            }
            Ok(bits)
        })
        .score(|bits: &Vec<bool>| Ok(bits.iter().filter(|&&b| b).count() as f64))
        .update(|elites: &[Vec<bool>]| {
            let n = elites.len() as f64;
            let mut probs = vec![0.0; elites[0].len()];
            for bits in elites {
                for (i, &b) in bits.iter().enumerate() {
                    if b {
                        probs[i] += 1.0;
                    }
                }
            }
            for p in &mut probs {
                *p /= n;
            }
            Ok(probs)
        })
        .smooth(|new: Vec<f64>, prev: &Vec<f64>, f_interp: f64| {
            Ok(new
                .iter()
                .zip(prev)
                .map(|(&a, &b)| lerp(a, b, f_interp))
                .collect())
        })
        .terminate(move |log: &Log<Vec<f64>, Vec<bool>>, _opts: &SearchOptions| {
            Ok(log.latest().is_some_and(|e| e.best.score >= n_bits as f64))
        })
        .build()
        .unwrap()
}

#[test]
fn test_large_instance_needs_large_samples() {
    let problem = onemax_problem(1000);

    // with the default sample size the probabilities freeze prematurely
    let premature = problem
        .search(SearchOptions {
            seed: Some(1),
            ..SearchOptions::default()
        })
        .unwrap();
    assert!(matches!(premature.reason, StopReason::StepCapReached));
    let premature_best = premature.best.unwrap().score;
    assert!(premature_best < 1000.0);

    // a larger sample and lighter smoothing get close to the optimum
    let heavy = problem
        .search(SearchOptions {
            n_sample: 1000,
            f_interp: 0.05,
            seed: Some(1),
            ..SearchOptions::default()
        })
        .unwrap();
    let heavy_best = heavy.best.unwrap().score;
    assert!(heavy_best > premature_best);
    assert!(heavy_best >= 950.0, "best only reached {heavy_best}");
}
