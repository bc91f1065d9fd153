use std::collections::HashSet;

use rand::{distr::weighted::WeightedIndex, prelude::Distribution};

use crate::{Log, Mode, Problem, SearchOptions, StopReason, utils::lerp};

type Tour = Vec<usize>;
type TransMatrix = Vec<Vec<f64>>;

/// Cities on a ring; travelling between `i` and `j` costs the shorter arc.
/// The optimal tour walks the ring for a total cost of `n`.
fn ring_cost(n: usize, i: usize, j: usize) -> f64 {
    let d = i.abs_diff(j);
    d.min(n - d) as f64
}

fn tour_cost(n: usize, tour: &[usize]) -> f64 {
    (0..tour.len())
        .map(|k| ring_cost(n, tour[k], tour[(k + 1) % tour.len()]))
        .sum()
}

/// TSP over a row-stochastic transition matrix. Tours are drawn by
/// sequential sampling without replacement along the rows; refitting takes
/// the per-entry mean of the elite tours' transition matrices.
fn tsp_problem(n_nodes: usize) -> Problem<TransMatrix, Tour> {
    Problem::builder()
        .init(move |_opts: &SearchOptions| {
            let p = 1.0 / (n_nodes - 1) as f64;
            let mut rows = vec![vec![p; n_nodes]; n_nodes];
            for (i, row) in rows.iter_mut().enumerate() {
                row[i] = 0.0;
            }
            Ok(rows)
        })
        .draw(|matrix: &TransMatrix, rng: &mut dyn rand::Rng| {
            let n = matrix.len();
            let mut visited = vec![false; n];
            let mut tour = Vec::with_capacity(n);
            visited[0] = true;
            tour.push(0);
            let mut current = 0;
            for _ in 1..n {
                // zero out visited cities, keep the rest strictly positive
                let weights: Vec<f64> = (0..n)
                    .map(|j| {
                        if visited[j] {
                            0.0
                        } else {
                            matrix[current][j].max(1e-12)
                        }
                    })
                    .collect();
                let next = WeightedIndex::new(&weights)?.sample(rng);
                visited[next] = true;
                tour.push(next);
                current = next;
            }
            Ok(tour)
        })
        .score(move |tour: &Tour| Ok(tour_cost(n_nodes, tour)))
        .update(|elites: &[Tour]| {
            let n = elites[0].len();
            let mut matrix = vec![vec![0.0; n]; n];
            for tour in elites {
                for k in 0..n {
                    matrix[tour[k]][tour[(k + 1) % n]] += 1.0;
                }
            }
            let n_elite = elites.len() as f64;
            for row in &mut matrix {
                for v in row {
                    *v /= n_elite;
                }
            }
            Ok(matrix)
        })
        .smooth(|new: TransMatrix, prev: &TransMatrix, f_interp: f64| {
            Ok(new
                .iter()
                .zip(prev)
                .map(|(nr, pr)| nr.iter().zip(pr).map(|(&a, &b)| lerp(a, b, f_interp)).collect())
                .collect())
        })
        .terminate(|_log: &Log<TransMatrix, Tour>, _opts: &SearchOptions| Ok(false))
        .build()
        .unwrap()
}

#[test]
fn test_ring_tour_cost_drops() {
    let n_nodes = 10;
    let problem = tsp_problem(n_nodes);
    let options = SearchOptions {
        mode: Mode::Min,
        n_step_max: 10,
        seed: Some(5),
        ..SearchOptions::default()
    };

    let result = problem.search(options).unwrap();

    assert!(matches!(result.reason, StopReason::StepCapReached));
    let best = result.best.unwrap();

    // a valid tour visits every city exactly once
    assert_eq!(best.instance.len(), n_nodes);
    let distinct: HashSet<usize> = best.instance.iter().copied().collect();
    assert_eq!(distinct.len(), n_nodes);

    // the optimum walks the ring at cost n; ten steps get close to it
    assert!(best.score >= n_nodes as f64);
    assert!(best.score < 15.0, "best tour cost {}", best.score);
}

#[test]
fn test_elite_threshold_improves_in_min_mode() {
    let problem = tsp_problem(10);
    let options = SearchOptions {
        mode: Mode::Min,
        n_step_max: 10,
        seed: Some(5),
        ..SearchOptions::default()
    };

    let result = problem.search(options).unwrap();

    // head-first log: the elite inclusion threshold at the end should beat
    // the one of the first step
    let first = result.log.get(result.n_steps - 1).unwrap();
    let last = result.log.latest().unwrap();
    assert!(last.elite_score <= first.elite_score);
}
