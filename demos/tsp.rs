use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{distr::weighted::WeightedIndex, prelude::Distribution};

use cem::{LogEntry, Mode, Problem, SearchOptions, utils};

type Tour = Vec<usize>;
type TransMatrix = Vec<Vec<f64>>;

/// Cities on a ring: the cost of an edge is the shorter arc between the two
/// cities, so the optimal tour walks the ring at total cost `n`.
fn ring_cost(n: usize, i: usize, j: usize) -> f64 {
    let d = i.abs_diff(j);
    d.min(n - d) as f64
}

fn tour_cost(n: usize, tour: &[usize]) -> f64 {
    (0..tour.len())
        .map(|k| ring_cost(n, tour[k], tour[(k + 1) % tour.len()]))
        .sum()
}

fn tsp_problem(n_nodes: usize) -> Result<Problem<TransMatrix, Tour>> {
    let problem = Problem::builder()
        .init(move |_opts: &SearchOptions| {
            // uniform row-stochastic matrix with zero diagonal
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
                .map(|(nr, pr)| {
                    nr.iter()
                        .zip(pr)
                        .map(|(&a, &b)| utils::lerp(a, b, f_interp))
                        .collect()
                })
                .collect())
        })
        .terminate(|_log, _opts| Ok(false))
        .build()?;
    Ok(problem)
}

fn create_pbar(n_step: u64) -> ProgressBar {
    let pb = ProgressBar::new(n_step);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg} ",
        )
        .unwrap()
        .progress_chars("#>-"),
    );
    pb
}

fn main() -> Result<()> {
    let args = std::env::args().collect::<Vec<_>>();
    let n_nodes: usize = args.get(1).map_or(Ok(20), |s| s.parse())?;
    let n_step_max = 50;

    let problem = tsp_problem(n_nodes)?;
    let pb = create_pbar(n_step_max as u64);
    let callback = |entry: &LogEntry<TransMatrix, Tour>| {
        pb.set_position(entry.step as u64);
        pb.set_message(format!(
            "best {:.0} / threshold {:.0}",
            entry.best.score, entry.elite_score
        ));
    };

    let result = problem.search_with(
        SearchOptions {
            mode: Mode::Min,
            n_step_max,
            ..SearchOptions::default()
        },
        Some(&callback),
    )?;
    pb.finish();

    let best = result.best.expect("at least one step completed");
    println!(
        "{:?} after {} steps (seed {}): cost {:.0} (optimum {}), tour {:?}",
        result.reason, result.n_steps, result.seed, best.score, n_nodes, best.instance
    );
    Ok(())
}
