//! Greedy local search over column order using the adjacent-swap neighbourhood.
//!
//! Each iteration swaps one random neighbour pair and keeps the swap only when fitness
//! strictly improves; ties and regressions are undone. The search stops early once every
//! neighbour pair is traversable. There are no restarts, so it can stall in a local optimum
//! and exhaust its budget.

use std::time::Instant;

use rand::Rng;
use serde::Serialize;

use crate::layer::TileGrid;
use crate::optimizer::fitness::{fitness_of_heights, fitness_percent, max_fitness};

/// Iteration budget used when none (or an unparsable one) is supplied.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;
/// A no-improvement progress line is logged every this many iterations.
const PROGRESS_INTERVAL: usize = 100;

#[derive(Debug, Clone, Copy)]
pub struct HillClimbConfig {
    pub max_iterations: usize,
    /// Checked between iterations; reaching it ends the search with [SearchStatus::DeadlineReached].
    pub deadline: Option<Instant>,
}

impl Default for HillClimbConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            deadline: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// Every adjacent pair is within tolerance.
    Converged,
    /// The iteration budget ran out first.
    Exhausted,
    DeadlineReached,
}

#[derive(Debug, Clone, Serialize)]
pub struct HillClimbOutcome {
    pub initial_fitness: usize,
    pub final_fitness: usize,
    pub max_fitness: usize,
    /// Accepted swaps.
    pub improvements: usize,
    /// Neighbours proposed before stopping.
    pub iterations: usize,
    pub status: SearchStatus,
}

impl HillClimbOutcome {
    pub fn percent(&self) -> f64 {
        fitness_percent(self.final_fitness, self.max_fitness)
    }
}

pub fn hill_climb<R: Rng + ?Sized>(
    grid: &mut TileGrid,
    config: &HillClimbConfig,
    rng: &mut R,
) -> HillClimbOutcome {
    hill_climb_with_progress(grid, config, rng, |_, _| {})
}

/// Like [hill_climb] but invokes `on_iteration(iteration, current_fitness)` after every
/// accept/reject decision.
pub fn hill_climb_with_progress<R, F>(
    grid: &mut TileGrid,
    config: &HillClimbConfig,
    rng: &mut R,
    mut on_iteration: F,
) -> HillClimbOutcome
where
    R: Rng + ?Sized,
    F: FnMut(usize, usize),
{
    let optimum = max_fitness(grid);
    // Per-column occupied heights, kept in the same order as `grid.columns()`.
    let mut heights = grid.occupied_heights();
    let initial_fitness = fitness_of_heights(&heights);
    let mut current = initial_fitness;
    log::info!(
        "initial fitness: {current}/{optimum} ({:.1}%)",
        fitness_percent(current, optimum)
    );

    let mut improvements = 0usize;
    let mut iterations = 0usize;
    let mut last_improvement: Option<usize> = None;
    let mut status = if current == optimum {
        SearchStatus::Converged
    } else {
        SearchStatus::Exhausted
    };

    if status != SearchStatus::Converged {
        for iteration in 0..config.max_iterations {
            if config
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
            {
                status = SearchStatus::DeadlineReached;
                break;
            }

            // current < optimum here, so width >= 2 and the range is non-empty.
            let swap_index = rng.gen_range(0..grid.width() - 1);
            grid.swap_columns(swap_index, swap_index + 1);
            heights.swap(swap_index, swap_index + 1);
            iterations += 1;

            let neighbor = fitness_of_heights(&heights);
            if neighbor > current {
                current = neighbor;
                improvements += 1;
                last_improvement = Some(iteration);
                log::info!(
                    "iteration {}: improvement found, fitness {current}/{optimum} ({:.1}%)",
                    iteration + 1,
                    fitness_percent(current, optimum)
                );
            } else {
                grid.swap_columns(swap_index, swap_index + 1);
                heights.swap(swap_index, swap_index + 1);
            }
            on_iteration(iteration, current);

            if (iteration + 1) % PROGRESS_INTERVAL == 0 && last_improvement != Some(iteration) {
                log::debug!(
                    "iteration {}: no improvement (current fitness {current}/{optimum})",
                    iteration + 1
                );
            }

            if current == optimum {
                log::info!("optimal fitness reached at iteration {}", iteration + 1);
                status = SearchStatus::Converged;
                break;
            }
        }
    }

    let outcome = HillClimbOutcome {
        initial_fitness,
        final_fitness: current,
        max_fitness: optimum,
        improvements,
        iterations,
        status,
    };
    log::info!(
        "hill climbing finished ({:?}): {} improvement(s), fitness {}/{} ({:.1}%)",
        outcome.status,
        outcome.improvements,
        outcome.final_fitness,
        outcome.max_fitness,
        outcome.percent()
    );
    outcome
}
