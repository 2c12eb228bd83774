//! Column scrambling: the plain random layout and the deliberately poor starting point
//! handed to the hill climber.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::layer::{HeightStats, LayerError, TileGrid};
use crate::optimizer::fitness::{calculate_fitness, max_fitness};

/// Replaces the column order with a uniform random permutation (Fisher-Yates).
pub fn shuffle_columns<R: Rng + ?Sized>(grid: &mut TileGrid, rng: &mut R) {
    grid.columns_mut().shuffle(rng);
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrambleReport {
    /// Cross-midpoint swaps applied after the full shuffle: `width / 4`.
    pub forced_swaps: usize,
    pub fitness: usize,
    pub max_fitness: usize,
    pub heights: HeightStats,
}

/// Shuffles the columns, then swaps `width / 4` randomly chosen pairs straddling the midpoint,
/// one index from `[0, width / 2)` and one from `[width / 2, width)`.
pub fn create_adversarial_configuration<R: Rng + ?Sized>(
    grid: &mut TileGrid,
    rng: &mut R,
) -> Result<ScrambleReport, LayerError> {
    shuffle_columns(grid, rng);

    let width = grid.width();
    let half = width / 2;
    let forced_swaps = width / 4;
    for _ in 0..forced_swaps {
        let left = rng.gen_range(0..half);
        let right = rng.gen_range(half..width);
        grid.swap_columns(left, right);
    }

    let heights = HeightStats::from_grid(grid)?;
    let report = ScrambleReport {
        forced_swaps,
        fitness: calculate_fitness(grid),
        max_fitness: max_fitness(grid),
        heights,
    };
    report.heights.log_report();
    log::info!(
        "fitness after adversarial scramble: {}/{}",
        report.fitness,
        report.max_fitness
    );
    Ok(report)
}
