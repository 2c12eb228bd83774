//! Layer fitness: how many neighbouring column pairs a player can traverse.

use crate::layer::TileGrid;

/// Largest occupied-height difference between neighbours that still counts as traversable.
pub const FITNESS_TOLERANCE: usize = 2;

/// Number of adjacent column pairs whose occupied heights differ by at most
/// [FITNESS_TOLERANCE]. Ranges over `0..=max_fitness(grid)`.
pub fn calculate_fitness(grid: &TileGrid) -> usize {
    fitness_of_heights(&grid.occupied_heights())
}

pub fn fitness_of_heights(heights: &[usize]) -> usize {
    heights
        .windows(2)
        .filter(|pair| pair[0].abs_diff(pair[1]) <= FITNESS_TOLERANCE)
        .count()
}

/// Score of a layout where every neighbour pair is traversable.
pub fn max_fitness(grid: &TileGrid) -> usize {
    grid.width().saturating_sub(1)
}

/// Fitness as a percentage of the optimum. A single-column layer is reported as 100%.
pub fn fitness_percent(fitness: usize, max: usize) -> f64 {
    if max == 0 {
        100.0
    } else {
        100.0 * fitness as f64 / max as f64
    }
}
