//! Occupied-height distribution of a layer, used for diagnostics and the `stats` command.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::layer::{LayerError, TileGrid};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeightStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    /// Occupied height -> number of columns with that height, ascending by height.
    pub distribution: BTreeMap<usize, usize>,
}

impl HeightStats {
    pub fn from_grid(grid: &TileGrid) -> Result<Self, LayerError> {
        Self::from_heights(&grid.occupied_heights())
    }

    pub fn from_heights(heights: &[usize]) -> Result<Self, LayerError> {
        let (Some(&min), Some(&max)) = (heights.iter().min(), heights.iter().max()) else {
            return Err(LayerError::InvalidArgument(
                "height statistics need at least one column".to_string(),
            ));
        };
        let mut distribution = BTreeMap::new();
        for &height in heights {
            *distribution.entry(height).or_insert(0usize) += 1;
        }
        let mean = heights.iter().sum::<usize>() as f64 / heights.len() as f64;
        Ok(Self {
            min,
            max,
            mean,
            distribution,
        })
    }

    pub fn log_report(&self) {
        log::info!("column height distribution:");
        for (height, count) in &self.distribution {
            log::info!("  height {height}: {count} column(s)");
        }
        log::info!(
            "  min: {}, max: {}, mean: {:.1}",
            self.min,
            self.max,
            self.mean
        );
    }
}
