//! File-level runs: load a map, optimize every layer, and write the target only when every
//! layer succeeded.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::layer::{HeightStats, LayerError, TileGrid};
use crate::optimizer::fitness::{calculate_fitness, max_fitness};
use crate::optimizer::{optimize_layers, LayerReport, LayerRunError, RunConfig};
use crate::parallel::WorkerPool;
use crate::tmx::{TmxDocument, TmxError};

#[derive(Debug)]
pub enum ConversionError {
    Tmx(TmxError),
    Layer(LayerRunError),
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tmx(err) => write!(f, "{err}"),
            Self::Layer(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ConversionError {}

impl From<TmxError> for ConversionError {
    fn from(err: TmxError) -> Self {
        Self::Tmx(err)
    }
}

impl From<LayerRunError> for ConversionError {
    fn from(err: LayerRunError) -> Self {
        Self::Layer(err)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub source: String,
    pub target: String,
    pub layers: Vec<LayerReport>,
}

pub fn convert_file(
    source: &Path,
    target: &Path,
    config: &RunConfig,
    pool: &WorkerPool,
) -> Result<ConversionReport, ConversionError> {
    let doc = TmxDocument::load(source)?;
    let inputs = doc.layer_inputs()?;
    log::info!(
        "{}: {}x{} map, {} layer(s), mode {:?}",
        source.display(),
        doc.width(),
        doc.height(),
        inputs.len(),
        config.mode
    );

    let outcomes = optimize_layers(&inputs, config, pool)?;
    let payloads: Vec<String> = outcomes.iter().map(|outcome| outcome.csv.clone()).collect();
    let rendered = doc.render_with_payloads(&payloads)?;
    fs::write(target, rendered).map_err(TmxError::Write)?;
    log::info!("map written to {}", target.display());

    Ok(ConversionReport {
        source: source.display().to_string(),
        target: target.display().to_string(),
        layers: outcomes.into_iter().map(|outcome| outcome.report).collect(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerStats {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub fitness: usize,
    pub max_fitness: usize,
    pub heights: HeightStats,
    /// Occupied height of each column, left to right.
    pub column_heights: Vec<usize>,
}

/// Fitness and height profile of every layer, without modifying anything.
pub fn inspect_file(source: &Path) -> Result<Vec<LayerStats>, ConversionError> {
    let doc = TmxDocument::load(source)?;
    doc.layer_inputs()?
        .into_iter()
        .map(|input| -> Result<LayerStats, ConversionError> {
            let wrap = |source: LayerError| LayerRunError {
                layer: input.name.clone(),
                source,
            };
            let grid =
                TileGrid::decode_csv(&input.csv, input.width, input.height).map_err(wrap)?;
            let heights = HeightStats::from_grid(&grid).map_err(wrap)?;
            Ok(LayerStats {
                fitness: calculate_fitness(&grid),
                max_fitness: max_fitness(&grid),
                column_heights: grid.occupied_heights(),
                width: grid.width(),
                height: grid.height(),
                heights,
                name: input.name,
            })
        })
        .collect()
}
