pub mod fitness;
pub mod hill_climb;
pub mod scramble;

use std::fmt;
use std::time::{Duration, Instant};

use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use crate::layer::{LayerError, TileGrid};
use crate::optimizer::fitness::{calculate_fitness, max_fitness};
use crate::optimizer::hill_climb::{
    hill_climb, HillClimbConfig, HillClimbOutcome, DEFAULT_MAX_ITERATIONS,
};
use crate::optimizer::scramble::{
    create_adversarial_configuration, shuffle_columns, ScrambleReport,
};
use crate::parallel::WorkerPool;
use crate::rng::SplitMix64;

pub use fitness::FITNESS_TOLERANCE;
pub use hill_climb::SearchStatus;

/// How a layer is rearranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerMode {
    /// Uniform random column order; fitness is not consulted.
    Shuffle,
    /// Adversarial scramble followed by hill climbing.
    HillClimb,
}

impl Default for OptimizerMode {
    fn default() -> Self {
        Self::Shuffle
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: OptimizerMode,
    pub max_iterations: usize,
    /// Base seed. When None, one is drawn from OS entropy and recorded in each report.
    pub seed: Option<u64>,
    /// Wall-clock budget for the hill-climbing phase of each layer.
    pub time_limit: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: OptimizerMode::Shuffle,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
            time_limit: None,
        }
    }
}

/// One layer as handed over by the container: raw payload plus its dimensions.
#[derive(Debug, Clone)]
pub struct LayerInput {
    pub name: String,
    pub csv: String,
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerReport {
    pub name: String,
    pub mode: OptimizerMode,
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    pub initial_fitness: usize,
    pub final_fitness: usize,
    pub max_fitness: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scramble: Option<ScrambleReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<HillClimbOutcome>,
}

#[derive(Debug, Clone)]
pub struct LayerOutcome {
    /// Re-encoded payload, ready to be written back by the container.
    pub csv: String,
    pub report: LayerReport,
}

/// A layer that could not be processed; the whole run is abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRunError {
    pub layer: String,
    pub source: LayerError,
}

impl fmt::Display for LayerRunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer '{}': {}", self.layer, self.source)
    }
}

impl std::error::Error for LayerRunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Decodes, rearranges and re-encodes one layer. Nothing is returned on failure, so a
/// caller never sees a partially processed payload.
pub fn optimize_layer<R: Rng + ?Sized>(
    input: &LayerInput,
    config: &RunConfig,
    seed: u64,
    rng: &mut R,
) -> Result<LayerOutcome, LayerError> {
    let mut grid = TileGrid::decode_csv(&input.csv, input.width, input.height)?;
    log::info!(
        "layer '{}': {} tiles loaded ({}x{})",
        input.name,
        input.width * input.height,
        input.width,
        input.height
    );
    let initial_fitness = calculate_fitness(&grid);

    let (scramble, search) = match config.mode {
        OptimizerMode::Shuffle => {
            shuffle_columns(&mut grid, rng);
            (None, None)
        }
        OptimizerMode::HillClimb => {
            log::info!("layer '{}': building adversarial starting layout", input.name);
            let scramble = create_adversarial_configuration(&mut grid, rng)?;
            log::info!(
                "layer '{}': hill climbing (max {} iterations)",
                input.name,
                config.max_iterations
            );
            let search_config = HillClimbConfig {
                max_iterations: config.max_iterations,
                deadline: config.time_limit.map(|limit| Instant::now() + limit),
            };
            let search = hill_climb(&mut grid, &search_config, rng);
            (Some(scramble), Some(search))
        }
    };

    let report = LayerReport {
        name: input.name.clone(),
        mode: config.mode,
        seed,
        width: grid.width(),
        height: grid.height(),
        initial_fitness,
        final_fitness: calculate_fitness(&grid),
        max_fitness: max_fitness(&grid),
        scramble,
        search,
    };
    Ok(LayerOutcome {
        csv: grid.encode_csv(),
        report,
    })
}

/// Processes every layer, each with its own generator seeded `base + index` so results do
/// not depend on scheduling. Output order matches input order. Fails on the first bad layer.
pub fn optimize_layers(
    inputs: &[LayerInput],
    config: &RunConfig,
    pool: &WorkerPool,
) -> Result<Vec<LayerOutcome>, LayerRunError> {
    let base_seed = config
        .seed
        .unwrap_or_else(|| SplitMix64::from_entropy().next_u64());

    let run_one = |(index, input): (usize, &LayerInput)| {
        let seed = base_seed.wrapping_add(index as u64);
        let mut rng = SplitMix64::seed_from_u64(seed);
        optimize_layer(input, config, seed, &mut rng).map_err(|source| LayerRunError {
            layer: input.name.clone(),
            source,
        })
    };

    if pool.is_sequential() || inputs.len() < 2 {
        inputs.iter().enumerate().map(run_one).collect()
    } else {
        pool.install(|| inputs.par_iter().enumerate().map(run_one).collect())
    }
}
