//! Run hill-climbing benchmark and optionally append one line to a log file for trend tracking.
//!
//! Usage:
//!   cargo run --release --bin benchmark_hill_climb
//!   cargo run --release --bin benchmark_hill_climb -- --log
//!
//! --log  Append one row to benchmark_log.csv (date, runs_per_sec, iterations_per_sec, width, height).

use std::fs::OpenOptions;
use std::time::Instant;

use serde::Serialize;

use tileclimb::layer::TileGrid;
use tileclimb::optimizer::hill_climb::{hill_climb, HillClimbConfig};
use tileclimb::optimizer::scramble::create_adversarial_configuration;
use tileclimb::rng::SplitMix64;

/// Rolling terrain: column x is filled from the floor up to a height that wanders by 0..=3.
fn terrain(width: usize, height: usize) -> TileGrid {
    let mut heights = Vec::with_capacity(width);
    let mut level = height / 3;
    for x in 0..width {
        level = match x % 7 {
            0 | 3 => (level + 2).min(height),
            5 => level.saturating_sub(3).max(1),
            _ => level,
        };
        heights.push(level);
    }
    let mut tokens = Vec::with_capacity(width * height);
    for y in 0..height {
        for &column_height in &heights {
            tokens.push(if height - y <= column_height { "1" } else { "0" });
        }
    }
    TileGrid::decode_csv(&tokens.join(","), width, height).expect("generated payload is valid")
}

fn main() {
    let log = std::env::args().any(|a| a == "--log");

    let (width, height) = (212usize, 14usize);
    let base = terrain(width, height);
    let config = HillClimbConfig {
        max_iterations: 5000,
        deadline: None,
    };

    // Run for at least this long or this many climbs
    const MIN_DURATION_MS: u128 = 2000;
    const MIN_RUNS: u32 = 20;

    let start = Instant::now();
    let mut runs: u32 = 0;
    let mut iterations: u64 = 0;
    while start.elapsed().as_millis() < MIN_DURATION_MS || runs < MIN_RUNS {
        let mut grid = base.clone();
        let mut rng = SplitMix64::new(u64::from(runs));
        create_adversarial_configuration(&mut grid, &mut rng).expect("non-empty grid");
        let outcome = hill_climb(&mut grid, &config, &mut rng);
        iterations += outcome.iterations as u64;
        runs += 1;
    }
    let elapsed_secs = start.elapsed().as_secs_f64();

    let runs_per_sec = runs as f64 / elapsed_secs;
    let iterations_per_sec = iterations as f64 / elapsed_secs;

    println!(
        "Hill-climb benchmark ({}x{} layer, {} max iterations):",
        width, height, config.max_iterations
    );
    println!("  Runs:         {}", runs);
    println!("  Duration:     {:.2} s", elapsed_secs);
    println!("  Runs/s:       {:.2}", runs_per_sec);
    println!("  Iterations/s: {:.2}", iterations_per_sec);

    if log {
        let row = LogRow {
            date: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            runs_per_sec,
            iterations_per_sec,
            width,
            height,
        };
        match append_log(LOG_PATH, &row) {
            Ok(()) => println!("Appended to {}", LOG_PATH),
            Err(err) => {
                eprintln!("failed to append to {}: {}", LOG_PATH, err);
                std::process::exit(1);
            }
        }
    }
}

const LOG_PATH: &str = "benchmark_log.csv";

#[derive(Serialize)]
struct LogRow {
    date: String,
    runs_per_sec: f64,
    iterations_per_sec: f64,
    width: usize,
    height: usize,
}

/// Appends `row`, writing the header first when the file is new or empty.
fn append_log(path: &str, row: &LogRow) -> Result<(), Box<dyn std::error::Error>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    writer.serialize(row)?;
    writer.flush()?;
    Ok(())
}
