use std::env;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::convert::{convert_file, inspect_file, LayerStats};
use crate::optimizer::hill_climb::DEFAULT_MAX_ITERATIONS;
use crate::optimizer::{OptimizerMode, RunConfig};
use crate::parallel::WorkerPool;

const USAGE: &str = "usage: tileclimb <shuffle|hillclimb|stats> ...\n\
    \x20 tileclimb shuffle <source.tmx> <target.tmx> [seed]\n\
    \x20 tileclimb hillclimb <source.tmx> <target.tmx> [iterations] [seed]\n\
    \x20 tileclimb stats <source.tmx> [--csv]\n\
    \x20 tileclimb <source.tmx> <target.tmx> [hillclimbing [iterations]]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Shuffle,
    HillClimb,
    Stats,
    /// `<source> <target> [hillclimbing [iterations]]`
    Positional,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("shuffle") => Some(Command::Shuffle),
        Some("hillclimb") => Some(Command::HillClimb),
        Some("stats") => Some(Command::Stats),
        Some(_) if args.len() >= 3 => Some(Command::Positional),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Shuffle) => handle_shuffle(args),
        Some(Command::HillClimb) => handle_hillclimb(args),
        Some(Command::Stats) => handle_stats(args),
        Some(Command::Positional) => handle_positional(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn handle_shuffle(args: &[String]) -> i32 {
    let (Some(source), Some(target)) = (args.get(2), args.get(3)) else {
        eprintln!("usage: tileclimb shuffle <source.tmx> <target.tmx> [seed]");
        return 2;
    };
    let config = RunConfig {
        mode: OptimizerMode::Shuffle,
        seed: parse_seed(args.get(4)),
        ..RunConfig::default()
    };
    run_conversion(source, target, &config)
}

fn handle_hillclimb(args: &[String]) -> i32 {
    let (Some(source), Some(target)) = (args.get(2), args.get(3)) else {
        eprintln!("usage: tileclimb hillclimb <source.tmx> <target.tmx> [iterations] [seed]");
        return 2;
    };
    let config = RunConfig {
        mode: OptimizerMode::HillClimb,
        max_iterations: parse_usize_arg(args.get(4), "iterations", DEFAULT_MAX_ITERATIONS),
        seed: parse_seed(args.get(5)),
        time_limit: time_limit_from_env(),
    };
    run_conversion(source, target, &config)
}

fn handle_positional(args: &[String]) -> i32 {
    let (source, target) = (&args[1], &args[2]);
    let hill_climbing = args
        .get(3)
        .is_some_and(|mode| mode.eq_ignore_ascii_case("hillclimbing"));
    let config = if hill_climbing {
        RunConfig {
            mode: OptimizerMode::HillClimb,
            max_iterations: parse_usize_arg(args.get(4), "iterations", DEFAULT_MAX_ITERATIONS),
            seed: parse_seed(None),
            time_limit: time_limit_from_env(),
        }
    } else {
        RunConfig {
            mode: OptimizerMode::Shuffle,
            seed: parse_seed(None),
            ..RunConfig::default()
        }
    };
    run_conversion(source, target, &config)
}

fn run_conversion(source: &str, target: &str, config: &RunConfig) -> i32 {
    match convert_file(
        Path::new(source),
        Path::new(target),
        config,
        &WorkerPool::from_env(),
    ) {
        Ok(report) => print_json(&report),
        Err(err) => {
            eprintln!("conversion failed: {err}");
            1
        }
    }
}

fn handle_stats(args: &[String]) -> i32 {
    let Some(source) = args.get(2).filter(|arg| !arg.starts_with("--")) else {
        eprintln!("usage: tileclimb stats <source.tmx> [--csv]");
        return 2;
    };
    let as_csv = args.iter().any(|arg| arg == "--csv");

    let stats = match inspect_file(Path::new(source)) {
        Ok(stats) => stats,
        Err(err) => {
            eprintln!("stats failed: {err}");
            return 1;
        }
    };

    if as_csv {
        match write_height_csv(&stats, io::stdout().lock()) {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("failed to write csv: {err}");
                1
            }
        }
    } else {
        print_json(&stats)
    }
}

#[derive(Debug, Serialize)]
struct HeightRow<'a> {
    layer: &'a str,
    position: usize,
    occupied_height: usize,
}

/// One row per column: layer name, left-to-right position and occupied height.
pub fn write_height_csv<W: io::Write>(stats: &[LayerStats], out: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for layer in stats {
        for (position, &occupied_height) in layer.column_heights.iter().enumerate() {
            writer.serialize(HeightRow {
                layer: &layer.name,
                position,
                occupied_height,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize report: {err}");
            1
        }
    }
}

pub fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                log::warn!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

/// Seed from the argument, else `TILECLIMB_SEED`, else None (entropy).
fn parse_seed(raw: Option<&String>) -> Option<u64> {
    if let Some(value) = raw {
        match value.parse::<u64>() {
            Ok(seed) => return Some(seed),
            Err(_) => log::warn!("invalid seed '{value}', ignoring"),
        }
    }
    env::var("TILECLIMB_SEED")
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
}

fn time_limit_from_env() -> Option<Duration> {
    env::var("TILECLIMB_TIME_LIMIT_SECS")
        .ok()
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .map(Duration::from_secs_f64)
}
