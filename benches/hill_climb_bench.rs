//! Fitness evaluation and hill-climbing throughput on a synthetic level layer.
//!
//! Run with: `cargo bench --bench hill_climb`
//! Quick numbers: `cargo run --release --bin benchmark_hill_climb` (see src/bin)

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use tileclimb::layer::TileGrid;
use tileclimb::optimizer::fitness::calculate_fitness;
use tileclimb::optimizer::hill_climb::{hill_climb, HillClimbConfig};
use tileclimb::optimizer::scramble::create_adversarial_configuration;
use tileclimb::rng::SplitMix64;

/// Column x is filled from the floor to height `1 + (x * 7) % rows`.
fn layer(width: usize, height: usize) -> TileGrid {
    let mut tokens = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let column_height = 1 + (x * 7) % height;
            tokens.push(if height - y <= column_height { "1" } else { "0" });
        }
    }
    TileGrid::decode_csv(&tokens.join(","), width, height).expect("generated payload is valid")
}

fn bench_hill_climb(c: &mut Criterion) {
    let mut group = c.benchmark_group("hill_climb");
    group.sample_size(30);

    let grid = layer(212, 14);
    group.throughput(Throughput::Elements(1));
    group.bench_function("fitness_212x14", |b| {
        b.iter(|| black_box(calculate_fitness(black_box(&grid))))
    });

    for &iterations in &[1_000usize, 10_000] {
        let config = HillClimbConfig {
            max_iterations: iterations,
            deadline: None,
        };
        group.throughput(Throughput::Elements(iterations as u64));
        group.bench_function(format!("climb_212x14_{iterations}"), |b| {
            b.iter_batched(
                || {
                    let mut scrambled = grid.clone();
                    let mut rng = SplitMix64::new(7);
                    create_adversarial_configuration(&mut scrambled, &mut rng)
                        .expect("non-empty grid");
                    (scrambled, rng)
                },
                |(mut scrambled, mut rng)| black_box(hill_climb(&mut scrambled, &config, &mut rng)),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hill_climb);
criterion_main!(benches);
