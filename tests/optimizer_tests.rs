use tileclimb::layer::TileGrid;
use tileclimb::optimizer::fitness::{calculate_fitness, max_fitness};
use tileclimb::optimizer::hill_climb::{
    hill_climb, hill_climb_with_progress, HillClimbConfig, SearchStatus,
};
use tileclimb::optimizer::scramble::{create_adversarial_configuration, shuffle_columns};
use tileclimb::rng::SplitMix64;

/// Layer whose column `x` has occupied height `heights[x]`.
fn layer_with_heights(heights: &[usize], rows: usize) -> TileGrid {
    let mut tokens = Vec::with_capacity(heights.len() * rows);
    for y in 0..rows {
        for &h in heights {
            tokens.push(if rows - y <= h { "3" } else { "0" });
        }
    }
    TileGrid::decode_csv(&tokens.join(","), heights.len(), rows).expect("valid payload")
}

fn sorted_provenance(grid: &TileGrid) -> Vec<usize> {
    let mut order = grid.column_order();
    order.sort_unstable();
    order
}

#[test]
fn flat_layer_from_source_rows_is_already_optimal() {
    let mut grid =
        TileGrid::decode_csv("1,1,1,1\n0,0,0,0\n0,0,0,0", 4, 3).expect("valid payload");
    assert_eq!(calculate_fitness(&grid), 3);

    let mut seen = 0;
    let outcome = hill_climb_with_progress(
        &mut grid,
        &HillClimbConfig {
            max_iterations: 1,
            deadline: None,
        },
        &mut SplitMix64::new(17),
        |_, _| seen += 1,
    );
    assert_eq!(outcome.status, SearchStatus::Converged);
    assert_eq!(seen, 0, "no swap should be attempted once optimal");
    assert_eq!(grid.column_order(), vec![0, 1, 2, 3]);
}

#[test]
fn fitness_stays_within_bounds() {
    let heights = [0, 9, 1, 8, 2, 7, 3, 6, 4, 5];
    let mut grid = layer_with_heights(&heights, 10);
    let mut rng = SplitMix64::new(8);
    for _ in 0..20 {
        shuffle_columns(&mut grid, &mut rng);
        let fitness = calculate_fitness(&grid);
        assert!(fitness <= max_fitness(&grid));
    }
    let single = layer_with_heights(&[4], 6);
    assert_eq!(calculate_fitness(&single), 0);
    assert_eq!(max_fitness(&single), 0);
}

#[test]
fn hill_climb_is_a_permutation_and_never_loses_fitness() {
    let heights = [0, 9, 1, 8, 2, 7, 3, 6, 4, 5, 9, 0, 5, 5, 1, 8];
    let original = layer_with_heights(&heights, 10);
    let mut grid = original.clone();
    let mut rng = SplitMix64::new(2024);
    create_adversarial_configuration(&mut grid, &mut rng).expect("scramble");

    let mut trace = Vec::new();
    let outcome = hill_climb_with_progress(
        &mut grid,
        &HillClimbConfig {
            max_iterations: 2000,
            deadline: None,
        },
        &mut rng,
        |_, fitness| trace.push(fitness),
    );

    assert!(trace.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(trace.len(), outcome.iterations);
    assert_eq!(outcome.final_fitness, calculate_fitness(&grid));
    assert!(outcome.final_fitness >= outcome.initial_fitness);
    assert_eq!(sorted_provenance(&grid), (0..heights.len()).collect::<Vec<_>>());
    for column in grid.columns() {
        assert_eq!(column, &original.columns()[column.index()]);
    }
}

#[test]
fn accepted_swaps_strictly_improve() {
    let heights = [0, 6, 0, 6, 0, 6, 0, 6];
    let mut grid = layer_with_heights(&heights, 8);
    let mut previous = calculate_fitness(&grid);
    let outcome = hill_climb_with_progress(
        &mut grid,
        &HillClimbConfig {
            max_iterations: 500,
            deadline: None,
        },
        &mut SplitMix64::new(5),
        |_, fitness| {
            assert!(fitness == previous || fitness > previous);
            previous = fitness;
        },
    );
    assert_eq!(outcome.improvements > 0, outcome.final_fitness > outcome.initial_fitness);
}

#[test]
fn converged_search_stops_at_optimum() {
    let heights = [1, 2, 3, 4, 5, 6, 7, 8];
    let mut grid = layer_with_heights(&heights, 8);
    grid.swap_columns(3, 4);
    grid.swap_columns(0, 7);

    let mut last_iteration = None;
    let outcome = hill_climb_with_progress(
        &mut grid,
        &HillClimbConfig {
            max_iterations: 100_000,
            deadline: None,
        },
        &mut SplitMix64::new(1),
        |iteration, _| last_iteration = Some(iteration),
    );
    if outcome.status == SearchStatus::Converged {
        assert_eq!(outcome.final_fitness, 7);
        assert_eq!(last_iteration.map(|i| i + 1), Some(outcome.iterations));
        assert!(outcome.iterations < 100_000);
    } else {
        assert_eq!(outcome.iterations, 100_000);
    }
}

#[test]
fn same_seed_same_result() {
    let heights = [0, 9, 1, 8, 2, 7, 3, 6, 4, 5];
    let run = |seed| {
        let mut grid = layer_with_heights(&heights, 10);
        let mut rng = SplitMix64::new(seed);
        create_adversarial_configuration(&mut grid, &mut rng).expect("scramble");
        let outcome = hill_climb(&mut grid, &HillClimbConfig::default(), &mut rng);
        (grid.column_order(), outcome.final_fitness, outcome.iterations)
    };
    assert_eq!(run(31), run(31));
}

#[test]
fn adversarial_configuration_for_width_eight() {
    let mut grid = layer_with_heights(&[1, 1, 2, 2, 3, 3, 4, 4], 5);
    let report =
        create_adversarial_configuration(&mut grid, &mut SplitMix64::new(77)).expect("scramble");
    assert_eq!(report.forced_swaps, 2);
    assert_eq!(report.heights.min, 1);
    assert_eq!(report.heights.max, 4);
    assert_eq!(sorted_provenance(&grid), (0..8).collect::<Vec<_>>());
}
