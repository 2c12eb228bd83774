use tileclimb::layer::{LayerError, TileColumn, TileGrid};

fn sample_payload() -> &'static str {
    "0,0,0,0,0,\n0,0,0,7,0,\n0,4,0,7,0,\n1,4,0,7,9,\n1,4,0,7,9"
}

#[test]
fn encode_then_decode_reproduces_layer() {
    let grid = TileGrid::decode_csv(sample_payload(), 5, 5).expect("valid payload");
    let reparsed = TileGrid::decode_csv(&grid.encode_csv(), grid.width(), grid.height())
        .expect("encoded payload decodes");
    assert_eq!(reparsed, grid);
}

#[test]
fn encode_matches_source_layout() {
    let grid = TileGrid::decode_csv(sample_payload(), 5, 5).expect("valid payload");
    assert_eq!(grid.encode_csv(), sample_payload());
}

#[test]
fn reordered_layer_survives_round_trip() {
    let mut grid = TileGrid::decode_csv(sample_payload(), 5, 5).expect("valid payload");
    grid.swap_columns(0, 4);
    grid.swap_columns(1, 2);
    let reparsed =
        TileGrid::decode_csv(&grid.encode_csv(), 5, 5).expect("encoded payload decodes");
    assert_eq!(reparsed.occupied_heights(), grid.occupied_heights());
    for (a, b) in reparsed.columns().iter().zip(grid.columns()) {
        assert_eq!(a.cells(), b.cells());
    }
}

#[test]
fn occupied_heights_follow_highest_tile() {
    let grid = TileGrid::decode_csv(sample_payload(), 5, 5).expect("valid payload");
    assert_eq!(grid.occupied_heights(), vec![2, 3, 0, 4, 2]);
}

#[test]
fn occupied_height_examples() {
    let scattered = TileColumn::with_cells(0, vec![0, 0, 5, 0, 3]).expect("column");
    assert_eq!(scattered.occupied_height(), 3);
    let empty = TileColumn::with_cells(1, vec![0; 5]).expect("column");
    assert_eq!(empty.occupied_height(), 0);
    let top = TileColumn::with_cells(2, vec![7, 0, 0, 0, 0]).expect("column");
    assert_eq!(top.occupied_height(), 5);
}

#[test]
fn negative_and_large_tile_ids_are_integers() {
    let grid = TileGrid::decode_csv("-1,2147483649", 2, 1).expect("valid payload");
    assert_eq!(grid.columns()[0].cells(), &[-1]);
    assert_eq!(grid.encode_csv(), "-1,2147483649");
}

#[test]
fn extra_tokens_are_a_format_error() {
    let err = TileGrid::decode_csv("1,2,3,4,5", 2, 2).expect_err("too many tokens");
    assert!(matches!(err, LayerError::Format(_)));
    assert!(err.to_string().contains("expected 4 tiles"));
}
