//! Integration test: cell-level read/write semantics across chunk
//! boundaries.
//!
//! Covers the round-trip, promotion safety, out-of-bounds, and
//! add-to-cell contracts end-to-end on a grid with small chunks so that
//! writes land in several chunks.

use chunk_store::MemoryChunkStore;
use raster_grid::{Grid, GridConfig, PromotionTarget};
use test_utils::{create_test_values, small_grid, small_sparse_grid, NO_DATA};

#[test]
fn test_set_get_round_trip_all_cells() {
    let mut grid = small_grid();
    let values = create_test_values(10, 10);

    for row in 0..10i64 {
        for col in 0..10i64 {
            let v = values[(row * 10 + col) as usize];
            assert_eq!(grid.set_cell(row, col, v).unwrap(), NO_DATA);
        }
    }
    for row in 0..10i64 {
        for col in 0..10i64 {
            assert_eq!(
                grid.get_cell(row, col).unwrap(),
                values[(row * 10 + col) as usize],
                "mismatch at ({row}, {col})"
            );
        }
    }
}

#[test]
fn test_no_data_round_trips() {
    let mut grid = small_grid();
    grid.set_cell(3, 3, 42.0).unwrap();
    assert_eq!(grid.set_cell(3, 3, NO_DATA).unwrap(), 42.0);
    assert_eq!(grid.get_cell(3, 3).unwrap(), NO_DATA);
}

#[test]
fn test_set_returns_prior_value() {
    let mut grid = small_grid();
    assert_eq!(grid.set_cell(5, 5, 1.0).unwrap(), NO_DATA);
    assert_eq!(grid.set_cell(5, 5, 2.0).unwrap(), 1.0);
    assert_eq!(grid.set_cell(5, 5, 2.0).unwrap(), 2.0);
}

#[test]
fn test_promotion_safety_within_one_chunk() {
    // Both cells live in chunk (0, 0) of a 4x4-chunked grid.
    for mut grid in [small_grid(), small_sparse_grid()] {
        grid.set_cell(0, 0, 11.0).unwrap();
        grid.set_cell(1, 1, 22.0).unwrap();
        assert_eq!(grid.get_cell(0, 0).unwrap(), 11.0);
        assert_eq!(grid.get_cell(1, 1).unwrap(), 22.0);
        assert_eq!(grid.get_cell(0, 1).unwrap(), NO_DATA);
    }
}

#[test]
fn test_out_of_bounds_reads_and_writes() {
    let mut grid = small_grid();
    assert_eq!(grid.get_cell(-1, -1).unwrap(), NO_DATA);
    assert_eq!(grid.get_cell(10, 10).unwrap(), NO_DATA);
    assert_eq!(grid.get_cell(0, 100).unwrap(), NO_DATA);

    // Writes out of bounds mutate nothing and create nothing.
    assert_eq!(grid.set_cell(-1, 0, 5.0).unwrap(), NO_DATA);
    assert_eq!(grid.set_cell(0, 10, 5.0).unwrap(), NO_DATA);
    assert_eq!(grid.resident_chunk_count(), 0);
    assert_eq!(grid.evicted_chunk_count(), 0);
}

#[test]
fn test_add_to_cell_no_data_semantics() {
    let mut grid = small_grid();

    // Adding to a no-data cell yields exactly the delta.
    assert_eq!(grid.add_to_cell(2, 2, 5.0).unwrap(), 5.0);
    assert_eq!(grid.get_cell(2, 2).unwrap(), 5.0);

    // Plain accumulation afterwards.
    assert_eq!(grid.add_to_cell(2, 2, 2.5).unwrap(), 7.5);

    // Adding the no-data value is a no-op.
    assert_eq!(grid.add_to_cell(2, 2, NO_DATA).unwrap(), 7.5);
    assert_eq!(grid.get_cell(2, 2).unwrap(), 7.5);

    // No-op also on an untouched cell.
    assert_eq!(grid.add_to_cell(8, 8, NO_DATA).unwrap(), NO_DATA);
    assert_eq!(grid.get_cell(8, 8).unwrap(), NO_DATA);
}

#[test]
fn test_try_set_cell_forbids_promotion() {
    let mut grid = small_grid();
    // The chunk is still Uniform; a differing non-promoting write fails.
    grid.set_cell(0, 0, NO_DATA).unwrap();
    assert!(matches!(
        grid.try_set_cell(0, 1, 5.0),
        Err(raster_grid::GridError::UnsupportedMutation(_))
    ));
    // The failed write left the chunk and the cell untouched.
    assert_eq!(grid.get_cell(0, 1).unwrap(), NO_DATA);
    assert_eq!(grid.stats(false).unwrap().n, 0);

    // Once promoted by a regular write, the same path succeeds.
    grid.set_cell(0, 0, 1.0).unwrap();
    assert_eq!(grid.try_set_cell(0, 1, 5.0).unwrap(), NO_DATA);
    assert_eq!(grid.get_cell(0, 1).unwrap(), 5.0);
    assert_eq!(grid.stats(false).unwrap().n, 2);
}

#[test]
fn test_integer_grid_round_trip() {
    let config = GridConfig {
        chunk_rows: 4,
        chunk_cols: 4,
        ..GridConfig::default()
    };
    let mut grid: Grid<i64, _> =
        Grid::new("ints", 8, 8, -1, config, MemoryChunkStore::new()).unwrap();
    grid.set_cell(0, 0, 10).unwrap();
    grid.set_cell(7, 7, -42).unwrap();
    assert_eq!(grid.get_cell(0, 0).unwrap(), 10);
    assert_eq!(grid.get_cell(7, 7).unwrap(), -42);
    assert_eq!(grid.get_cell(3, 3).unwrap(), -1);
    assert_eq!(grid.add_to_cell(0, 0, 5).unwrap(), 15);
}

#[test]
fn test_decimal_grid_round_trip() {
    use rust_decimal::Decimal;

    let config = GridConfig {
        chunk_rows: 4,
        chunk_cols: 4,
        ..GridConfig::default()
    };
    let no_data = Decimal::new(-9999, 0);
    let mut grid: Grid<Decimal, _> =
        Grid::new("decimals", 8, 8, no_data, config, MemoryChunkStore::new()).unwrap();
    let precise: Decimal = "0.000000000000000001".parse().unwrap();
    grid.set_cell(1, 1, precise).unwrap();
    assert_eq!(grid.get_cell(1, 1).unwrap(), precise);
    assert_eq!(grid.add_to_cell(1, 1, precise).unwrap(), precise + precise);
}

#[test]
fn test_invalid_no_data_sentinel_is_substituted() {
    let config = GridConfig {
        chunk_rows: 4,
        chunk_cols: 4,
        ..GridConfig::default()
    };
    let mut grid: Grid<f64, _> =
        Grid::new("nan-sentinel", 8, 8, f64::NAN, config, MemoryChunkStore::new()).unwrap();
    // The non-finite sentinel is silently replaced by the type default.
    assert_eq!(grid.no_data(), -9999.0);
    assert_eq!(grid.get_cell(0, 0).unwrap(), -9999.0);
}

#[test]
fn test_uniform_chunks_promote_per_policy() {
    let mut dense = small_grid();
    dense.set_cell(0, 0, 1.0).unwrap();
    let id = dense.geometry().chunk_of(0, 0);
    assert!(matches!(
        dense.chunk(id),
        Some(raster_grid::Chunk::Dense(_))
    ));

    let mut sparse = small_sparse_grid();
    sparse.set_cell(0, 0, 1.0).unwrap();
    assert!(matches!(
        sparse.chunk(id),
        Some(raster_grid::Chunk::Sparse(_))
    ));
}

#[test]
fn test_writing_sentinel_keeps_chunk_uniform() {
    let mut grid = small_grid();
    grid.set_cell(0, 0, NO_DATA).unwrap();
    let id = grid.geometry().chunk_of(0, 0);
    let chunk = grid.chunk(id).expect("chunk materialized by the write");
    assert!(chunk.is_uniform());
}

#[test]
fn test_cells_iterator_order_and_restart() {
    let config = GridConfig {
        chunk_rows: 2,
        chunk_cols: 2,
        ..GridConfig::default()
    };
    let mut grid: Grid<f64, _> =
        Grid::new("iter", 2, 4, NO_DATA, config, MemoryChunkStore::new()).unwrap();
    grid.set_cell(0, 0, 1.0).unwrap();
    grid.set_cell(0, 2, 2.0).unwrap();
    grid.set_cell(1, 3, 3.0).unwrap();

    // Chunk (0,0) row-major, then chunk (0,1) row-major.
    let expected = vec![
        1.0, NO_DATA, NO_DATA, NO_DATA, // chunk (0,0): cells (0,0) (0,1) (1,0) (1,1)
        2.0, NO_DATA, NO_DATA, 3.0, // chunk (0,1): cells (0,2) (0,3) (1,2) (1,3)
    ];
    let values: Vec<f64> = grid.cells().map(|v| v.unwrap()).collect();
    assert_eq!(values, expected);

    // Restartable by creating a new iterator.
    let again: Vec<f64> = grid.cells().map(|v| v.unwrap()).collect();
    assert_eq!(again, expected);
}

#[test]
fn test_iterator_covers_unmaterialized_chunks() {
    let mut grid = small_grid();
    grid.set_cell(9, 9, 4.0).unwrap();
    let values: Vec<f64> = grid.cells().map(|v| v.unwrap()).collect();
    assert_eq!(values.len(), 100);
    assert_eq!(values.iter().filter(|&&v| v != NO_DATA).count(), 1);
    // Iteration never materializes chunks.
    assert_eq!(grid.resident_chunk_count(), 1);
}

#[test]
fn test_promotion_target_from_config() {
    let config = GridConfig {
        chunk_rows: 4,
        chunk_cols: 4,
        promotion: PromotionTarget::Sparse,
        ..GridConfig::default()
    };
    assert!(config.validate().is_ok());
}
