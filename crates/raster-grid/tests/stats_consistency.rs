//! Integration test: aggregate statistics stay consistent with chunk
//! contents under arbitrary write sequences, in both modes.

use rust_decimal::Decimal;

use chunk_store::MemoryChunkStore;
use raster_grid::{Grid, GridConfig, StatsMode};
use test_utils::{small_grid, small_lazy_grid, NO_DATA};

/// Linear scan over every cell, the ground truth the engine must match.
fn scan(grid: &mut Grid<f64, MemoryChunkStore>) -> (u64, Decimal, Option<f64>, Option<f64>) {
    let mut n = 0u64;
    let mut sum = Decimal::ZERO;
    let mut min: Option<f64> = None;
    let mut max: Option<f64> = None;
    let geometry = *grid.geometry();
    for row in 0..geometry.rows {
        for col in 0..geometry.cols {
            let v = grid.get_cell(row, col).unwrap();
            if v == NO_DATA {
                continue;
            }
            n += 1;
            sum += Decimal::try_from(v).unwrap();
            min = Some(min.map_or(v, |m: f64| m.min(v)));
            max = Some(max.map_or(v, |m: f64| m.max(v)));
        }
    }
    (n, sum, min, max)
}

fn assert_matches_scan(grid: &mut Grid<f64, MemoryChunkStore>) {
    let stats = grid.stats(true).unwrap();
    let (n, sum, min, max) = scan(grid);
    assert_eq!(stats.n, n);
    assert_eq!(stats.sum, sum);
    assert_eq!(stats.min, min);
    assert_eq!(stats.max, max);
}

#[test]
fn test_eager_stats_track_writes() {
    let mut grid = small_grid();
    grid.set_cell(0, 0, 4.0).unwrap();
    grid.set_cell(5, 5, 2.0).unwrap();
    grid.set_cell(9, 9, 6.0).unwrap();

    let stats = grid.stats(false).unwrap();
    assert_eq!(stats.n, 3);
    assert_eq!(stats.sum, Decimal::from(12));
    assert_eq!(stats.min, Some(2.0));
    assert_eq!(stats.max, Some(6.0));
    assert_eq!(stats.mean(), Some(Decimal::from(4)));
}

#[test]
fn test_eager_stats_survive_overwrites_and_erases() {
    let mut grid = small_grid();
    grid.set_cell(0, 0, 4.0).unwrap();
    grid.set_cell(1, 1, 8.0).unwrap();
    grid.set_cell(0, 0, 10.0).unwrap();
    grid.set_cell(1, 1, NO_DATA).unwrap();

    let stats = grid.stats(false).unwrap();
    assert_eq!(stats.n, 1);
    assert_eq!(stats.sum, Decimal::from(10));
    assert_eq!(stats.min, Some(10.0));
    assert_eq!(stats.max, Some(10.0));
    assert_matches_scan(&mut grid);
}

#[test]
fn test_losing_unique_extreme_recovers_via_recompute() {
    let mut grid = small_grid();
    grid.set_cell(0, 0, 1.0).unwrap();
    grid.set_cell(0, 1, 5.0).unwrap();
    grid.set_cell(0, 2, 9.0).unwrap();

    // Overwrite the unique minimum; the incremental step cannot know the
    // new minimum, so the next read recomputes.
    grid.set_cell(0, 0, 7.0).unwrap();
    let stats = grid.stats(false).unwrap();
    assert_eq!(stats.min, Some(5.0));
    assert_eq!(stats.max, Some(9.0));
    assert_eq!(stats.n, 3);
    assert_eq!(stats.sum, Decimal::from(21));
}

#[test]
fn test_forced_recompute_matches_scan_after_mixed_sequence() {
    let mut grid = small_grid();
    let writes: [(i64, i64, f64); 9] = [
        (0, 0, 3.0),
        (2, 7, -1.5),
        (9, 0, 12.25),
        (0, 0, NO_DATA),
        (4, 4, 0.0),
        (2, 7, 2.5),
        (7, 7, -8.0),
        (7, 7, -8.0),
        (3, 3, 100.0),
    ];
    for (row, col, v) in writes {
        grid.set_cell(row, col, v).unwrap();
    }
    grid.add_to_cell(4, 4, 1.25).unwrap();
    grid.add_to_cell(8, 8, 5.0).unwrap();

    assert_matches_scan(&mut grid);
}

#[test]
fn test_lazy_mode_recomputes_on_read() {
    let mut grid = small_lazy_grid();
    assert_eq!(grid.config().stats_mode, StatsMode::Lazy);
    grid.set_cell(0, 0, 4.0).unwrap();
    grid.set_cell(1, 1, 6.0).unwrap();

    let stats = grid.stats(false).unwrap();
    assert_eq!(stats.n, 2);
    assert_eq!(stats.sum, Decimal::from(10));
    assert_eq!(stats.min, Some(4.0));
    assert_eq!(stats.max, Some(6.0));

    // Clean reads do not recompute; mutations dirty the flag again.
    grid.set_cell(0, 0, 1.0).unwrap();
    let stats = grid.stats(false).unwrap();
    assert_eq!(stats.min, Some(1.0));
}

#[test]
fn test_bulk_init_invalidates_stats() {
    let mut grid = small_grid();
    grid.init_cell(0, 0, 3.0).unwrap();
    grid.init_cell(5, 5, 7.0).unwrap();

    // init writes carry no incremental stats side effect; the first read
    // rebuilds from a full scan.
    let stats = grid.stats(false).unwrap();
    assert_eq!(stats.n, 2);
    assert_eq!(stats.sum, Decimal::from(10));
}

#[test]
fn test_stats_exact_over_evicted_chunks() {
    let mut grid = test_utils::tight_budget_grid();
    grid.set_cell(0, 0, 2.0).unwrap();
    grid.set_cell(0, 300, 4.0).unwrap();
    grid.set_cell(300, 0, 6.0).unwrap();
    // At least one of the three dense chunks is now evicted.
    assert!(grid.evicted_chunk_count() >= 1);

    let stats = grid.stats(true).unwrap();
    assert_eq!(stats.n, 3);
    assert_eq!(stats.sum, Decimal::from(12));
    assert_eq!(stats.min, Some(2.0));
    assert_eq!(stats.max, Some(6.0));
}

#[test]
fn test_empty_grid_stats() {
    let mut grid = small_grid();
    let stats = grid.stats(true).unwrap();
    assert_eq!(stats.n, 0);
    assert_eq!(stats.sum, Decimal::ZERO);
    assert_eq!(stats.min, None);
    assert_eq!(stats.max, None);
    assert_eq!(stats.mean(), None);
}

#[test]
fn test_decimal_sum_is_exact() {
    let config = GridConfig {
        chunk_rows: 4,
        chunk_cols: 4,
        ..GridConfig::default()
    };
    let no_data = Decimal::new(-9999, 0);
    let mut grid: Grid<Decimal, _> =
        Grid::new("exact", 4, 4, no_data, config, MemoryChunkStore::new()).unwrap();
    let tiny: Decimal = "0.0000000001".parse().unwrap();
    for col in 0..4 {
        grid.set_cell(0, col, tiny).unwrap();
    }
    let stats = grid.stats(false).unwrap();
    assert_eq!(stats.sum, "0.0000000004".parse::<Decimal>().unwrap());
}
