//! Incremental summary statistics over non-no-data cells.
//!
//! Eager mode keeps n/sum/min/max exact under every replacement by also
//! tracking how many cells hold the current min and max. When a
//! replacement removes the last occurrence of an extreme, the incremental
//! step can no longer prove the next extreme, so the stats are flagged and
//! the grid performs a full linear scan before the next read. Lazy mode
//! skips the bookkeeping entirely: any mutation sets the flag.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use raster_common::CellValue;

use crate::config::StatsMode;

/// Point-in-time view of the aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot<T> {
    /// Number of non-no-data cells.
    pub n: u64,
    /// Exact decimal sum over non-no-data cells.
    pub sum: Decimal,
    /// Smallest non-no-data value, if any.
    pub min: Option<T>,
    /// Largest non-no-data value, if any.
    pub max: Option<T>,
}

impl<T> StatsSnapshot<T> {
    /// Mean of the non-no-data cells, if any.
    pub fn mean(&self) -> Option<Decimal> {
        if self.n == 0 {
            None
        } else {
            Some(self.sum / Decimal::from(self.n))
        }
    }
}

/// Move `current` toward `value` under the `keep` ordering, maintaining the
/// occurrence count of the tracked extreme.
fn track_extreme<T: CellValue>(
    current: &mut Option<T>,
    count: &mut u64,
    value: T,
    keep: Ordering,
) {
    match current {
        None => {
            *current = Some(value);
            *count = 1;
        }
        Some(extreme) => match value.total_compare(extreme) {
            o if o == keep => {
                *current = Some(value);
                *count = 1;
            }
            Ordering::Equal => *count += 1,
            _ => {}
        },
    }
}

/// Full-scan accumulator used by recompute.
#[derive(Debug)]
pub struct StatsAccumulator<T> {
    no_data: T,
    n: u64,
    sum: Decimal,
    min: Option<T>,
    count_at_min: u64,
    max: Option<T>,
    count_at_max: u64,
}

impl<T: CellValue> StatsAccumulator<T> {
    /// Create an empty accumulator for the given sentinel.
    pub fn new(no_data: T) -> Self {
        Self {
            no_data,
            n: 0,
            sum: Decimal::ZERO,
            min: None,
            count_at_min: 0,
            max: None,
            count_at_max: 0,
        }
    }

    /// Fold one cell value into the aggregates.
    pub fn observe(&mut self, value: T) {
        if value == self.no_data {
            return;
        }
        self.n += 1;
        self.sum += value.to_decimal();
        track_extreme(&mut self.min, &mut self.count_at_min, value, Ordering::Less);
        track_extreme(&mut self.max, &mut self.count_at_max, value, Ordering::Greater);
    }
}

/// Running aggregates of a grid.
#[derive(Debug)]
pub struct GridStats<T> {
    mode: StatsMode,
    no_data: T,
    n: u64,
    sum: Decimal,
    min: Option<T>,
    count_at_min: u64,
    max: Option<T>,
    count_at_max: u64,
    needs_recompute: bool,
}

impl<T: CellValue> GridStats<T> {
    /// Create empty stats. The mode is fixed for the life of the grid.
    pub fn new(mode: StatsMode, no_data: T) -> Self {
        Self {
            mode,
            no_data,
            n: 0,
            sum: Decimal::ZERO,
            min: None,
            count_at_min: 0,
            max: None,
            count_at_max: 0,
            needs_recompute: false,
        }
    }

    /// The configured mode.
    pub fn mode(&self) -> StatsMode {
        self.mode
    }

    /// Whether the next read must run a full recompute first.
    pub fn needs_recompute(&self) -> bool {
        self.needs_recompute
    }

    /// Mark the aggregates stale (bulk construction, lazy mutation).
    pub fn invalidate(&mut self) {
        self.needs_recompute = true;
    }

    /// Record a cell replacement: `old` was overwritten by `new`.
    pub fn observe_replace(&mut self, new: T, old: T) {
        if self.mode == StatsMode::Lazy {
            if new != old {
                self.needs_recompute = true;
            }
            return;
        }

        // Retract the old value.
        if old != self.no_data {
            self.n -= 1;
            self.sum -= old.to_decimal();
            if let Some(min) = self.min {
                if old.total_compare(&min) == Ordering::Equal {
                    self.count_at_min = self.count_at_min.saturating_sub(1);
                }
            }
            if let Some(max) = self.max {
                if old.total_compare(&max) == Ordering::Equal {
                    self.count_at_max = self.count_at_max.saturating_sub(1);
                }
            }
        }

        // Fold in the new value.
        if new != self.no_data {
            self.n += 1;
            self.sum += new.to_decimal();
            track_extreme(&mut self.min, &mut self.count_at_min, new, Ordering::Less);
            track_extreme(&mut self.max, &mut self.count_at_max, new, Ordering::Greater);
        }

        if self.n == 0 {
            // Exactly empty again; everything is known.
            self.min = None;
            self.count_at_min = 0;
            self.max = None;
            self.count_at_max = 0;
        } else if self.count_at_min == 0 || self.count_at_max == 0 {
            // The last occurrence of an extreme is gone; the incremental
            // step cannot name its successor.
            self.needs_recompute = true;
        }
    }

    /// Install the result of a full scan and clear the recompute flag.
    pub fn finish(&mut self, acc: StatsAccumulator<T>) {
        self.n = acc.n;
        self.sum = acc.sum;
        self.min = acc.min;
        self.count_at_min = acc.count_at_min;
        self.max = acc.max;
        self.count_at_max = acc.count_at_max;
        self.needs_recompute = false;
    }

    /// Current aggregates.
    pub fn snapshot(&self) -> StatsSnapshot<T> {
        StatsSnapshot {
            n: self.n,
            sum: self.sum,
            min: self.min,
            max: self.max,
        }
    }
}
