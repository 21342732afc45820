//! Configuration for the grid engine.

use serde::{Deserialize, Serialize};

/// Default occupancy fraction at which a sparse value group is migrated
/// from the set-based overlay to the bitset-based overlay. Tunable; the
/// engine's correctness does not depend on it.
pub const DEFAULT_SPARSE_OCCUPANCY: f64 = 0.5;

/// Configuration for a grid instance.
///
/// Fixed at construction; the statistics mode and promotion target cannot
/// change over the life of a grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Rows per chunk.
    pub chunk_rows: i64,

    /// Columns per chunk.
    pub chunk_cols: i64,

    /// Memory budget for resident chunk payloads, in megabytes.
    pub memory_budget_mb: usize,

    /// Whether aggregates are maintained eagerly or recomputed on demand.
    pub stats_mode: StatsMode,

    /// Representation a Uniform chunk is promoted to on a differing write.
    pub promotion: PromotionTarget,

    /// Occupancy fraction for the sparse set-vs-bitset overlay heuristic.
    pub sparse_occupancy: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            chunk_rows: 256,
            chunk_cols: 256,
            memory_budget_mb: 512,
            stats_mode: StatsMode::Eager,
            promotion: PromotionTarget::Dense,
            sparse_occupancy: DEFAULT_SPARSE_OCCUPANCY,
        }
    }
}

impl GridConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GRID_CHUNK_ROWS") {
            if let Ok(rows) = val.parse() {
                config.chunk_rows = rows;
            }
        }

        if let Ok(val) = std::env::var("GRID_CHUNK_COLS") {
            if let Ok(cols) = val.parse() {
                config.chunk_cols = cols;
            }
        }

        if let Ok(val) = std::env::var("GRID_MEMORY_BUDGET_MB") {
            if let Ok(mb) = val.parse() {
                config.memory_budget_mb = mb;
            }
        }

        if let Ok(val) = std::env::var("GRID_STATS_MODE") {
            config.stats_mode = StatsMode::from_str(&val);
        }

        if let Ok(val) = std::env::var("GRID_PROMOTION") {
            config.promotion = PromotionTarget::from_str(&val);
        }

        if let Ok(val) = std::env::var("GRID_SPARSE_OCCUPANCY") {
            if let Ok(frac) = val.parse() {
                config.sparse_occupancy = frac;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_rows <= 0 || self.chunk_cols <= 0 {
            return Err("chunk dimensions must be > 0".to_string());
        }

        if self.memory_budget_mb == 0 {
            return Err("memory_budget_mb must be > 0".to_string());
        }

        if !(self.sparse_occupancy > 0.0 && self.sparse_occupancy <= 1.0) {
            return Err("sparse_occupancy must be in (0, 1]".to_string());
        }

        Ok(())
    }

    /// Get the memory budget in bytes.
    pub fn memory_budget_bytes(&self) -> usize {
        self.memory_budget_mb * 1024 * 1024
    }
}

/// Whether aggregates are kept exact on every mutation or recomputed on
/// demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatsMode {
    /// Exact aggregates under every mutation.
    #[default]
    Eager,
    /// Dirty flag on mutation; full recompute on query.
    Lazy,
}

impl StatsMode {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "lazy" => Self::Lazy,
            _ => Self::Eager,
        }
    }
}

impl std::fmt::Display for StatsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eager => write!(f, "eager"),
            Self::Lazy => write!(f, "lazy"),
        }
    }
}

/// Representation a Uniform chunk becomes when promoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PromotionTarget {
    /// Promote to a dense row-major array.
    #[default]
    Dense,
    /// Promote to the sparse-hybrid overlay representation.
    Sparse,
}

impl PromotionTarget {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "sparse" | "sparse_hybrid" => Self::Sparse,
            _ => Self::Dense,
        }
    }
}

impl std::fmt::Display for PromotionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dense => write!(f, "dense"),
            Self::Sparse => write!(f, "sparse"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GridConfig::default();
        assert_eq!(config.chunk_rows, 256);
        assert_eq!(config.chunk_cols, 256);
        assert_eq!(config.memory_budget_mb, 512);
        assert_eq!(config.stats_mode, StatsMode::Eager);
        assert_eq!(config.promotion, PromotionTarget::Dense);
        assert!((config.sparse_occupancy - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_validation() {
        let mut config = GridConfig::default();
        assert!(config.validate().is_ok());

        config.chunk_rows = 0;
        assert!(config.validate().is_err());

        config = GridConfig::default();
        config.memory_budget_mb = 0;
        assert!(config.validate().is_err());

        config = GridConfig::default();
        config.sparse_occupancy = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(StatsMode::from_str("LAZY"), StatsMode::Lazy);
        assert_eq!(StatsMode::from_str("anything"), StatsMode::Eager);
        assert_eq!(PromotionTarget::from_str("sparse"), PromotionTarget::Sparse);
        assert_eq!(PromotionTarget::from_str("dense"), PromotionTarget::Dense);
    }
}
