//! Test data generators for creating synthetic raster data.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

/// Creates test cell values with a predictable pattern.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read/written correctly
/// by checking that `values[row * cols + col] == col * 1000 + row`.
///
/// # Arguments
///
/// * `rows` - Number of rows
/// * `cols` - Number of columns
///
/// # Returns
///
/// A `Vec<f64>` in row-major order (row 0 first, then row 1, etc.)
///
/// # Example
///
/// ```
/// use test_utils::create_test_values;
///
/// let values = create_test_values(5, 10);
/// assert_eq!(values.len(), 50); // 5 * 10
/// assert_eq!(values[0], 0.0);    // row=0, col=0 -> 0*1000 + 0
/// assert_eq!(values[1], 1000.0); // row=0, col=1 -> 1*1000 + 0
/// assert_eq!(values[10], 1.0);   // row=1, col=0 -> 0*1000 + 1
/// ```
pub fn create_test_values(rows: usize, cols: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            data.push((col * 1000 + row) as f64);
        }
    }
    data
}

/// Creates elevation-like cell values in meters.
///
/// Values form a gradient from ~0 m (top-left) to ~2000 m (bottom-right),
/// similar to a real digital elevation model.
pub fn create_elevation_values(rows: usize, cols: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let x_factor = col as f64 / cols.max(1) as f64;
            let y_factor = row as f64 / rows.max(1) as f64;
            data.push((x_factor + y_factor) * 1000.0);
        }
    }
    data
}

/// Creates cell values where a deterministic subset is the no-data
/// sentinel.
///
/// Every cell whose linear index is divisible by `stride` holds
/// `no_data`; the rest hold the pattern of [`create_test_values`].
/// Useful for exercising sparse chunks and statistics over masked data.
pub fn create_masked_values(rows: usize, cols: usize, no_data: f64, stride: usize) -> Vec<f64> {
    create_test_values(rows, cols)
        .into_iter()
        .enumerate()
        .map(|(i, v)| if i % stride.max(1) == 0 { no_data } else { v })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_values_pattern() {
        let values = create_test_values(4, 3);
        assert_eq!(values.len(), 12);
        for row in 0..4 {
            for col in 0..3 {
                assert_eq!(values[row * 3 + col], (col * 1000 + row) as f64);
            }
        }
    }

    #[test]
    fn test_elevation_range() {
        let values = create_elevation_values(10, 10);
        assert!(values.iter().all(|v| (0.0..=2000.0).contains(v)));
        assert!(values[0] < values[99]);
    }

    #[test]
    fn test_masked_values_stride() {
        let values = create_masked_values(4, 4, -9999.0, 3);
        assert_eq!(values[0], -9999.0);
        assert_eq!(values[3], -9999.0);
        assert_ne!(values[1], -9999.0);
    }
}
