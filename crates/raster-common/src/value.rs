//! Numeric cell value abstraction.
//!
//! A grid is homogeneous in its cell type; everything above the chunk layer
//! is generic over [`CellValue`] instead of being duplicated per numeric
//! type. The trait captures exactly what the engine needs: an additive
//! identity, a total ordering for min/max tracking, a default no-data
//! sentinel with a validity check, plain addition, an exact decimal
//! rendition for aggregate arithmetic, and text parsing for the raster
//! import path.

use std::cmp::Ordering;
use std::fmt;

use num_traits::Zero;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A numeric type usable as the cell type of a grid.
pub trait CellValue:
    Copy
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Serialize
    + DeserializeOwned
    + 'static
{
    /// Additive identity.
    fn zero() -> Self;

    /// The conventional no-data sentinel for this cell type.
    fn default_no_data() -> Self;

    /// Whether a value may serve as a no-data sentinel.
    ///
    /// Non-finite floats are rejected so that sentinel comparison stays
    /// well defined (`NaN != NaN` would make every cell look like data).
    fn is_valid_no_data(&self) -> bool;

    /// Total ordering. For floats, `NaN` sorts above every number.
    fn total_compare(&self, other: &Self) -> Ordering;

    /// Plain addition; no-data semantics are handled by the caller.
    fn add(self, other: Self) -> Self;

    /// Exact decimal rendition for aggregate arithmetic.
    ///
    /// Values outside the decimal range collapse to zero; the statistics
    /// engine only feeds it finite data values.
    fn to_decimal(self) -> Decimal;

    /// Parse a whitespace-delimited raster token.
    fn parse(token: &str) -> Option<Self>;
}

impl CellValue for f64 {
    fn zero() -> Self {
        Zero::zero()
    }

    fn default_no_data() -> Self {
        -9999.0
    }

    fn is_valid_no_data(&self) -> bool {
        self.is_finite()
    }

    fn total_compare(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    fn add(self, other: Self) -> Self {
        self + other
    }

    fn to_decimal(self) -> Decimal {
        Decimal::from_f64(self).unwrap_or_default()
    }

    fn parse(token: &str) -> Option<Self> {
        token.parse().ok()
    }
}

impl CellValue for i64 {
    fn zero() -> Self {
        Zero::zero()
    }

    fn default_no_data() -> Self {
        -9999
    }

    fn is_valid_no_data(&self) -> bool {
        true
    }

    fn total_compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn add(self, other: Self) -> Self {
        self.wrapping_add(other)
    }

    fn to_decimal(self) -> Decimal {
        Decimal::from(self)
    }

    fn parse(token: &str) -> Option<Self> {
        token.parse().ok()
    }
}

impl CellValue for Decimal {
    fn zero() -> Self {
        Zero::zero()
    }

    fn default_no_data() -> Self {
        Decimal::new(-9999, 0)
    }

    fn is_valid_no_data(&self) -> bool {
        true
    }

    fn total_compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn add(self, other: Self) -> Self {
        self + other
    }

    fn to_decimal(self) -> Decimal {
        self
    }

    fn parse(token: &str) -> Option<Self> {
        token.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_no_data_validity() {
        assert!((-9999.0f64).is_valid_no_data());
        assert!(!f64::NAN.is_valid_no_data());
        assert!(!f64::INFINITY.is_valid_no_data());
    }

    #[test]
    fn test_total_compare_nan() {
        assert_eq!(f64::NAN.total_compare(&1.0), Ordering::Greater);
        assert_eq!(1.0f64.total_compare(&2.0), Ordering::Less);
    }

    #[test]
    fn test_to_decimal_exact() {
        assert_eq!(42i64.to_decimal(), Decimal::from(42));
        assert_eq!(0.25f64.to_decimal(), Decimal::new(25, 2));
        let d: Decimal = "1.000000000000000001".parse().unwrap();
        assert_eq!(d.to_decimal(), d);
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(<f64 as CellValue>::parse("-9999"), Some(-9999.0));
        assert_eq!(<i64 as CellValue>::parse("17"), Some(17));
        assert_eq!(<i64 as CellValue>::parse("x"), None);
        assert_eq!(
            <Decimal as CellValue>::parse("3.14"),
            Some(Decimal::new(314, 2))
        );
    }
}
