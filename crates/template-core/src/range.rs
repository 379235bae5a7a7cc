//! Closed interval over an ordered scalar type.

use serde::{Deserialize, Serialize};

/// Closed interval `[lower, upper]`.
///
/// Built from two values in any order. Reversed input is normalised rather
/// than rejected, so `lower() <= upper()` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    lower: T,
    upper: T,
}

impl<T: PartialOrd + Copy> Range<T> {
    /// Create a range from two bounds given in either order.
    pub fn new(a: T, b: T) -> Self {
        if b < a {
            Self { lower: b, upper: a }
        } else {
            Self { lower: a, upper: b }
        }
    }

    /// Smaller bound.
    pub fn lower(&self) -> T {
        self.lower
    }

    /// Larger bound.
    pub fn upper(&self) -> T {
        self.upper
    }

    /// Whether `value` lies within the closed interval.
    pub fn contains(&self, value: T) -> bool {
        self.lower <= value && value <= self.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_independence() {
        for (a, b) in [(1, 5), (-3, 3), (7, 7), (i64::MIN, i64::MAX)] {
            let forward = Range::new(a, b);
            let reversed = Range::new(b, a);
            assert_eq!(forward.lower(), reversed.lower());
            assert_eq!(forward.upper(), reversed.upper());
            assert!(forward.lower() <= forward.upper());
        }
    }

    #[test]
    fn test_float_range() {
        let range = Range::new(2.5, -1.0);
        assert_eq!(range.lower(), -1.0);
        assert_eq!(range.upper(), 2.5);
        assert!(range.contains(0.0));
        assert!(!range.contains(2.6));
    }

    #[test]
    fn test_degenerate_range() {
        let range = Range::new(4u32, 4u32);
        assert_eq!(range.lower(), 4);
        assert_eq!(range.upper(), 4);
        assert!(range.contains(4));
    }
}
