//! Numeric value sources.

use super::SourceError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use template_core::{GeneratedValue, Range, ReadError, ValueSource};

/// Uniform random integers from a closed range.
pub struct RandomInt {
    range: Range<i64>,
    rng: StdRng,
}

impl RandomInt {
    /// Create a source drawing from `range` with a generator seeded by `seed`.
    pub fn new(range: Range<i64>, seed: u64) -> Self {
        Self {
            range,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn range(&self) -> Range<i64> {
        self.range
    }
}

impl ValueSource for RandomInt {
    fn produce_one(&mut self) -> Result<GeneratedValue, ReadError> {
        Ok(GeneratedValue::Int(
            self.rng.gen_range(self.range.lower()..=self.range.upper()),
        ))
    }
}

/// Uniform random doubles from a closed range.
pub struct RandomDouble {
    range: Range<f64>,
    rng: StdRng,
}

impl RandomDouble {
    /// Create a source drawing from `range` with a generator seeded by `seed`.
    ///
    /// Fails when the width of the range overflows an `f64`.
    pub fn new(range: Range<f64>, seed: u64) -> Result<Self, SourceError> {
        if !(range.upper() - range.lower()).is_finite() {
            return Err(SourceError::InvalidRange {
                lower: range.lower(),
                upper: range.upper(),
            });
        }
        Ok(Self {
            range,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn range(&self) -> Range<f64> {
        self.range
    }
}

impl ValueSource for RandomDouble {
    fn produce_one(&mut self) -> Result<GeneratedValue, ReadError> {
        Ok(GeneratedValue::Float(
            self.rng.gen_range(self.range.lower()..=self.range.upper()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_int_in_range() {
        let mut source = RandomInt::new(Range::new(20, 10), 42);
        let mut seen = std::collections::HashSet::new();

        for _ in 0..1000 {
            match source.produce_one() {
                Ok(GeneratedValue::Int(v)) => {
                    assert!((10..=20).contains(&v));
                    seen.insert(v);
                }
                other => panic!("Expected Int value, got {other:?}"),
            }
        }
        assert!(seen.len() > 1, "1000 draws should not all be identical");
    }

    #[test]
    fn test_random_int_degenerate_range() {
        let mut source = RandomInt::new(Range::new(0, 0), 7);
        for _ in 0..10 {
            assert_eq!(source.produce_one(), Ok(GeneratedValue::Int(0)));
        }
    }

    #[test]
    fn test_random_int_full_range() {
        let mut source = RandomInt::new(Range::new(i64::MIN, i64::MAX), 7);
        assert!(source.produce_one().is_ok());
    }

    #[test]
    fn test_random_double_in_range() {
        let mut source = RandomDouble::new(Range::new(0.0, 100.0), 42).unwrap();

        for _ in 0..100 {
            match source.produce_one() {
                Ok(GeneratedValue::Float(v)) => assert!((0.0..=100.0).contains(&v)),
                other => panic!("Expected Float value, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_random_double_rejects_overflowing_range() {
        let result = RandomDouble::new(Range::new(-f64::MAX, f64::MAX), 42);
        assert!(matches!(result, Err(SourceError::InvalidRange { .. })));
    }

    #[test]
    fn test_deterministic_generation() {
        let mut source1 = RandomInt::new(Range::new(0, 1_000_000), 42);
        let mut source2 = RandomInt::new(Range::new(0, 1_000_000), 42);

        for _ in 0..10 {
            assert_eq!(source1.produce_one(), source2.produce_one());
        }
    }
}
