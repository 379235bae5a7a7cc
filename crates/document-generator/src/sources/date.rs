//! Random date source.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use template_core::{
    date_from_seconds, format_date, seconds_from_date, DateError, GeneratedValue, Range,
    ReadError, ValueSource,
};

/// Uniform random days between two dates, rendered with a fixed format.
pub struct RandomDate {
    seconds: Range<i64>,
    format: String,
    rng: StdRng,
}

impl RandomDate {
    /// Create a source over `[begin, end]`, both written in `format`.
    pub fn new(begin: &str, end: &str, format: &str, seed: u64) -> Result<Self, DateError> {
        let lower = seconds_from_date(begin, format)?;
        let upper = seconds_from_date(end, format)?;
        // Fail here rather than on every draw if the format cannot be rendered.
        format_date(date_from_seconds(lower), format)?;

        Ok(Self {
            seconds: Range::new(lower, upper),
            format: format.to_string(),
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl ValueSource for RandomDate {
    fn produce_one(&mut self) -> Result<GeneratedValue, ReadError> {
        let secs = self
            .rng
            .gen_range(self.seconds.lower()..=self.seconds.upper());
        let day = format_date(date_from_seconds(secs), &self.format)?;
        Ok(GeneratedValue::String(day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dates_within_range() {
        let mut source = RandomDate::new("2020-01-01", "2024-12-31", "%Y-%m-%d", 42).unwrap();
        let lower = seconds_from_date("2020-01-01", "%Y-%m-%d").unwrap();
        let upper = seconds_from_date("2024-12-31", "%Y-%m-%d").unwrap();

        for _ in 0..100 {
            let value = source.produce_one().unwrap();
            let day = value.as_str().expect("Expected String value");
            let secs = seconds_from_date(day, "%Y-%m-%d").unwrap();
            assert!(lower <= secs && secs <= upper, "{day} out of range");
        }
    }

    #[test]
    fn test_single_day_range() {
        let mut source = RandomDate::new("17/05/2023", "17/05/2023", "%d/%m/%Y", 1).unwrap();
        assert_eq!(
            source.produce_one(),
            Ok(GeneratedValue::String("17/05/2023".to_string()))
        );
    }

    #[test]
    fn test_time_of_day_is_truncated() {
        let format = "%Y-%m-%d %H:%M";
        let mut source = RandomDate::new("2023-05-17 08:00", "2023-05-17 20:00", format, 3).unwrap();
        assert_eq!(
            source.produce_one(),
            Ok(GeneratedValue::String("2023-05-17 00:00".to_string()))
        );
    }

    #[test]
    fn test_invalid_bound() {
        assert!(RandomDate::new("2023-13-01", "2023-12-01", "%Y-%m-%d", 0).is_err());
    }

    #[test]
    fn test_deterministic_generation() {
        let mut source1 = RandomDate::new("2000-01-01", "2030-01-01", "%Y-%m-%d", 9).unwrap();
        let mut source2 = RandomDate::new("2000-01-01", "2030-01-01", "%Y-%m-%d", 9).unwrap();
        assert_eq!(source1.produce_one(), source2.produce_one());
    }
}
