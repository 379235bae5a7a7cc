//! Value sources for the different `+source` types.
//!
//! Each template leaf gets one [`Source`], built from its validated
//! [`SourceConfig`]. All variants share the [`ValueSource`] capability.

pub mod constant;
pub mod date;
pub mod numeric;

pub use constant::DefaultSource;
pub use date::RandomDate;
pub use numeric::{RandomDouble, RandomInt};

use http_stream_xlsx_source::{XlsxColumnSource, XlsxSourceError};
use rand::Rng;
use template_core::{DateError, GeneratedValue, ReadError, SourceConfig, ValueSource};

/// Error type for source construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    /// Spreadsheet could not be opened or addressed
    #[error(transparent)]
    Xlsx(#[from] XlsxSourceError),

    /// Date bounds or format unusable
    #[error(transparent)]
    Date(#[from] DateError),

    /// Range too wide to sample uniformly
    #[error("Range [{lower}, {upper}] is too wide to sample")]
    InvalidRange { lower: f64, upper: f64 },
}

/// A value source of any supported type.
pub enum Source {
    /// Literal value
    Default(DefaultSource),
    /// `rand-int`
    RandomInt(RandomInt),
    /// `rand-double`
    RandomDouble(RandomDouble),
    /// `rand-date`
    RandomDate(RandomDate),
    /// `xlsx`
    Xlsx(XlsxColumnSource),
}

impl Source {
    /// Create the source described by `config`.
    ///
    /// Random sources get their own generator, seeded from `seeder`.
    pub fn from_config<R: Rng>(config: &SourceConfig, seeder: &mut R) -> Result<Self, SourceError> {
        let source = match config {
            SourceConfig::RandInt { range } => Self::RandomInt(RandomInt::new(*range, seeder.gen())),
            SourceConfig::RandDouble { range } => {
                Self::RandomDouble(RandomDouble::new(*range, seeder.gen())?)
            }
            SourceConfig::RandDate { begin, end, format } => {
                Self::RandomDate(RandomDate::new(begin, end, format, seeder.gen())?)
            }
            SourceConfig::Xlsx(xlsx) => Self::Xlsx(XlsxColumnSource::open(xlsx)?),
        };
        Ok(source)
    }

    /// Short name of the source type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Default(_) => "default",
            Self::RandomInt(_) => "rand-int",
            Self::RandomDouble(_) => "rand-double",
            Self::RandomDate(_) => "rand-date",
            Self::Xlsx(_) => "xlsx",
        }
    }
}

impl ValueSource for Source {
    fn produce_one(&mut self) -> Result<GeneratedValue, ReadError> {
        match self {
            Self::Default(source) => source.produce_one(),
            Self::RandomInt(source) => source.produce_one(),
            Self::RandomDouble(source) => source.produce_one(),
            Self::RandomDate(source) => source.produce_one(),
            Self::Xlsx(source) => source.produce_one(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_stream_xlsx_source::XlsxSourceError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::PathBuf;
    use template_core::{Range, ValueKind, XlsxConfig};

    #[test]
    fn test_from_config_random_sources() {
        let mut seeder = StdRng::seed_from_u64(42);

        let mut int_source = Source::from_config(
            &SourceConfig::RandInt {
                range: Range::new(3, 3),
            },
            &mut seeder,
        )
        .unwrap();
        assert_eq!(int_source.type_name(), "rand-int");
        assert_eq!(int_source.produce_one(), Ok(GeneratedValue::Int(3)));

        let date_source = Source::from_config(
            &SourceConfig::RandDate {
                begin: "2020-01-01".to_string(),
                end: "2020-01-31".to_string(),
                format: "%Y-%m-%d".to_string(),
            },
            &mut seeder,
        )
        .unwrap();
        assert_eq!(date_source.type_name(), "rand-date");
    }

    #[test]
    fn test_from_config_rejects_unusable_double_range() {
        let mut seeder = StdRng::seed_from_u64(42);
        let result = Source::from_config(
            &SourceConfig::RandDouble {
                range: Range::new(-f64::MAX, f64::MAX),
            },
            &mut seeder,
        );
        assert!(matches!(result, Err(SourceError::InvalidRange { .. })));
    }

    #[test]
    fn test_from_config_missing_workbook() {
        let mut seeder = StdRng::seed_from_u64(42);
        let result = Source::from_config(
            &SourceConfig::Xlsx(XlsxConfig {
                path: PathBuf::from("/nonexistent/book.xlsx"),
                sheet: "Sheet1".to_string(),
                column: "A".to_string(),
                rows: Range::new(1, 10),
                vtype: ValueKind::Int,
            }),
            &mut seeder,
        );
        assert!(matches!(
            result,
            Err(SourceError::Xlsx(XlsxSourceError::ResourceNotFound { .. }))
        ));
    }
}
