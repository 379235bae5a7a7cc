//! The "produce next value" capability shared by every source backend.

use crate::dates::DateError;
use crate::schema::ValueKind;
use crate::values::GeneratedValue;
use std::fmt;

/// Why a source stopped producing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfDataCause {
    /// The cursor moved past the declared last row.
    Boundary { last_row: u32 },
    /// A run of consecutive empty cells was taken as the end of the data.
    Inferred { empty_run: u32 },
}

impl fmt::Display for EndOfDataCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boundary { last_row } => write!(f, "all rows up to #{last_row} have been read"),
            Self::Inferred { empty_run } => {
                write!(f, "inferred after {empty_run} consecutive empty cells")
            }
        }
    }
}

/// Error returned by [`ValueSource::produce_one`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReadError {
    /// No more data. Expected and terminal: callers stop reading.
    #[error("end of data: {cause}")]
    EndOfData { cause: EndOfDataCause },

    /// The backing cell holds a value of an incompatible type.
    #[error("type mismatch at row #{row}: expected {expected}, found {found}")]
    TypeMismatch {
        row: u32,
        expected: ValueKind,
        found: String,
    },

    /// A produced date could not be rendered.
    #[error(transparent)]
    Date(#[from] DateError),
}

impl ReadError {
    /// Whether this error signals the end of the data (explicit or inferred).
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, Self::EndOfData { .. })
    }
}

/// A backend producing one value per invocation.
pub trait ValueSource {
    /// Produce the next value.
    fn produce_one(&mut self) -> Result<GeneratedValue, ReadError>;
}
