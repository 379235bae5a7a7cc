//! Worksheet access.
//!
//! The column source only needs row/column counts and typed, 1-based cell
//! reads with a distinguishable empty value. [`Worksheet`] captures that;
//! [`CalamineSheet`] implements it over any workbook calamine can open.

use crate::error::XlsxSourceError;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use template_core::{GeneratedValue, ValueKind};
use tracing::debug;

/// Typed content of one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    /// Dates, durations, error cells
    Other(&'static str),
}

impl CellValue {
    /// Check if this cell is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Name of the cell's underlying type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
            Self::String(_) => "string",
            Self::Other(name) => name,
        }
    }

    /// Convert to a value of `kind`, or `None` when the types are incompatible.
    ///
    /// Spreadsheets commonly store whole numbers as floats, so `int` accepts
    /// floats without a fractional part and `double` accepts integers.
    pub fn coerce(&self, kind: ValueKind) -> Option<GeneratedValue> {
        match (kind, self) {
            (ValueKind::Int, Self::Int(i)) => Some(GeneratedValue::Int(*i)),
            (ValueKind::Int, Self::Float(f))
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Some(GeneratedValue::Int(*f as i64))
            }
            (ValueKind::Double, Self::Float(f)) => Some(GeneratedValue::Float(*f)),
            (ValueKind::Double, Self::Int(i)) => Some(GeneratedValue::Float(*i as f64)),
            (ValueKind::Bool, Self::Bool(b)) => Some(GeneratedValue::Bool(*b)),
            (ValueKind::String, Self::String(s)) => Some(GeneratedValue::String(s.clone())),
            _ => None,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Self::Empty,
            Data::Int(i) => Self::Int(*i),
            Data::Float(f) => Self::Float(*f),
            Data::Bool(b) => Self::Bool(*b),
            Data::String(s) => Self::String(s.clone()),
            Data::DateTime(_) | Data::DateTimeIso(_) => Self::Other("datetime"),
            Data::DurationIso(_) => Self::Other("duration"),
            Data::Error(_) => Self::Other("error"),
        }
    }
}

/// Read access to one worksheet.
pub trait Worksheet {
    /// Index of the last used row (1-based), 0 for an empty sheet.
    fn row_count(&self) -> u32;

    /// Index of the last used column (1-based), 0 for an empty sheet.
    fn column_count(&self) -> u32;

    /// Cell at 1-based `row` and `column`; cells outside the data are empty.
    fn cell(&self, row: u32, column: u32) -> CellValue;
}

/// Worksheet loaded into memory by calamine.
///
/// The cell data is owned exclusively; the workbook file is closed once the
/// sheet has been read.
pub struct CalamineSheet {
    cells: calamine::Range<Data>,
}

impl CalamineSheet {
    /// Open `path` and load the sheet named `sheet`.
    pub fn open(path: &Path, sheet: &str) -> Result<Self, XlsxSourceError> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| XlsxSourceError::ResourceNotFound {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if !workbook.sheet_names().iter().any(|name| name == sheet) {
            return Err(XlsxSourceError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: sheet.to_string(),
            });
        }

        let cells =
            workbook
                .worksheet_range(sheet)
                .map_err(|e| XlsxSourceError::ResourceNotFound {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
        debug!(
            "Loaded sheet '{}' from {} ({:?} used cells)",
            sheet,
            path.display(),
            cells.get_size()
        );

        Ok(Self { cells })
    }
}

impl Worksheet for CalamineSheet {
    fn row_count(&self) -> u32 {
        self.cells.end().map_or(0, |(row, _)| row + 1)
    }

    fn column_count(&self) -> u32 {
        self.cells.end().map_or(0, |(_, column)| column + 1)
    }

    fn cell(&self, row: u32, column: u32) -> CellValue {
        if row == 0 || column == 0 {
            return CellValue::Empty;
        }
        self.cells
            .get_value((row - 1, column - 1))
            .map_or(CellValue::Empty, CellValue::from)
    }
}

/// 1-based index of a column reference such as `"A"` or `"AB"`.
///
/// Returns `None` for anything but ASCII letters.
pub fn column_index(column: &str) -> Option<u32> {
    if column.is_empty() {
        return None;
    }
    column.chars().try_fold(0u32, |index, c| {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        index.checked_mul(26)?.checked_add(digit)
    })
}

/// Column letters of a 1-based column index; the inverse of [`column_index`].
pub fn column_name(mut index: u32) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// In-memory worksheet for tests.
#[cfg(test)]
pub(crate) struct MemorySheet {
    pub rows: Vec<Vec<CellValue>>,
}

#[cfg(test)]
impl Worksheet for MemorySheet {
    fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    fn column_count(&self) -> u32 {
        self.rows.iter().map(Vec::len).max().unwrap_or(0) as u32
    }

    fn cell(&self, row: u32, column: u32) -> CellValue {
        if row == 0 || column == 0 {
            return CellValue::Empty;
        }
        self.rows
            .get(row as usize - 1)
            .and_then(|cells| cells.get(column as usize - 1))
            .cloned()
            .unwrap_or(CellValue::Empty)
    }
}

/// Write a workbook whose data does not start at A1.
///
/// Sheet `People`, used range C3:D5:
///
/// | row | C       | D    |
/// |-----|---------|------|
/// | 3   | "alice" | 30   |
/// | 4   | "bob"   | 41   |
/// | 5   | 3.5     |      |
#[cfg(test)]
pub(crate) fn write_people_workbook(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("people.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("People").unwrap();
    worksheet.write_string(2, 2, "alice").unwrap();
    worksheet.write_string(3, 2, "bob").unwrap();
    worksheet.write_number(4, 2, 3.5).unwrap();
    worksheet.write_number(2, 3, 30).unwrap();
    worksheet.write_number(3, 3, 41).unwrap();
    workbook.save(&path).unwrap();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A"), Some(1));
        assert_eq!(column_index("z"), Some(26));
        assert_eq!(column_index("AA"), Some(27));
        assert_eq!(column_index("XFD"), Some(16384));
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);
    }

    #[test]
    fn test_column_name() {
        for index in [1, 26, 27, 52, 703, 16384] {
            assert_eq!(column_index(&column_name(index)), Some(index));
        }
        assert_eq!(column_name(28), "AB");
        assert_eq!(column_name(0), "");
    }

    #[test]
    fn test_coerce_int() {
        assert_eq!(
            CellValue::Float(42.0).coerce(ValueKind::Int),
            Some(GeneratedValue::Int(42))
        );
        assert_eq!(CellValue::Float(4.5).coerce(ValueKind::Int), None);
        assert_eq!(CellValue::String("4".into()).coerce(ValueKind::Int), None);
    }

    #[test]
    fn test_coerce_double_and_bool() {
        assert_eq!(
            CellValue::Int(3).coerce(ValueKind::Double),
            Some(GeneratedValue::Float(3.0))
        );
        assert_eq!(
            CellValue::Bool(true).coerce(ValueKind::Bool),
            Some(GeneratedValue::Bool(true))
        );
        assert_eq!(CellValue::Int(1).coerce(ValueKind::Bool), None);
        assert_eq!(CellValue::Other("datetime").coerce(ValueKind::String), None);
    }

    #[test]
    fn test_open_missing_workbook() {
        let result = CalamineSheet::open(Path::new("/nonexistent/book.xlsx"), "Sheet1");
        assert!(matches!(
            result,
            Err(XlsxSourceError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn test_open_corrupt_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        let result = CalamineSheet::open(&path, "Sheet1");
        assert!(matches!(
            result,
            Err(XlsxSourceError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn test_calamine_sheet_absolute_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_people_workbook(dir.path());
        let sheet = CalamineSheet::open(&path, "People").unwrap();

        assert_eq!(sheet.row_count(), 5);
        assert_eq!(sheet.column_count(), 4);
        assert_eq!(sheet.cell(3, 3), CellValue::String("alice".to_string()));
        assert_eq!(sheet.cell(4, 3), CellValue::String("bob".to_string()));
        assert_eq!(sheet.cell(3, 4).coerce(ValueKind::Int), Some(GeneratedValue::Int(30)));
        assert_eq!(sheet.cell(5, 4), CellValue::Empty);
        // Outside the used range
        assert_eq!(sheet.cell(1, 1), CellValue::Empty);
        assert_eq!(sheet.cell(2, 3), CellValue::Empty);
        assert_eq!(sheet.cell(6, 3), CellValue::Empty);
        assert_eq!(sheet.cell(0, 3), CellValue::Empty);
    }

    #[test]
    fn test_open_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_people_workbook(dir.path());

        let result = CalamineSheet::open(&path, "Sheet1");
        assert!(matches!(
            result,
            Err(XlsxSourceError::SheetNotFound { sheet, .. }) if sheet == "Sheet1"
        ));
    }

    #[test]
    fn test_memory_sheet_bounds() {
        let sheet = MemorySheet {
            rows: vec![vec![CellValue::Int(1)], vec![CellValue::Int(2), CellValue::Bool(true)]],
        };
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.column_count(), 2);
        assert_eq!(sheet.cell(1, 2), CellValue::Empty);
        assert_eq!(sheet.cell(3, 1), CellValue::Empty);
        assert_eq!(sheet.cell(2, 2), CellValue::Bool(true));
    }
}
