//! In-memory spreadsheet grid handed to the file processor.

use std::fmt;

use chrono::NaiveDate;

/// One uploaded file: original name plus raw bytes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Whether the file name carries a delimited-text extension.
    pub fn is_delimited_text(&self) -> bool {
        let lower = self.name.to_lowercase();
        lower.ends_with(".csv") || lower.ends_with(".tsv")
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Native date value supplied by a programmatic caller
    Date(NaiveDate),
}

impl Cell {
    /// Whether the cell holds nothing a row can be keyed on.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(n) => *n == 0.0,
            Cell::Bool(b) => !b,
            Cell::Date(_) => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Number(f64::from(value))
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

/// Rectangular-ish grid of rows; the first row is the header.
///
/// Rows may be ragged. Missing trailing cells read as [`Cell::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    rows: Vec<Vec<Cell>>,
}

static EMPTY: Cell = Cell::Empty;

impl Sheet {
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Header row, if the sheet has any rows at all.
    pub fn header(&self) -> Option<&[Cell]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Rows after the header.
    pub fn data_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().skip(1).map(Vec::as_slice)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at `index` in `row`, or `Empty` past the end.
    pub fn cell(row: &[Cell], index: usize) -> &Cell {
        row.get(index).unwrap_or(&EMPTY)
    }
}

/// Build a sheet from literal rows.
///
/// ```
/// use page_expiry::sheet;
///
/// let grid = sheet![["Page URL", "Page Views"], ["/about", 10]];
/// assert_eq!(grid.row_count(), 2);
/// ```
#[macro_export]
macro_rules! sheet {
    ($([$($cell:expr),* $(,)?]),* $(,)?) => {
        $crate::models::Sheet::from_rows(vec![
            $(vec![$($crate::models::Cell::from($cell)),*]),*
        ])
    };
}
