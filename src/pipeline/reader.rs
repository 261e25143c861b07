// src/pipeline/reader.rs

//! Decodes uploaded files into a cell grid.
//!
//! Workbooks (xlsx, xlsm, xlsb, xls, ods) go through calamine and only the
//! first worksheet is read. Files named `*.csv` / `*.tsv` are read as
//! delimited text.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use crate::error::{AppError, Result};
use crate::models::{Cell, Sheet, UploadedFile};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode an uploaded file into a grid whose first row is the header.
pub fn read_sheet(file: &UploadedFile) -> Result<Sheet> {
    if file.is_delimited_text() {
        let delimiter = if file.name.to_lowercase().ends_with(".tsv") {
            b'\t'
        } else {
            b','
        };
        read_delimited(&file.bytes, delimiter)
    } else {
        read_workbook(&file.bytes)
    }
}

fn read_workbook(bytes: &[u8]) -> Result<Sheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::spreadsheet("workbook contains no worksheets"))??;

    let rows = range
        .rows()
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();
    Ok(Sheet::from_rows(rows))
}

/// Map a calamine value onto a grid cell.
///
/// Date-formatted cells keep their serial number so they decode through the
/// same legacy serial rules as plain numeric dates.
fn workbook_cell(value: &Data) -> Cell {
    match value {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
    }
}

fn read_delimited(bytes: &[u8], delimiter: u8) -> Result<Sheet> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(Sheet::from_rows(rows))
}
