//! Pipeline entry points for page processing.
//!
//! - `read_sheet`: Decode an uploaded workbook or CSV into a cell grid
//! - `ColumnMap`: Locate role columns in the header row
//! - `FileProcessor`: Classify every row and aggregate the run

pub mod columns;
pub mod process;
pub mod reader;

pub use columns::ColumnMap;
pub use process::{FileProcessor, summarize};
pub use reader::read_sheet;
