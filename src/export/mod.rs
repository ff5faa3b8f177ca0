//! Export module for Pocketbook
//!
//! - `workbook`: a small xlsx writer
//! - `layout`: the sheet layout shared with the importer
//! - `spreadsheet`: the ledger exporter

pub mod layout;
pub mod spreadsheet;
pub mod workbook;

pub use spreadsheet::{ExportArtifact, ExportData, SpreadsheetExporter};
pub use workbook::{sanitize_sheet_name, Cell, Workbook};
