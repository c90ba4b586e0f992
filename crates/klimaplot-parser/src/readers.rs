use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use csv::ReaderBuilder;

use crate::errors::ReaderError;
use crate::table::RawTable;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Reads a logger export into a header-agnostic [`RawTable`].
///
/// Dispatch is by file extension: workbook formats go through calamine,
/// plain-text exports through the CSV reader. Anything else is rejected as
/// unsupported rather than guessed at.
pub fn read_table_file(path: &Path) -> Result<RawTable, ReaderError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let table = if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        read_spreadsheet_table(path)?
    } else if extension == "csv" || extension == "txt" {
        read_csv_table(path)?
    } else {
        return Err(ReaderError::UnsupportedFormat { extension });
    };

    if table.is_empty() {
        return Err(ReaderError::EmptyTable {
            path: path.display().to_string(),
        });
    }
    Ok(table)
}

/// Loads the first worksheet of an XLSX/XLS/ODS workbook.
pub fn read_spreadsheet_table(path: &Path) -> Result<RawTable, ReaderError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ReaderError::NoWorksheet)??;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    Ok(RawTable::new(rows))
}

pub fn read_csv_table(path: &Path) -> Result<RawTable, ReaderError> {
    let contents = std::fs::read_to_string(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(sniff_delimiter(&contents))
        .from_reader(contents.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }
    Ok(RawTable::new(rows))
}

// Logger firmware disagrees on the list separator, and the first lines are
// usually prose metadata, so the whole export votes.
fn sniff_delimiter(contents: &str) -> u8 {
    let semicolons = contents.matches(';').count();
    let commas = contents.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

fn cell_text(cell: &Data) -> String {
    if cell.is_empty() {
        String::new()
    } else {
        cell.as_string()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("{}", cell))
    }
}
