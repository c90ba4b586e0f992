use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("unsupported table format '{extension}'")]
    UnsupportedFormat { extension: String },

    #[error("workbook could not be read: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("workbook contains no worksheets")]
    NoWorksheet,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{path} contains no rows")]
    EmptyTable { path: String },
}
