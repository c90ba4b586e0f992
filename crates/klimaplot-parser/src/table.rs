/// Header-agnostic grid of cell texts as loaded from a logger export.
///
/// Rows keep their file order; empty or missing cells are represented by the
/// empty string. The grid is read-only after load: header detection works on
/// it and then re-derives a [`StructuredTable`] from the matched row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// A table with named columns: the rows below a known header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl StructuredTable {
    /// Re-derives a named-column table from `raw`, taking `header_row` as the
    /// header and everything below it as data. Data rows are padded or
    /// truncated to the column count. Returns `None` when `header_row` does
    /// not index a row of `raw`.
    pub fn from_raw(raw: &RawTable, header_row: usize) -> Option<Self> {
        let columns: Vec<String> = raw
            .rows()
            .get(header_row)?
            .iter()
            .map(|cell| cell.trim().to_string())
            .collect();
        let width = columns.len();

        let rows = raw.rows()[header_row + 1..]
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.resize(width, String::new());
                row
            })
            .collect();

        Some(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// All values of one column in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[index].as_str()).collect())
    }
}
