use klimaplot_parser::StructuredTable;

use crate::config::VariantConfig;

/// Column names resolved for one chartable table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    pub timestamp: String,
    pub temperature: String,
    pub humidity: String,
}

/// Resolves the measurement columns by naming-variant containment.
///
/// No fuzzy scoring here: the header text is known-clean once the header row
/// has been matched, so substring containment suffices. The first column in
/// column order containing any variant wins its role; `None` when either
/// measurement role has no candidate. The timestamp column falls back to the
/// first column of the table.
pub fn resolve_columns(table: &StructuredTable, variants: &VariantConfig) -> Option<ColumnBinding> {
    let temperature = first_matching_column(table, &variants.temperature)?;
    let humidity = first_matching_column(table, &variants.humidity)?;
    let timestamp = first_matching_column(table, &variants.timestamp)
        .or_else(|| table.columns().first().cloned())?;

    Some(ColumnBinding {
        timestamp,
        temperature,
        humidity,
    })
}

fn first_matching_column(table: &StructuredTable, variants: &[String]) -> Option<String> {
    table
        .columns()
        .iter()
        .find(|name| variants.iter().any(|variant| name.contains(variant.as_str())))
        .cloned()
}
