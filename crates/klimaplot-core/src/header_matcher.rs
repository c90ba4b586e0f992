use klimaplot_parser::RawTable;
use tracing::debug;

use crate::config::HeaderConfig;
use crate::fuzzy::find_best_match;

/// Locates the header row inside the unstructured leading block of a logger
/// export.
///
/// Rows are scanned top to bottom. A row containing any noise token as a
/// literal substring (case-sensitive) is disqualified before scoring; the
/// remaining rows are fuzzy-scored against the expected phrasings and the
/// first row reaching the configured threshold wins. Later rows are never
/// considered, even if they would score higher; logger exports restate units
/// below the real header, so the first qualifying row is the one that counts.
pub fn find_header_row(table: &RawTable, config: &HeaderConfig) -> Option<usize> {
    for (index, row) in table.rows().iter().enumerate() {
        let row_text = row.join(" ");

        if config
            .noise_tokens
            .iter()
            .any(|token| row_text.contains(token.as_str()))
        {
            continue;
        }

        let Some((candidate, score)) = find_best_match(&row_text, &config.expected_headers) else {
            continue;
        };
        if score >= config.match_threshold {
            debug!(row = index, score, candidate, "header row matched");
            return Some(index);
        }
    }
    None
}
