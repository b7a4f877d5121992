// src/engine/results.rs

/// Extract names from `|`-delimited CLI output.
///
/// Field 1 of every line is trimmed and kept; lines with fewer than two
/// fields (headers, separators, blank lines) are skipped.
///
/// ```
/// use sqltools::engine::result_as_list;
///
/// assert_eq!(result_as_list("col1|id|int\nbadline"), vec!["id".to_string()]);
/// ```
pub fn result_as_list(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.split('|').nth(1))
        .map(|field| field.trim().to_string())
        .collect()
}
