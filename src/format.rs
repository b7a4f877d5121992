// src/format.rs

//! SQL pretty-printing on top of `sqlformat`.

use sqlformat::{FormatOptions, Indent, QueryParams};

use crate::config::model::FormatSettings;
use crate::types::KeywordCase;

/// Format `raw` according to `[settings.format]`.
pub fn format_sql(raw: &str, settings: &FormatSettings) -> String {
    let indent = if settings.indent_tabs {
        Indent::Tabs
    } else {
        Indent::Spaces(settings.indent_width)
    };

    let uppercase = match settings.keyword_case {
        KeywordCase::Upper => Some(true),
        KeywordCase::Lower => Some(false),
        KeywordCase::Preserve => None,
    };

    let options = FormatOptions {
        indent,
        uppercase,
        lines_between_queries: settings.lines_between_queries,
        ..FormatOptions::default()
    };

    let mut formatted = sqlformat::format(raw, &QueryParams::None, &options);
    if settings.ensure_newline_at_eof && !formatted.ends_with('\n') {
        formatted.push('\n');
    }
    formatted
}
