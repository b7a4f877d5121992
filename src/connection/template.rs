// src/connection/template.rs

//! Pure template rendering used to build CLI invocations.
//!
//! Two placeholder dialects are understood, matching what settings files
//! already contain:
//!
//! - brace placeholders (`{host}`, `{0}`, `{}`), with `{{` / `}}` as literal
//!   braces; used by the `args` template and the `show records` query.
//! - a `%s` placeholder (`%%` is a literal `%`); used by `desc table`.

use std::collections::BTreeMap;

use crate::errors::{Result, SqlToolsError};

/// A brace placeholder as it appears in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder<'a> {
    /// `{host}`
    Named(&'a str),
    /// `{0}`, or `{}` with automatic numbering.
    Index(usize),
}

/// Render a brace template, asking `lookup` for the value of every
/// placeholder. A placeholder without a value is an error.
///
/// Anything after `:` or `!` inside the braces (a format spec or conversion)
/// is ignored.
pub fn render<'t, F>(template: &'t str, mut lookup: F) -> Result<String>
where
    F: FnMut(Placeholder<'t>) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut auto_index = 0usize;
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            return Err(SqlToolsError::Template(format!(
                "single '}}' encountered in template {template:?}"
            )));
        }

        let close = tail.find('}').ok_or_else(|| {
            SqlToolsError::Template(format!("unclosed '{{' in template {template:?}"))
        })?;
        let field = &tail[1..close];
        let key = field.split([':', '!']).next().unwrap_or_default().trim();

        let placeholder = if key.is_empty() {
            let idx = auto_index;
            auto_index += 1;
            Placeholder::Index(idx)
        } else if let Ok(idx) = key.parse::<usize>() {
            Placeholder::Index(idx)
        } else {
            Placeholder::Named(key)
        };

        let value = lookup(placeholder).ok_or_else(|| {
            SqlToolsError::Template(format!(
                "no value for placeholder {{{key}}} in template {template:?}"
            ))
        })?;
        out.push_str(&value);
        rest = &tail[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Render a template whose placeholders are all named.
pub fn render_named(template: &str, fields: &BTreeMap<&str, String>) -> Result<String> {
    render(template, |p| match p {
        Placeholder::Named(name) => fields.get(name).cloned(),
        Placeholder::Index(_) => None,
    })
}

/// Render a template whose placeholders are all positional.
pub fn render_positional(template: &str, values: &[&str]) -> Result<String> {
    render(template, |p| match p {
        Placeholder::Index(i) => values.get(i).map(|v| v.to_string()),
        Placeholder::Named(_) => None,
    })
}

/// Replace every `%s` with `value`; `%%` becomes `%`. Other `%` sequences are
/// kept as written.
pub fn render_percent(template: &str, value: &str) -> String {
    let mut out = String::with_capacity(template.len() + value.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('s') => {
                chars.next();
                out.push_str(value);
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }

    out
}

/// Split a rendered argument string into words using shell quoting rules.
pub fn split_args(rendered: &str) -> Result<Vec<String>> {
    shlex::split(rendered).ok_or_else(|| {
        SqlToolsError::Template(format!(
            "cannot split arguments {rendered:?}: unbalanced quotes or trailing escape"
        ))
    })
}

/// Build the full argument vector for one CLI run.
///
/// `[cli_path] + options + split(render(args_template, fields))`
pub fn build_args(
    cli_path: &str,
    options: &[String],
    args_template: &str,
    fields: &BTreeMap<&str, String>,
) -> Result<Vec<String>> {
    let mut args = Vec::with_capacity(1 + options.len() + 8);
    args.push(cli_path.to_string());
    args.extend(options.iter().cloned());

    let rendered = render_named(args_template, fields)?;
    args.extend(split_args(&rendered)?);

    Ok(args)
}
