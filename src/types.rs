use serde::Deserialize;

/// Keyword casing applied by the SQL formatter.
///
/// - `Upper`: `select` → `SELECT` (default)
/// - `Lower`: `SELECT` → `select`
/// - `Preserve`: keywords are left as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCase {
    Upper,
    Lower,
    #[serde(alias = "none")]
    Preserve,
}

impl Default for KeywordCase {
    fn default() -> Self {
        KeywordCase::Upper
    }
}

/// The built-in query templates every database type may define.
///
/// The string form is the key used under `[kinds.<type>.queries]`, kept
/// identical to the names used by existing settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryName {
    /// List tables (`desc`).
    Tables,
    /// List columns (`columns`).
    Columns,
    /// Preview rows of a table (`show records`).
    ShowRecords,
    /// Describe a table (`desc table`).
    DescTable,
}

impl QueryName {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryName::Tables => "desc",
            QueryName::Columns => "columns",
            QueryName::ShowRecords => "show records",
            QueryName::DescTable => "desc table",
        }
    }
}

impl std::fmt::Display for QueryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
