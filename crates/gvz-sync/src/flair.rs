//! Flair: an optional `[tag]` name prefix marking which spreadsheets are
//! databases

/// `[tag]` prefix, or `None` when no flair is set
pub fn prefix(flair: Option<&str>) -> Option<String> {
    flair.filter(|f| !f.is_empty()).map(|f| format!("[{}]", f))
}

/// Whether a spreadsheet named `name` counts as a database
pub fn matches(flair: Option<&str>, name: &str) -> bool {
    match prefix(flair) {
        Some(prefix) => name.starts_with(&prefix),
        None => true,
    }
}

/// Title for a new spreadsheet: `[tag] name`
pub fn apply(flair: Option<&str>, name: &str) -> String {
    match prefix(flair) {
        Some(prefix) => format!("{} {}", prefix, name),
        None => name.to_string(),
    }
}
