//! A1 notation
//!
//! Column indexes are 0-based (`0 -> A`), row numbers are 1-based as in the
//! Sheets UI.

/// `0 -> A`, `25 -> Z`, `26 -> AA`
pub fn column_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Inverse of [`column_letters`]; `None` for anything but ASCII letters
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

/// `'name'` with embedded quotes doubled
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Whole rows, e.g. `'Sheet1'!1:2`
pub fn rows_range(sheet: &str, first_row: usize, last_row: usize) -> String {
    format!("{}!{}:{}", quote_sheet_name(sheet), first_row, last_row)
}

/// From `A<first_row>` down to the bottom of the last column, e.g. `'Sheet1'!A2:C`
pub fn open_range(sheet: &str, first_row: usize, column_count: usize) -> String {
    format!(
        "{}!A{}:{}",
        quote_sheet_name(sheet),
        first_row,
        column_letters(column_count.saturating_sub(1))
    )
}

/// A single row span, e.g. `'Sheet1'!A1:C1`
pub fn row_span(sheet: &str, row: usize, column_count: usize) -> String {
    format!(
        "{}!A{}:{}{}",
        quote_sheet_name(sheet),
        row,
        column_letters(column_count.saturating_sub(1)),
        row
    )
}
