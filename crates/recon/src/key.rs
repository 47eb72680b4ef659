use crate::grid::Cell;

/// Canonical join key: textual form, trimmed, leading `'0'`s removed.
///
/// Keys compare as strings, so `"007A"` and `"7A"` match while `"07"` and
/// `"7.0"` do not. An all-zero identifier normalizes to `""`.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().trim_start_matches('0').to_string()
}

/// Key for a cell, or `None` when the cell is blank.
pub fn cell_key(cell: &Cell) -> Option<String> {
    if cell.is_blank() {
        None
    } else {
        Some(normalize_key(&cell.as_text()))
    }
}
