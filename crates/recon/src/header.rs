//! Composite header discovery.
//!
//! Department sheets put their header across several physical rows (a group
//! caption above, the column caption below, sometimes a unit line under
//! that) and at different row offsets per file. The locator folds the first
//! rows into one label per column until enough labels mention a target
//! token.
//!
//! Matching is plain, case-sensitive substring containment. A label that
//! happens to contain an unrelated token still counts; the projector's column
//! renaming relies on the same convention.

use serde::Serialize;

use crate::grid::RawGrid;

/// Default number of leading rows scanned for header fragments.
pub const DEFAULT_SCAN_DEPTH: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeHeader {
    /// One label per grid column; empty when no fragment was found.
    pub labels: Vec<String>,
    /// Index of the last row folded into the header.
    pub last_row: usize,
}

impl CompositeHeader {
    /// First row holding data.
    pub fn data_start(&self) -> usize {
        self.last_row + 1
    }
}

/// Scan rows `0..min(scan_depth, row_count)` accumulating per-column labels.
///
/// Scanning stops at the first row after which the number of labels that
/// contain at least one token reaches the number of tokens; that row is the
/// header's last row. If the limit is reached without satisfying the
/// condition, `last_row` falls back to 0 while `labels` keeps everything
/// accumulated from the scanned rows.
pub fn locate_header<S: AsRef<str>>(grid: &RawGrid, tokens: &[S], scan_depth: usize) -> CompositeHeader {
    let mut labels = vec![String::new(); grid.col_count()];
    let mut last_row = 0;

    let limit = scan_depth.min(grid.row_count());
    for (row_idx, row) in grid.rows().iter().take(limit).enumerate() {
        for (label, cell) in labels.iter_mut().zip(row) {
            let text = cell.as_text();
            let fragment = text.trim();
            if fragment.is_empty() {
                continue;
            }
            if !label.is_empty() {
                label.push(' ');
            }
            label.push_str(fragment);
        }

        let found = labels
            .iter()
            .filter(|label| tokens.iter().any(|t| label.contains(t.as_ref())))
            .count();
        if found >= tokens.len() {
            last_row = row_idx;
            log::debug!("header complete at row {row_idx}: {found} labels matched");
            break;
        }
    }

    CompositeHeader { labels, last_row }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_row_header() {
        let grid = RawGrid::from_strings(vec![vec!["A", "B"], vec!["1", "2"]]);
        let header = locate_header(&grid, &["A", "B"], DEFAULT_SCAN_DEPTH);
        assert_eq!(header.labels, vec!["A", "B"]);
        assert_eq!(header.last_row, 0);
        assert_eq!(header.data_start(), 1);
    }

    #[test]
    fn accumulates_across_rows() {
        let grid = RawGrid::from_strings(vec![vec!["Reg", ""], vec!["", "Nome empregado"]]);
        let header = locate_header(&grid, &["Reg", "Nome empregado"], DEFAULT_SCAN_DEPTH);
        assert_eq!(header.labels, vec!["Reg", "Nome empregado"]);
        assert_eq!(header.last_row, 1);
    }

    #[test]
    fn fragments_are_space_joined_in_row_order() {
        let grid = RawGrid::from_strings(vec![
            vec!["Relatório de HE", "", ""],
            vec!["", "Transporte", ""],
            vec!["Reg.", "  Optante de transporte ", "Nome empregado"],
            vec!["00012", "SIM", "Ana"],
        ]);
        let tokens = ["Reg.", "Optante de transporte", "Nome empregado"];
        let header = locate_header(&grid, &tokens, DEFAULT_SCAN_DEPTH);
        assert_eq!(
            header.labels,
            vec![
                "Relatório de HE Reg.",
                "Transporte Optante de transporte",
                "Nome empregado",
            ]
        );
        assert_eq!(header.last_row, 2);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let grid = RawGrid::from_strings(vec![vec!["reg.", "Turno"], vec!["1", "A"]]);
        let header = locate_header(&grid, &["Reg.", "Turno"], DEFAULT_SCAN_DEPTH);
        // Only one label matches, so the scan runs out and falls back.
        assert_eq!(header.last_row, 0);
        assert_eq!(header.labels, vec!["reg. 1", "Turno A"]);
    }

    #[test]
    fn exhausted_scan_falls_back_to_row_zero() {
        let rows: Vec<Vec<&str>> = (0..20).map(|_| vec!["x", ""]).collect();
        let grid = RawGrid::from_strings(rows);
        let header = locate_header(&grid, &["Reg."], 3);
        assert_eq!(header.last_row, 0);
        assert_eq!(header.labels, vec!["x x x", ""]);
    }

    #[test]
    fn numeric_cells_contribute_their_text() {
        let grid = RawGrid::new(vec![vec![crate::grid::Cell::Number(2024.0), "Turno".into()]]);
        let header = locate_header(&grid, &["Turno"], DEFAULT_SCAN_DEPTH);
        assert_eq!(header.labels, vec!["2024", "Turno"]);
    }

    #[test]
    fn empty_grid() {
        let header = locate_header(&RawGrid::default(), &["Reg."], DEFAULT_SCAN_DEPTH);
        assert!(header.labels.is_empty());
        assert_eq!(header.last_row, 0);
    }
}
