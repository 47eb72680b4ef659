//! Plain cell grids and merge-region flattening.
//!
//! A spreadsheet reader hands over the cell values as a rectangular grid and
//! the merged ranges separately. Only the top-left cell of a merged range
//! carries a value; [`flatten`] copies that value into every covered cell so
//! later stages can treat the grid as ordinary rows.

use serde::Serialize;

/// A single cell value as read from a sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Default for Cell {
    fn default() -> Self {
        Self::Empty
    }
}

impl Cell {
    /// Textual form used for header accumulation, key normalization and
    /// group ordering. Integral numbers print without a fractional part.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Self::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Inclusive, 0-based rectangle of merged cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergeRegion {
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
}

impl MergeRegion {
    pub fn new(min_row: usize, min_col: usize, max_row: usize, max_col: usize) -> Self {
        Self { min_row, min_col, max_row, max_col }
    }
}

/// Row-major rectangular grid of cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawGrid {
    rows: Vec<Vec<Cell>>,
    cols: usize,
}

impl RawGrid {
    /// Build a grid, padding short rows with `Cell::Empty` so every row has
    /// the width of the widest one.
    pub fn new(mut rows: Vec<Vec<Cell>>) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(cols, Cell::Empty);
        }
        Self { rows, cols }
    }

    /// Convenience constructor from string literals; `""` becomes empty.
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            rows.into_iter()
                .map(|r| r.into_iter().map(|s| Cell::from(s.as_ref())).collect())
                .collect(),
        )
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Drop the first `n` rows.
    pub fn skip_rows(mut self, n: usize) -> Self {
        let n = n.min(self.rows.len());
        self.rows.drain(..n);
        self
    }
}

/// Copy each merge region's top-left value into every cell of the region.
///
/// Regions are clipped to the grid; a region whose anchor lies outside the
/// grid is ignored. Flattening an already-flat grid (no regions) returns it
/// unchanged, and flattening twice with the same regions gives the same
/// grid as flattening once.
pub fn flatten(grid: &RawGrid, regions: &[MergeRegion]) -> RawGrid {
    let mut out = grid.clone();
    if out.rows.is_empty() || out.cols == 0 {
        return out;
    }
    let last_row = out.rows.len() - 1;
    let last_col = out.cols - 1;

    for region in regions {
        if region.min_row > last_row || region.min_col > last_col {
            continue;
        }
        // Read from the source grid, not `out`: a later region must not see
        // values spread by an earlier overlapping one.
        let anchor = grid.rows[region.min_row][region.min_col].clone();
        for row in region.min_row..=region.max_row.min(last_row) {
            for col in region.min_col..=region.max_col.min(last_col) {
                out.rows[row][col] = anchor.clone();
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_ragged_rows() {
        let grid = RawGrid::from_strings(vec![vec!["a", "b", "c"], vec!["d"]]);
        assert_eq!(grid.col_count(), 3);
        assert_eq!(grid.get(1, 2), Some(&Cell::Empty));
    }

    #[test]
    fn flatten_fills_region_with_anchor() {
        let grid = RawGrid::from_strings(vec![
            vec!["Turno", "", "x"],
            vec!["", "", "y"],
        ]);
        let out = flatten(&grid, &[MergeRegion::new(0, 0, 1, 1)]);
        for (r, c) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            assert_eq!(out.get(r, c), Some(&Cell::Text("Turno".into())));
        }
        assert_eq!(out.get(1, 2), Some(&Cell::Text("y".into())));
    }

    #[test]
    fn flatten_without_regions_is_identity() {
        let grid = RawGrid::from_strings(vec![vec!["a", ""], vec!["", "b"]]);
        assert_eq!(flatten(&grid, &[]), grid);
    }

    #[test]
    fn flatten_clips_out_of_range_regions() {
        let grid = RawGrid::from_strings(vec![vec!["a", ""], vec!["", ""]]);
        let out = flatten(
            &grid,
            &[MergeRegion::new(0, 0, 5, 9), MergeRegion::new(7, 7, 8, 8)],
        );
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.col_count(), 2);
        assert!(out.rows().iter().flatten().all(|c| *c == Cell::Text("a".into())));
    }

    #[test]
    fn number_text_form() {
        assert_eq!(Cell::Number(7.0).as_text(), "7");
        assert_eq!(Cell::Number(7.5).as_text(), "7.5");
        assert_eq!(Cell::Bool(true).as_text(), "TRUE");
        assert!(Cell::Text("  ".into()).is_blank());
        assert!(!Cell::Number(0.0).is_blank());
    }
}
