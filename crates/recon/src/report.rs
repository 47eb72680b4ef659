//! Sectioned report layout.
//!
//! The renderer turns each block into sheet rows verbatim, so the block
//! sequence fixes the layout: a shift label, one blank row, then per route a
//! repeated column header, the route's passengers and two blank rows.

use serde::Serialize;

use crate::roster::{RosterEntry, ROSTER_COLUMNS};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportBlock {
    ShiftSeparator { label: String },
    BlankRow { count: usize },
    HeaderRow { columns: Vec<String> },
    DataRows { entries: Vec<RosterEntry> },
}

impl ReportBlock {
    /// Number of sheet rows the block occupies.
    pub fn row_span(&self) -> usize {
        match self {
            Self::ShiftSeparator { .. } | Self::HeaderRow { .. } => 1,
            Self::BlankRow { count } => *count,
            Self::DataRows { entries } => entries.len(),
        }
    }
}

pub fn shift_label(turno: &str) -> String {
    format!("Turno: {turno}")
}

fn header_row() -> ReportBlock {
    ReportBlock::HeaderRow {
        columns: ROSTER_COLUMNS.iter().map(|c| c.to_string()).collect(),
    }
}

/// Group matched entries by shift, then route, both in ascending text order.
///
/// Entries with a blank `Turno` belong to no shift and are left out. The sort
/// is stable, so entries sharing a route keep their roster order.
pub fn build_blocks(mut matched: Vec<RosterEntry>) -> Vec<ReportBlock> {
    matched.retain(|e| {
        let keep = !e.turno.is_blank();
        if !keep {
            log::debug!("no shift for registro {:?}, left out of the report", e.key);
        }
        keep
    });
    matched.sort_by_cached_key(|e| (e.turno_text(), e.itinerario_text()));

    let mut blocks = Vec::new();
    let mut rest = matched.as_slice();
    while let Some(first) = rest.first() {
        let turno = first.turno_text();
        let shift_len = rest.iter().take_while(|e| e.turno_text() == turno).count();
        let (shift, tail) = rest.split_at(shift_len);
        rest = tail;

        blocks.push(ReportBlock::ShiftSeparator { label: shift_label(&turno) });
        blocks.push(ReportBlock::BlankRow { count: 1 });

        let mut routes = shift;
        while let Some(route_first) = routes.first() {
            let itinerario = route_first.itinerario_text();
            let route_len = routes
                .iter()
                .take_while(|e| e.itinerario_text() == itinerario)
                .count();
            let (route, route_tail) = routes.split_at(route_len);
            routes = route_tail;

            blocks.push(header_row());
            blocks.push(ReportBlock::DataRows { entries: route.to_vec() });
            blocks.push(ReportBlock::BlankRow { count: 2 });
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn entry(turno: &str, itinerario: Cell, registro: &str) -> RosterEntry {
        RosterEntry::from_cells([
            Cell::Empty,
            turno.into(),
            itinerario,
            registro.into(),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
        ])
    }

    fn keys(block: &ReportBlock) -> Vec<String> {
        match block {
            ReportBlock::DataRows { entries } => {
                entries.iter().map(|e| e.key.clone().unwrap()).collect()
            }
            other => panic!("expected data rows, got {other:?}"),
        }
    }

    #[test]
    fn routes_sorted_within_shift() {
        let blocks = build_blocks(vec![
            entry("A", "2".into(), "1"),
            entry("A", "1".into(), "2"),
        ]);
        assert_eq!(blocks.len(), 8);
        assert_eq!(blocks[0], ReportBlock::ShiftSeparator { label: "Turno: A".into() });
        assert_eq!(blocks[1], ReportBlock::BlankRow { count: 1 });
        assert!(matches!(blocks[2], ReportBlock::HeaderRow { .. }));
        assert_eq!(keys(&blocks[3]), vec!["2"]);
        assert_eq!(blocks[4], ReportBlock::BlankRow { count: 2 });
        assert!(matches!(blocks[5], ReportBlock::HeaderRow { .. }));
        assert_eq!(keys(&blocks[6]), vec!["1"]);
        assert_eq!(blocks[7], ReportBlock::BlankRow { count: 2 });
    }

    #[test]
    fn header_row_carries_roster_columns() {
        let blocks = build_blocks(vec![entry("B", "1".into(), "5")]);
        match &blocks[2] {
            ReportBlock::HeaderRow { columns } => {
                assert_eq!(columns.len(), 8);
                assert_eq!(columns[2], "Itinerário");
            }
            other => panic!("unexpected block {other:?}"),
        }
    }

    #[test]
    fn shifts_in_text_order_and_route_order_kept() {
        let blocks = build_blocks(vec![
            entry("Noite", "3".into(), "1"),
            entry("Manhã", "3".into(), "2"),
            entry("Noite", "3".into(), "3"),
            entry("Manhã", "3".into(), "4"),
        ]);
        let labels: Vec<_> = blocks
            .iter()
            .filter_map(|b| match b {
                ReportBlock::ShiftSeparator { label } => Some(label.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["Turno: Manhã", "Turno: Noite"]);
        assert_eq!(keys(&blocks[3]), vec!["2", "4"]);
        assert_eq!(keys(&blocks[8]), vec!["1", "3"]);
    }

    #[test]
    fn numeric_routes_order_as_text() {
        let blocks = build_blocks(vec![
            entry("A", Cell::Number(10.0), "1"),
            entry("A", Cell::Number(9.0), "2"),
        ]);
        // "10" < "9" as text.
        assert_eq!(keys(&blocks[3]), vec!["1"]);
        assert_eq!(keys(&blocks[6]), vec!["2"]);
    }

    #[test]
    fn blank_shift_is_left_out() {
        let blocks = build_blocks(vec![
            entry("", "1".into(), "1"),
            entry("B", "1".into(), "2"),
            entry("  ", "2".into(), "3"),
        ]);
        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks[0], ReportBlock::ShiftSeparator { label: "Turno: B".into() });
        assert_eq!(keys(&blocks[3]), vec!["2"]);

        assert!(build_blocks(vec![entry("", "1".into(), "1")]).is_empty());
    }

    #[test]
    fn empty_input_gives_no_blocks() {
        assert!(build_blocks(Vec::new()).is_empty());
    }

    #[test]
    fn row_spans() {
        let blocks = build_blocks(vec![entry("A", "1".into(), "1"), entry("A", "1".into(), "2")]);
        let total: usize = blocks.iter().map(ReportBlock::row_span).sum();
        // label + blank + header + 2 rows + 2 blanks
        assert_eq!(total, 7);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(ReportBlock::BlankRow { count: 2 }).unwrap();
        assert_eq!(json["kind"], "blank_row");
        assert_eq!(json["count"], 2);
    }
}
