use crate::config::ReconConfig;
use crate::error::{ProjectionError, ReportError};
use crate::grid::{flatten, MergeRegion, RawGrid};
use crate::header::locate_header;
use crate::matcher::{match_roster, KeyCollector};
use crate::model::{FileDiagnostic, ReconInput, ReconMeta, ReconOutcome, ReconSummary};
use crate::project::{project_records, CanonicalField, CanonicalRecord};
use crate::report::{build_blocks, ReportBlock};
use crate::roster::{load_roster, RosterEntry};

/// Flatten, locate the header and project one source sheet.
pub fn project_file(
    grid: &RawGrid,
    merges: &[MergeRegion],
    config: &ReconConfig,
) -> Result<Vec<CanonicalRecord>, ProjectionError> {
    let flat = flatten(grid, merges);
    let tokens = config.header.tokens.as_slice();
    let header = locate_header(&flat, tokens, config.header.scan_depth);

    let records = project_records(&flat, &header, tokens, config.filter.accepted.as_slice())
        .ok_or(ProjectionError::NoMatchingColumns)?;
    let Some(first) = records.first() else {
        return Err(ProjectionError::EmptyAfterFilter);
    };
    // Every record shares the file's column map.
    if first.get(&CanonicalField::Registro).is_none() {
        return Err(ProjectionError::MissingRegistroColumn);
    }
    Ok(records)
}

/// Match the roster against every projected source and lay out the report.
pub fn build_report(
    roster: &[RosterEntry],
    sources: &[Vec<CanonicalRecord>],
) -> Result<Vec<ReportBlock>, ReportError> {
    let mut collector = KeyCollector::new();
    for records in sources {
        collector.add_file(records);
    }
    let matched = match_roster(roster, &collector.freeze())?;
    Ok(build_blocks(matched))
}

/// Full run: roster check, per-file projection with diagnostics, matching
/// and grouping.
///
/// Source failures are collected as diagnostics and the file is skipped;
/// only an unusable roster or an empty source set abort the run.
pub fn reconcile(input: &ReconInput, config: &ReconConfig) -> Result<ReconOutcome, ReportError> {
    let roster_grid = input.roster.clone().skip_rows(config.roster.skip_rows);
    let roster = load_roster(&roster_grid)?;

    let mut collector = KeyCollector::new();
    let mut diagnostics = Vec::new();
    for source in &input.sources {
        match project_file(&source.grid, &source.merges, config) {
            Ok(records) => {
                let new_keys = collector.add_file(&records);
                log::info!(
                    "{}: {} records, {} new keys",
                    source.name,
                    records.len(),
                    new_keys
                );
            }
            Err(error) => {
                log::info!("skipping {}: {error}", source.name);
                diagnostics.push(FileDiagnostic {
                    source: source.name.clone(),
                    error,
                });
            }
        }
    }

    let keys = collector.freeze();
    let matched = match_roster(&roster, &keys)?;
    let matched_entries = matched.len();
    let blocks = build_blocks(matched);

    let summary = ReconSummary {
        roster_entries: roster.len(),
        source_files: input.sources.len(),
        source_files_used: keys.file_count(),
        source_files_skipped: diagnostics.len(),
        source_records: keys.record_count(),
        distinct_keys: keys.len(),
        matched_entries,
        shifts: count_blocks(&blocks, |b| matches!(b, ReportBlock::ShiftSeparator { .. })),
        routes: count_blocks(&blocks, |b| matches!(b, ReportBlock::DataRows { .. })),
    };

    Ok(ReconOutcome {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        diagnostics,
        blocks,
    })
}

fn count_blocks(blocks: &[ReportBlock], pred: impl Fn(&ReportBlock) -> bool) -> usize {
    blocks.iter().filter(|b| pred(b)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn source_grid(rows: Vec<Vec<&str>>) -> RawGrid {
        RawGrid::from_strings(rows)
    }

    #[test]
    fn merged_header_is_flattened_before_search() {
        // "Transporte" spans both flag columns; the sub-captions sit below.
        let grid = source_grid(vec![
            vec!["Reg.", "Nome empregado", "Transporte", ""],
            vec!["", "", "Optante de transporte", "Usará transporte na HE"],
            vec!["0042", "Ana", "sim", "x"],
        ]);
        let merges = [MergeRegion::new(0, 2, 0, 3), MergeRegion::new(0, 0, 1, 0)];
        let config = ReconConfig {
            header: crate::config::HeaderConfig {
                tokens: vec![
                    "Reg.".into(),
                    "Nome empregado".into(),
                    "Optante de transporte".into(),
                    "Usará transporte na HE".into(),
                ],
                ..Default::default()
            },
            ..Default::default()
        };
        let records = project_file(&grid, &merges, &config).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].registro_key().as_deref(), Some("42"));
    }

    #[test]
    fn project_file_errors() {
        let config = ReconConfig::default();

        let unrelated = source_grid(vec![vec!["a", "b"], vec!["1", "2"]]);
        assert_eq!(
            project_file(&unrelated, &[], &config).unwrap_err(),
            ProjectionError::NoMatchingColumns
        );

        let filtered = source_grid(vec![
            vec!["Reg.", "Optante de transporte", "Usará transporte na HE"],
            vec!["1", "NAO", "SIM"],
        ]);
        assert_eq!(
            project_file(&filtered, &[], &config).unwrap_err(),
            ProjectionError::EmptyAfterFilter
        );

        let no_reg = source_grid(vec![vec!["Nome empregado", "Turno"], vec!["Ana", "A"]]);
        assert_eq!(
            project_file(&no_reg, &[], &config).unwrap_err(),
            ProjectionError::MissingRegistroColumn
        );
    }

    #[test]
    fn build_report_requires_a_source() {
        let err = build_report(&[], &[]).unwrap_err();
        assert_eq!(err, ReportError::EmptySourceSet);
    }

    #[test]
    fn reconcile_skips_roster_rows_and_reports_diagnostics() {
        let roster = RawGrid::new(vec![
            vec!["Escala de transporte".into()],
            vec![
                Cell::Number(1.0),
                "A".into(),
                Cell::Number(5.0),
                Cell::Number(17.0),
                "Ana".into(),
                "Rua 1".into(),
                "Centro".into(),
                "555".into(),
            ],
        ]);
        let input = ReconInput {
            roster,
            sources: vec![
                crate::model::SourceInput {
                    name: "rh.xlsx".into(),
                    grid: source_grid(vec![vec!["Reg.", "Nome empregado"], vec!["0017", "Ana"]]),
                    merges: Vec::new(),
                },
                crate::model::SourceInput {
                    name: "vazio.xlsx".into(),
                    grid: source_grid(vec![vec!["x"]]),
                    merges: Vec::new(),
                },
            ],
        };
        let config = ReconConfig {
            roster: crate::config::RosterConfig { skip_rows: 1 },
            ..Default::default()
        };
        let outcome = reconcile(&input, &config).unwrap();
        assert_eq!(outcome.summary.roster_entries, 1);
        assert_eq!(outcome.summary.matched_entries, 1);
        assert_eq!(outcome.summary.source_files_used, 1);
        assert_eq!(outcome.summary.source_files_skipped, 1);
        assert_eq!(outcome.diagnostics[0].source, "vazio.xlsx");
        assert_eq!(outcome.diagnostics[0].error, ProjectionError::NoMatchingColumns);
        assert_eq!(outcome.summary.shifts, 1);
        assert_eq!(outcome.summary.routes, 1);
    }

    #[test]
    fn reconcile_rejects_narrow_roster() {
        let input = ReconInput {
            roster: source_grid(vec![vec!["1", "A", "1"]]),
            sources: Vec::new(),
        };
        let err = reconcile(&input, &ReconConfig::default()).unwrap_err();
        assert_eq!(err, ReportError::MasterColumnCountMismatch { found: 3 });
    }
}
