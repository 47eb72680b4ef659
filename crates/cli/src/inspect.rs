//! `rostercheck flatten` and `rostercheck header`: single-sheet diagnostics
//! for onboarding a department's layout.

use std::path::{Path, PathBuf};

use serde::Serialize;

use rostercheck_io::{read_sheet, write_grid};
use rostercheck_recon::header::locate_header;
use rostercheck_recon::project::ColumnMap;
use rostercheck_recon::{flatten, ReconConfig};

use crate::exit_codes::{EXIT_IO, EXIT_USAGE};
use crate::CliError;

fn io_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_IO, message: msg.into(), hint: None }
}

pub fn cmd_flatten(input: PathBuf, output: PathBuf) -> Result<(), CliError> {
    if same_file(&input, &output) {
        return Err(CliError {
            code: EXIT_USAGE,
            message: "output must not overwrite the input file".into(),
            hint: Some("pass a different --output path".into()),
        });
    }

    let sheet = read_sheet(&input).map_err(io_err)?;
    let flat = flatten(&sheet.grid, &sheet.merges);
    write_grid(&output, &flat).map_err(io_err)?;

    eprintln!(
        "flattened {} merge regions ({} rows x {} columns) -> {}",
        sheet.merges.len(),
        flat.row_count(),
        flat.col_count(),
        output.display()
    );
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[derive(Debug, Serialize)]
struct HeaderColumn {
    /// Spreadsheet column letter.
    column: String,
    label: String,
    /// Field name the projector gives this column, if it keeps it.
    field: Option<String>,
}

#[derive(Debug, Serialize)]
struct HeaderReport {
    /// 1-based sheet row of the last header row.
    last_row: usize,
    /// 1-based sheet row where data begins.
    data_start: usize,
    columns: Vec<HeaderColumn>,
}

pub fn cmd_header(input: PathBuf, config: &ReconConfig, json: bool) -> Result<(), CliError> {
    let sheet = read_sheet(&input).map_err(io_err)?;
    let flat = flatten(&sheet.grid, &sheet.merges);
    let tokens = config.header.tokens.as_slice();
    let header = locate_header(&flat, tokens, config.header.scan_depth);
    let map = ColumnMap::resolve(&header.labels, tokens);

    let columns = header
        .labels
        .iter()
        .enumerate()
        .map(|(idx, label)| HeaderColumn {
            column: column_letter(idx),
            label: label.clone(),
            field: map
                .iter()
                .find(|(_, col)| *col == idx)
                .map(|(field, _)| field.name().to_string()),
        })
        .collect();
    let report = HeaderReport {
        last_row: header.last_row + 1,
        data_start: header.data_start() + 1,
        columns,
    };

    if json {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    println!("header rows 1-{}, data from row {}", report.last_row, report.data_start);
    for col in &report.columns {
        if col.label.is_empty() {
            continue;
        }
        match &col.field {
            Some(field) => println!("{:>3}  {}  -> {}", col.column, col.label, field),
            None => println!("{:>3}  {}", col.column, col.label),
        }
    }
    if map.is_empty() {
        eprintln!("warning: no column matches the configured header tokens");
    }
    Ok(())
}

/// 0-based column index to its letter name: 0 -> A, 26 -> AA.
fn column_letter(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(8), "I");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn same_file_without_existing_paths() {
        assert!(same_file(Path::new("a.xlsx"), Path::new("a.xlsx")));
        assert!(!same_file(Path::new("a.xlsx"), Path::new("b.xlsx")));
    }
}
