//! `rostercheck run`: match the roster against department sheets and write
//! the sectioned report.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use rostercheck_io::read_sheet;
use rostercheck_recon::engine::reconcile;
use rostercheck_recon::model::{ReconInput, ReconOutcome, SourceInput};
use rostercheck_recon::ReconConfig;

use crate::exit_codes::{report_exit_code, EXIT_IO, EXIT_NO_MATCHES};
use crate::CliError;

pub struct RunArgs {
    pub roster: PathBuf,
    pub sources: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub json_output: Option<PathBuf>,
    pub fail_on_empty: bool,
}

/// A source file that could not be opened at all.
#[derive(Debug, Serialize)]
struct UnreadableFile {
    source: String,
    error: String,
}

#[derive(Serialize)]
struct RunReport<'a> {
    #[serde(flatten)]
    outcome: &'a ReconOutcome,
    unreadable: &'a [UnreadableFile],
    output: String,
}

fn run_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format today's date with a chrono pattern already checked by config
/// validation; a failed render is still reported instead of panicking.
fn today(pattern: &str) -> Result<String, CliError> {
    let mut out = String::new();
    write!(out, "{}", chrono::Local::now().format(pattern))
        .map_err(|_| run_err(EXIT_IO, format!("invalid date format \"{pattern}\"")))?;
    Ok(out)
}

/// `relatorio_<dd.mm>.xlsx` next to the roster.
fn default_output(roster: &Path) -> Result<PathBuf, CliError> {
    let name = format!("relatorio_{}.xlsx", today("%d.%m")?);
    let dir = roster.parent().unwrap_or_else(|| Path::new("."));
    Ok(dir.join(name))
}

pub fn cmd_run(args: RunArgs, config: &ReconConfig) -> Result<(), CliError> {
    let roster = read_sheet(&args.roster).map_err(|e| {
        run_err(EXIT_IO, format!("cannot read roster: {e}"))
    })?;

    let mut sources = Vec::with_capacity(args.sources.len());
    let mut unreadable = Vec::new();
    for path in &args.sources {
        let name = display_name(path);
        match read_sheet(path) {
            Ok(sheet) => sources.push(SourceInput {
                name,
                grid: sheet.grid,
                merges: sheet.merges,
            }),
            Err(error) => {
                log::info!("cannot read {name}: {error}");
                unreadable.push(UnreadableFile { source: name, error });
            }
        }
    }

    let input = ReconInput { roster: roster.grid, sources };
    let outcome = reconcile(&input, config).map_err(|e| {
        let err = run_err(report_exit_code(&e), e.to_string());
        match e {
            rostercheck_recon::ReportError::EmptySourceSet => err.with_hint(
                "check that each sheet has a \"Reg.\" column and rows opted in with SIM or X",
            ),
            rostercheck_recon::ReportError::MasterColumnCountMismatch { .. } => err.with_hint(
                "the roster needs Linha, Turno, Itinerário, Registro, Nome dos Passageiros, \
                 Endereço, Bairro, Telefone; use [roster] skip_rows for title rows",
            ),
        }
    })?;

    let output = match args.output {
        Some(path) => path,
        None => default_output(&args.roster)?,
    };
    let sheet_name = today(&config.output.sheet_name)?;
    rostercheck_io::write_report(&output, &outcome.blocks, &sheet_name)
        .map_err(|e| run_err(EXIT_IO, format!("cannot write report: {e}")))?;

    let report = RunReport {
        outcome: &outcome,
        unreadable: &unreadable,
        output: output.display().to_string(),
    };
    if args.json || args.json_output.is_some() {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = args.json_output {
            std::fs::write(path, &json_str)
                .map_err(|e| run_err(EXIT_IO, format!("cannot write output: {e}")))?;
            eprintln!("wrote {}", path.display());
        }
        if args.json {
            println!("{json_str}");
        }
    }

    // Human summary to stderr
    print_summary(&report);

    if args.fail_on_empty && outcome.summary.matched_entries == 0 {
        return Err(run_err(EXIT_NO_MATCHES, "no roster entries matched"));
    }
    Ok(())
}

fn print_summary(report: &RunReport<'_>) {
    let s = &report.outcome.summary;
    eprintln!(
        "{} of {} roster entries matched across {} shifts, {} routes ({} of {} sheets used, {} distinct registros)",
        s.matched_entries,
        s.roster_entries,
        s.shifts,
        s.routes,
        s.source_files_used,
        s.source_files + report.unreadable.len(),
        s.distinct_keys,
    );
    for file in report.unreadable {
        eprintln!("  skipped {}: {}", file.source, file.error);
    }
    for diag in &report.outcome.diagnostics {
        eprintln!("  skipped {}: {}", diag.source, diag.error);
    }
    eprintln!("wrote {}", report.output);
}
