use serde::Serialize;

use crate::error::ProjectionError;
use crate::grid::{MergeRegion, RawGrid};
use crate::report::ReportBlock;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One department sheet as read from disk.
#[derive(Debug, Clone)]
pub struct SourceInput {
    /// Display name used in diagnostics (usually the file name).
    pub name: String,
    pub grid: RawGrid,
    pub merges: Vec<MergeRegion>,
}

/// Pre-loaded grids for one run.
#[derive(Debug, Clone)]
pub struct ReconInput {
    pub roster: RawGrid,
    pub sources: Vec<SourceInput>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A source sheet that was skipped, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileDiagnostic {
    pub source: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: ProjectionError,
}

fn serialize_display<S: serde::Serializer>(
    error: &ProjectionError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconSummary {
    pub roster_entries: usize,
    pub source_files: usize,
    pub source_files_used: usize,
    pub source_files_skipped: usize,
    pub source_records: usize,
    pub distinct_keys: usize,
    pub matched_entries: usize,
    pub shifts: usize,
    pub routes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconOutcome {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub diagnostics: Vec<FileDiagnostic>,
    pub blocks: Vec<ReportBlock>,
}
