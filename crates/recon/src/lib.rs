//! `rostercheck-recon`: roster vs. department-sheet reconciliation core.
//!
//! Pure engine crate: receives pre-loaded grids, returns the report layout.
//! No CLI or IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod header;
pub mod key;
pub mod matcher;
pub mod model;
pub mod project;
pub mod report;
pub mod roster;

pub use config::ReconConfig;
pub use engine::{build_report, project_file, reconcile};
pub use error::{ConfigError, ProjectionError, ReportError};
pub use grid::{flatten, Cell, MergeRegion, RawGrid};
pub use model::{FileDiagnostic, ReconInput, ReconOutcome, ReconSummary, SourceInput};
pub use report::ReportBlock;
pub use roster::{RosterEntry, ROSTER_COLUMNS};
