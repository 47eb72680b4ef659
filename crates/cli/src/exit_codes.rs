//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: batch jobs that run the
//! reconciliation overnight branch on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | setup            | Reading inputs, writing outputs, config  |
//! | 10-19   | run              | Reconciliation outcomes                  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use rostercheck_recon::ReportError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// clap exits with the same code for its own parse failures.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Setup (3-9)
// =============================================================================

/// A roster or source file could not be read, or an output could not be written.
pub const EXIT_IO: u8 = 3;

/// Config file unreadable, malformed or failing validation.
pub const EXIT_CONFIG: u8 = 4;

// =============================================================================
// Run (10-19)
// =============================================================================

/// No source file produced any usable record.
pub const EXIT_EMPTY_SOURCE_SET: u8 = 10;

/// The roster does not have exactly the eight fixed columns.
pub const EXIT_ROSTER_COLUMNS: u8 = 11;

/// Nobody on the roster matched (only with `--fail-on-empty`).
pub const EXIT_NO_MATCHES: u8 = 12;

/// Map a fatal reconciliation error to its exit code.
pub fn report_exit_code(err: &ReportError) -> u8 {
    match err {
        ReportError::EmptySourceSet => EXIT_EMPTY_SOURCE_SET,
        ReportError::MasterColumnCountMismatch { .. } => EXIT_ROSTER_COLUMNS,
    }
}
