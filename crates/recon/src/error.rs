use std::fmt;

/// Why a single source sheet could not contribute records.
///
/// These are recovered per file: the caller skips the sheet and carries on
/// with the remaining ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// No composite header label contains any of the desired substrings.
    NoMatchingColumns,
    /// Every data row was dropped by the name-present or opt-in filters.
    EmptyAfterFilter,
    /// Columns were found, but none of them maps to `Registro`.
    MissingRegistroColumn,
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatchingColumns => {
                write!(f, "none of the expected columns was found in the header")
            }
            Self::EmptyAfterFilter => write!(f, "no records survived filtering"),
            Self::MissingRegistroColumn => write!(f, "no 'Reg.' column to match on"),
        }
    }
}

impl std::error::Error for ProjectionError {}

/// Terminal failures: no report can be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Zero source sheets yielded any usable records.
    EmptySourceSet,
    /// The roster grid does not have exactly eight columns.
    MasterColumnCountMismatch { found: usize },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySourceSet => write!(f, "no usable source sheet was found"),
            Self::MasterColumnCountMismatch { found } => {
                write!(f, "master roster must have 8 columns, found {found}")
            }
        }
    }
}

impl std::error::Error for ReportError {}

#[derive(Debug)]
pub enum ConfigError {
    /// TOML parse / deserialization error.
    Parse(String),
    /// Semantic validation error (empty token list, zero scan depth, ...).
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::Validation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
