use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::header::DEFAULT_SCAN_DEPTH;

/// Header substrings looked for in every department sheet.
pub const DEFAULT_HEADER_TOKENS: [&str; 9] = [
    "Reg.",
    "Nome empregado",
    "Unidade de Negócio",
    "Turno",
    "Optante de transporte",
    "Usará transporte na HE",
    "LANCHE",
    "HORARIO DE SAÍDA",
    "OBSERVAÇÃO",
];

/// Opt-in values accepted after uppercase + trim.
pub const DEFAULT_ACCEPTED: [&str; 2] = ["SIM", "X"];

/// Characters Excel rejects in sheet names.
const INVALID_SHEET_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Run configuration. Every section is optional; an empty document gives
/// the built-in vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default)]
    pub header: HeaderConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderConfig {
    /// Substrings searched for in header labels. Also the column-selection
    /// vocabulary (matched case-insensitively there).
    #[serde(default = "default_tokens")]
    pub tokens: Vec<String>,
    /// Leading rows folded into the composite header.
    #[serde(default = "default_scan_depth")]
    pub scan_depth: usize,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            tokens: default_tokens(),
            scan_depth: default_scan_depth(),
        }
    }
}

fn default_tokens() -> Vec<String> {
    DEFAULT_HEADER_TOKENS.iter().map(|t| t.to_string()).collect()
}

fn default_scan_depth() -> usize {
    DEFAULT_SCAN_DEPTH
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Exact values (after uppercase + trim) that count as "opted in".
    #[serde(default = "default_accepted")]
    pub accepted: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            accepted: default_accepted(),
        }
    }
}

fn default_accepted() -> Vec<String> {
    DEFAULT_ACCEPTED.iter().map(|t| t.to_string()).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RosterConfig {
    /// Leading roster rows to ignore (title or caption rows).
    #[serde(default)]
    pub skip_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// chrono format string for the report's sheet name.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
        }
    }
}

fn default_sheet_name() -> String {
    "%d.%m".into()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.header.tokens.is_empty() {
            return Err(ConfigError::Validation(
                "header.tokens must not be empty".into(),
            ));
        }
        if let Some(i) = self.header.tokens.iter().position(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "header.tokens[{i}] is blank"
            )));
        }
        if self.header.scan_depth == 0 {
            return Err(ConfigError::Validation(
                "header.scan_depth must be at least 1".into(),
            ));
        }
        if self.filter.accepted.is_empty() {
            return Err(ConfigError::Validation(
                "filter.accepted must not be empty".into(),
            ));
        }
        let sheet_name = &self.output.sheet_name;
        if sheet_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.sheet_name must not be empty".into(),
            ));
        }
        if StrftimeItems::new(sheet_name).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Validation(format!(
                "output.sheet_name \"{sheet_name}\" is not a valid date format"
            )));
        }
        if let Some(c) = sheet_name.chars().find(|c| INVALID_SHEET_NAME_CHARS.contains(c)) {
            return Err(ConfigError::Validation(format!(
                "output.sheet_name must not contain '{c}'"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
