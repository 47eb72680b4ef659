//! Config discovery for every subcommand.
//!
//! Lookup order: `--config <path>`, then
//! `<config_dir>/rostercheck/config.toml` when it exists, then the built-in
//! defaults.

use std::path::{Path, PathBuf};

use rostercheck_recon::ReconConfig;

use crate::exit_codes::EXIT_CONFIG;
use crate::CliError;

/// Per-user config location, e.g. `~/.config/rostercheck/config.toml` on Linux.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rostercheck").join("config.toml"))
}

/// Resolve and load the effective configuration.
pub fn load(explicit: Option<&Path>) -> Result<ReconConfig, CliError> {
    if let Some(path) = explicit {
        return load_file(path);
    }
    match user_config_path() {
        Some(path) if path.is_file() => load_file(&path),
        _ => {
            log::debug!("no config file, using built-in defaults");
            Ok(ReconConfig::default())
        }
    }
}

fn load_file(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        config_err(format!("cannot read config {}: {e}", path.display()))
    })?;
    let config = ReconConfig::from_toml(&text).map_err(|e| {
        config_err(format!("{}: {e}", path.display()))
            .with_hint("run `rostercheck config --default` for a template")
    })?;
    log::info!("loaded config from {}", path.display());
    Ok(config)
}

fn config_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_CONFIG, message: msg.into(), hint: None }
}

/// `rostercheck config`: print the effective or built-in config as TOML.
pub fn cmd_config(explicit: Option<&Path>, default: bool) -> Result<(), CliError> {
    let config = if default {
        ReconConfig::default()
    } else {
        load(explicit)?
    };
    let text = config
        .to_toml()
        .map_err(|e| CliError::general(format!("cannot render config: {e}")))?;
    print!("{text}");
    Ok(())
}
