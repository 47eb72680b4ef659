// rostercheck - overtime transport roster reconciliation

mod config_file;
mod exit_codes;
mod inspect;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "rostercheck")]
#[command(about = "Match department overtime sheets against the transport roster")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/rostercheck/config.toml if present)
    #[arg(long, global = true, env = "ROSTERCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the roster against department sheets and write the report
    #[command(after_help = "\
Examples:
  rostercheck run mestre.xlsx producao.xlsx logistica.xlsb
  rostercheck run mestre.xlsx rh/*.xlsx --output escala.xlsx
  rostercheck run mestre.xlsx rh/*.xlsx --json > resultado.json")]
    Run {
        /// Master roster (Linha, Turno, Itinerário, Registro, Nome dos
        /// Passageiros, Endereço, Bairro, Telefone; no header row)
        roster: PathBuf,

        /// Department overtime sheets
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Report path (default: relatorio_<dd.mm>.xlsx next to the roster)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the outcome as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the outcome as JSON to a file
        #[arg(long)]
        json_output: Option<PathBuf>,

        /// Exit with an error when nobody on the roster matched
        #[arg(long)]
        fail_on_empty: bool,
    },

    /// Write a copy of a sheet with merged cells filled in
    #[command(after_help = "\
Examples:
  rostercheck flatten producao.xlsx --output producao_plana.xlsx")]
    Flatten {
        /// Workbook to flatten (first worksheet)
        input: PathBuf,

        /// Destination xlsx; must differ from the input
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Show the composite header found in a sheet and the columns kept
    #[command(after_help = "\
Examples:
  rostercheck header producao.xlsx
  rostercheck header producao.xlsx --json")]
    Header {
        /// Department sheet to inspect
        input: PathBuf,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Print the built-in defaults instead of the loaded file
        #[arg(long)]
        default: bool,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Run { roster, sources, output, json, json_output, fail_on_empty } => {
            config_file::load(config_path).and_then(|config| {
                let args = run::RunArgs { roster, sources, output, json, json_output, fail_on_empty };
                run::cmd_run(args, &config)
            })
        }
        Commands::Flatten { input, output } => inspect::cmd_flatten(input, output),
        Commands::Header { input, json } => config_file::load(config_path)
            .and_then(|config| inspect::cmd_header(input, &config, json)),
        Commands::Config { default } => config_file::cmd_config(config_path, default),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
