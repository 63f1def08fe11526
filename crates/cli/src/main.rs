// emplink - replay income-to-employment reconciliation from recorded files

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "emplink")]
#[command(about = "Attribute income entries to employment relationships")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile one subject's income against employment
    #[command(after_help = "\
Examples:
  emplink run replay.recon.toml --subject 01017012345 --from 2024-01-01 --to 2024-03-31
  emplink run replay.recon.toml --subject 01017012345 --from 2024-01-01 --to 2024-03-31 --json
  emplink run replay.recon.toml --subject 01017012345 --from 2024-01-01 --to 2024-03-31 --output result.json")]
    Run {
        /// Path to the .recon.toml config file
        config: PathBuf,

        /// National identity number of the subject
        #[arg(long, env = "EMPLINK_SUBJECT")]
        subject: String,

        /// First day of the range (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: NaiveDate,

        /// Last day of the range (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: NaiveDate,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit 1 when any income or employment is left unmatched
        #[arg(long)]
        strict: bool,

        /// Suppress the human summary on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate a recon config without running
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| format!("invalid date '{s}' (expected YYYY-MM-DD)"))
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, subject, from, to, json, output, strict, quiet } => {
            recon::cmd_run(recon::RunArgs { config, subject, from, to, json, output, strict, quiet })
        }
        Commands::Validate { config } => recon::cmd_validate(config),
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
