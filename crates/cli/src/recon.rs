//! `emplink run` / `emplink validate`: replay reconciliation from files.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use emplink_recon::fixture::FileSources;
use emplink_recon::{CollectingSink, LogSink, ObservabilitySink, ReconConfig, Reconciler, TeeSink};

use crate::exit_codes::{EXIT_INVALID_CONFIG, EXIT_RECONCILE_FAILED, EXIT_SOURCE_LOAD, EXIT_UNMATCHED};
use crate::CliError;

pub struct RunArgs {
    pub config: PathBuf,
    pub subject: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub strict: bool,
    pub quiet: bool,
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| recon_err(EXIT_INVALID_CONFIG, format!("cannot read config: {e}")))?;
    ReconConfig::from_toml(&config_str).map_err(|e| recon_err(EXIT_INVALID_CONFIG, e.to_string()))
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    if config.sources.is_none() {
        return Err(CliError {
            code: EXIT_INVALID_CONFIG,
            message: "config has no [sources] section".into(),
            hint: Some("add employment, income and organizations file paths under [sources]".into()),
        });
    }
    eprintln!("{}: ok", config_path.display());
    Ok(())
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(&args.config)?;
    let sources_config = config.sources.clone().ok_or_else(|| CliError {
        code: EXIT_INVALID_CONFIG,
        message: "config has no [sources] section".into(),
        hint: Some("add employment, income and organizations file paths under [sources]".into()),
    })?;

    // Resolve file paths relative to config file's directory
    let base_dir = args.config.parent().unwrap_or_else(|| Path::new("."));
    let sources =
        FileSources::load(base_dir, &sources_config).map_err(|e| recon_err(EXIT_SOURCE_LOAD, e.to_string()))?;

    let sink = CollectingSink::new();
    let tee = TeeSink::new(vec![&sink as &dyn ObservabilitySink, &LogSink]);
    let result = Reconciler::new(&sources, &sources, &sources)
        .with_config(config)
        .with_sink(&tee)
        .reconcile(&args.subject, args.from, args.to)
        .map_err(|e| CliError {
            code: EXIT_RECONCILE_FAILED,
            message: e.to_string(),
            hint: Some(format!("error kind {} (HTTP {})", e.kind(), e.kind().http_status())),
        })?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| recon_err(EXIT_RECONCILE_FAILED, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| recon_err(EXIT_SOURCE_LOAD, format!("cannot write output: {e}")))?;
        if !args.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if args.json {
        println!("{json_str}");
    }

    let s = result.summary();
    if !args.quiet {
        eprintln!(
            "{}: {} salary entries: {} matched ({} ambiguous), {} unmatched; {} of {} employment relationships without salary",
            args.subject,
            s.salary_entries,
            s.matched_salary_entries,
            s.ambiguous_salary_entries,
            s.unmatched_salary_entries,
            s.unmatched_employment_relationships,
            s.employment_relationships,
        );
        for anomaly in sink.anomalies() {
            eprintln!("  {}: {}", anomaly.kind, anomaly.details);
        }
    }

    if args.strict && (s.unmatched_salary_entries > 0 || s.unmatched_employment_relationships > 0) {
        return Err(recon_err(EXIT_UNMATCHED, "unmatched entries found"));
    }

    Ok(())
}
