//! CloudAudit CLI - one-shot scans and script analysis from the terminal
//!
//! Runs against an in-memory report store: each invocation is a complete
//! scan whose report is printed rather than persisted across runs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cloudaudit_common::logging::{LogConfig, LogFormat};
use cloudaudit_core::{ScanContext, ScanReport, Target};
use cloudaudit_engine::{
    AuditEngine, JsonFileStore, MemoryStore, ReportFilter, ReportStore, ScriptKind,
};
use cloudaudit_hosting::ReqwestProbe;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// CloudAudit risk audit engine
#[derive(Parser, Debug)]
#[command(name = "cloudaudit")]
#[command(version)]
#[command(about = "Audit cloud resources and uploaded scripts for risks", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "/etc/cloudaudit/config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format (pretty, json, compact)
    #[arg(long, default_value = "pretty")]
    log_format: String,

    /// Owner reference recorded on reports
    #[arg(long, default_value = "cli")]
    owner: String,

    /// JSON report log persisted across invocations (falls back to
    /// store.uri from the config; without either, scans are not kept)
    #[arg(long)]
    store: Option<String>,

    /// Print the full report as JSON instead of a summary
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a SQL script file
    ValidateSql {
        /// Path to the script
        file: String,
    },

    /// Analyze a JSON document file
    ValidateJson {
        /// Path to the document
        file: String,
    },

    /// Scan a Firebase Hosting domain
    ScanHosting {
        /// Domain to scan (must end in .web.app or .firebaseapp.com)
        domain: String,
    },

    /// Roll up stored reports into per-service summaries
    Analytics {
        /// Restrict to one service
        #[arg(long)]
        service: Option<String>,

        /// Restrict to one owner
        #[arg(long)]
        owner: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_config = LogConfig::new()
        .level(&args.log_level)
        .format(LogFormat::parse(&args.log_format));
    cloudaudit_common::logging::init_logging_with_config(log_config);

    let config = if std::path::Path::new(&args.config).exists() {
        cloudaudit_common::Config::from_file(&args.config)?
    } else {
        info!("config file not found, using defaults");
        cloudaudit_common::Config::default()
    };
    let config = config.merge_env();

    let timeout = Duration::from_secs(config.engine.check_timeout_seconds);
    let store: Arc<dyn ReportStore> = match args.store.clone().or_else(|| config.store.uri.clone())
    {
        Some(path) => {
            info!("persisting reports to {}", path);
            Arc::new(JsonFileStore::new(path))
        }
        None => {
            info!("no report log configured; reports will not outlive this run");
            Arc::new(MemoryStore::new())
        }
    };
    let engine = AuditEngine::new(store)
        .with_check_timeout(timeout)
        .with_max_concurrent_checks(config.engine.max_concurrent_checks);

    match args.command {
        Command::ValidateSql { file } => {
            let content = read_script(&file)?;
            let outcome = engine
                .analyze_script(ScriptKind::Sql, &content, &args.owner)
                .await;
            print_report(&outcome.report, args.json)?;
        }
        Command::ValidateJson { file } => {
            let content = read_script(&file)?;
            let outcome = engine
                .analyze_script(ScriptKind::Json, &content, &args.owner)
                .await;
            print_report(&outcome.report, args.json)?;
        }
        Command::ScanHosting { domain } => {
            let probe = ReqwestProbe::new(timeout)
                .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {}", e))?;
            let ctx = ScanContext::new(Target::hosting(&domain)).with_http(Arc::new(probe));
            let outcome = engine.run_scan(ctx, &args.owner).await?;
            print_report(&outcome.report, args.json)?;
        }
        Command::Analytics { service, owner } => {
            let filter = ReportFilter { service, owner };
            let summaries = engine.get_analytics(&filter).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else if summaries.is_empty() {
                println!("No stored reports match the filter");
            } else {
                for s in summaries {
                    println!(
                        "{}: {} scan(s), good={} warning={} danger={}, latest {}",
                        s.service,
                        s.scan_count,
                        s.good_count,
                        s.warning_count,
                        s.danger_count,
                        s.latest_timestamp
                    );
                }
            }
        }
    }

    Ok(())
}

fn read_script(path: &str) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))
}

fn print_report(report: &ScanReport, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let (good, warning, danger) = report.findings.counts();
    println!(
        "{} scan {}: {} good, {} warning, {} danger",
        report.service, report.id, good, warning, danger
    );
    for finding in &report.findings.danger {
        println!("  [DANGER]  {}: {}", finding.check_name, finding.message);
    }
    for finding in &report.findings.warning {
        println!("  [WARNING] {}: {}", finding.check_name, finding.message);
    }
    for finding in &report.findings.good {
        println!("  [GOOD]    {}: {}", finding.check_name, finding.message);
    }
    Ok(())
}
