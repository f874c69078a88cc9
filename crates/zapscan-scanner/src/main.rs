//! ZAPScan Scanner - spider vs. active scan comparison run
//!
//! Checks that the engine is up, records the alert count, runs the spider,
//! runs the active scan, and writes a report attributing new alerts to the
//! phase that found them. With `--spider-only` it crawls and prints every
//! alert in detail instead.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use zapscan_common::{Config, LogConfig, ReportFormat};
use zapscan_core::Target;
use zapscan_scan::report::{render_alert_details, render_statistics};
use zapscan_scan::{FileReporter, PollSchedule, RunContext, ScanOrchestrator};
use zapscan_transport::{EngineClient, HttpTransport, HttpTransportConfig};

/// ZAPScan scan runner
#[derive(Parser, Debug)]
#[command(name = "zapscan-scanner")]
#[command(version)]
#[command(about = "Run spider and active scans through the ZAP API and report new alerts", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "zapscan.toml")]
    config: String,

    /// Target URL (overrides config)
    #[arg(long)]
    target: Option<String>,

    /// Engine API base URL (overrides config)
    #[arg(long)]
    engine: Option<String>,

    /// Only run the spider and print every alert in detail
    #[arg(long)]
    spider_only: bool,

    /// Directory for the report file (overrides config)
    #[arg(long)]
    output_dir: Option<String>,

    /// Report format (text, json)
    #[arg(long)]
    format: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json, compact)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", failure_message(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = load_config(&args)?;

    zapscan_common::init_logging_with_config(LogConfig::from(&config.logging));

    debug!("Effective configuration: {:?}", config);

    let target = Target::new(config.scan.target.clone())?;
    let client = connect(&config)?;
    let orchestrator = ScanOrchestrator::new(
        client,
        PollSchedule::from(config.scan.discovery()),
        PollSchedule::from(config.scan.attack()),
    );

    if args.spider_only {
        let schedule = PollSchedule::from(config.scan.spider_only());
        spider_only(&orchestrator, target, schedule).await
    } else {
        comparison(&orchestrator, target, &config).await
    }
}

/// Error text for the console, with a start hint when the engine is down
fn failure_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<zapscan_core::Error>() {
        Some(core) if core.is_fatal() => format!(
            "Error [{}]: {:#}\nZAP is not accessible. Make sure it is running.\n\
             Start it with: docker run -d --name zap-api -p 8080:8080 zaproxy/zap-stable \
             zap.sh -daemon -host 0.0.0.0 -port 8080 -config api.disablekey=true",
            core.code(),
            e
        ),
        Some(core) => format!("Error [{}]: {:#}", core.code(), e),
        None => format!("Error: {:#}", e),
    }
}

/// Config file if present, then environment, then command-line flags
fn load_config(args: &Args) -> Result<Config> {
    let config = if Path::new(&args.config).exists() {
        Config::from_file(&args.config)?
    } else {
        Config::default()
    };

    let mut config = config.merge_env();

    if let Some(target) = &args.target {
        config.scan.target = target.clone();
    }
    if let Some(engine) = &args.engine {
        config.engine.endpoint = engine.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.report.output_dir = dir.clone();
    }
    if let Some(format) = &args.format {
        config.report.format = ReportFormat::parse(format)
            .with_context(|| format!("unknown report format {:?}", format))?;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &args.log_format {
        config.logging.format = format.clone();
    }

    config.validate()?;
    Ok(config)
}

fn connect(config: &Config) -> Result<EngineClient> {
    let transport = HttpTransport::new(HttpTransportConfig {
        base_url: config.engine.endpoint.clone(),
        api_key: config.engine.api_key.clone(),
        request_timeout: Duration::from_secs(config.engine.request_timeout_seconds),
    })
    .context("cannot build engine transport")?;
    Ok(EngineClient::new(Arc::new(transport)))
}

async fn comparison(
    orchestrator: &ScanOrchestrator,
    target: Target,
    config: &Config,
) -> Result<ExitCode> {
    println!("ZAP SCAN COMPARISON: SPIDER vs ACTIVE");
    println!("{}", "=".repeat(50));
    println!("Target: {}", target);

    let mut ctx = RunContext::new(target);
    let version = orchestrator.health_check(&mut ctx).await?;
    println!("ZAP {}", version);

    let reporter = FileReporter::new(&config.report.output_dir, config.report.format);
    let summary = orchestrator.run_phases(&mut ctx, &reporter).await?;

    println!();
    print!("{}", render_statistics(&summary));
    println!();
    println!(
        "Full report saved: {}",
        reporter.report_path(&summary).display()
    );

    Ok(ExitCode::SUCCESS)
}

async fn spider_only(
    orchestrator: &ScanOrchestrator,
    target: Target,
    schedule: PollSchedule,
) -> Result<ExitCode> {
    println!("ZAP SPIDER SCAN ONLY");
    println!("{}", "=".repeat(50));
    println!("Target: {}", target);

    let mut ctx = RunContext::new(target);
    let alerts = orchestrator.discovery_only(&mut ctx, schedule).await?;

    if let Some(outcome) = &ctx.discovery {
        if !outcome.completed {
            println!("Spider did not complete within timeout");
        }
    }

    info!("Collecting all vulnerabilities");
    println!();
    println!("{}", "=".repeat(80));
    println!("SPIDER SCAN RESULTS - ALL VULNERABILITIES");
    println!("{}", "=".repeat(80));
    print!("{}", render_alert_details(&alerts.alerts));
    println!();
    println!(
        "Spider scan completed. Found {} vulnerabilities.",
        alerts.len()
    );

    Ok(ExitCode::SUCCESS)
}
