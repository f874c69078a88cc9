//! Reporting: render a finished run and persist it

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::info;

use zapscan_common::ReportFormat;
use zapscan_core::{Alert, Error, Result};

use crate::summary::ScanRunSummary;

const WIDE_RULE: usize = 50;
const ITEM_RULE: usize = 30;

/// Consumer of the finished run
pub trait ReportSink {
    fn publish(&self, summary: &ScanRunSummary) -> Result<()>;
}

/// Writes one timestamped report file per run
#[derive(Debug, Clone)]
pub struct FileReporter {
    output_dir: PathBuf,
    format: ReportFormat,
}

impl FileReporter {
    pub fn new(output_dir: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
        }
    }

    /// Path the report for `summary` is written to
    pub fn report_path(&self, summary: &ScanRunSummary) -> PathBuf {
        self.output_dir.join(format!(
            "zap_comparison_{}.{}",
            summary.run_stamp(),
            self.format.extension()
        ))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl ReportSink for FileReporter {
    fn publish(&self, summary: &ScanRunSummary) -> Result<()> {
        let body = match self.format {
            ReportFormat::Text => render_text(summary),
            ReportFormat::Json => render_json(summary)?,
        };

        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            Error::Report(format!(
                "cannot create report directory {}: {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let path = self.report_path(summary);
        std::fs::write(&path, body)
            .map_err(|e| Error::Report(format!("cannot write {}: {}", path.display(), e)))?;

        info!("Report written to {}", path.display());
        Ok(())
    }
}

/// Plain-text comparison report: counts per phase, then every alert
pub fn render_text(summary: &ScanRunSummary) -> String {
    let mut out = String::new();
    let wide = "=".repeat(WIDE_RULE);

    let _ = writeln!(out, "ZAP SCAN COMPARISON REPORT");
    let _ = writeln!(out, "{}", wide);
    let _ = writeln!(out, "Target: {}", summary.target());
    let _ = writeln!(out, "Started: {}", summary.started_at().format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Initial vulnerabilities: {}", summary.baseline_count());
    let _ = writeln!(
        out,
        "After Spider: {} ({:+})",
        summary.discovery().cumulative,
        summary.discovery().new_alerts
    );
    let _ = writeln!(
        out,
        "After Active: {} ({:+})",
        summary.attack().cumulative,
        summary.attack().new_alerts
    );
    let _ = writeln!(out, "{}", wide);
    let _ = writeln!(out);

    let _ = writeln!(out, "ALL VULNERABILITIES:");
    let _ = writeln!(out, "{}", "-".repeat(WIDE_RULE));
    for (i, alert) in summary.alerts().iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, alert.name);
        let _ = writeln!(out, "   Risk: {}", alert.risk);
        let _ = writeln!(out, "   URL: {}", alert.url);
        let _ = writeln!(out, "{}", "-".repeat(ITEM_RULE));
    }

    out
}

/// The whole summary as pretty JSON
pub fn render_json(summary: &ScanRunSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Final statistics block shown on the console
pub fn render_statistics(summary: &ScanRunSummary) -> String {
    let mut out = String::new();
    let rule = "=".repeat(40);
    let discovery = summary.discovery();
    let attack = summary.attack();

    let _ = writeln!(out, "FINAL STATISTICS:");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "  Initial state:        {}", summary.baseline_count());
    let _ = writeln!(
        out,
        "  After Spider Scan:    {} ({:+})",
        discovery.cumulative, discovery.new_alerts
    );
    let _ = writeln!(
        out,
        "  After Active Scan:    {} ({:+})",
        attack.cumulative, attack.new_alerts
    );
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "  Spider found:  {} vulnerabilities", discovery.new_alerts);
    let _ = writeln!(out, "  Active found:  {} vulnerabilities", attack.new_alerts);
    let _ = writeln!(out, "  Total:         {} vulnerabilities", summary.total());
    out
}

/// Every attribute of every alert, for the spider-only listing
pub fn render_alert_details(alerts: &[Alert]) -> String {
    let mut out = String::new();

    if alerts.is_empty() {
        let _ = writeln!(out, "No vulnerabilities found.");
        return out;
    }

    let _ = writeln!(out, "Total vulnerabilities found: {}", alerts.len());
    let _ = writeln!(out);

    for (i, alert) in alerts.iter().enumerate() {
        let _ = writeln!(out, "VULNERABILITY {}:", i + 1);
        let _ = writeln!(out, "  Name: {}", alert.name);
        let _ = writeln!(out, "  Risk: {}", alert.risk);
        let _ = writeln!(out, "  Confidence: {}", alert.confidence);
        let _ = writeln!(out, "  URL: {}", alert.url);
        if let Some(param) = &alert.param {
            let _ = writeln!(out, "  Parameter: {}", param);
        }
        if let Some(attack) = &alert.attack {
            let _ = writeln!(out, "  Attack: {}", attack);
        }
        if let Some(evidence) = &alert.evidence {
            let _ = writeln!(out, "  Evidence: {}", evidence);
        }
        let description = if alert.description.is_empty() {
            "N/A"
        } else {
            alert.description.as_str()
        };
        let _ = writeln!(out, "  Description: {}", description);
        if let Some(solution) = &alert.solution {
            let _ = writeln!(out, "  Solution: {}", solution);
        }
        if let Some(reference) = &alert.reference {
            let _ = writeln!(out, "  Reference: {}", reference);
        }
        let _ = writeln!(out, "  CWE ID: {}", id_or_na(alert.cwe_id));
        let _ = writeln!(out, "  WASC ID: {}", id_or_na(alert.wasc_id));
        let _ = writeln!(out, "{}", "-".repeat(80));
    }

    out
}

fn id_or_na(id: Option<i32>) -> String {
    id.map(|n| n.to_string()).unwrap_or_else(|| "N/A".into())
}
