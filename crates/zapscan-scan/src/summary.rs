//! Run summary handed to reporting once both phases are done

use chrono::{DateTime, Local};
use serde::Serialize;

use zapscan_core::{Alert, Error, Result, ScanPhase, Target};

use crate::context::{RunContext, ScanState};
use crate::poller::PhaseOutcome;
use crate::snapshot::delta;

/// Per-phase counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseSummary {
    pub outcome: PhaseOutcome,
    /// Alerts gained during the phase (count delta, may be negative)
    pub new_alerts: i64,
    /// Alerts present once the phase ended
    pub cumulative: usize,
}

/// Immutable result of one run
#[derive(Debug, Clone, Serialize)]
pub struct ScanRunSummary {
    target: Target,
    engine_version: String,
    started_at: DateTime<Local>,
    finished_at: DateTime<Local>,
    baseline_count: usize,
    discovery: PhaseSummary,
    attack: PhaseSummary,
    alerts: Vec<Alert>,
}

impl ScanRunSummary {
    /// Build the summary from a context that has finished the attack phase
    pub fn assemble(ctx: &RunContext) -> Result<Self> {
        if ctx.state() != ScanState::AttackDone {
            return Err(Error::Internal(format!(
                "summary requested in state {}",
                ctx.state()
            )));
        }

        let missing = |what: &str| Error::Internal(format!("run context has no {}", what));

        let baseline = ctx.baseline.as_ref().ok_or_else(|| missing("baseline snapshot"))?;
        let after_discovery = ctx
            .after_discovery
            .as_ref()
            .ok_or_else(|| missing("post-discovery snapshot"))?;
        let after_attack = ctx
            .after_attack
            .as_ref()
            .ok_or_else(|| missing("post-attack snapshot"))?;
        let discovery = ctx.discovery.clone().ok_or_else(|| missing("discovery outcome"))?;
        let attack = ctx.attack.clone().ok_or_else(|| missing("attack outcome"))?;

        Ok(Self {
            target: ctx.target.clone(),
            engine_version: ctx.engine_version.clone().unwrap_or_default(),
            started_at: ctx.started_at,
            finished_at: Local::now(),
            baseline_count: baseline.len(),
            discovery: PhaseSummary {
                outcome: discovery,
                new_alerts: delta(baseline, after_discovery),
                cumulative: after_discovery.len(),
            },
            attack: PhaseSummary {
                outcome: attack,
                new_alerts: delta(after_discovery, after_attack),
                cumulative: after_attack.len(),
            },
            alerts: after_attack.alerts.clone(),
        })
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn engine_version(&self) -> &str {
        &self.engine_version
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Local> {
        self.finished_at
    }

    pub fn baseline_count(&self) -> usize {
        self.baseline_count
    }

    pub fn phase(&self, phase: ScanPhase) -> &PhaseSummary {
        match phase {
            ScanPhase::Discovery => &self.discovery,
            ScanPhase::Attack => &self.attack,
        }
    }

    pub fn discovery(&self) -> &PhaseSummary {
        &self.discovery
    }

    pub fn attack(&self) -> &PhaseSummary {
        &self.attack
    }

    /// Final alert set, in engine order
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn total(&self) -> usize {
        self.alerts.len()
    }

    /// Timestamp used in report file names
    pub fn run_stamp(&self) -> String {
        self.started_at.format("%Y%m%d_%H%M%S").to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_counts() {
        let summary = ScanRunSummary::assemble(&fixtures::finished_context()).unwrap();
        assert_eq!(summary.baseline_count(), 1);
        assert_eq!(summary.discovery().new_alerts, 1);
        assert_eq!(summary.discovery().cumulative, 2);
        assert_eq!(summary.attack().new_alerts, 2);
        assert_eq!(summary.attack().cumulative, 4);
        assert_eq!(summary.total(), 4);
        assert!(summary.phase(ScanPhase::Attack).outcome.timed_out());
        assert_eq!(summary.engine_version(), "2.14.0");
    }

    #[test]
    fn test_assemble_requires_attack_done() {
        let ctx = RunContext::new(Target::new("http://localhost:3000").unwrap());
        assert!(matches!(
            ScanRunSummary::assemble(&ctx),
            Err(Error::Internal(_))
        ));
    }
}
