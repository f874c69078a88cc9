//! Per-run state passed explicitly through the orchestrator

use chrono::{DateTime, Local};
use serde::Serialize;

use zapscan_core::{Error, Result, Target};

use crate::poller::PhaseOutcome;
use crate::snapshot::AlertSnapshot;

/// Orchestrator states. Transitions only move forward; `Aborted` is
/// reachable only from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    Idle,
    HealthChecked,
    DiscoveryRunning,
    DiscoveryDone,
    AttackRunning,
    AttackDone,
    Reported,
    Aborted,
}

impl ScanState {
    /// Whether `next` directly follows `self`
    pub fn can_transition_to(&self, next: ScanState) -> bool {
        use ScanState::*;
        matches!(
            (*self, next),
            (Idle, HealthChecked)
                | (Idle, Aborted)
                | (HealthChecked, DiscoveryRunning)
                | (DiscoveryRunning, DiscoveryDone)
                | (DiscoveryDone, AttackRunning)
                | (AttackRunning, AttackDone)
                | (AttackDone, Reported)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Reported | ScanState::Aborted)
    }
}

impl std::fmt::Display for ScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScanState::Idle => "idle",
            ScanState::HealthChecked => "health-checked",
            ScanState::DiscoveryRunning => "discovery-running",
            ScanState::DiscoveryDone => "discovery-done",
            ScanState::AttackRunning => "attack-running",
            ScanState::AttackDone => "attack-done",
            ScanState::Reported => "reported",
            ScanState::Aborted => "aborted",
        };
        write!(f, "{}", s)
    }
}

/// Everything one run accumulates: target, timing, engine version, the three
/// snapshots and both phase outcomes
#[derive(Debug, Clone)]
pub struct RunContext {
    pub target: Target,
    pub started_at: DateTime<Local>,
    pub engine_version: Option<String>,
    pub baseline: Option<AlertSnapshot>,
    pub after_discovery: Option<AlertSnapshot>,
    pub after_attack: Option<AlertSnapshot>,
    pub discovery: Option<PhaseOutcome>,
    pub attack: Option<PhaseOutcome>,
    state: ScanState,
}

impl RunContext {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            started_at: Local::now(),
            engine_version: None,
            baseline: None,
            after_discovery: None,
            after_attack: None,
            discovery: None,
            attack: None,
            state: ScanState::Idle,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Move to `next`, refusing anything but the single forward step
    pub fn advance(&mut self, next: ScanState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::Internal(format!(
                "invalid scan state transition {} -> {}",
                self.state, next
            )));
        }
        self.state = next;
        Ok(())
    }

    /// Timestamp used in report file names
    pub fn run_stamp(&self) -> String {
        self.started_at.format("%Y%m%d_%H%M%S").to_string()
    }
}
