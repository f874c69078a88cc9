//! Phase poller: start a phase and poll it until it completes or the
//! attempt budget is spent
//!
//! Polling is strictly sequential: sleep for the phase's interval, probe the
//! status once, repeat. A failed probe only loses that tick. Running out of
//! attempts is reported, never raised, so the caller can still collect the
//! partial results.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use zapscan_common::PhasePoll;
use zapscan_core::{ScanPhase, Target};
use zapscan_transport::EngineClient;

use crate::snapshot::snapshot;

/// Polling cadence and ceiling for one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub max_attempts: u32,
    pub interval: Duration,
    /// Log the target's alert count on every tick
    pub track_alerts: bool,
}

impl PollSchedule {
    /// Discovery default: 20 attempts, 5s apart
    pub fn discovery() -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_secs(5),
            track_alerts: false,
        }
    }

    /// Attack default: 60 attempts, 10s apart
    pub fn attack() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_secs(10),
            track_alerts: true,
        }
    }

}

impl From<PhasePoll> for PollSchedule {
    fn from(poll: PhasePoll) -> Self {
        Self {
            max_attempts: poll.max_attempts,
            interval: Duration::from_secs(poll.interval_seconds),
            track_alerts: poll.track_alerts,
        }
    }
}

/// What happened to one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseOutcome {
    pub phase: ScanPhase,
    /// Handle returned at start, if the phase started
    pub handle: Option<String>,
    /// Progress reached 100 within the attempt budget
    pub completed: bool,
    /// Last progress value successfully read
    pub final_progress: Option<u8>,
    /// Status probes issued
    pub polls: u32,
}

impl PhaseOutcome {
    fn not_started(phase: ScanPhase) -> Self {
        Self {
            phase,
            handle: None,
            completed: false,
            final_progress: None,
            polls: 0,
        }
    }

    pub fn started(&self) -> bool {
        self.handle.is_some()
    }

    /// Started but did not reach 100 in time
    pub fn timed_out(&self) -> bool {
        self.started() && !self.completed
    }
}

/// Runs phases against the engine with a fixed schedule per phase
pub struct PhasePoller {
    client: EngineClient,
    discovery: PollSchedule,
    attack: PollSchedule,
}

impl PhasePoller {
    pub fn new(client: EngineClient, discovery: PollSchedule, attack: PollSchedule) -> Self {
        Self {
            client,
            discovery,
            attack,
        }
    }

    fn schedule_for(&self, phase: ScanPhase) -> PollSchedule {
        match phase {
            ScanPhase::Discovery => self.discovery,
            ScanPhase::Attack => self.attack,
        }
    }

    /// Start `phase` against `target` and poll it to completion or timeout
    pub async fn run_phase(&self, phase: ScanPhase, target: &Target) -> PhaseOutcome {
        self.run_phase_with(phase, target, self.schedule_for(phase)).await
    }

    /// As [`run_phase`](Self::run_phase), with an explicit schedule
    pub async fn run_phase_with(
        &self,
        phase: ScanPhase,
        target: &Target,
        schedule: PollSchedule,
    ) -> PhaseOutcome {
        let handle = match self.client.start_phase(phase, target).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("{} failed to start on {}: {}", phase, target, e);
                return PhaseOutcome::not_started(phase);
            }
        };

        info!(
            "{} started (ID: {}), polling up to {} times every {:?}",
            phase, handle, schedule.max_attempts, schedule.interval
        );

        let mut outcome = PhaseOutcome {
            phase,
            handle: Some(handle.to_string()),
            completed: false,
            final_progress: None,
            polls: 0,
        };

        for attempt in 1..=schedule.max_attempts {
            tokio::time::sleep(schedule.interval).await;
            outcome.polls = attempt;

            let progress = match self.client.phase_status(phase, &handle).await {
                Ok(progress) => progress,
                Err(e) => {
                    warn!("{} status unavailable on poll {}: {}", phase, attempt, e);
                    continue;
                }
            };
            outcome.final_progress = Some(progress.percent());

            if schedule.track_alerts {
                let current = snapshot(&self.client, target).await;
                info!("{} progress: {} | alerts: {}", phase, progress, current.len());
            } else {
                info!("{} progress: {}", phase, progress);
            }

            if progress.is_complete() {
                outcome.completed = true;
                break;
            }
        }

        if outcome.completed {
            info!("{} completed after {} polls", phase, outcome.polls);
        } else {
            warn!(
                "{} did not complete within {} polls, continuing with partial results",
                phase, schedule.max_attempts
            );
        }

        outcome
    }
}
