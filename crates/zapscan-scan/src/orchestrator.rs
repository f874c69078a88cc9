//! Scan orchestrator: health check, discovery, attack, report
//!
//! The run is one pass through the states in `ScanState`. A failed health
//! check aborts before any phase call; after that nothing is fatal except
//! a failure to publish the report. Phases are never retried.

use tracing::{info, warn};

use zapscan_core::{Error, Result, ScanPhase, Target};
use zapscan_transport::EngineClient;

use crate::context::{RunContext, ScanState};
use crate::poller::{PhaseOutcome, PhasePoller, PollSchedule};
use crate::report::ReportSink;
use crate::snapshot::{delta, snapshot, try_snapshot, AlertSnapshot};
use crate::summary::ScanRunSummary;

pub struct ScanOrchestrator {
    client: EngineClient,
    poller: PhasePoller,
}

impl ScanOrchestrator {
    pub fn new(client: EngineClient, discovery: PollSchedule, attack: PollSchedule) -> Self {
        let poller = PhasePoller::new(client.clone(), discovery, attack);
        Self { client, poller }
    }

    /// Run the whole scan against `target` and hand the summary to `sink`
    pub async fn run(&self, target: Target, sink: &dyn ReportSink) -> Result<ScanRunSummary> {
        let mut ctx = RunContext::new(target);
        self.run_with_context(&mut ctx, sink).await
    }

    /// Same as [`run`](Self::run), leaving the final state in `ctx`
    pub async fn run_with_context(
        &self,
        ctx: &mut RunContext,
        sink: &dyn ReportSink,
    ) -> Result<ScanRunSummary> {
        self.health_check(ctx).await?;
        self.run_phases(ctx, sink).await
    }

    /// Discovery, attack and report for a context that already passed the
    /// health check
    pub async fn run_phases(
        &self,
        ctx: &mut RunContext,
        sink: &dyn ReportSink,
    ) -> Result<ScanRunSummary> {
        self.discovery_phase(ctx).await?;
        self.attack_phase(ctx).await?;

        let summary = ScanRunSummary::assemble(ctx)?;
        sink.publish(&summary)?;
        ctx.advance(ScanState::Reported)?;

        info!(
            "Run against {} reported: {} alerts in total",
            ctx.target,
            summary.total()
        );
        Ok(summary)
    }

    /// Idle -> HealthChecked, or Idle -> Aborted when the engine is down
    pub async fn health_check(&self, ctx: &mut RunContext) -> Result<String> {
        match self.client.health_check().await {
            Ok(version) => {
                info!("Connected to ZAP {}", version);
                ctx.engine_version = Some(version.clone());
                ctx.advance(ScanState::HealthChecked)?;
                Ok(version)
            }
            Err(e) => {
                ctx.advance(ScanState::Aborted)?;
                Err(e)
            }
        }
    }

    /// HealthChecked -> DiscoveryRunning -> DiscoveryDone
    pub async fn discovery_phase(&self, ctx: &mut RunContext) -> Result<()> {
        info!("Step 1: recording alerts before scanning");
        let baseline = snapshot(&self.client, &ctx.target).await;
        info!("Alerts before scanning: {}", baseline.len());
        ctx.baseline = Some(baseline);

        ctx.advance(ScanState::DiscoveryRunning)?;
        info!("Step 2: running spider scan");
        let outcome = self.poller.run_phase(ScanPhase::Discovery, &ctx.target).await;
        let previous = previous_snapshot(ctx.baseline.as_ref())?;
        let after = self.capture_after(&outcome, previous).await;
        log_phase_result(&outcome, previous, &after);

        ctx.discovery = Some(outcome);
        ctx.after_discovery = Some(after);
        ctx.advance(ScanState::DiscoveryDone)
    }

    /// DiscoveryDone -> AttackRunning -> AttackDone
    pub async fn attack_phase(&self, ctx: &mut RunContext) -> Result<()> {
        ctx.advance(ScanState::AttackRunning)?;
        info!("Step 3: running active scan");
        let outcome = self.poller.run_phase(ScanPhase::Attack, &ctx.target).await;
        let previous = previous_snapshot(ctx.after_discovery.as_ref())?;
        let after = self.capture_after(&outcome, previous).await;
        log_phase_result(&outcome, previous, &after);

        ctx.attack = Some(outcome);
        ctx.after_attack = Some(after);
        ctx.advance(ScanState::AttackDone)
    }

    /// Standalone crawl polled on its own `schedule`: a spider that does not
    /// start is an error here, and the resulting snapshot is returned for
    /// display
    pub async fn discovery_only(
        &self,
        ctx: &mut RunContext,
        schedule: PollSchedule,
    ) -> Result<AlertSnapshot> {
        self.health_check(ctx).await?;
        ctx.advance(ScanState::DiscoveryRunning)?;

        let outcome = self
            .poller
            .run_phase_with(ScanPhase::Discovery, &ctx.target, schedule)
            .await;
        if !outcome.started() {
            return Err(Error::PhaseStartFailed {
                phase: ScanPhase::Discovery.component().into(),
            });
        }

        let alerts = snapshot(&self.client, &ctx.target).await;
        ctx.discovery = Some(outcome);
        ctx.after_discovery = Some(alerts.clone());
        ctx.advance(ScanState::DiscoveryDone)?;
        Ok(alerts)
    }

    /// Snapshot after a phase. A failed alerts call keeps the previous
    /// snapshot so the phase reads as having added nothing.
    async fn capture_after(&self, outcome: &PhaseOutcome, previous: &AlertSnapshot) -> AlertSnapshot {
        match try_snapshot(&self.client, &previous.target).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(
                    "Alerts unavailable after {} ({}), keeping previous count of {}",
                    outcome.phase,
                    e,
                    previous.len()
                );
                previous.clone()
            }
        }
    }
}

fn previous_snapshot(snapshot: Option<&AlertSnapshot>) -> Result<&AlertSnapshot> {
    snapshot.ok_or_else(|| Error::Internal("phase started without a prior snapshot".into()))
}

fn log_phase_result(outcome: &PhaseOutcome, before: &AlertSnapshot, after: &AlertSnapshot) {
    let gained = delta(before, after);
    if !outcome.started() {
        warn!("{} was skipped: the engine did not return a scan ID", outcome.phase);
    } else if outcome.timed_out() {
        warn!(
            "{} timed out at {}%, reporting partial results",
            outcome.phase,
            outcome.final_progress.unwrap_or(0)
        );
    }
    info!(
        "{} finished: {:+} new alerts, {} in total",
        outcome.phase,
        gained,
        after.len()
    );
}
