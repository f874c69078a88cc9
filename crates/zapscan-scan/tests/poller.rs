mod common;

use std::time::Duration;

use common::*;
use zapscan_core::ScanPhase;
use zapscan_scan::{snapshot, PhasePoller, PollSchedule};
use zapscan_transport::Endpoint;

fn poller(engine: &std::sync::Arc<ScriptedEngine>) -> PhasePoller {
    PhasePoller::new(client(engine), PollSchedule::discovery(), PollSchedule::attack())
}

#[tokio::test(start_paused = true)]
async fn completes_on_first_status_of_100() {
    let engine = ScriptedEngine::new();
    engine
        .then(Endpoint::SpiderScan, handle("7"))
        .then(Endpoint::SpiderStatus, status("40"))
        .then(Endpoint::SpiderStatus, status("100"));

    let outcome = poller(&engine).run_phase(ScanPhase::Discovery, &target()).await;

    assert!(outcome.completed);
    assert_eq!(outcome.polls, 2);
    assert_eq!(outcome.final_progress, Some(100));
    assert_eq!(outcome.handle.as_deref(), Some("7"));
    assert_eq!(engine.calls_to(Endpoint::SpiderStatus), 2);
}

#[tokio::test(start_paused = true)]
async fn accepts_integer_progress() {
    let engine = ScriptedEngine::new();
    engine
        .then(Endpoint::ActiveScan, handle("0"))
        .then(
            Endpoint::ActiveScanStatus,
            Reply::Json(serde_json::json!({ "status": 100 })),
        )
        .always(Endpoint::Alerts, alerts(0));

    let outcome = poller(&engine).run_phase(ScanPhase::Attack, &target()).await;
    assert!(outcome.completed);
    assert_eq!(outcome.polls, 1);
}

#[tokio::test(start_paused = true)]
async fn exhausts_exactly_max_attempts_without_100() {
    let engine = ScriptedEngine::new();
    engine
        .then(Endpoint::SpiderScan, handle("1"))
        .always(Endpoint::SpiderStatus, status("99"));

    let start = tokio::time::Instant::now();
    let outcome = poller(&engine).run_phase(ScanPhase::Discovery, &target()).await;

    assert!(!outcome.completed);
    assert!(outcome.timed_out());
    assert_eq!(outcome.polls, 20);
    assert_eq!(outcome.final_progress, Some(99));
    assert_eq!(engine.calls_to(Endpoint::SpiderStatus), 20);
    assert!(start.elapsed() >= Duration::from_secs(100));
}

#[tokio::test(start_paused = true)]
async fn out_of_range_progress_never_completes() {
    let engine = ScriptedEngine::new();
    engine
        .then(Endpoint::SpiderScan, handle("2"))
        .always(Endpoint::SpiderStatus, status("150"));

    let outcome = poller(&engine).run_phase(ScanPhase::Discovery, &target()).await;

    assert!(!outcome.completed);
    assert_eq!(outcome.polls, 20);
    assert_eq!(outcome.final_progress, None);
}

#[tokio::test(start_paused = true)]
async fn missing_handle_means_zero_polls() {
    let engine = ScriptedEngine::new();
    engine
        .then(
            Endpoint::ActiveScan,
            Reply::Json(serde_json::json!({ "code": "url_not_found" })),
        )
        .always(Endpoint::ActiveScanStatus, status("100"));

    let outcome = poller(&engine).run_phase(ScanPhase::Attack, &target()).await;

    assert!(!outcome.started());
    assert!(!outcome.completed);
    assert_eq!(outcome.polls, 0);
    assert_eq!(engine.calls_to(Endpoint::ActiveScanStatus), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_status_probe_keeps_polling() {
    let engine = ScriptedEngine::new();
    engine
        .then(Endpoint::SpiderScan, handle("2"))
        .then(Endpoint::SpiderStatus, Reply::Fail)
        .then(Endpoint::SpiderStatus, Reply::Fail)
        .then(Endpoint::SpiderStatus, status("100"));

    let outcome = poller(&engine).run_phase(ScanPhase::Discovery, &target()).await;

    assert!(outcome.completed);
    assert_eq!(outcome.polls, 3);
}

#[tokio::test(start_paused = true)]
async fn attack_status_carries_handle_and_tracks_alerts() {
    let engine = ScriptedEngine::new();
    engine
        .then(Endpoint::ActiveScan, handle("5"))
        .then(Endpoint::ActiveScanStatus, status("50"))
        .then(Endpoint::ActiveScanStatus, status("100"))
        .always(Endpoint::Alerts, alerts(2));

    let outcome = poller(&engine).run_phase(ScanPhase::Attack, &target()).await;
    assert!(outcome.completed);

    let status_calls: Vec<_> = engine
        .calls()
        .into_iter()
        .filter(|(e, _)| *e == Endpoint::ActiveScanStatus)
        .collect();
    assert_eq!(status_calls.len(), 2);
    for (_, params) in status_calls {
        assert_eq!(params, vec![("scanId".to_string(), "5".to_string())]);
    }
    // One alert count per successful attack tick
    assert_eq!(engine.calls_to(Endpoint::Alerts), 2);
}

#[tokio::test]
async fn snapshot_failure_reads_as_empty() {
    let engine = ScriptedEngine::new();
    engine.then(Endpoint::Alerts, Reply::Fail);

    let snap = snapshot(&client(&engine), &target()).await;
    assert!(snap.is_empty());

    let calls = engine.calls();
    assert_eq!(
        calls[0].1,
        vec![("baseurl".to_string(), "http://localhost:3000".to_string())]
    );
}
