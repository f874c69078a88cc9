//! In-memory engine for driving the orchestrator in tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use zapscan_core::{Alert, Target};
use zapscan_scan::{ReportSink, ScanRunSummary};
use zapscan_transport::{Endpoint, EngineClient, Transport, TransportError};

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Fail,
}

#[derive(Default)]
struct Script {
    queue: VecDeque<Reply>,
    fallback: Option<Reply>,
}

/// Replies are consumed in order per endpoint; once a queue is empty the
/// endpoint's fallback is used, and without one the call fails
#[derive(Default)]
pub struct ScriptedEngine {
    scripts: Mutex<HashMap<Endpoint, Script>>,
    calls: Mutex<Vec<(Endpoint, Vec<(String, String)>)>>,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn then(&self, endpoint: Endpoint, reply: Reply) -> &Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .queue
            .push_back(reply);
        self
    }

    pub fn always(&self, endpoint: Endpoint, reply: Reply) -> &Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .fallback = Some(reply);
        self
    }

    pub fn calls(&self) -> Vec<(Endpoint, Vec<(String, String)>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| *e == endpoint)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedEngine {
    async fn call(
        &self,
        endpoint: Endpoint,
        params: &[(&str, &str)],
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push((
            endpoint,
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));

        let reply = {
            let mut scripts = self.scripts.lock().unwrap();
            scripts
                .get_mut(&endpoint)
                .and_then(|s| s.queue.pop_front().or_else(|| s.fallback.clone()))
        };

        match reply {
            Some(Reply::Json(value)) => Ok(value),
            _ => Err(TransportError::Status {
                endpoint,
                status: 503,
                message: "engine unavailable".into(),
            }),
        }
    }

    fn describe(&self) -> String {
        "scripted://engine".into()
    }
}

pub fn client(engine: &Arc<ScriptedEngine>) -> EngineClient {
    EngineClient::new(engine.clone())
}

pub fn target() -> Target {
    Target::new("http://localhost:3000").unwrap()
}

pub fn version(v: &str) -> Reply {
    Reply::Json(json!({ "version": v }))
}

pub fn handle(id: &str) -> Reply {
    Reply::Json(json!({ "scan": id }))
}

pub fn status(progress: &str) -> Reply {
    Reply::Json(json!({ "status": progress }))
}

pub fn alerts(n: usize) -> Reply {
    let list: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "id": i.to_string(),
                "name": format!("Alert {}", i),
                "risk": "Low",
                "confidence": "Medium",
                "url": "http://localhost:3000/",
                "cweid": "-1",
                "wascid": "-1"
            })
        })
        .collect();
    Reply::Json(json!({ "alerts": list }))
}

/// Keeps every published summary
#[derive(Default)]
pub struct RecordingSink {
    pub published: Mutex<Vec<ScanRunSummary>>,
}

impl ReportSink for RecordingSink {
    fn publish(&self, summary: &ScanRunSummary) -> zapscan_core::Result<()> {
        self.published.lock().unwrap().push(summary.clone());
        Ok(())
    }
}

pub fn alert_ids(alerts: &[Alert]) -> Vec<String> {
    alerts.iter().map(|a| a.id.clone()).collect()
}
