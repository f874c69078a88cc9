//! Alert snapshots and the per-phase count delta

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, warn};

use zapscan_core::{Alert, Target};
use zapscan_transport::{EngineClient, TransportError};

/// The alert set for a target's base URL at one instant
#[derive(Debug, Clone, Serialize)]
pub struct AlertSnapshot {
    pub target: Target,
    pub taken_at: DateTime<Local>,
    pub alerts: Vec<Alert>,
}

impl AlertSnapshot {
    pub fn new(target: Target, alerts: Vec<Alert>) -> Self {
        Self {
            target,
            taken_at: Local::now(),
            alerts,
        }
    }

    /// A snapshot with no alerts
    pub fn empty(target: Target) -> Self {
        Self::new(target, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

/// Capture the alert set, surfacing a failed call to the caller
pub async fn try_snapshot(
    client: &EngineClient,
    target: &Target,
) -> Result<AlertSnapshot, TransportError> {
    let alerts = client.alerts(target).await?;
    debug!("Captured {} alerts for {}", alerts.len(), target);
    Ok(AlertSnapshot::new(target.clone(), alerts))
}

/// Capture the alert set. A failed call reads as "no alerts".
pub async fn snapshot(client: &EngineClient, target: &Target) -> AlertSnapshot {
    match try_snapshot(client, target).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Could not fetch alerts for {}: {}", target, e);
            AlertSnapshot::empty(target.clone())
        }
    }
}

/// Alerts gained between two snapshots, by count.
///
/// Assumes the engine never retracts or merges alerts between calls; if it
/// does, the result can be negative.
pub fn delta(before: &AlertSnapshot, after: &AlertSnapshot) -> i64 {
    after.len() as i64 - before.len() as i64
}
