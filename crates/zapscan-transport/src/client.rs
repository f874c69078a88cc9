//! Typed client for the engine's control API
//!
//! Each method issues exactly one call. Failures come back as
//! `TransportError` values; the client keeps no state between calls.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use zapscan_core::{Alert, ScanPhase, Target};

use crate::transport::{Transport, TransportError};
use crate::types::*;

/// Control API client
#[derive(Clone)]
pub struct EngineClient {
    transport: Arc<dyn Transport>,
}

impl EngineClient {
    /// Create a client over any transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Base URL of the engine, for messages
    pub fn endpoint(&self) -> String {
        self.transport.describe()
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &[(&str, &str)],
    ) -> Result<T, TransportError> {
        let value: Value = self.transport.call(endpoint, params).await?;
        serde_json::from_value(value).map_err(|source| TransportError::InvalidJson { endpoint, source })
    }

    // ── Core ─────────────────────────────────────────────────────────────

    /// Engine version string
    pub async fn version(&self) -> Result<String, TransportError> {
        let body: VersionResponse = self.get(Endpoint::Version, &[]).await?;
        body.version.ok_or(TransportError::MissingField {
            endpoint: Endpoint::Version,
            field: "version",
        })
    }

    /// Health check: a reachable engine reports its version, anything else
    /// is a fatal precondition failure
    pub async fn health_check(&self) -> zapscan_core::Result<String> {
        match self.version().await {
            Ok(version) => {
                info!("Engine {} reachable at {}", version, self.endpoint());
                Ok(version)
            }
            Err(e) => Err(zapscan_core::Error::EngineUnavailable {
                endpoint: self.endpoint(),
                reason: e.to_string(),
            }),
        }
    }

    /// Sites currently in the engine's site tree
    pub async fn sites(&self) -> Result<Vec<String>, TransportError> {
        let body: SitesResponse = self.get(Endpoint::Sites, &[]).await?;
        body.sites.ok_or(TransportError::MissingField {
            endpoint: Endpoint::Sites,
            field: "sites",
        })
    }

    /// Visit a URL through the engine so it enters the site tree
    pub async fn access_url(&self, url: &str) -> Result<String, TransportError> {
        self.action(Endpoint::AccessUrl, &[("url", url)]).await
    }

    /// Remove one node (and its children) from the site tree
    pub async fn delete_site_node(&self, url: &str) -> Result<String, TransportError> {
        self.action(Endpoint::DeleteSiteNode, &[("url", url)]).await
    }

    /// Remove every node from the site tree
    pub async fn delete_all_site_nodes(&self) -> Result<String, TransportError> {
        self.action(Endpoint::DeleteAllSiteNodes, &[]).await
    }

    async fn action(
        &self,
        endpoint: Endpoint,
        params: &[(&str, &str)],
    ) -> Result<String, TransportError> {
        let body: ActionResponse = self.get(endpoint, params).await?;
        body.result
            .map(|r| r.into_string())
            .ok_or(TransportError::MissingField {
                endpoint,
                field: "result",
            })
    }

    /// Alerts under the target's base URL, in engine order
    pub async fn alerts(&self, target: &Target) -> Result<Vec<Alert>, TransportError> {
        let body: AlertsResponse = self
            .get(Endpoint::Alerts, &[("baseurl", target.as_str())])
            .await?;
        body.alerts.ok_or(TransportError::MissingField {
            endpoint: Endpoint::Alerts,
            field: "alerts",
        })
    }

    // ── Phases ───────────────────────────────────────────────────────────

    /// Start a phase against the target.
    ///
    /// A response without a `scan` field means the phase did not start.
    pub async fn start_phase(
        &self,
        phase: ScanPhase,
        target: &Target,
    ) -> Result<PhaseHandle, TransportError> {
        let endpoint = Endpoint::start_of(phase);
        let body: ScanStartResponse = self.get(endpoint, &[("url", target.as_str())]).await?;
        let handle = body
            .scan
            .map(|s| PhaseHandle::new(s.into_string()))
            .ok_or(TransportError::MissingField {
                endpoint,
                field: "scan",
            })?;
        debug!("{} started with handle {}", phase, handle);
        Ok(handle)
    }

    /// Current progress of a phase. Only the attack status call carries the
    /// handle; discovery status is global.
    pub async fn phase_status(
        &self,
        phase: ScanPhase,
        handle: &PhaseHandle,
    ) -> Result<Progress, TransportError> {
        let endpoint = Endpoint::status_of(phase);
        let body: StatusResponse = if phase.status_needs_handle() {
            self.get(endpoint, &[("scanId", handle.as_str())]).await?
        } else {
            self.get(endpoint, &[]).await?
        };

        body.status
            .as_ref()
            .and_then(Progress::from_raw)
            .ok_or(TransportError::MissingField {
                endpoint,
                field: "status",
            })
    }
}
