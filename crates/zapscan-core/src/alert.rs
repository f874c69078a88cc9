//! Alerts - findings reported by the scanning engine

use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::risk::{Confidence, Risk};

/// One finding reported by the engine.
///
/// Identity is the engine-assigned `id`; two alerts with the same name and
/// URL are distinct findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Engine-assigned alert identifier
    #[serde(default, deserialize_with = "lenient::string_or_number")]
    pub id: String,

    /// Scan rule that raised the alert
    #[serde(
        rename = "pluginId",
        default,
        deserialize_with = "lenient::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub plugin_id: Option<String>,

    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub risk: Risk,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default)]
    pub url: String,

    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub param: Option<String>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub attack: Option<String>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub evidence: Option<String>,

    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub solution: Option<String>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub reference: Option<String>,

    /// CWE identifier (`-1` when the rule has none)
    #[serde(rename = "cweid", default, deserialize_with = "lenient::optional_i32")]
    pub cwe_id: Option<i32>,
    /// WASC identifier (`-1` when the rule has none)
    #[serde(rename = "wascid", default, deserialize_with = "lenient::optional_i32")]
    pub wasc_id: Option<i32>,
}

impl Alert {
    /// Create a new alert builder
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> AlertBuilder {
        AlertBuilder::new(id, name)
    }
}

/// Builder for constructing alerts
pub struct AlertBuilder {
    alert: Alert,
}

impl AlertBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            alert: Alert {
                id: id.into(),
                plugin_id: None,
                name: name.into(),
                risk: Risk::Informational,
                confidence: Confidence::Medium,
                url: String::new(),
                method: None,
                param: None,
                attack: None,
                evidence: None,
                description: String::new(),
                solution: None,
                reference: None,
                cwe_id: None,
                wasc_id: None,
            },
        }
    }

    pub fn plugin_id(mut self, plugin_id: impl Into<String>) -> Self {
        self.alert.plugin_id = Some(plugin_id.into());
        self
    }

    pub fn risk(mut self, risk: Risk) -> Self {
        self.alert.risk = risk;
        self
    }

    pub fn confidence(mut self, confidence: Confidence) -> Self {
        self.alert.confidence = confidence;
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.alert.url = url.into();
        self
    }

    pub fn param(mut self, param: impl Into<String>) -> Self {
        self.alert.param = Some(param.into());
        self
    }

    pub fn attack(mut self, attack: impl Into<String>) -> Self {
        self.alert.attack = Some(attack.into());
        self
    }

    pub fn evidence(mut self, evidence: impl Into<String>) -> Self {
        self.alert.evidence = Some(evidence.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.alert.description = description.into();
        self
    }

    pub fn solution(mut self, solution: impl Into<String>) -> Self {
        self.alert.solution = Some(solution.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.alert.reference = Some(reference.into());
        self
    }

    pub fn cwe(mut self, cwe_id: i32) -> Self {
        self.alert.cwe_id = Some(cwe_id);
        self
    }

    pub fn wasc(mut self, wasc_id: i32) -> Self {
        self.alert.wasc_id = Some(wasc_id);
        self
    }

    pub fn build(self) -> Alert {
        self.alert
    }
}
