//! Risk and confidence levels reported with each alert

use serde::{Deserialize, Serialize};

/// Risk level assigned to an alert by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Risk {
    /// Informational alert, no direct security impact
    #[default]
    Informational,
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
    /// The engine reported a level this build does not know about
    #[serde(other)]
    Unknown,
}

impl Risk {
    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Risk::Informational => "Informational",
            Risk::Low => "Low",
            Risk::Medium => "Medium",
            Risk::High => "High",
            Risk::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Risk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confidence the engine has in an alert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(rename = "False Positive")]
    FalsePositive,
    Low,
    #[default]
    Medium,
    High,
    /// Manually confirmed by a user
    Confirmed,
    #[serde(other)]
    Unknown,
}

impl Confidence {
    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::FalsePositive => "False Positive",
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
            Confidence::Confirmed => "Confirmed",
            Confidence::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_from_engine_json() {
        let risk: Risk = serde_json::from_str("\"Medium\"").unwrap();
        assert_eq!(risk, Risk::Medium);

        let risk: Risk = serde_json::from_str("\"Catastrophic\"").unwrap();
        assert_eq!(risk, Risk::Unknown);
    }

    #[test]
    fn test_risk_ordering() {
        assert!(Risk::High > Risk::Medium);
        assert!(Risk::Medium > Risk::Low);
        assert!(Risk::Low > Risk::Informational);
    }

    #[test]
    fn test_confidence_from_engine_json() {
        let c: Confidence = serde_json::from_str("\"Confirmed\"").unwrap();
        assert_eq!(c, Confidence::Confirmed);
        let c: Confidence = serde_json::from_str("\"False Positive\"").unwrap();
        assert_eq!(c, Confidence::FalsePositive);
    }
}
