//! Scan target definition

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The asset under test.
///
/// The URL is kept exactly as given: it is passed verbatim as the `url` /
/// `baseurl` query parameter and is never normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    /// Create a target, rejecting an empty or blank URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::InvalidTarget("target URL must not be empty".into()));
        }
        Ok(Target(url))
    }

    /// The URL as given
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Target {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_kept_verbatim() {
        let target = Target::new("http://localhost:3000/app/?x=1").unwrap();
        assert_eq!(target.as_str(), "http://localhost:3000/app/?x=1");
        assert_eq!(target.to_string(), "http://localhost:3000/app/?x=1");
    }

    #[test]
    fn test_empty_target_rejected() {
        assert!(matches!(Target::new(""), Err(Error::InvalidTarget(_))));
        assert!(matches!(Target::new("   "), Err(Error::InvalidTarget(_))));
    }
}
