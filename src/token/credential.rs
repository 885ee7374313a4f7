use std::fmt;

use serde::{Deserialize, Serialize};

/// Short-lived bearer credential attached to outbound calls.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessCredential(String);

/// Longer-lived credential used only to obtain a new access credential.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenewalCredential(String);

impl AccessCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token value suitable for Authorization headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl RenewalCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl From<String> for AccessCredential {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AccessCredential {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RenewalCredential {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RenewalCredential {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessCredential(len={})", self.0.len())
    }
}

impl fmt::Debug for RenewalCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RenewalCredential(len={})", self.0.len())
    }
}
