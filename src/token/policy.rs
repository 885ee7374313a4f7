use std::time::Duration;

use crate::errors::Error;

/// How far ahead of real expiry a credential is renewed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FreshnessPolicy {
    /// A credential within this window of `exp` counts as stale.
    pub buffer: Duration,
}

impl FreshnessPolicy {
    pub const DEFAULT_BUFFER: Duration = Duration::from_secs(30);

    pub fn new(buffer: Duration) -> Result<Self, Error> {
        if buffer.is_zero() {
            return Err(Error::Config("Freshness buffer must be > 0".into()));
        }
        if buffer >= Duration::from_secs(24 * 60 * 60) {
            return Err(Error::Config(
                "Freshness buffer must be shorter than a day".into(),
            ));
        }
        Ok(Self { buffer })
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            buffer: Self::DEFAULT_BUFFER,
        }
    }
}
