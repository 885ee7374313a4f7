//! Reads identity and expiry claims out of an access credential.
//!
//! Nothing here verifies the signature: the issuing server is the authority on
//! authenticity, the client only needs `exp` for renewal bookkeeping.

use std::time::Duration;

use jiff::Timestamp;
use jsonwebtoken::{DecodingKey, Validation};
use serde::Deserialize;

use crate::errors::Error;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Claims {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    iat: Option<i64>,
    exp: i64,
}

impl Claims {
    /// `id` may be issued as a string or a number; `sub` is the fallback.
    pub fn identity_id(&self) -> Option<String> {
        match &self.id {
            Some(serde_json::Value::String(id)) => Some(id.clone()),
            Some(serde_json::Value::Number(id)) => Some(id.to_string()),
            _ => self.sub.clone(),
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn issued_at(&self) -> Option<Timestamp> {
        self.iat.and_then(|secs| Timestamp::from_second(secs).ok())
    }

    pub fn expires_at_secs(&self) -> i64 {
        self.exp
    }

    pub fn expires_at(&self) -> Result<Timestamp, Error> {
        Timestamp::from_second(self.exp)
            .map_err(|e| Error::Decode(format!("exp out of range: {e}")))
    }

    /// Time left before expiry, `None` once expired.
    pub fn remaining(&self, now: Timestamp) -> Option<Duration> {
        let left = self.exp.checked_sub(now.as_second())?;
        u64::try_from(left)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

pub fn decode(credential: &str) -> Result<Claims, Error> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    let data =
        jsonwebtoken::decode::<Claims>(credential, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

/// True iff the credential decodes and `exp > now + buffer`.
pub fn is_fresh_enough(credential: &str, buffer: Duration, now: Timestamp) -> bool {
    match decode(credential) {
        Ok(claims) => {
            let buffer = i64::try_from(buffer.as_secs()).unwrap_or(i64::MAX);
            claims.exp > now.as_second().saturating_add(buffer)
        }
        Err(err) => {
            tracing::warn!(error = %err, "credential unreadable; treating as stale");
            false
        }
    }
}
