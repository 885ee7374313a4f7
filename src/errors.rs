use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(String),

    /// The access credential could not be read. Callers treat this as "needs renewal".
    #[error("credential decode failed: {0}")]
    Decode(String),

    /// Renewal was attempted without an identity or renewal credential in the session.
    #[error("session has no identity or renewal credential")]
    MissingCredentials,

    #[error("renewal endpoint returned {0}: {1}")]
    RenewalRejected(StatusCode, String),

    #[error("malformed renewal response: {0}")]
    MalformedRenewal(String),

    #[error("renewal did not settle within {0:?}")]
    Timeout(Duration),

    /// Authorization failure that could not be recovered by a renewal and retry.
    #[error("authorization failed: {0}")]
    Auth(String),

    #[error("invalid header value: {0}")]
    InvalidHeader(String),
}

impl Error {
    /// Renewal endpoint unreachable, non-2xx, malformed or too slow.
    pub fn is_renewal_failure(&self) -> bool {
        matches!(
            self,
            Error::RenewalRejected(_, _)
                | Error::MalformedRenewal(_)
                | Error::Timeout(_)
                | Error::Http(_)
        )
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error::Decode(err.to_string())
    }
}
