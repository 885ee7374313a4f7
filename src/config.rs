//! read configuration from a file, the environment or AWS Secrets Manager

use std::path::Path;
use std::time::Duration;

use aws_config::BehaviorVersion;
use reqwest::Url;

use crate::errors::Error;

const DEFAULT_FRESHNESS_BUFFER_SECS: u64 = 30;
const DEFAULT_RENEWAL_TIMEOUT_SECS: u64 = 30;

pub enum ConfigLocation {
    File(String),
    Env,
    Secret,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    pub auth_base_url: String,
    #[serde(default)]
    pub freshness_buffer_secs: Option<u64>,
    /// `0` disables the bound on the renewal call.
    #[serde(default)]
    pub renewal_timeout_secs: Option<u64>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub session_file: Option<String>,
}

impl Config {
    pub fn from_values(
        auth_base_url: impl Into<String>,
        freshness_buffer_secs: Option<u64>,
        renewal_timeout_secs: Option<u64>,
        request_timeout_secs: Option<u64>,
        session_file: Option<String>,
    ) -> Self {
        Self {
            auth_base_url: auth_base_url.into(),
            freshness_buffer_secs,
            renewal_timeout_secs,
            request_timeout_secs,
            session_file,
        }
    }

    pub async fn load(loc: ConfigLocation) -> Result<Self, Error> {
        match loc {
            ConfigLocation::File(path) => Self::from_file(path),
            ConfigLocation::Env => Self::from_env(),
            ConfigLocation::Secret => Self::from_secret().await,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn from_env() -> Result<Self, Error> {
        Ok(Config {
            auth_base_url: std::env::var("AUTH_BASE_URL")
                .map_err(|_| Error::Config("Missing AUTH_BASE_URL env var".to_string()))?,
            freshness_buffer_secs: optional_secs("AUTH_FRESHNESS_BUFFER_SECS")?,
            renewal_timeout_secs: optional_secs("AUTH_RENEWAL_TIMEOUT_SECS")?,
            request_timeout_secs: optional_secs("AUTH_REQUEST_TIMEOUT_SECS")?,
            session_file: std::env::var("AUTH_SESSION_FILE").ok(),
        })
    }

    pub async fn from_secret() -> Result<Self, Error> {
        let secret_arn = std::env::var("AUTH_CONFIG_SECRET_ARN")
            .map_err(|_| Error::Config("Missing AUTH_CONFIG_SECRET_ARN env var".to_string()))?;
        let client = aws_sdk_secretsmanager::Client::new(
            &aws_config::load_defaults(BehaviorVersion::latest()).await,
        );
        let resp = client
            .get_secret_value()
            .secret_id(secret_arn)
            .send()
            .await
            .map_err(|e| Error::Config(format!("Failed to get secret: {}", e)))?;
        let secret = resp.secret_string().ok_or_else(|| {
            Error::Config("Failed to get secret string, returned None".to_string())
        })?;
        Ok(serde_json::from_str(secret)?)
    }

    /// Base URL of the auth service, defaulting to https when no scheme is given.
    pub fn auth_base(&self) -> Result<Url, Error> {
        let raw = self.auth_base_url.trim_end_matches('/');
        let with_scheme = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("https://{}", raw)
        };
        Url::parse(&with_scheme).map_err(|e| {
            Error::Config(format!("Invalid auth base URL '{}': {}", with_scheme, e))
        })
    }

    pub fn freshness_buffer(&self) -> Duration {
        Duration::from_secs(
            self.freshness_buffer_secs
                .unwrap_or(DEFAULT_FRESHNESS_BUFFER_SECS),
        )
    }

    pub fn renewal_timeout(&self) -> Option<Duration> {
        match self
            .renewal_timeout_secs
            .unwrap_or(DEFAULT_RENEWAL_TIMEOUT_SECS)
        {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn optional_secs(var: &str) -> Result<Option<u64>, Error> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{var} must be a whole number of seconds"))),
        Err(_) => Ok(None),
    }
}
