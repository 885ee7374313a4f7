use reqwest::{Client, Url, header};
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::Error;

use super::{AccessCredential, RenewalCredential};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenewalResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// `GET <auth-base>/auth/refresh?id=<identity>` authorized with the renewal credential.
#[derive(Clone, Debug)]
pub struct RenewalEndpoint {
    http: Client,
    auth_base: Url,
}

impl RenewalEndpoint {
    pub fn new(http: Client, auth_base: Url) -> Self {
        Self { http, auth_base }
    }

    pub fn url_for(&self, identity_id: &str) -> String {
        format!(
            "{}/auth/refresh?id={}",
            self.auth_base.as_str().trim_end_matches('/'),
            urlencoding::encode(identity_id)
        )
    }

    pub async fn renew(
        &self,
        identity_id: &str,
        renewal: &RenewalCredential,
    ) -> Result<(AccessCredential, RenewalCredential), Error> {
        let resp = self
            .http
            .get(self.url_for(identity_id))
            .header(header::AUTHORIZATION, renewal.bearer())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("renewal rejected: status={} identity='{}'", status, identity_id);
            return Err(Error::RenewalRejected(status, body));
        }
        let body = resp.text().await?;

        let parsed: RenewalResponse = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedRenewal(format!("body is not valid JSON: {e}")))?;
        let access = parsed
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::MalformedRenewal("missing accessToken".into()))?;
        let refresh = parsed
            .refresh_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::MalformedRenewal("missing refreshToken".into()))?;

        info!("credentials renewed: identity='{}'", identity_id);
        Ok((access.into(), refresh.into()))
    }
}
