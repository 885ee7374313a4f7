use reqwest::{Client, Request, Response, StatusCode};
use tracing::warn;

use crate::authorizer::RequestAuthorizer;
use crate::errors::Error;

use super::{CallOutcome, CallState, OutboundCall};

const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Sends authorized requests and absorbs a single authorization failure per
/// call by renewing the credential and redispatching once.
#[derive(Clone)]
pub struct RecoveryPolicy {
    http: Client,
    authorizer: RequestAuthorizer,
}

impl RecoveryPolicy {
    pub fn new(http: Client, authorizer: RequestAuthorizer) -> Self {
        Self { http, authorizer }
    }

    /// Non-401 responses, successful or not, are returned unchanged. A 401
    /// that survives the retry (or cannot be retried) becomes [`Error::Auth`].
    pub async fn execute(&self, request: Request) -> Result<Response, Error> {
        let mut call = OutboundCall::new(request);
        let credential = self.authorizer.authorize(call.request_mut()).await?;
        call.set_credential(credential);

        loop {
            let retried = call.retried();
            let rejected = call.credential().cloned();
            let replay = call.replay();
            let response = self.http.execute(call.into_request()).await?;
            let status = response.status();

            match CallState::Sent.on_response(status, retried) {
                CallState::Done => {
                    finish(CallState::Done, retried, status);
                    return Ok(response);
                }
                CallState::Retrying => {
                    warn!(
                        url = %response.url(),
                        "request rejected with 401; renewing credential and retrying once"
                    );
                    let Some(request) = replay else {
                        finish(CallState::Failed, retried, status);
                        return Err(auth_error(response, "request body cannot be replayed").await);
                    };
                    let renewed = self
                        .authorizer
                        .coordinator()
                        .ensure_valid_token_after_rejection(rejected.as_ref())
                        .await;
                    match (CallState::Retrying.on_renewal(renewed.is_some()), renewed) {
                        (CallState::Sent, Some(credential)) => {
                            call = OutboundCall::retry(request, credential)?;
                        }
                        _ => {
                            finish(CallState::Failed, retried, status);
                            return Err(auth_error(response, "credential renewal failed").await);
                        }
                    }
                }
                _ => {
                    warn!(
                        url = %response.url(),
                        "request rejected with 401 after renewal; giving up"
                    );
                    finish(CallState::Failed, retried, status);
                    return Err(auth_error(response, "rejected again after renewal").await);
                }
            }
        }
    }
}

fn finish(state: CallState, retried: bool, status: StatusCode) {
    CallOutcome {
        state,
        retried,
        status,
    }
    .log();
}

async fn auth_error(response: Response, reason: &str) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body = if body.len() <= MAX_ERROR_BODY_LENGTH {
        body
    } else {
        let cut = (0..=MAX_ERROR_BODY_LENGTH)
            .rev()
            .find(|idx| body.is_char_boundary(*idx))
            .unwrap_or(0);
        format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
    };
    Error::Auth(format!("{status}: {reason}; body='{body}'"))
}
