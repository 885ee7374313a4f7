use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::Error;

/// How a renewal attempt settled.
#[derive(Clone, Copy, Debug)]
pub enum RenewalOutcome<'a> {
    Renewed,
    Failed(&'a Error),
    /// The session the attempt was started for ended before it settled.
    Superseded,
}

/// Structured events for one renewal attempt and the callers that joined it.
///
/// Every event carries the same `attempt_id`, so a start, its joins and the
/// settlement can be correlated in the log stream.
#[derive(Clone, Debug)]
pub struct RenewalTelemetry {
    attempt_id: Uuid,
    context: String,
}

impl RenewalTelemetry {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            context: context.into(),
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn emit_start(&self, identity_id: &str) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            identity = identity_id,
            "renewal.start"
        );
    }

    pub fn emit_join(&self) {
        event!(
            Level::DEBUG,
            attempt_id = %self.attempt_id,
            context = %self.context,
            "renewal.join"
        );
    }

    pub fn emit_settled(&self, outcome: RenewalOutcome<'_>) {
        let (attempt_id, context) = (&self.attempt_id, self.context.as_str());
        match outcome {
            RenewalOutcome::Renewed => {
                event!(Level::INFO, %attempt_id, context, "renewal.success")
            }
            RenewalOutcome::Failed(error) => {
                event!(Level::ERROR, %attempt_id, context, %error, "renewal.failure")
            }
            RenewalOutcome::Superseded => {
                event!(Level::WARN, %attempt_id, context, "renewal.superseded")
            }
        }
    }
}
