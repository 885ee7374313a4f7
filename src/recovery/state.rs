use std::fmt;

use reqwest::StatusCode;

/// Lifecycle of one [`OutboundCall`](super::OutboundCall).
///
/// `Sent -> Done` for anything but a 401, `Sent -> Retrying` on the first 401,
/// `Retrying -> Sent` once a credential is renewed, and `-> Failed` otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallState {
    Sent,
    Retrying,
    Done,
    Failed,
}

impl CallState {
    pub fn on_response(self, status: StatusCode, retried: bool) -> Self {
        match self {
            CallState::Sent if status != StatusCode::UNAUTHORIZED => CallState::Done,
            CallState::Sent if !retried => CallState::Retrying,
            CallState::Sent => CallState::Failed,
            other => other,
        }
    }

    pub fn on_renewal(self, renewed: bool) -> Self {
        match self {
            CallState::Retrying if renewed => CallState::Sent,
            CallState::Retrying => CallState::Failed,
            other => other,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CallState::Done | CallState::Failed)
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallState::Sent => write!(f, "sent"),
            CallState::Retrying => write!(f, "retrying"),
            CallState::Done => write!(f, "done"),
            CallState::Failed => write!(f, "failed"),
        }
    }
}
