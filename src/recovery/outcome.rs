use reqwest::StatusCode;
use tracing::Level;
use tracing::event;

use super::CallState;

#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub state: CallState,
    pub retried: bool,
    pub status: StatusCode,
}

impl CallOutcome {
    pub fn log(&self) {
        event!(
            Level::INFO,
            state = %self.state,
            retried = self.retried,
            status = self.status.as_u16(),
            "recovery.outcome"
        );
    }
}
