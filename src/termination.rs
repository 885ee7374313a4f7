use tracing::error;

use crate::errors::Error;

/// Invoked once per unrecoverable session failure, after the session has been
/// cleared. Implementations typically send the user back to a login screen.
pub trait SessionTerminationHandler: Send + Sync {
    fn terminate(&self, reason: &Error);
}

impl<F> SessionTerminationHandler for F
where
    F: Fn(&Error) + Send + Sync,
{
    fn terminate(&self, reason: &Error) {
        self(reason)
    }
}

/// Default handler: records the termination and nothing else.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTermination;

impl SessionTerminationHandler for LogTermination {
    fn terminate(&self, reason: &Error) {
        error!(reason = %reason, "session.terminated");
    }
}
