mod call;
mod outcome;
mod policy;
mod state;

pub use call::OutboundCall;
pub use outcome::CallOutcome;
pub use policy::RecoveryPolicy;
pub use state::CallState;
