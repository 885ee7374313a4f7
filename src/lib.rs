//! Bearer-credential lifecycle for HTTP clients: proactive single-flight
//! renewal of a short-lived access credential, and one transparent retry when
//! the server rejects a call with 401.

mod authorizer;
pub mod clock;
pub mod config;
pub mod errors;
pub mod recovery;
mod request_context;
pub mod session;
pub mod telemetry;
pub mod termination;
pub mod token;

pub use authorizer::RequestAuthorizer;
pub use clock::{Clock, SystemClock};
pub use config::{Config, ConfigLocation};
pub use errors::Error;
pub use request_context::{AuthContext, AuthContextBuilder};
pub use session::{Session, SessionStore};
pub use termination::{LogTermination, SessionTerminationHandler};
pub use token::{AccessCredential, RenewalCoordinator, RenewalCredential};
