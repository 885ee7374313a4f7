pub mod claims;
mod coordinator;
mod credential;
mod endpoint;
mod policy;

pub use claims::Claims;
pub use coordinator::{RenewalCoordinator, RenewalCoordinatorConfig};
pub use credential::{AccessCredential, RenewalCredential};
pub use endpoint::RenewalEndpoint;
pub use policy::FreshnessPolicy;
