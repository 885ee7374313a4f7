mod persistence;
mod store;

pub use persistence::{JsonFileSessionPersistence, SessionPersistence};
pub use store::{Session, SessionStore};
