use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::token::{AccessCredential, RenewalCredential};

/// The authenticated identity together with its live credential pair.
///
/// Every field is required, so a half-populated session cannot be built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    identity_id: String,
    access: AccessCredential,
    renewal: RenewalCredential,
}

impl Session {
    pub fn new(
        identity_id: impl Into<String>,
        access: impl Into<AccessCredential>,
        renewal: impl Into<RenewalCredential>,
    ) -> Self {
        Self {
            identity_id: identity_id.into(),
            access: access.into(),
            renewal: renewal.into(),
        }
    }

    pub fn identity_id(&self) -> &str {
        &self.identity_id
    }

    pub fn access(&self) -> &AccessCredential {
        &self.access
    }

    pub fn renewal(&self) -> &RenewalCredential {
        &self.renewal
    }

    /// Whether both sessions carry the same identity and renewal credential.
    pub fn same_grant(&self, other: &Session) -> bool {
        self.identity_id == other.identity_id && self.renewal == other.renewal
    }

    /// Same identity, new credential pair.
    pub fn renewed(&self, access: AccessCredential, renewal: RenewalCredential) -> Self {
        Self {
            identity_id: self.identity_id.clone(),
            access,
            renewal,
        }
    }
}

/// Process-wide holder of the current session. Clones share state.
#[derive(Clone, Default)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            current: Arc::new(RwLock::new(Some(session))),
        }
    }

    pub fn get(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn access(&self) -> Option<AccessCredential> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.access.clone())
    }

    pub fn set(&self, session: Session) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Swaps the credential pair in place, keeping the identity, but only while
    /// the stored session still holds the grant in `expected`. Returns the
    /// updated session, or `None` if the store was emptied or replaced meanwhile.
    pub fn replace_credentials(
        &self,
        expected: &Session,
        access: AccessCredential,
        renewal: RenewalCredential,
    ) -> Option<Session> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let renewed = current
            .as_ref()
            .filter(|session| session.same_grant(expected))?
            .renewed(access, renewal);
        *current = Some(renewed.clone());
        Some(renewed)
    }

    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Clears the store only while it still holds the grant in `expected`.
    pub fn clear_if(&self, expected: &Session) -> bool {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if current.as_ref().is_some_and(|session| session.same_grant(expected)) {
            *current = None;
            true
        } else {
            false
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}
