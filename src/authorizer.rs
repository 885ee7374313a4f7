use reqwest::Request;
use reqwest::header::{AUTHORIZATION, HeaderValue};

use crate::errors::Error;
use crate::token::{AccessCredential, RenewalCoordinator};

/// Attaches a valid bearer credential to outbound requests.
///
/// This is the only entry point other subsystems (device registration and the
/// like) should use to obtain a credential; it never mutates the session itself.
#[derive(Clone)]
pub struct RequestAuthorizer {
    coordinator: RenewalCoordinator,
}

impl RequestAuthorizer {
    pub fn new(coordinator: RenewalCoordinator) -> Self {
        Self { coordinator }
    }

    pub(crate) fn coordinator(&self) -> &RenewalCoordinator {
        &self.coordinator
    }

    /// A credential that is valid for at least the freshness buffer, if the
    /// session is still alive.
    pub async fn credential(&self) -> Option<AccessCredential> {
        self.coordinator.ensure_valid_token().await
    }

    /// Sets the Authorization header, or removes it when no credential is
    /// available. Returns the credential that was attached.
    pub async fn authorize(
        &self,
        request: &mut Request,
    ) -> Result<Option<AccessCredential>, Error> {
        let credential = self.credential().await;
        attach_bearer(request, credential.as_ref())?;
        Ok(credential)
    }
}

pub(crate) fn attach_bearer(
    request: &mut Request,
    credential: Option<&AccessCredential>,
) -> Result<(), Error> {
    match credential {
        Some(credential) => {
            let mut value = HeaderValue::from_str(&credential.bearer())
                .map_err(|e| Error::InvalidHeader(format!("access credential: {e}")))?;
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        None => {
            request.headers_mut().remove(AUTHORIZATION);
        }
    }
    Ok(())
}
