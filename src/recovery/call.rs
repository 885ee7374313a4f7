use reqwest::Request;

use crate::authorizer::attach_bearer;
use crate::errors::Error;
use crate::token::AccessCredential;

/// One logical request plus the bookkeeping needed to retry it at most once.
#[derive(Debug)]
pub struct OutboundCall {
    request: Request,
    retried: bool,
    credential: Option<AccessCredential>,
}

impl OutboundCall {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            retried: false,
            credential: None,
        }
    }

    /// The redispatch of a rejected call, carrying the renewed credential.
    pub fn retry(mut request: Request, credential: AccessCredential) -> Result<Self, Error> {
        attach_bearer(&mut request, Some(&credential))?;
        Ok(Self {
            request,
            retried: true,
            credential: Some(credential),
        })
    }

    pub fn retried(&self) -> bool {
        self.retried
    }

    /// Credential attached to the request, if any.
    pub fn credential(&self) -> Option<&AccessCredential> {
        self.credential.as_ref()
    }

    pub(crate) fn set_credential(&mut self, credential: Option<AccessCredential>) {
        self.credential = credential;
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// A copy for redispatch; `None` when the body is a stream.
    pub fn replay(&self) -> Option<Request> {
        self.request.try_clone()
    }

    pub fn into_request(self) -> Request {
        self.request
    }
}
