use std::sync::Arc;

use reqwest::{Client, Request, RequestBuilder, Response};
use tracing::{info, warn};

use crate::authorizer::RequestAuthorizer;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::errors::Error;
use crate::recovery::RecoveryPolicy;
use crate::session::{JsonFileSessionPersistence, Session, SessionPersistence, SessionStore};
use crate::termination::{LogTermination, SessionTerminationHandler};
use crate::token::{
    FreshnessPolicy, RenewalCoordinator, RenewalCoordinatorConfig, RenewalEndpoint,
};

/// Owner of the credential lifecycle for one client instance.
///
/// Cloning shares the same session, in-flight renewal and HTTP pool.
#[derive(Clone)]
pub struct AuthContext {
    http_client: Client,
    store: SessionStore,
    coordinator: RenewalCoordinator,
    authorizer: RequestAuthorizer,
    recovery: RecoveryPolicy,
    persistence: Option<Arc<dyn SessionPersistence>>,
}

pub struct AuthContextBuilder {
    config: Config,
    http_client: Option<Client>,
    clock: Arc<dyn Clock>,
    terminator: Arc<dyn SessionTerminationHandler>,
    persistence: Option<Arc<dyn SessionPersistence>>,
}

impl AuthContextBuilder {
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn terminator(mut self, terminator: Arc<dyn SessionTerminationHandler>) -> Self {
        self.terminator = terminator;
        self
    }

    /// Overrides the `session_file` from the config.
    pub fn persistence(mut self, persistence: Arc<dyn SessionPersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn build(self) -> Result<AuthContext, Error> {
        let auth_base = self.config.auth_base()?;
        let policy = FreshnessPolicy::new(self.config.freshness_buffer())?;
        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.config.request_timeout() {
                    builder = builder.timeout(timeout);
                }
                builder.build()?
            }
        };
        let persistence = self.persistence.or_else(|| {
            self.config.session_file.as_ref().map(|path| {
                Arc::new(JsonFileSessionPersistence::new(path)) as Arc<dyn SessionPersistence>
            })
        });

        let store = SessionStore::new();
        let coordinator = RenewalCoordinator::new(
            store.clone(),
            RenewalEndpoint::new(http_client.clone(), auth_base),
            self.terminator,
            RenewalCoordinatorConfig {
                policy,
                renewal_timeout: self.config.renewal_timeout(),
                clock: self.clock,
                persistence: persistence.clone(),
            },
        );
        let authorizer = RequestAuthorizer::new(coordinator.clone());
        let recovery = RecoveryPolicy::new(http_client.clone(), authorizer.clone());

        Ok(AuthContext {
            http_client,
            store,
            coordinator,
            authorizer,
            recovery,
            persistence,
        })
    }
}

impl AuthContext {
    pub fn builder(config: Config) -> AuthContextBuilder {
        AuthContextBuilder {
            config,
            http_client: None,
            clock: Arc::new(SystemClock),
            terminator: Arc::new(LogTermination),
            persistence: None,
        }
    }

    pub fn build(config: Config) -> Result<Self, Error> {
        Self::builder(config).build()
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub fn authorizer(&self) -> RequestAuthorizer {
        self.authorizer.clone()
    }

    pub fn coordinator(&self) -> RenewalCoordinator {
        self.coordinator.clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.store.get()
    }

    /// Loads a previously persisted session. Returns whether one was found.
    pub fn restore(&self) -> Result<bool, Error> {
        let Some(persistence) = &self.persistence else {
            return Ok(false);
        };
        match persistence.load()? {
            Some(session) => {
                info!("session restored: identity='{}'", session.identity_id());
                self.store.set(session);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn login(&self, session: Session) {
        info!("session started: identity='{}'", session.identity_id());
        if let Some(persistence) = &self.persistence
            && let Err(err) = persistence.save(&session)
        {
            warn!(error = %err, "failed to persist session");
        }
        self.store.set(session);
    }

    pub fn logout(&self) {
        self.store.clear();
        if let Some(persistence) = &self.persistence
            && let Err(err) = persistence.clear()
        {
            warn!(error = %err, "failed to clear persisted session");
        }
        info!("session ended");
    }

    /// Forgets in-memory state only; a persisted session survives for the next run.
    pub fn teardown(&self) {
        self.coordinator.reset();
        self.store.clear();
    }

    pub async fn execute(&self, request: Request) -> Result<Response, Error> {
        self.recovery.execute(request).await
    }

    pub async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        self.execute(request.build()?).await
    }
}
