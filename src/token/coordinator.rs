use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::errors::Error;
use crate::session::{SessionPersistence, SessionStore};
use crate::telemetry::renewal::{RenewalOutcome, RenewalTelemetry};
use crate::termination::SessionTerminationHandler;

use super::claims::is_fresh_enough;
use super::{AccessCredential, FreshnessPolicy, RenewalEndpoint};

type PendingRenewal = Shared<BoxFuture<'static, Option<AccessCredential>>>;

/// Tuning knobs and collaborators for a [`RenewalCoordinator`].
#[derive(Clone)]
pub struct RenewalCoordinatorConfig {
    pub policy: FreshnessPolicy,
    /// `None` waits on the renewal endpoint indefinitely.
    pub renewal_timeout: Option<Duration>,
    pub clock: Arc<dyn Clock>,
    pub persistence: Option<Arc<dyn SessionPersistence>>,
}

impl Default for RenewalCoordinatorConfig {
    fn default() -> Self {
        Self {
            policy: FreshnessPolicy::default(),
            renewal_timeout: Some(Duration::from_secs(30)),
            clock: Arc::new(SystemClock),
            persistence: None,
        }
    }
}

struct InFlight {
    telemetry: RenewalTelemetry,
    renewal: PendingRenewal,
}

enum Slot {
    Ready(AccessCredential),
    Pending(PendingRenewal),
}

/// Hands out a fresh access credential, running at most one renewal at a time.
///
/// Callers that need a renewal while one is already running join it and all
/// observe the same outcome. Clones share the same session and in-flight slot.
#[derive(Clone)]
pub struct RenewalCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    store: SessionStore,
    endpoint: RenewalEndpoint,
    terminator: Arc<dyn SessionTerminationHandler>,
    policy: FreshnessPolicy,
    renewal_timeout: Option<Duration>,
    clock: Arc<dyn Clock>,
    persistence: Option<Arc<dyn SessionPersistence>>,
    pending: Mutex<Option<InFlight>>,
}

impl RenewalCoordinator {
    pub fn new(
        store: SessionStore,
        endpoint: RenewalEndpoint,
        terminator: Arc<dyn SessionTerminationHandler>,
        config: RenewalCoordinatorConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                endpoint,
                terminator,
                policy: config.policy,
                renewal_timeout: config.renewal_timeout,
                clock: config.clock,
                persistence: config.persistence,
                pending: Mutex::new(None),
            }),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    pub fn policy(&self) -> &FreshnessPolicy {
        &self.inner.policy
    }

    /// Returns the cached credential while it is fresh, otherwise the result
    /// of a (possibly shared) renewal. `None` means the session was terminated.
    pub async fn ensure_valid_token(&self) -> Option<AccessCredential> {
        self.ensure(None).await
    }

    /// Like [`ensure_valid_token`](Self::ensure_valid_token), but the server
    /// has refused `rejected`, so it is not reused even if its claims look fresh.
    /// A different cached credential (renewed by someone else) is returned as is.
    pub async fn ensure_valid_token_after_rejection(
        &self,
        rejected: Option<&AccessCredential>,
    ) -> Option<AccessCredential> {
        self.ensure(rejected).await
    }

    pub fn is_renewal_pending(&self) -> bool {
        self.inner.lock_pending().is_some()
    }

    /// Drops the in-flight handle. Callers already awaiting it still settle.
    pub fn reset(&self) {
        self.inner.lock_pending().take();
    }

    async fn ensure(&self, rejected: Option<&AccessCredential>) -> Option<AccessCredential> {
        if let Some(token) = self.inner.usable_cached(rejected) {
            return Some(token);
        }
        match self.join_or_start(rejected) {
            Slot::Ready(token) => Some(token),
            Slot::Pending(renewal) => renewal.await,
        }
    }

    fn join_or_start(&self, rejected: Option<&AccessCredential>) -> Slot {
        let mut slot = self.inner.lock_pending();
        if let Some(in_flight) = slot.as_ref() {
            in_flight.telemetry.emit_join();
            return Slot::Pending(in_flight.renewal.clone());
        }

        // A renewal may have settled between the unlocked check and here.
        if let Some(token) = self.inner.usable_cached(rejected) {
            return Slot::Ready(token);
        }

        let telemetry = RenewalTelemetry::new("ensure_valid_token");
        let attempt_id = telemetry.attempt_id();
        let inner = Arc::clone(&self.inner);
        let run_telemetry = telemetry.clone();
        let renewal = async move {
            let result = inner.perform_renewal(&run_telemetry).await;
            inner.settle(attempt_id);
            result
        }
        .boxed()
        .shared();

        // Installed before anyone polls it, so later callers always join.
        *slot = Some(InFlight {
            telemetry,
            renewal: renewal.clone(),
        });
        Slot::Pending(renewal)
    }
}

impl Inner {
    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<InFlight>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn usable_cached(&self, rejected: Option<&AccessCredential>) -> Option<AccessCredential> {
        let token = self.store.access()?;
        if rejected == Some(&token) {
            debug!("cached credential was rejected by the server; renewal required");
            return None;
        }
        is_fresh_enough(token.as_str(), self.policy.buffer, self.clock.now()).then_some(token)
    }

    fn settle(&self, attempt_id: Uuid) {
        let mut slot = self.lock_pending();
        if slot
            .as_ref()
            .is_some_and(|in_flight| in_flight.telemetry.attempt_id() == attempt_id)
        {
            *slot = None;
        }
    }

    async fn perform_renewal(&self, telemetry: &RenewalTelemetry) -> Option<AccessCredential> {
        let Some(session) = self
            .store
            .get()
            .filter(|s| !s.identity_id().is_empty() && !s.renewal().as_str().is_empty())
        else {
            telemetry.emit_settled(RenewalOutcome::Failed(&Error::MissingCredentials));
            self.terminate(Error::MissingCredentials);
            return None;
        };

        telemetry.emit_start(session.identity_id());
        let call = self.endpoint.renew(session.identity_id(), session.renewal());
        let result = match self.renewal_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| Err(Error::Timeout(limit))),
            None => call.await,
        };

        match result {
            Ok((access, renewal)) => {
                match self.store.replace_credentials(&session, access.clone(), renewal) {
                    Some(updated) => {
                        if let Some(persistence) = &self.persistence
                            && let Err(err) = persistence.save(&updated)
                        {
                            warn!(error = %err, "failed to persist renewed session");
                        }
                        telemetry.emit_settled(RenewalOutcome::Renewed);
                        Some(access)
                    }
                    None => {
                        telemetry.emit_settled(RenewalOutcome::Superseded);
                        None
                    }
                }
            }
            Err(err) => {
                // Only the session the renewal was started for may be terminated.
                if self.store.clear_if(&session) {
                    telemetry.emit_settled(RenewalOutcome::Failed(&err));
                    self.terminate_cleared(err);
                } else {
                    debug!(error = %err, "renewal failed for a session that already ended");
                    telemetry.emit_settled(RenewalOutcome::Superseded);
                }
                None
            }
        }
    }

    fn terminate(&self, reason: Error) {
        self.store.clear();
        self.terminate_cleared(reason);
    }

    fn terminate_cleared(&self, reason: Error) {
        if let Some(persistence) = &self.persistence
            && let Err(err) = persistence.clear()
        {
            warn!(error = %err, "failed to clear persisted session");
        }
        self.terminator.terminate(&reason);
    }
}
