//! Decision dispatch: maps intercepted invocations to policy authority
//! queries and collapses every failure mode to "do not block".
//!
//! The authority lives in another process; a query may block on a round
//! trip, so every query runs under a bounded timeout and no lock is held
//! across it. Only an explicit, affirmative denial from the authority
//! changes proxy behavior. An unreachable, slow, or erroring authority
//! leaves the wrapped firewall functioning exactly as before
//! interposition.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::types::{ComponentIdentity, PartyId, PayloadDescriptor};

/// Outcome of consulting the policy authority for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The authority affirmatively allowed the action.
    Allow,
    /// The authority explicitly denied the action; short-circuit.
    Deny,
    /// The authority abstained or could not be consulted; treat as allow.
    NoOpinion,
}

impl Decision {
    /// Whether the proxy should forward the invocation to the wrapped
    /// target. Only an explicit denial blocks.
    pub fn permits_forward(self) -> bool {
        !matches!(self, Decision::Deny)
    }
}

/// Error raised by a policy authority implementation.
#[derive(Debug, Error)]
#[error("authority error: {0}")]
pub struct AuthorityError(pub String);

/// The centrally reachable policy authority.
///
/// `Ok(false)` means "explicitly denied". `Ok(true)` means "allowed or
/// no rule"; callers cannot distinguish the two.
#[async_trait]
pub trait DecisionAuthority: Send + Sync {
    /// May `caller` bind the service component named by `component`?
    async fn check_service(
        &self,
        payload: Option<&PayloadDescriptor>,
        component: &ComponentIdentity,
        caller: PartyId,
    ) -> Result<bool, AuthorityError>;

    /// May `caller` deliver `payload` as a broadcast to `receiver`?
    async fn check_broadcast(
        &self,
        payload: &PayloadDescriptor,
        receiver: PartyId,
        caller: PartyId,
    ) -> Result<bool, AuthorityError>;
}

/// Query timeout applied when none is configured.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(2000);

/// Fail-open query client over a [`DecisionAuthority`].
///
/// Cheap to clone; concurrent queries share the authority reference and
/// nothing else.
#[derive(Clone)]
pub struct DecisionClient {
    authority: Arc<dyn DecisionAuthority>,
    timeout: Duration,
}

impl DecisionClient {
    /// Build a client with an explicit per-query timeout.
    pub fn new(authority: Arc<dyn DecisionAuthority>, timeout: Duration) -> Self {
        Self { authority, timeout }
    }

    /// Build a client with [`DEFAULT_QUERY_TIMEOUT`].
    pub fn with_default_timeout(authority: Arc<dyn DecisionAuthority>) -> Self {
        Self::new(authority, DEFAULT_QUERY_TIMEOUT)
    }

    /// Evaluate a service bind.
    ///
    /// Without a component identity there is nothing to evaluate, so the
    /// result is [`Decision::NoOpinion`].
    pub async fn service_decision(
        &self,
        payload: Option<&PayloadDescriptor>,
        component: Option<&ComponentIdentity>,
        caller: PartyId,
    ) -> Decision {
        let Some(component) = component else {
            return Decision::NoOpinion;
        };
        let query = self.authority.check_service(payload, component, caller);
        self.collapse("check_service", tokio::time::timeout(self.timeout, query).await)
    }

    /// Evaluate a broadcast delivery.
    ///
    /// Without a payload descriptor there is nothing to evaluate, so the
    /// result is [`Decision::NoOpinion`].
    pub async fn broadcast_decision(
        &self,
        payload: Option<&PayloadDescriptor>,
        receiver: PartyId,
        caller: PartyId,
    ) -> Decision {
        let Some(payload) = payload else {
            return Decision::NoOpinion;
        };
        let query = self.authority.check_broadcast(payload, receiver, caller);
        self.collapse("check_broadcast", tokio::time::timeout(self.timeout, query).await)
    }

    /// Collapse a query outcome to a [`Decision`].
    ///
    /// Authority errors and elapsed timeouts downgrade to `NoOpinion`:
    /// the interception must never take the host path down with it.
    fn collapse(
        &self,
        operation: &str,
        outcome: Result<Result<bool, AuthorityError>, tokio::time::error::Elapsed>,
    ) -> Decision {
        match outcome {
            Ok(Ok(true)) => Decision::Allow,
            Ok(Ok(false)) => Decision::Deny,
            Ok(Err(e)) => {
                warn!(operation, error = %e, "authority query failed; not blocking");
                Decision::NoOpinion
            }
            Err(_) => {
                warn!(
                    operation,
                    timeout = ?self.timeout,
                    "authority query timed out; not blocking"
                );
                Decision::NoOpinion
            }
        }
    }
}
