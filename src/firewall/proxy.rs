//! The interposition handle: a behavior-compatible substitute for the
//! host's firewall that consults the policy authority before the
//! decision-bearing operations.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::decision::DecisionClient;
use crate::types::{ComponentIdentity, PartyId, PayloadDescriptor};

use super::IntentFirewall;

/// Construction-time context copied from the host slot when the proxy is
/// built.
#[derive(Debug, Clone)]
pub struct InstallContext {
    /// Name of the host's reference slot, for log correlation.
    pub slot_name: String,
}

impl InstallContext {
    /// Context for the named slot.
    pub fn new(slot_name: impl Into<String>) -> Self {
        Self {
            slot_name: slot_name.into(),
        }
    }
}

/// Substitute firewall installed in place of the host's original.
///
/// Declares the identical operation set. Service and broadcast checks
/// consult the policy authority first; an explicit denial short-circuits
/// with the operation's negative result and the wrapped target is never
/// invoked. Everything else, including every authority failure, forwards
/// unmodified and returns the target's result.
pub struct FirewallProxy {
    target: Arc<dyn IntentFirewall>,
    decisions: DecisionClient,
    context: InstallContext,
}

impl FirewallProxy {
    /// Wrap `target`, routing intercepted operations through `decisions`.
    pub fn new(
        target: Arc<dyn IntentFirewall>,
        decisions: DecisionClient,
        context: InstallContext,
    ) -> Self {
        Self {
            target,
            decisions,
            context,
        }
    }

    /// Context copied from the slot at install time.
    pub fn context(&self) -> &InstallContext {
        &self.context
    }
}

#[async_trait]
impl IntentFirewall for FirewallProxy {
    // Not in the intercepted set: forward unmodified.
    async fn check_start_activity(&self, payload: &PayloadDescriptor, caller: PartyId) -> bool {
        self.target.check_start_activity(payload, caller).await
    }

    async fn check_service(
        &self,
        component: Option<&ComponentIdentity>,
        payload: Option<&PayloadDescriptor>,
        caller: PartyId,
    ) -> bool {
        let decision = self
            .decisions
            .service_decision(payload, component, caller)
            .await;
        if !decision.permits_forward() {
            debug!(
                slot = %self.context.slot_name,
                component = ?component,
                caller = %caller,
                "service bind blocked by policy"
            );
            return false;
        }
        self.target.check_service(component, payload, caller).await
    }

    async fn check_broadcast(
        &self,
        payload: Option<&PayloadDescriptor>,
        caller: PartyId,
        receiver: PartyId,
    ) -> bool {
        let decision = self
            .decisions
            .broadcast_decision(payload, receiver, caller)
            .await;
        if !decision.permits_forward() {
            debug!(
                slot = %self.context.slot_name,
                caller = %caller,
                receiver = %receiver,
                "broadcast blocked by policy"
            );
            return false;
        }
        self.target
            .check_broadcast(payload, caller, receiver)
            .await
    }

    fn interposed(&self) -> bool {
        true
    }
}
