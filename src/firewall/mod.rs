//! Intent-firewall interposition: the intercepted operation set, the
//! substitute proxy, and atomic installation into the host's reference
//! slot.

pub mod install;
pub mod proxy;

use async_trait::async_trait;

use crate::types::{ComponentIdentity, PartyId, PayloadDescriptor};

/// The decision-bearing operation set of the host's intent firewall.
///
/// `false` is every operation's negative result: the action is blocked
/// and the host does not proceed. The host may call these operations
/// from any number of concurrent paths.
#[async_trait]
pub trait IntentFirewall: Send + Sync {
    /// Whether an activity start may proceed.
    async fn check_start_activity(&self, payload: &PayloadDescriptor, caller: PartyId) -> bool;

    /// Whether a service bind may proceed.
    async fn check_service(
        &self,
        component: Option<&ComponentIdentity>,
        payload: Option<&PayloadDescriptor>,
        caller: PartyId,
    ) -> bool;

    /// Whether a broadcast delivery to `receiver` may proceed.
    async fn check_broadcast(
        &self,
        payload: Option<&PayloadDescriptor>,
        caller: PartyId,
        receiver: PartyId,
    ) -> bool;

    /// Whether this object is an interposition handle rather than the
    /// host's original firewall. Installation uses this to refuse
    /// double-wrapping.
    fn interposed(&self) -> bool {
        false
    }
}
