//! Opaque channel handles and their resolution.
//!
//! A requester supplies a [`ChannelHandle`] naming where its terminal
//! callback should go. Handles are exchangeable across the process
//! boundary: resolving a handle that was issued here recovers the
//! original local implementation (object identity preserved); resolving
//! a foreign handle produces a forwarding proxy that marshals the call
//! over the supplied transport.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::remote::{OnewayTransport, RemoteRuleAdd, RemoteRuleCheck};
use super::{DefaultHandlers, RuleAddCallback, RuleCheckCallback};

/// Opaque handle naming a callback endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelHandle(Uuid);

impl ChannelHandle {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Registry of locally-issued channel handles.
#[derive(Default)]
pub struct ChannelRegistry {
    rule_check: Mutex<HashMap<ChannelHandle, Arc<dyn RuleCheckCallback>>>,
    rule_add: Mutex<HashMap<ChannelHandle, Arc<dyn RuleAddCallback>>>,
}

impl ChannelRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a handle for a local rule-check listener.
    pub fn register_rule_check(&self, listener: Arc<dyn RuleCheckCallback>) -> ChannelHandle {
        let handle = ChannelHandle::fresh();
        lock(&self.rule_check).insert(handle, listener);
        handle
    }

    /// Issue a handle for a local rule-add listener.
    pub fn register_rule_add(&self, listener: Arc<dyn RuleAddCallback>) -> ChannelHandle {
        let handle = ChannelHandle::fresh();
        lock(&self.rule_add).insert(handle, listener);
        handle
    }

    /// Resolve a rule-check handle to a deliverable channel.
    ///
    /// Locally-issued handles resolve to the registered implementation
    /// itself; anything else resolves to a [`RemoteRuleCheck`] over
    /// `transport`.
    pub fn resolve_rule_check(
        &self,
        handle: ChannelHandle,
        transport: Arc<dyn OnewayTransport>,
        defaults: Arc<DefaultHandlers>,
    ) -> Arc<dyn RuleCheckCallback> {
        if let Some(local) = lock(&self.rule_check).get(&handle) {
            return Arc::clone(local);
        }
        Arc::new(RemoteRuleCheck::new(transport, defaults))
    }

    /// Resolve a rule-add handle to a deliverable channel.
    pub fn resolve_rule_add(
        &self,
        handle: ChannelHandle,
        transport: Arc<dyn OnewayTransport>,
        defaults: Arc<DefaultHandlers>,
    ) -> Arc<dyn RuleAddCallback> {
        if let Some(local) = lock(&self.rule_add).get(&handle) {
            return Arc::clone(local);
        }
        Arc::new(RemoteRuleAdd::new(transport, defaults))
    }

    /// Drop a local registration. Pending requests that already resolved
    /// the handle keep their channel.
    pub fn unregister(&self, handle: ChannelHandle) {
        lock(&self.rule_check).remove(&handle);
        lock(&self.rule_add).remove(&handle);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
