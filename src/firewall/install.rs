//! Target location and atomic interposition install.
//!
//! The core never reaches into host internals: it depends on a narrow
//! [`TargetSlot`] locator that exposes a snapshot read plus a single
//! atomic swap. A failed install leaves the slot untouched and the host
//! keeps calling its original, unwrapped firewall.

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::info;

use crate::decision::DecisionClient;

use super::proxy::{FirewallProxy, InstallContext};
use super::IntentFirewall;

/// Installation failures. Fatal to the install attempt only.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The locator could not produce the live target or its collaborators.
    #[error("firewall target unavailable: {0}")]
    TargetUnavailable(String),
    /// The slot already holds an interposition handle.
    #[error("interposition already installed in slot '{0}'")]
    AlreadyInstalled(String),
}

/// Snapshot of a slot: the live firewall plus the construction-time
/// context needed to build a behavior-compatible substitute.
#[derive(Clone)]
pub struct SlotState {
    /// The firewall object the host currently calls through.
    pub target: Arc<dyn IntentFirewall>,
    /// Context copied from the original's construction.
    pub context: InstallContext,
}

/// Read/swap access to the host's firewall reference slot.
///
/// Implementations must run the `replace` closure under the slot's
/// exclusive lock so no caller can observe two live references during a
/// swap, and must leave the slot untouched when the closure returns
/// `Err`.
pub trait TargetSlot: Send + Sync {
    /// Snapshot the current reference and its context.
    fn read(&self) -> Result<SlotState, InstallError>;

    /// Atomically replace the reference with the closure's result.
    fn replace(
        &self,
        swap: &mut dyn FnMut(&SlotState) -> Result<Arc<dyn IntentFirewall>, InstallError>,
    ) -> Result<(), InstallError>;
}

/// Mutex-backed slot holding a host's firewall reference.
pub struct HostSlot {
    state: Mutex<SlotState>,
}

impl HostSlot {
    /// Slot initially holding `target`.
    pub fn new(target: Arc<dyn IntentFirewall>, context: InstallContext) -> Self {
        Self {
            state: Mutex::new(SlotState { target, context }),
        }
    }

    /// The firewall a host call would go through right now.
    pub fn current(&self) -> Arc<dyn IntentFirewall> {
        Arc::clone(&self.lock().target)
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        // A poisoned slot still holds a coherent Arc; recover it.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl TargetSlot for HostSlot {
    fn read(&self) -> Result<SlotState, InstallError> {
        Ok(self.lock().clone())
    }

    fn replace(
        &self,
        swap: &mut dyn FnMut(&SlotState) -> Result<Arc<dyn IntentFirewall>, InstallError>,
    ) -> Result<(), InstallError> {
        let mut guard = self.lock();
        let next = swap(&guard)?;
        guard.target = next;
        Ok(())
    }
}

/// Install the interposition proxy into `slot`.
///
/// Reads the live target and its context, builds a [`FirewallProxy`]
/// declaring the identical operation set, and swaps it in atomically.
/// Installing over an existing handle is rejected, never nested.
pub fn install(slot: &dyn TargetSlot, decisions: &DecisionClient) -> Result<(), InstallError> {
    let mut slot_name = String::new();
    slot.replace(&mut |state| {
        if state.target.interposed() {
            return Err(InstallError::AlreadyInstalled(state.context.slot_name.clone()));
        }
        slot_name.clone_from(&state.context.slot_name);
        let proxy: Arc<dyn IntentFirewall> = Arc::new(FirewallProxy::new(
            Arc::clone(&state.target),
            decisions.clone(),
            state.context.clone(),
        ));
        Ok(proxy)
    })?;
    info!(slot = %slot_name, "interposition installed");
    Ok(())
}
