//! Asynchronous rule-callback protocol.
//!
//! A decoupled caller submits a rule question and later receives exactly
//! one terminal callback (success or failure) out-of-band. The protocol
//! pieces mirror each other per callback shape:
//!
//! - the callback traits below, with local no-op implementations
//! - [`wire`]: descriptors, stable transaction codes, frame bodies
//! - [`stub`]: the receiving side, rejecting malformed frames
//! - [`remote`]: forwarding proxies over a one-way transport, falling
//!   back to the registered default handler when hand-off fails
//! - [`channel`]: opaque endpoint handles and their resolution
//! - [`request`]: pending requests with a one-shot delivery guard

pub mod channel;
pub mod remote;
pub mod request;
pub mod stub;
pub mod wire;

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;

/// Terminal notifications for a rule validity check.
///
/// Operations are one-way: implementations are never awaited by a remote
/// peer, and delivery failure is the deliverer's concern, not the
/// implementor's.
#[async_trait]
pub trait RuleCheckCallback: Send + Sync {
    /// The checked rule is valid.
    async fn on_valid(&self);

    /// The checked rule is invalid.
    async fn on_invalid(&self, error_code: i32, error_message: &str);
}

/// Terminal notifications for a rule add attempt.
#[async_trait]
pub trait RuleAddCallback: Send + Sync {
    /// The rule was accepted.
    async fn on_rule_add_success(&self);

    /// The rule was rejected.
    async fn on_rule_add_fail(&self, error_code: i32, error_message: &str);
}

/// Local no-op rule-check listener; a safe default when nothing is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRuleCheck;

#[async_trait]
impl RuleCheckCallback for NoopRuleCheck {
    async fn on_valid(&self) {}

    async fn on_invalid(&self, _error_code: i32, _error_message: &str) {}
}

/// Local no-op rule-add listener.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRuleAdd;

#[async_trait]
impl RuleAddCallback for NoopRuleAdd {
    async fn on_rule_add_success(&self) {}

    async fn on_rule_add_fail(&self, _error_code: i32, _error_message: &str) {}
}

/// Process-wide default handlers for delivery fallback.
///
/// One single-assignment cell per callback shape. The embedder creates
/// one instance at startup and shares it with every remote proxy; after
/// the first registration the cell is read-only. A later registration
/// attempt is a no-op reported to its caller, and the original handler
/// stays active.
#[derive(Default)]
pub struct DefaultHandlers {
    rule_check: OnceLock<Arc<dyn RuleCheckCallback>>,
    rule_add: OnceLock<Arc<dyn RuleAddCallback>>,
}

impl DefaultHandlers {
    /// Empty cells; nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the rule-check fallback. Returns `false` when one is
    /// already registered.
    pub fn set_rule_check(&self, handler: Arc<dyn RuleCheckCallback>) -> bool {
        self.rule_check.set(handler).is_ok()
    }

    /// Register the rule-add fallback. Returns `false` when one is
    /// already registered.
    pub fn set_rule_add(&self, handler: Arc<dyn RuleAddCallback>) -> bool {
        self.rule_add.set(handler).is_ok()
    }

    /// The registered rule-check fallback, if any.
    pub fn rule_check(&self) -> Option<&Arc<dyn RuleCheckCallback>> {
        self.rule_check.get()
    }

    /// The registered rule-add fallback, if any.
    pub fn rule_add(&self) -> Option<&Arc<dyn RuleAddCallback>> {
        self.rule_add.get()
    }
}
