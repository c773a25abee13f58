//! Remote forwarding proxies: marshal terminal callbacks across the
//! process boundary as one-way sends.
//!
//! Delivery is at-most-once. A failed hand-off is never retried: the
//! corresponding operation of the registered default handler runs
//! synchronously in-process instead, or, with nothing registered, the
//! delivery is logged and abandoned.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use super::wire::{
    FailureArgs, RULE_ADD_DESCRIPTOR, RULE_CHECK_DESCRIPTOR, TRANSACTION_ON_INVALID,
    TRANSACTION_ON_RULE_ADD_FAIL, TRANSACTION_ON_RULE_ADD_SUCCESS, TRANSACTION_ON_VALID,
};
use super::{DefaultHandlers, RuleAddCallback, RuleCheckCallback};

/// Failure to hand a frame to the remote peer.
#[derive(Debug, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// One-way message channel to a remote peer.
#[async_trait]
pub trait OnewayTransport: Send + Sync {
    /// Hand a frame off for delivery. Returns once the frame is
    /// accepted for transport; never waits for remote processing.
    async fn transact(
        &self,
        descriptor: &'static str,
        code: u32,
        body: Vec<u8>,
    ) -> Result<(), TransportError>;
}

/// `RuleCheckCallback` forwarded over a one-way transport.
pub struct RemoteRuleCheck {
    transport: Arc<dyn OnewayTransport>,
    defaults: Arc<DefaultHandlers>,
}

impl RemoteRuleCheck {
    /// Forward over `transport`, falling back to `defaults` on failure.
    pub fn new(transport: Arc<dyn OnewayTransport>, defaults: Arc<DefaultHandlers>) -> Self {
        Self {
            transport,
            defaults,
        }
    }
}

#[async_trait]
impl RuleCheckCallback for RemoteRuleCheck {
    async fn on_valid(&self) {
        let sent = self
            .transport
            .transact(RULE_CHECK_DESCRIPTOR, TRANSACTION_ON_VALID, Vec::new())
            .await;
        if let Err(e) = sent {
            warn!(error = %e, "on_valid hand-off failed");
            match self.defaults.rule_check() {
                Some(fallback) => fallback.on_valid().await,
                None => warn!("no default rule-check handler; delivery abandoned"),
            }
        }
    }

    async fn on_invalid(&self, error_code: i32, error_message: &str) {
        let body = FailureArgs {
            error_code,
            error_message: error_message.to_owned(),
        }
        .to_body();
        let sent = self
            .transport
            .transact(RULE_CHECK_DESCRIPTOR, TRANSACTION_ON_INVALID, body)
            .await;
        if let Err(e) = sent {
            warn!(error = %e, error_code, "on_invalid hand-off failed");
            match self.defaults.rule_check() {
                Some(fallback) => fallback.on_invalid(error_code, error_message).await,
                None => warn!("no default rule-check handler; delivery abandoned"),
            }
        }
    }
}

/// `RuleAddCallback` forwarded over a one-way transport.
pub struct RemoteRuleAdd {
    transport: Arc<dyn OnewayTransport>,
    defaults: Arc<DefaultHandlers>,
}

impl RemoteRuleAdd {
    /// Forward over `transport`, falling back to `defaults` on failure.
    pub fn new(transport: Arc<dyn OnewayTransport>, defaults: Arc<DefaultHandlers>) -> Self {
        Self {
            transport,
            defaults,
        }
    }
}

#[async_trait]
impl RuleAddCallback for RemoteRuleAdd {
    async fn on_rule_add_success(&self) {
        let sent = self
            .transport
            .transact(
                RULE_ADD_DESCRIPTOR,
                TRANSACTION_ON_RULE_ADD_SUCCESS,
                Vec::new(),
            )
            .await;
        if let Err(e) = sent {
            warn!(error = %e, "on_rule_add_success hand-off failed");
            match self.defaults.rule_add() {
                Some(fallback) => fallback.on_rule_add_success().await,
                None => warn!("no default rule-add handler; delivery abandoned"),
            }
        }
    }

    async fn on_rule_add_fail(&self, error_code: i32, error_message: &str) {
        let body = FailureArgs {
            error_code,
            error_message: error_message.to_owned(),
        }
        .to_body();
        let sent = self
            .transport
            .transact(RULE_ADD_DESCRIPTOR, TRANSACTION_ON_RULE_ADD_FAIL, body)
            .await;
        if let Err(e) = sent {
            warn!(error = %e, error_code, "on_rule_add_fail hand-off failed");
            match self.defaults.rule_add() {
                Some(fallback) => fallback.on_rule_add_fail(error_code, error_message).await,
                None => warn!("no default rule-add handler; delivery abandoned"),
            }
        }
    }
}
