//! Pending callback requests with a one-shot delivery guarantee.
//!
//! Per request, exactly one terminal callback is ever delivered: success
//! xor failure. The first completion claims the request; every later
//! attempt is a logged no-op and the channel is not invoked again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use super::{RuleAddCallback, RuleCheckCallback};

/// A pending rule-check question.
pub struct RuleCheckRequest {
    id: Uuid,
    issued_at: DateTime<Utc>,
    channel: Arc<dyn RuleCheckCallback>,
    delivered: AtomicBool,
}

impl RuleCheckRequest {
    /// Issue a request whose terminal callback goes to `channel`.
    pub fn issue(channel: Arc<dyn RuleCheckCallback>) -> Self {
        Self {
            id: Uuid::new_v4(),
            issued_at: Utc::now(),
            channel,
            delivered: AtomicBool::new(false),
        }
    }

    /// Correlation id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the request was issued.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Whether a terminal callback has been delivered.
    pub fn is_delivered(&self) -> bool {
        self.delivered.load(Ordering::SeqCst)
    }

    /// Deliver `on_valid`. Returns `false` when the request was already
    /// completed.
    pub async fn complete_valid(&self) -> bool {
        if !claim(&self.delivered, self.id) {
            return false;
        }
        self.channel.on_valid().await;
        true
    }

    /// Deliver `on_invalid`. Returns `false` when the request was
    /// already completed.
    pub async fn complete_invalid(&self, error_code: i32, error_message: &str) -> bool {
        if !claim(&self.delivered, self.id) {
            return false;
        }
        self.channel.on_invalid(error_code, error_message).await;
        true
    }
}

/// A pending rule add attempt.
pub struct RuleAddRequest {
    id: Uuid,
    issued_at: DateTime<Utc>,
    channel: Arc<dyn RuleAddCallback>,
    delivered: AtomicBool,
}

impl RuleAddRequest {
    /// Issue a request whose terminal callback goes to `channel`.
    pub fn issue(channel: Arc<dyn RuleAddCallback>) -> Self {
        Self {
            id: Uuid::new_v4(),
            issued_at: Utc::now(),
            channel,
            delivered: AtomicBool::new(false),
        }
    }

    /// Correlation id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the request was issued.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Whether a terminal callback has been delivered.
    pub fn is_delivered(&self) -> bool {
        self.delivered.load(Ordering::SeqCst)
    }

    /// Deliver `on_rule_add_success`. Returns `false` when the request
    /// was already completed.
    pub async fn complete_success(&self) -> bool {
        if !claim(&self.delivered, self.id) {
            return false;
        }
        self.channel.on_rule_add_success().await;
        true
    }

    /// Deliver `on_rule_add_fail`. Returns `false` when the request was
    /// already completed.
    pub async fn complete_fail(&self, error_code: i32, error_message: &str) -> bool {
        if !claim(&self.delivered, self.id) {
            return false;
        }
        self.channel.on_rule_add_fail(error_code, error_message).await;
        true
    }
}

/// Claim the one-shot delivery slot. False when already claimed.
fn claim(delivered: &AtomicBool, id: Uuid) -> bool {
    let claimed = !delivered.swap(true, Ordering::SeqCst);
    if !claimed {
        warn!(request = %id, "terminal callback already delivered; ignoring");
    }
    claimed
}
