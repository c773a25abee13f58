//! Wire contract for the callback interfaces.
//!
//! Each interface is addressed by a descriptor string and dispatches its
//! one-way operations by a stable transaction code assigned in
//! declaration order, starting at [`FIRST_CALL_TRANSACTION`]. Existing
//! remote peers key on these numbers; they must not be renumbered. Frame
//! bodies are JSON-encoded argument structs; operations without
//! arguments carry an empty body.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Descriptor of the rule-check callback interface.
pub const RULE_CHECK_DESCRIPTOR: &str = "firegate.rules.RuleCheckCallback";

/// Descriptor of the rule-add callback interface.
pub const RULE_ADD_DESCRIPTOR: &str = "firegate.rules.RuleAddCallback";

/// First transaction code available to interface operations.
pub const FIRST_CALL_TRANSACTION: u32 = 1;

/// `RuleCheckCallback::on_valid`, first declared operation.
pub const TRANSACTION_ON_VALID: u32 = 1;

/// `RuleCheckCallback::on_invalid`, second declared operation.
pub const TRANSACTION_ON_INVALID: u32 = 2;

/// `RuleAddCallback::on_rule_add_success`, first declared operation.
pub const TRANSACTION_ON_RULE_ADD_SUCCESS: u32 = 1;

/// `RuleAddCallback::on_rule_add_fail`, second declared operation.
pub const TRANSACTION_ON_RULE_ADD_FAIL: u32 = 2;

/// Arguments of the failure operations (`on_invalid`, `on_rule_add_fail`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureArgs {
    /// Machine-readable error code.
    pub error_code: i32,
    /// Human-readable error message.
    pub error_message: String,
}

impl FailureArgs {
    /// Encode as a frame body.
    pub fn to_body(&self) -> Vec<u8> {
        // An i32 plus a String cannot fail JSON encoding.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Decode a frame body received for `code`.
    pub fn from_body(code: u32, body: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(body).map_err(|e| ProtocolError::BadArgs {
            code,
            detail: e.to_string(),
        })
    }
}

/// Malformed or misaddressed frame, rejected before dispatch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The frame named a different interface than the receiving stub.
    #[error("descriptor mismatch: got '{got}', serving '{expected}'")]
    DescriptorMismatch {
        /// Descriptor the stub serves.
        expected: &'static str,
        /// Descriptor carried by the frame.
        got: String,
    },
    /// Transaction code not declared by the interface.
    #[error("unknown transaction code {0}")]
    UnknownTransaction(u32),
    /// The argument body failed to decode.
    #[error("malformed arguments for transaction {code}: {detail}")]
    BadArgs {
        /// Transaction code the body arrived under.
        code: u32,
        /// Decoder diagnostic.
        detail: String,
    },
}
