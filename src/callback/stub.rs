//! Receiving stubs: decode one-way frames and dispatch to a local
//! implementation.
//!
//! A stub rejects a malformed frame (wrong descriptor, undeclared code,
//! undecodable arguments) before the wrapped implementation is invoked.
//! Nothing is silently coerced.

use std::sync::Arc;

use super::wire::{
    FailureArgs, ProtocolError, RULE_ADD_DESCRIPTOR, RULE_CHECK_DESCRIPTOR,
    TRANSACTION_ON_INVALID, TRANSACTION_ON_RULE_ADD_FAIL, TRANSACTION_ON_RULE_ADD_SUCCESS,
    TRANSACTION_ON_VALID,
};
use super::{RuleAddCallback, RuleCheckCallback};

/// Receiving end of the rule-check callback interface.
pub struct RuleCheckStub {
    inner: Arc<dyn RuleCheckCallback>,
}

impl RuleCheckStub {
    /// Serve `inner` at the rule-check descriptor.
    pub fn new(inner: Arc<dyn RuleCheckCallback>) -> Self {
        Self { inner }
    }

    /// Handle one inbound frame.
    ///
    /// Success operations ignore any body they arrive with; failure
    /// operations require a decodable [`FailureArgs`] body.
    pub async fn on_transact(
        &self,
        descriptor: &str,
        code: u32,
        body: &[u8],
    ) -> Result<(), ProtocolError> {
        if descriptor != RULE_CHECK_DESCRIPTOR {
            return Err(ProtocolError::DescriptorMismatch {
                expected: RULE_CHECK_DESCRIPTOR,
                got: descriptor.to_owned(),
            });
        }
        match code {
            TRANSACTION_ON_VALID => {
                self.inner.on_valid().await;
                Ok(())
            }
            TRANSACTION_ON_INVALID => {
                let args = FailureArgs::from_body(code, body)?;
                self.inner
                    .on_invalid(args.error_code, &args.error_message)
                    .await;
                Ok(())
            }
            other => Err(ProtocolError::UnknownTransaction(other)),
        }
    }
}

/// Receiving end of the rule-add callback interface.
pub struct RuleAddStub {
    inner: Arc<dyn RuleAddCallback>,
}

impl RuleAddStub {
    /// Serve `inner` at the rule-add descriptor.
    pub fn new(inner: Arc<dyn RuleAddCallback>) -> Self {
        Self { inner }
    }

    /// Handle one inbound frame.
    pub async fn on_transact(
        &self,
        descriptor: &str,
        code: u32,
        body: &[u8],
    ) -> Result<(), ProtocolError> {
        if descriptor != RULE_ADD_DESCRIPTOR {
            return Err(ProtocolError::DescriptorMismatch {
                expected: RULE_ADD_DESCRIPTOR,
                got: descriptor.to_owned(),
            });
        }
        match code {
            TRANSACTION_ON_RULE_ADD_SUCCESS => {
                self.inner.on_rule_add_success().await;
                Ok(())
            }
            TRANSACTION_ON_RULE_ADD_FAIL => {
                let args = FailureArgs::from_body(code, body)?;
                self.inner
                    .on_rule_add_fail(args.error_code, &args.error_message)
                    .await;
                Ok(())
            }
            other => Err(ProtocolError::UnknownTransaction(other)),
        }
    }
}
