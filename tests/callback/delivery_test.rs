//! Tests for remote delivery, default-handler fallback, and channel
//! resolution.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use firegate::callback::channel::ChannelRegistry;
use firegate::callback::remote::{OnewayTransport, RemoteRuleAdd, RemoteRuleCheck, TransportError};
use firegate::callback::request::RuleAddRequest;
use firegate::callback::stub::RuleAddStub;
use firegate::callback::wire::{
    FailureArgs, RULE_CHECK_DESCRIPTOR, TRANSACTION_ON_INVALID, TRANSACTION_ON_VALID,
};
use firegate::callback::{DefaultHandlers, NoopRuleCheck, RuleAddCallback, RuleCheckCallback};

/// Transport that records every frame it accepts.
#[derive(Default)]
struct RecordingTransport {
    frames: Mutex<Vec<(&'static str, u32, Vec<u8>)>>,
}

impl RecordingTransport {
    fn frames(&self) -> Vec<(&'static str, u32, Vec<u8>)> {
        self.frames.lock().expect("frames lock").clone()
    }
}

#[async_trait]
impl OnewayTransport for RecordingTransport {
    async fn transact(
        &self,
        descriptor: &'static str,
        code: u32,
        body: Vec<u8>,
    ) -> Result<(), TransportError> {
        self.frames
            .lock()
            .expect("frames lock")
            .push((descriptor, code, body));
        Ok(())
    }
}

/// Transport whose hand-off always fails.
struct DeadTransport;

#[async_trait]
impl OnewayTransport for DeadTransport {
    async fn transact(
        &self,
        _descriptor: &'static str,
        _code: u32,
        _body: Vec<u8>,
    ) -> Result<(), TransportError> {
        Err(TransportError("peer gone".to_owned()))
    }
}

/// Listener counting terminal callbacks.
#[derive(Default)]
struct CountingRuleCheck {
    valid: AtomicUsize,
    invalid: AtomicUsize,
    last_code: AtomicUsize,
}

#[async_trait]
impl RuleCheckCallback for CountingRuleCheck {
    async fn on_valid(&self) {
        self.valid.fetch_add(1, Ordering::SeqCst);
    }

    async fn on_invalid(&self, error_code: i32, _error_message: &str) {
        self.invalid.fetch_add(1, Ordering::SeqCst);
        self.last_code
            .store(usize::try_from(error_code).unwrap_or(0), Ordering::SeqCst);
    }
}

#[derive(Default)]
struct CountingRuleAdd {
    success: AtomicUsize,
    fail: AtomicUsize,
    last_failure: Mutex<Option<FailureArgs>>,
}

#[async_trait]
impl RuleAddCallback for CountingRuleAdd {
    async fn on_rule_add_success(&self) {
        self.success.fetch_add(1, Ordering::SeqCst);
    }

    async fn on_rule_add_fail(&self, error_code: i32, error_message: &str) {
        self.fail.fetch_add(1, Ordering::SeqCst);
        *self.last_failure.lock().expect("failure lock") = Some(FailureArgs {
            error_code,
            error_message: error_message.to_owned(),
        });
    }
}

#[tokio::test]
async fn on_valid_transacts_an_empty_frame() {
    let transport = Arc::new(RecordingTransport::default());
    let proxy = RemoteRuleCheck::new(Arc::clone(&transport) as Arc<dyn OnewayTransport>, Arc::new(DefaultHandlers::new()));

    proxy.on_valid().await;

    let frames = transport.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].0, RULE_CHECK_DESCRIPTOR);
    assert_eq!(frames[0].1, TRANSACTION_ON_VALID);
    assert!(frames[0].2.is_empty());
}

#[tokio::test]
async fn on_invalid_carries_failure_args() {
    let transport = Arc::new(RecordingTransport::default());
    let proxy = RemoteRuleCheck::new(Arc::clone(&transport) as Arc<dyn OnewayTransport>, Arc::new(DefaultHandlers::new()));

    proxy.on_invalid(404, "no such rule").await;

    let frames = transport.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].1, TRANSACTION_ON_INVALID);
    let args = FailureArgs::from_body(frames[0].1, &frames[0].2).expect("decode");
    assert_eq!(args.error_code, 404);
    assert_eq!(args.error_message, "no such rule");
}

#[tokio::test]
async fn successful_handoff_does_not_touch_the_default() {
    let defaults = Arc::new(DefaultHandlers::new());
    let fallback = Arc::new(CountingRuleCheck::default());
    assert!(defaults.set_rule_check(Arc::clone(&fallback) as Arc<dyn RuleCheckCallback>));

    let proxy = RemoteRuleCheck::new(Arc::new(RecordingTransport::default()), defaults);
    proxy.on_valid().await;

    assert_eq!(fallback.valid.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_handoff_falls_back_to_the_default() {
    let defaults = Arc::new(DefaultHandlers::new());
    let fallback = Arc::new(CountingRuleCheck::default());
    assert!(defaults.set_rule_check(Arc::clone(&fallback) as Arc<dyn RuleCheckCallback>));

    let proxy = RemoteRuleCheck::new(Arc::new(DeadTransport), defaults);
    proxy.on_invalid(13, "rule expired").await;

    assert_eq!(fallback.invalid.load(Ordering::SeqCst), 1);
    assert_eq!(fallback.last_code.load(Ordering::SeqCst), 13);
    assert_eq!(fallback.valid.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_handoff_without_default_is_abandoned() {
    // Nothing to observe but the absence of a panic and of a retry.
    let proxy = RemoteRuleCheck::new(Arc::new(DeadTransport), Arc::new(DefaultHandlers::new()));
    proxy.on_valid().await;
}

#[tokio::test]
async fn second_default_registration_is_rejected_and_first_stays_active() {
    let defaults = Arc::new(DefaultHandlers::new());
    let first = Arc::new(CountingRuleCheck::default());
    let second = Arc::new(CountingRuleCheck::default());

    assert!(defaults.set_rule_check(Arc::clone(&first) as Arc<dyn RuleCheckCallback>));
    assert!(!defaults.set_rule_check(Arc::clone(&second) as Arc<dyn RuleCheckCallback>));

    let proxy = RemoteRuleCheck::new(Arc::new(DeadTransport), defaults);
    proxy.on_valid().await;

    assert_eq!(first.valid.load(Ordering::SeqCst), 1);
    assert_eq!(second.valid.load(Ordering::SeqCst), 0);
}

/// Transport that routes rule-add frames straight into a stub, like a
/// loopback process boundary.
struct LoopbackRuleAdd {
    stub: RuleAddStub,
}

#[async_trait]
impl OnewayTransport for LoopbackRuleAdd {
    async fn transact(
        &self,
        descriptor: &'static str,
        code: u32,
        body: Vec<u8>,
    ) -> Result<(), TransportError> {
        self.stub
            .on_transact(descriptor, code, &body)
            .await
            .map_err(|e| TransportError(e.to_string()))
    }
}

#[tokio::test]
async fn rule_add_failure_reaches_the_caller_exactly_once() {
    let listener = Arc::new(CountingRuleAdd::default());
    let transport = Arc::new(LoopbackRuleAdd {
        stub: RuleAddStub::new(Arc::clone(&listener) as Arc<dyn RuleAddCallback>),
    });
    let channel = Arc::new(RemoteRuleAdd::new(transport, Arc::new(DefaultHandlers::new())));
    let request = RuleAddRequest::issue(channel);

    assert!(request.complete_fail(409, "duplicate rule").await);
    // A racing success must not produce a second terminal callback.
    assert!(!request.complete_success().await);

    assert_eq!(listener.fail.load(Ordering::SeqCst), 1);
    assert_eq!(listener.success.load(Ordering::SeqCst), 0);
    let failure = listener
        .last_failure
        .lock()
        .expect("failure lock")
        .clone()
        .expect("failure recorded");
    assert_eq!(failure.error_code, 409);
    assert_eq!(failure.error_message, "duplicate rule");
}

#[tokio::test]
async fn local_handle_resolves_to_the_registered_listener() {
    let registry = ChannelRegistry::new();
    let listener: Arc<dyn RuleCheckCallback> = Arc::new(NoopRuleCheck);
    let handle = registry.register_rule_check(Arc::clone(&listener));

    let resolved = registry.resolve_rule_check(
        handle,
        Arc::new(RecordingTransport::default()),
        Arc::new(DefaultHandlers::new()),
    );

    assert!(Arc::ptr_eq(&resolved, &listener));
}

#[tokio::test]
async fn foreign_handle_resolves_to_a_forwarding_proxy() {
    let local = ChannelRegistry::new();
    let remote_issuer = ChannelRegistry::new();
    let foreign = remote_issuer.register_rule_check(Arc::new(NoopRuleCheck));

    let transport = Arc::new(RecordingTransport::default());
    let resolved = local.resolve_rule_check(
        foreign,
        Arc::clone(&transport) as Arc<dyn OnewayTransport>,
        Arc::new(DefaultHandlers::new()),
    );

    resolved.on_valid().await;
    assert_eq!(transport.frames().len(), 1, "delivery went over the wire");
}

#[tokio::test]
async fn unregistered_handle_stops_resolving_locally() {
    let registry = ChannelRegistry::new();
    let handle = registry.register_rule_check(Arc::new(NoopRuleCheck));
    registry.unregister(handle);

    let transport = Arc::new(RecordingTransport::default());
    let resolved = registry.resolve_rule_check(
        handle,
        Arc::clone(&transport) as Arc<dyn OnewayTransport>,
        Arc::new(DefaultHandlers::new()),
    );

    resolved.on_valid().await;
    assert_eq!(transport.frames().len(), 1);
}
