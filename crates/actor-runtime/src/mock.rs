//! # Mock Framework & Testing Guide
//!
//! The collaborators of the runtime are traits, so every one of them can be replaced by an
//! in-memory stand-in. This module provides the stand-ins the tests of this crate use:
//!
//! - [`MockTransport`]: a scripted [`TransportInvoker`] with a fluent expectation API and a
//!   log of every request it received.
//! - [`MockRegistry`]: an [`ActorRegistryFetcher`] whose answer the test sets directly.
//! - [`MockActorLock`]: an [`ActorLock`] that can be told to refuse, and records what was
//!   acquired and released.
//!
//! ## When to use Mocks vs a Local Cluster
//!
//! | Feature | Mocks | `LocalTransport` + `Dispatcher` |
//! |---------|-------|---------------------------------|
//! | **Speed** | Instant (in-memory) | Fast (but involves tokio spawn) |
//! | **Determinism** | Scripted responses | Subject to scheduler and random host choice |
//! | **Use Case** | Routing and retry logic of the invoker | Actors, containers, full call path |
//! | **Error Injection** | Easy (`return_err`) | Hard (requires specific state) |
//!
//! ## Example
//!
//! ```rust
//! use actor_runtime::action_error::{codes, ActionError};
//! use actor_runtime::config::InvokerConfig;
//! use actor_runtime::invoker::{DynamicInvoker, InvokeRequest};
//! use actor_runtime::mock::{MockRegistry, MockTransport};
//! use actor_runtime::placement_cache::PlacementCache;
//! use actor_runtime::registry::{ActorInfo, ActorPlacement, ApplicationInfo};
//! use actor_runtime::value::Value;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Arc::new(MockRegistry::new());
//!     registry.set(
//!         "Echo",
//!         ActorInfo {
//!             applications: vec![ApplicationInfo::new("host-a")],
//!             placement: ActorPlacement::default(),
//!         },
//!     );
//!
//!     let transport = Arc::new(MockTransport::new());
//!     transport
//!         .expect_invoke()
//!         .return_err(ActionError::application("BROKEN", "Echo is broken"));
//!
//!     let invoker = DynamicInvoker::new(
//!         transport.clone(),
//!         registry,
//!         Arc::new(PlacementCache::default()),
//!         &InvokerConfig::default(),
//!     );
//!
//!     // Application errors are never retried.
//!     let result = invoker
//!         .invoke(InvokeRequest::new("Echo", "1", "say", vec![Value::from("hi")]))
//!         .await;
//!     assert_eq!(result.unwrap_err().code, "BROKEN");
//!     assert_eq!(transport.requests().len(), 1);
//!     transport.verify();
//! }
//! ```

use crate::action_error::ActionError;
use crate::invoker::{TransportInvoker, TransportRequest};
use crate::names::{ActorId, ActorType};
use crate::registry::{ActorInfo, ActorRegistryFetcher};
use crate::value::Value;
use crate::wrapper::ActorLock;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected transport request and the response to give.
struct Expectation {
    receiver: Option<String>,
    response: Result<Value, ActionError>,
}

/// A scripted transport. Expectations are consumed in order, one per request.
///
/// # Example
/// ```ignore
/// let transport = MockTransport::new();
/// transport.expect_invoke().on("host-a").return_ok("pong");
/// transport.expect_invoke().return_err(redirect_error);
/// // Use transport in an invoker...
/// transport.verify(); // Ensures all expectations were met
/// ```
#[derive(Default)]
pub struct MockTransport {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    /// Creates a mock transport with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects one more request.
    pub fn expect_invoke(&self) -> InvokeExpectationBuilder {
        InvokeExpectationBuilder {
            receiver: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().len();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

#[async_trait]
impl TransportInvoker for MockTransport {
    async fn invoke(&self, request: TransportRequest) -> Result<Value, ActionError> {
        let expectation = self.expectations.lock().pop_front();
        let receiver = request.receiver.clone();
        self.requests.lock().push(request);

        let Some(expectation) = expectation else {
            panic!("Unexpected transport request to {receiver}");
        };
        if let Some(expected) = &expectation.receiver {
            assert_eq!(expected, &receiver, "Request sent to the wrong receiver");
        }
        expectation.response
    }
}

/// Builder for transport expectations.
pub struct InvokeExpectationBuilder {
    receiver: Option<String>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl InvokeExpectationBuilder {
    /// Requires the request to be addressed to `receiver`.
    pub fn on(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: impl Into<Value>) {
        self.expectations.lock().push_back(Expectation {
            receiver: self.receiver,
            response: Ok(value.into()),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: ActionError) {
        self.expectations.lock().push_back(Expectation {
            receiver: self.receiver,
            response: Err(error),
        });
    }
}

// =============================================================================
// REGISTRY AND LOCK STAND-INS
// =============================================================================

/// Registry whose content is set by the test.
#[derive(Default)]
pub struct MockRegistry {
    infos: Mutex<HashMap<ActorType, ActorInfo>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, actor_type: impl Into<ActorType>, info: ActorInfo) {
        self.infos.lock().insert(actor_type.into(), info);
    }
}

impl ActorRegistryFetcher for MockRegistry {
    fn get(&self, actor_type: &ActorType) -> ActorInfo {
        self.infos.lock().get(actor_type).cloned().unwrap_or_default()
    }
}

/// Actor lock that grants everything unless told to refuse.
#[derive(Default)]
pub struct MockActorLock {
    refusal: Mutex<Option<String>>,
    log: Mutex<Vec<String>>,
}

impl MockActorLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `acquire` fail with `reason`.
    pub fn refuse(&self, reason: impl Into<String>) {
        *self.refusal.lock() = Some(reason.into());
    }

    /// Entries like `"acquire:counter:[7]"` and `"release:counter:[7]"`.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

#[async_trait]
impl ActorLock for MockActorLock {
    async fn acquire(&self, actor_type: &ActorType, actor_id: &ActorId) -> Result<(), String> {
        if let Some(reason) = self.refusal.lock().clone() {
            return Err(reason);
        }
        self.log.lock().push(format!("acquire:{actor_type}:{actor_id}"));
        Ok(())
    }

    async fn release(&self, actor_type: &ActorType, actor_id: &ActorId) {
        self.log.lock().push(format!("release:{actor_type}:{actor_id}"));
    }
}
