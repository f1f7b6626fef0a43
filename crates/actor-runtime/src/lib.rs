//! # Actor Runtime
//!
//! This crate is the core of a distributed **virtual actor** runtime. Callers address an
//! actor by type and id, never by location. The runtime activates an instance on first use,
//! serializes access to it, deactivates it on demand and routes each call to whichever host
//! currently serves the instance, retrying and re-resolving when that fails.
//!
//! ## Why Virtual Actors?
//!
//! - **No lifecycle management in callers**: an actor "always exists"; the runtime creates
//!   and destroys the physical instance behind it.
//! - **Location transparency**: the same call works whether the instance lives in this
//!   process or on another host.
//! - **Per-action concurrency**: each action declares a lock class, so read-only actions
//!   can overlap while state-changing ones run alone.
//!
//! **Further Reading**:
//! - [Orleans: Distributed Virtual Actors](https://www.microsoft.com/en-us/research/publication/orleans-distributed-virtual-actors-for-programmability-and-scalability/) - The paper that introduced the model
//! - [Actors in Rust](https://ryhl.io/blog/actors-with-tokio/) - Practical guide to implementing actors with Tokio
//!
//! ## Architecture Overview
//!
//! A call travels through two halves:
//!
//! 1. **Outbound** ([`DynamicInvoker`]) - picks a receiving host from the registry, the
//!    [`PlacementCache`] and the actor type's placement rules, ships the call through a
//!    [`TransportInvoker`] and retries with [`BackOff`] and redirect hints.
//! 2. **Inbound** ([`Dispatcher`] → [`ActorContainer`] → [`InstanceRunner`]) - finds the
//!    container of the actor type, obtains the runner of the actor id and schedules the call
//!    against the application's [`InstanceWrapper`].
//!
//! ## Core Abstractions
//!
//! ### [`InstanceWrapper`] - The Business Logic
//!
//! ```rust
//! use actor_runtime::action_error::ActionError;
//! use actor_runtime::config::RunnerConfig;
//! use actor_runtime::message::{action_defs, ActionDef, ActorCall};
//! use actor_runtime::names::{ActionName, ActorId};
//! use actor_runtime::value::Value;
//! use actor_runtime::{ActorContainer, InstanceWrapper, WrapperFactory};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! // 1. Implement the wrapper
//! struct Echo {
//!     id: String,
//! }
//!
//! #[async_trait]
//! impl InstanceWrapper for Echo {
//!     async fn perform(&self, _action: &ActionName, args: Vec<Value>) -> Result<Value, ActionError> {
//!         let text = args.first().and_then(|v| v.as_str().ok()).unwrap_or_default();
//!         Ok(Value::from(format!("{}:{}", self.id, text.to_lowercase())))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     // 2. Declare the actions and their lock classes
//!     let actions = action_defs([("echo", ActionDef::exclusive())]);
//!     let factory: WrapperFactory = Arc::new(|id: &ActorId| {
//!         Arc::new(Echo { id: id.segments().join("/") }) as Arc<dyn InstanceWrapper>
//!     });
//!
//!     // 3. Host the type in a container and call it
//!     let container = ActorContainer::new("Echo".into(), actions, factory, RunnerConfig::default());
//!     let result = container
//!         .call(ActorCall::new("Echo", "123", "echo", vec![Value::from("Hello")]))
//!         .await;
//!     assert_eq!(result, Ok(Value::from("123:hello")));
//!
//!     container.stop().await;
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - One Tokio task per live instance runs its event loop; one more task runs each action.
//! - **Exclusive** actions never overlap each other, shared actions, or activation and
//!   deactivation. **Shared** actions overlap each other. **Unlocked** actions run at any
//!   time while the instance is alive.
//! - Only the container's instance map and the placement cache are behind locks, and
//!   neither lock is held across an `await`.
//!
//! ## Errors
//!
//! Every failure is an [`ActionError`] with a stable code. Framework errors (routing,
//! deactivation, exhausted retries) may be retried; application errors never are. See
//! [`action_error::codes`] for the codes the runtime produces.
//!
//! ## Testing
//!
//! The [`mock`] module provides a scripted transport, a settable registry and a lock that
//! can refuse, for testing routing logic without a cluster.

pub mod action_error;
pub mod backoff;
pub mod client;
pub mod config;
pub mod container;
pub mod dispatcher;
pub mod error;
pub mod invoker;
pub mod message;
pub mod mock;
pub mod names;
pub mod placement_cache;
pub mod registry;
pub mod runner;
pub mod tracing;
pub mod transport;
pub mod value;
pub mod wrapper;

// Re-export core types for convenience
pub use action_error::ActionError;
pub use backoff::{BackOff, BackOffSession, ExponentialBackOff, FixedBackOff};
pub use client::ActorClient;
pub use config::RuntimeConfig;
pub use container::ActorContainer;
pub use dispatcher::{ActorTypeRegistration, Dispatcher};
pub use error::FrameworkError;
pub use invoker::{DynamicInvoker, InvokeRequest, TransportInvoker, TransportRequest};
pub use message::{ActionDef, ActorCall, LockClass, Response};
pub use names::{ActionName, ActorId, ActorType};
pub use placement_cache::PlacementCache;
pub use runner::InstanceRunner;
pub use transport::LocalTransport;
pub use value::Value;
pub use wrapper::{ActorLock, InstanceWrapper, WrapperFactory};
