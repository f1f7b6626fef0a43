//! # Greeter Actor
//!
//! The simplest actor of the sample: it greets people and remembers whom it greeted.
//!
//! ## Overview
//!
//! Each of its three actions uses a different lock class:
//!
//! | Action | Lock class | Effect |
//! |--------|------------|--------|
//! | `greet` | exclusive | Appends to the history, so it never overlaps anything |
//! | `history` | shared | Reads the history; many may run at once |
//! | `ping` | none | Touches no state; answers even while the instance (de)activates |
//!
//! The greeter uses the default placement, so any host that registers it may serve a call.
//!
//! ## Structure
//!
//! - [`wrapper`] - [`InstanceWrapper`](actor_runtime::InstanceWrapper) implementation
//! - [`error`] - [`GreeterError`] type for type-safe error handling
//! - [`new()`] - Factory function that creates the container of one host
//!
//! ## Usage
//!
//! ```rust
//! use actor_runtime::config::RunnerConfig;
//! use actor_runtime::message::ActorCall;
//! use actor_runtime::value::Value;
//! use actor_sample::greeter_actor;
//!
//! #[tokio::main]
//! async fn main() {
//!     let container = greeter_actor::new("host-a", &RunnerConfig::default());
//!     let reply = container
//!         .call(ActorCall::new("Greeter", "lobby", "greet", vec![Value::from("Alice")]))
//!         .await;
//!     assert_eq!(reply, Ok(Value::from("Hello, Alice! Greeted by host-a.")));
//!     container.stop().await;
//! }
//! ```

pub mod error;
pub mod wrapper;

pub use error::*;
pub use wrapper::Greeter;

use actor_runtime::config::RunnerConfig;
use actor_runtime::message::{action_defs, ActionDef, ActionDefs};
use actor_runtime::registry::ActorPlacement;
use actor_runtime::{ActorContainer, ActorId, ActorTypeRegistration, InstanceWrapper, WrapperFactory};
use std::sync::Arc;

pub const ACTOR_TYPE: &str = "Greeter";

/// Action names understood by the greeter.
pub mod actions {
    pub const GREET: &str = "greet";
    pub const HISTORY: &str = "history";
    pub const PING: &str = "ping";
}

pub fn action_table() -> ActionDefs {
    action_defs([
        (actions::GREET, ActionDef::exclusive()),
        (actions::HISTORY, ActionDef::shared()),
        (actions::PING, ActionDef::unlocked()),
    ])
}

/// Creates the greeter container of host `application`.
pub fn new(application: &str, config: &RunnerConfig) -> Arc<ActorContainer> {
    let host = application.to_string();
    let factory: WrapperFactory = Arc::new(move |id: &ActorId| {
        Arc::new(Greeter::new(host.clone(), id)) as Arc<dyn InstanceWrapper>
    });
    ActorContainer::new(ACTOR_TYPE.into(), action_table(), factory, config.clone())
}

/// The container together with its placement, ready for a dispatcher.
pub fn registration(application: &str, config: &RunnerConfig) -> ActorTypeRegistration {
    ActorTypeRegistration::new(new(application, config), ActorPlacement::default())
}
