//! # Counter Actor
//!
//! A persistent counter. Its value survives deactivation: the instance loads a
//! [`CounterSnapshot`](crate::model::CounterSnapshot) from the shared
//! [`CounterStore`] on activation and writes it back on deactivation.
//!
//! The type is **sticky**: callers remember which host served a counter and keep sending
//! to it, so the in-memory value is never split across two hosts while they agree.

pub mod error;
pub mod wrapper;

pub use error::*;
pub use wrapper::Counter;

use crate::model::CounterStore;
use actor_runtime::config::RunnerConfig;
use actor_runtime::message::{action_defs, ActionDef, ActionDefs};
use actor_runtime::registry::ActorPlacement;
use actor_runtime::{ActorContainer, ActorId, ActorTypeRegistration, InstanceWrapper, WrapperFactory};
use std::sync::Arc;

pub const ACTOR_TYPE: &str = "Counter";

pub mod actions {
    pub const INCREMENT: &str = "increment";
    pub const VALUE: &str = "value";
    pub const ACTIVATIONS: &str = "activations";
}

pub fn action_table() -> ActionDefs {
    action_defs([
        (actions::INCREMENT, ActionDef::exclusive()),
        (actions::VALUE, ActionDef::shared()),
        (actions::ACTIVATIONS, ActionDef::shared()),
    ])
}

pub fn new(store: Arc<CounterStore>, config: &RunnerConfig) -> Arc<ActorContainer> {
    let factory: WrapperFactory = Arc::new(move |id: &ActorId| {
        Arc::new(Counter::new(store.clone(), id)) as Arc<dyn InstanceWrapper>
    });
    ActorContainer::new(ACTOR_TYPE.into(), action_table(), factory, config.clone())
}

pub fn registration(store: Arc<CounterStore>, config: &RunnerConfig) -> ActorTypeRegistration {
    ActorTypeRegistration::new(new(store, config), ActorPlacement::sticky())
}
