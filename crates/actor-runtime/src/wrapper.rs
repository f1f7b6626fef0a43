//! # InstanceWrapper Trait
//!
//! The `InstanceWrapper` trait is the contract between the runtime and one live actor
//! instance of the application. The runtime never sees the application's concrete types: it
//! drives the instance through lifecycle hooks and hands every action over by name, with
//! [`Value`] arguments.
//!
//! # Lifecycle
//! For every instance the runner calls, in this order:
//!
//! 1. [`InstanceWrapper::create`] and [`InstanceWrapper::activate`] before the first action.
//!    A failure in either one is an activation failure: the call that caused the activation
//!    receives the error and the instance shuts down without serving anything.
//! 2. [`InstanceWrapper::perform`] for every admitted action, possibly concurrently for
//!    shared and unlocked actions.
//! 3. [`InstanceWrapper::deactivate`] and [`InstanceWrapper::release`] once the instance is
//!    asked to stop. Failures here are logged and otherwise ignored.
//!
//! The lifecycle hooks are **Provided Methods**. You only implement them when the actor
//! needs them; the default does nothing (`Ok(())`).
//!
//! # Panics
//! Hooks and actions may panic. The runner catches the panic at the call boundary and
//! reports `UNEXPECTED_APPLICATION_ERROR` to the caller instead of losing the instance loop.

use crate::action_error::ActionError;
use crate::names::{ActionName, ActorId, ActorType};
use crate::value::Value;
use async_trait::async_trait;
use std::sync::Arc;

/// Application adapter for one actor instance.
///
/// Methods take `&self`: shared and unlocked actions of the same instance can run at the
/// same time, so mutable state needs its own synchronization inside the implementation.
#[async_trait]
pub trait InstanceWrapper: Send + Sync + 'static {
    async fn create(&self) -> Result<(), ActionError> {
        Ok(())
    }

    async fn activate(&self) -> Result<(), ActionError> {
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), ActionError> {
        Ok(())
    }

    async fn release(&self) -> Result<(), ActionError> {
        Ok(())
    }

    /// Executes one action. Only called for action names the container knows.
    async fn perform(&self, action: &ActionName, args: Vec<Value>) -> Result<Value, ActionError>;
}

/// Creates the wrapper for a newly addressed actor id.
pub type WrapperFactory = Arc<dyn Fn(&ActorId) -> Arc<dyn InstanceWrapper> + Send + Sync>;

/// Cluster-wide lock that guarantees a single active instance per actor identity.
///
/// Held from just before `create` until just after `release`.
#[async_trait]
pub trait ActorLock: Send + Sync {
    /// Returns the reason on failure.
    async fn acquire(&self, actor_type: &ActorType, actor_id: &ActorId) -> Result<(), String>;

    async fn release(&self, actor_type: &ActorType, actor_id: &ActorId);
}
