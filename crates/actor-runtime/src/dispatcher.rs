//! # Dispatcher
//!
//! Inbound entry point of a host: finds the container for a call's actor type and hands
//! the call over. Registering a type also announces it, with its placement, to the
//! registry so that callers elsewhere can find this host.

use crate::action_error::ActionError;
use crate::container::ActorContainer;
use crate::error::FrameworkError;
use crate::message::{ActorCall, Response};
use crate::names::ActorType;
use crate::registry::{ActorPlacement, ActorPushInfo, ActorRegistryPusher};
use crate::value::Value;
use futures::future::join_all;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::info;

/// An actor type served by this host.
#[derive(Clone)]
pub struct ActorTypeRegistration {
    pub container: Arc<ActorContainer>,
    pub placement: ActorPlacement,
    pub migration_version: String,
}

impl ActorTypeRegistration {
    pub fn new(container: Arc<ActorContainer>, placement: ActorPlacement) -> Self {
        Self {
            container,
            placement,
            migration_version: String::new(),
        }
    }
}

pub struct Dispatcher {
    application: String,
    actor_types: RwLock<HashMap<ActorType, ActorTypeRegistration>>,
    registry_pusher: Option<Arc<dyn ActorRegistryPusher>>,
}

impl Dispatcher {
    /// `application` is the host name other processes use to reach this dispatcher.
    pub fn new(
        application: impl Into<String>,
        registry_pusher: Option<Arc<dyn ActorRegistryPusher>>,
    ) -> Self {
        Self {
            application: application.into(),
            actor_types: RwLock::new(HashMap::new()),
            registry_pusher,
        }
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    /// Adds or replaces an actor type and re-announces the full table.
    pub fn register(&self, registration: ActorTypeRegistration) {
        let actor_type = registration.container.actor_type().clone();
        info!(application = %self.application, %actor_type, "Actor type registered");
        self.actor_types.write().insert(actor_type, registration);
        self.broadcast();
    }

    /// Pushes the current placement table to the registry, if one is configured.
    pub fn broadcast(&self) {
        let Some(pusher) = &self.registry_pusher else {
            return;
        };
        let table: HashMap<ActorType, ActorPushInfo> = self
            .actor_types
            .read()
            .iter()
            .map(|(actor_type, registration)| {
                (
                    actor_type.clone(),
                    ActorPushInfo {
                        placement: registration.placement.clone(),
                        migration_version: registration.migration_version.clone(),
                    },
                )
            })
            .collect();
        pusher.push(&self.application, table);
    }

    pub async fn dispatch(&self, call: ActorCall, respond_to: Response) {
        if call.actor_type.is_empty() {
            let _ = respond_to.send(Err(FrameworkError::ActorTypeMissing.into()));
            return;
        }
        let container = self
            .actor_types
            .read()
            .get(&call.actor_type)
            .map(|registration| registration.container.clone());
        match container {
            Some(container) => container.dispatch(call, respond_to).await,
            None => {
                let error = FrameworkError::ActorTypeNotRegistered {
                    actor_type: call.actor_type,
                };
                let _ = respond_to.send(Err(error.into()));
            }
        }
    }

    pub async fn call(&self, call: ActorCall) -> Result<Value, ActionError> {
        let (respond_to, response) = oneshot::channel();
        self.dispatch(call, respond_to).await;
        response
            .await
            .map_err(|_| ActionError::from(FrameworkError::ResponseDropped))?
    }

    /// Stops every registered container and waits until all of them are drained.
    pub async fn stop(&self) {
        let containers: Vec<Arc<ActorContainer>> = self
            .actor_types
            .read()
            .values()
            .map(|registration| registration.container.clone())
            .collect();
        join_all(containers.iter().map(|container| container.stop())).await;
        info!(application = %self.application, "Dispatcher stopped");
    }
}
