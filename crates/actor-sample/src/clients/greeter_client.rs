//! # Greeter Client
//!
//! Provides a high-level API for interacting with the `Greeter` actor.
//! It wraps an [`ActorClient`] and exposes domain-specific methods.
use crate::greeter_actor::{actions, GreeterError, ACTOR_TYPE};
use actor_runtime::{ActorClient, DynamicInvoker, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Client for interacting with the Greeter actor.
#[derive(Clone)]
pub struct GreeterClient {
    inner: ActorClient,
}

impl GreeterClient {
    pub fn new(invoker: Arc<DynamicInvoker>) -> Self {
        Self {
            inner: ActorClient::new(invoker, ACTOR_TYPE),
        }
    }

    #[instrument(skip(self))]
    pub async fn greet(&self, greeter: &str, name: &str) -> Result<String, GreeterError> {
        debug!("Sending request");
        Ok(self
            .inner
            .call_as(greeter, actions::GREET, vec![Value::from(name)])
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn history(&self, greeter: &str) -> Result<Vec<String>, GreeterError> {
        Ok(self.inner.call_as(greeter, actions::HISTORY, vec![]).await?)
    }

    pub async fn ping(&self, greeter: &str) -> Result<String, GreeterError> {
        Ok(self.inner.call_as(greeter, actions::PING, vec![]).await?)
    }
}
