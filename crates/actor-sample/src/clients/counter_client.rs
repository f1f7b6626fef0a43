//! # Counter Client
//!
//! Provides a high-level API for interacting with the sticky `Counter` actor.
use crate::counter_actor::{actions, CounterError, ACTOR_TYPE};
use actor_runtime::{ActorClient, DynamicInvoker, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Client for interacting with the Counter actor.
#[derive(Clone)]
pub struct CounterClient {
    inner: ActorClient,
}

impl CounterClient {
    pub fn new(invoker: Arc<DynamicInvoker>) -> Self {
        Self {
            inner: ActorClient::new(invoker, ACTOR_TYPE),
        }
    }

    /// Adds `by` and returns the new value.
    #[instrument(skip(self))]
    pub async fn increment(&self, counter: &str, by: i64) -> Result<i64, CounterError> {
        debug!("Sending request");
        Ok(self
            .inner
            .call_as(counter, actions::INCREMENT, vec![Value::from(by)])
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn value(&self, counter: &str) -> Result<i64, CounterError> {
        Ok(self.inner.call_as(counter, actions::VALUE, vec![]).await?)
    }

    /// Number of times the counter has been activated, including the current activation.
    pub async fn activations(&self, counter: &str) -> Result<i64, CounterError> {
        Ok(self.inner.call_as(counter, actions::ACTIVATIONS, vec![]).await?)
    }
}
