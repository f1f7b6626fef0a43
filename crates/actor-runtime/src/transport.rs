//! # In-Process Transport
//!
//! [`LocalTransport`] delivers [`TransportRequest`]s straight to the [`Dispatcher`] of the
//! named host, without encoding anything. It lets several hosts share one process, which is
//! how the sample cluster and the integration tests run.

use crate::action_error::ActionError;
use crate::dispatcher::Dispatcher;
use crate::error::FrameworkError;
use crate::invoker::{TransportInvoker, TransportRequest};
use crate::message::ActorCall;
use crate::value::Value;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
pub struct LocalTransport {
    hosts: RwLock<HashMap<String, Arc<Dispatcher>>>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `dispatcher` reachable under its application name.
    pub fn attach(&self, dispatcher: Arc<Dispatcher>) {
        self.hosts
            .write()
            .insert(dispatcher.application().to_string(), dispatcher);
    }

    /// Makes a host unreachable, as if its process went away.
    pub fn detach(&self, application: &str) -> Option<Arc<Dispatcher>> {
        self.hosts.write().remove(application)
    }
}

#[async_trait]
impl TransportInvoker for LocalTransport {
    async fn invoke(&self, request: TransportRequest) -> Result<Value, ActionError> {
        let dispatcher = self.hosts.read().get(&request.receiver).cloned();
        let Some(dispatcher) = dispatcher else {
            return Err(FrameworkError::ReceiverUnreachable {
                receiver: request.receiver,
            }
            .into());
        };
        debug!(receiver = %request.receiver, lazy = request.lazy, "Local delivery");
        dispatcher
            .call(ActorCall {
                actor_type: request.actor_type,
                actor_id: request.actor_id,
                action_name: request.action_name,
                arguments: request.arguments,
            })
            .await
    }
}
