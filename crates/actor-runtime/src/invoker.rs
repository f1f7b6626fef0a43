//! # Dynamic Invoker
//!
//! Outbound side of the runtime. Given an [`InvokeRequest`], the [`DynamicInvoker`] picks a
//! receiving host, ships the call through a [`TransportInvoker`] and retries until the call
//! succeeds, fails with an application error, or the retry budget is spent.
//!
//! # Receiver selection
//! Every attempt re-reads the registry and picks the receiver in this order:
//!
//! 1. **Bind index**: the actor type names one id segment as the host. Nothing else is
//!    consulted, and an out-of-range index means "no receiver".
//! 2. **Placement cache**: for sticky actor types, on the first attempt only. The call is
//!    sent `lazy`, telling the receiver that the sender only guessed. A cache miss still
//!    sends lazily, to a host chosen as in step 3.
//! 3. **Candidates**: hosts suggested by the last redirect if there are any, otherwise every
//!    application registered for the type. One is picked at random.
//!
//! # Retries
//! - An application error ends the invocation immediately and is returned unchanged.
//! - A framework error with a `REDIRECT_DESTINATION` parameter retries at once against the
//!   suggested hosts.
//! - Any other framework error, and an attempt without a receiver, waits on the back-off
//!   session first. An exhausted session ends the invocation.
//!
//! `max_attempts` caps the total number of attempts on top of that. When the invocation
//! gives up, every collected cause is attached to one `INVOKE_ERROR`.

use crate::action_error::{codes, ActionError};
use crate::backoff::{BackOff, BackOffSession};
use crate::config::InvokerConfig;
use crate::error::FrameworkError;
use crate::names::{ActionName, ActorId, ActorType};
use crate::placement_cache::PlacementCache;
use crate::registry::{ActorRegistryFetcher, ApplicationInfo};
use crate::value::Value;
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// One attempt, addressed to one host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportRequest {
    pub receiver: String,
    pub actor_type: ActorType,
    pub actor_id: ActorId,
    pub action_name: ActionName,
    pub arguments: Vec<Value>,
    /// The receiver was picked from the placement cache.
    pub lazy: bool,
}

/// Ships a request to a specific host.
#[async_trait]
pub trait TransportInvoker: Send + Sync {
    async fn invoke(&self, request: TransportRequest) -> Result<Value, ActionError>;
}

/// A call as the application issues it, without a receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub actor_type: ActorType,
    pub actor_id: ActorId,
    pub action_name: ActionName,
    pub arguments: Vec<Value>,
}

impl InvokeRequest {
    pub fn new(
        actor_type: impl Into<ActorType>,
        actor_id: impl Into<ActorId>,
        action_name: impl Into<ActionName>,
        arguments: Vec<Value>,
    ) -> Self {
        Self {
            actor_type: actor_type.into(),
            actor_id: actor_id.into(),
            action_name: action_name.into(),
            arguments,
        }
    }
}

pub struct DynamicInvoker {
    transport: Arc<dyn TransportInvoker>,
    registry: Arc<dyn ActorRegistryFetcher>,
    cache: Arc<PlacementCache>,
    backoff: Arc<dyn BackOff>,
    max_attempts: u32,
}

impl DynamicInvoker {
    pub fn new(
        transport: Arc<dyn TransportInvoker>,
        registry: Arc<dyn ActorRegistryFetcher>,
        cache: Arc<PlacementCache>,
        config: &InvokerConfig,
    ) -> Self {
        Self {
            transport,
            registry,
            cache,
            backoff: config.backoff.build(),
            max_attempts: config.max_attempts.max(1),
        }
    }

    /// Replaces the back-off policy built from the configuration.
    pub fn with_backoff(mut self, backoff: Arc<dyn BackOff>) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn placement_cache(&self) -> &PlacementCache {
        &self.cache
    }

    #[tracing::instrument(
        skip_all,
        fields(actor_type = %request.actor_type, action = %request.action_name)
    )]
    pub async fn invoke(&self, request: InvokeRequest) -> Result<Value, ActionError> {
        let mut causes: Vec<ActionError> = Vec::new();
        let mut session: Option<Box<dyn BackOffSession>> = None;
        let mut suggestions: Vec<String> = Vec::new();
        let mut cache_invalidated = false;

        for attempt in 0..self.max_attempts {
            let info = self.registry.get(&request.actor_type);
            let placement = &info.placement;
            let mut lazy = false;

            let receiver = if let Some(bind_index) = placement.bind_index {
                request.actor_id.segment(bind_index).map(str::to_string)
            } else if placement.sticky && attempt == 0 {
                lazy = true;
                let key = self.cache.prepare(&request.actor_type, &request.actor_id);
                self.cache
                    .get(&key)
                    .or_else(|| choose(&suggestions, &info.applications))
            } else {
                if placement.sticky && !cache_invalidated {
                    let key = self.cache.prepare(&request.actor_type, &request.actor_id);
                    self.cache.delete(&key);
                    cache_invalidated = true;
                }
                choose(&suggestions, &info.applications)
            };

            let Some(receiver) = receiver else {
                debug!(attempt, "No receiver available");
                causes.push(
                    FrameworkError::NoReceiversAvailable {
                        actor_type: request.actor_type.clone(),
                        action: request.action_name.clone(),
                    }
                    .into(),
                );
                if !self.pause(&mut session).await {
                    break;
                }
                continue;
            };

            let transport_request = TransportRequest {
                receiver: receiver.clone(),
                actor_type: request.actor_type.clone(),
                actor_id: request.actor_id.clone(),
                action_name: request.action_name.clone(),
                arguments: request.arguments.clone(),
                lazy,
            };

            match self.transport.invoke(transport_request).await {
                Ok(value) => {
                    if placement.sticky {
                        self.cache
                            .update(&request.actor_type, &request.actor_id, &receiver);
                    }
                    return Ok(value);
                }
                Err(error) if error.is_application() => return Err(error),
                Err(error) => {
                    warn!(attempt, %receiver, error = %error, "Framework error, retrying");
                    let redirect = error.redirect_destination();
                    causes.push(error);
                    if let Some(hosts) = redirect {
                        suggestions = hosts;
                        continue;
                    }
                    if !self.pause(&mut session).await {
                        break;
                    }
                }
            }
        }

        Err(invoke_error(&request, causes))
    }

    /// Waits on the back-off session, starting one on first use. Returns `false` when no
    /// attempts remain.
    async fn pause(&self, session: &mut Option<Box<dyn BackOffSession>>) -> bool {
        session
            .get_or_insert_with(|| self.backoff.begin())
            .back_off()
            .await
    }
}

fn choose(suggestions: &[String], applications: &[ApplicationInfo]) -> Option<String> {
    let candidates: Vec<&str> = if suggestions.is_empty() {
        applications.iter().map(|app| app.name.as_str()).collect()
    } else {
        suggestions.iter().map(String::as_str).collect()
    };
    match candidates.len() {
        0 => None,
        1 => Some(candidates[0].to_string()),
        n => Some(candidates[rand::rng().random_range(0..n)].to_string()),
    }
}

fn invoke_error(request: &InvokeRequest, causes: Vec<ActionError>) -> ActionError {
    let first_message = causes
        .first()
        .map(|cause| cause.message.clone())
        .unwrap_or_default();
    ActionError::framework(
        codes::INVOKE_ERROR,
        "Failed to invoke remote method [ActionName] on an instance of [ActorType]: [FirstMessage]",
    )
    .with_param("ActorType", request.actor_type.to_string())
    .with_param("ActionName", request.action_name.to_string())
    .with_param("FirstMessage", first_message)
    .with_nested(causes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestions_take_priority() {
        let applications = vec![ApplicationInfo::new("host-a"), ApplicationInfo::new("host-b")];
        let suggestions = vec!["host-c".to_string()];
        assert_eq!(choose(&suggestions, &applications), Some("host-c".to_string()));
        assert_eq!(choose(&[], &[]), None);

        let picked = choose(&[], &applications);
        assert!(matches!(picked.as_deref(), Some("host-a") | Some("host-b")));
    }

    #[test]
    fn test_invoke_error_surfaces_first_cause() {
        let request = InvokeRequest::new("Echo", "1", "say", vec![]);
        let causes = vec![
            ActionError::framework(codes::NO_RECEIVERS_AVAILABLE, "Nobody home"),
            ActionError::framework(codes::DEACTIVATED, "Gone"),
        ];
        let error = invoke_error(&request, causes);
        assert_eq!(error.code, codes::INVOKE_ERROR);
        assert_eq!(
            error.param("FirstMessage").unwrap().as_str(),
            Ok("(NO_RECEIVERS_AVAILABLE) Nobody home")
        );
        assert_eq!(error.nested.len(), 2);
    }
}
