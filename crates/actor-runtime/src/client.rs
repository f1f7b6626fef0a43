//! # Generic Client
//!
//! This module defines the generic client applications use to call actors of one type.

use crate::action_error::ActionError;
use crate::error::FrameworkError;
use crate::invoker::{DynamicInvoker, InvokeRequest};
use crate::names::{ActionName, ActorId, ActorType};
use crate::value::Value;
use std::fmt::Display;
use std::sync::Arc;

/// ## ActorClient
///
/// The `ActorClient` sends calls for one actor type through a shared [`DynamicInvoker`].
/// It does not know where instances live; every call is routed and retried by the invoker.
///
/// * **Cloneable** – holds an `Arc` to the invoker, so cloning is inexpensive.
/// * **Untyped core** – arguments and results are [`Value`]s. Typed clients wrap it and use
///   [`ActorClient::call_as`] to convert results.
#[derive(Clone)]
pub struct ActorClient {
    invoker: Arc<DynamicInvoker>,
    actor_type: ActorType,
}

impl ActorClient {
    pub fn new(invoker: Arc<DynamicInvoker>, actor_type: impl Into<ActorType>) -> Self {
        Self {
            invoker,
            actor_type: actor_type.into(),
        }
    }

    pub fn actor_type(&self) -> &ActorType {
        &self.actor_type
    }

    pub async fn call(
        &self,
        actor_id: impl Into<ActorId>,
        action: impl Into<ActionName>,
        arguments: Vec<Value>,
    ) -> Result<Value, ActionError> {
        self.invoker
            .invoke(InvokeRequest {
                actor_type: self.actor_type.clone(),
                actor_id: actor_id.into(),
                action_name: action.into(),
                arguments,
            })
            .await
    }

    /// Like [`ActorClient::call`], converting the result. A result of the wrong shape
    /// becomes a `RESULT_CONVERSION_FAILED` framework error.
    pub async fn call_as<T>(
        &self,
        actor_id: impl Into<ActorId>,
        action: impl Into<ActionName>,
        arguments: Vec<Value>,
    ) -> Result<T, ActionError>
    where
        T: TryFrom<Value>,
        T::Error: Display,
    {
        let action = action.into();
        let value = self.call(actor_id, action.clone(), arguments).await?;
        T::try_from(value).map_err(|e| {
            FrameworkError::ResultConversionFailed {
                action,
                reason: e.to_string(),
            }
            .into()
        })
    }
}
