//! # Call Messages
//!
//! This module defines the call that travels from a dispatcher through a container into an
//! instance runner, the per-action metadata the runner schedules by, and the one-shot
//! channel the result comes back on.

use crate::action_error::ActionError;
use crate::names::{ActionName, ActorId, ActorType};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel of a call.
pub type Response = oneshot::Sender<Result<Value, ActionError>>;

/// Concurrency class of an action within one actor instance.
///
/// - **Exclusive**: runs alone. Never overlaps another exclusive or shared action, nor
///   activation or deactivation.
/// - **Shared**: may overlap other shared actions, never an exclusive one.
/// - **None**: not subject to admission at all. Runs whenever the instance is alive,
///   including while it activates or deactivates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockClass {
    Exclusive,
    Shared,
    None,
}

/// Metadata of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDef {
    pub lock: LockClass,
}

impl ActionDef {
    pub fn exclusive() -> Self {
        Self {
            lock: LockClass::Exclusive,
        }
    }

    pub fn shared() -> Self {
        Self {
            lock: LockClass::Shared,
        }
    }

    pub fn unlocked() -> Self {
        Self {
            lock: LockClass::None,
        }
    }
}

/// The actions an actor type exposes, keyed by normalized name.
pub type ActionDefs = HashMap<ActionName, ActionDef>;

/// Builds an [`ActionDefs`] table from `(raw name, def)` pairs.
pub fn action_defs<'a>(entries: impl IntoIterator<Item = (&'a str, ActionDef)>) -> ActionDefs {
    entries
        .into_iter()
        .map(|(name, def)| (ActionName::new(name), def))
        .collect()
}

/// A decoded inbound call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorCall {
    pub actor_type: ActorType,
    pub actor_id: ActorId,
    pub action_name: ActionName,
    #[serde(default)]
    pub arguments: Vec<Value>,
}

impl ActorCall {
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
