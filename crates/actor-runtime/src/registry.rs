//! # Actor Registry
//!
//! Placement metadata shared between hosts: which applications host an actor type, and how
//! calls for that type are routed. The network synchronization of this metadata lives
//! outside this crate; here it is reduced to two traits and an in-memory implementation
//! that several in-process hosts can share.

use crate::names::ActorType;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One application (host) that can receive calls for an actor type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub name: String,
    #[serde(default)]
    pub migration_version: String,
}

impl ApplicationInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            migration_version: String::new(),
        }
    }
}

/// Routing policy of an actor type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorPlacement {
    /// Actor id segment that names the receiving host directly. May be negative.
    pub bind_index: Option<i32>,
    /// Remember the last successful host per actor id.
    pub sticky: bool,
}

impl ActorPlacement {
    pub fn bound_to(bind_index: i32) -> Self {
        Self {
            bind_index: Some(bind_index),
            sticky: false,
        }
    }

    pub fn sticky() -> Self {
        Self {
            bind_index: None,
            sticky: true,
        }
    }
}

/// Everything a caller needs to route a call for one actor type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorInfo {
    pub applications: Vec<ApplicationInfo>,
    pub placement: ActorPlacement,
}

/// What a host announces about one of the actor types it serves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorPushInfo {
    pub placement: ActorPlacement,
    pub migration_version: String,
}

/// Read side of the registry. Called on every invocation attempt, so it must be cheap.
pub trait ActorRegistryFetcher: Send + Sync {
    /// Returns an empty [`ActorInfo`] for unknown types.
    fn get(&self, actor_type: &ActorType) -> ActorInfo;
}

/// Write side of the registry.
pub trait ActorRegistryPusher: Send + Sync {
    /// Replaces everything previously announced by `application` with `table`.
    fn push(&self, application: &str, table: HashMap<ActorType, ActorPushInfo>);
}

#[derive(Default)]
struct RegistryState {
    /// application name → announced types
    announcements: HashMap<String, HashMap<ActorType, ActorPushInfo>>,
}

/// In-memory registry that implements both sides.
#[derive(Default)]
pub struct LocalActorRegistry {
    state: RwLock<RegistryState>,
}

impl LocalActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ActorRegistryFetcher for LocalActorRegistry {
    fn get(&self, actor_type: &ActorType) -> ActorInfo {
        let state = self.state.read();
        let mut info = ActorInfo::default();
        let mut names: Vec<&String> = state.announcements.keys().collect();
        names.sort();
        for name in names {
            let Some(push) = state
                .announcements
                .get(name)
                .and_then(|table| table.get(actor_type))
            else {
                continue;
            };
            info.applications.push(ApplicationInfo {
                name: name.clone(),
                migration_version: push.migration_version.clone(),
            });
            info.placement = push.placement.clone();
        }
        info
    }
}

impl ActorRegistryPusher for LocalActorRegistry {
    fn push(&self, application: &str, table: HashMap<ActorType, ActorPushInfo>) {
        tracing::debug!(application, actor_types = table.len(), "Registry updated");
        self.state
            .write()
            .announcements
            .insert(application.to_string(), table);
    }
}
