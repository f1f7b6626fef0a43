//! # Cluster Lifecycle & Orchestration
//!
//! This module wires a small two-host cluster inside one process and tears it down again.
//! Individual actors are simple; the interesting part is how the runtime pieces fit
//! together, so this is where the wiring lives.
//!
//! ## The ClusterSystem Pattern
//!
//! [`ClusterSystem`] builds, in order:
//!
//! 1. **Registry** - a [`LocalActorRegistry`](actor_runtime::registry::LocalActorRegistry)
//!    shared by every host, standing in for a cluster-wide service.
//! 2. **Hosts** - one [`Dispatcher`](actor_runtime::Dispatcher) per host. `host-a` serves
//!    `Greeter` and `Counter`, `host-b` serves only `Counter`. Registering a type announces
//!    it to the registry.
//! 3. **Transport** - a [`LocalTransport`](actor_runtime::LocalTransport) that reaches
//!    every host by name.
//! 4. **Invoker and clients** - one [`DynamicInvoker`](actor_runtime::DynamicInvoker)
//!    shared by the typed clients.
//!
//! ```text
//!   GreeterClient ─┐                         ┌─▶ host-a: Dispatcher ─▶ Greeter, Counter
//!                  ├─▶ DynamicInvoker ─▶ LocalTransport
//!   CounterClient ─┘        │                └─▶ host-b: Dispatcher ─▶ Counter
//!                           ▼
//!                  LocalActorRegistry ◀── announcements from both hosts
//! ```
//!
//! ## Graceful Shutdown
//!
//! [`ClusterSystem::shutdown`] stops every dispatcher. Each dispatcher stops its
//! containers, which deactivate every live instance once its running work is done. The
//! counters save themselves to the [`CounterStore`](crate::model::CounterStore) on the way
//! out, so a new system built on the same store picks up where the old one stopped.

pub mod cluster_system;

pub use cluster_system::*;
