//! # Actor Sample Library
//!
//! This library exposes the sample's actors, clients and cluster wiring for integration
//! testing.

pub mod clients;
pub mod counter_actor;
pub mod greeter_actor;
pub mod lifecycle;
pub mod model;
