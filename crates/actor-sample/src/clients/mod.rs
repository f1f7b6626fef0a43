//! Typed clients. Each one wraps the runtime's untyped [`ActorClient`](actor_runtime::ActorClient)
//! for one actor type and exposes its actions as plain async methods.

pub mod counter_client;
pub mod greeter_client;

pub use counter_client::CounterClient;
pub use greeter_client::GreeterClient;
