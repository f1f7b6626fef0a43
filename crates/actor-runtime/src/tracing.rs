//! # Observability & Tracing
//!
//! The runtime logs through the `tracing` crate with structured fields. [`setup_tracing`]
//! installs a subscriber for binaries that have no subscriber of their own.
//!
//! ## Configuration
//!
//! Log levels come from the `RUST_LOG` environment variable. The output is compact and
//! hides module paths (`with_target(false)`); the fields carry the context instead.
//!
//! ## What Gets Traced
//!
//! - **Instance lifecycle** (`info`): runner started, activated, deactivated; container
//!   stopping and stopped.
//! - **Scheduling** (`debug`): calls queued, unknown actions, dispatches refused.
//! - **Swallowed failures** (`warn`): failed activation, deactivate or release hooks, and
//!   framework errors the invoker is about to retry.
//! - **Invocation spans**: [`DynamicInvoker::invoke`](crate::invoker::DynamicInvoker::invoke)
//!   opens a span carrying `actor_type` and `action`, so every retry is attributed to its call.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle only
//! RUST_LOG=info cargo run -p actor-sample
//!
//! # Every scheduling decision
//! RUST_LOG=debug cargo run -p actor-sample
//!
//! # Only the runtime, verbose
//! RUST_LOG=actor_runtime=debug cargo run -p actor-sample
//! ```
//!
//! With `RUST_LOG=info` a short session looks like:
//!
//! ```text
//! INFO Actor type registered application="host-a" actor_type=greeter
//! INFO Runner started actor_type=greeter actor_id=[alice]
//! INFO Activated actor_type=greeter actor_id=[alice]
//! INFO Stopping container actor_type=greeter instances=1
//! INFO Runner deactivated actor_type=greeter actor_id=[alice]
//! INFO Container stopped actor_type=greeter
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
