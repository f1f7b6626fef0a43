//! # Virtual Actor Sample
//!
//! Runs a two-host cluster in one process and talks to it through typed clients.
//!
//! ## Core Components
//!
//! - **[greeter_actor](actor_sample::greeter_actor)**: one action per lock class.
//! - **[counter_actor](actor_sample::counter_actor)**: a sticky actor that persists itself on deactivation.
//! - **[clients](actor_sample::clients)**: typed wrappers over the runtime's generic client.
//! - **[lifecycle](actor_sample::lifecycle)**: wires registry, hosts, transport and invoker.
//!
//! ## Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run -p actor-sample
//! ```

use actor_runtime::tracing::setup_tracing;
use actor_sample::lifecycle::ClusterSystem;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Starting two-host cluster");
    let system = ClusterSystem::new();

    let span = tracing::info_span!("greetings");
    async {
        for name in ["Alice", "Bob"] {
            let greeting = system
                .greeter_client
                .greet("lobby", name)
                .await
                .map_err(|e| e.to_string())?;
            info!(%greeting, "Greeted");
        }
        let history = system
            .greeter_client
            .history("lobby")
            .await
            .map_err(|e| e.to_string())?;
        info!(?history, "Greeter history");
        Ok::<(), String>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("counting");
    let counted = async {
        for _ in 0..3 {
            system.counter_client.increment("visits", 1).await?;
        }
        system.counter_client.value("visits").await
    }
    .instrument(span)
    .await;

    match counted {
        Ok(value) => info!(value, "Counter updated"),
        Err(e) => error!(error = %e, "Counting failed"),
    }

    // Shutdown system gracefully
    let store = system.store.clone();
    system.shutdown().await;

    info!(saved_counters = store.len(), "Application completed successfully");
    Ok(())
}
