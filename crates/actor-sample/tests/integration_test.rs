use actor_runtime::action_error::codes;
use actor_runtime::config::{BackOffConfig, InvokerConfig, RuntimeConfig};
use actor_runtime::registry::ActorRegistryFetcher;
use actor_runtime::ActorType;
use actor_sample::counter_actor::CounterError;
use actor_sample::greeter_actor::GreeterError;
use actor_sample::lifecycle::{ClusterSystem, HOST_A};
use actor_sample::model::CounterStore;
use std::sync::Arc;

fn fast_retries() -> RuntimeConfig {
    RuntimeConfig {
        invoker: InvokerConfig {
            max_attempts: 10,
            backoff: BackOffConfig::Fixed {
                delay_ms: 1,
                count: 2,
                hysteresis: 0.0,
            },
        },
        ..Default::default()
    }
}

/// Full end-to-end integration test with all real actors.
/// Both hosts, the registry and the transport run in this process.
#[tokio::test]
async fn test_full_cluster_integration() {
    let system = ClusterSystem::new();

    // Both hosts announced what they serve.
    let greeter = system.registry().get(&ActorType::new("Greeter"));
    let hosts: Vec<&str> = greeter.applications.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(hosts, vec!["host-a"]);
    let counter = system.registry().get(&ActorType::new("Counter"));
    assert_eq!(counter.applications.len(), 2);
    assert!(counter.placement.sticky);

    let hello = system
        .greeter_client
        .greet("lobby", "Alice")
        .await
        .expect("Failed to greet");
    assert_eq!(hello, "Hello, Alice! Greeted by host-a.");
    system.greeter_client.greet("lobby", "Bob").await.unwrap();

    let history = system.greeter_client.history("lobby").await.unwrap();
    assert_eq!(history, vec!["Alice", "Bob"]);
    assert_eq!(system.greeter_client.ping("lobby").await.unwrap(), "pong");

    // Another id is another instance.
    assert!(system.greeter_client.history("hall").await.unwrap().is_empty());

    let error = system.greeter_client.greet("lobby", "").await.unwrap_err();
    assert_eq!(error, GreeterError::MissingName);

    for expected in 1..=3 {
        let value = system.counter_client.increment("visits", 1).await.unwrap();
        assert_eq!(value, expected);
    }
    let error = system
        .counter_client
        .increment("visits", -3)
        .await
        .unwrap_err();
    assert_eq!(error, CounterError::InvalidIncrement(-3));

    let store = system.store.clone();
    system.shutdown().await;
    assert_eq!(store.load("[visits]").value, 3);
}

#[tokio::test]
async fn test_counter_survives_restart() {
    let store = Arc::new(CounterStore::new());

    let first = ClusterSystem::with_store(&RuntimeConfig::default(), store.clone());
    assert_eq!(first.counter_client.increment("c1", 5).await, Ok(5));
    first.shutdown().await;

    let second = ClusterSystem::with_store(&RuntimeConfig::default(), store.clone());
    assert_eq!(second.counter_client.value("c1").await, Ok(5));
    assert_eq!(second.counter_client.activations("c1").await, Ok(2));
    second.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_host_exhausts_retries() {
    let system = ClusterSystem::with_store(&fast_retries(), Arc::new(CounterStore::new()));
    assert!(system.disconnect(HOST_A));

    let error = system.greeter_client.greet("lobby", "Alice").await.unwrap_err();
    let GreeterError::ActorCommunicationError(error) = error else {
        panic!("Expected a communication error, got {error:?}");
    };
    assert_eq!(error.code, codes::INVOKE_ERROR);
    assert_eq!(error.nested.len(), 2);
    assert!(error
        .nested
        .iter()
        .all(|cause| cause.code == codes::RECEIVER_UNREACHABLE));
    system.shutdown().await;
}
