use crate::clients::{CounterClient, GreeterClient};
use crate::model::CounterStore;
use crate::{counter_actor, greeter_actor};
use actor_runtime::config::RuntimeConfig;
use actor_runtime::registry::{ActorRegistryPusher, LocalActorRegistry};
use actor_runtime::{Dispatcher, DynamicInvoker, LocalTransport, PlacementCache};
use std::sync::Arc;
use tracing::info;

pub const HOST_A: &str = "host-a";
pub const HOST_B: &str = "host-b";

pub struct ClusterSystem {
    pub greeter_client: GreeterClient,
    pub counter_client: CounterClient,
    pub store: Arc<CounterStore>,
    registry: Arc<LocalActorRegistry>,
    transport: Arc<LocalTransport>,
    hosts: Vec<Arc<Dispatcher>>,
}

impl Default for ClusterSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterSystem {
    pub fn new() -> Self {
        Self::with_store(&RuntimeConfig::default(), Arc::new(CounterStore::new()))
    }

    /// Builds the cluster on an existing store, e.g. one a previous system saved into.
    pub fn with_store(config: &RuntimeConfig, store: Arc<CounterStore>) -> Self {
        let registry = Arc::new(LocalActorRegistry::new());
        let pusher = registry.clone() as Arc<dyn ActorRegistryPusher>;

        let host_a = Arc::new(Dispatcher::new(HOST_A, Some(pusher.clone())));
        host_a.register(greeter_actor::registration(HOST_A, &config.runner));
        host_a.register(counter_actor::registration(store.clone(), &config.runner));

        let host_b = Arc::new(Dispatcher::new(HOST_B, Some(pusher)));
        host_b.register(counter_actor::registration(store.clone(), &config.runner));

        let transport = Arc::new(LocalTransport::new());
        transport.attach(host_a.clone());
        transport.attach(host_b.clone());

        let invoker = Arc::new(DynamicInvoker::new(
            transport.clone(),
            registry.clone(),
            Arc::new(PlacementCache::new(&config.placement_cache)),
            &config.invoker,
        ));
        info!(hosts = 2, "Cluster started");

        Self {
            greeter_client: GreeterClient::new(invoker.clone()),
            counter_client: CounterClient::new(invoker),
            store,
            registry,
            transport,
            hosts: vec![host_a, host_b],
        }
    }

    pub fn registry(&self) -> &LocalActorRegistry {
        &self.registry
    }

    pub fn host(&self, application: &str) -> Option<&Arc<Dispatcher>> {
        self.hosts.iter().find(|host| host.application() == application)
    }

    /// Takes a host off the transport without stopping it, as if the network dropped it.
    pub fn disconnect(&self, application: &str) -> bool {
        self.transport.detach(application).is_some()
    }

    /// Stops every host and waits until all instances are deactivated.
    pub async fn shutdown(self) {
        for host in &self.hosts {
            host.stop().await;
        }
        info!("Cluster stopped");
    }
}
