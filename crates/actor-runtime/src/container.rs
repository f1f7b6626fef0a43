//! # Actor Container
//!
//! One container per actor type per host. It maps actor ids to [`InstanceRunner`]s,
//! creating a runner the first time an id is addressed and dropping it again once that
//! runner has deactivated.
//!
//! The id → runner map sits behind a single read/write lock. Lookups of existing runners
//! only take the read side; the write side is taken to insert a new runner, to remove a
//! deactivated one, and to switch the container into stopping mode.

use crate::action_error::ActionError;
use crate::config::RunnerConfig;
use crate::error::FrameworkError;
use crate::message::{ActionDefs, ActorCall, Response};
use crate::names::{ActorId, ActorType, InstanceKey};
use crate::runner::InstanceRunner;
use crate::value::Value;
use crate::wrapper::{ActorLock, WrapperFactory};
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info};

/// Called once, when the first [`ActorContainer::stop`] completes.
pub type FinishedHook = Box<dyn FnOnce() + Send>;

struct Entry {
    serial: u64,
    runner: Arc<InstanceRunner>,
}

struct Instances {
    runners: HashMap<InstanceKey, Entry>,
    active: bool,
    next_serial: u64,
}

/// Per-actor-type registry of live instances.
pub struct ActorContainer {
    actor_type: ActorType,
    action_defs: Arc<ActionDefs>,
    wrapper_factory: WrapperFactory,
    actor_lock: Option<Arc<dyn ActorLock>>,
    config: RunnerConfig,
    instances: RwLock<Instances>,
    /// Number of runners in the map.
    population: watch::Sender<usize>,
    on_finished: Mutex<Option<FinishedHook>>,
    me: Weak<ActorContainer>,
}

impl ActorContainer {
    pub fn new(
        actor_type: ActorType,
        action_defs: ActionDefs,
        wrapper_factory: WrapperFactory,
        config: RunnerConfig,
    ) -> Arc<Self> {
        ActorContainerBuilder::new(actor_type, action_defs, wrapper_factory)
            .with_config(config)
            .build()
    }

    pub fn builder(
        actor_type: ActorType,
        action_defs: ActionDefs,
        wrapper_factory: WrapperFactory,
    ) -> ActorContainerBuilder {
        ActorContainerBuilder::new(actor_type, action_defs, wrapper_factory)
    }

    pub fn actor_type(&self) -> &ActorType {
        &self.actor_type
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.instances.read().runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_active(&self) -> bool {
        self.instances.read().active
    }

    /// Routes `call` to the runner of its actor id, creating the runner when needed.
    /// Unknown actions are refused before any instance is looked up or created.
    pub async fn dispatch(&self, call: ActorCall, respond_to: Response) {
        if !self.action_defs.contains_key(&call.action_name) {
            debug!(actor_type = %self.actor_type, action = %call.action_name, "Unknown action");
            let error = FrameworkError::UnknownAction {
                actor_type: self.actor_type.clone(),
                action: call.action_name.to_string(),
            };
            let _ = respond_to.send(Err(error.into()));
            return;
        }
        match self.obtain_runner(&call.actor_id) {
            Ok(runner) => runner.invoke(call, respond_to).await,
            Err(e) => {
                debug!(actor_type = %self.actor_type, actor_id = %call.actor_id, "Dispatch refused");
                let _ = respond_to.send(Err(e.into()));
            }
        }
    }

    /// Dispatches and awaits the result.
    pub async fn call(&self, call: ActorCall) -> Result<Value, ActionError> {
        let (respond_to, response) = oneshot::channel();
        self.dispatch(call, respond_to).await;
        response
            .await
            .map_err(|_| ActionError::from(FrameworkError::ResponseDropped))?
    }

    /// Refuses new instances, deactivates every live instance and waits until all of them
    /// are gone. Safe to call more than once; only the first call fires the finished hook.
    pub async fn stop(&self) {
        let (first, runners) = {
            let mut instances = self.instances.write();
            let first = instances.active;
            instances.active = false;
            let runners: Vec<Arc<InstanceRunner>> = instances
                .runners
                .values()
                .map(|entry| entry.runner.clone())
                .collect();
            (first, runners)
        };
        if first {
            info!(actor_type = %self.actor_type, instances = runners.len(), "Stopping container");
        }

        join_all(runners.iter().map(|runner| runner.trigger_deactivate())).await;

        let mut population = self.population.subscribe();
        let _ = population.wait_for(|count| *count == 0).await;

        let hook = self.on_finished.lock().take();
        if let Some(hook) = hook {
            info!(actor_type = %self.actor_type, "Container stopped");
            hook();
        }
    }

    fn obtain_runner(&self, actor_id: &ActorId) -> Result<Arc<InstanceRunner>, FrameworkError> {
        let key = actor_id.instance_key();
        {
            let instances = self.instances.read();
            if !instances.active {
                return Err(self.deactivating());
            }
            if let Some(entry) = instances.runners.get(&key) {
                return Ok(entry.runner.clone());
            }
        }

        let mut instances = self.instances.write();
        if !instances.active {
            return Err(self.deactivating());
        }
        if let Some(entry) = instances.runners.get(&key) {
            return Ok(entry.runner.clone());
        }

        let serial = instances.next_serial;
        instances.next_serial += 1;

        let container = self.me.clone();
        let removal_key = key.clone();
        let on_deactivated = Box::new(move || {
            if let Some(container) = container.upgrade() {
                container.remove_runner(&removal_key, serial);
            }
        });

        let runner = Arc::new(InstanceRunner::new(
            self.actor_type.clone(),
            actor_id.clone(),
            (self.wrapper_factory)(actor_id),
            self.actor_lock.clone(),
            self.action_defs.clone(),
            self.config.mailbox_capacity,
            on_deactivated,
        ));
        instances.runners.insert(
            key,
            Entry {
                serial,
                runner: runner.clone(),
            },
        );
        self.population.send_replace(instances.runners.len());
        debug!(actor_type = %self.actor_type, %actor_id, "Instance created");
        Ok(runner)
    }

    fn remove_runner(&self, key: &InstanceKey, serial: u64) {
        let mut instances = self.instances.write();
        if instances
            .runners
            .get(key)
            .is_some_and(|entry| entry.serial == serial)
        {
            instances.runners.remove(key);
            self.population.send_replace(instances.runners.len());
        }
    }

    fn deactivating(&self) -> FrameworkError {
        FrameworkError::ContainerDeactivating {
            actor_type: self.actor_type.clone(),
        }
    }
}

/// Builder for [`ActorContainer`]s with optional collaborators.
pub struct ActorContainerBuilder {
    actor_type: ActorType,
    action_defs: ActionDefs,
    wrapper_factory: WrapperFactory,
    actor_lock: Option<Arc<dyn ActorLock>>,
    config: RunnerConfig,
    on_finished: Option<FinishedHook>,
}

impl ActorContainerBuilder {
    pub fn new(
        actor_type: ActorType,
        action_defs: ActionDefs,
        wrapper_factory: WrapperFactory,
    ) -> Self {
        Self {
            actor_type,
            action_defs,
            wrapper_factory,
            actor_lock: None,
            config: RunnerConfig::default(),
            on_finished: None,
        }
    }

    /// Requires every instance to hold `lock` while it is alive.
    pub fn with_actor_lock(mut self, lock: Arc<dyn ActorLock>) -> Self {
        self.actor_lock = Some(lock);
        self
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn on_finished(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_finished = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> Arc<ActorContainer> {
        let (population, _) = watch::channel(0);
        Arc::new_cyclic(|me| ActorContainer {
            actor_type: self.actor_type,
            action_defs: Arc::new(self.action_defs),
            wrapper_factory: self.wrapper_factory,
            actor_lock: self.actor_lock,
            config: self.config,
            instances: RwLock::new(Instances {
                runners: HashMap::new(),
                active: true,
                next_serial: 0,
            }),
            population,
            on_finished: Mutex::new(self.on_finished),
            me: me.clone(),
        })
    }
}
