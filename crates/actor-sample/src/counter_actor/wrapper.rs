use super::actions;
use super::error::CounterError;
use crate::model::{CounterSnapshot, CounterStore};
use actor_runtime::{ActionError, ActionName, ActorId, InstanceWrapper, Value};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// One counter instance, backed by a [`CounterStore`].
pub struct Counter {
    key: String,
    store: Arc<CounterStore>,
    snapshot: Mutex<CounterSnapshot>,
}

impl Counter {
    pub fn new(store: Arc<CounterStore>, id: &ActorId) -> Self {
        Self {
            key: id.to_string(),
            store,
            snapshot: Mutex::new(CounterSnapshot::default()),
        }
    }

    fn increment(&self, args: &[Value]) -> Result<i64, CounterError> {
        let by = match args.first() {
            Some(value) => value.as_i64()?,
            None => 1,
        };
        if by <= 0 {
            return Err(CounterError::InvalidIncrement(by));
        }
        let mut snapshot = self.snapshot.lock();
        snapshot.value += by;
        Ok(snapshot.value)
    }
}

#[async_trait]
impl InstanceWrapper for Counter {
    async fn activate(&self) -> Result<(), ActionError> {
        let mut snapshot = self.store.load(&self.key);
        snapshot.activations += 1;
        debug!(key = %self.key, value = snapshot.value, "Counter loaded");
        *self.snapshot.lock() = snapshot;
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), ActionError> {
        let snapshot = *self.snapshot.lock();
        self.store.save(&self.key, snapshot);
        debug!(key = %self.key, value = snapshot.value, "Counter saved");
        Ok(())
    }

    async fn perform(&self, action: &ActionName, args: Vec<Value>) -> Result<Value, ActionError> {
        match action.as_str() {
            actions::INCREMENT => Ok(Value::from(self.increment(&args)?)),
            actions::VALUE => Ok(Value::from(self.snapshot.lock().value)),
            actions::ACTIVATIONS => Ok(Value::from(i64::from(self.snapshot.lock().activations))),
            other => Err(ActionError::application(
                "UNSUPPORTED_ACTION",
                format!("Counter cannot {other}"),
            )),
        }
    }
}
