use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The persisted part of a counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub value: i64,
    /// How many times an instance was activated from this snapshot.
    pub activations: u32,
}

/// Stand-in for a database: counters load from it on activation and save to it on
/// deactivation.
#[derive(Debug, Default)]
pub struct CounterStore {
    snapshots: Mutex<HashMap<String, CounterSnapshot>>,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the saved snapshot, or a zeroed one for a counter never saved.
    pub fn load(&self, key: &str) -> CounterSnapshot {
        self.snapshots.lock().get(key).copied().unwrap_or_default()
    }

    pub fn save(&self, key: &str, snapshot: CounterSnapshot) {
        self.snapshots.lock().insert(key.to_string(), snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
