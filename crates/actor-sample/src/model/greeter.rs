use serde::{Deserialize, Serialize};

/// Everything a greeter instance remembers while it is active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GreeterState {
    /// Names greeted so far, oldest first.
    pub greeted: Vec<String>,
}

impl GreeterState {
    /// Records `name` and returns the greeting for it.
    pub fn greet(&mut self, host: &str, name: &str) -> String {
        self.greeted.push(name.to_string());
        format!("Hello, {name}! Greeted by {host}.")
    }
}
