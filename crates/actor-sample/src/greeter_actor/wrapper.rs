use super::actions;
use super::error::GreeterError;
use crate::model::GreeterState;
use actor_runtime::{ActionError, ActionName, ActorId, InstanceWrapper, Value};
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

/// One greeter instance.
pub struct Greeter {
    host: String,
    id: ActorId,
    state: Mutex<GreeterState>,
}

impl Greeter {
    pub fn new(host: impl Into<String>, id: &ActorId) -> Self {
        Self {
            host: host.into(),
            id: id.clone(),
            state: Mutex::new(GreeterState::default()),
        }
    }
}

fn name_argument(args: &[Value]) -> Result<String, GreeterError> {
    let name = args.first().ok_or(GreeterError::MissingName)?.as_str()?;
    if name.trim().is_empty() {
        return Err(GreeterError::MissingName);
    }
    Ok(name.to_string())
}

#[async_trait]
impl InstanceWrapper for Greeter {
    async fn activate(&self) -> Result<(), ActionError> {
        debug!(host = %self.host, id = %self.id, "Greeter ready");
        Ok(())
    }

    async fn perform(&self, action: &ActionName, args: Vec<Value>) -> Result<Value, ActionError> {
        match action.as_str() {
            actions::GREET => {
                let name = name_argument(&args)?;
                let greeting = self.state.lock().greet(&self.host, &name);
                Ok(Value::from(greeting))
            }
            actions::HISTORY => Ok(Value::from(self.state.lock().greeted.clone())),
            actions::PING => Ok(Value::from("pong")),
            other => Err(ActionError::application(
                "UNSUPPORTED_ACTION",
                format!("Greeter cannot {other}"),
            )),
        }
    }
}
