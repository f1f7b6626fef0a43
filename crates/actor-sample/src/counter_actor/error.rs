use actor_runtime::value::ConversionError;
use actor_runtime::ActionError;
use thiserror::Error;

pub mod codes {
    pub const INVALID_INCREMENT: &str = "INVALID_INCREMENT";
    pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CounterError {
    #[error("Increment must be positive, got {0}")]
    InvalidIncrement(i64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ConversionError),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(ActionError),
}

impl From<CounterError> for ActionError {
    fn from(error: CounterError) -> Self {
        match error {
            CounterError::InvalidIncrement(by) => ActionError::application(
                codes::INVALID_INCREMENT,
                "Increment must be positive, got [Increment]",
            )
            .with_param("Increment", by),
            CounterError::InvalidArgument(e) => {
                ActionError::application(codes::INVALID_ARGUMENT, "Invalid argument: [Reason]")
                    .with_param("Reason", e.to_string())
            }
            CounterError::ActorCommunicationError(e) => e,
        }
    }
}

impl From<ActionError> for CounterError {
    fn from(error: ActionError) -> Self {
        let increment = error
            .param("Increment")
            .and_then(|value| value.as_i64().ok());
        match increment {
            Some(by) if error.is_application() && error.code == codes::INVALID_INCREMENT => {
                CounterError::InvalidIncrement(by)
            }
            _ => CounterError::ActorCommunicationError(error),
        }
    }
}
