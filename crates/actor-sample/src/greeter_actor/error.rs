use actor_runtime::value::ConversionError;
use actor_runtime::ActionError;
use thiserror::Error;

/// Error codes the greeter reports to callers.
pub mod codes {
    pub const MISSING_NAME: &str = "MISSING_NAME";
    pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GreeterError {
    #[error("A name is required")]
    MissingName,

    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ConversionError),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(ActionError),
}

impl From<GreeterError> for ActionError {
    fn from(error: GreeterError) -> Self {
        match error {
            GreeterError::MissingName => {
                ActionError::application(codes::MISSING_NAME, "A name is required")
            }
            GreeterError::InvalidArgument(e) => {
                ActionError::application(codes::INVALID_ARGUMENT, "Invalid argument: [Reason]")
                    .with_param("Reason", e.to_string())
            }
            GreeterError::ActorCommunicationError(e) => e,
        }
    }
}

/// Recovers the typed error from what came back over the wire.
impl From<ActionError> for GreeterError {
    fn from(error: ActionError) -> Self {
        if error.is_application() && error.code == codes::MISSING_NAME {
            GreeterError::MissingName
        } else {
            GreeterError::ActorCommunicationError(error)
        }
    }
}
