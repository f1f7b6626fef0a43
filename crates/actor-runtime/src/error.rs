//! # Framework Errors
//!
//! This module defines the failure conditions raised by the runtime itself. Each variant
//! has a stable code and converts into a framework-kind [`ActionError`] whose parameters
//! carry the variant's fields, so the failure keeps its meaning after it leaves the process.

use crate::action_error::{codes, ActionError};
use crate::names::{ActionName, ActorType};

/// Errors that can occur within the actor runtime itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameworkError {
    #[error("Unknown action {action} on actor {actor_type}")]
    UnknownAction { actor_type: ActorType, action: String },
    #[error("Actor type {actor_type} is deactivated")]
    Deactivated { actor_type: ActorType },
    #[error("Container for actor type {actor_type} is deactivating")]
    ContainerDeactivating { actor_type: ActorType },
    #[error("Unable to obtain actor lock for an instance of {actor_type}: {reason}")]
    ActorLockFailed { actor_type: ActorType, reason: String },
    #[error("Unexpected application error: {message}")]
    UnexpectedApplicationError { message: String },
    #[error("No receivers available to process action {action} on an instance of {actor_type}")]
    NoReceiversAvailable {
        actor_type: ActorType,
        action: ActionName,
    },
    #[error("Actor type not specified")]
    ActorTypeMissing,
    #[error("Actor type not registered: {actor_type}")]
    ActorTypeNotRegistered { actor_type: ActorType },
    #[error("Actor dropped response channel")]
    ResponseDropped,
    #[error("Receiver {receiver} is unreachable")]
    ReceiverUnreachable { receiver: String },
    #[error("Unable to convert result of action {action}: {reason}")]
    ResultConversionFailed { action: ActionName, reason: String },
}

impl FrameworkError {
    pub fn code(&self) -> &'static str {
        match self {
            FrameworkError::UnknownAction { .. } => codes::UNKNOWN_ACTION,
            FrameworkError::Deactivated { .. } => codes::DEACTIVATED,
            FrameworkError::ContainerDeactivating { .. } => codes::CONTAINER_DEACTIVATING,
            FrameworkError::ActorLockFailed { .. } => codes::ACTOR_LOCK_FAILED,
            FrameworkError::UnexpectedApplicationError { .. } => {
                codes::UNEXPECTED_APPLICATION_ERROR
            }
            FrameworkError::NoReceiversAvailable { .. } => codes::NO_RECEIVERS_AVAILABLE,
            FrameworkError::ActorTypeMissing => codes::ACTOR_TYPE_MISSING,
            FrameworkError::ActorTypeNotRegistered { .. } => codes::ACTOR_TYPE_NOT_REGISTERED,
            FrameworkError::ResponseDropped => codes::RESPONSE_DROPPED,
            FrameworkError::ReceiverUnreachable { .. } => codes::RECEIVER_UNREACHABLE,
            FrameworkError::ResultConversionFailed { .. } => codes::RESULT_CONVERSION_FAILED,
        }
    }
}

impl From<FrameworkError> for ActionError {
    fn from(error: FrameworkError) -> Self {
        let code = error.code();
        match error {
            FrameworkError::UnknownAction { actor_type, action } => {
                ActionError::framework(code, "Unknown action [Action] on actor [ActorType]")
                    .with_param("Action", action)
                    .with_param("ActorType", actor_type.to_string())
            }
            FrameworkError::Deactivated { actor_type } => {
                ActionError::framework(code, "Actor type [ActorType] is deactivated")
                    .with_param("ActorType", actor_type.to_string())
            }
            FrameworkError::ContainerDeactivating { actor_type } => ActionError::framework(
                code,
                "Container for actor type [ActorType] is deactivating",
            )
            .with_param("ActorType", actor_type.to_string()),
            FrameworkError::ActorLockFailed { actor_type, reason } => ActionError::framework(
                code,
                "Unable to obtain actor lock for an instance of [ActorType]: [Reason]",
            )
            .with_param("ActorType", actor_type.to_string())
            .with_param("Reason", reason),
            // Application-kind: the failure originated in actor logic, so it must not be retried.
            FrameworkError::UnexpectedApplicationError { message } => {
                ActionError::application(code, "Unexpected application error: [Message]")
                    .with_param("Message", message)
            }
            FrameworkError::NoReceiversAvailable { actor_type, action } => ActionError::framework(
                code,
                "No receivers available to process action [ActionName] on an instance of [ActorType]",
            )
            .with_param("ActorType", actor_type.to_string())
            .with_param("ActionName", action.to_string()),
            FrameworkError::ActorTypeMissing => {
                ActionError::framework(code, "Actor type not specified")
            }
            FrameworkError::ActorTypeNotRegistered { actor_type } => {
                ActionError::framework(code, "Actor type not registered: [ActorType]")
                    .with_param("ActorType", actor_type.to_string())
            }
            FrameworkError::ResponseDropped => {
                ActionError::framework(code, "Actor dropped response channel")
            }
            FrameworkError::ReceiverUnreachable { receiver } => {
                ActionError::framework(code, "Receiver [Receiver] is unreachable")
                    .with_param("Receiver", receiver)
            }
            FrameworkError::ResultConversionFailed { action, reason } => ActionError::framework(
                code,
                "Unable to convert result of action [ActionName]: [Reason]",
            )
            .with_param("ActionName", action.to_string())
            .with_param("Reason", reason),
        }
    }
}
