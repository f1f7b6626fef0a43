//! # Action Errors
//!
//! [`ActionError`] is the error type that travels between callers and actor instances,
//! possibly across processes and languages. It is structured rather than stringly typed:
//!
//! - a stable `code` (see [`codes`]),
//! - a human `template` with `[Name]` placeholders and the `parameters` that fill them,
//! - a `kind` telling framework failures (routing, deactivation, exhausted retries) from
//!   application failures (raised by actor logic),
//! - `nested` causes and an optional `stack`.
//!
//! Framework errors are candidates for retry and redirect. Application errors are returned
//! to the original caller unchanged.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known error codes and parameter names.
pub mod codes {
    pub const UNKNOWN_ACTION: &str = "UNKNOWN_ACTION";
    pub const DEACTIVATED: &str = "DEACTIVATED";
    pub const CONTAINER_DEACTIVATING: &str = "CONTAINER_DEACTIVATING";
    pub const ACTOR_LOCK_FAILED: &str = "ACTOR_LOCK_FAILED";
    pub const UNEXPECTED_APPLICATION_ERROR: &str = "UNEXPECTED_APPLICATION_ERROR";
    pub const NO_RECEIVERS_AVAILABLE: &str = "NO_RECEIVERS_AVAILABLE";
    pub const INVOKE_ERROR: &str = "INVOKE_ERROR";
    pub const ACTOR_TYPE_MISSING: &str = "ACTOR_TYPE_MISSING";
    pub const ACTOR_TYPE_NOT_REGISTERED: &str = "ACTOR_TYPE_NOT_REGISTERED";
    pub const RESPONSE_DROPPED: &str = "RESPONSE_DROPPED";
    pub const RECEIVER_UNREACHABLE: &str = "RECEIVER_UNREACHABLE";
    pub const RESULT_CONVERSION_FAILED: &str = "RESULT_CONVERSION_FAILED";

    /// Parameter of a framework error listing the hosts the caller should retry on.
    pub const REDIRECT_DESTINATION: &str = "REDIRECT_DESTINATION";
}

/// Origin of an [`ActionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Framework,
    Application,
}

/// Structured error returned by actions and by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ActionError {
    pub code: String,
    pub message: String,
    pub template: String,
    pub kind: ErrorKind,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
    #[serde(default)]
    pub nested: Vec<ActionError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ActionError {
    /// Starts a framework-kind error. Application code should use [`ActionError::application`].
    pub fn framework(code: impl Into<String>, template: impl Into<String>) -> Self {
        Self::build(ErrorKind::Framework, code.into(), template.into())
    }

    pub fn application(code: impl Into<String>, template: impl Into<String>) -> Self {
        Self::build(ErrorKind::Application, code.into(), template.into())
    }

    fn build(kind: ErrorKind, code: String, template: String) -> Self {
        let mut error = Self {
            code,
            message: String::new(),
            template,
            kind,
            parameters: BTreeMap::new(),
            nested: Vec::new(),
            stack: None,
        };
        error.render();
        error
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self.render();
        self
    }

    pub fn with_nested(mut self, nested: Vec<ActionError>) -> Self {
        self.nested = nested;
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn is_framework(&self) -> bool {
        self.kind == ErrorKind::Framework
    }

    pub fn is_application(&self) -> bool {
        self.kind == ErrorKind::Application
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Hosts suggested by a `REDIRECT_DESTINATION` parameter, if present and well formed.
    pub fn redirect_destination(&self) -> Option<Vec<String>> {
        self.param(codes::REDIRECT_DESTINATION)
            .and_then(|value| value.to_string_list().ok())
            .filter(|hosts| !hosts.is_empty())
    }

    fn render(&mut self) {
        let body = format_template(&self.template, &self.parameters);
        self.message = match (self.code.is_empty(), body.is_empty()) {
            (true, _) => body,
            (false, true) => self.code.clone(),
            (false, false) => format!("({}) {}", self.code, body),
        };
    }
}

/// Replaces every `[Name]` placeholder with the quoted value of parameter `Name`.
/// Placeholders without a matching parameter are left untouched.
pub fn format_template(template: &str, parameters: &BTreeMap<String, Value>) -> String {
    let mut message = template.to_string();
    for (name, value) in parameters {
        message = message.replace(&format!("[{name}]"), &format!("\"{value}\""));
    }
    message
}
