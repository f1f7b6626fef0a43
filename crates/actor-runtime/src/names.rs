//! # Names and Identities
//!
//! Actor types and action names are compared in a normalized form: lowercased with every
//! non-alphanumeric character removed. `"Demo.Echo_Actor"` and `"demoechoactor"` name the
//! same actor type.
//!
//! An [`ActorId`] is an ordered list of string segments. Segment order matters, and the
//! segments together identify one physical instance.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalized actor type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorType(String);

impl ActorType {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorType {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Normalized action name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionName(String);

impl ActionName {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Composite actor identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(Vec<String>);

impl ActorId {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves a bind index against the segments. Negative indexes count from the end;
    /// anything out of range resolves to `None`.
    pub fn segment(&self, bind_index: i32) -> Option<&str> {
        let idx = if bind_index < 0 {
            self.0.len() as i64 + i64::from(bind_index)
        } else {
            i64::from(bind_index)
        };
        if idx < 0 {
            return None;
        }
        self.0.get(idx as usize).map(String::as_str)
    }

    /// Builds the map key used by containers. Every segment is prefixed with its length so
    /// that `["ab", "c"]` and `["a", "bc"]` never collide.
    pub fn instance_key(&self) -> InstanceKey {
        let mut key = String::new();
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                key.push(':');
            }
            key.push_str(&segment.len().to_string());
            key.push(':');
            key.push_str(segment);
        }
        InstanceKey(key)
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

impl From<&str> for ActorId {
    fn from(single: &str) -> Self {
        Self(vec![single.to_string()])
    }
}

impl From<Vec<String>> for ActorId {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

/// Unambiguous string form of an [`ActorId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceKey(String);

impl InstanceKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
