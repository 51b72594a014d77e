//! Event handles naming accounted concurrency resources.
//!
//! A handle is `EVENT_PREFIX` followed by a unique suffix. Validation only
//! checks that shape; it says nothing about whether the handle currently holds
//! a reservation. Ask the accountant for that.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::SandboxError;
use super::ids::IdProvider;
use super::value::SandboxValue;

/// Namespace prefix carried by every event handle.
pub const EVENT_PREFIX: &str = "_EVENT:";

/// Opaque token identifying one accounted thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventHandle(String);

impl EventHandle {
    /// Parse a string into a handle if it has the expected prefix.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        has_event_prefix(value).then(|| Self(value.to_owned()))
    }

    /// The full handle text, prefix included.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The unique part after the prefix.
    #[must_use]
    pub fn suffix(&self) -> &str {
        self.0.strip_prefix(EVENT_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for EventHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EventHandle {
    type Error = SandboxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if has_event_prefix(&value) {
            Ok(Self(value))
        } else {
            Err(SandboxError::Argument(format!(
                "event handle must start with {EVENT_PREFIX:?}: {value:?}"
            )))
        }
    }
}

impl From<EventHandle> for String {
    fn from(handle: EventHandle) -> Self {
        handle.0
    }
}

impl AsRef<str> for EventHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn has_event_prefix(value: &str) -> bool {
    value.starts_with(EVENT_PREFIX)
}

/// Generate a fresh handle using a suffix from `ids`.
///
/// Uniqueness is whatever `ids` guarantees; no deduplication happens here.
pub fn generate_handle(ids: &dyn IdProvider) -> EventHandle {
    EventHandle(format!("{EVENT_PREFIX}{}", ids.new_unique_suffix()))
}

/// Check that `value` is text carrying the event prefix.
///
/// Returns `false` for every non-text value. Shape only, not liveness.
#[must_use]
pub fn is_valid_handle(value: &SandboxValue) -> bool {
    value.as_text().is_some_and(has_event_prefix)
}
