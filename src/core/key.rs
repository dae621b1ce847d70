//! Timer identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an implicit timer: `<machine id>/<node name>`.
///
/// At most one implicit timer is in flight per machine instance and node, so
/// the key can always be rebuilt to cancel it, whether or not a timer exists.
///
/// # Example
///
/// ```rust
/// use implicit_timers::core::TimerKey;
///
/// let key = TimerKey::new("m-1", "waiting");
/// assert_eq!(key.as_str(), "m-1/waiting");
/// assert_eq!(key.machine_id(), "m-1");
/// assert_eq!(key.node_name(), "waiting");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "KeyParts", into = "KeyParts")]
pub struct TimerKey {
    machine_id: String,
    node_name: String,
    key: String,
}

impl TimerKey {
    pub fn new(machine_id: impl Into<String>, node_name: impl Into<String>) -> Self {
        let machine_id = machine_id.into();
        let node_name = node_name.into();
        let key = format!("{machine_id}/{node_name}");
        Self {
            machine_id,
            node_name,
            key,
        }
    }

    /// Machine instance that owns the timer.
    #[must_use]
    pub fn machine_id(&self) -> &str {
        &self.machine_id
    }

    /// Node whose branch produced the timer.
    #[must_use]
    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// The full key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.key
    }
}

/// Serialized form; the joined key is always rebuilt from the parts.
#[derive(Serialize, Deserialize)]
struct KeyParts {
    machine_id: String,
    node_name: String,
}

impl From<KeyParts> for TimerKey {
    fn from(parts: KeyParts) -> Self {
        Self::new(parts.machine_id, parts.node_name)
    }
}

impl From<TimerKey> for KeyParts {
    fn from(key: TimerKey) -> Self {
        Self {
            machine_id: key.machine_id,
            node_name: key.node_name,
        }
    }
}

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for TimerKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}
