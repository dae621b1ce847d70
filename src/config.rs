//! Feature configuration.

use serde::{Deserialize, Serialize};

/// Default prefix marking a pattern variable, e.g. `?delay`.
pub const DEFAULT_VARIABLE_PREFIX: &str = "?";

/// Configuration for implicit timers.
///
/// The feature is opt-in: the default configuration is disabled and makes
/// the processor a no-op.
///
/// # Example
///
/// ```rust
/// use implicit_timers::config::ImplicitTimersConfig;
///
/// let config = ImplicitTimersConfig::from_json(r#"{"enabled": true}"#).unwrap();
/// assert!(config.enabled);
/// assert!(config.is_variable("?delay"));
/// assert!(!config.is_variable("30s"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImplicitTimersConfig {
    /// Master switch for the whole feature.
    pub enabled: bool,
    /// Prefix the execution engine uses for pattern variables.
    pub variable_prefix: String,
}

impl Default for ImplicitTimersConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            variable_prefix: DEFAULT_VARIABLE_PREFIX.to_string(),
        }
    }
}

impl ImplicitTimersConfig {
    /// Default configuration with the feature switched on.
    pub fn enabled() -> Self {
        Self::default().with_enabled(true)
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_variable_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.variable_prefix = prefix.into();
        self
    }

    /// Load configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether `s` names a pattern variable.
    pub fn is_variable(&self, s: &str) -> bool {
        !self.variable_prefix.is_empty()
            && s.len() > self.variable_prefix.len()
            && s.starts_with(&self.variable_prefix)
    }
}
