//! Editor configuration.

use crate::cache::DEFAULT_CACHE_CAPACITY;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Lines rendered at full fidelity on each side of the visible range.
pub const DEFAULT_LAZY_RENDER_PADDING: usize = 10;

/// Inactivity required before the idle sweep runs.
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Invalid [`EditorConfig`] values.
pub enum ConfigError {
    #[error("cache capacity must be at least one line")]
    /// `cache_capacity` is zero.
    ZeroCacheCapacity,

    #[error("idle delay must be non-zero")]
    /// `idle_delay` is zero.
    ZeroIdleDelay,
}

/// Per-editor settings.
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use typeset_core::EditorConfig;
///
/// let config: EditorConfig =
///     serde_json::from_str(r#"{ "language": "json", "idle_delay_ms": 250 }"#).unwrap();
/// assert_eq!(config.language, "json");
/// assert_eq!(config.idle_delay.as_millis(), 250);
/// assert_eq!(config.lazy_render_padding, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Language identifier resolved through the registry.
    pub language: String,
    /// Lines tokenized on each side of the visible range.
    pub lazy_render_padding: usize,
    /// Inactivity before dirty visible lines are swept.
    #[serde(rename = "idle_delay_ms", with = "duration_ms")]
    pub idle_delay: Duration,
    /// Maximum number of cached line tokenizations.
    pub cache_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            language: crate::tokenizer::PlainText::ID.to_string(),
            lazy_render_padding: DEFAULT_LAZY_RENDER_PADDING,
            idle_delay: DEFAULT_IDLE_DELAY,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl EditorConfig {
    /// Default settings for `language`.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Self::default()
        }
    }

    /// Set the language identifier.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the lazy render padding.
    pub fn with_lazy_render_padding(mut self, padding: usize) -> Self {
        self.lazy_render_padding = padding;
        self
    }

    /// Set the idle delay.
    pub fn with_idle_delay(mut self, delay: Duration) -> Self {
        self.idle_delay = delay;
        self
    }

    /// Set the line cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Check the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::ZeroCacheCapacity);
        }
        if self.idle_delay.is_zero() {
            return Err(ConfigError::ZeroIdleDelay);
        }
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis().try_into().unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.language, "plaintext");
        assert_eq!(config.lazy_render_padding, 10);
        assert_eq!(config.idle_delay, Duration::from_millis(500));
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = EditorConfig::new("css").with_cache_capacity(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroCacheCapacity));

        let config = EditorConfig::new("css").with_idle_delay(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroIdleDelay));
    }

    #[test]
    fn test_json_round_trip_uses_milliseconds() {
        let config = EditorConfig::new("html")
            .with_lazy_render_padding(4)
            .with_idle_delay(Duration::from_millis(750));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["idle_delay_ms"], 750);

        let back: EditorConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config: EditorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
    }
}
