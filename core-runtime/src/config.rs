//! # Core Configuration Module
//!
//! Provides configuration management for the e-book library core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the injected host capabilities and the runtime
//! settings. It fails fast when a required capability is missing.
//!
//! ## Required Dependencies
//!
//! - `SettingsStore` - Backing store for per-user preferences
//!
//! ## Optional Dependencies (with defaults)
//!
//! - `Clock` - Time source used to stamp books (default: `SystemClock`)
//! - Default settings template (default: bundled `default_settings.json`)
//! - `LoggingConfig` (default: `LoggingConfig::default()`)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_runtime::settings::InMemorySettingsStore;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .settings_store(Arc::new(InMemorySettingsStore::new()))
//!     .event_buffer_size(256)
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use crate::events::{EventBus, DEFAULT_EVENT_BUFFER_SIZE};
use crate::logging::LoggingConfig;
use bridge_traits::{Clock, SettingsStore, SystemClock};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Settings written for every user on first load, grouped by section.
const DEFAULT_SETTINGS_TEMPLATE: &str = include_str!("../resources/default_settings.json");

/// Largest accepted event buffer. Beyond this a lagging subscriber is a bug,
/// not a sizing problem.
const MAX_EVENT_BUFFER_SIZE: usize = 65_536;

/// Core configuration for the e-book library core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// User preferences storage (required)
    pub settings_store: Arc<dyn SettingsStore>,

    /// Time source for `added_to_library` / `last_opened` stamps
    pub clock: Arc<dyn Clock>,

    /// Capacity of the broadcast channel behind [`EventBus`]
    pub event_buffer_size: usize,

    /// Flattened default settings (`"Section/Key" -> value`)
    pub default_settings: BTreeMap<String, String>,

    /// Logging setup handed to [`crate::logging::init_logging`]
    pub logging: LoggingConfig,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("settings_store", &"SettingsStore { ... }")
            .field("clock", &"Clock { ... }")
            .field("event_buffer_size", &self.event_buffer_size)
            .field("default_settings", &self.default_settings.len())
            .field("logging", &self.logging)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Event buffer size is in `1..=65536`
    /// - Default setting keys are `Section/Key` shaped
    pub fn validate(&self) -> Result<()> {
        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > MAX_EVENT_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "Event buffer size exceeds maximum of {}",
                MAX_EVENT_BUFFER_SIZE
            )));
        }

        if let Some(key) = self
            .default_settings
            .keys()
            .find(|key| key.split('/').any(str::is_empty))
        {
            return Err(Error::Config(format!(
                "Default setting key '{}' has an empty section or name",
                key
            )));
        }

        Ok(())
    }

    /// Create the event bus sized by this configuration.
    pub fn event_bus(&self) -> EventBus {
        EventBus::new(self.event_buffer_size)
    }

    /// Install the global subscriber described by [`CoreConfig::logging`].
    ///
    /// Fails if the filter is invalid or a subscriber is already installed.
    pub fn init_logging(&self) -> Result<()> {
        crate::logging::init_logging(self.logging.clone())
    }
}

fn settings_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "SettingsStore implementation is required for user preferences. \
                 Desktop: inject a file-backed store. \
                 Tests: use core_runtime::settings::InMemorySettingsStore."
            .to_string(),
    }
}

/// Flatten a `{ "Section": { "Key": "value" } }` template into
/// `"Section/Key" -> "value"` pairs.
///
/// Non-string leaves are stored in their JSON text form, so `true` becomes
/// `"true"` and `100` becomes `"100"`.
pub fn parse_default_settings(template: &str) -> Result<BTreeMap<String, String>> {
    let root: Value = serde_json::from_str(template)
        .map_err(|e| Error::Config(format!("Default settings are not valid JSON: {}", e)))?;

    let Value::Object(sections) = root else {
        return Err(Error::Config(
            "Default settings must be a JSON object of sections".to_string(),
        ));
    };

    let mut flattened = BTreeMap::new();
    for (section, entries) in sections {
        let Value::Object(entries) = entries else {
            return Err(Error::Config(format!(
                "Default settings section '{}' must be an object",
                section
            )));
        };

        for (name, value) in entries {
            let value = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            flattened.insert(format!("{}/{}", section, name), value);
        }
    }

    Ok(flattened)
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    settings_store: Option<Arc<dyn SettingsStore>>,
    clock: Option<Arc<dyn Clock>>,
    event_buffer_size: Option<usize>,
    default_settings_template: Option<String>,
    logging: Option<LoggingConfig>,
}

impl CoreConfigBuilder {
    /// Sets the settings store implementation (required).
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Sets the clock (optional, defaults to [`SystemClock`]).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the event bus capacity.
    ///
    /// Default: 100
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Replaces the bundled default settings with a JSON template of the
    /// same `{ "Section": { "Key": "value" } }` shape.
    pub fn default_settings_template(mut self, template: impl Into<String>) -> Self {
        self.default_settings_template = Some(template.into());
        self
    }

    /// Sets the logging configuration.
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - The `SettingsStore` is missing
    /// - The default settings template does not parse
    /// - Configuration values are invalid
    pub fn build(self) -> Result<CoreConfig> {
        let settings_store = self
            .settings_store
            .ok_or_else(settings_store_missing_error)?;

        let template = self
            .default_settings_template
            .as_deref()
            .unwrap_or(DEFAULT_SETTINGS_TEMPLATE);

        let config = CoreConfig {
            settings_store,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            default_settings: parse_default_settings(template)?,
            logging: self.logging.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::InMemorySettingsStore;
    use bridge_traits::FixedClock;
    use chrono::{DateTime, Utc};

    fn store() -> Arc<dyn SettingsStore> {
        Arc::new(InMemorySettingsStore::new())
    }

    #[test]
    fn test_builder_requires_settings_store() {
        let result = CoreConfig::builder().build();

        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("SettingsStore"));
        assert!(err_msg.contains("user preferences"));
    }

    #[test]
    fn test_builder_defaults() {
        let config = CoreConfig::builder()
            .settings_store(store())
            .build()
            .unwrap();

        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert_eq!(
            config.default_settings.get("Appearance/Theme"),
            Some(&"Dark".to_string())
        );
        assert!(config.clock.unix_timestamp() > 0);
    }

    #[test]
    fn test_builder_with_custom_clock() {
        let fixed: DateTime<Utc> = DateTime::from_timestamp(1_000, 0).unwrap();
        let config = CoreConfig::builder()
            .settings_store(store())
            .clock(Arc::new(FixedClock::new(fixed)))
            .build()
            .unwrap();

        assert_eq!(config.clock.now(), fixed);
    }

    #[test]
    fn test_validate_rejects_zero_buffer() {
        let result = CoreConfig::builder()
            .settings_store(store())
            .event_buffer_size(0)
            .build();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_excessive_buffer() {
        let result = CoreConfig::builder()
            .settings_store(store())
            .event_buffer_size(MAX_EVENT_BUFFER_SIZE + 1)
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_custom_template_is_flattened() {
        let config = CoreConfig::builder()
            .settings_store(store())
            .default_settings_template(r#"{"General": {"OpenBooksAfterCreation": true, "Zoom": 120}}"#)
            .build()
            .unwrap();

        assert_eq!(config.default_settings.len(), 2);
        assert_eq!(
            config.default_settings.get("General/OpenBooksAfterCreation"),
            Some(&"true".to_string())
        );
        assert_eq!(
            config.default_settings.get("General/Zoom"),
            Some(&"120".to_string())
        );
    }

    #[test]
    fn test_template_must_be_sectioned() {
        assert!(parse_default_settings("[]").is_err());
        assert!(parse_default_settings(r#"{"General": "flat"}"#).is_err());
        assert!(parse_default_settings("not json").is_err());
    }

    #[test]
    fn test_empty_key_segment_rejected() {
        let result = CoreConfig::builder()
            .settings_store(store())
            .default_settings_template(r#"{"": {"Theme": "Dark"}}"#)
            .build();

        assert!(result.unwrap_err().to_string().contains("empty section"));
    }

    #[test]
    fn test_config_is_cloneable_and_debuggable() {
        let config = CoreConfig::builder()
            .settings_store(store())
            .build()
            .unwrap();
        let cloned = config.clone();

        assert_eq!(cloned.event_buffer_size, config.event_buffer_size);
        assert!(format!("{:?}", cloned).contains("SettingsStore { ... }"));
        assert_eq!(config.event_bus().subscriber_count(), 0);
    }
}
