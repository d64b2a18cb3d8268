//! # Per-User Settings
//!
//! `SettingsService` scopes the host's [`SettingsStore`] to the signed-in
//! user. Every key is written under a namespace derived from the SHA-256 of
//! the user's lower-cased e-mail, so two accounts on one machine never see
//! each other's preferences and the e-mail never appears in storage.
//!
//! On first load for a user the bundled defaults are seeded; keys the user
//! already has are left alone.
//!
//! ```ignore
//! let service = SettingsService::from_config(&config, event_bus);
//! service.load_user_settings(&token, "ada@example.com").await?;
//! service.set_setting("Appearance/Theme", "Light").await?;
//! ```

use crate::config::CoreConfig;
use crate::error::{Error, Result};
use crate::events::{CoreEvent, EventBus, SettingsEvent};
use crate::logging::redact_if_sensitive;
use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::SettingsStore;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, instrument};

/// Hex SHA-256 of the trimmed, lower-cased e-mail.
pub fn user_namespace(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    format!("{:x}", hasher.finalize())
}

fn scoped_key(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}

/// Settings facade bound to at most one active user at a time.
pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
    defaults: BTreeMap<String, String>,
    event_bus: EventBus,
    active_user: tokio::sync::RwLock<Option<String>>,
}

impl SettingsService {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        defaults: BTreeMap<String, String>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            defaults,
            event_bus,
            active_user: tokio::sync::RwLock::new(None),
        }
    }

    /// Build a service from the store and defaults carried by `config`.
    pub fn from_config(config: &CoreConfig, event_bus: EventBus) -> Self {
        Self::new(
            config.settings_store.clone(),
            config.default_settings.clone(),
            event_bus,
        )
    }

    /// Activate `email`'s namespace and seed any missing defaults.
    ///
    /// `token` proves the caller signed in; it is only checked for presence
    /// and is never logged.
    ///
    /// Returns the number of defaults that had to be written.
    #[instrument(skip(self, token, email), fields(email = %redact_if_sensitive("email", email)))]
    pub async fn load_user_settings(&self, token: &str, email: &str) -> Result<u32> {
        if token.trim().is_empty() {
            return Err(Error::Settings(
                "Cannot load settings without an authentication token".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(Error::Settings(format!(
                "'{}' is not an e-mail address",
                redact_if_sensitive("email", email)
            )));
        }

        let namespace = user_namespace(email);
        let mut seeded = 0u32;
        for (name, value) in &self.defaults {
            let key = scoped_key(&namespace, name);
            if !self.store.has_key(&key).await? {
                self.store.set_string(&key, value).await?;
                seeded += 1;
            }
        }

        *self.active_user.write().await = Some(namespace.clone());

        info!(seeded_defaults = seeded, "User settings loaded");
        self.event_bus
            .publish(CoreEvent::Settings(SettingsEvent::UserSettingsLoaded {
                user_hash: namespace,
                seeded_defaults: seeded,
            }));

        Ok(seeded)
    }

    /// Read `name` for the active user.
    ///
    /// `None` when no user is loaded or the key was never written.
    pub async fn get_setting(&self, name: &str) -> Result<Option<String>> {
        let Some(namespace) = self.active_namespace().await else {
            debug!(setting = name, "No active user, setting not read");
            return Ok(None);
        };

        Ok(self.store.get_string(&scoped_key(&namespace, name)).await?)
    }

    /// Write `name` for the active user.
    #[instrument(skip(self, value))]
    pub async fn set_setting(&self, name: &str, value: &str) -> Result<()> {
        let namespace = self.active_namespace().await.ok_or_else(|| {
            Error::Settings(format!("Cannot write '{}' before a user is loaded", name))
        })?;

        self.store
            .set_string(&scoped_key(&namespace, name), value)
            .await?;

        debug!("Setting written");
        self.event_bus
            .publish(CoreEvent::Settings(SettingsEvent::SettingChanged {
                key: name.to_string(),
            }));

        Ok(())
    }

    /// Forget the active user. Values already stored are kept for the next
    /// sign-in.
    pub async fn clear_user_data(&self) {
        let previous = self.active_user.write().await.take();
        if previous.is_some() {
            info!("Active user cleared");
        }
        self.event_bus
            .publish(CoreEvent::Settings(SettingsEvent::UserDataCleared));
    }

    pub async fn has_active_user(&self) -> bool {
        self.active_user.read().await.is_some()
    }

    async fn active_namespace(&self) -> Option<String> {
        self.active_user.read().await.clone()
    }
}

impl std::fmt::Debug for SettingsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsService")
            .field("defaults", &self.defaults.len())
            .field("event_bus", &self.event_bus)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum StoredValue {
    Text(String),
    Flag(bool),
    Integer(i64),
}

impl StoredValue {
    fn type_name(&self) -> &'static str {
        match self {
            StoredValue::Text(_) => "string",
            StoredValue::Flag(_) => "bool",
            StoredValue::Integer(_) => "i64",
        }
    }
}

/// Process-local [`SettingsStore`]. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    values: RwLock<HashMap<String, StoredValue>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, StoredValue>> {
        self.values.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, StoredValue>> {
        self.values.write().unwrap_or_else(|e| e.into_inner())
    }

    fn insert(&self, key: &str, value: StoredValue) {
        self.write().insert(key.to_string(), value);
    }

    fn lookup<T>(
        &self,
        key: &str,
        expected: &str,
        pick: impl FnOnce(&StoredValue) -> Option<T>,
    ) -> BridgeResult<Option<T>> {
        let values = self.read();
        let Some(stored) = values.get(key) else {
            return Ok(None);
        };

        pick(stored)
            .map(Some)
            .ok_or_else(|| BridgeError::TypeMismatch {
                key: key.to_string(),
                expected: expected.to_string(),
                actual: stored.type_name().to_string(),
            })
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.insert(key, StoredValue::Text(value.to_string()));
        Ok(())
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        self.lookup(key, "string", |stored| match stored {
            StoredValue::Text(text) => Some(text.clone()),
            _ => None,
        })
    }

    async fn set_bool(&self, key: &str, value: bool) -> BridgeResult<()> {
        self.insert(key, StoredValue::Flag(value));
        Ok(())
    }

    async fn get_bool(&self, key: &str) -> BridgeResult<Option<bool>> {
        self.lookup(key, "bool", |stored| match stored {
            StoredValue::Flag(flag) => Some(*flag),
            _ => None,
        })
    }

    async fn set_i64(&self, key: &str, value: i64) -> BridgeResult<()> {
        self.insert(key, StoredValue::Integer(value));
        Ok(())
    }

    async fn get_i64(&self, key: &str) -> BridgeResult<Option<i64>> {
        self.lookup(key, "i64", |stored| match stored {
            StoredValue::Integer(number) => Some(*number),
            _ => None,
        })
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.write().remove(key);
        Ok(())
    }

    async fn has_key(&self, key: &str) -> BridgeResult<bool> {
        Ok(self.read().contains_key(key))
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn clear_all(&self) -> BridgeResult<()> {
        self.write().clear();
        Ok(())
    }
}
