//! Settings Storage Abstraction
//!
//! Provides the platform-agnostic key-value store used for user preferences.
//! Where the values end up (an INI file, the registry, a SQLite table) is the
//! host's business; the core only relies on the contract below.

use async_trait::async_trait;

use crate::error::Result;

/// Key-value settings storage trait
///
/// Abstracts platform-specific preferences/settings storage:
/// - Linux: XDG config files
/// - macOS: `NSUserDefaults` / plist
/// - Windows: Registry or INI files
///
/// Keys are opaque strings. Callers that need namespacing (for example one
/// namespace per signed-in user) encode it into the key.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn save_preference(store: &dyn SettingsStore) -> Result<()> {
///     store.set_string("Appearance/Theme", "Dark").await?;
///     store.set_bool("General/OpenBooksAfterCreation", true).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store a string value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store a boolean value
    async fn set_bool(&self, key: &str, value: bool) -> Result<()>;

    /// Retrieve a boolean value
    async fn get_bool(&self, key: &str) -> Result<Option<bool>>;

    /// Store an integer value
    async fn set_i64(&self, key: &str, value: i64) -> Result<()>;

    /// Retrieve an integer value
    async fn get_i64(&self, key: &str) -> Result<Option<i64>>;

    /// Delete a setting
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a setting exists
    async fn has_key(&self, key: &str) -> Result<bool>;

    /// List all setting keys
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Clear all settings
    async fn clear_all(&self) -> Result<()>;

    /// Retrieve a string value, falling back to `default` when the key is absent
    async fn get_string_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self
            .get_string(key)
            .await?
            .unwrap_or_else(|| default.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;

    mock! {
        pub Store {}

        #[async_trait]
        impl SettingsStore for Store {
            async fn set_string(&self, key: &str, value: &str) -> Result<()>;
            async fn get_string(&self, key: &str) -> Result<Option<String>>;
            async fn set_bool(&self, key: &str, value: bool) -> Result<()>;
            async fn get_bool(&self, key: &str) -> Result<Option<bool>>;
            async fn set_i64(&self, key: &str, value: i64) -> Result<()>;
            async fn get_i64(&self, key: &str) -> Result<Option<i64>>;
            async fn delete(&self, key: &str) -> Result<()>;
            async fn has_key(&self, key: &str) -> Result<bool>;
            async fn list_keys(&self) -> Result<Vec<String>>;
            async fn clear_all(&self) -> Result<()>;
        }
    }

    #[tokio::test]
    async fn test_get_string_or_returns_stored_value() {
        let mut store = MockStore::new();
        store
            .expect_get_string()
            .withf(|key| key == "Appearance/Theme")
            .returning(|_| Ok(Some("Dark".to_string())));

        let value = store.get_string_or("Appearance/Theme", "Light").await.unwrap();
        assert_eq!(value, "Dark");
    }

    #[tokio::test]
    async fn test_get_string_or_falls_back_to_default() {
        let mut store = MockStore::new();
        store.expect_get_string().returning(|_| Ok(None));

        let value = store.get_string_or("Appearance/Theme", "Light").await.unwrap();
        assert_eq!(value, "Light");
    }
}
