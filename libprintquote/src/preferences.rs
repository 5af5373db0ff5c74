//! Persisted display currency preference
//!
//! The preferred currency is one string under a fixed key. Reading it never
//! fails: a missing store, a missing value, an unrecognized value, or a
//! storage error all resolve to USD. Writing it never fails either; storage
//! errors are logged and dropped.

use std::sync::Arc;

use crate::currency::Currency;
use crate::storage::KeyValueStore;

/// Storage key for the preferred display currency
pub const PREFERRED_CURRENCY_KEY: &str = "preferredCurrency";

/// Display preferences backed by an optional key-value store
///
/// A `Preferences` without a store behaves like a context with no persistent
/// storage at all: reads give defaults and writes are no-ops.
#[derive(Clone, Default)]
pub struct Preferences {
    store: Option<Arc<dyn KeyValueStore>>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Preferences with no persistent storage available
    pub fn unavailable() -> Self {
        Self { store: None }
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Resolve the preferred display currency
    pub fn get_default(&self) -> Currency {
        let Some(store) = &self.store else {
            return Currency::default();
        };

        match store.get(PREFERRED_CURRENCY_KEY) {
            Ok(Some(stored)) => match stored.parse::<Currency>() {
                Ok(currency) => currency,
                Err(_) => {
                    tracing::debug!(
                        "Ignoring unrecognized stored currency '{}', using {}",
                        stored,
                        Currency::default()
                    );
                    Currency::default()
                }
            },
            Ok(None) => Currency::default(),
            Err(e) => {
                tracing::warn!(
                    "Failed to read currency preference from {} storage: {}",
                    store.backend_name(),
                    e
                );
                Currency::default()
            }
        }
    }

    /// Persist the preferred display currency
    pub fn set_default(&self, currency: Currency) {
        let Some(store) = &self.store else {
            tracing::debug!("No persistent storage, not saving currency preference");
            return;
        };

        match store.set(PREFERRED_CURRENCY_KEY, currency.as_str()) {
            Ok(()) => tracing::debug!("Saved preferred currency {}", currency),
            Err(e) => tracing::warn!(
                "Failed to save currency preference to {} storage: {}",
                store.backend_name(),
                e
            ),
        }
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("store", &self.store.as_ref().map(|s| s.backend_name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::{MemoryStore, StorageResult};

    /// Store whose every operation fails
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )))
        }

        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "quota exceeded",
            )))
        }

        fn remove(&self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Poisoned)
        }

        fn backend_name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn test_no_store_defaults_to_usd() {
        let prefs = Preferences::unavailable();
        assert!(!prefs.is_persistent());
        assert_eq!(prefs.get_default(), Currency::Usd);

        // No-op, no panic
        prefs.set_default(Currency::Eur);
        assert_eq!(prefs.get_default(), Currency::Usd);
    }

    #[test]
    fn test_empty_store_defaults_to_usd() {
        let prefs = Preferences::new(Arc::new(MemoryStore::new()));
        assert_eq!(prefs.get_default(), Currency::Usd);
    }

    #[test]
    fn test_set_then_get() {
        let prefs = Preferences::new(Arc::new(MemoryStore::new()));
        prefs.set_default(Currency::Eur);
        assert_eq!(prefs.get_default(), Currency::Eur);

        // Last write wins
        prefs.set_default(Currency::Fcfa);
        assert_eq!(prefs.get_default(), Currency::Fcfa);
    }

    #[test]
    fn test_corrupted_value_defaults_to_usd() {
        let store = Arc::new(MemoryStore::new());
        let prefs = Preferences::new(store.clone());
        prefs.set_default(Currency::Gbp);

        store.set(PREFERRED_CURRENCY_KEY, "gbp; DROP").unwrap();
        assert_eq!(prefs.get_default(), Currency::Usd);

        store.set(PREFERRED_CURRENCY_KEY, "XAF").unwrap();
        assert_eq!(prefs.get_default(), Currency::Usd);
    }

    #[test]
    fn test_stored_value_must_match_exactly() {
        let store = Arc::new(MemoryStore::new());
        store.set(PREFERRED_CURRENCY_KEY, "eur").unwrap();
        let prefs = Preferences::new(store);
        assert_eq!(prefs.get_default(), Currency::Usd);
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let prefs = Preferences::new(Arc::new(BrokenStore));
        assert!(prefs.is_persistent());
        assert_eq!(prefs.get_default(), Currency::Usd);
        prefs.set_default(Currency::Cad);
        assert_eq!(prefs.get_default(), Currency::Usd);
    }

    #[test]
    fn test_debug_shows_backend_only() {
        let prefs = Preferences::new(Arc::new(MemoryStore::new()));
        assert_eq!(format!("{:?}", prefs), "Preferences { store: Some(\"memory\") }");
    }
}
