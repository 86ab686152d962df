use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use super::KeyValueBackend;

/// JSON view over a [`KeyValueBackend`] that never fails.
///
/// Every backend or serde error is logged and swallowed: reads degrade to
/// `None`, writes report `false`.
pub struct LocalStore<B> {
    backend: B,
}

impl<B: KeyValueBackend> LocalStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read from local store");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding malformed local store entry");
                None
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize local store entry");
                return false;
            }
        };

        match self.backend.write(key, &raw) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to write to local store");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.delete(key) {
            warn!(key = %key, error = %e, "Failed to remove local store entry");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    /// Backend whose every operation fails, like storage that is full or
    /// unavailable.
    pub(crate) struct BrokenBackend;

    impl KeyValueBackend for BrokenBackend {
        fn read(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Err(anyhow::anyhow!("storage unavailable"))
        }

        fn write(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("quota exceeded"))
        }

        fn delete(&self, _key: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("storage unavailable"))
        }
    }

    #[test]
    fn test_get_set_remove() {
        let store = LocalStore::new(MemoryBackend::new());
        assert!(store.get::<Vec<u32>>("numbers").is_none());

        assert!(store.set("numbers", &vec![1u32, 2, 3]));
        assert_eq!(store.get::<Vec<u32>>("numbers"), Some(vec![1, 2, 3]));

        store.remove("numbers");
        assert!(store.get::<Vec<u32>>("numbers").is_none());
    }

    #[test]
    fn test_malformed_entry_reads_as_absent() {
        let backend = MemoryBackend::new();
        backend.write("numbers", "{not json").unwrap();
        let store = LocalStore::new(backend);
        assert!(store.get::<Vec<u32>>("numbers").is_none());
    }

    #[test]
    fn test_wrong_shape_reads_as_absent() {
        let backend = MemoryBackend::new();
        backend.write("numbers", r#"{"old": "format"}"#).unwrap();
        let store = LocalStore::new(backend);
        assert!(store.get::<Vec<u32>>("numbers").is_none());
    }

    #[test]
    fn test_broken_backend_never_errors() {
        let store = LocalStore::new(BrokenBackend);
        assert!(store.get::<String>("anything").is_none());
        assert!(!store.set("anything", "value"));
        store.remove("anything");
    }
}
