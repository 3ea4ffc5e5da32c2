use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Cached display metadata for one dapp origin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DappMetadata {
    pub origin_url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Read-only lookup keyed by origin. Cache-or-fetch semantics belong to the
/// implementor; a miss is non-fatal and leaves the display fields empty.
#[async_trait]
pub trait DappMetadataStore: Send + Sync {
    async fn lookup(&self, origin_url: &str) -> Option<DappMetadata>;
}

/// Plain in-memory cache for tests and hosts that prefill at startup.
#[derive(Default)]
pub struct InMemoryMetadataStore {
    entries: RwLock<HashMap<String, DappMetadata>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, metadata: DappMetadata) {
        self.entries
            .write()
            .insert(metadata.origin_url.clone(), metadata);
    }
}

#[async_trait]
impl DappMetadataStore for InMemoryMetadataStore {
    async fn lookup(&self, origin_url: &str) -> Option<DappMetadata> {
        self.entries.read().get(origin_url).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn miss_is_none() {
        let store = InMemoryMetadataStore::new();
        assert!(store.lookup("https://dapp.example").await.is_none());
    }

    #[tokio::test]
    async fn hit_returns_the_entry() {
        let store = InMemoryMetadataStore::new();
        store.insert(DappMetadata {
            origin_url: "https://dapp.example".to_string(),
            name: Some("Example Swap".to_string()),
            logo_url: None,
        });
        let found = store.lookup("https://dapp.example").await.unwrap();
        assert_eq!(found.name.as_deref(), Some("Example Swap"));
    }
}
