//! Content-addressed storage for sealed survey documents.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use survey_settlement::ports::outbound::{DocumentStore, StoreError};
use survey_types::ContentHash;

#[derive(Default)]
pub struct MemoryDocumentStore {
    blobs: Mutex<HashMap<ContentHash, Vec<u8>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn open(&self, hash: ContentHash) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .lock()
            .unwrap()
            .get(&hash)
            .cloned()
            .ok_or_else(|| StoreError(format!("no document stored under {hash}")))
    }

    async fn import(&self, bytes: Vec<u8>) -> Result<ContentHash, StoreError> {
        let hash = ContentHash::of(&bytes);
        self.blobs.lock().unwrap().insert(hash, bytes);
        Ok(hash)
    }
}
