//! The escrowed key table: content hash → encoded decryption key.

use crate::errors::OracleError;
use std::collections::HashMap;
use std::sync::Mutex;
use survey_types::ContentHash;

/// In-memory key/hash table. Registration is idempotent for an identical
/// key and rejected for a conflicting one.
#[derive(Default)]
pub struct KeyVault {
    keys: Mutex<HashMap<ContentHash, String>>,
}

impl KeyVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Escrow `encoded_key` under `content_hash`.
    pub fn register(&self, content_hash: ContentHash, encoded_key: &str) -> Result<(), OracleError> {
        let mut keys = self.keys.lock().unwrap();
        match keys.get(&content_hash) {
            Some(existing) if existing == encoded_key => Ok(()),
            Some(_) => Err(OracleError::ConflictingRegistration(content_hash)),
            None => {
                keys.insert(content_hash, encoded_key.to_string());
                Ok(())
            }
        }
    }

    /// Fetch the key escrowed under `content_hash`.
    pub fn get(&self, content_hash: ContentHash) -> Result<String, OracleError> {
        self.keys
            .lock()
            .unwrap()
            .get(&content_hash)
            .cloned()
            .ok_or(OracleError::KeyNotRegistered(content_hash))
    }
}
