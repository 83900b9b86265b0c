//! In-memory stand-ins for the outbound capabilities, shared by unit and
//! integration tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::adapters::key_generator::{KeyGenerationError, KeyGenerator};
use crate::adapters::object_store::{ObjectStore, StoreError};

/// Keeps every written object in memory.
#[derive(Debug, Default)]
pub struct RecordingStore {
    writes: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.writes
            .lock()
            .expect("poisoned mutex")
            .keys()
            .cloned()
            .collect()
    }

    pub fn body(&self, key: &str) -> Option<Vec<u8>> {
        self.writes
            .lock()
            .expect("poisoned mutex")
            .get(key)
            .cloned()
    }
}

impl ObjectStore for RecordingStore {
    fn put_object(&self, key: &str, body: &[u8]) -> Result<(), StoreError> {
        self.writes
            .lock()
            .expect("poisoned mutex")
            .insert(key.to_string(), body.to_vec());
        Ok(())
    }
}

/// Rejects every write with the same error and counts attempts.
#[derive(Debug)]
pub struct FailingStore {
    error: StoreError,
    attempts: Mutex<usize>,
}

impl FailingStore {
    pub fn new(error: StoreError) -> Self {
        Self {
            error,
            attempts: Mutex::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().expect("poisoned mutex")
    }
}

impl ObjectStore for FailingStore {
    fn put_object(&self, _key: &str, _body: &[u8]) -> Result<(), StoreError> {
        *self.attempts.lock().expect("poisoned mutex") += 1;
        Err(self.error.clone())
    }
}

#[derive(Debug, Clone)]
pub struct FixedKeyGenerator {
    id: String,
}

impl FixedKeyGenerator {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl KeyGenerator for FixedKeyGenerator {
    fn generate(&self) -> Result<String, KeyGenerationError> {
        Ok(self.id.clone())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FailingKeyGenerator;

impl KeyGenerator for FailingKeyGenerator {
    fn generate(&self) -> Result<String, KeyGenerationError> {
        Err(KeyGenerationError::new("entropy source unavailable"))
    }
}
