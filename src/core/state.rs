//! State Management
//!
//! Request state store contract and generation of `state`/`nonce` values.

use base64::Engine;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Mutex;

/// Number of random bytes in a generated `state` or `nonce`.
pub const RANDOM_TOKEN_BYTES: usize = 32;

/// Key/value store holding the serialized request state.
///
/// Backing implementations (cookies, browser storage, server-side session)
/// are responsible for making each call atomic.
pub trait RequestStateStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String);

    /// Delete the value stored under `key`.
    fn remove(&self, key: &str);
}

/// In-memory request state store.
#[derive(Default)]
pub struct InMemoryRequestStateStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryRequestStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestStateStore for InMemoryRequestStateStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// Store operation recorded by [`MockRequestStateStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreOperation {
    Get(String),
    Set(String, String),
    Remove(String),
}

/// Mock request state store for testing.
#[derive(Default)]
pub struct MockRequestStateStore {
    entries: Mutex<HashMap<String, String>>,
    history: Mutex<Vec<StoreOperation>>,
}

impl MockRequestStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a value.
    pub fn insert(&self, key: &str, value: &str) -> &Self {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Peek at a value without recording the access.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Get operation history.
    pub fn get_history(&self) -> Vec<StoreOperation> {
        self.history.lock().unwrap().clone()
    }
}

impl RequestStateStore for MockRequestStateStore {
    fn get(&self, key: &str) -> Option<String> {
        self.history
            .lock()
            .unwrap()
            .push(StoreOperation::Get(key.to_string()));
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.history
            .lock()
            .unwrap()
            .push(StoreOperation::Set(key.to_string(), value.clone()));
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.history
            .lock()
            .unwrap()
            .push(StoreOperation::Remove(key.to_string()));
        self.entries.lock().unwrap().remove(key);
    }
}

/// Generate an unguessable single-use token from the thread-local CSPRNG.
pub fn generate_random_token() -> String {
    let mut bytes = [0u8; RANDOM_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
