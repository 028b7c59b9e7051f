//! In-memory storage backend.
//!
//! A HashMap behind an RwLock. Used in tests and for runs where
//! persistence across restarts is not wanted.

use crate::{KeyValueStore, StorageError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Memory-backed [`KeyValueStore`]. Contents die with the process.
#[derive(Default)]
pub struct MemoryStore {
	entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl KeyValueStore for MemoryStore {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let entries = self
			.entries
			.read()
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		entries.get(key).cloned().ok_or(StorageError::NotFound)
	}

	async fn put_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let mut entries = self
			.entries
			.write()
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		entries.insert(key.to_string(), value);
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let mut entries = self
			.entries
			.write()
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		entries.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let entries = self
			.entries
			.read()
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		Ok(entries.contains_key(key))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn basic_operations() {
		let store = MemoryStore::new();

		assert!(matches!(
			store.get_bytes("missing").await,
			Err(StorageError::NotFound)
		));

		store.put_bytes("k", vec![1, 2, 3]).await.unwrap();
		assert!(store.exists("k").await.unwrap());
		assert_eq!(store.get_bytes("k").await.unwrap(), vec![1, 2, 3]);

		store.delete("k").await.unwrap();
		assert!(!store.exists("k").await.unwrap());
	}
}
