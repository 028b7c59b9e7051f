//! Persistence port for the swap wizard.
//!
//! The wizard mirrors its whole state into a single snapshot after every
//! mutation. This crate provides the key-value abstraction that keeps the
//! state machine free of any storage mechanism, plus file-based and
//! in-memory backends.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::warn;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

pub use implementations::file::FileStore;
pub use implementations::memory::MemoryStore;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// The requested key does not exist.
	#[error("Not found")]
	NotFound,
	/// Serialization or deserialization failed.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// The backend itself failed.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Low-level key-value interface implemented by storage backends.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key, replacing any previous value.
	async fn put_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key. Deleting a missing
	/// key is not an error.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks whether a key exists.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}

/// Typed snapshot facade over a [`KeyValueStore`].
///
/// Values are serialized to JSON. Loading is deliberately forgiving: any
/// missing or malformed snapshot yields `None` so the caller falls back to
/// defaults, which is the wizard's documented recovery behavior.
pub struct SnapshotStore {
	backend: Box<dyn KeyValueStore>,
}

impl SnapshotStore {
	pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
		Self { backend }
	}

	fn key(namespace: &str, id: &str) -> String {
		format!("{}:{}", namespace, id)
	}

	/// Persists a serializable value.
	pub async fn save<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		value: &T,
	) -> Result<(), StorageError> {
		let key = Self::key(namespace, id);
		let bytes =
			serde_json::to_vec(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.put_bytes(&key, bytes).await
	}

	/// Loads a previously saved value, or `None` when the snapshot is
	/// absent or unreadable. Parse failures are logged, never propagated.
	pub async fn load<T: DeserializeOwned>(&self, namespace: &str, id: &str) -> Option<T> {
		let key = Self::key(namespace, id);
		let bytes = match self.backend.get_bytes(&key).await {
			Ok(bytes) => bytes,
			Err(StorageError::NotFound) => return None,
			Err(e) => {
				warn!("Failed to read snapshot {}: {}", key, e);
				return None;
			}
		};

		match serde_json::from_slice(&bytes) {
			Ok(value) => Some(value),
			Err(e) => {
				warn!("Discarding malformed snapshot {}: {}", key, e);
				None
			}
		}
	}

	/// Removes a saved value.
	pub async fn clear(&self, namespace: &str, id: &str) -> Result<(), StorageError> {
		self.backend.delete(&Self::key(namespace, id)).await
	}

	/// Whether a value exists under the given key.
	pub async fn contains(&self, namespace: &str, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(&Self::key(namespace, id)).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde::Deserialize;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Snapshot {
		step: u8,
		amount: String,
	}

	#[tokio::test]
	async fn save_load_round_trip() {
		let store = SnapshotStore::new(Box::new(MemoryStore::new()));
		let snapshot = Snapshot {
			step: 3,
			amount: "100".to_string(),
		};

		store.save("wizard", "snapshot", &snapshot).await.unwrap();
		let loaded: Option<Snapshot> = store.load("wizard", "snapshot").await;
		assert_eq!(loaded, Some(snapshot));
	}

	#[tokio::test]
	async fn missing_snapshot_loads_as_none() {
		let store = SnapshotStore::new(Box::new(MemoryStore::new()));
		let loaded: Option<Snapshot> = store.load("wizard", "snapshot").await;
		assert!(loaded.is_none());
	}

	#[tokio::test]
	async fn malformed_snapshot_falls_back_to_none() {
		let backend = MemoryStore::new();
		backend
			.put_bytes("wizard:snapshot", b"{not json".to_vec())
			.await
			.unwrap();

		let store = SnapshotStore::new(Box::new(backend));
		let loaded: Option<Snapshot> = store.load("wizard", "snapshot").await;
		assert!(loaded.is_none());
	}

	#[tokio::test]
	async fn clear_removes_the_value() {
		let store = SnapshotStore::new(Box::new(MemoryStore::new()));
		store
			.save(
				"wizard",
				"snapshot",
				&Snapshot {
					step: 1,
					amount: "1".to_string(),
				},
			)
			.await
			.unwrap();

		store.clear("wizard", "snapshot").await.unwrap();
		assert!(!store.contains("wizard", "snapshot").await.unwrap());
		// Clearing again is a no-op.
		store.clear("wizard", "snapshot").await.unwrap();
	}
}
