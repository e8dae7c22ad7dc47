//! Thread-safe in-memory [`SecureStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{SecureStore, StoreFuture},
};

type EntryMap = Arc<RwLock<HashMap<String, String>>>;

/// Storage backend that keeps entries in-process; nothing survives a restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(EntryMap);
impl MemoryStore {
	/// Returns `true` if an entry exists for `key`.
	pub fn contains(&self, key: &str) -> bool {
		self.0.read().contains_key(key)
	}

	/// Number of stored entries.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl SecureStore for MemoryStore {
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(key).cloned()) })
	}

	fn set<'a>(&'a self, key: &'a str, value: &'a str) -> StoreFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(key.to_owned(), value.to_owned());

			Ok(())
		})
	}

	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().remove(key);

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::TOKEN_KEY;

	#[tokio::test]
	async fn set_get_delete_cycle() {
		let store = MemoryStore::default();

		assert!(store.get(TOKEN_KEY).await.expect("Read should succeed.").is_none());

		store.set(TOKEN_KEY, "first").await.expect("Write should succeed.");
		store.set(TOKEN_KEY, "second").await.expect("Overwrite should succeed.");

		assert_eq!(
			store.get(TOKEN_KEY).await.expect("Read should succeed.").as_deref(),
			Some("second")
		);
		assert_eq!(store.len(), 1);

		store.delete(TOKEN_KEY).await.expect("Delete should succeed.");
		store.delete(TOKEN_KEY).await.expect("Deleting an absent key should succeed.");

		assert!(!store.contains(TOKEN_KEY));
		assert!(store.is_empty());
	}

	#[tokio::test]
	async fn clones_share_entries() {
		let store = MemoryStore::default();
		let alias = store.clone();

		store.set(TOKEN_KEY, "shared").await.expect("Write should succeed.");

		assert!(alias.contains(TOKEN_KEY));
	}
}
