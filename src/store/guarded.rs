//! [`SecureStore`] wrapper that keeps a failed delete from resurrecting the entry.
//!
//! When the backend refuses to delete a key, the key is masked: reads answer `None` until a later
//! `set` or `delete` of that key succeeds. The session and the request stages share one wrapper,
//! so a logout or a 401 ends the session for every reader even while the backend still holds
//! the value.

// std
use std::collections::HashSet;
// self
use crate::{
	_prelude::*,
	store::{SecureStore, StoreFuture},
};

/// Storage handle shared by the session and the request pipeline.
pub struct GuardedStore {
	inner: Arc<dyn SecureStore>,
	masked: Mutex<HashSet<String>>,
}
impl GuardedStore {
	/// Wraps `inner`.
	pub fn new(inner: Arc<dyn SecureStore>) -> Self {
		Self { inner, masked: Mutex::new(HashSet::new()) }
	}

	/// Returns `true` while `key` is hidden after a failed delete.
	pub fn is_masked(&self, key: &str) -> bool {
		self.masked.lock().contains(key)
	}

	/// Backend this handle wraps.
	pub fn inner(&self) -> &Arc<dyn SecureStore> {
		&self.inner
	}
}
impl SecureStore for GuardedStore {
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		Box::pin(async move {
			if self.is_masked(key) {
				return Ok(None);
			}

			self.inner.get(key).await
		})
	}

	fn set<'a>(&'a self, key: &'a str, value: &'a str) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.inner.set(key, value).await?;
			self.masked.lock().remove(key);

			Ok(())
		})
	}

	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			match self.inner.delete(key).await {
				Ok(()) => {
					self.masked.lock().remove(key);

					Ok(())
				},
				Err(e) => {
					self.masked.lock().insert(key.to_owned());

					Err(e)
				},
			}
		})
	}
}
impl Debug for GuardedStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GuardedStore").field("masked", &*self.masked.lock()).finish()
	}
}
