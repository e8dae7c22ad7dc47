//! Secure key-value storage contract and built-in backends.
//!
//! The session only ever persists one entry, [`TOKEN_KEY`], holding the raw bearer string.
//! Identity is always re-derived from the token and never stored separately.

pub mod file;
pub mod guarded;
#[cfg(feature = "keyring")] pub mod keychain;
pub mod memory;

pub use file::FileStore;
pub use guarded::GuardedStore;
#[cfg(feature = "keyring")] pub use keychain::KeyringStore;
pub use memory::MemoryStore;

// self
use crate::_prelude::*;

/// Storage key under which the bearer credential is persisted.
pub const TOKEN_KEY: &str = "token";

/// Boxed future returned by [`SecureStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// On-device secure storage backend.
pub trait SecureStore
where
	Self: Send + Sync,
{
	/// Reads the value stored under `key`, if any.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

	/// Persists or replaces the value stored under `key`.
	fn set<'a>(&'a self, key: &'a str, value: &'a str) -> StoreFuture<'a, ()>;

	/// Removes the value stored under `key`. Removing an absent key succeeds.
	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`SecureStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Persisted data could not be (de)serialized.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// Secure storage is not available on this platform or session.
	#[error("Secure storage is unavailable: {message}.")]
	Unavailable {
		/// Human-readable error payload.
		message: String,
	},
}
