//! OS keychain [`SecureStore`] backed by the `keyring` crate.
//!
//! Each key becomes one keychain entry under the configured service name. Keychain calls are
//! blocking but short; they run inline like the file backend's I/O.
//!
//! The `keyring` feature enables the macOS Keychain, the Windows Credential Manager, and the
//! freedesktop Secret Service. Other targets only get keyring's in-process mock, which does not
//! keep values between calls.

// crates.io
use keyring::Entry;
// self
use crate::{
	_prelude::*,
	store::{SecureStore, StoreError, StoreFuture},
};

/// Default keychain service name.
pub const DEFAULT_SERVICE: &str = "repairdesk";

/// Keychain-backed storage.
#[derive(Clone, Debug)]
pub struct KeyringStore {
	service: String,
}
impl KeyringStore {
	/// Creates a store that files entries under `service`.
	pub fn new(service: impl Into<String>) -> Self {
		Self { service: service.into() }
	}

	/// Service name entries are filed under.
	pub fn service(&self) -> &str {
		&self.service
	}

	fn entry(&self, key: &str) -> Result<Entry, StoreError> {
		Entry::new(&self.service, key).map_err(map_keyring_error)
	}
}
impl Default for KeyringStore {
	fn default() -> Self {
		Self::new(DEFAULT_SERVICE)
	}
}
impl SecureStore for KeyringStore {
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		Box::pin(async move {
			match self.entry(key)?.get_password() {
				Ok(value) => Ok(Some(value)),
				Err(keyring::Error::NoEntry) => Ok(None),
				Err(e) => Err(map_keyring_error(e)),
			}
		})
	}

	fn set<'a>(&'a self, key: &'a str, value: &'a str) -> StoreFuture<'a, ()> {
		Box::pin(async move { self.entry(key)?.set_password(value).map_err(map_keyring_error) })
	}

	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			match self.entry(key)?.delete_credential() {
				Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
				Err(e) => Err(map_keyring_error(e)),
			}
		})
	}
}

fn map_keyring_error(err: keyring::Error) -> StoreError {
	match err {
		keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) =>
			StoreError::Unavailable { message: err.to_string() },
		keyring::Error::BadEncoding(_) => StoreError::Serialization { message: err.to_string() },
		_ => StoreError::Backend { message: err.to_string() },
	}
}
