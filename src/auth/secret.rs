//! Bearer token wrapper that redacts sensitive material.

// crates.io
use reqwest::header::HeaderValue;
// self
use crate::{_prelude::*, auth::CredentialError};

/// Opaque bearer credential; formatters never print the value.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);
impl BearerToken {
	/// Wraps a raw token after checking it can travel in an `Authorization` header.
	pub fn new(value: impl Into<String>) -> Result<Self, CredentialError> {
		let value = value.into();

		if value.is_empty() {
			return Err(CredentialError::Empty);
		}
		if !value.bytes().all(|b| b.is_ascii_graphic()) {
			return Err(CredentialError::NotHeaderSafe);
		}

		Ok(Self(value))
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Builds the `Bearer <token>` header value, flagged as sensitive.
	pub fn header_value(&self) -> Result<HeaderValue, CredentialError> {
		let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0))
			.map_err(|_| CredentialError::NotHeaderSafe)?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl AsRef<str> for BearerToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("BearerToken").field(&"<redacted>").finish()
	}
}
impl Display for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
