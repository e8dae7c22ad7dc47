//! Decoded credentials, their freshness, and the identity they carry.

// self
use crate::{
	_prelude::*,
	auth::{BearerToken, CredentialError, TokenClaims},
};

/// Freshness of a credential at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialStatus {
	/// Expiry lies strictly in the future.
	Active,
	/// Expiry has been reached.
	Expired,
}

/// Non-secret view of an authenticated user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	/// Subject identifier decoded from the credential.
	pub email: String,
	/// Issued-at instant decoded from the credential, when it carries one.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub issued_at: Option<OffsetDateTime>,
	/// Expiry instant decoded from the credential.
	#[serde(with = "time::serde::rfc3339")]
	pub expires_at: OffsetDateTime,
}

/// Bearer token paired with the claims decoded from it.
#[derive(Clone)]
pub struct Credential {
	/// Raw bearer token; callers must avoid logging it.
	pub token: BearerToken,
	/// Validated claims.
	pub claims: TokenClaims,
	issued_at: Option<OffsetDateTime>,
	expires_at: OffsetDateTime,
}
impl Credential {
	/// Decodes a raw bearer string, enforcing the claims schema.
	pub fn decode(raw: impl Into<String>) -> Result<Self, CredentialError> {
		let token = BearerToken::new(raw)?;
		let claims = TokenClaims::decode(token.expose())?;
		let issued_at = claims.issued_at()?;
		let expires_at = claims.expires_at()?;

		Ok(Self { token, claims, issued_at, expires_at })
	}

	/// Computes freshness at the provided instant. Expiry equal to `instant` counts as expired.
	pub fn status_at(&self, instant: OffsetDateTime) -> CredentialStatus {
		if self.expires_at > instant { CredentialStatus::Active } else { CredentialStatus::Expired }
	}

	/// Convenience helper that checks freshness against the current UTC clock.
	pub fn status(&self) -> CredentialStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the credential has expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		matches!(self.status(), CredentialStatus::Expired)
	}

	/// Issued-at instant, if the credential carries one.
	pub fn issued_at(&self) -> Option<OffsetDateTime> {
		self.issued_at
	}

	/// Expiry instant.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.expires_at
	}

	/// Identity carried by the credential.
	pub fn identity(&self) -> Identity {
		Identity {
			email: self.claims.sub.clone(),
			issued_at: self.issued_at,
			expires_at: self.expires_at,
		}
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("token", &"<redacted>")
			.field("sub", &self.claims.sub)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
