//! Claims schema embedded in issued credentials and the decoder that enforces it.
//!
//! Credentials are compact JWTs (`header.payload.signature`). The client never verifies the
//! signature; it only needs the subject and timestamps, and liveness is confirmed remotely.

// crates.io
use base64::{
	Engine,
	alphabet,
	engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
// self
use crate::_prelude::*;

// Issuers disagree on whether segments keep their `=` padding.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
	&alphabet::URL_SAFE,
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors raised while turning a raw credential into validated claims.
#[derive(Debug, ThisError)]
pub enum CredentialError {
	/// No credential value was supplied.
	#[error("Credential is empty.")]
	Empty,
	/// Credential contains characters that cannot travel in an HTTP header.
	#[error("Credential contains characters that are not valid in an HTTP header.")]
	NotHeaderSafe,
	/// Credential is not a three-segment compact token.
	#[error("Credential has {segments} segment(s); expected 3.")]
	Segments {
		/// Number of dot-separated segments found.
		segments: usize,
	},
	/// Payload segment is not valid base64url.
	#[error("Credential payload is not valid base64url.")]
	Encoding(#[from] base64::DecodeError),
	/// Payload does not match the claims schema.
	#[error("Credential claims do not match the expected schema.")]
	Schema(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// Subject claim is blank.
	#[error("Credential subject is empty.")]
	EmptySubject,
	/// A timestamp cannot be represented as a calendar instant.
	#[error("Credential `{claim}` timestamp is out of range.")]
	TimestampOutOfRange {
		/// Claim name (`iat` or `exp`).
		claim: &'static str,
	},
	/// Expiry precedes issuance.
	#[error("Credential expires before it was issued.")]
	ExpiryBeforeIssue,
	/// Issuance endpoint returned a token type other than `Bearer`.
	#[error("Unsupported token type `{token_type}`.")]
	UnsupportedTokenType {
		/// Token type the server reported.
		token_type: String,
	},
}

/// Claims carried by every credential the API issues.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
	/// Subject identifier; the user's email address.
	pub sub: String,
	/// Issued-at instant, UNIX seconds. Some issuers omit it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iat: Option<i64>,
	/// Expiry instant, UNIX seconds.
	pub exp: i64,
}
impl TokenClaims {
	/// Decodes and validates the payload segment of a compact token.
	pub fn decode(raw: &str) -> Result<Self, CredentialError> {
		let segments = raw.split('.').collect::<Vec<_>>();

		if segments.len() != 3 {
			return Err(CredentialError::Segments { segments: segments.len() });
		}

		let payload = SEGMENT_ENGINE.decode(segments[1])?;
		let de = &mut serde_json::Deserializer::from_slice(&payload);
		let claims: Self = serde_path_to_error::deserialize(de)?;

		claims.validate()?;

		Ok(claims)
	}

	/// Issued-at as a calendar instant, when the claim is present.
	pub fn issued_at(&self) -> Result<Option<OffsetDateTime>, CredentialError> {
		self.iat
			.map(|iat| {
				OffsetDateTime::from_unix_timestamp(iat)
					.map_err(|_| CredentialError::TimestampOutOfRange { claim: "iat" })
			})
			.transpose()
	}

	/// Expiry as a calendar instant.
	pub fn expires_at(&self) -> Result<OffsetDateTime, CredentialError> {
		OffsetDateTime::from_unix_timestamp(self.exp)
			.map_err(|_| CredentialError::TimestampOutOfRange { claim: "exp" })
	}

	fn validate(&self) -> Result<(), CredentialError> {
		if self.sub.trim().is_empty() {
			return Err(CredentialError::EmptySubject);
		}

		self.issued_at()?;
		self.expires_at()?;

		if self.iat.is_some_and(|iat| self.exp < iat) {
			return Err(CredentialError::ExpiryBeforeIssue);
		}

		Ok(())
	}
}
