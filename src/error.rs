//! Crate-level error types shared by the session store, storage backends, and request pipeline.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Secure-storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Credential could not be decoded or does not match the claims schema.
	#[error(transparent)]
	Credential(#[from] crate::auth::CredentialError),
	/// Transport failure; no response was received.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Remote service answered with HTTP 401.
	#[error("Session is no longer authorized.")]
	Unauthorized,
	/// Remote service rejected the call with a non-success status other than 401.
	#[error("Request was rejected with status {status}{}.", message_suffix(.message))]
	Rejected {
		/// HTTP status code returned by the server.
		status: u16,
		/// Server-supplied message, when the body carried one.
		message: Option<String>,
	},
	/// Anything else, e.g. a response body that does not match the expected shape.
	#[error("Unexpected failure: {message}.")]
	Unexpected {
		/// Human-readable description of the failure.
		message: String,
	},
}
impl Error {
	/// Returns the HTTP status attached to the error, if the server produced one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Unauthorized => Some(401),
			Self::Rejected { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` when no response was received at all.
	pub fn is_no_response(&self) -> bool {
		matches!(self, Self::Transport(_))
	}
}

fn message_suffix(message: &Option<String>) -> String {
	message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL or endpoint path cannot be parsed.
	#[error("API URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses plain HTTP against a non-loopback host.
	#[error("The API base URL must use HTTPS: {url}.")]
	InsecureBaseUrl {
		/// URL that failed validation.
		url: String,
	},
	/// Base URL cannot carry paths (e.g. `mailto:` or `data:` URLs).
	#[error("The API base URL cannot be used as a base: {url}.")]
	CannotBeBase {
		/// URL that failed validation.
		url: String,
	},
	/// Required environment variable is not set.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// Environment variable is set but unusable.
	#[error("Environment variable `{name}` is invalid: {reason}.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Why the value was rejected.
		reason: String,
	},
	/// A timeout was configured as zero.
	#[error("The {which} timeout must be greater than zero.")]
	ZeroTimeout {
		/// Which timeout failed validation.
		which: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<url::ParseError> for ConfigError {
	fn from(source: url::ParseError) -> Self {
		Self::InvalidUrl { source }
	}
}

/// Transport-level failures where no response was received.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The call exceeded its configured timeout.
	#[error("Request timed out.")]
	Timeout {
		/// Underlying transport failure.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout { source: Box::new(e) } } else { Self::network(e) }
	}
}

/// Maps a failure from `reqwest::Client::execute` into the crate taxonomy.
///
/// Builder failures are local bugs rather than connectivity problems, so they stay out of the
/// transport bucket.
pub(crate) fn map_send_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::http_client_build(err).into();
	}

	TransportError::from(err).into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_with_source() {
		let store_error = StoreError::Backend { message: "keychain locked".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("keychain locked"));

		let source =
			StdError::source(&error).expect("Storage errors should expose the store error.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn rejected_display_includes_server_message() {
		let with_message = Error::Rejected { status: 409, message: Some("DNI already used".into()) };
		let without_message = Error::Rejected { status: 500, message: None };

		assert_eq!(
			with_message.to_string(),
			"Request was rejected with status 409: DNI already used."
		);
		assert_eq!(without_message.to_string(), "Request was rejected with status 500.");
		assert_eq!(with_message.status(), Some(409));
		assert_eq!(Error::Unauthorized.status(), Some(401));
	}

	#[test]
	fn transport_errors_report_no_response() {
		let error: Error = TransportError::network(std::io::Error::other("reset")).into();

		assert!(error.is_no_response());
		assert!(!Error::Unauthorized.is_no_response());
	}
}
