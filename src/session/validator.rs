//! Remote confirmation that a stored credential is still honored by the server.

// crates.io
use reqwest::{StatusCode, header::AUTHORIZATION};
// self
use crate::{
	_prelude::*,
	auth::BearerToken,
	config::ClientConfig,
	error::{ConfigError, map_send_error},
	http::extract_message,
};

/// Boxed future returned by [`TokenValidator::validate`].
pub type ValidationFuture<'a> = Pin<Box<dyn Future<Output = Result<Validation>> + 'a + Send>>;

/// Conclusive answer from the validation endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Validation {
	/// The server still honors the credential.
	Valid,
	/// The server no longer honors the credential.
	Revoked,
}

/// Asks the server whether a credential is still honored.
///
/// Errors mean the answer is inconclusive (transport failure, unexpected status, or body).
pub trait TokenValidator
where
	Self: Send + Sync,
{
	/// Validates `token` remotely.
	fn validate<'a>(&'a self, token: &'a BearerToken) -> ValidationFuture<'a>;
}

/// Validator calling `GET <base>/<validation_path>` with the bearer credential.
///
/// The call bypasses the request pipeline so a rejected credential never raises user notices.
/// `200 true` is [`Validation::Valid`]; `200 false`, `401`, and `403` are
/// [`Validation::Revoked`]; anything else is inconclusive.
#[derive(Clone, Debug)]
pub struct HttpTokenValidator {
	http: ReqwestClient,
	url: Url,
}
impl HttpTokenValidator {
	/// Builds a validator with its own client honoring the configured timeout.
	pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
		let http = ReqwestClient::builder()
			.timeout(config.timeout)
			.build()
			.map_err(ConfigError::http_client_build)?;

		Self::with_client(config, http)
	}

	/// Builds a validator around an existing reqwest client.
	pub fn with_client(config: &ClientConfig, http: ReqwestClient) -> Result<Self, ConfigError> {
		Ok(Self { http, url: config.validation_url()? })
	}

	/// Endpoint the validator calls.
	pub fn url(&self) -> &Url {
		&self.url
	}
}
impl TokenValidator for HttpTokenValidator {
	fn validate<'a>(&'a self, token: &'a BearerToken) -> ValidationFuture<'a> {
		Box::pin(async move {
			let response = self
				.http
				.get(self.url.clone())
				.header(AUTHORIZATION, token.header_value()?)
				.send()
				.await
				.map_err(map_send_error)?;
			let status = response.status();

			if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
				return Ok(Validation::Revoked);
			}
			if !status.is_success() {
				let body = response.text().await.unwrap_or_default();

				return Err(Error::Rejected {
					status: status.as_u16(),
					message: extract_message(&body),
				});
			}

			let bytes = response.bytes().await.map_err(map_send_error)?;
			let mut deserializer = serde_json::Deserializer::from_slice(&bytes);
			let valid: bool = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
				Error::Unexpected { message: format!("validation reply is not a boolean: {e}") }
			})?;

			Ok(if valid { Validation::Valid } else { Validation::Revoked })
		})
	}
}
