//! API client configuration.
//!
//! The base URL and the role-identifier constant are build/deploy-time settings. They can be
//! supplied programmatically through [`ClientConfig::builder`] or read from the environment with
//! [`ClientConfig::from_env`]:
//!
//! | Variable                   | Meaning                                   |
//! |----------------------------|-------------------------------------------|
//! | `REPAIRDESK_API_URL`       | Base URL of the remote API (required).    |
//! | `REPAIRDESK_ADMIN_ROLE_ID` | Role identifier for administrators.       |
//! | `REPAIRDESK_TIMEOUT_SECS`  | Default request timeout in seconds.       |

// std
use std::{net::IpAddr, time::Duration as StdDuration};
// self
use crate::{_prelude::*, error::ConfigError};

/// Environment variable holding the API base URL.
pub const ENV_API_URL: &str = "REPAIRDESK_API_URL";
/// Environment variable holding the administrator role identifier.
pub const ENV_ADMIN_ROLE_ID: &str = "REPAIRDESK_ADMIN_ROLE_ID";
/// Environment variable overriding the default request timeout.
pub const ENV_TIMEOUT_SECS: &str = "REPAIRDESK_TIMEOUT_SECS";

/// Validated client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Base URL every API path is joined onto. Always ends with `/`.
	pub base_url: Url,
	/// Timeout applied to ordinary JSON calls.
	pub timeout: StdDuration,
	/// Timeout applied to multipart uploads.
	pub upload_timeout: StdDuration,
	/// Path of the credential validation endpoint, relative to the base URL.
	pub validation_path: String,
	/// Role identifier used by administrative lookups, when configured.
	pub admin_role_id: Option<String>,
}
impl ClientConfig {
	/// Default timeout for JSON calls.
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);
	/// Default timeout for multipart uploads.
	pub const DEFAULT_UPLOAD_TIMEOUT: StdDuration = StdDuration::from_secs(60);
	/// Default path of the credential validation endpoint.
	pub const DEFAULT_VALIDATION_PATH: &'static str = "auth/validate-token";

	/// Creates a builder for the provided base URL.
	pub fn builder(base_url: impl AsRef<str>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url.as_ref())
	}

	/// Reads the configuration from process environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads the configuration through an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let base_url = lookup(ENV_API_URL)
			.filter(|value| !value.trim().is_empty())
			.ok_or(ConfigError::MissingEnv { name: ENV_API_URL })?;
		let mut builder = Self::builder(base_url.trim());

		if let Some(role) = lookup(ENV_ADMIN_ROLE_ID).filter(|value| !value.trim().is_empty()) {
			builder = builder.admin_role_id(role.trim());
		}
		if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
			let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidEnv {
				name: ENV_TIMEOUT_SECS,
				reason: e.to_string(),
			})?;

			builder = builder.timeout(StdDuration::from_secs(secs));
		}

		builder.build()
	}

	/// Joins an API path onto the base URL.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		Ok(self.base_url.join(path.trim_start_matches('/'))?)
	}

	/// Absolute URL of the credential validation endpoint.
	pub fn validation_url(&self) -> Result<Url, ConfigError> {
		self.endpoint(&self.validation_path)
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	base_url: String,
	timeout: StdDuration,
	upload_timeout: StdDuration,
	validation_path: String,
	admin_role_id: Option<String>,
}
impl ClientConfigBuilder {
	fn new(base_url: &str) -> Self {
		Self {
			base_url: base_url.to_owned(),
			timeout: ClientConfig::DEFAULT_TIMEOUT,
			upload_timeout: ClientConfig::DEFAULT_UPLOAD_TIMEOUT,
			validation_path: ClientConfig::DEFAULT_VALIDATION_PATH.into(),
			admin_role_id: None,
		}
	}

	/// Overrides the JSON call timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Overrides the multipart upload timeout.
	pub fn upload_timeout(mut self, timeout: StdDuration) -> Self {
		self.upload_timeout = timeout;

		self
	}

	/// Overrides the validation endpoint path.
	pub fn validation_path(mut self, path: impl Into<String>) -> Self {
		self.validation_path = path.into();

		self
	}

	/// Sets the administrator role identifier.
	pub fn admin_role_id(mut self, role: impl Into<String>) -> Self {
		self.admin_role_id = Some(role.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let mut base_url = Url::parse(&self.base_url)?;

		if base_url.cannot_be_a_base() {
			return Err(ConfigError::CannotBeBase { url: base_url.to_string() });
		}
		if base_url.scheme() != "https" && !(base_url.scheme() == "http" && is_loopback(&base_url)) {
			return Err(ConfigError::InsecureBaseUrl { url: base_url.to_string() });
		}
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}
		if self.timeout.is_zero() {
			return Err(ConfigError::ZeroTimeout { which: "request" });
		}
		if self.upload_timeout.is_zero() {
			return Err(ConfigError::ZeroTimeout { which: "upload" });
		}

		let config = ClientConfig {
			base_url,
			timeout: self.timeout,
			upload_timeout: self.upload_timeout,
			validation_path: self.validation_path,
			admin_role_id: self.admin_role_id,
		};

		config.validation_url()?;

		Ok(config)
	}
}

// Plain HTTP is tolerated only for development servers on this machine.
fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(url::Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn lookup_from(pairs: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
		let owned = pairs.to_vec();

		move |name| owned.iter().find(|(key, _)| *key == name).map(|(_, value)| value.to_string())
	}

	#[test]
	fn builder_applies_defaults_and_normalizes_base() {
		let config = ClientConfig::builder("https://api.example.com/v1")
			.build()
			.expect("HTTPS base URL should be accepted.");

		assert_eq!(config.base_url.as_str(), "https://api.example.com/v1/");
		assert_eq!(config.timeout, ClientConfig::DEFAULT_TIMEOUT);
		assert_eq!(config.upload_timeout, ClientConfig::DEFAULT_UPLOAD_TIMEOUT);
		assert_eq!(
			config.validation_url().expect("Validation URL should join.").as_str(),
			"https://api.example.com/v1/auth/validate-token"
		);
		assert_eq!(
			config.endpoint("/api/user/current").expect("Endpoint should join.").as_str(),
			"https://api.example.com/v1/api/user/current"
		);
	}

	#[test]
	fn rejects_plain_http_outside_loopback() {
		let err = ClientConfig::builder("http://172.28.205.8:8080")
			.build()
			.expect_err("Plain HTTP against a LAN host should be rejected.");

		assert!(matches!(err, ConfigError::InsecureBaseUrl { .. }));

		ClientConfig::builder("http://127.0.0.1:8080")
			.build()
			.expect("Loopback development servers may use plain HTTP.");
		ClientConfig::builder("http://localhost:8080")
			.build()
			.expect("Localhost development servers may use plain HTTP.");
	}

	#[test]
	fn rejects_zero_timeouts_and_bad_urls() {
		let err = ClientConfig::builder("https://api.example.com")
			.upload_timeout(StdDuration::ZERO)
			.build()
			.expect_err("Zero upload timeout should be rejected.");

		assert!(matches!(err, ConfigError::ZeroTimeout { which: "upload" }));

		let err = ClientConfig::builder("not a url").build().expect_err("Garbage should fail.");

		assert!(matches!(err, ConfigError::InvalidUrl { .. }));

		let err =
			ClientConfig::builder("mailto:desk@example.com").build().expect_err("mailto fails.");

		assert!(matches!(err, ConfigError::CannotBeBase { .. }));
	}

	#[test]
	fn reads_environment_lookup() {
		let config = ClientConfig::from_lookup(lookup_from(&[
			(ENV_API_URL, " https://api.example.com "),
			(ENV_ADMIN_ROLE_ID, "1"),
			(ENV_TIMEOUT_SECS, "15"),
		]))
		.expect("Complete environment should build a config.");

		assert_eq!(config.base_url.as_str(), "https://api.example.com/");
		assert_eq!(config.admin_role_id.as_deref(), Some("1"));
		assert_eq!(config.timeout, StdDuration::from_secs(15));
	}

	#[test]
	fn environment_errors_name_the_variable() {
		let err = ClientConfig::from_lookup(lookup_from(&[]))
			.expect_err("Missing base URL should be reported.");

		assert!(matches!(err, ConfigError::MissingEnv { name: ENV_API_URL }));

		let err = ClientConfig::from_lookup(lookup_from(&[
			(ENV_API_URL, "https://api.example.com"),
			(ENV_TIMEOUT_SECS, "ten"),
		]))
		.expect_err("Non-numeric timeout should be reported.");

		assert!(matches!(err, ConfigError::InvalidEnv { name: ENV_TIMEOUT_SECS, .. }));
	}
}
