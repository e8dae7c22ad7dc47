//! Account calls layered on the session and the authorizing client.

// crates.io
use reqwest::Method;
// self
use crate::{
	_prelude::*,
	auth::CredentialError,
	config::ENV_ADMIN_ROLE_ID,
	error::ConfigError,
	http::ApiClient,
	obs::{self, OpOutcome, SessionOp, SessionSpan},
	session::{Session, SessionState},
};

/// Path of the credential issuance endpoint.
pub const SIGN_IN_PATH: &str = "auth/login";
/// Path answering whether the current user is staff.
pub const IS_STAFF_PATH: &str = "api/user-roles/is-staff";
/// Path returning the current user's profile.
pub const CURRENT_USER_PATH: &str = "api/user/current";
/// Path of the user search endpoint.
pub const USER_SEARCH_PATH: &str = "api/user/search";

/// Credentials posted to the issuance endpoint.
#[derive(Clone, Serialize)]
pub struct SignInRequest<'a> {
	/// Account email.
	pub email: &'a str,
	/// Account password.
	pub password: &'a str,
}
impl Debug for SignInRequest<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignInRequest")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Reply of the issuance endpoint.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
	/// Raw bearer credential.
	pub access_token: String,
	/// Token scheme; only `Bearer` is accepted.
	pub token_type: String,
}
impl AccessGrant {
	/// Ensures the grant carries a bearer credential.
	pub fn ensure_bearer(&self) -> Result<(), CredentialError> {
		if self.token_type.eq_ignore_ascii_case("bearer") {
			Ok(())
		} else {
			Err(CredentialError::UnsupportedTokenType { token_type: self.token_type.clone() })
		}
	}
}
impl Debug for AccessGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessGrant")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.finish()
	}
}

/// User identifier; the API emits numbers for some deployments and strings for others.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
	/// Numeric identifier.
	Number(i64),
	/// Opaque identifier.
	Text(String),
}
impl Display for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Number(id) => write!(f, "{id}"),
			Self::Text(id) => f.write_str(id),
		}
	}
}

/// Minimal user profile returned by the user endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
	/// User identifier.
	pub id: UserId,
	/// Account email, when the endpoint includes it.
	#[serde(default)]
	pub email: Option<String>,
	/// Display name, when the endpoint includes it.
	#[serde(default)]
	pub name: Option<String>,
}

/// Role and profile of the signed-in user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountProfile {
	/// Whether the user is staff.
	pub is_staff: bool,
	/// Profile of the user.
	pub user: UserSummary,
}

/// Exchanges email and password for a credential and logs the session in with it.
///
/// Server-side rejections surface as the client's usual errors (and notices). A grant that is
/// not a bearer credential is reported as [`CredentialError::UnsupportedTokenType`] without
/// touching storage.
pub async fn sign_in(
	api: &ApiClient,
	session: &Session,
	email: &str,
	password: &str,
) -> Result<SessionState> {
	const OP: SessionOp = SessionOp::SignIn;

	let span = SessionSpan::new(OP, "sign_in");

	obs::record_session_outcome(OP, OpOutcome::Attempt);

	let result = span
		.instrument(async move {
			let grant: AccessGrant =
				api.post_json(SIGN_IN_PATH, &SignInRequest { email, password }).await?;

			grant.ensure_bearer()?;

			session.login(grant.access_token).await
		})
		.await;

	match &result {
		Ok(state) if state.is_authenticated() =>
			obs::record_session_outcome(OP, OpOutcome::Authenticated),
		Ok(_) => obs::record_session_outcome(OP, OpOutcome::Unauthenticated),
		Err(_) => obs::record_session_outcome(OP, OpOutcome::Failure),
	}

	result
}

impl ApiClient {
	/// Asks whether the signed-in user is staff.
	pub async fn is_staff(&self) -> Result<bool> {
		self.get_json(IS_STAFF_PATH).await
	}

	/// Fetches the signed-in user's profile.
	pub async fn current_user(&self) -> Result<UserSummary> {
		self.get_json(CURRENT_USER_PATH).await
	}

	/// Fetches role and profile together.
	pub async fn profile(&self) -> Result<AccountProfile> {
		let is_staff = self.is_staff().await?;
		let user = self.current_user().await?;

		Ok(AccountProfile { is_staff, user })
	}

	/// Lists users holding the configured administrator role.
	pub async fn staff_members(&self) -> Result<Vec<UserSummary>> {
		let role = self
			.config()
			.admin_role_id
			.as_deref()
			.ok_or(ConfigError::MissingEnv { name: ENV_ADMIN_ROLE_ID })?;
		let builder = self
			.request(Method::GET, USER_SEARCH_PATH)?
			.query(&[("query", "by-role"), ("roleId", role)]);

		self.send_json(builder).await
	}
}
