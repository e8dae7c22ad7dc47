//! Signs in against a mocked repair-desk API, reads the account profile, and shows how a 401
//! ends the session through the authorizing pipeline.

// std
use std::sync::Arc;
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::Result;
use httpmock::prelude::*;
use time::OffsetDateTime;
// self
use repairdesk_auth::{
	account,
	config::ClientConfig,
	http::{ApiClient, LogNotifier},
	session::{HttpTokenValidator, Session},
	store::MemoryStore,
};

/// Unsigned compact JWT carrying `sub`, `iat`, and `exp`; the mock server never checks signatures.
fn mint_token(sub: &str, iat: i64, exp: i64) -> String {
	let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
	let body = URL_SAFE_NO_PAD
		.encode(serde_json::json!({ "sub": sub, "iat": iat, "exp": exp }).to_string());

	format!("{header}.{body}.c2lnbmF0dXJl")
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let now = OffsetDateTime::now_utc().unix_timestamp();
	let token = mint_token("tech@example.com", now, now + 900);
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/login");
			then.status(200)
				.json_body(serde_json::json!({ "accessToken": token, "tokenType": "Bearer" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/validate-token");
			then.status(200).body("true");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user-roles/is-staff");
			then.status(200).body("true");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user/current");
			then.status(200).json_body(serde_json::json!({ "id": 1, "name": "Demo Tech" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/work-orders");
			then.status(401);
		})
		.await;

	let config = ClientConfig::builder(server.base_url()).build()?;
	let validator = HttpTokenValidator::new(&config)?;
	let session = Arc::new(Session::new(Arc::new(MemoryStore::default()), Arc::new(validator)));
	let api = ApiClient::for_session(config, &session, Arc::new(LogNotifier))?;
	let state = account::sign_in(&api, &session, "tech@example.com", "demo-password").await?;

	println!("Signed in: {}.", state.is_authenticated());

	let profile = api.profile().await?;

	println!("User {} is staff: {}.", profile.user.id, profile.is_staff);

	let rejected = api.get_json::<serde_json::Value>("api/work-orders").await;

	println!(
		"Work orders rejected: {}; still signed in: {}.",
		rejected.is_err(),
		session.is_authenticated()
	);

	Ok(())
}
