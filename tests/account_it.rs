mod common;

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use common::*;
use repairdesk_auth::{
	account::{self, UserId},
	auth::CredentialError,
	error::Error,
	store::{MemoryStore, TOKEN_KEY},
};

#[tokio::test]
async fn sign_in_stores_grant_and_authenticates() -> Result<()> {
	let server = MockServer::start_async().await;
	let raw = fresh_token();
	let login = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/auth/login")
				.header_missing("authorization")
				.json_body(serde_json::json!({ "email": EMAIL, "password": "hunter2" }));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(serde_json::json!({ "accessToken": raw, "tokenType": "Bearer" }));
		})
		.await;
	let validate = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/auth/validate-token")
				.header("authorization", format!("Bearer {raw}"));
			then.status(200).body("true");
		})
		.await;
	let harness = Harness::new(&server, MemoryStore::default());
	let state = account::sign_in(&harness.api, &harness.session, EMAIL, "hunter2").await?;

	assert!(state.is_authenticated());
	assert!(harness.store.contains(TOKEN_KEY));

	login.assert_async().await;
	validate.assert_async().await;

	Ok(())
}

#[tokio::test]
async fn sign_in_refuses_non_bearer_grants() -> Result<()> {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/login");
			then.status(200)
				.json_body(serde_json::json!({ "accessToken": fresh_token(), "tokenType": "MAC" }));
		})
		.await;

	let harness = Harness::new(&server, MemoryStore::default());
	let err = account::sign_in(&harness.api, &harness.session, EMAIL, "hunter2")
		.await
		.expect_err("MAC grants should be refused.");

	assert!(matches!(err, Error::Credential(CredentialError::UnsupportedTokenType { .. })));
	assert!(harness.store.is_empty());

	Ok(())
}

#[tokio::test]
async fn sign_in_with_bad_password_reports_server_message() -> Result<()> {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/login");
			then.status(400).json_body(serde_json::json!({ "message": "Invalid credentials" }));
		})
		.await;

	let harness = Harness::new(&server, MemoryStore::default());
	let err = account::sign_in(&harness.api, &harness.session, EMAIL, "wrong")
		.await
		.expect_err("Rejected sign-in should fail.");

	assert!(matches!(
		err,
		Error::Rejected { status: 400, message: Some(ref message) } if message == "Invalid credentials"
	));
	assert!(!harness.session.is_authenticated());

	Ok(())
}

#[tokio::test]
async fn profile_and_staff_lookups_use_stored_bearer() -> Result<()> {
	let server = MockServer::start_async().await;
	let raw = fresh_token();
	let bearer = format!("Bearer {raw}");
	let staff = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user-roles/is-staff").header("authorization", &bearer);
			then.status(200).body("true");
		})
		.await;
	let current = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user/current").header("authorization", &bearer);
			then.status(200).json_body(serde_json::json!({ "id": 12, "email": EMAIL }));
		})
		.await;
	let search = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/user/search")
				.query_param("query", "by-role")
				.query_param("roleId", "1")
				.header("authorization", &bearer);
			then.status(200)
				.json_body(serde_json::json!([{ "id": 3, "name": "Ana" }, { "id": 4, "name": "Luis" }]));
		})
		.await;
	let harness = Harness::new(&server, seeded_store(&raw).await);
	let profile = harness.api.profile().await?;
	let members = harness.api.staff_members().await?;

	assert!(profile.is_staff);
	assert_eq!(profile.user.id, UserId::Number(12));
	assert_eq!(profile.user.email.as_deref(), Some(EMAIL));
	assert_eq!(
		members.iter().filter_map(|member| member.name.as_deref()).collect::<Vec<_>>(),
		["Ana", "Luis"]
	);

	staff.assert_async().await;
	current.assert_async().await;
	search.assert_async().await;

	Ok(())
}
