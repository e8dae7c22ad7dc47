//! Fixtures shared by integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use httpmock::prelude::*;
use time::OffsetDateTime;
// self
use repairdesk_auth::{
	config::ClientConfig,
	http::{ApiClient, RecordingNotifier},
	session::{HttpTokenValidator, Session},
	store::{MemoryStore, SecureStore, StoreError, StoreFuture, TOKEN_KEY},
};

pub const EMAIL: &str = "tech@example.com";

pub fn now_secs() -> i64 {
	OffsetDateTime::now_utc().unix_timestamp()
}

/// Unsigned compact JWT carrying `sub`, `iat`, and `exp`.
pub fn mint_token(sub: &str, iat: i64, exp: i64) -> String {
	mint_token_with_payload(&serde_json::json!({ "sub": sub, "iat": iat, "exp": exp }))
}

/// Unsigned compact JWT around an arbitrary JSON payload.
pub fn mint_token_with_payload(payload: &serde_json::Value) -> String {
	let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
	let body = URL_SAFE_NO_PAD.encode(payload.to_string());

	format!("{header}.{body}.c2lnbmF0dXJl")
}

pub fn fresh_token() -> String {
	mint_token(EMAIL, now_secs() - 60, now_secs() + 3_600)
}

pub fn stale_token() -> String {
	mint_token(EMAIL, now_secs() - 7_200, now_secs() - 1)
}

pub fn config_for(server: &MockServer) -> ClientConfig {
	ClientConfig::builder(server.base_url())
		.admin_role_id("1")
		.build()
		.expect("Mock server config should build.")
}

pub async fn seeded_store(raw: &str) -> MemoryStore {
	let store = MemoryStore::default();

	store.set(TOKEN_KEY, raw).await.expect("Seeding the store should succeed.");

	store
}

/// Session + client wired the way an application wires them.
pub struct Harness {
	pub store: MemoryStore,
	pub session: Arc<Session>,
	pub api: ApiClient,
	pub notifier: RecordingNotifier,
}
impl Harness {
	pub fn new(server: &MockServer, store: MemoryStore) -> Self {
		let config = config_for(server);
		let validator =
			HttpTokenValidator::new(&config).expect("Validator should build for the mock server.");
		let session = Arc::new(Session::new(Arc::new(store.clone()), Arc::new(validator)));
		let notifier = RecordingNotifier::default();
		let api = ApiClient::for_session(config, &session, Arc::new(notifier.clone()))
			.expect("Client should build for the mock server.");

		Self { store, session, api, notifier }
	}
}

/// Store whose writes and deletes always fail.
pub struct LockedStore {
	pub token: Option<String>,
}
impl SecureStore for LockedStore {
	fn get<'a>(&'a self, _key: &'a str) -> StoreFuture<'a, Option<String>> {
		let token = self.token.clone();

		Box::pin(async move { Ok(token) })
	}

	fn set<'a>(&'a self, _key: &'a str, _value: &'a str) -> StoreFuture<'a, ()> {
		Box::pin(async { Err(StoreError::Unavailable { message: "keychain locked".into() }) })
	}

	fn delete<'a>(&'a self, _key: &'a str) -> StoreFuture<'a, ()> {
		Box::pin(async { Err(StoreError::Unavailable { message: "keychain locked".into() }) })
	}
}
