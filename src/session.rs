//! Session store: persists the bearer credential and tracks whether the process is signed in.
//!
//! A single [`Session`] is created at process start and shared behind an [`Arc`]. Lifecycle
//! operations ([`restore`](Session::restore), [`login`](Session::login),
//! [`logout`](Session::logout), and the token accessors) are serialized, so a logout can never
//! interleave with a login that is still validating.
//!
//! Storage is the source of truth for the credential; the in-memory [`SessionState`] is derived
//! from it and never persisted.

pub mod state;
pub mod validator;

pub use state::*;
pub use validator::*;

// self
use crate::{
	_prelude::*,
	auth::{BearerToken, Credential, Identity},
	http::RejectionListener,
	obs::{self, OpOutcome, SessionOp, SessionSpan},
	store::{GuardedStore, SecureStore, TOKEN_KEY},
};

/// Process-wide session store.
pub struct Session {
	store: Arc<GuardedStore>,
	validator: Arc<dyn TokenValidator>,
	state: RwLock<SessionState>,
	lifecycle: AsyncMutex<()>,
}
impl Session {
	/// Creates a session in the [`SessionState::Uninitialized`] state.
	pub fn new(store: Arc<dyn SecureStore>, validator: Arc<dyn TokenValidator>) -> Self {
		Self {
			store: Arc::new(GuardedStore::new(store)),
			validator,
			state: RwLock::new(SessionState::Uninitialized),
			lifecycle: AsyncMutex::new(()),
		}
	}

	/// Handle to the credential storage shared with the request stages.
	///
	/// After a logout or 401 whose delete the backend refused, reads through this handle answer
	/// `None` until the next successful login.
	pub fn store(&self) -> Arc<dyn SecureStore> {
		self.store.clone()
	}

	/// Snapshot of the current state.
	pub fn state(&self) -> SessionState {
		self.state.read().clone()
	}

	/// Returns `true` when a confirmed credential is held.
	pub fn is_authenticated(&self) -> bool {
		self.state.read().is_authenticated()
	}

	/// Returns `true` while a lifecycle operation is in flight.
	pub fn is_loading(&self) -> bool {
		self.state.read().is_loading()
	}

	/// Identity of the authenticated user, if any.
	pub fn identity(&self) -> Option<Identity> {
		self.state.read().identity().cloned()
	}

	/// Restores the session from storage at process start.
	///
	/// Never fails: every problem degrades to [`SessionState::Unauthenticated`]. Undecodable or
	/// expired credentials are removed. A credential the server could not confirm either way is
	/// kept for the next attempt.
	pub async fn restore(&self) -> SessionState {
		const OP: SessionOp = SessionOp::Restore;

		let span = SessionSpan::new(OP, "restore");

		obs::record_session_outcome(OP, OpOutcome::Attempt);

		let state = span
			.instrument(async move {
				let _lifecycle = self.lifecycle.lock().await;

				self.transition(OP, SessionState::Loading);

				let raw = match self.store.get(TOKEN_KEY).await {
					Ok(Some(raw)) => raw,
					Ok(None) => return self.transition(OP, SessionState::Unauthenticated),
					Err(e) => {
						obs::swallowed(OP, "read stored token", &e);

						return self.transition(OP, SessionState::Unauthenticated);
					},
				};

				match Credential::decode(raw) {
					Ok(credential) => self.confirm(OP, &credential).await,
					Err(e) => {
						obs::swallowed(OP, "decode stored token", &e);
						self.discard(OP).await;

						self.transition(OP, SessionState::Unauthenticated)
					},
				}
			})
			.await;

		obs::record_session_outcome(OP, outcome_of(&state));

		state
	}

	/// Persists a freshly issued credential and confirms it with the server.
	///
	/// Storage failures and malformed credentials are returned to the caller. An expired,
	/// revoked, or unconfirmed credential yields `Ok(SessionState::Unauthenticated)`.
	pub async fn login(&self, raw: impl Into<String>) -> Result<SessionState> {
		const OP: SessionOp = SessionOp::Login;

		let raw = raw.into();
		let span = SessionSpan::new(OP, "login");

		obs::record_session_outcome(OP, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _lifecycle = self.lifecycle.lock().await;

				self.transition(OP, SessionState::Loading);

				if let Err(e) = self.store.set(TOKEN_KEY, &raw).await {
					self.transition(OP, SessionState::Unauthenticated);

					return Err(Error::from(e));
				}

				let credential = match Credential::decode(raw) {
					Ok(credential) => credential,
					Err(e) => {
						self.discard(OP).await;
						self.transition(OP, SessionState::Unauthenticated);

						return Err(Error::from(e));
					},
				};

				Ok(self.confirm(OP, &credential).await)
			})
			.await;

		match &result {
			Ok(state) => obs::record_session_outcome(OP, outcome_of(state)),
			Err(_) => obs::record_session_outcome(OP, OpOutcome::Failure),
		}

		result
	}

	/// Removes the stored credential. Idempotent; storage failures are logged, not returned.
	///
	/// The session ends even when the backend refuses the delete: the entry stays hidden from
	/// [`token`](Self::token) and from requests until the next successful login.
	pub async fn logout(&self) {
		const OP: SessionOp = SessionOp::Logout;

		let span = SessionSpan::new(OP, "logout");

		obs::record_session_outcome(OP, OpOutcome::Attempt);
		span.instrument(async move {
			let _lifecycle = self.lifecycle.lock().await;

			self.transition(OP, SessionState::Loading);
			self.discard(OP).await;
			self.transition(OP, SessionState::Unauthenticated);
		})
		.await;
		obs::record_session_outcome(OP, OpOutcome::Unauthenticated);
	}

	/// Returns the stored credential when it decodes and has not expired. No network call.
	///
	/// Undecodable or expired credentials are removed and end the session.
	pub async fn token(&self) -> Option<BearerToken> {
		let span = SessionSpan::new(SessionOp::Token, "token");

		span.instrument(async move {
			let _lifecycle = self.lifecycle.lock().await;

			self.fresh_credential(SessionOp::Token).await.map(|credential| credential.token)
		})
		.await
	}

	/// Like [`token`](Self::token), then re-confirms the credential with the server.
	///
	/// Returns `None` unless the server positively confirms the credential.
	pub async fn verified_token(&self) -> Option<BearerToken> {
		let span = SessionSpan::new(SessionOp::Validate, "verified_token");

		span.instrument(async move {
			let _lifecycle = self.lifecycle.lock().await;
			let credential = self.fresh_credential(SessionOp::Validate).await?;

			match self.confirm(SessionOp::Validate, &credential).await {
				SessionState::Authenticated(_) => Some(credential.token),
				_ => None,
			}
		})
		.await
	}

	/// Ends the session without touching storage, e.g. after the server answered 401.
	pub fn expire(&self) {
		self.transition(SessionOp::Rejected, SessionState::Unauthenticated);
	}

	async fn fresh_credential(&self, op: SessionOp) -> Option<Credential> {
		let raw = match self.store.get(TOKEN_KEY).await {
			Ok(Some(raw)) => raw,
			Ok(None) => {
				if self.is_authenticated() {
					self.transition(op, SessionState::Unauthenticated);
				}

				return None;
			},
			Err(e) => {
				obs::swallowed(op, "read stored token", &e);

				return None;
			},
		};

		match Credential::decode(raw) {
			Ok(credential) if !credential.is_expired() => Some(credential),
			Ok(_) => {
				self.discard(op).await;
				self.transition(op, SessionState::Unauthenticated);

				None
			},
			Err(e) => {
				obs::swallowed(op, "decode stored token", &e);
				self.discard(op).await;
				self.transition(op, SessionState::Unauthenticated);

				None
			},
		}
	}

	// Decides the terminal state for a decoded credential; only `Valid` authenticates.
	async fn confirm(&self, op: SessionOp, credential: &Credential) -> SessionState {
		if credential.is_expired() {
			self.discard(op).await;

			return self.transition(op, SessionState::Unauthenticated);
		}

		match self.validator.validate(&credential.token).await {
			Ok(Validation::Valid) =>
				self.transition(op, SessionState::Authenticated(credential.identity())),
			Ok(Validation::Revoked) => {
				self.discard(op).await;

				self.transition(op, SessionState::Unauthenticated)
			},
			Err(e) => {
				obs::swallowed(SessionOp::Validate, "validate token", &e);

				self.transition(op, SessionState::Unauthenticated)
			},
		}
	}

	async fn discard(&self, op: SessionOp) {
		if let Err(e) = self.store.delete(TOKEN_KEY).await {
			obs::swallowed(op, "delete stored token", &e);
		}
	}

	fn transition(&self, op: SessionOp, next: SessionState) -> SessionState {
		obs::transition(op, next.label());

		*self.state.write() = next.clone();

		next
	}
}
impl RejectionListener for Session {
	fn on_rejected(&self) {
		self.expire();
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session").field("state", &*self.state.read()).finish()
	}
}

fn outcome_of(state: &SessionState) -> OpOutcome {
	if state.is_authenticated() { OpOutcome::Authenticated } else { OpOutcome::Unauthenticated }
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{
		_preludet::*,
		store::{MemoryStore, StoreError, StoreFuture},
	};

	struct Scripted {
		verdict: Option<Validation>,
		calls: AtomicUsize,
	}
	impl Scripted {
		fn new(verdict: Option<Validation>) -> Arc<Self> {
			Arc::new(Self { verdict, calls: AtomicUsize::new(0) })
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}
	}
	impl TokenValidator for Scripted {
		fn validate<'a>(&'a self, _token: &'a BearerToken) -> ValidationFuture<'a> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let verdict = self.verdict;

			Box::pin(async move {
				verdict.ok_or_else(|| Error::Unexpected { message: "validation offline".into() })
			})
		}
	}

	struct ReadOnlyStore(Option<String>);
	impl SecureStore for ReadOnlyStore {
		fn get<'a>(&'a self, _key: &'a str) -> StoreFuture<'a, Option<String>> {
			let token = self.0.clone();

			Box::pin(async move { Ok(token) })
		}

		fn set<'a>(&'a self, _key: &'a str, _value: &'a str) -> StoreFuture<'a, ()> {
			Box::pin(async { Err(StoreError::Unavailable { message: "keychain locked".into() }) })
		}

		fn delete<'a>(&'a self, _key: &'a str) -> StoreFuture<'a, ()> {
			Box::pin(async { Err(StoreError::Unavailable { message: "keychain locked".into() }) })
		}
	}

	fn fresh_token() -> String {
		mint_token("tech@example.com", now_secs() - 60, now_secs() + 3_600)
	}

	fn stale_token() -> String {
		mint_token("tech@example.com", now_secs() - 7_200, now_secs() - 3_600)
	}

	async fn seeded(raw: &str) -> MemoryStore {
		let store = MemoryStore::default();

		store.set(TOKEN_KEY, raw).await.expect("Seeding the store should succeed.");

		store
	}

	#[tokio::test]
	async fn restore_without_token_skips_validation() {
		let validator = Scripted::new(Some(Validation::Valid));
		let session = Session::new(Arc::new(MemoryStore::default()), validator.clone());

		assert_eq!(session.state(), SessionState::Uninitialized);
		assert_eq!(session.restore().await, SessionState::Unauthenticated);
		assert_eq!(validator.calls(), 0);
	}

	#[tokio::test]
	async fn restore_confirms_fresh_token() {
		let store = seeded(&fresh_token()).await;
		let session = Session::new(Arc::new(store), Scripted::new(Some(Validation::Valid)));
		let state = session.restore().await;

		assert!(state.is_authenticated());
		assert_eq!(
			session.identity().map(|identity| identity.email),
			Some("tech@example.com".to_owned())
		);
	}

	#[tokio::test]
	async fn restore_discards_expired_and_garbage_tokens() {
		for raw in [stale_token(), "not-a-jwt".to_owned()] {
			let store = seeded(&raw).await;
			let validator = Scripted::new(Some(Validation::Valid));
			let session = Session::new(Arc::new(store.clone()), validator.clone());

			assert_eq!(session.restore().await, SessionState::Unauthenticated);
			assert!(!store.contains(TOKEN_KEY));
			assert_eq!(validator.calls(), 0);
		}
	}

	#[tokio::test]
	async fn restore_keeps_token_when_validation_is_inconclusive() {
		let store = seeded(&fresh_token()).await;
		let session = Session::new(Arc::new(store.clone()), Scripted::new(None));

		assert_eq!(session.restore().await, SessionState::Unauthenticated);
		assert!(store.contains(TOKEN_KEY));
	}

	#[tokio::test]
	async fn restore_removes_revoked_token() {
		let store = seeded(&fresh_token()).await;
		let session = Session::new(Arc::new(store.clone()), Scripted::new(Some(Validation::Revoked)));

		assert_eq!(session.restore().await, SessionState::Unauthenticated);
		assert!(!store.contains(TOKEN_KEY));
	}

	#[tokio::test]
	async fn login_persists_and_authenticates() {
		let store = MemoryStore::default();
		let session = Session::new(Arc::new(store.clone()), Scripted::new(Some(Validation::Valid)));
		let raw = fresh_token();
		let state = session.login(raw.clone()).await.expect("Login should succeed.");

		assert!(state.is_authenticated());
		assert_eq!(
			session.identity().map(|identity| identity.email),
			Some("tech@example.com".to_owned())
		);
		assert_eq!(session.token().await.map(|token| token.expose().to_owned()), Some(raw));
	}

	#[tokio::test]
	async fn restore_accepts_token_without_issued_at() {
		let raw = mint_token_with_payload(
			&serde_json::json!({ "sub": "a@x.com", "exp": now_secs() + 3_600 }),
		);
		let store = seeded(&raw).await;
		let session = Session::new(Arc::new(store.clone()), Scripted::new(Some(Validation::Valid)));

		assert!(session.restore().await.is_authenticated());
		assert_eq!(session.identity().and_then(|identity| identity.issued_at), None);
		assert!(store.contains(TOKEN_KEY));
	}

	#[tokio::test]
	async fn login_with_malformed_token_fails_and_cleans_up() {
		let store = MemoryStore::default();
		let session = Session::new(Arc::new(store.clone()), Scripted::new(Some(Validation::Valid)));
		let err = session.login("garbage").await.expect_err("Malformed tokens should fail.");

		assert!(matches!(err, Error::Credential(_)));
		assert!(store.is_empty());
		assert_eq!(session.state(), SessionState::Unauthenticated);
	}

	#[tokio::test]
	async fn login_storage_failure_propagates() {
		let session =
			Session::new(Arc::new(ReadOnlyStore(None)), Scripted::new(Some(Validation::Valid)));
		let err = session.login(fresh_token()).await.expect_err("Storage failure should surface.");

		assert!(matches!(err, Error::Storage(_)));
		assert_eq!(session.state(), SessionState::Unauthenticated);
	}

	#[tokio::test]
	async fn login_with_expired_token_is_unauthenticated() {
		let store = MemoryStore::default();
		let validator = Scripted::new(Some(Validation::Valid));
		let session = Session::new(Arc::new(store.clone()), validator.clone());
		let state = session.login(stale_token()).await.expect("Expired tokens are not errors.");

		assert_eq!(state, SessionState::Unauthenticated);
		assert!(store.is_empty());
		assert_eq!(validator.calls(), 0);
	}

	#[tokio::test]
	async fn logout_is_idempotent_and_survives_storage_failure() {
		let store = seeded(&fresh_token()).await;
		let session = Session::new(Arc::new(store.clone()), Scripted::new(Some(Validation::Valid)));

		session.restore().await;
		session.logout().await;
		session.logout().await;

		assert!(store.is_empty());
		assert_eq!(session.state(), SessionState::Unauthenticated);

		let session =
			Session::new(Arc::new(ReadOnlyStore(None)), Scripted::new(Some(Validation::Valid)));

		session.logout().await;

		assert_eq!(session.state(), SessionState::Unauthenticated);
	}

	#[tokio::test]
	async fn logout_hides_token_the_backend_refused_to_delete() {
		let session = Session::new(
			Arc::new(ReadOnlyStore(Some(fresh_token()))),
			Scripted::new(Some(Validation::Valid)),
		);

		assert!(session.restore().await.is_authenticated());

		session.logout().await;

		assert_eq!(session.state(), SessionState::Unauthenticated);
		assert!(session.token().await.is_none());
		assert!(session.verified_token().await.is_none());
		assert_eq!(session.store().get(TOKEN_KEY).await.expect("Read should succeed."), None);
		assert_eq!(session.restore().await, SessionState::Unauthenticated);
	}

	#[tokio::test]
	async fn token_drops_expired_credentials_without_network() {
		let store = seeded(&stale_token()).await;
		let validator = Scripted::new(Some(Validation::Valid));
		let session = Session::new(Arc::new(store.clone()), validator.clone());

		assert!(session.token().await.is_none());
		assert!(store.is_empty());
		assert_eq!(validator.calls(), 0);
	}

	#[tokio::test]
	async fn token_notices_external_removal() {
		let store = seeded(&fresh_token()).await;
		let session = Session::new(Arc::new(store.clone()), Scripted::new(Some(Validation::Valid)));

		session.restore().await;
		store.delete(TOKEN_KEY).await.expect("Deleting should succeed.");

		assert!(session.token().await.is_none());
		assert!(!session.is_authenticated());
	}

	#[tokio::test]
	async fn verified_token_requires_confirmation() {
		let store = seeded(&fresh_token()).await;
		let session = Session::new(Arc::new(store.clone()), Scripted::new(Some(Validation::Revoked)));

		assert!(session.verified_token().await.is_none());
		assert!(store.is_empty());

		let store = seeded(&fresh_token()).await;
		let validator = Scripted::new(Some(Validation::Valid));
		let session = Session::new(Arc::new(store), validator.clone());

		assert!(session.verified_token().await.is_some());
		assert!(session.is_authenticated());
		assert_eq!(validator.calls(), 1);
	}

	#[tokio::test]
	async fn rejection_expires_session_but_leaves_storage_alone() {
		let store = seeded(&fresh_token()).await;
		let session = Session::new(Arc::new(store.clone()), Scripted::new(Some(Validation::Valid)));

		session.restore().await;
		session.on_rejected();

		assert_eq!(session.state(), SessionState::Unauthenticated);
		assert!(store.contains(TOKEN_KEY));
	}
}
