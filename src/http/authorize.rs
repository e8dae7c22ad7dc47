//! Outbound stage that attaches the stored bearer credential.
//!
//! The stage reads [`TOKEN_KEY`] straight from secure storage rather than asking the session,
//! so attaching a header never waits on remote validation. A token that expired locally but is
//! still stored gets sent anyway; the server's 401 then ends the session through
//! [`ResponseHandler`](crate::http::ResponseHandler).

// crates.io
use reqwest::{Request, header::AUTHORIZATION};
// self
use crate::{
	_prelude::*,
	auth::BearerToken,
	http::{RequestStage, StageFuture},
	obs::{self, SessionOp},
	store::{SecureStore, TOKEN_KEY},
};

/// Sets `Authorization: Bearer <token>` when a token is stored.
#[derive(Clone)]
pub struct AttachBearer {
	store: Arc<dyn SecureStore>,
}
impl AttachBearer {
	/// Creates a stage reading from `store`.
	pub fn new(store: Arc<dyn SecureStore>) -> Self {
		Self { store }
	}
}
impl RequestStage for AttachBearer {
	fn on_request<'a>(&'a self, mut request: Request) -> StageFuture<'a, Request> {
		Box::pin(async move {
			let raw = match self.store.get(TOKEN_KEY).await {
				Ok(Some(raw)) => raw,
				Ok(None) => return Ok(request),
				Err(e) => {
					obs::swallowed(SessionOp::Token, "read token for request", &e);

					return Ok(request);
				},
			};

			match BearerToken::new(raw).and_then(|token| token.header_value()) {
				Ok(value) => {
					request.headers_mut().insert(AUTHORIZATION, value);
				},
				Err(e) => obs::swallowed(SessionOp::Token, "attach stored token", &e),
			}

			Ok(request)
		})
	}
}
impl Debug for AttachBearer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("AttachBearer(..)")
	}
}
