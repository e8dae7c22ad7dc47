//! Status classification and the inbound stage that reacts to failures.

// crates.io
use reqwest::{Response, StatusCode};
// self
use crate::{
	_prelude::*,
	http::{Notice, Notifier, ResponseStage, StageFuture},
	obs::{self, SessionOp},
	store::{SecureStore, TOKEN_KEY},
};

const MAX_MESSAGE_LEN: usize = 200;

/// Observer told when the server rejects the stored credential.
pub trait RejectionListener
where
	Self: Send + Sync,
{
	/// Called after a 401 once the stored token has been removed.
	fn on_rejected(&self);
}

/// Converts a raw response into the crate taxonomy.
///
/// Success statuses pass through untouched. Failures consume the body to extract a message.
pub async fn classify(response: Response) -> Result<Response> {
	let status = response.status();

	if status.is_success() {
		return Ok(response);
	}
	if status == StatusCode::UNAUTHORIZED {
		return Err(Error::Unauthorized);
	}

	// A body that cannot be read still leaves a usable status.
	let body = response.text().await.unwrap_or_default();

	Err(Error::Rejected { status: status.as_u16(), message: extract_message(&body) })
}

/// Pulls a human-readable message out of an error body.
///
/// JSON bodies contribute their `message`, `error`, or `detail` string field; other non-empty
/// bodies are used verbatim, truncated to a readable length.
pub fn extract_message(body: &str) -> Option<String> {
	let body = body.trim();

	if body.is_empty() {
		return None;
	}
	if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
		return ["message", "error", "detail"]
			.iter()
			.find_map(|field| value.get(field).and_then(serde_json::Value::as_str))
			.map(str::trim)
			.filter(|message| !message.is_empty())
			.map(truncate);
	}

	Some(truncate(body))
}

fn truncate(text: &str) -> String {
	if text.len() <= MAX_MESSAGE_LEN {
		return text.to_owned();
	}

	let mut end = MAX_MESSAGE_LEN;

	while !text.is_char_boundary(end) {
		end -= 1;
	}

	format!("{}...", &text[..end])
}

/// Inbound stage that turns failures into user notices and ends rejected sessions.
pub struct ResponseHandler {
	store: Arc<dyn SecureStore>,
	notifier: Arc<dyn Notifier>,
	listeners: Vec<Arc<dyn RejectionListener>>,
}
impl ResponseHandler {
	/// Creates a handler that clears `store` on 401 and reports through `notifier`.
	pub fn new(store: Arc<dyn SecureStore>, notifier: Arc<dyn Notifier>) -> Self {
		Self { store, notifier, listeners: Vec::new() }
	}

	/// Registers a listener told about 401 rejections.
	pub fn with_listener(mut self, listener: Arc<dyn RejectionListener>) -> Self {
		self.listeners.push(listener);

		self
	}

	async fn handle(&self, error: &Error) {
		let notice = match error {
			Error::Unauthorized => {
				if let Err(e) = self.store.delete(TOKEN_KEY).await {
					obs::swallowed(SessionOp::Rejected, "delete rejected token", &e);
				}
				for listener in &self.listeners {
					listener.on_rejected();
				}

				Notice::session_expired()
			},
			Error::Rejected { message, .. } => Notice::request_failed(message.as_deref()),
			Error::Transport(_) => Notice::no_connectivity(),
			_ => Notice::unexpected(),
		};

		self.notifier.notify(notice);
	}
}
impl ResponseStage for ResponseHandler {
	fn on_response<'a>(&'a self, outcome: Result<Response>) -> StageFuture<'a, Response> {
		Box::pin(async move {
			match outcome {
				Ok(response) => Ok(response),
				Err(error) => {
					self.handle(&error).await;

					Err(error)
				},
			}
		})
	}
}
impl Debug for ResponseHandler {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResponseHandler").field("listeners", &self.listeners.len()).finish()
	}
}
