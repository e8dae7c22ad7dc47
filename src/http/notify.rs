//! User-facing notices raised by the response stage.
//!
//! The crate never renders anything; applications plug a [`Notifier`] that shows a one-shot
//! alert with the notice's title and message.

// self
use crate::{_prelude::*, obs};

/// Category of a user-facing notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
	/// The server answered 401; the stored credential was discarded.
	SessionExpired,
	/// The server rejected the call with another error status.
	RequestFailed,
	/// No response was received.
	NoConnectivity,
	/// Any other failure.
	Unexpected,
}
impl NoticeKind {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			NoticeKind::SessionExpired => "session_expired",
			NoticeKind::RequestFailed => "request_failed",
			NoticeKind::NoConnectivity => "no_connectivity",
			NoticeKind::Unexpected => "unexpected",
		}
	}
}

/// Short title + message pair shown to the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
	/// Notice category.
	pub kind: NoticeKind,
	/// Alert title.
	pub title: String,
	/// Alert body.
	pub message: String,
}
impl Notice {
	/// Notice raised after a 401.
	pub fn session_expired() -> Self {
		Self {
			kind: NoticeKind::SessionExpired,
			title: "Session expired".into(),
			message: "Your session has expired. Please sign in again.".into(),
		}
	}

	/// Notice raised after any other error status, carrying the server message when present.
	pub fn request_failed(server_message: Option<&str>) -> Self {
		let message = server_message
			.map(str::trim)
			.filter(|m| !m.is_empty())
			.unwrap_or("The server could not complete the request.");

		Self { kind: NoticeKind::RequestFailed, title: "Request failed".into(), message: message.into() }
	}

	/// Notice raised when no response arrived.
	pub fn no_connectivity() -> Self {
		Self {
			kind: NoticeKind::NoConnectivity,
			title: "No connection".into(),
			message: "Could not reach the server. Check your connection and try again.".into(),
		}
	}

	/// Notice raised for anything else.
	pub fn unexpected() -> Self {
		Self {
			kind: NoticeKind::Unexpected,
			title: "Something went wrong".into(),
			message: "An unexpected error occurred. Please try again.".into(),
		}
	}
}

/// Sink for user-facing notices.
pub trait Notifier
where
	Self: Send + Sync,
{
	/// Presents the notice. Implementations must not block on user interaction.
	fn notify(&self, notice: Notice);
}

/// Notifier that only writes notices to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;
impl Notifier for LogNotifier {
	fn notify(&self, notice: Notice) {
		obs::notice(notice.kind.as_str(), &notice.title, &notice.message);
	}
}

/// Notifier that keeps every notice in memory, for tests and headless tools.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier(Arc<Mutex<Vec<Notice>>>);
impl RecordingNotifier {
	/// Returns a copy of every notice received so far.
	pub fn notices(&self) -> Vec<Notice> {
		self.0.lock().clone()
	}

	/// Returns the kinds of every notice received so far.
	pub fn kinds(&self) -> Vec<NoticeKind> {
		self.0.lock().iter().map(|notice| notice.kind).collect()
	}

	/// Drops recorded notices.
	pub fn clear(&self) {
		self.0.lock().clear();
	}
}
impl Notifier for RecordingNotifier {
	fn notify(&self, notice: Notice) {
		self.0.lock().push(notice);
	}
}
