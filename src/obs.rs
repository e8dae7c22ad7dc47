//! Optional observability helpers for session operations and API requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit structured spans named `repairdesk.session` with
//!   the `op` and `stage` fields, plus `warn` events for failures the crate swallows on purpose.
//! - Enable `metrics` to increment `repairdesk_session_total` (labeled by `op` + `outcome`) and
//!   `repairdesk_request_total` (labeled by `outcome`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Session operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionOp {
	/// Session restore at process start.
	Restore,
	/// Login with a freshly issued credential.
	Login,
	/// Explicit logout.
	Logout,
	/// Token access (with or without remote validation).
	Token,
	/// Remote validation call.
	Validate,
	/// Session ended by a 401 from the API.
	Rejected,
	/// Sign-in against the credential issuance endpoint.
	SignIn,
}
impl SessionOp {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SessionOp::Restore => "restore",
			SessionOp::Login => "login",
			SessionOp::Logout => "logout",
			SessionOp::Token => "token",
			SessionOp::Validate => "validate",
			SessionOp::Rejected => "rejected",
			SessionOp::SignIn => "sign_in",
		}
	}
}
impl Display for SessionOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each session operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Operation ended with an authenticated session.
	Authenticated,
	/// Operation ended with no session.
	Unauthenticated,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Authenticated => "authenticated",
			OpOutcome::Unauthenticated => "unauthenticated",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each API request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// 2xx response.
	Success,
	/// HTTP 401.
	Unauthorized,
	/// Any other non-success status.
	Rejected,
	/// No response received.
	NoResponse,
	/// Anything else.
	Unexpected,
}
impl RequestOutcome {
	/// Classifies a pipeline result.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => Self::Success,
			Err(Error::Unauthorized) => Self::Unauthorized,
			Err(Error::Rejected { .. }) => Self::Rejected,
			Err(Error::Transport(_)) => Self::NoResponse,
			Err(_) => Self::Unexpected,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Success => "success",
			RequestOutcome::Unauthorized => "unauthorized",
			RequestOutcome::Rejected => "rejected",
			RequestOutcome::NoResponse => "no_response",
			RequestOutcome::Unexpected => "unexpected",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
