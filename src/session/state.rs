//! Process-wide authentication state derived from the stored credential.

// self
use crate::{_prelude::*, auth::Identity};

/// Process-wide authentication state.
///
/// `Uninitialized` only exists before the first lifecycle operation; afterwards the session
/// moves through `Loading` into `Authenticated` or `Unauthenticated`, and either of those can be
/// left again by a later login, logout, expiry, or 401.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "identity", rename_all = "snake_case")]
pub enum SessionState {
	/// No lifecycle operation has run yet.
	#[default]
	Uninitialized,
	/// A restore, login, or logout is in flight.
	Loading,
	/// A fresh, remotely confirmed credential is held.
	Authenticated(Identity),
	/// No usable credential is held.
	Unauthenticated,
}
impl SessionState {
	/// Returns `true` when a confirmed credential is held.
	pub fn is_authenticated(&self) -> bool {
		matches!(self, Self::Authenticated(_))
	}

	/// Returns `true` while a lifecycle operation is in flight.
	pub fn is_loading(&self) -> bool {
		matches!(self, Self::Loading)
	}

	/// Identity of the authenticated user, if any.
	pub fn identity(&self) -> Option<&Identity> {
		match self {
			Self::Authenticated(identity) => Some(identity),
			_ => None,
		}
	}

	/// Stable label suitable for logs.
	pub const fn label(&self) -> &'static str {
		match self {
			Self::Uninitialized => "uninitialized",
			Self::Loading => "loading",
			Self::Authenticated(_) => "authenticated",
			Self::Unauthenticated => "unauthenticated",
		}
	}
}
