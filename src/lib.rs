//! Session lifecycle and authorizing request pipeline for the repair-desk API client.
//!
//! The crate is organized around two collaborating pieces:
//!
//! - [`session::Session`] persists a bearer credential in a [`store::SecureStore`], decodes its
//!   claims, and decides whether the process is authenticated.
//! - [`http::ApiClient`] runs every outbound call through a [`http::Pipeline`] that attaches the
//!   stored credential and reacts uniformly to authorization, server, and connectivity failures.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod account;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod session;
pub mod store;


mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
