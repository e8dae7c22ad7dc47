//! Bearer credentials, their claims schema, and the identity derived from them.

pub mod claims;
pub mod credential;
pub mod secret;

pub use claims::*;
pub use credential::*;
pub use secret::*;
