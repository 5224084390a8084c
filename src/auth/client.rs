//! Per-login client credential overrides.

// self
use crate::{_prelude::*, auth::Secret};

/// Client id/secret pair that replaces the configured application credentials for a
/// single login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
	/// OAuth 2.0 client identifier.
	pub id: String,
	/// OAuth 2.0 client secret.
	pub secret: Secret,
}
impl ClientCredentials {
	/// Creates a new credential pair.
	pub fn new(id: impl Into<String>, secret: impl Into<Secret>) -> Self {
		Self { id: id.into(), secret: secret.into() }
	}
}
