//! Provider configuration values and EVE Online SSO defaults.

// self
use crate::{_prelude::*, auth::Secret, provider::ProviderConfigBuilder};

/// Default EVE Online SSO site.
pub const EVE_SSO_SITE: &str = "https://login.eveonline.com";
/// Authorization endpoint path relative to the site.
pub const AUTHORIZE_PATH: &str = "/oauth/authorize";
/// Token endpoint path relative to the site.
pub const TOKEN_PATH: &str = "/oauth/token";
/// Character verification endpoint path relative to the site.
pub const VERIFY_PATH: &str = "/oauth/verify";
/// Default identity field used as the uid.
pub const DEFAULT_UID_FIELD: &str = "CharacterID";
/// Default identity field used as the display name.
pub const DEFAULT_NAME_FIELD: &str = "CharacterName";
/// Default identity field holding the granted scopes string.
pub const DEFAULT_SCOPES_FIELD: &str = "Scopes";
/// Default request timeout applied to every provider call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(10);

/// Character used to join and split scope lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeDelimiter {
	/// `a,b`
	#[default]
	Comma,
	/// `a b`
	Space,
}
impl ScopeDelimiter {
	/// Returns the delimiter character.
	pub const fn as_char(self) -> char {
		match self {
			ScopeDelimiter::Comma => ',',
			ScopeDelimiter::Space => ' ',
		}
	}

	/// Joins scopes with this delimiter.
	pub fn join<I, S>(self, scopes: I) -> String
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut buf = String::new();

		for (idx, scope) in scopes.into_iter().enumerate() {
			if idx > 0 {
				buf.push(self.as_char());
			}

			buf.push_str(scope.as_ref());
		}

		buf
	}

	/// Splits a provider-reported scopes string.
	///
	/// An empty input yields a single empty entry.
	pub fn split(self, scopes: &str) -> Vec<String> {
		scopes.split(self.as_char()).map(str::to_owned).collect()
	}
}
impl FromStr for ScopeDelimiter {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"comma" | "," => Ok(Self::Comma),
			"space" | " " => Ok(Self::Space),
			other => Err(other.to_owned()),
		}
	}
}

/// Where the access token is placed when calling the verification endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityAuth {
	/// `Authorization: Bearer <token>` header.
	#[default]
	Bearer,
	/// `access_token=<token>` query parameter.
	QueryParameter,
}

/// Endpoint set used by the strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Site base URL the endpoints were derived from.
	pub site: Url,
	/// Browser-facing authorization endpoint.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// Character verification endpoint.
	pub verify: Url,
}

/// Immutable provider configuration shared by every login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
	/// Registered application client identifier.
	pub client_id: String,
	/// Registered application client secret.
	pub client_secret: Secret,
	/// Provider endpoints.
	pub endpoints: ProviderEndpoints,
	/// Identity field returned by [`uid`](crate::strategy::Strategy::uid).
	pub uid_field: String,
	/// Identity field mapped to the display name.
	pub name_field: String,
	/// Identity field holding the granted scopes string.
	pub scopes_field: String,
	/// Scope requested when the caller supplies none.
	pub default_scope: String,
	/// Whether authorize URLs carry `redirect_uri`.
	pub send_redirect_uri: bool,
	/// Delimiter used for scope lists.
	pub scope_delimiter: ScopeDelimiter,
	/// Access token placement for the verification call.
	pub identity_auth: IdentityAuth,
	/// Timeout applied to each provider request, in milliseconds.
	pub request_timeout_ms: u64,
	/// Generate a random `state` when the caller does not supply one.
	pub csrf_state: bool,
}
impl ProviderConfig {
	/// Creates a builder preset to the EVE Online SSO endpoints.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<Secret>,
	) -> ProviderConfigBuilder {
		ProviderConfigBuilder::new(client_id, client_secret)
	}

	/// Request timeout as a duration.
	pub fn request_timeout(&self) -> Duration {
		Duration::milliseconds(i64::try_from(self.request_timeout_ms).unwrap_or(i64::MAX))
	}
}
