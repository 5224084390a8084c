//! Environment-driven configuration loading.

// self
use crate::{
	_prelude::*,
	provider::{ProviderConfig, ProviderConfigBuilder, ProviderConfigError, ScopeDelimiter},
};

/// Client identifier variable (required).
pub const ENV_CLIENT_ID: &str = "ESI_CLIENT_ID";
/// Client secret variable (required).
pub const ENV_CLIENT_SECRET: &str = "ESI_CLIENT_SECRET";
/// Site base URL variable.
pub const ENV_SITE: &str = "ESI_SITE";
/// Authorization endpoint override variable.
pub const ENV_AUTHORIZE_URL: &str = "ESI_AUTHORIZE_URL";
/// Token endpoint override variable.
pub const ENV_TOKEN_URL: &str = "ESI_TOKEN_URL";
/// Verification endpoint override variable.
pub const ENV_VERIFY_URL: &str = "ESI_VERIFY_URL";
/// Uid field variable.
pub const ENV_UID_FIELD: &str = "ESI_UID_FIELD";
/// Default scope variable.
pub const ENV_DEFAULT_SCOPE: &str = "ESI_DEFAULT_SCOPE";
/// Redirect URI toggle variable.
pub const ENV_SEND_REDIRECT_URI: &str = "ESI_SEND_REDIRECT_URI";
/// Scope delimiter variable (`comma` or `space`).
pub const ENV_SCOPE_DELIMITER: &str = "ESI_SCOPE_DELIMITER";
/// Request timeout variable, in seconds.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "ESI_REQUEST_TIMEOUT_SECS";
/// CSRF state toggle variable.
pub const ENV_CSRF_STATE: &str = "ESI_CSRF_STATE";

impl ProviderConfig {
	/// Loads configuration from the process environment.
	pub fn from_env() -> Result<Self, ProviderConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads configuration through an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ProviderConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let required = |name: &'static str| {
			lookup(name)
				.filter(|value| !value.is_empty())
				.ok_or(ProviderConfigError::MissingVariable { name })
		};
		let mut builder =
			ProviderConfigBuilder::new(required(ENV_CLIENT_ID)?, required(ENV_CLIENT_SECRET)?);

		if let Some(site) = lookup(ENV_SITE) {
			builder = builder.site(parse_url(ENV_SITE, site)?);
		}
		if let Some(url) = lookup(ENV_AUTHORIZE_URL) {
			builder = builder.authorization_endpoint(parse_url(ENV_AUTHORIZE_URL, url)?);
		}
		if let Some(url) = lookup(ENV_TOKEN_URL) {
			builder = builder.token_endpoint(parse_url(ENV_TOKEN_URL, url)?);
		}
		if let Some(url) = lookup(ENV_VERIFY_URL) {
			builder = builder.verify_endpoint(parse_url(ENV_VERIFY_URL, url)?);
		}
		if let Some(field) = lookup(ENV_UID_FIELD) {
			builder = builder.uid_field(field);
		}
		if let Some(scope) = lookup(ENV_DEFAULT_SCOPE) {
			builder = builder.default_scope(scope);
		}
		if let Some(flag) = lookup(ENV_SEND_REDIRECT_URI) {
			builder = builder.send_redirect_uri(parse_bool(ENV_SEND_REDIRECT_URI, flag)?);
		}
		if let Some(delimiter) = lookup(ENV_SCOPE_DELIMITER) {
			let delimiter = delimiter.parse::<ScopeDelimiter>().map_err(|value| {
				ProviderConfigError::InvalidVariable { name: ENV_SCOPE_DELIMITER, value }
			})?;

			builder = builder.scope_delimiter(delimiter);
		}
		if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
			let parsed = secs.trim().parse::<i64>().map_err(|_| {
				ProviderConfigError::InvalidVariable { name: ENV_REQUEST_TIMEOUT_SECS, value: secs }
			})?;

			builder = builder.request_timeout(Duration::seconds(parsed));
		}
		if let Some(flag) = lookup(ENV_CSRF_STATE) {
			builder = builder.csrf_state(parse_bool(ENV_CSRF_STATE, flag)?);
		}

		builder.build()
	}
}

fn parse_url(name: &'static str, value: String) -> Result<Url, ProviderConfigError> {
	Url::parse(&value).map_err(|_| ProviderConfigError::InvalidVariable { name, value })
}

fn parse_bool(name: &'static str, value: String) -> Result<bool, ProviderConfigError> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" => Ok(true),
		"false" | "0" | "no" => Ok(false),
		_ => Err(ProviderConfigError::InvalidVariable { name, value }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::provider::IdentityAuth;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> =
			vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();

		move |name: &str| vars.get(name).cloned()
	}

	#[test]
	fn loads_required_and_optional_variables() {
		let config = ProviderConfig::from_lookup(lookup(&[
			(ENV_CLIENT_ID, "env-client"),
			(ENV_CLIENT_SECRET, "env-secret"),
			(ENV_SITE, "https://sisilogin.testeveonline.com"),
			(ENV_UID_FIELD, "CharacterOwnerHash"),
			(ENV_DEFAULT_SCOPE, "publicData"),
			(ENV_SEND_REDIRECT_URI, "false"),
			(ENV_SCOPE_DELIMITER, "space"),
			(ENV_REQUEST_TIMEOUT_SECS, "3"),
			(ENV_CSRF_STATE, "1"),
		]))
		.expect("Environment configuration should load.");

		assert_eq!(config.client_id, "env-client");
		assert_eq!(config.client_secret.expose(), "env-secret");
		assert_eq!(
			config.endpoints.token.as_str(),
			"https://sisilogin.testeveonline.com/oauth/token"
		);
		assert_eq!(config.uid_field, "CharacterOwnerHash");
		assert_eq!(config.default_scope, "publicData");
		assert!(!config.send_redirect_uri);
		assert_eq!(config.scope_delimiter, ScopeDelimiter::Space);
		assert_eq!(config.identity_auth, IdentityAuth::Bearer);
		assert_eq!(config.request_timeout_ms, 3_000);
		assert!(config.csrf_state);
	}

	#[test]
	fn missing_credentials_are_reported_by_name() {
		let err = ProviderConfig::from_lookup(lookup(&[(ENV_CLIENT_ID, "only-id")]))
			.expect_err("Missing secret should fail.");

		assert_eq!(err, ProviderConfigError::MissingVariable { name: ENV_CLIENT_SECRET });
	}

	#[test]
	fn malformed_values_are_rejected() {
		let err = ProviderConfig::from_lookup(lookup(&[
			(ENV_CLIENT_ID, "id"),
			(ENV_CLIENT_SECRET, "secret"),
			(ENV_SCOPE_DELIMITER, "pipe"),
		]))
		.expect_err("Unknown delimiter should fail.");

		assert_eq!(
			err,
			ProviderConfigError::InvalidVariable { name: ENV_SCOPE_DELIMITER, value: "pipe".into() }
		);

		let err = ProviderConfig::from_lookup(lookup(&[
			(ENV_CLIENT_ID, "id"),
			(ENV_CLIENT_SECRET, "secret"),
			(ENV_SEND_REDIRECT_URI, "maybe"),
		]))
		.expect_err("Unknown boolean should fail.");

		assert!(matches!(
			err,
			ProviderConfigError::InvalidVariable { name: ENV_SEND_REDIRECT_URI, .. }
		));
	}
}
