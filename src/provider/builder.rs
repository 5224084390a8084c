//! Validating builder for [`ProviderConfig`].

// self
use crate::{
	_prelude::*,
	auth::Secret,
	provider::{
		AUTHORIZE_PATH, DEFAULT_NAME_FIELD, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SCOPES_FIELD,
		DEFAULT_UID_FIELD, EVE_SSO_SITE, IdentityAuth, ProviderConfig, ProviderEndpoints,
		ScopeDelimiter, TOKEN_PATH, VERIFY_PATH,
	},
};

/// Errors raised while constructing or validating provider configuration.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderConfigError {
	/// Client identifier is required.
	#[error("Client identifier is required.")]
	MissingClientId,
	/// Client secret is required for HTTP Basic client authentication.
	#[error("Client secret is required.")]
	MissingClientSecret,
	/// Identity field selectors cannot be empty.
	#[error("The {option} option cannot be empty.")]
	EmptyField {
		/// Option name.
		option: &'static str,
	},
	/// Endpoints must use HTTP(S).
	#[error("The {endpoint} endpoint must use HTTP or HTTPS: {url}.")]
	UnsupportedScheme {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoint could not be derived from the site URL.
	#[error("The {endpoint} endpoint cannot be derived from site {site}.")]
	InvalidSite {
		/// Which endpoint failed.
		endpoint: &'static str,
		/// Configured site.
		site: String,
	},
	/// Requests need a timeout of at least one millisecond.
	#[error("Request timeout must be at least one millisecond.")]
	ZeroTimeout,
	/// Environment variable is required but unset.
	#[error("Environment variable `{name}` is not set.")]
	MissingVariable {
		/// Variable name.
		name: &'static str,
	},
	/// Environment variable could not be parsed.
	#[error("Environment variable `{name}` has an invalid value: {value}.")]
	InvalidVariable {
		/// Variable name.
		name: &'static str,
		/// Offending value.
		value: String,
	},
}

/// Builder for [`ProviderConfig`] values.
#[derive(Debug)]
pub struct ProviderConfigBuilder {
	/// Registered application client identifier.
	pub client_id: String,
	/// Registered application client secret.
	pub client_secret: Secret,
	/// Site base URL; endpoints not overridden are derived from it.
	pub site: Option<Url>,
	/// Explicit authorization endpoint override.
	pub authorization_endpoint: Option<Url>,
	/// Explicit token endpoint override.
	pub token_endpoint: Option<Url>,
	/// Explicit verification endpoint override.
	pub verify_endpoint: Option<Url>,
	/// Identity field returned as the uid.
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
	/// Timeout applied to each provider request.
	pub request_timeout: Duration,
	/// Generate a random `state` when the caller does not supply one.
	pub csrf_state: bool,
}
impl ProviderConfigBuilder {
	/// Creates a new builder preset to the EVE Online SSO defaults.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			site: None,
			authorization_endpoint: None,
			token_endpoint: None,
			verify_endpoint: None,
			uid_field: DEFAULT_UID_FIELD.into(),
			name_field: DEFAULT_NAME_FIELD.into(),
			scopes_field: DEFAULT_SCOPES_FIELD.into(),
			default_scope: String::new(),
			send_redirect_uri: true,
			scope_delimiter: ScopeDelimiter::default(),
			identity_auth: IdentityAuth::default(),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			csrf_state: false,
		}
	}

	/// Sets the site base URL.
	pub fn site(mut self, url: Url) -> Self {
		self.site = Some(url);

		self
	}

	/// Overrides the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Overrides the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Overrides the verification endpoint.
	pub fn verify_endpoint(mut self, url: Url) -> Self {
		self.verify_endpoint = Some(url);

		self
	}

	/// Sets the identity field used as the uid.
	pub fn uid_field(mut self, field: impl ToString) -> Self {
		self.uid_field = field.to_string();

		self
	}

	/// Sets the identity field used as the display name.
	pub fn name_field(mut self, field: impl ToString) -> Self {
		self.name_field = field.to_string();

		self
	}

	/// Sets the identity field holding the granted scopes string.
	pub fn scopes_field(mut self, field: impl ToString) -> Self {
		self.scopes_field = field.to_string();

		self
	}

	/// Sets the scope requested when the caller supplies none.
	pub fn default_scope(mut self, scope: impl Into<String>) -> Self {
		self.default_scope = scope.into();

		self
	}

	/// Toggles `redirect_uri` on authorize URLs.
	pub fn send_redirect_uri(mut self, send: bool) -> Self {
		self.send_redirect_uri = send;

		self
	}

	/// Sets the scope delimiter.
	pub fn scope_delimiter(mut self, delimiter: ScopeDelimiter) -> Self {
		self.scope_delimiter = delimiter;

		self
	}

	/// Sets where the access token goes on the verification call.
	pub fn identity_auth(mut self, auth: IdentityAuth) -> Self {
		self.identity_auth = auth;

		self
	}

	/// Sets the per-request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Toggles random `state` generation.
	pub fn csrf_state(mut self, enabled: bool) -> Self {
		self.csrf_state = enabled;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ProviderConfig, ProviderConfigError> {
		let site = match self.site {
			Some(site) => site,
			None => Url::parse(EVE_SSO_SITE).map_err(|_| ProviderConfigError::InvalidSite {
				endpoint: "site",
				site: EVE_SSO_SITE.into(),
			})?,
		};
		let authorization =
			resolve("authorization", self.authorization_endpoint, &site, AUTHORIZE_PATH)?;
		let token = resolve("token", self.token_endpoint, &site, TOKEN_PATH)?;
		let verify = resolve("verify", self.verify_endpoint, &site, VERIFY_PATH)?;
		let request_timeout_ms = u64::try_from(self.request_timeout.whole_milliseconds())
			.ok()
			.filter(|ms| *ms > 0)
			.ok_or(ProviderConfigError::ZeroTimeout)?;
		let config = ProviderConfig {
			client_id: self.client_id,
			client_secret: self.client_secret,
			endpoints: ProviderEndpoints { site, authorization, token, verify },
			uid_field: self.uid_field,
			name_field: self.name_field,
			scopes_field: self.scopes_field,
			default_scope: self.default_scope,
			send_redirect_uri: self.send_redirect_uri,
			scope_delimiter: self.scope_delimiter,
			identity_auth: self.identity_auth,
			request_timeout_ms,
			csrf_state: self.csrf_state,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ProviderConfig {
	/// Validates invariants for the configuration.
	pub fn validate(&self) -> Result<(), ProviderConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ProviderConfigError::MissingClientId);
		}
		if self.client_secret.is_empty() {
			return Err(ProviderConfigError::MissingClientSecret);
		}
		if self.request_timeout_ms == 0 {
			return Err(ProviderConfigError::ZeroTimeout);
		}

		validate_field("uid_field", &self.uid_field)?;
		validate_field("name_field", &self.name_field)?;
		validate_field("scopes_field", &self.scopes_field)?;
		validate_endpoint("site", &self.endpoints.site)?;
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;
		validate_endpoint("verify", &self.endpoints.verify)?;

		Ok(())
	}
}

fn resolve(
	endpoint: &'static str,
	explicit: Option<Url>,
	site: &Url,
	path: &str,
) -> Result<Url, ProviderConfigError> {
	match explicit {
		Some(url) => Ok(url),
		None => site
			.join(path)
			.map_err(|_| ProviderConfigError::InvalidSite { endpoint, site: site.to_string() }),
	}
}

fn validate_field(option: &'static str, value: &str) -> Result<(), ProviderConfigError> {
	if value.trim().is_empty() {
		Err(ProviderConfigError::EmptyField { option })
	} else {
		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderConfigError> {
	match url.scheme() {
		"https" | "http" => Ok(()),
		_ => Err(ProviderConfigError::UnsupportedScheme { endpoint: name, url: url.to_string() }),
	}
}
