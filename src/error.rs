//! Strategy-level error types shared across the token client, controller, and configuration.

// self
use crate::{_prelude::*, provider::ProviderConfigError};

/// Strategy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical failure raised while running the login flow.
///
/// Provider- and transport-class variants are captured by the controller and reported
/// through the host failure sink; [`Error::InvalidState`] signals host misuse of the
/// output views.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum Error {
	/// Callback arrived without an authorization code.
	#[error("No authorization code was received.")]
	MissingCode,
	/// Token endpoint returned an OAuth 2.0 error payload.
	#[error("Provider rejected the request: {code}{}.", fmt_description(.description))]
	ProviderRejected {
		/// OAuth `error` value.
		code: String,
		/// OAuth `error_description` value, when supplied.
		description: Option<String>,
	},
	/// Identity endpoint rejected the access token.
	#[error("Identity endpoint rejected the access token.")]
	Unauthorized,
	/// Provider answered with an unexpected HTTP status and no OAuth error payload.
	#[error("Provider returned HTTP {status}.")]
	ProviderError {
		/// HTTP status code.
		status: u16,
	},
	/// Network or connection failure while calling the provider.
	#[error("Transport failure: {reason}.")]
	Transport {
		/// Human-readable failure reason.
		reason: String,
	},
	/// Output views were read before a successful callback.
	#[error("Login flow has not completed.")]
	InvalidState,

	/// Provider answered with a body that could not be interpreted.
	#[error("The {endpoint} endpoint returned a malformed response: {reason}.")]
	MalformedResponse {
		/// Which endpoint produced the body.
		endpoint: &'static str,
		/// Parsing failure summary.
		reason: String,
	},
	/// Returned `state` did not match the expected value.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// Verified identity lacks the configured uid field.
	#[error("Identity is missing the `{field}` field.")]
	MissingUidField {
		/// Configured uid field name.
		field: String,
	},
}
impl Error {
	/// Stable key reported to the host failure sink.
	pub fn failure_key(&self) -> &str {
		match self {
			Self::MissingCode => "missing_code",
			Self::ProviderRejected { code, .. } => code,
			Self::Unauthorized => "unauthorized",
			Self::ProviderError { .. } => "provider_error",
			Self::Transport { .. } => "transport",
			Self::InvalidState => "invalid_state",
			Self::MalformedResponse { .. } => "malformed_response",
			Self::StateMismatch => "state_mismatch",
			Self::MissingUidField { .. } => "missing_uid_field",
		}
	}

	/// Wraps any displayable transport failure.
	pub fn transport(reason: impl Display) -> Self {
		Self::Transport { reason: reason.to_string() }
	}
}

fn fmt_description(description: &Option<String>) -> String {
	description.as_deref().map(|d| format!(" ({d})")).unwrap_or_default()
}

/// Construction-time failures raised while wiring the strategy.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Provider configuration failed validation.
	#[error(transparent)]
	Provider(#[from] ProviderConfigError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Configured endpoint cannot be used by the OAuth client.
	#[error("The {endpoint} endpoint is invalid.")]
	InvalidEndpoint {
		/// Endpoint label.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
