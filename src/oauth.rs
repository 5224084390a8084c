//! Token client: every direct interaction with the provider's OAuth 2.0 endpoints.
//!
//! [`TokenClient`] builds authorize URLs locally, exchanges authorization codes through
//! the `oauth2` crate (HTTP Basic client authentication), and verifies the issued token
//! against the character verification endpoint. All traffic flows through a
//! [`TokenHttpClient`] so hosts and tests can swap the transport.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthorizationCode, Client, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	ExtraTokenFields, HttpClientError, RequestTokenError, StandardRevocableToken,
	StandardTokenResponse, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
		BasicTokenType,
	},
	http::{
		Method, Request, StatusCode,
		header::{ACCEPT, AUTHORIZATION},
	},
};
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, Identity, Token},
	error::ConfigError,
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::{IdentityAuth, ProviderConfig},
};

/// Token response fields beyond the RFC 6749 set, kept verbatim.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTokenFields {
	/// Unmodeled fields keyed by their wire name.
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}
impl ExtraTokenFields for RawTokenFields {}

/// Token endpoint response shape used by the code exchange.
pub type EsiTokenResponse = StandardTokenResponse<RawTokenFields, BasicTokenType>;

type ConfiguredClient = Client<
	BasicErrorResponse,
	EsiTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;
type ExchangeError<E> = RequestTokenError<HttpClientError<E>, BasicErrorResponse>;

/// Boxed provider call future returned by [`TokenClient`].
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// OAuth 2.0 error payload (`{"error": ..., "error_description": ...}`).
#[derive(Debug, Deserialize)]
struct ErrorPayload {
	error: String,
	#[serde(default)]
	error_description: Option<String>,
}

/// Maps HTTP transport failures into strategy [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a strategy error.
	fn map_transport_error(
		&self,
		endpoint: &'static str,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: &'static str,
		_metadata: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(endpoint, *inner),
			HttpClientError::Http(inner) =>
				Error::transport(format_args!("invalid {endpoint} request: {inner}")),
			HttpClientError::Io(inner) => Error::transport(format_args!(
				"I/O error calling the {endpoint} endpoint: {inner}"
			)),
			HttpClientError::Other(message) =>
				Error::transport(format_args!("{endpoint} endpoint call failed: {message}")),
			_ => Error::transport(format_args!("{endpoint} endpoint call failed")),
		}
	}
}

/// Client for the provider's authorize, token, and verification endpoints.
///
/// The configuration and transport are shared read-only, so one client serves every
/// concurrent login.
pub struct TokenClient<C = ReqwestHttpClient, M = ReqwestTransportErrorMapper>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	config: Arc<ProviderConfig>,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl TokenClient {
	/// Creates a reqwest-backed client honoring the configured request timeout.
	pub fn new(config: ProviderConfig) -> Result<Self, ConfigError> {
		config.validate()?;

		let http_client = ReqwestHttpClient::with_timeout(config.request_timeout())?;

		Ok(Self::with_http_client(config, http_client, ReqwestTransportErrorMapper))
	}
}
impl<C, M> TokenClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: impl Into<Arc<ProviderConfig>>,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			config: config.into(),
			http_client: http_client.into(),
			error_mapper: error_mapper.into(),
		}
	}

	/// Provider configuration used by this client.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	/// Builds the provider authorize URL. No network call is made.
	///
	/// `scope` is sent verbatim; use
	/// [`ScopeDelimiter::join`](crate::provider::ScopeDelimiter::join) to assemble it from a list.
	/// `redirect_uri` is omitted when the configuration disables it.
	pub fn build_authorize_url(
		&self,
		scope: &str,
		state: Option<&str>,
		redirect_uri: Option<&Url>,
		client_override: Option<&ClientCredentials>,
	) -> Url {
		let client_id = client_override.map_or(self.config.client_id.as_str(), |c| c.id.as_str());
		let mut url = self.config.endpoints.authorization.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("client_id", client_id);

		if let Some(redirect) = redirect_uri.filter(|_| self.config.send_redirect_uri) {
			pairs.append_pair("redirect_uri", redirect.as_str());
		}

		pairs.append_pair("scope", scope);
		pairs.append_pair("response_type", "code");

		if let Some(state) = state {
			pairs.append_pair("state", state);
		}

		drop(pairs);

		url
	}

	/// Exchanges an authorization code for a [`Token`].
	///
	/// The request is a form POST authenticated with HTTP Basic client credentials. OAuth
	/// error payloads map to [`Error::ProviderRejected`], including ones delivered with a
	/// 2xx status and a null `access_token`.
	pub fn exchange_code_for_token<'a>(
		&'a self,
		code: &'a str,
		client_override: Option<&'a ClientCredentials>,
	) -> ClientFuture<'a, Token> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let oauth_client = self.oauth_client(client_override)?;
			let instrumented = self.http_client.with_metadata(meta.clone());
			let response = oauth_client
				.exchange_code(AuthorizationCode::new(code.to_owned()))
				.request_async(&instrumented)
				.await
				.map_err(|err| self.map_exchange_error(meta.take(), err))?;

			map_token_response(response)
		})
	}

	/// Fetches the verified identity for `token` from `verify_endpoint`.
	///
	/// HTTP 401 maps to [`Error::Unauthorized`]; any other non-2xx status maps to
	/// [`Error::ProviderError`].
	pub fn fetch_identity<'a>(
		&'a self,
		token: &'a Token,
		verify_endpoint: &'a Url,
	) -> ClientFuture<'a, Identity> {
		const ENDPOINT: &str = "verify";

		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let request =
				build_identity_request(self.config.identity_auth, token, verify_endpoint)?;
			let response = oauth2::AsyncHttpClient::call(&instrumented, request)
				.await
				.map_err(|err| {
					self.error_mapper.map_transport_error(ENDPOINT, meta.take().as_ref(), err)
				})?;
			let status = response.status();

			if status == StatusCode::UNAUTHORIZED {
				return Err(Error::Unauthorized);
			}
			if !status.is_success() {
				return Err(Error::ProviderError { status: status.as_u16() });
			}

			let value = serde_json::from_slice::<Value>(response.body()).map_err(|e| {
				Error::MalformedResponse { endpoint: ENDPOINT, reason: e.to_string() }
			})?;

			Identity::try_from(value).map_err(|_| Error::MalformedResponse {
				endpoint: ENDPOINT,
				reason: "expected a JSON object".into(),
			})
		})
	}

	fn oauth_client(
		&self,
		client_override: Option<&ClientCredentials>,
	) -> Result<ConfiguredClient> {
		let (id, secret) = match client_override {
			Some(credentials) => (credentials.id.as_str(), credentials.secret.expose()),
			None => (self.config.client_id.as_str(), self.config.client_secret.expose()),
		};
		let token_url = TokenUrl::new(self.config.endpoints.token.to_string()).map_err(|e| {
			Error::transport(ConfigError::InvalidEndpoint { endpoint: "token", source: e })
		})?;

		Ok(Client::new(ClientId::new(id.to_owned()))
			.set_client_secret(ClientSecret::new(secret.to_owned()))
			.set_auth_type(AuthType::BasicAuth)
			.set_token_uri(token_url))
	}

	fn map_exchange_error(
		&self,
		meta: Option<ResponseMetadata>,
		err: ExchangeError<C::TransportError>,
	) -> Error {
		const ENDPOINT: &str = "token";

		match err {
			RequestTokenError::ServerResponse(response) => Error::ProviderRejected {
				code: response.error().as_ref().to_owned(),
				description: response.error_description().cloned(),
			},
			RequestTokenError::Request(error) =>
				self.error_mapper.map_transport_error(ENDPOINT, meta.as_ref(), error),
			RequestTokenError::Parse(error, body) => {
				if let Ok(payload) = serde_json::from_slice::<ErrorPayload>(&body) {
					return Error::ProviderRejected {
						code: payload.error,
						description: payload.error_description,
					};
				}

				unexpected_status(meta.as_ref()).map_or_else(
					|| Error::MalformedResponse { endpoint: ENDPOINT, reason: error.to_string() },
					|status| Error::ProviderError { status },
				)
			},
			RequestTokenError::Other(message) => unexpected_status(meta.as_ref()).map_or_else(
				|| Error::MalformedResponse { endpoint: ENDPOINT, reason: message },
				|status| Error::ProviderError { status },
			),
		}
	}
}
impl<C, M> Debug for TokenClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenClient").field("config", &self.config).finish()
	}
}

fn map_token_response(response: EsiTokenResponse) -> Result<Token> {
	let mut builder = Token::builder()
		.access_token(response.access_token().secret().to_owned())
		.token_type(response.token_type().as_ref().to_owned())
		.raw_provider_fields(response.extra_fields().fields.clone());

	if let Some(refresh) = response.refresh_token() {
		builder = builder.refresh_token(refresh.secret().to_owned());
	}
	if let Some(lifetime) = response.expires_in() {
		let lifetime = Duration::try_from(lifetime).map_err(|e| Error::MalformedResponse {
			endpoint: "token",
			reason: e.to_string(),
		})?;

		builder = builder.expires_in(lifetime);
	}
	if let Some(scopes) = response.scopes() {
		builder = builder.scopes(scopes.iter().map(|scope| scope.to_string()));
	}

	builder
		.build()
		.map_err(|e| Error::MalformedResponse { endpoint: "token", reason: e.to_string() })
}

fn build_identity_request(
	auth: IdentityAuth,
	token: &Token,
	verify_endpoint: &Url,
) -> Result<oauth2::HttpRequest> {
	let mut url = verify_endpoint.clone();
	let mut request = Request::builder().method(Method::GET).header(ACCEPT, "application/json");

	match auth {
		IdentityAuth::Bearer => {
			request = request
				.header(AUTHORIZATION, format!("Bearer {}", token.access_token.expose()));
		},
		IdentityAuth::QueryParameter => {
			url.query_pairs_mut().append_pair("access_token", token.access_token.expose());
		},
	}

	request
		.uri(url.as_str())
		.body(Vec::new())
		.map_err(|e| Error::transport(format_args!("invalid verify request: {e}")))
}

fn unexpected_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|m| m.status).filter(|status| !(200..300).contains(status))
}

fn map_reqwest_error(endpoint: &'static str, err: ReqwestError) -> Error {
	if err.is_timeout() {
		return Error::transport(format_args!("request to the {endpoint} endpoint timed out"));
	}
	if err.is_connect() {
		return Error::transport(format_args!(
			"could not connect to the {endpoint} endpoint: {err}"
		));
	}

	Error::transport(format_args!("{endpoint} endpoint call failed: {err}"))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn client(config: ProviderConfig) -> TokenClient {
		TokenClient::new(config).expect("Token client should build.")
	}

	fn config() -> ProviderConfig {
		ProviderConfig::builder("client-id", "secret")
			.build()
			.expect("Configuration should build.")
	}

	fn query(url: &Url) -> HashMap<String, String> {
		url.query_pairs().into_owned().collect()
	}

	#[test]
	fn authorize_url_carries_required_parameters() {
		let client = client(config());
		let redirect = Url::parse("https://app.example.com/auth/eve/callback")
			.expect("Redirect URI should parse.");
		let url = client.build_authorize_url("publicData", Some("xyz"), Some(&redirect), None);
		let pairs = query(&url);

		assert!(url.as_str().starts_with("https://login.eveonline.com/oauth/authorize?"));
		assert_eq!(pairs.get("client_id").map(String::as_str), Some("client-id"));
		assert_eq!(pairs.get("redirect_uri").map(String::as_str), Some(redirect.as_str()));
		assert_eq!(pairs.get("scope").map(String::as_str), Some("publicData"));
		assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
		assert_eq!(pairs.get("state").map(String::as_str), Some("xyz"));
	}

	#[test]
	fn authorize_url_omits_absent_state_and_suppressed_redirect() {
		let config = ProviderConfig::builder("client-id", "secret")
			.send_redirect_uri(false)
			.build()
			.expect("Configuration should build.");
		let redirect =
			Url::parse("https://app.example.com/cb").expect("Redirect URI should parse.");
		let url = client(config).build_authorize_url("", None, Some(&redirect), None);
		let pairs = query(&url);

		assert!(!pairs.contains_key("state"));
		assert!(!pairs.contains_key("redirect_uri"));
		assert_eq!(pairs.get("scope").map(String::as_str), Some(""));
	}

	#[test]
	fn authorize_url_prefers_client_override() {
		let override_client = ClientCredentials::new("other-id", "other-secret");
		let url = client(config()).build_authorize_url("a,b", None, None, Some(&override_client));
		let pairs = query(&url);

		assert_eq!(pairs.get("client_id").map(String::as_str), Some("other-id"));
		assert_eq!(pairs.get("scope").map(String::as_str), Some("a,b"));
		assert!(url.as_str().contains("scope=a%2Cb"));
	}

	#[test]
	fn identity_request_places_token_per_configuration() {
		let token = Token::builder()
			.access_token("tkn")
			.token_type("bearer")
			.build()
			.expect("Token should build.");
		let verify = Url::parse("https://login.eveonline.com/oauth/verify")
			.expect("Verify URL should parse.");
		let bearer = build_identity_request(IdentityAuth::Bearer, &token, &verify)
			.expect("Bearer request should build.");

		assert_eq!(*bearer.method(), Method::GET);
		assert_eq!(
			bearer.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
			Some("Bearer tkn")
		);
		assert_eq!(bearer.uri().to_string(), "https://login.eveonline.com/oauth/verify");

		let query = build_identity_request(IdentityAuth::QueryParameter, &token, &verify)
			.expect("Query request should build.");

		assert!(query.headers().get(AUTHORIZATION).is_none());
		assert_eq!(
			query.uri().to_string(),
			"https://login.eveonline.com/oauth/verify?access_token=tkn"
		);
	}

	#[test]
	fn token_response_maps_expiry_scopes_and_raw_fields() {
		let response: EsiTokenResponse = serde_json::from_str(
			"{\"access_token\":\"a\",\"token_type\":\"Bearer\",\"expires_in\":1199,\
			\"refresh_token\":\"r\",\"scope\":\"x y\",\"character_id\":42}",
		)
		.expect("Token response fixture should parse.");
		let token = map_token_response(response).expect("Token should map.");

		assert_eq!(token.access_token.expose(), "a");
		assert_eq!(token.refresh_token.as_ref().map(|s| s.expose()), Some("r"));
		assert_eq!(token.token_type, "bearer");
		assert_eq!(token.scopes, vec!["x", "y"]);
		assert_eq!(token.raw_provider_fields.get("character_id"), Some(&Value::from(42)));
		assert!(token.expires_at.is_some_and(|at| at > token.issued_at));
	}
}
