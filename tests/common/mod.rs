#![allow(dead_code)]

// std
use std::{
	collections::HashMap,
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use httpmock::MockServer;
// self
use esi_auth::{
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	oauth::{
		TokenClient, TransportErrorMapper,
		oauth2::{
			AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
			http::{HeaderValue, header::CONTENT_TYPE},
		},
	},
	provider::{ProviderConfig, ProviderConfigBuilder},
	strategy::{CallbackParams, EsiStrategy},
	url::Url,
};

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
/// `Basic base64("client-it:secret-it")`.
pub const BASIC_AUTH: &str = "Basic Y2xpZW50LWl0OnNlY3JldC1pdA==";
pub const TOKEN_BODY: &str = "{\"access_token\":\"access-ok\",\"token_type\":\"Bearer\",\
	\"expires_in\":1199,\"refresh_token\":\"refresh-ok\"}";

pub fn redirect_uri() -> Url {
	Url::parse("https://app.example.com/auth/eve/callback").expect("Redirect URI should parse.")
}

pub fn params(pairs: &[(&str, &str)]) -> CallbackParams {
	pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

pub fn query(url: &Url) -> HashMap<String, String> {
	url.query_pairs().into_owned().collect()
}

/// Configuration builder whose endpoints all live on `server`.
pub fn config_for(server: &MockServer) -> ProviderConfigBuilder {
	ProviderConfig::builder(CLIENT_ID, CLIENT_SECRET)
		.site(Url::parse(&server.url("/")).expect("Mock server URL should parse."))
}

pub fn strategy_for(config: ProviderConfig) -> EsiStrategy {
	EsiStrategy::from_config(config).expect("Strategy should build.")
}

#[derive(Debug)]
pub enum FakeTransportError {
	Refused,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Refused => write!(f, "Connection refused."),
		}
	}
}
impl StdError for FakeTransportError {}

/// Transport that never touches the network and counts every request it receives.
#[derive(Clone, Default)]
pub struct FakeHttpClient {
	calls: Arc<AtomicUsize>,
	responses: Arc<Vec<(u16, String)>>,
	stalled: bool,
}
impl FakeHttpClient {
	/// Answers the n-th request with the n-th response; refuses once they run out.
	pub fn scripted(responses: Vec<(u16, String)>) -> Self {
		Self { calls: Arc::default(), responses: Arc::new(responses), stalled: false }
	}

	/// Accepts requests but never answers them.
	pub fn stalled() -> Self {
		Self { stalled: true, ..Self::default() }
	}

	pub fn refusing() -> Self {
		Self::default()
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl TokenHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, client: self.clone() }
	}
}

pub struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	client: FakeHttpClient,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, _request: HttpRequest) -> Self::Future {
		let index = self.client.calls.fetch_add(1, Ordering::SeqCst);
		let scripted = self.client.responses.get(index).cloned();
		let slot = self.slot.clone();
		let stalled = self.client.stalled;

		Box::pin(async move {
			slot.take();

			if stalled {
				std::future::pending::<()>().await;
			}

			let (status, body) = scripted
				.ok_or_else(|| HttpClientError::Other(FakeTransportError::Refused.to_string()))?;
			let mut response = HttpResponse::new(body.into_bytes());

			*response.status_mut() = status.try_into().map_err(|_| {
				HttpClientError::Other(format!("Invalid scripted status {status}."))
			})?;
			response
				.headers_mut()
				.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
			slot.store(ResponseMetadata { status: Some(status) });

			Ok::<_, HttpClientError<FakeTransportError>>(response)
		})
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FakeErrorMapper;
impl TransportErrorMapper<FakeTransportError> for FakeErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: &'static str,
		_metadata: Option<&ResponseMetadata>,
		error: HttpClientError<FakeTransportError>,
	) -> esi_auth::error::Error {
		esi_auth::error::Error::transport(format_args!("{endpoint}: {error}"))
	}
}

pub fn fake_client(
	config: ProviderConfig,
	http: FakeHttpClient,
) -> Arc<TokenClient<FakeHttpClient, FakeErrorMapper>> {
	Arc::new(TokenClient::with_http_client(config, http, FakeErrorMapper))
}

pub fn offline_config() -> ProviderConfig {
	ProviderConfig::builder(CLIENT_ID, CLIENT_SECRET).build().expect("Configuration should build.")
}
