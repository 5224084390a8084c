//! EVE Online SSO implementation of [`Strategy`].

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, Identity, Token},
	error::ConfigError,
	http::{ReqwestHttpClient, TokenHttpClient},
	oauth::{ReqwestTransportErrorMapper, TokenClient, TransportErrorMapper},
	obs::{PhaseKind, PhaseSpan},
	provider::ProviderConfig,
	strategy::{
		Auth, AuthFailure, AuthorizeRequest, CallbackOutcome, CallbackParams, Credentials, Extra,
		FailureSink, Info, Session, Strategy, StrategyFuture,
	},
};

/// Provider label carried by [`Auth`].
pub const PROVIDER_NAME: &str = "esi";

const STATE_LEN: usize = 32;

/// Login controller for a single EVE Online SSO session.
pub struct EsiStrategy<C = ReqwestHttpClient, M = ReqwestTransportErrorMapper>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client: Arc<TokenClient<C, M>>,
	session: Session,
	client_override: Option<ClientCredentials>,
	failure_sink: Option<Arc<dyn FailureSink>>,
}
impl EsiStrategy {
	/// Builds a reqwest-backed strategy straight from configuration.
	pub fn from_config(config: ProviderConfig) -> Result<Self, ConfigError> {
		Ok(Self::new(Arc::new(TokenClient::new(config)?)))
	}
}
impl<C, M> EsiStrategy<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a fresh session on top of a shared token client.
	pub fn new(client: Arc<TokenClient<C, M>>) -> Self {
		Self { client, session: Session::default(), client_override: None, failure_sink: None }
	}

	/// Reports callback failures to `sink`.
	pub fn with_failure_sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
		self.failure_sink = Some(sink);

		self
	}

	/// Uses `credentials` instead of the configured client for this login.
	pub fn with_client_override(mut self, credentials: ClientCredentials) -> Self {
		self.client_override = Some(credentials);

		self
	}

	/// Requires the callback to echo `state`.
	///
	/// Hosts that persist the pending state across requests use this on the session that
	/// handles the redirect.
	pub fn expect_state(&mut self, state: impl Into<String>) {
		self.session.expect_state(state.into());
	}

	/// Shared token client.
	pub fn client(&self) -> &Arc<TokenClient<C, M>> {
		&self.client
	}

	/// Current session state.
	pub fn session(&self) -> &Session {
		&self.session
	}

	/// Bundles every view of a completed login.
	pub fn auth(&self) -> Result<Auth> {
		Ok(Auth {
			provider: PROVIDER_NAME.to_owned(),
			uid: self.uid()?,
			credentials: self.credentials()?,
			info: self.info()?,
			extra: self.extra()?,
		})
	}

	fn validate_callback<'p>(&self, params: &'p CallbackParams) -> Result<&'p str> {
		let code = params
			.get("code")
			.map(String::as_str)
			.filter(|code| !code.is_empty())
			.ok_or(Error::MissingCode)?;

		let state = params.get("state").map(String::as_str);

		if self.session.expected_state().is_some_and(|expected| state != Some(expected)) {
			return Err(Error::StateMismatch);
		}

		Ok(code)
	}

	fn fail(&mut self, span: &PhaseSpan, error: Error) -> CallbackOutcome {
		self.session.fail(&error);
		span.fail(&error);

		if let Some(sink) = &self.failure_sink {
			sink.report(&AuthFailure::from(&error));
		}

		CallbackOutcome::Failed(error)
	}
}
impl<C, M> Strategy for EsiStrategy<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn begin(&mut self, request: AuthorizeRequest) -> Url {
		let span = PhaseSpan::start(PhaseKind::Request, "begin");
		let _guard = span.enter();
		let config = self.client.config();
		let scope = request.scope.unwrap_or_else(|| config.default_scope.clone());
		let state = request.state.or_else(|| config.csrf_state.then(random_state));
		let url = self.client.build_authorize_url(
			&scope,
			state.as_deref(),
			Some(&request.redirect_uri),
			self.client_override.as_ref(),
		);

		self.session.begin(scope, state, config.csrf_state);
		span.succeed();

		url
	}

	fn handle_callback<'a>(
		&'a mut self,
		params: &'a CallbackParams,
	) -> StrategyFuture<'a, CallbackOutcome> {
		Box::pin(async move {
			let span = PhaseSpan::start(PhaseKind::Callback, "handle_callback");
			let code = match self.validate_callback(params) {
				Ok(code) => code,
				Err(e) => return self.fail(&span, e),
			};

			self.session.mark_in_flight();

			let login = exchange_and_verify(&*self.client, code, self.client_override.as_ref());

			match span.instrument(login).await {
				Ok((token, identity)) => {
					self.session.complete(token, identity);
					span.succeed();

					CallbackOutcome::Completed
				},
				Err(e) => self.fail(&span, e),
			}
		})
	}

	fn uid(&self) -> Result<String> {
		let (_, identity) = self.session.completed()?;
		let field = &self.client.config().uid_field;

		identity.get_string(field).ok_or_else(|| Error::MissingUidField { field: field.clone() })
	}

	fn credentials(&self) -> Result<Credentials> {
		let (token, identity) = self.session.completed()?;

		Ok(Credentials::from_parts(self.client.config(), token, identity))
	}

	fn info(&self) -> Result<Info> {
		let (_, identity) = self.session.completed()?;

		Ok(Info::from_identity(self.client.config(), identity))
	}

	fn extra(&self) -> Result<Extra> {
		let (token, identity) = self.session.completed()?;

		Ok(Extra { token: token.clone(), identity: identity.clone() })
	}

	fn cleanup(&mut self) {
		let span = PhaseSpan::start(PhaseKind::Cleanup, "cleanup");
		let _guard = span.enter();

		self.session.reset();
		span.succeed();
	}
}
impl<C, M> Debug for EsiStrategy<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("EsiStrategy")
			.field("client", &self.client)
			.field("session", &self.session)
			.field("client_override", &self.client_override.as_ref().map(|c| &c.id))
			.field("failure_sink", &self.failure_sink.is_some())
			.finish()
	}
}

async fn exchange_and_verify<C, M>(
	client: &TokenClient<C, M>,
	code: &str,
	client_override: Option<&ClientCredentials>,
) -> Result<(Token, Identity)>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let token = client.exchange_code_for_token(code, client_override).await?;
	let identity = client.fetch_identity(&token, &client.config().endpoints.verify).await?;

	Ok((token, identity))
}

fn random_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}
