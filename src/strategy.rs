//! Authorization flow controller driven by the host middleware.
//!
//! The host calls the lifecycle hooks of a [`Strategy`] in order:
//!
//! 1. [`Strategy::begin`] returns the authorize URL to redirect the user agent to.
//! 2. [`Strategy::handle_callback`] receives the redirect query parameters, exchanges the
//!    code, and verifies the character.
//! 3. [`Strategy::uid`], [`Strategy::credentials`], [`Strategy::info`], and
//!    [`Strategy::extra`] read the completed login.
//! 4. [`Strategy::cleanup`] discards per-login state.
//!
//! Each session belongs to exactly one login; create a new [`EsiStrategy`] per login and
//! share the underlying [`TokenClient`](crate::oauth::TokenClient).

pub mod esi;
pub mod failure;
pub mod output;
pub mod session;

pub use esi::*;
pub use failure::*;
pub use output::*;
pub use session::*;

// self
use crate::{_prelude::*, provider::ScopeDelimiter};

/// Boxed future returned by [`Strategy::handle_callback`].
pub type StrategyFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

/// Redirect query parameters delivered to the callback.
pub type CallbackParams = HashMap<String, String>;

/// Lifecycle hooks exposed to the host authentication middleware.
pub trait Strategy
where
	Self: Send,
{
	/// Records the pending request and returns the provider authorize URL.
	fn begin(&mut self, request: AuthorizeRequest) -> Url;

	/// Exchanges the returned code and verifies the character.
	///
	/// Failures are reported through the outcome and the failure sink; they never escape
	/// as a panic or an `Err`.
	fn handle_callback<'a>(
		&'a mut self,
		params: &'a CallbackParams,
	) -> StrategyFuture<'a, CallbackOutcome>;

	/// Unique character identifier.
	fn uid(&self) -> Result<String>;

	/// Normalized credentials.
	fn credentials(&self) -> Result<Credentials>;

	/// Normalized profile info.
	fn info(&self) -> Result<Info>;

	/// Raw token and identity.
	fn extra(&self) -> Result<Extra>;

	/// Clears all per-login state. Idempotent.
	fn cleanup(&mut self);
}

/// Inputs for [`Strategy::begin`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizeRequest {
	/// Callback URL the provider redirects back to.
	pub redirect_uri: Url,
	/// Requested scope string; the configured default applies when absent.
	pub scope: Option<String>,
	/// Opaque `state` to round-trip through the provider.
	pub state: Option<String>,
}
impl AuthorizeRequest {
	/// Creates a request with the configured default scope and no state.
	pub fn new(redirect_uri: Url) -> Self {
		Self { redirect_uri, scope: None, state: None }
	}

	/// Requests a pre-joined scope string.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Requests a scope list joined with `delimiter`.
	pub fn scopes<I, S>(mut self, scopes: I, delimiter: ScopeDelimiter) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.scope = Some(delimiter.join(scopes));

		self
	}

	/// Sets the `state` parameter.
	pub fn state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}
}

/// Result of [`Strategy::handle_callback`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackOutcome {
	/// Token and identity were obtained.
	Completed,
	/// The callback failed; the error was also reported to the failure sink.
	Failed(Error),
}
impl CallbackOutcome {
	/// Returns true for [`CallbackOutcome::Completed`].
	pub fn is_completed(&self) -> bool {
		matches!(self, Self::Completed)
	}

	/// Returns the failure, if any.
	pub fn error(&self) -> Option<&Error> {
		match self {
			Self::Completed => None,
			Self::Failed(error) => Some(error),
		}
	}

	/// Converts the outcome into a [`Result`].
	pub fn into_result(self) -> Result<()> {
		match self {
			Self::Completed => Ok(()),
			Self::Failed(error) => Err(error),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn authorize_request_joins_scope_lists() {
		let redirect =
			Url::parse("https://app.example.com/cb").expect("Redirect URI should parse.");
		let request = AuthorizeRequest::new(redirect.clone())
			.scopes(["esi-skills.read_skills.v1", "publicData"], ScopeDelimiter::Space)
			.state("xyz");

		assert_eq!(request.redirect_uri, redirect);
		assert_eq!(request.scope.as_deref(), Some("esi-skills.read_skills.v1 publicData"));
		assert_eq!(request.state.as_deref(), Some("xyz"));
	}

	#[test]
	fn outcome_exposes_error() {
		assert!(CallbackOutcome::Completed.is_completed());
		assert_eq!(CallbackOutcome::Completed.into_result(), Ok(()));

		let failed = CallbackOutcome::Failed(Error::MissingCode);

		assert_eq!(failed.error(), Some(&Error::MissingCode));
		assert_eq!(failed.into_result(), Err(Error::MissingCode));
	}
}
