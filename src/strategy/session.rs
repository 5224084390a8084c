//! Per-login session state owned by the controller.

// self
use crate::{
	_prelude::*,
	auth::{Identity, Token},
	strategy::AuthFailure,
};

/// Lifecycle position of a login session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
	/// Nothing has happened yet, or the session was cleaned up.
	#[default]
	Idle,
	/// The authorize URL was issued; waiting for the redirect.
	AwaitingCallback,
	/// Token and identity are available.
	Completed,
	/// The callback failed; see [`Session::errors`].
	Failed,
}

/// State for exactly one login attempt.
///
/// Token and identity are present only in [`Phase::Completed`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
	phase: Phase,
	pending_scope: Option<String>,
	pending_state: Option<String>,
	expected_state: Option<String>,
	token: Option<Token>,
	identity: Option<Identity>,
	errors: Vec<AuthFailure>,
}
impl Session {
	/// Current lifecycle phase.
	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// Scope sent with the last authorize URL.
	pub fn pending_scope(&self) -> Option<&str> {
		self.pending_scope.as_deref()
	}

	/// `state` sent with the last authorize URL.
	pub fn pending_state(&self) -> Option<&str> {
		self.pending_state.as_deref()
	}

	/// `state` the callback must echo, when verification is active.
	pub fn expected_state(&self) -> Option<&str> {
		self.expected_state.as_deref()
	}

	/// Token obtained by a completed callback.
	pub fn token(&self) -> Option<&Token> {
		self.token.as_ref()
	}

	/// Identity obtained by a completed callback.
	pub fn identity(&self) -> Option<&Identity> {
		self.identity.as_ref()
	}

	/// Failures recorded by the last callback.
	pub fn errors(&self) -> &[AuthFailure] {
		&self.errors
	}

	/// Token and identity of a completed login, or [`Error::InvalidState`].
	pub fn completed(&self) -> Result<(&Token, &Identity)> {
		match (self.phase, &self.token, &self.identity) {
			(Phase::Completed, Some(token), Some(identity)) => Ok((token, identity)),
			_ => Err(Error::InvalidState),
		}
	}

	pub(crate) fn begin(&mut self, scope: String, state: Option<String>, verify_state: bool) {
		self.expected_state = state.clone().filter(|_| verify_state);
		self.phase = Phase::AwaitingCallback;
		self.pending_scope = Some(scope);
		self.pending_state = state;
		self.token = None;
		self.identity = None;
		self.errors.clear();
	}

	pub(crate) fn expect_state(&mut self, state: String) {
		self.expected_state = Some(state);
	}

	/// Pre-records an interruption so a dropped callback future leaves the session failed.
	pub(crate) fn mark_in_flight(&mut self) {
		self.fail(&Error::transport("callback interrupted before completion"));
	}

	pub(crate) fn complete(&mut self, token: Token, identity: Identity) {
		self.phase = Phase::Completed;
		self.token = Some(token);
		self.identity = Some(identity);
		self.errors.clear();
	}

	pub(crate) fn fail(&mut self, error: &Error) {
		self.phase = Phase::Failed;
		self.token = None;
		self.identity = None;
		self.errors = vec![AuthFailure::from(error)];
	}

	pub(crate) fn reset(&mut self) {
		*self = Self::default();
	}
}
