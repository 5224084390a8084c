//! Failure records handed to the host.

// self
use crate::_prelude::*;

/// Structured failure reported through a [`FailureSink`] and kept on the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFailure {
	/// Stable key (`missing_code`, the provider's OAuth `error` code, `unauthorized`, ...).
	pub key: String,
	/// Human-readable message. Never contains token or secret material.
	pub message: String,
}
impl From<&Error> for AuthFailure {
	fn from(error: &Error) -> Self {
		Self { key: error.failure_key().to_owned(), message: error.to_string() }
	}
}

/// Host-provided receiver for callback failures.
pub trait FailureSink
where
	Self: Send + Sync,
{
	/// Called once for every failed callback.
	fn report(&self, failure: &AuthFailure);
}
impl<F> FailureSink for F
where
	F: Send + Sync + Fn(&AuthFailure),
{
	fn report(&self, failure: &AuthFailure) {
		self(failure)
	}
}

/// In-memory sink that keeps every reported failure.
#[derive(Debug, Default)]
pub struct CollectingSink(Mutex<Vec<AuthFailure>>);
impl CollectingSink {
	/// Returns a snapshot of the collected failures.
	pub fn failures(&self) -> Vec<AuthFailure> {
		self.0.lock().clone()
	}
}
impl FailureSink for CollectingSink {
	fn report(&self, failure: &AuthFailure) {
		self.0.lock().push(failure.clone());
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn failure_uses_provider_code_as_key() {
		let failure = AuthFailure::from(&Error::ProviderRejected {
			code: "invalid_grant".into(),
			description: Some("x".into()),
		});

		assert_eq!(failure.key, "invalid_grant");
		assert_eq!(failure.message, "Provider rejected the request: invalid_grant (x).");
	}

	#[test]
	fn collecting_sink_keeps_order() {
		let sink = CollectingSink::default();

		sink.report(&AuthFailure::from(&Error::MissingCode));
		sink.report(&AuthFailure::from(&Error::Unauthorized));

		let keys = sink.failures().into_iter().map(|f| f.key).collect::<Vec<_>>();

		assert_eq!(keys, ["missing_code", "unauthorized"]);
	}
}
