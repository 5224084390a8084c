//! Login lifecycle observability.
//!
//! Every lifecycle hook runs inside a [`PhaseSpan`], which counts the attempt on entry and
//! records how the hook ended.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit `esi_auth.phase` spans with the `phase`, `stage`,
//!   `outcome`, and `failure` fields. A failed callback also emits a `warn` event inside its span.
//! - Enable `metrics` to increment `esi_auth_phase_total`, labeled by `phase`, `outcome`, and
//!   `failure`. Provider rejection codes collapse into a single `provider_rejected` label.

// self
use crate::_prelude::*;

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedPhase<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedPhase<F> = F;

const METRIC_NAME: &str = "esi_auth_phase_total";
const NO_FAILURE: &str = "none";

/// Lifecycle phases driven by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
	/// Authorize redirect construction.
	Request,
	/// Code exchange and character verification.
	Callback,
	/// Session teardown.
	Cleanup,
}
impl PhaseKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			PhaseKind::Request => "request",
			PhaseKind::Callback => "callback",
			PhaseKind::Cleanup => "cleanup",
		}
	}
}
impl Display for PhaseKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One lifecycle hook, from entry to its outcome.
#[derive(Clone, Debug)]
pub struct PhaseSpan {
	kind: PhaseKind,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl PhaseSpan {
	/// Opens the span for `kind` and counts the attempt.
	pub fn start(kind: PhaseKind, stage: &'static str) -> Self {
		count(kind, "attempt", NO_FAILURE);

		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"esi_auth.phase",
				phase = kind.as_str(),
				stage,
				outcome = tracing::field::Empty,
				failure = tracing::field::Empty,
			);

			Self { kind, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self { kind }
		}
	}

	/// Phase this span tracks.
	pub fn kind(&self) -> PhaseKind {
		self.kind
	}

	/// Enters the span for synchronous sections.
	pub fn enter(&self) -> PhaseSpanGuard<'_> {
		#[cfg(feature = "tracing")]
		{
			PhaseSpanGuard { _entered: self.span.enter() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			PhaseSpanGuard { _span: std::marker::PhantomData }
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedPhase<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Marks the hook as completed.
	pub fn succeed(&self) {
		#[cfg(feature = "tracing")]
		self.span.record("outcome", "success");

		count(self.kind, "success", NO_FAILURE);
	}

	/// Marks the hook as failed with `error`. Never logs secrets.
	pub fn fail(&self, error: &Error) {
		#[cfg(feature = "tracing")]
		{
			let failure = error.failure_key();

			self.span.record("outcome", "failure");
			self.span.record("failure", failure);
			self.span.in_scope(|| tracing::warn!(failure, %error, "Login phase failed."));
		}

		count(self.kind, "failure", failure_label(error));
	}
}

/// RAII guard returned by [`PhaseSpan::enter`].
pub struct PhaseSpanGuard<'a> {
	#[cfg(feature = "tracing")]
	_entered: tracing::span::Entered<'a>,
	#[cfg(not(feature = "tracing"))]
	_span: std::marker::PhantomData<&'a PhaseSpan>,
}
impl Debug for PhaseSpanGuard<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PhaseSpanGuard(..)")
	}
}

/// Metric label for a failure.
///
/// Provider rejection codes come from the remote server, so they share one label to keep the
/// counter's cardinality bounded. Every other failure uses its [`Error::failure_key`].
pub fn failure_label(error: &Error) -> &str {
	match error {
		Error::ProviderRejected { .. } => "provider_rejected",
		other => other.failure_key(),
	}
}

fn count(kind: PhaseKind, outcome: &'static str, failure: &str) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		METRIC_NAME,
		"phase" => kind.as_str(),
		"outcome" => outcome,
		"failure" => failure.to_owned()
	)
	.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (METRIC_NAME, kind, outcome, failure);
}
