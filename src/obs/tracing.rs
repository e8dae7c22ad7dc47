// self
use crate::{_prelude::*, obs::SessionOp};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by session operations.
#[derive(Clone, Debug)]
pub struct SessionSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl SessionSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(op: SessionOp, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("repairdesk.session", op = op.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (op, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
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
}

/// Logs a failure the crate deliberately swallows (storage hiccups, inconclusive validation).
pub fn swallowed(op: SessionOp, what: &'static str, err: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(op = op.as_str(), what, error = %err, "recovered locally");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (op, what, err);
	}
}

/// Logs a user-facing notice at the level matching its severity.
pub fn notice(kind: &'static str, title: &str, message: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(kind, title, message, "user notice");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, title, message);
	}
}

/// Logs a session state transition at debug level.
pub fn transition(op: SessionOp, state: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(op = op.as_str(), state, "session state changed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (op, state);
	}
}
