// self
use crate::{_prelude::*, obs::CacheOp};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by cache operations.
#[derive(Clone, Debug)]
pub struct CacheSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CacheSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(op: CacheOp, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("spotify_app_token.cache", op = op.as_str(), stage);

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

	/// Records a refresh failure as an event inside the span.
	pub fn record_failure(&self, error: &Error) {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(|| tracing::warn!(error = %error, "credential refresh failed"));
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = error;
		}
	}

	/// Records a stored credential's validity window inside the span.
	pub fn record_refreshed(&self, valid_for: Duration) {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(|| {
				tracing::debug!(valid_for_secs = valid_for.whole_seconds(), "credential refreshed")
			});
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = valid_for;
		}
	}
}
