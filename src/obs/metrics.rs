// self
use crate::obs::{CacheOp, CacheOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_cache_outcome(op: CacheOp, outcome: CacheOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"spotify_app_token_cache_total",
			"op" => op.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (op, outcome);
	}
}
