//! Optional observability helpers for cache operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `spotify_app_token.cache` with the `op`
//!   and `stage` fields, plus events when a refresh fails.
//! - Enable `metrics` to increment the `spotify_app_token_cache_total` counter for every
//!   attempt/hit/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Cache operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheOp {
	/// A caller asking for a valid credential.
	GetCredential,
	/// A single exchange against the credential source.
	Refresh,
}
impl CacheOp {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheOp::GetCredential => "get_credential",
			CacheOp::Refresh => "refresh",
		}
	}
}
impl Display for CacheOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheOutcome {
	/// Entry to a cache operation.
	Attempt,
	/// Served from the cached credential without contacting the source.
	Hit,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CacheOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheOutcome::Attempt => "attempt",
			CacheOutcome::Hit => "hit",
			CacheOutcome::Success => "success",
			CacheOutcome::Failure => "failure",
		}
	}
}
impl Display for CacheOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
