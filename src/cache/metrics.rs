// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for cache activity.
#[derive(Debug, Default)]
pub struct CacheMetrics {
	hits: AtomicU64,
	source_calls: AtomicU64,
	refreshes: AtomicU64,
	failures: AtomicU64,
}
impl CacheMetrics {
	/// Returns the number of calls served from the cached credential.
	pub fn hits(&self) -> u64 {
		self.hits.load(Ordering::Relaxed)
	}

	/// Returns the number of times the credential source was invoked.
	pub fn source_calls(&self) -> u64 {
		self.source_calls.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshes that stored a new credential.
	pub fn refreshes(&self) -> u64 {
		self.refreshes.load(Ordering::Relaxed)
	}

	/// Returns the number of failed refresh attempts (missing identity included).
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_hit(&self) {
		self.hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_source_call(&self) {
		self.source_calls.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh(&self) {
		self.refreshes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}
