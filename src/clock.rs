//! Time sources consulted by the cache when judging credential validity.

// self
use crate::_prelude::*;

/// Supplies the current instant.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Returns the current UTC instant.
	fn now(&self) -> OffsetDateTime;
}

/// Wall clock backed by [`OffsetDateTime::now_utc`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Manually advanced clock for tests and simulations.
#[derive(Debug)]
pub struct ManualClock(Mutex<OffsetDateTime>);
impl ManualClock {
	/// Creates a clock frozen at `instant`.
	pub fn new(instant: OffsetDateTime) -> Self {
		Self(Mutex::new(instant))
	}

	/// Moves the clock to `instant`.
	pub fn set(&self, instant: OffsetDateTime) {
		*self.0.lock() = instant;
	}

	/// Moves the clock forward (or backward for negative deltas).
	pub fn advance(&self, delta: Duration) {
		*self.0.lock() += delta;
	}
}
impl Default for ManualClock {
	fn default() -> Self {
		Self::new(OffsetDateTime::UNIX_EPOCH)
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.0.lock()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn manual_clock_moves_only_when_told() {
		let clock = ManualClock::default();
		let start = clock.now();

		assert_eq!(clock.now(), start);

		clock.advance(Duration::seconds(3569));

		assert_eq!(clock.now() - start, Duration::seconds(3569));

		clock.set(start);

		assert_eq!(clock.now(), start);
	}
}
