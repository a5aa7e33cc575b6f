//! Rate-limited sampling of expensive queries.
//!
//! The sampler reads time from a [`Clock`], so the wall clock can be swapped
//! for a [`ManualClock`] in tests instead of sleeping.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Time source for [`RateLimited`].
pub trait Clock {
	/// Returns the current instant.
	fn now(&self) -> Instant;
}

/// Wall clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> Instant {
		Instant::now()
	}
}

/// Manually advanced time source.
///
/// Clones share the same instant, so a test can keep one handle and give the
/// other to the code under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
	now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
	fn default() -> Self {
		Self::new()
	}
}

impl ManualClock {
	/// Creates a clock frozen at the current wall clock instant.
	pub fn new() -> Self {
		Self::starting_at(Instant::now())
	}

	/// Creates a clock frozen at `start`.
	pub fn starting_at(start: Instant) -> Self {
		Self {
			now: Arc::new(Mutex::new(start)),
		}
	}

	/// Moves time forward.
	pub fn advance(&self, by: Duration) {
		*self.now.lock() += by;
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Instant {
		*self.now.lock()
	}
}

impl<C: Clock + ?Sized> Clock for &C {
	fn now(&self) -> Instant {
		(**self).now()
	}
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
	fn now(&self) -> Instant {
		(**self).now()
	}
}

/// Caches the result of a query and re-runs it at most once per interval.
#[derive(Debug, Clone)]
pub struct RateLimited<T> {
	interval: Duration,
	next_poll: Option<Instant>,
	last: Option<T>,
}

impl<T: Clone> RateLimited<T> {
	/// Creates a sampler that has not sampled yet.
	pub fn new(interval: Duration) -> Self {
		Self {
			interval,
			next_poll: None,
			last: None,
		}
	}

	/// Returns the configured interval.
	pub const fn interval(&self) -> Duration {
		self.interval
	}

	/// Returns the cached value while `now` is inside the current window,
	/// otherwise runs `poll`, caches its result and opens a new window.
	pub fn sample(&mut self, now: Instant, poll: impl FnOnce() -> T) -> T {
		if let (Some(deadline), Some(last)) = (self.next_poll, self.last.as_ref())
			&& now < deadline
		{
			return last.clone();
		}
		let value = poll();
		self.next_poll = Some(now + self.interval);
		self.last = Some(value.clone());
		value
	}

	/// Returns the last sampled value, if any.
	pub fn last(&self) -> Option<&T> {
		self.last.as_ref()
	}

	/// Forgets the cached value so the next sample polls.
	pub fn reset(&mut self) {
		self.next_poll = None;
		self.last = None;
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;

	#[test]
	fn first_sample_polls() {
		let clock = ManualClock::new();
		let mut sampler = RateLimited::new(Duration::from_millis(100));
		assert_eq!(sampler.last(), None);
		assert!(sampler.sample(clock.now(), || true));
		assert_eq!(sampler.last(), Some(&true));
	}

	#[test]
	fn samples_inside_window_are_cached() {
		let clock = ManualClock::new();
		let polls = Cell::new(0);
		let mut sampler = RateLimited::new(Duration::from_millis(100));
		let poll = |value: bool| {
			polls.set(polls.get() + 1);
			value
		};

		assert!(!sampler.sample(clock.now(), || poll(false)));
		clock.advance(Duration::from_millis(50));
		assert!(!sampler.sample(clock.now(), || poll(true)));
		clock.advance(Duration::from_millis(49));
		assert!(!sampler.sample(clock.now(), || poll(true)));
		assert_eq!(polls.get(), 1);

		clock.advance(Duration::from_millis(1));
		assert!(sampler.sample(clock.now(), || poll(true)));
		assert_eq!(polls.get(), 2);
	}

	#[test]
	fn reset_forces_poll() {
		let clock = ManualClock::new();
		let mut sampler = RateLimited::new(Duration::from_secs(10));
		assert_eq!(sampler.sample(clock.now(), || 1), 1);
		assert_eq!(sampler.sample(clock.now(), || 2), 1);
		sampler.reset();
		assert_eq!(sampler.sample(clock.now(), || 3), 3);
	}

	#[test]
	fn zero_interval_always_polls() {
		let clock = ManualClock::new();
		let mut sampler = RateLimited::new(Duration::ZERO);
		assert_eq!(sampler.sample(clock.now(), || 1), 1);
		assert_eq!(sampler.sample(clock.now(), || 2), 2);
	}

	#[test]
	fn manual_clock_clones_share_time() {
		let clock = ManualClock::new();
		let other = clock.clone();
		let before = other.now();
		clock.advance(Duration::from_secs(1));
		assert_eq!(other.now() - before, Duration::from_secs(1));
	}
}
