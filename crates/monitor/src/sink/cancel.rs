use tokio_util::sync::CancellationToken;

use super::ProgressSink;

/// Sink wrapper that is also canceled through a [`CancellationToken`].
///
/// The token can be cancelled from any thread; [`is_canceled`] reports true
/// once either the token or the inner sink is canceled.
///
/// [`is_canceled`]: ProgressSink::is_canceled
#[derive(Debug, Clone)]
pub struct Cancellable<S> {
	inner: S,
	cancel: CancellationToken,
}

impl<S: ProgressSink> Cancellable<S> {
	/// Wraps `inner` with a fresh token.
	pub fn new(inner: S) -> Self {
		Self::with_token(inner, CancellationToken::new())
	}

	/// Wraps `inner` with an existing token.
	pub fn with_token(inner: S, cancel: CancellationToken) -> Self {
		Self { inner, cancel }
	}

	/// Returns the token driving cancellation.
	pub fn token(&self) -> &CancellationToken {
		&self.cancel
	}

	/// Returns the wrapped sink.
	pub fn inner(&self) -> &S {
		&self.inner
	}
}

impl<S: ProgressSink> ProgressSink for Cancellable<S> {
	fn set_task_name(&self, name: &str) {
		self.inner.set_task_name(name);
	}

	fn begin_task(&self, name: &str, total_work: u64) {
		self.inner.begin_task(name, total_work);
	}

	fn worked(&self, units: u64) {
		self.inner.worked(units);
	}

	fn set_work_remaining(&self, units: u64) {
		self.inner.set_work_remaining(units);
	}

	fn sub_task(&self, name: &str) {
		self.inner.sub_task(name);
	}

	fn done(&self) {
		self.inner.done();
	}

	fn is_canceled(&self) -> bool {
		self.cancel.is_cancelled() || self.inner.is_canceled()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sink::{NullSink, StatusSink};

	#[test]
	fn token_cancels_from_other_thread() {
		let sink = Cancellable::new(NullSink);
		let token = sink.token().clone();
		assert!(!sink.is_canceled());
		std::thread::spawn(move || token.cancel()).join().unwrap();
		assert!(sink.is_canceled());
	}

	#[test]
	fn inner_cancellation_still_counts() {
		let status = StatusSink::new();
		let sink = Cancellable::new(status.clone());
		status.cancel();
		assert!(sink.is_canceled());
		assert!(!sink.token().is_cancelled());
	}

	#[test]
	fn child_token_follows_parent() {
		let parent = CancellationToken::new();
		let sink = Cancellable::with_token(NullSink, parent.child_token());
		parent.cancel();
		assert!(sink.is_canceled());
	}

	#[test]
	fn forwards_progress() {
		let status = StatusSink::new();
		let sink = Cancellable::new(status.clone());
		sink.begin_task("Checking", 10);
		sink.worked(4);
		sink.sub_task("Types");
		assert_eq!(sink.inner().status_line(), "Checking: Types (40%)");
	}
}
