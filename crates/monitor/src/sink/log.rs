use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use super::ProgressSink;

/// Sink that turns progress into `tracing` events.
#[derive(Debug, Default)]
pub struct LogSink {
	total: AtomicU64,
	worked: AtomicU64,
}

impl LogSink {
	/// Creates a sink with no task started.
	pub fn new() -> Self {
		Self::default()
	}
}

impl ProgressSink for LogSink {
	fn set_task_name(&self, name: &str) {
		debug!(task = name, "Progress task renamed");
	}

	fn begin_task(&self, name: &str, total_work: u64) {
		self.total.store(total_work, Ordering::Relaxed);
		self.worked.store(0, Ordering::Relaxed);
		debug!(task = name, total = total_work, "Progress started");
	}

	fn worked(&self, units: u64) {
		let worked = self.worked.fetch_add(units, Ordering::Relaxed).saturating_add(units);
		trace!(worked, total = self.total.load(Ordering::Relaxed), "Progress reported");
	}

	fn set_work_remaining(&self, units: u64) {
		trace!(remaining = units, "Progress rescaled");
	}

	fn sub_task(&self, name: &str) {
		trace!(subtask = name, "Progress subtask");
	}

	fn done(&self) {
		debug!(
			worked = self.worked.load(Ordering::Relaxed),
			total = self.total.load(Ordering::Relaxed),
			"Progress ended"
		);
	}

	fn is_canceled(&self) -> bool {
		false
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tracks_worked_units() {
		let _ = tracing_subscriber::fmt::try_init();
		let sink = LogSink::new();
		sink.begin_task("Indexing", 10);
		sink.worked(3);
		sink.worked(4);
		sink.set_work_remaining(3);
		sink.sub_task("lib");
		assert_eq!(sink.worked.load(Ordering::Relaxed), 7);
		sink.done();
		assert!(!sink.is_canceled());
	}
}
