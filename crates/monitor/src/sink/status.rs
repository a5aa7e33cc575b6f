use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use super::ProgressSink;

/// Point-in-time view of a [`StatusSink`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
	/// Visible task name.
	pub task: String,
	/// Current sub task label, if any.
	pub subtask: Option<String>,
	/// Units declared by `begin_task`.
	pub total: u64,
	/// Units reported so far.
	pub worked: u64,
	/// Whether the task finished.
	pub done: bool,
}

impl ProgressSnapshot {
	/// Percentage done (0-100), or `None` when no total is known.
	pub fn percentage(&self) -> Option<u32> {
		if self.total == 0 {
			return None;
		}
		let pct = self.worked.min(self.total).saturating_mul(100) / self.total;
		Some(pct as u32)
	}

	/// Formats the snapshot as a one-line status message.
	pub fn status_line(&self) -> String {
		let mut line = self.task.clone();
		if let Some(subtask) = self.subtask.as_deref().filter(|s| !s.is_empty()) {
			line.push_str(": ");
			line.push_str(subtask);
		}
		if let Some(pct) = self.percentage() {
			line.push_str(&format!(" ({pct}%)"));
		}
		line
	}
}

/// Sink that records progress into a shared [`ProgressSnapshot`].
///
/// Clones share the same state, so one handle can feed a
/// [`Monitor`](crate::Monitor) while another is read by a status bar.
#[derive(Debug, Clone, Default)]
pub struct StatusSink {
	state: Arc<RwLock<ProgressSnapshot>>,
	canceled: Arc<AtomicBool>,
}

impl StatusSink {
	/// Creates an empty sink.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the current state.
	pub fn snapshot(&self) -> ProgressSnapshot {
		self.state.read().clone()
	}

	/// Returns the current status line.
	pub fn status_line(&self) -> String {
		self.state.read().status_line()
	}

	/// Requests cancellation.
	pub fn cancel(&self) {
		self.canceled.store(true, Ordering::Relaxed);
	}
}

impl ProgressSink for StatusSink {
	fn set_task_name(&self, name: &str) {
		self.state.write().task = name.to_string();
	}

	fn begin_task(&self, name: &str, total_work: u64) {
		*self.state.write() = ProgressSnapshot {
			task: name.to_string(),
			subtask: None,
			total: total_work,
			worked: 0,
			done: false,
		};
	}

	fn worked(&self, units: u64) {
		let mut state = self.state.write();
		state.worked = state.worked.saturating_add(units);
	}

	fn sub_task(&self, name: &str) {
		self.state.write().subtask = Some(name.to_string());
	}

	fn done(&self) {
		let mut state = self.state.write();
		state.worked = state.total.max(state.worked);
		state.subtask = None;
		state.done = true;
	}

	fn is_canceled(&self) -> bool {
		self.canceled.load(Ordering::Relaxed)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn status_line_formats() {
		let sink = StatusSink::new();
		let reader = sink.clone();
		sink.begin_task("Indexing", 200);
		assert_eq!(reader.status_line(), "Indexing (0%)");

		sink.worked(50);
		sink.sub_task("lib/Prelude.rsc");
		assert_eq!(reader.status_line(), "Indexing: lib/Prelude.rsc (25%)");

		sink.done();
		let snapshot = reader.snapshot();
		assert!(snapshot.done);
		assert_eq!(snapshot.worked, 200);
		assert_eq!(snapshot.status_line(), "Indexing (100%)");
	}

	#[test]
	fn no_total_means_no_percentage() {
		let snapshot = ProgressSnapshot {
			task: "Loading".into(),
			..Default::default()
		};
		assert_eq!(snapshot.percentage(), None);
		assert_eq!(snapshot.status_line(), "Loading");
	}

	#[test]
	fn cancel_is_shared() {
		let sink = StatusSink::new();
		let handle = sink.clone();
		assert!(!sink.is_canceled());
		std::thread::spawn(move || handle.cancel()).join().unwrap();
		assert!(sink.is_canceled());
		assert!(sink.clone().is_canceled());
	}
}
