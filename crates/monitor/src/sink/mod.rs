//! Flat progress sinks.
//!
//! A [`ProgressSink`] is the host's progress reporting surface: a single task
//! with a fixed total, incremental worked units, a visible task name, a sub
//! task label and a cancellation flag. [`Monitor`](crate::Monitor) maps nested
//! jobs onto one of these.

mod cancel;
mod log;
mod status;

use std::sync::Arc;

pub use cancel::Cancellable;
pub use log::LogSink;
pub use status::{ProgressSnapshot, StatusSink};

/// Host progress reporting surface.
///
/// Methods take `&self` so a sink can be shared with whatever renders it.
pub trait ProgressSink {
	/// Replaces the visible task name.
	fn set_task_name(&self, name: &str);

	/// Starts the task with `total_work` units to report.
	fn begin_task(&self, name: &str, total_work: u64);

	/// Reports `units` more units of work done.
	fn worked(&self, units: u64);

	/// Resynchronises the count of units still outstanding after a job
	/// rescaled its remaining work.
	///
	/// Sinks that derive progress from [`worked`](Self::worked) alone can
	/// ignore this.
	fn set_work_remaining(&self, _units: u64) {}

	/// Replaces the sub task label.
	fn sub_task(&self, name: &str);

	/// Marks the task finished.
	fn done(&self);

	/// Returns true when the user asked to cancel.
	fn is_canceled(&self) -> bool;
}

macro_rules! forward_sink {
	($($ty:ty),*) => {$(
		impl<S: ProgressSink + ?Sized> ProgressSink for $ty {
			fn set_task_name(&self, name: &str) {
				(**self).set_task_name(name);
			}

			fn begin_task(&self, name: &str, total_work: u64) {
				(**self).begin_task(name, total_work);
			}

			fn worked(&self, units: u64) {
				(**self).worked(units);
			}

			fn set_work_remaining(&self, units: u64) {
				(**self).set_work_remaining(units);
			}

			fn sub_task(&self, name: &str) {
				(**self).sub_task(name);
			}

			fn done(&self) {
				(**self).done();
			}

			fn is_canceled(&self) -> bool {
				(**self).is_canceled()
			}
		}
	)*};
}

forward_sink!(&S, Box<S>, Arc<S>);

/// Sink that ignores everything and is never canceled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
	fn set_task_name(&self, _name: &str) {}

	fn begin_task(&self, _name: &str, _total_work: u64) {}

	fn worked(&self, _units: u64) {}

	fn sub_task(&self, _name: &str) {}

	fn done(&self) {}

	fn is_canceled(&self) -> bool {
		false
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{IgnoreWarnings, Monitor};

	#[test]
	fn shared_handles_forward() {
		let status = Arc::new(StatusSink::new());
		let mut monitor = Monitor::new(Arc::clone(&status), IgnoreWarnings);
		monitor.job_start("Loading", 1, 4).unwrap();
		monitor.job_step("a", "", 1).unwrap();
		monitor.job_step("b", "", 1).unwrap();
		assert_eq!(status.status_line(), "Loading: b (25%)");

		let boxed: Box<dyn ProgressSink> = Box::new(NullSink);
		let mut monitor = Monitor::new(&boxed, IgnoreWarnings);
		monitor.job_start("Loading", 1, 4).unwrap();
		assert!(!monitor.job_is_canceled("Loading"));
		assert_eq!(monitor.job_end("Loading", true).unwrap(), 0);
	}
}
