use std::time::Instant;

use crate::view::SinkView;

/// One open job on the monitor's stack.
#[derive(Debug, Clone)]
pub(crate) struct JobScope {
	pub(crate) name: String,
	pub(crate) view: SinkView,
	/// Units the job reports progress in.
	pub(crate) total_work: u32,
	pub(crate) work_remaining: u32,
	pub(crate) work_done: u64,
	/// Work declared by the last step (or promised to the open child),
	/// flushed by the next step or by the end of the job.
	pub(crate) pending: u32,
	pub(crate) started_at: Instant,
}

impl JobScope {
	pub(crate) fn new(name: &str, mut view: SinkView, total_work: u32, started_at: Instant) -> Self {
		view.rescale(u64::from(total_work));
		Self {
			name: name.to_string(),
			view,
			total_work,
			work_remaining: total_work,
			work_done: 0,
			pending: 0,
			started_at,
		}
	}

	/// Replaces the pending unit with `next` and returns the old one.
	pub(crate) fn take_pending(&mut self, next: u32) -> u32 {
		std::mem::replace(&mut self.pending, next)
	}

	/// Adds `units` to the done counter and takes them off the remaining work.
	pub(crate) fn account(&mut self, units: u32) {
		self.work_done = self.work_done.saturating_add(u64::from(units));
		self.work_remaining = self.work_remaining.saturating_sub(units);
	}
}
