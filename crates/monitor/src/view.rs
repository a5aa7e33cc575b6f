//! Proportional slices of a flat sink.
//!
//! Every job reports through a [`SinkView`]: a share of the sink's declared
//! total (its capacity, in sink units) divided into a job-chosen number of
//! scale units. Reporting scale units converts them to sink units; carving a
//! child hands part of the capacity to a nested view. Fractional sink units
//! are carried by [`SinkTicks`] until they add up to whole units.

use crate::sink::ProgressSink;

/// Sink-unit bookkeeping shared by every view of one task.
#[derive(Debug, Clone, Default)]
pub(crate) struct SinkTicks {
	total: u64,
	reported: u64,
	carry: f64,
}

impl SinkTicks {
	pub(crate) fn new(total: u64) -> Self {
		Self {
			total,
			reported: 0,
			carry: 0.0,
		}
	}

	/// Units declared by `begin_task` and not reported yet.
	pub(crate) fn remaining(&self) -> u64 {
		self.total - self.reported
	}

	/// Adds `amount` sink units and forwards the whole part.
	pub(crate) fn report<S: ProgressSink + ?Sized>(&mut self, sink: &S, amount: f64) {
		if amount <= 0.0 {
			return;
		}
		self.carry += amount;
		let whole = self.carry.floor();
		if whole < 1.0 {
			return;
		}
		self.carry -= whole;
		let units = (whole as u64).min(self.remaining());
		if units > 0 {
			self.reported += units;
			sink.worked(units);
		}
	}

	/// Reports whatever is left of the total, absorbing rounding drift.
	pub(crate) fn finish<S: ProgressSink + ?Sized>(&mut self, sink: &S) {
		let rest = self.remaining();
		self.carry = 0.0;
		if rest > 0 {
			self.reported = self.total;
			sink.worked(rest);
		}
	}
}

/// A job's slice of the sink.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SinkView {
	/// Sink units this view may report.
	capacity: f64,
	/// Sink units already reported or handed to children.
	consumed: f64,
	/// Scale units the capacity is currently divided into.
	scale: u64,
	/// Scale units already accounted for.
	used: u64,
}

impl SinkView {
	/// View covering a whole task of `total` sink units, one scale unit each.
	pub(crate) fn root(total: u64) -> Self {
		Self {
			capacity: total as f64,
			consumed: 0.0,
			scale: total,
			used: 0,
		}
	}

	/// Scale units not accounted for yet.
	pub(crate) fn available(&self) -> u64 {
		self.scale - self.used
	}

	/// Accounts `units` scale units and returns the sink units they are worth.
	pub(crate) fn advance(&mut self, units: u64) -> f64 {
		if self.scale == 0 || units == 0 {
			return 0.0;
		}
		self.used = self.used.saturating_add(units).min(self.scale);
		let position = self.capacity * self.used as f64 / self.scale as f64;
		let delta = position - self.consumed;
		self.consumed = position;
		delta.max(0.0)
	}

	/// Hands `share` scale units to a nested view.
	///
	/// The share counts as accounted for here right away; the child reports
	/// the matching sink units itself. The child has no scale until
	/// [`rescale`](Self::rescale) is called.
	pub(crate) fn carve(&mut self, share: u64) -> Self {
		let capacity = self.advance(share);
		Self {
			capacity,
			consumed: 0.0,
			scale: 0,
			used: 0,
		}
	}

	/// Spreads the sink units not consumed yet over `units` fresh scale units.
	pub(crate) fn rescale(&mut self, units: u64) {
		self.capacity = (self.capacity - self.consumed).max(0.0);
		self.consumed = 0.0;
		self.scale = units;
		self.used = 0;
	}

	/// Closes the view and returns the sink units it never reported.
	pub(crate) fn finish(&mut self) -> f64 {
		let rest = (self.capacity - self.consumed).max(0.0);
		self.consumed = self.capacity;
		self.used = self.scale;
		rest
	}
}
