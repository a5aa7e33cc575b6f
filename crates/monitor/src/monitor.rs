//! Nested job tracking on top of a flat [`ProgressSink`].
//!
//! Callers open jobs with [`Monitor::job_start`], report steps with
//! [`Monitor::job_step`] and close them with [`Monitor::job_end`], strictly
//! innermost first. Each nested job receives a share of its parent's work;
//! the monitor converts every job's own units into sink units so the sink sees
//! a single task that fills up proportionally.
//!
//! Step work is flushed lazily: the share declared by a step is reported when
//! the next step starts or when the job ends, so a step's share covers the
//! work done *after* it was announced.

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::config::{MonitorConfig, SharePolicy};
use crate::error::{MonitorError, Result};
use crate::poll::{Clock, RateLimited, SystemClock};
use crate::scope::JobScope;
use crate::sink::ProgressSink;
use crate::view::{SinkTicks, SinkView};
use crate::warning::{LogWarnings, SourceLocation, WarningSink};

/// Hierarchical progress tracker.
///
/// All job operations take `&mut self` and must be called from one thread.
/// Cancellation requested from other threads reaches the monitor through the
/// sink, see [`Cancellable`](crate::sink::Cancellable).
#[derive(Debug)]
pub struct Monitor<S, W = LogWarnings, C = SystemClock> {
	sink: S,
	warnings: W,
	clock: C,
	config: MonitorConfig,
	/// Open jobs, outermost first.
	scopes: Vec<JobScope>,
	ticks: SinkTicks,
	/// Name of the first outermost job, shown whenever a job ends.
	top_name: Option<String>,
	cancel_poll: RateLimited<bool>,
}

impl<S: ProgressSink, W: WarningSink> Monitor<S, W> {
	/// Creates a monitor with the default configuration and the wall clock.
	pub fn new(sink: S, warnings: W) -> Self {
		Self::with_config(sink, warnings, MonitorConfig::default())
	}

	/// Creates a monitor with the wall clock.
	pub fn with_config(sink: S, warnings: W, config: MonitorConfig) -> Self {
		Self::with_clock(sink, warnings, config, SystemClock)
	}
}

impl<S: ProgressSink, W: WarningSink, C: Clock> Monitor<S, W, C> {
	/// Creates a monitor reading time from `clock`.
	pub fn with_clock(sink: S, warnings: W, config: MonitorConfig, clock: C) -> Self {
		let cancel_poll = RateLimited::new(config.cancel_poll_interval);
		Self {
			sink,
			warnings,
			clock,
			config,
			scopes: Vec::new(),
			ticks: SinkTicks::default(),
			top_name: None,
			cancel_poll,
		}
	}

	/// Opens a job.
	///
	/// The outermost job begins the sink's task with `total_work` units and
	/// ignores `work_share`. A nested job takes `work_share` of the current
	/// job's units and reports in `total_work` units of its own. Either way the
	/// sink's task name becomes `name`. A parent that already used up its
	/// declared total re-estimates its remaining work at the configured overrun
	/// value first, as [`job_step`](Self::job_step) does.
	///
	/// Fails only under [`SharePolicy::Reject`], when `work_share` exceeds what
	/// the current job has left; nothing is changed in that case.
	pub fn job_start(&mut self, name: &str, work_share: u32, total_work: u32) -> Result<()> {
		let now = self.clock.now();
		let depth = self.scopes.len();
		let scope = match self.scopes.last_mut() {
			None => {
				self.top_name.get_or_insert_with(|| name.to_string());
				self.sink.set_task_name(name);
				self.sink.begin_task(name, u64::from(total_work));
				self.ticks = SinkTicks::new(u64::from(total_work));
				debug!(job = name, depth, total = total_work, "Job started");
				JobScope::new(name, SinkView::root(u64::from(total_work)), total_work, now)
			}
			Some(parent) => {
				let overrun = parent.work_remaining == 0;
				let available = if overrun {
					self.config.overrun_work
				} else {
					u32::try_from(parent.view.available()).unwrap_or(u32::MAX)
				};
				let share = if work_share <= available {
					work_share
				} else {
					match self.config.share_policy {
						SharePolicy::Reject => {
							return Err(MonitorError::ShareExceedsRemaining {
								job: name.to_string(),
								share: work_share,
								available,
							});
						}
						SharePolicy::Clamp => {
							warn!(job = name, parent = %parent.name, share = work_share, available, "Job share clamped");
							available
						}
					}
				};
				if overrun {
					parent.view.rescale(u64::from(self.config.overrun_work));
					self.sink.set_work_remaining(self.ticks.remaining());
				}
				self.sink.set_task_name(name);
				let view = parent.view.carve(u64::from(share));
				// Only the slice is clamped; the parent counts the declared share.
				parent.pending = work_share;
				debug!(job = name, depth, share, requested = work_share, total = total_work, "Job started");
				JobScope::new(name, view, total_work, now)
			}
		};
		self.scopes.push(scope);
		Ok(())
	}

	/// Opens a job worth one unit of its parent.
	pub fn job_start_total(&mut self, name: &str, total_work: u32) -> Result<()> {
		self.job_start(name, 1, total_work)
	}

	/// Advances the current job.
	///
	/// Reports the share declared by the previous step, shows `name` as the
	/// sub task and records `work_share` to be reported by the next step or by
	/// [`job_end`](Self::job_end). Once the job has used up its declared total,
	/// its remaining work is re-estimated at the configured overrun value
	/// instead, so the sink never shows an overrunning job as complete.
	pub fn job_step(&mut self, name: &str, message: &str, work_share: u32) -> Result<()> {
		let scope = self
			.scopes
			.last_mut()
			.ok_or(MonitorError::InvalidCallSequence { operation: "job_step" })?;
		let flushed = scope.take_pending(work_share);
		let delta = scope.view.advance(u64::from(flushed));
		self.ticks.report(&self.sink, delta);
		scope.work_done = scope.work_done.saturating_add(u64::from(flushed));
		if scope.work_remaining == 0 {
			scope.view.rescale(u64::from(self.config.overrun_work));
			self.sink.set_work_remaining(self.ticks.remaining());
		} else {
			scope.work_remaining = scope.work_remaining.saturating_sub(flushed);
		}
		self.sink.sub_task(name);
		trace!(job = %scope.name, step = name, detail = message, flushed, next = work_share, "Job step");
		Ok(())
	}

	/// Advances the current job by one unit.
	pub fn job_step_one(&mut self, name: &str, message: &str) -> Result<()> {
		self.job_step(name, message, 1)
	}

	/// Replaces the current job's estimate of its remaining work.
	///
	/// The part of the job's slice not reported yet is spread over `work`
	/// fresh units.
	pub fn job_todo(&mut self, name: &str, work: u32) -> Result<()> {
		let scope = self
			.scopes
			.last_mut()
			.ok_or(MonitorError::InvalidCallSequence { operation: "job_todo" })?;
		scope.work_remaining = work;
		scope.view.rescale(u64::from(work));
		self.sink.set_work_remaining(self.ticks.remaining());
		trace!(job = %scope.name, todo = name, work, "Job rescaled");
		Ok(())
	}

	/// Closes the current job and returns the units it reported as done.
	///
	/// The job's pending share is counted, its slice of the sink is filled, and
	/// the share promised to it by the parent is counted on the parent. Closing
	/// the outermost job finishes the sink's task. The sink's task name goes
	/// back to the first outermost job's name. `succeeded` is only logged.
	pub fn job_end(&mut self, name: &str, succeeded: bool) -> Result<u64> {
		let Some(mut scope) = self.scopes.pop() else {
			warn!(job = name, "job_end without job_start");
			return Err(MonitorError::UnbalancedEnd);
		};
		let pending = scope.take_pending(0);
		scope.account(pending);
		let rest = scope.view.finish();
		self.ticks.report(&self.sink, rest);

		match self.scopes.last_mut() {
			Some(parent) => {
				let promised = parent.take_pending(0);
				parent.account(promised);
			}
			None => {
				self.ticks.finish(&self.sink);
				self.sink.done();
			}
		}
		if let Some(top) = &self.top_name {
			self.sink.set_task_name(top);
		}

		let elapsed = self.clock.now().saturating_duration_since(scope.started_at);
		debug!(
			job = %scope.name,
			depth = self.scopes.len(),
			succeeded,
			worked = scope.work_done,
			total = scope.total_work,
			elapsed_ms = elapsed.as_millis(),
			"Job ended"
		);
		Ok(scope.work_done)
	}

	/// Closes every open job, innermost first, as unsuccessful.
	///
	/// Returns the outermost job's done units, or 0 when nothing was open.
	pub fn end_all_jobs(&mut self) -> u64 {
		let mut worked = 0;
		while let Some(name) = self.current_job().map(str::to_string) {
			match self.job_end(&name, false) {
				Ok(done) => worked = done,
				Err(_) => break,
			}
		}
		worked
	}

	/// Runs `body` inside a job that is always closed afterwards.
	///
	/// Jobs left open by `body` are closed first. The job counts as succeeded
	/// when `body` returns `Ok`.
	pub fn job<T, E>(
		&mut self,
		name: &str,
		work_share: u32,
		total_work: u32,
		body: impl FnOnce(&mut Self) -> std::result::Result<T, E>,
	) -> std::result::Result<T, E>
	where
		E: From<MonitorError>,
	{
		self.job_start(name, work_share, total_work)?;
		let depth = self.scopes.len();
		let result = body(self);
		while self.scopes.len() > depth {
			let inner = self.scopes.last().map(|s| s.name.clone()).unwrap_or_default();
			warn!(job = name, inner = %inner, "Closing job left open");
			self.job_end(&inner, false)?;
		}
		if self.scopes.len() == depth {
			self.job_end(name, result.is_ok())?;
		}
		result
	}

	/// Returns the sink's cancellation flag, polling it at most once per
	/// configured interval.
	pub fn job_is_canceled(&mut self, name: &str) -> bool {
		let now = self.clock.now();
		let sink = &self.sink;
		self.cancel_poll.sample(now, || {
			let canceled = sink.is_canceled();
			trace!(job = name, canceled, "Polled cancellation");
			canceled
		})
	}

	/// Forwards a warning to the warning sink.
	pub fn warning(&self, message: &str, location: &SourceLocation) {
		self.warnings.warning(message, location);
	}

	/// Number of open jobs.
	pub fn depth(&self) -> usize {
		self.scopes.len()
	}

	/// Returns true when no job is open.
	pub fn is_idle(&self) -> bool {
		self.scopes.is_empty()
	}

	/// Name of the first outermost job, once one was started.
	pub fn top_name(&self) -> Option<&str> {
		self.top_name.as_deref()
	}

	/// Name of the innermost open job.
	pub fn current_job(&self) -> Option<&str> {
		self.scopes.last().map(|s| s.name.as_str())
	}

	/// Interval between two real cancellation polls.
	pub fn cancel_poll_interval(&self) -> Duration {
		self.cancel_poll.interval()
	}

	/// Returns the active configuration.
	pub fn config(&self) -> &MonitorConfig {
		&self.config
	}

	/// Returns the wrapped sink.
	pub fn sink(&self) -> &S {
		&self.sink
	}

	/// Consumes the monitor and returns the wrapped sink.
	pub fn into_sink(self) -> S {
		self.sink
	}
}
