//! Hierarchical job progress for the Rascal IDE integration.
//!
//! Language tooling reports progress as nested, named jobs: a build starts a
//! job, which starts a compile job for each module, which steps through
//! parsing and checking. Hosts only offer a flat progress surface with one
//! task, a fixed total and a cancel flag. [`Monitor`] bridges the two: every
//! nested job gets a proportional slice of its parent, and the host's
//! [`ProgressSink`] sees a single task that fills up smoothly.
//!
//! ```
//! use rascal_monitor::{IgnoreWarnings, Monitor, StatusSink};
//!
//! let status = StatusSink::new();
//! let mut monitor = Monitor::new(status.clone(), IgnoreWarnings);
//!
//! monitor.job_start("build", 100, 100)?;
//! monitor.job_start("compile", 60, 10)?;
//! monitor.job_step("parse", "", 5)?;
//! monitor.job_step("check", "", 5)?;
//! assert_eq!(monitor.job_end("compile", true)?, 10);
//! assert_eq!(monitor.job_end("build", true)?, 60);
//!
//! assert_eq!(status.status_line(), "build (100%)");
//! # Ok::<(), rascal_monitor::MonitorError>(())
//! ```

/// Monitor configuration.
pub mod config;
/// Error types.
pub mod error;
/// The hierarchical monitor.
pub mod monitor;
/// Rate-limited sampling and clocks.
pub mod poll;
/// Host progress sinks.
pub mod sink;
/// Warnings with source locations.
pub mod warning;

mod scope;
mod view;

pub use config::{MonitorConfig, SharePolicy};
pub use error::{MonitorError, Result};
pub use monitor::Monitor;
pub use poll::{Clock, ManualClock, RateLimited, SystemClock};
pub use sink::{Cancellable, LogSink, NullSink, ProgressSink, ProgressSnapshot, StatusSink};
pub use warning::{IgnoreWarnings, LineColumn, LogWarnings, SourceLocation, WarningSink, WriterWarnings};
