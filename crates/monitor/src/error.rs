//! Error types for job progress tracking.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by [`Monitor`](crate::Monitor) and its configuration.
#[derive(Debug, Error)]
pub enum MonitorError {
	/// A job operation was called while no job was open.
	#[error("{operation} called before job_start")]
	InvalidCallSequence {
		/// Name of the offending operation.
		operation: &'static str,
	},

	/// `job_end` was called without a matching `job_start`.
	#[error("job_end without job_start")]
	UnbalancedEnd,

	/// A child job asked for more work than its parent has left to hand out.
	#[error("job {job:?} requested a work share of {share} but only {available} is available")]
	ShareExceedsRemaining {
		/// Name of the job that was being started.
		job: String,
		/// Requested share of the parent's work.
		share: u32,
		/// Units the parent could still allocate.
		available: u32,
	},

	/// Error parsing TOML configuration.
	#[error("config parse error: {0}")]
	Config(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	ConfigIo {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}

/// Result type for job progress operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
