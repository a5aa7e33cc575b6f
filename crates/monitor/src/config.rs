//! Tunables for [`Monitor`](crate::Monitor).
//!
//! Configuration is plain TOML with kebab-case keys; every key is optional:
//!
//! ```toml
//! cancel-poll-interval-ms = 100
//! overrun-work = 200
//! share-policy = "clamp"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{MonitorError, Result};

/// How often the sink's cancellation flag is actually polled.
pub const DEFAULT_CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Remaining-work estimate re-declared when a job outruns its budget.
pub const DEFAULT_OVERRUN_WORK: u32 = 200;

/// What to do when a child job asks for more work than its parent has left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SharePolicy {
	/// Shrink the share to what the parent can still allocate.
	#[default]
	Clamp,
	/// Refuse to start the job.
	Reject,
}

/// Monitor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct MonitorConfig {
	/// Minimum time between two polls of the sink's cancellation flag.
	#[serde(rename = "cancel-poll-interval-ms", with = "millis")]
	pub cancel_poll_interval: Duration,
	/// Remaining-work estimate used once a job has exhausted its declared total.
	pub overrun_work: u32,
	/// Over-allocation handling for nested jobs.
	pub share_policy: SharePolicy,
}

impl Default for MonitorConfig {
	fn default() -> Self {
		Self {
			cancel_poll_interval: DEFAULT_CANCEL_POLL_INTERVAL,
			overrun_work: DEFAULT_OVERRUN_WORK,
			share_policy: SharePolicy::default(),
		}
	}
}

impl MonitorConfig {
	/// Parses configuration from TOML text.
	pub fn from_toml_str(input: &str) -> Result<Self> {
		Ok(toml::from_str(input)?)
	}

	/// Reads and parses a TOML configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|error| MonitorError::ConfigIo {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&text)
	}

	/// Sets the cancellation poll interval.
	pub fn with_cancel_poll_interval(mut self, interval: Duration) -> Self {
		self.cancel_poll_interval = interval;
		self
	}

	/// Sets the overrun estimate.
	pub fn with_overrun_work(mut self, work: u32) -> Self {
		self.overrun_work = work;
		self
	}

	/// Sets the over-allocation policy.
	pub fn with_share_policy(mut self, policy: SharePolicy) -> Self {
		self.share_policy = policy;
		self
	}
}

mod millis {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer};

	pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
		u64::deserialize(deserializer).map(Duration::from_millis)
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	#[test]
	fn empty_config_uses_defaults() {
		let config = MonitorConfig::from_toml_str("").unwrap();
		assert_eq!(config, MonitorConfig::default());
		assert_eq!(config.cancel_poll_interval, Duration::from_millis(100));
		assert_eq!(config.overrun_work, 200);
		assert_eq!(config.share_policy, SharePolicy::Clamp);
	}

	#[test]
	fn parses_all_keys() {
		let config = MonitorConfig::from_toml_str(
			r#"
cancel-poll-interval-ms = 250
overrun-work = 50
share-policy = "reject"
"#,
		)
		.unwrap();
		assert_eq!(config.cancel_poll_interval, Duration::from_millis(250));
		assert_eq!(config.overrun_work, 50);
		assert_eq!(config.share_policy, SharePolicy::Reject);
	}

	#[test]
	fn rejects_unknown_keys() {
		let err = MonitorConfig::from_toml_str("poll = 3").unwrap_err();
		assert!(matches!(err, MonitorError::Config(_)));
	}

	#[test]
	fn load_reads_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "overrun-work = 7").unwrap();
		let config = MonitorConfig::load(file.path()).unwrap();
		assert_eq!(config.overrun_work, 7);
		assert_eq!(config.cancel_poll_interval, DEFAULT_CANCEL_POLL_INTERVAL);
	}

	#[test]
	fn load_reports_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("missing.toml");
		match MonitorConfig::load(&path) {
			Err(MonitorError::ConfigIo { path: reported, .. }) => assert_eq!(reported, path),
			other => panic!("expected ConfigIo, got {other:?}"),
		}
	}
}
