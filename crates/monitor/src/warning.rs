//! Warnings raised while a job runs, attached to a source location.

use std::fmt;
use std::io::Write;

use parking_lot::Mutex;
use tracing::warn;
use url::Url;

/// A 1-based line and 0-based column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineColumn {
	/// Line number, starting at 1.
	pub line: u32,
	/// Column, starting at 0.
	pub column: u32,
}

/// Location a warning refers to.
///
/// Displays as `|uri|`, optionally followed by `(offset,length)` or
/// `(offset,length,<line,col>,<line,col>)` when span information is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
	/// Resource the warning belongs to.
	pub uri: Url,
	/// Character offset and length inside the resource.
	pub span: Option<(usize, usize)>,
	/// Begin and end positions of the span.
	pub lines: Option<(LineColumn, LineColumn)>,
}

impl SourceLocation {
	/// Creates a location covering a whole resource.
	pub fn new(uri: Url) -> Self {
		Self {
			uri,
			span: None,
			lines: None,
		}
	}

	/// Narrows the location to a character span.
	pub fn with_span(mut self, offset: usize, length: usize) -> Self {
		self.span = Some((offset, length));
		self
	}

	/// Adds begin and end line/column positions.
	///
	/// Positions are only rendered when a span is present as well.
	pub fn with_lines(mut self, begin: LineColumn, end: LineColumn) -> Self {
		self.lines = Some((begin, end));
		self
	}
}

impl fmt::Display for SourceLocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "|{}|", self.uri)?;
		let Some((offset, length)) = self.span else {
			return Ok(());
		};
		match self.lines {
			Some((begin, end)) => write!(
				f,
				"({offset},{length},<{},{}>,<{},{}>)",
				begin.line, begin.column, end.line, end.column
			),
			None => write!(f, "({offset},{length})"),
		}
	}
}

/// Receiver of job warnings.
pub trait WarningSink {
	/// Handles one warning.
	fn warning(&self, message: &str, location: &SourceLocation);
}

impl<W: WarningSink + ?Sized> WarningSink for &W {
	fn warning(&self, message: &str, location: &SourceLocation) {
		(**self).warning(message, location);
	}
}

impl<W: WarningSink + ?Sized> WarningSink for Box<W> {
	fn warning(&self, message: &str, location: &SourceLocation) {
		(**self).warning(message, location);
	}
}

impl<W: WarningSink + ?Sized> WarningSink for std::sync::Arc<W> {
	fn warning(&self, message: &str, location: &SourceLocation) {
		(**self).warning(message, location);
	}
}

/// Emits each warning as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogWarnings;

impl WarningSink for LogWarnings {
	fn warning(&self, message: &str, location: &SourceLocation) {
		warn!(location = %location, "{message}");
	}
}

/// Discards warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreWarnings;

impl WarningSink for IgnoreWarnings {
	fn warning(&self, _message: &str, _location: &SourceLocation) {}
}

/// Writes `location: message` lines to a writer, e.g. stderr.
#[derive(Debug)]
pub struct WriterWarnings<W> {
	out: Mutex<W>,
}

impl<W: Write> WriterWarnings<W> {
	/// Wraps a writer.
	pub fn new(out: W) -> Self {
		Self { out: Mutex::new(out) }
	}

	/// Returns the wrapped writer.
	pub fn into_inner(self) -> W {
		self.out.into_inner()
	}
}

impl WriterWarnings<std::io::Stderr> {
	/// Writes warnings to the process's standard error.
	pub fn stderr() -> Self {
		Self::new(std::io::stderr())
	}
}

impl<W: Write> WarningSink for WriterWarnings<W> {
	fn warning(&self, message: &str, location: &SourceLocation) {
		let mut out = self.out.lock();
		// Write errors are dropped.
		let _ = writeln!(out, "{location}: {message}").and_then(|()| out.flush());
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;

	fn location() -> SourceLocation {
		SourceLocation::new(Url::parse("project://demo/src/Main.rsc").unwrap())
	}

	#[rstest]
	#[case::whole_resource(location(), "|project://demo/src/Main.rsc|")]
	#[case::span(location().with_span(10, 4), "|project://demo/src/Main.rsc|(10,4)")]
	#[case::span_and_lines(
		location().with_span(10, 4).with_lines(LineColumn { line: 2, column: 3 }, LineColumn { line: 2, column: 7 }),
		"|project://demo/src/Main.rsc|(10,4,<2,3>,<2,7>)"
	)]
	#[case::lines_without_span(
		location().with_lines(LineColumn { line: 1, column: 0 }, LineColumn { line: 1, column: 1 }),
		"|project://demo/src/Main.rsc|"
	)]
	fn displays_rascal_location(#[case] location: SourceLocation, #[case] expected: &str) {
		assert_eq!(location.to_string(), expected);
	}

	#[test]
	fn writer_warnings_write_lines() {
		let sink = WriterWarnings::new(Vec::new());
		sink.warning("unused variable", &location().with_span(0, 1));
		sink.warning("shadowed", &location());
		let written = String::from_utf8(sink.into_inner()).unwrap();
		assert_eq!(
			written,
			"|project://demo/src/Main.rsc|(0,1): unused variable\n|project://demo/src/Main.rsc|: shadowed\n"
		);
	}

	#[test]
	fn ignore_and_log_accept_warnings() {
		let _ = tracing_subscriber::fmt::try_init();
		IgnoreWarnings.warning("dropped", &location());
		LogWarnings.warning("logged", &location());
	}
}
