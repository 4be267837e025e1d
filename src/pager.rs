//! Delivery of a finished report: a pager process, stdout, or memory.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::ReportError;

/// Environment variable naming the pager command line.
pub const PAGER_ENV: &str = "MUNGE_REPORT_PAGER";

/// `LESS` flags used when the user has none: interpret colors, quit if the
/// report fits on one screen, keep the screen on exit.
const DEFAULT_LESS: &str = "FRX";

pub trait ReportSink {
    fn deliver(&mut self, report: &[u8]) -> Result<(), ReportError>;
}

/// Pipes the report into a pager run through `sh -c`.
#[derive(Debug, Clone)]
pub struct PagerSink {
    command: String,
}

impl PagerSink {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl ReportSink for PagerSink {
    fn deliver(&mut self, report: &[u8]) -> Result<(), ReportError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&self.command).stdin(Stdio::piped());
        if std::env::var_os("LESS").is_none() {
            cmd.env("LESS", DEFAULT_LESS);
        }
        debug!(pager = %self.command, "starting pager");
        let mut child = cmd.spawn().map_err(|source| ReportError::PagerSpawn {
            command: self.command.clone(),
            source,
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            ignore_broken_pipe(stdin.write_all(report))?;
            // Dropping stdin closes the pipe so the pager sees EOF.
        }
        let status = child.wait()?;
        debug!(%status, "pager exited");
        // `sh` reports a command it could not find or execute as 127/126.
        if let Some(code @ (126 | 127)) = status.code() {
            return Err(ReportError::PagerSpawn {
                command: self.command.clone(),
                source: io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("sh exited with status {code}"),
                ),
            });
        }
        Ok(())
    }
}

/// The non-paging passthrough.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn deliver(&mut self, report: &[u8]) -> Result<(), ReportError> {
        let mut stdout = io::stdout().lock();
        ignore_broken_pipe(stdout.write_all(report).and_then(|_| stdout.flush()))?;
        Ok(())
    }
}

/// Keeps the delivered report in memory.
#[derive(Debug, Default)]
pub struct CaptureSink {
    pub bytes: Vec<u8>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl ReportSink for CaptureSink {
    fn deliver(&mut self, report: &[u8]) -> Result<(), ReportError> {
        self.bytes.extend_from_slice(report);
        Ok(())
    }
}

/// Picks the sink for a pager setting. `None`, an empty command and `cat`
/// all mean plain stdout.
pub fn sink_for(pager: Option<&str>) -> Box<dyn ReportSink> {
    match pager.map(str::trim) {
        None | Some("") | Some("cat") => Box::new(StdoutSink),
        Some(command) => Box::new(PagerSink::new(command)),
    }
}

/// The reader went away (pager quit, `| head`); the report is done.
fn ignore_broken_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
