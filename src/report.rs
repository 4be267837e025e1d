//! The failure report renderer.
//!
//! Each case becomes one section:
//!
//! ```text
//! >>> munge-failures/<case>
//! <diff of before.nix against after.nix>
//!
//! <diff of before.xml against after.xml>      (both sides built)
//! *** Build failed:                           (after side failed)
//! <recognized lines of after.error, or "(unknown error)">
//!
//!
//! ```
//!
//! Per-case problems (missing files, diff tool failures, unreadable logs)
//! leave the affected sub-section empty and never stop the report. Only
//! failures to write the report itself propagate.

use std::fs;
use std::io::Write;
use std::path::Path;

use termcolor::{Buffer, Color, ColorSpec, WriteColor};
use tracing::{debug, info};

use crate::config::ReportConfig;
use crate::diff::DiffProvider;
use crate::discovery::discover_cases;
use crate::error_log::{recognized_lines, UNKNOWN_ERROR};
use crate::fixture::{Artifact, CaseOutcome, FixtureCase};
use crate::pager::ReportSink;
use crate::ReportError;

/// Marker line opening the error section of a failed case.
pub const BUILD_FAILED: &str = "*** Build failed:";

/// Blank lines written after every case.
pub const CASE_SEPARATOR_LINES: usize = 2;

/// Counts collected while rendering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportStats {
    pub cases: usize,
    pub rendered: usize,
    pub failed: usize,
}

impl ReportStats {
    fn record(&mut self, outcome: &CaseOutcome) {
        self.cases += 1;
        match outcome {
            CaseOutcome::Rendered { .. } => self.rendered += 1,
            CaseOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

pub struct ReportRenderer {
    diff: Box<dyn DiffProvider>,
    raw: bool,
    summary: bool,
}

impl ReportRenderer {
    pub fn new(diff: Box<dyn DiffProvider>) -> Self {
        Self {
            diff,
            raw: false,
            summary: false,
        }
    }

    /// Prefer the `*.raw.xml` pair for the output diff.
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Append a count line after the last case.
    pub fn summary(mut self, summary: bool) -> Self {
        self.summary = summary;
        self
    }

    pub fn render(
        &self,
        cases: &[FixtureCase],
        out: &mut dyn WriteColor,
    ) -> Result<ReportStats, ReportError> {
        let mut stats = ReportStats::default();
        for case in cases {
            let outcome = self.render_case(case, out)?;
            stats.record(&outcome);
        }
        if self.summary && stats.cases > 0 {
            writeln!(
                out,
                "{} cases: {} output diffs, {} build failures",
                stats.cases, stats.rendered, stats.failed
            )?;
        }
        Ok(stats)
    }

    /// Writes one case section and returns how the case was classified.
    pub fn render_case(
        &self,
        case: &FixtureCase,
        out: &mut dyn WriteColor,
    ) -> Result<CaseOutcome, ReportError> {
        debug!(case = case.id(), "rendering case");

        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        write!(out, ">>> {}", case.label())?;
        out.reset()?;
        writeln!(out)?;

        self.diff_section(
            case,
            &case.path(Artifact::BeforeSource),
            &case.path(Artifact::AfterSource),
            out,
        )?;
        writeln!(out)?;

        let outcome = case.outcome(self.raw);
        match &outcome {
            CaseOutcome::Rendered { before, after } => {
                self.diff_section(case, before, after, out)?;
            }
            CaseOutcome::Failed { error_log } => {
                failure_section(case, error_log, out)?;
            }
        }

        for _ in 0..CASE_SEPARATOR_LINES {
            writeln!(out)?;
        }
        Ok(outcome)
    }

    /// Runs the diff into a scratch buffer so a failing tool leaves nothing
    /// half-written.
    fn diff_section(
        &self,
        case: &FixtureCase,
        before: &Path,
        after: &Path,
        out: &mut dyn WriteColor,
    ) -> Result<(), ReportError> {
        let mut scratch = if out.supports_color() {
            Buffer::ansi()
        } else {
            Buffer::no_color()
        };
        match self.diff.diff(before, after, &mut scratch) {
            Ok(()) => out.write_all(scratch.as_slice())?,
            Err(e) => debug!(case = case.id(), error = %e, "diff skipped"),
        }
        Ok(())
    }
}

fn failure_section(
    case: &FixtureCase,
    error_log: &Path,
    out: &mut dyn WriteColor,
) -> Result<(), ReportError> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(out, "{BUILD_FAILED}")?;
    out.reset()?;
    writeln!(out)?;

    let log = match fs::read(error_log) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            debug!(case = case.id(), error = %ReportError::read(error_log, e), "no error log");
            String::new()
        }
    };
    let lines = recognized_lines(&log);
    if lines.is_empty() {
        writeln!(out, "{UNKNOWN_ERROR}")?;
    }
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Discovers, renders and delivers a full report.
pub fn run_report(
    config: &ReportConfig,
    sink: &mut dyn ReportSink,
) -> Result<ReportStats, ReportError> {
    let cases = discover_cases(&config.root, config.layout)?;

    let mut buffer = if config.use_colors() {
        Buffer::ansi()
    } else {
        Buffer::no_color()
    };
    let stats = ReportRenderer::new(config.diff_tool.provider())
        .raw(config.raw)
        .summary(config.summary)
        .render(&cases, &mut buffer)?;

    sink.deliver(buffer.as_slice())?;
    info!(
        cases = stats.cases,
        output_diffs = stats.rendered,
        build_failures = stats.failed,
        "report complete"
    );
    Ok(stats)
}
