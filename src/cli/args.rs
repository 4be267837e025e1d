//! Command-line arguments for `munge-report`.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{ColorMode, ReportConfig, DEFAULT_ROOT};
use crate::diff::DiffTool;
use crate::discovery::Layout;

/// Render the before/after diffs of nix-doc-munge failure fixtures.
#[derive(Debug, Parser)]
#[command(name = "munge-report", version)]
pub struct ReportArgs {
    /// Directory holding the fixture cases.
    #[arg(default_value = DEFAULT_ROOT)]
    pub root: PathBuf,

    /// How cases are laid out under the root.
    #[arg(long, value_enum, default_value_t = Layout::Auto)]
    pub layout: Layout,

    /// Diff implementation.
    #[arg(long, value_enum, default_value_t = DiffTool::Git)]
    pub diff: DiffTool,

    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Pager command line, run through `sh -c`. Unset means plain stdout.
    #[arg(long, env = "MUNGE_REPORT_PAGER")]
    pub pager: Option<String>,

    /// Write to stdout even if a pager is configured.
    #[arg(long)]
    pub no_pager: bool,

    /// Diff the un-normalized `*.raw.xml` output when both sides have it.
    #[arg(long)]
    pub raw: bool,

    /// Finish the report with a count of cases.
    #[arg(long)]
    pub summary: bool,

    /// Log discovery and skipped diffs to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ReportArgs {
    pub fn into_config(self) -> ReportConfig {
        ReportConfig {
            root: self.root,
            layout: self.layout,
            diff_tool: self.diff,
            color: self.color,
            pager: if self.no_pager { None } else { self.pager },
            raw: self.raw,
            summary: self.summary,
        }
    }
}
