use std::path::PathBuf;

use clap::ValueEnum;

use crate::diff::DiffTool;
use crate::discovery::Layout;

/// Default fixture root, relative to the working directory.
pub const DEFAULT_ROOT: &str = "munge-failures";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Color when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

/// Everything a report run needs to know.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub root: PathBuf,
    pub layout: Layout,
    pub diff_tool: DiffTool,
    pub color: ColorMode,
    /// Pager command line; `None` writes straight to stdout.
    pub pager: Option<String>,
    /// Diff the un-normalized `*.raw.xml` output where available.
    pub raw: bool,
    /// Append a one-line count of cases to the report.
    pub summary: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            layout: Layout::Auto,
            diff_tool: DiffTool::Git,
            color: ColorMode::Auto,
            pager: None,
            raw: false,
            summary: false,
        }
    }
}

impl ReportConfig {
    pub fn use_colors(&self) -> bool {
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => atty::is(atty::Stream::Stdout),
        }
    }
}
