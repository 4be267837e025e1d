//! Error type for report generation.
//!
//! Only a handful of conditions are fatal for a whole report run (an
//! unreadable fixture root, a pager that cannot be started). Everything else
//! is produced per case and absorbed by the renderer, so the variants below
//! double as the vocabulary for debug logging of swallowed failures.

use miette::Diagnostic;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ReportError {
    #[error("cannot read fixture root '{}'", path.display())]
    #[diagnostic(
        code(munge_report::root_unreadable),
        help("check that the directory exists and is listable")
    )]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("missing fixture artifact '{}'", path.display())]
    #[diagnostic(code(munge_report::missing_artifact))]
    MissingArtifact { path: PathBuf },

    #[error("failed to read '{}'", path.display())]
    #[diagnostic(code(munge_report::read))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to run diff tool '{tool}'")]
    #[diagnostic(
        code(munge_report::diff_spawn),
        help("install git or pass `--diff builtin`")
    )]
    DiffSpawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("diff tool '{tool}' exited with status {status}: {stderr}")]
    #[diagnostic(code(munge_report::diff_failed))]
    DiffFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("failed to start pager '{command}'")]
    #[diagnostic(
        code(munge_report::pager_spawn),
        help("set MUNGE_REPORT_PAGER to a working pager or pass `--no-pager`")
    )]
    PagerSpawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write report output")]
    #[diagnostic(code(munge_report::output))]
    Output(#[from] io::Error),
}

impl ReportError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}
