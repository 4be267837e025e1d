//! Paged before/after diff reports for `nix-doc-munge` failure fixtures.

pub use crate::error::ReportError;

pub mod cli;
pub mod config;
pub mod diff;
pub mod discovery;
pub mod error;
pub mod error_log;
pub mod fixture;
pub mod pager;
pub mod report;

pub use crate::config::ReportConfig;
pub use crate::report::{run_report, ReportRenderer, ReportStats};
