//! Picks the interesting lines out of a failed build's error log.

use once_cell::sync::Lazy;
use regex::Regex;

/// Line prefixes worth surfacing from a failed manual build.
///
/// `building ` names the derivation that failed, the two exception prefixes
/// come from the option-doc tooling, and the indented `error: ` lines are
/// nix's own diagnostics nested under the build log.
static RECOGNIZED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:building |Exception: |RuntimeError: |[ \t]+error: )")
        .expect("error-log prefix pattern is valid")
});

/// Placeholder printed when nothing in the log matched.
pub const UNKNOWN_ERROR: &str = "(unknown error)";

/// Returns the recognized lines of `log`, in order, without line endings.
pub fn recognized_lines(log: &str) -> Vec<&str> {
    log.lines().filter(|line| is_recognized(line)).collect()
}

pub fn is_recognized(line: &str) -> bool {
    RECOGNIZED.is_match(line)
}
