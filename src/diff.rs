//! Structural diffs between two fixture files.
//!
//! The renderer only sees [`DiffProvider`]; the default implementation shells
//! out to `git diff --no-index`, and [`BuiltinDiff`] produces the same kind of
//! unified output in-process.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use clap::ValueEnum;
use difference::{Changeset, Difference};
use termcolor::{Color, ColorSpec, WriteColor};

use crate::ReportError;

/// Lines of unchanged context around each hunk.
const CONTEXT_LINES: usize = 3;

/// Writes a unified diff of `before` against `after` into `out`.
///
/// Identical inputs write nothing. Colors are emitted only when `out`
/// supports them.
pub trait DiffProvider {
    fn diff(&self, before: &Path, after: &Path, out: &mut dyn WriteColor)
        -> Result<(), ReportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DiffTool {
    /// `git diff --no-index`
    #[default]
    Git,
    /// In-process line diff
    Builtin,
}

impl DiffTool {
    pub fn provider(self) -> Box<dyn DiffProvider> {
        match self {
            DiffTool::Git => Box::new(GitDiff::default()),
            DiffTool::Builtin => Box::new(BuiltinDiff),
        }
    }
}

fn require(path: &Path) -> Result<(), ReportError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ReportError::MissingArtifact {
            path: path.to_path_buf(),
        })
    }
}

// ============================================================================
// GIT
// ============================================================================

#[derive(Debug, Clone)]
pub struct GitDiff {
    program: String,
}

impl Default for GitDiff {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitDiff {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DiffProvider for GitDiff {
    fn diff(
        &self,
        before: &Path,
        after: &Path,
        out: &mut dyn WriteColor,
    ) -> Result<(), ReportError> {
        require(before)?;
        require(after)?;

        let color = if out.supports_color() {
            "--color=always"
        } else {
            "--color=never"
        };
        let output = Command::new(&self.program)
            .args(["diff", "--no-index", "--no-prefix", "--no-ext-diff", color, "--"])
            .arg(before)
            .arg(after)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ReportError::DiffSpawn {
                tool: self.program.clone(),
                source,
            })?;

        // 0: identical, 1: differences found.
        match output.status.code() {
            Some(0) | Some(1) => {
                out.write_all(&output.stdout)?;
                Ok(())
            }
            _ => Err(ReportError::DiffFailed {
                tool: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

// ============================================================================
// BUILTIN
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDiff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Same,
    Add,
    Rem,
}

/// One line of either file, `\n` included when present.
type DiffLine<'a> = (Tag, &'a [u8]);

impl DiffProvider for BuiltinDiff {
    fn diff(
        &self,
        before: &Path,
        after: &Path,
        out: &mut dyn WriteColor,
    ) -> Result<(), ReportError> {
        let old = read_bytes(before)?;
        let new = read_bytes(after)?;
        if old == new {
            return Ok(());
        }
        let lines = diff_lines(&old, &new);

        out.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(out, "--- {}", before.display())?;
        writeln!(out, "+++ {}", after.display())?;
        out.reset()?;

        for (start, end) in hunks(&lines) {
            print_hunk(out, &lines, start, end)?;
        }
        Ok(())
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ReportError> {
    require(path)?;
    fs::read(path).map_err(|e| ReportError::read(path, e))
}

/// Line-level diff, one entry per line.
///
/// Lines are compared as raw bytes with their terminator, so a missing final
/// newline or a difference in non-UTF-8 bytes still counts as a change. Each
/// distinct line is replaced by a numeric token before handing the sequence
/// to `Changeset`, which keeps empty lines from collapsing into nothing.
fn diff_lines<'a>(old: &'a [u8], new: &'a [u8]) -> Vec<DiffLine<'a>> {
    let old_lines: Vec<&[u8]> = old.split_inclusive(|b| *b == b'\n').collect();
    let new_lines: Vec<&[u8]> = new.split_inclusive(|b| *b == b'\n').collect();
    if old_lines.is_empty() || new_lines.is_empty() {
        let removed = old_lines.into_iter().map(|l| (Tag::Rem, l));
        let added = new_lines.into_iter().map(|l| (Tag::Add, l));
        return removed.chain(added).collect();
    }

    let mut ids: HashMap<&'a [u8], usize> = HashMap::new();
    let mut by_id: Vec<&'a [u8]> = Vec::new();
    let mut tokens = |lines: &[&'a [u8]]| -> String {
        let mut joined = Vec::with_capacity(lines.len());
        for line in lines {
            let id = *ids.entry(*line).or_insert_with(|| {
                by_id.push(*line);
                by_id.len() - 1
            });
            joined.push(id.to_string());
        }
        joined.join("\n")
    };
    let old_tokens = tokens(&old_lines);
    let new_tokens = tokens(&new_lines);

    let changeset = Changeset::new(&old_tokens, &new_tokens, "\n");
    let mut lines = Vec::new();
    for diff in changeset.diffs {
        let (tag, chunk) = match diff {
            Difference::Same(x) => (Tag::Same, x),
            Difference::Add(x) => (Tag::Add, x),
            Difference::Rem(x) => (Tag::Rem, x),
        };
        lines.extend(
            chunk
                .split('\n')
                .filter_map(|t| t.parse::<usize>().ok())
                .filter_map(|id| by_id.get(id))
                .map(|line| (tag, *line)),
        );
    }
    removals_first(&mut lines);
    lines
}

/// Within each run of changed lines, puts removals before additions.
fn removals_first(lines: &mut [DiffLine<'_>]) {
    let mut i = 0;
    while i < lines.len() {
        if lines[i].0 == Tag::Same {
            i += 1;
            continue;
        }
        let end = lines[i..]
            .iter()
            .position(|(t, _)| *t == Tag::Same)
            .map_or(lines.len(), |n| i + n);
        lines[i..end].sort_by_key(|(t, _)| *t == Tag::Add);
        i = end;
    }
}

/// Groups changed lines into `[start, end)` ranges with surrounding context,
/// merging ranges whose context would overlap.
fn hunks(lines: &[DiffLine<'_>]) -> Vec<(usize, usize)> {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for (i, _) in lines.iter().enumerate().filter(|(_, (t, _))| *t != Tag::Same) {
        let start = i.saturating_sub(CONTEXT_LINES);
        let end = (i + 1 + CONTEXT_LINES).min(lines.len());
        match ranges.last_mut() {
            Some(last) if start <= last.1 => last.1 = end,
            _ => ranges.push((start, end)),
        }
    }
    ranges
}

fn hunk_range(first: usize, len: usize) -> String {
    match len {
        0 => format!("{},0", first.saturating_sub(1)),
        1 => format!("{first}"),
        _ => format!("{first},{len}"),
    }
}

fn print_hunk(
    out: &mut dyn WriteColor,
    lines: &[DiffLine<'_>],
    start: usize,
    end: usize,
) -> Result<(), ReportError> {
    let old_before = lines[..start].iter().filter(|(t, _)| *t != Tag::Add).count();
    let new_before = lines[..start].iter().filter(|(t, _)| *t != Tag::Rem).count();
    let hunk = &lines[start..end];
    let old_len = hunk.iter().filter(|(t, _)| *t != Tag::Add).count();
    let new_len = hunk.iter().filter(|(t, _)| *t != Tag::Rem).count();

    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
    write!(
        out,
        "@@ -{} +{} @@",
        hunk_range(old_before + 1, old_len),
        hunk_range(new_before + 1, new_len)
    )?;
    out.reset()?;
    writeln!(out)?;

    for (tag, line) in hunk {
        match tag {
            Tag::Same => print_line(out, ' ', line, None)?,
            Tag::Add => print_line(out, '+', line, Some(Color::Green))?,
            Tag::Rem => print_line(out, '-', line, Some(Color::Red))?,
        }
    }
    Ok(())
}

fn print_line(
    out: &mut dyn WriteColor,
    sign: char,
    line: &[u8],
    color: Option<Color>,
) -> Result<(), ReportError> {
    let (body, terminated) = match line.split_last() {
        Some((b'\n', body)) => (body, true),
        _ => (line, false),
    };
    if color.is_some() {
        out.set_color(ColorSpec::new().set_fg(color))?;
    }
    write!(out, "{}{}", sign, String::from_utf8_lossy(body))?;
    if color.is_some() {
        out.reset()?;
    }
    writeln!(out)?;
    if !terminated {
        writeln!(out, "\\ No newline at end of file")?;
    }
    Ok(())
}
