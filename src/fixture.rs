//! Fixture cases produced by `nix-doc-munge`.
//!
//! A case groups the before/after sources of one attempted conversion with
//! either the rendered manual output of both sides or the error log of the
//! failed build. Artifact paths are derived from the naming convention only;
//! existence is checked when the case is rendered.

use std::path::{Path, PathBuf};

/// Artifact kinds a fixture case may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    BeforeSource,
    AfterSource,
    BeforeOutput,
    AfterOutput,
    BeforeRawOutput,
    AfterRawOutput,
    AfterError,
}

impl Artifact {
    /// File name of the artifact in the directory-per-case layout.
    pub fn file_name(self) -> &'static str {
        match self {
            Artifact::BeforeSource => "before.nix",
            Artifact::AfterSource => "after.nix",
            Artifact::BeforeOutput => "before.xml",
            Artifact::AfterOutput => "after.xml",
            Artifact::BeforeRawOutput => "before.raw.xml",
            Artifact::AfterRawOutput => "after.raw.xml",
            Artifact::AfterError => "after.error",
        }
    }
}

/// How a case's artifacts are spelled on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Naming {
    /// `<root>/<id>/<artifact>`
    Directory(PathBuf),
    /// `<root>/<id>.<artifact>`
    Flat { root: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureCase {
    id: String,
    naming: Naming,
}

/// Which pair of files a case should be compared on after the sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    /// Both sides built; diff the rendered output.
    Rendered { before: PathBuf, after: PathBuf },
    /// The `after` side failed to build.
    Failed { error_log: PathBuf },
}

impl FixtureCase {
    /// A case stored as its own directory.
    pub fn in_directory(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let id = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            id,
            naming: Naming::Directory(dir),
        }
    }

    /// A case stored as `<root>/<id>.before.*` / `<root>/<id>.after.*` files.
    pub fn flat(root: impl Into<PathBuf>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            naming: Naming::Flat { root: root.into() },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Label shown in the report header: the case directory, or the shared
    /// path prefix of a flat case.
    pub fn label(&self) -> String {
        match &self.naming {
            Naming::Directory(dir) => dir.display().to_string(),
            Naming::Flat { root } => root.join(&self.id).display().to_string(),
        }
    }

    pub fn path(&self, artifact: Artifact) -> PathBuf {
        match &self.naming {
            Naming::Directory(dir) => dir.join(artifact.file_name()),
            Naming::Flat { root } => {
                root.join(format!("{}.{}", self.id, artifact.file_name()))
            }
        }
    }

    pub fn has(&self, artifact: Artifact) -> bool {
        self.path(artifact).is_file()
    }

    /// Classifies the case by the presence of the `before` rendered output.
    ///
    /// With `prefer_raw`, the un-normalized output pair is used when both
    /// raw files exist.
    pub fn outcome(&self, prefer_raw: bool) -> CaseOutcome {
        if !self.has(Artifact::BeforeOutput) {
            return CaseOutcome::Failed {
                error_log: self.path(Artifact::AfterError),
            };
        }
        if prefer_raw && self.has(Artifact::BeforeRawOutput) && self.has(Artifact::AfterRawOutput)
        {
            return CaseOutcome::Rendered {
                before: self.path(Artifact::BeforeRawOutput),
                after: self.path(Artifact::AfterRawOutput),
            };
        }
        CaseOutcome::Rendered {
            before: self.path(Artifact::BeforeOutput),
            after: self.path(Artifact::AfterOutput),
        }
    }
}

/// Splits a flat-layout file name into its case id, if it carries a
/// `.before.` or `.after.` marker. The first marker wins.
pub fn flat_case_id(file_name: &str) -> Option<&str> {
    let before = file_name.find(".before.");
    let after = file_name.find(".after.");
    let end = match (before, after) {
        (Some(b), Some(a)) => b.min(a),
        (Some(i), None) | (None, Some(i)) => i,
        (None, None) => return None,
    };
    if end == 0 {
        return None;
    }
    Some(&file_name[..end])
}

pub(crate) fn is_case_member(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(flat_case_id)
        .is_some()
}
