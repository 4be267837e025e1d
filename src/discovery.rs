use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::fixture::{flat_case_id, is_case_member, FixtureCase};
use crate::ReportError;

/// Fixture root layouts understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Layout {
    /// Pick per root: directory-per-case if any subdirectory exists, else flat.
    #[default]
    Auto,
    /// `<root>/<case>/before.nix`, `<root>/<case>/after.nix`, ...
    Directory,
    /// `<root>/<case>.before.nix`, `<root>/<case>.after.nix`, ...
    Flat,
}

/// Enumerates the fixture cases stored under a root.
pub trait DiscoveryStrategy {
    /// Returns the cases in a stable order. A missing root yields no cases.
    fn discover(&self, root: &Path) -> Result<Vec<FixtureCase>, ReportError>;
}

/// One subdirectory per case.
#[derive(Debug, Default)]
pub struct DirectoryLayout;

/// Case ids embedded as file name prefixes in a single directory.
#[derive(Debug, Default)]
pub struct FlatLayout;

impl DiscoveryStrategy for DirectoryLayout {
    fn discover(&self, root: &Path) -> Result<Vec<FixtureCase>, ReportError> {
        let cases = top_level_entries(root)?
            .into_iter()
            .filter(is_dir)
            .map(|entry| FixtureCase::in_directory(entry.into_path()))
            .collect();
        Ok(cases)
    }
}

impl DiscoveryStrategy for FlatLayout {
    fn discover(&self, root: &Path) -> Result<Vec<FixtureCase>, ReportError> {
        let mut ids = BTreeSet::new();
        for entry in top_level_entries(root)? {
            if !is_file(&entry) {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if let Some(id) = flat_case_id(&name) {
                ids.insert(id.to_string());
            }
        }
        Ok(ids
            .into_iter()
            .map(|id| FixtureCase::flat(root, id))
            .collect())
    }
}

impl Layout {
    /// Resolves `Auto` against the contents of `root`.
    pub fn resolve(self, root: &Path) -> Result<Layout, ReportError> {
        if self != Layout::Auto {
            return Ok(self);
        }
        let entries = top_level_entries(root)?;
        let layout = if entries.iter().any(is_dir) {
            Layout::Directory
        } else if entries.iter().any(|e| is_file(e) && is_case_member(e.path())) {
            Layout::Flat
        } else {
            // Nothing to report either way.
            Layout::Directory
        };
        debug!(root = %root.display(), ?layout, "resolved fixture layout");
        Ok(layout)
    }
}

/// Discovers the cases under `root` using `layout`, resolving `Auto` first.
pub fn discover_cases(root: &Path, layout: Layout) -> Result<Vec<FixtureCase>, ReportError> {
    let cases = match layout.resolve(root)? {
        Layout::Flat => FlatLayout.discover(root)?,
        Layout::Directory | Layout::Auto => DirectoryLayout.discover(root)?,
    };
    debug!(count = cases.len(), "discovered fixture cases");
    Ok(cases)
}

// Both follow symlinks; a dangling link is neither.
fn is_dir(entry: &DirEntry) -> bool {
    entry.path().is_dir()
}

fn is_file(entry: &DirEntry) -> bool {
    entry.path().is_file()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Immediate non-hidden children of `root`, sorted by file name.
fn top_level_entries(root: &Path) -> Result<Vec<DirEntry>, ReportError> {
    if !root.exists() {
        debug!(root = %root.display(), "fixture root does not exist");
        return Ok(Vec::new());
    }
    let mut entries = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ReportError::RootUnreadable {
            path: PathBuf::from(root),
            source,
        })?;
        if is_hidden(&entry) {
            continue;
        }
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("munge-failures");
        assert!(discover_cases(&root, Layout::Auto).unwrap().is_empty());
        assert!(FlatLayout.discover(&root).unwrap().is_empty());
    }

    #[test]
    fn test_directory_layout_sorted() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("b/before.nix"));
        touch(&dir.path().join("a/before.nix"));
        touch(&dir.path().join("stray.txt"));

        let cases = discover_cases(dir.path(), Layout::Auto).unwrap();
        let ids: Vec<_> = cases.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_flat_layout_groups_by_prefix() {
        let dir = tempdir().unwrap();
        for name in [
            "foo.before.nix",
            "foo.after.nix",
            "foo.before.xml",
            "foo.after.xml",
            "bar.before.nix",
            "bar.after.nix",
            "bar.after.error",
            "README",
        ] {
            touch(&dir.path().join(name));
        }

        assert_eq!(Layout::Auto.resolve(dir.path()).unwrap(), Layout::Flat);
        let cases = discover_cases(dir.path(), Layout::Auto).unwrap();
        let ids: Vec<_> = cases.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["bar", "foo"]);
    }

    #[test]
    fn test_directory_wins_when_both_present() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("foo.before.nix"));
        touch(&dir.path().join("case/before.nix"));
        assert_eq!(Layout::Auto.resolve(dir.path()).unwrap(), Layout::Directory);

        let flat = discover_cases(dir.path(), Layout::Flat).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].id(), "foo");
    }

    #[test]
    fn test_hidden_entries_are_ignored() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join(".git/HEAD"));
        touch(&dir.path().join(".hidden.before.nix"));
        touch(&dir.path().join("foo.before.nix"));
        touch(&dir.path().join("foo.after.nix"));

        assert_eq!(Layout::Auto.resolve(dir.path()).unwrap(), Layout::Flat);
        let cases = discover_cases(dir.path(), Layout::Auto).unwrap();
        let ids: Vec<_> = cases.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["foo"]);
        assert!(DirectoryLayout.discover(dir.path()).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_followed() {
        use std::os::unix::fs::symlink;

        let store = tempdir().unwrap();
        touch(&store.path().join("foo.before.nix"));
        touch(&store.path().join("case/before.nix"));

        let flat = tempdir().unwrap();
        symlink(store.path().join("foo.before.nix"), flat.path().join("foo.before.nix")).unwrap();
        symlink(store.path().join("gone"), flat.path().join("gone.after.nix")).unwrap();
        assert_eq!(Layout::Auto.resolve(flat.path()).unwrap(), Layout::Flat);
        let ids: Vec<_> = discover_cases(flat.path(), Layout::Auto)
            .unwrap()
            .iter()
            .map(|c| c.id().to_string())
            .collect();
        assert_eq!(ids, vec!["foo"]);

        let dirs = tempdir().unwrap();
        symlink(store.path().join("case"), dirs.path().join("case")).unwrap();
        let cases = discover_cases(dirs.path(), Layout::Auto).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].id(), "case");
    }

    #[test]
    fn test_discovery_is_repeatable() {
        let dir = tempdir().unwrap();
        for id in ["z", "m", "a", "q"] {
            touch(&dir.path().join(id).join("after.error"));
        }
        let first = discover_cases(dir.path(), Layout::Auto).unwrap();
        let second = discover_cases(dir.path(), Layout::Auto).unwrap();
        assert_eq!(first, second);
    }
}
