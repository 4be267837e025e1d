//! Fixture-root builders shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary `munge-failures` directory.
pub struct FixtureRoot {
    dir: TempDir,
}

impl FixtureRoot {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("munge-failures")).unwrap();
        Self { dir }
    }

    /// The directory containing `munge-failures`.
    pub fn workdir(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("munge-failures")
    }

    /// Writes `<root>/<case>/<name>`.
    pub fn case_file(&self, case: &str, name: &str, contents: &str) -> &Self {
        let dir = self.path().join(case);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), contents).unwrap();
        self
    }

    /// Writes `<root>/<case>.<name>`.
    pub fn flat_file(&self, case: &str, name: &str, contents: &str) -> &Self {
        fs::write(self.path().join(format!("{case}.{name}")), contents).unwrap();
        self
    }

    /// A case whose sources differ by one added line and whose output matches.
    pub fn with_foo(&self) -> &Self {
        self.case_file("foo", "before.nix", "{\n  a = 1;\n}\n")
            .case_file("foo", "after.nix", "{\n  a = 1;\n  b = 2;\n}\n")
            .case_file("foo", "before.xml", "<para>same</para>\n")
            .case_file("foo", "after.xml", "<para>same</para>\n")
    }

    /// A case with identical sources whose after side failed to build.
    pub fn with_bar(&self) -> &Self {
        self.case_file("bar", "before.nix", "{ }\n")
            .case_file("bar", "after.nix", "{ }\n")
            .case_file(
                "bar",
                "after.error",
                "build failed: see below\nsome unrelated output\nRuntimeError: boom\ntrailing noise\n",
            )
    }
}
