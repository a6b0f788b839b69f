// Shared helpers for integration tests.
//
// Provides temporary-directory-backed configuration files so each
// integration test can patch real files without repeating filesystem
// boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// A configuration file inside its own [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct TempConfigFile {
    /// Temporary directory holding the file.
    pub dir: tempfile::TempDir,
    /// Path to the file.
    pub path: PathBuf,
}

impl TempConfigFile {
    /// Create `name` with `content` in a fresh temporary directory.
    pub fn new(name: &str, content: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("write config file");
        Self { dir, path }
    }

    /// Path of a sibling that does not exist.
    pub fn missing_sibling(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Current file content.
    pub fn read(&self) -> String {
        read(&self.path)
    }
}

/// Read `path` to a string.
pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read config file")
}

/// Number of lines in `content`, counting an unterminated final line.
pub fn line_count(content: &str) -> usize {
    content.lines().count()
}
