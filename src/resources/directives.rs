//! Key/value directive patching for line-oriented configuration files.
//!
//! Files such as `sysctl.conf`, `sshd_config`, `login.defs` and
//! `pwquality.conf` consist of one `key<sep>value` directive per line, where
//! the separator is fixed per file format (`" = "`, `" "`, `"="`).  Patching
//! rewrites every line whose key is wanted, activating commented-out
//! directives on the way, and appends the keys that were not found.
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::fs::{backup_file, write_atomic};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::PatchError;

/// Desired settings: key → value. Ordered so appended keys are stable.
pub type DirectiveSet = BTreeMap<String, String>;

/// Build a [`DirectiveSet`] from string pairs.
///
/// # Examples
///
/// ```
/// use osharden_cli::resources::directives::directive_set;
///
/// let set = directive_set([("fs.suid_dumpable", "0")]);
/// assert_eq!(set["fs.suid_dumpable"], "0");
/// ```
pub fn directive_set<'a, I>(pairs: I) -> DirectiveSet
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .collect()
}

/// Outcome of patching a file's content in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    /// The patched file content.
    pub content: String,
    /// Keys whose existing line(s) were rewritten, in key order.
    pub rewritten: Vec<String>,
    /// Keys that were missing and got appended, in key order.
    pub appended: Vec<String>,
}

/// Extract the candidate key of a line, ignoring comment markers.
///
/// Returns `None` when the line does not contain the separator.
fn candidate_key(line: &str, separator: &str) -> Option<String> {
    let uncommented = line.replace('#', "");
    let mut segments = uncommented.split(separator);
    let first = segments.next()?;
    segments.next()?;
    Some(first.trim().to_string())
}

/// Merge `desired` into `content`.
///
/// Every non-empty line is inspected on a copy with all `#` removed; when the
/// copy splits on `separator` into at least two segments and the trimmed first
/// segment is a desired key, the whole line becomes `key<sep>value`.  All
/// other lines pass through untouched.  Keys never seen are appended in key
/// order, ahead of the trailing newline if the content has one.
///
/// An empty `separator` matches nothing, so every key is appended.
#[must_use]
pub fn patch_content(content: &str, separator: &str, desired: &DirectiveSet) -> Patched {
    let desired: BTreeMap<&str, &str> = desired
        .iter()
        .map(|(k, v)| (k.trim(), v.as_str()))
        .collect();
    let mut consumed: BTreeSet<&str> = BTreeSet::new();
    let mut lines: Vec<String> = Vec::new();

    for line in content.split('\n') {
        if line.is_empty() || separator.is_empty() {
            lines.push(line.to_string());
            continue;
        }
        match candidate_key(line, separator)
            .and_then(|key| desired.get_key_value(key.as_str()).map(|(k, v)| (*k, *v)))
        {
            Some((key, value)) => {
                lines.push(format!("{key}{separator}{value}"));
                consumed.insert(key);
            }
            None => lines.push(line.to_string()),
        }
    }

    let missing: Vec<(&str, &str)> = desired
        .iter()
        .filter(|(k, _)| !consumed.contains(*k))
        .map(|(k, v)| (*k, *v))
        .collect();
    let new_lines = missing.iter().map(|(k, v)| format!("{k}{separator}{v}"));

    let content = if content.is_empty() {
        if missing.is_empty() {
            String::new()
        } else {
            let mut out = new_lines.collect::<Vec<_>>().join("\n");
            out.push('\n');
            out
        }
    } else {
        // A trailing newline leaves an empty final segment; keep it last.
        let at = if content.ends_with('\n') {
            lines.len().saturating_sub(1)
        } else {
            lines.len()
        };
        let tail = lines.split_off(at);
        lines.extend(new_lines);
        lines.extend(tail);
        lines.join("\n")
    };

    Patched {
        content,
        rewritten: consumed.iter().map(ToString::to_string).collect(),
        appended: missing.iter().map(|(k, _)| (*k).to_string()).collect(),
    }
}

/// Merge `desired` into the file at `path`, replacing it atomically.
///
/// The file is left untouched when patching would not change it.
///
/// # Errors
///
/// Returns [`PatchError::Io`] if the file cannot be read or replaced.
pub fn apply_directives(
    desired: &DirectiveSet,
    separator: &str,
    path: &Path,
) -> Result<(), PatchError> {
    let original = fs::read_to_string(path).map_err(|e| PatchError::io(path, e))?;
    let patched = patch_content(&original, separator, desired);
    if patched.content != original {
        write_atomic(path, &patched.content).map_err(|e| PatchError::io(path, e))?;
    }
    Ok(())
}

/// Drop active lines whose key is in `keys` from `content`.
///
/// Commented lines are kept.  Returns the new content and the number of
/// lines removed.
#[must_use]
pub fn remove_content(content: &str, separator: &str, keys: &BTreeSet<String>) -> (String, usize) {
    let mut removed = 0;
    let kept: Vec<&str> = content
        .split('\n')
        .filter(|line| {
            if line.trim_start().starts_with('#') || separator.is_empty() {
                return true;
            }
            let mut segments = line.split(separator);
            let key = segments.next().map(str::trim);
            let drop = segments.next().is_some() && key.is_some_and(|k| keys.contains(k));
            if drop {
                removed += 1;
            }
            !drop
        })
        .collect();
    (kept.join("\n"), removed)
}

/// Remove active directives named in `keys` from the file at `path`.
///
/// Returns the number of lines removed.
///
/// # Errors
///
/// Returns [`PatchError::Io`] if the file cannot be read or replaced.
pub fn remove_directives(
    keys: &BTreeSet<String>,
    separator: &str,
    path: &Path,
) -> Result<usize, PatchError> {
    let original = fs::read_to_string(path).map_err(|e| PatchError::io(path, e))?;
    let (content, removed) = remove_content(&original, separator, keys);
    if removed > 0 {
        write_atomic(path, &content).map_err(|e| PatchError::io(path, e))?;
    }
    Ok(removed)
}

/// A configuration file that should carry a set of directives.
#[derive(Debug, Clone)]
pub struct DirectiveFile {
    /// File to patch.
    pub path: PathBuf,
    /// Separator between key and value for this file format.
    pub separator: String,
    /// Settings the file should contain.
    pub desired: DirectiveSet,
    /// Where to copy the file before changing it; `None` disables backups.
    pub backup_dir: Option<PathBuf>,
}

impl DirectiveFile {
    /// Create a new directive file resource without backups.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, separator: &str, desired: DirectiveSet) -> Self {
        Self {
            path: path.into(),
            separator: separator.to_string(),
            desired,
            backup_dir: None,
        }
    }

    /// Back the file up into `dir` before the first change.
    #[must_use]
    pub fn with_backup_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.backup_dir = dir;
        self
    }

    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PatchError::io(&self.path, e).into()),
        }
    }
}

impl Applicable for DirectiveFile {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        let original = self.read()?.ok_or_else(|| {
            PatchError::io(&self.path, io::Error::from(io::ErrorKind::NotFound))
        })?;
        let patched = patch_content(&original, &self.separator, &self.desired);
        if patched.content == original {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        if let Some(dir) = &self.backup_dir {
            backup_file(&self.path, dir)
                .with_context(|| format!("backing up {}", self.path.display()))?;
        }
        write_atomic(&self.path, &patched.content).map_err(|e| PatchError::io(&self.path, e))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for DirectiveFile {
    fn current_state(&self) -> Result<ResourceState> {
        let Some(original) = self.read()? else {
            return Ok(ResourceState::Missing);
        };
        let patched = patch_content(&original, &self.separator, &self.desired);
        if patched.content == original {
            return Ok(ResourceState::Correct);
        }
        let mut differing: Vec<String> = patched.appended;
        // Rewritten keys only count when one of their lines actually changed.
        for (key, value) in &self.desired {
            let wanted = format!("{key}{}{value}", self.separator);
            let stale = original.split('\n').any(|line| {
                !line.is_empty()
                    && candidate_key(line, &self.separator).as_deref() == Some(key.trim())
                    && line != wanted
            });
            if stale {
                differing.push(key.clone());
            }
        }
        differing.sort();
        Ok(ResourceState::Incorrect {
            current: format!("needs {}", differing.join(", ")),
        })
    }
}
