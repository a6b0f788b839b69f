use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::{Context, Script};
use crate::platform::Os;

/// Report media and document files stored in user home directories.
#[derive(Debug)]
pub struct MediaSearch;

/// Whether the text after the last `.` of the file name is one of
/// `extensions`, ignoring ASCII case.
fn has_media_extension(path: &Path, extensions: &[String]) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once('.'))
        .is_some_and(|(_, ext)| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Collect matching files under `dir`, depth first.
///
/// Symlinks are not followed. Subdirectories that cannot be read are logged
/// and skipped.
fn find_media(
    ctx: &Context,
    dir: &Path,
    extensions: &[String],
    found: &mut Vec<PathBuf>,
) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?
        .filter_map(Result::ok)
        .collect();
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if let Err(e) = find_media(ctx, &path, extensions, found) {
                ctx.log.debug(&format!("skipping {}: {e:#}", path.display()));
            }
        } else if file_type.is_file() && has_media_extension(&path, extensions) {
            found.push(path);
        }
    }
    Ok(())
}

impl Script for MediaSearch {
    fn name(&self) -> &str {
        "media-search"
    }

    fn description(&self) -> &str {
        "Find media files in user home directories"
    }

    fn supported_os(&self) -> &[Os] {
        &[Os::Linux, Os::Windows]
    }

    fn run(&self, os: Os, ctx: &Context) -> Result<()> {
        let root = ctx.config.home_root(os);
        ctx.log
            .info(&format!("searching {} for media files", root.display()));

        let mut found = Vec::new();
        find_media(ctx, &root, &ctx.config.media_extensions, &mut found)?;
        for path in &found {
            let shown = dunce::simplified(path);
            ctx.log.warn(&format!("Found {}", shown.display()));
        }
        ctx.log.info(&format!("{} media file(s) found", found.len()));
        Ok(())
    }
}
