//! File-system helpers shared by resources: atomic replacement and backups.
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Replace the contents of `path` atomically.
///
/// The new contents are written to a temporary file in the same directory
/// and renamed over `path`, so an interruption leaves either the old or the
/// new file, never a truncated one.  The original file's permissions are
/// carried over to the replacement.
///
/// When `path` is a symlink (e.g. `/etc/resolv.conf` under
/// systemd-resolved) the link is kept and its target is replaced instead.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, written, or
/// renamed into place.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let target = resolve_target(path)?;
    let path = target.as_path();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::Builder::new()
        .prefix(".osharden-")
        .tempfile_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;

    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions())?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// The file a write to `path` should land on: `path` itself, or the final
/// target when `path` is a symlink.
fn resolve_target(path: &Path) -> io::Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => fs::canonicalize(path),
        _ => Ok(path.to_path_buf()),
    }
}

/// Copy `path` into `backup_dir`, named after its content hash.
///
/// Backups are named `<file name>.<first 12 hex digits of SHA-256>.bak`, so
/// backing up an unchanged file twice reuses the existing copy.  Returns the
/// backup path.
///
/// # Errors
///
/// Returns an error if `path` cannot be read or the backup cannot be written.
pub fn backup_file(path: &Path, backup_dir: &Path) -> io::Result<PathBuf> {
    let bytes = fs::read(path)?;
    let digest = format!("{:x}", Sha256::digest(&bytes));
    let short = digest.get(..12).unwrap_or(&digest);
    let name = path
        .file_name()
        .map_or_else(|| "config".into(), |n| n.to_string_lossy().into_owned());

    fs::create_dir_all(backup_dir)?;
    let target = backup_dir.join(format!("{name}.{short}.bak"));
    if !target.exists() {
        fs::write(&target, &bytes)?;
    }
    Ok(target)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // write_atomic
    // -----------------------------------------------------------------------

    #[test]
    fn write_atomic_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sysctl.conf");
        fs::write(&file, "old\n").unwrap();
        write_atomic(&file, "new\n").unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "new\n");
    }

    #[test]
    fn write_atomic_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sshd_config");
        fs::write(&file, "Port 22\n").unwrap();
        write_atomic(&file, "Port 2222\n").unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "only the target file should remain");
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt as _;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("login.defs");
        fs::write(&file, "PASS_MAX_DAYS 99999\n").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o600)).unwrap();
        write_atomic(&file, "PASS_MAX_DAYS 30\n").unwrap();
        let mode = fs::metadata(&file).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_follows_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("stub-resolv.conf");
        let link = dir.path().join("resolv.conf");
        fs::write(&target, "nameserver 127.0.0.53\n").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        write_atomic(&link, "nameserver 1.1.1.1\n").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), target);
        assert_eq!(fs::read_to_string(&target).unwrap(), "nameserver 1.1.1.1\n");
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_dangling_symlink_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("sysctl.conf");
        std::os::unix::fs::symlink(dir.path().join("absent"), &link).unwrap();
        assert!(write_atomic(&link, "x\n").is_err());
    }

    // -----------------------------------------------------------------------
    // backup_file
    // -----------------------------------------------------------------------

    #[test]
    fn backup_file_copies_contents() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("hosts");
        fs::write(&file, "127.0.0.1 localhost\n").unwrap();
        let backup = backup_file(&file, &dir.path().join("backups")).unwrap();
        assert_eq!(
            fs::read_to_string(&backup).unwrap(),
            "127.0.0.1 localhost\n"
        );
        let name = backup.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("hosts."));
        assert!(name.ends_with(".bak"));
    }

    #[test]
    fn backup_file_deduplicates_identical_content() {
        let dir = tempfile::tempdir().unwrap();
        let backups = dir.path().join("backups");
        let file = dir.path().join("resolv.conf");
        fs::write(&file, "nameserver 1.1.1.1\n").unwrap();
        let first = backup_file(&file, &backups).unwrap();
        let second = backup_file(&file, &backups).unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read_dir(&backups).unwrap().count(), 1);
    }

    #[test]
    fn backup_file_distinguishes_changed_content() {
        let dir = tempfile::tempdir().unwrap();
        let backups = dir.path().join("backups");
        let file = dir.path().join("resolv.conf");
        fs::write(&file, "nameserver 1.1.1.1\n").unwrap();
        let first = backup_file(&file, &backups).unwrap();
        fs::write(&file, "nameserver 9.9.9.9\n").unwrap();
        let second = backup_file(&file, &backups).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn backup_file_missing_source_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = backup_file(&dir.path().join("absent"), dir.path());
        assert!(result.is_err());
    }
}
