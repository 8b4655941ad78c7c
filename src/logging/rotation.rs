//! Log file rotation
//!
//! Backups use tailable naming: `<stem><n><ext>`, with `1` always the newest.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default size cap of the active log file (1 MiB)
pub const DEFAULT_MAX_SIZE: u64 = 1024 * 1024;

/// Default number of backup generations kept
pub const DEFAULT_MAX_FILES: usize = 1;

fn split_name(active: &Path) -> (String, String) {
    let stem = active
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = active
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (stem, ext)
}

/// Path of the `generation`-th backup of `active`
pub fn backup_path(active: &Path, generation: usize) -> PathBuf {
    let (stem, ext) = split_name(active);
    active.with_file_name(format!("{}{}{}", stem, generation, ext))
}

/// Move the active file into the backup chain
///
/// Existing backups shift up one generation and the one falling off the end is
/// removed. With `max_files == 0` the active file is simply removed.
pub fn rotate_files(active: &Path, max_files: usize) -> io::Result<()> {
    if max_files == 0 {
        return remove_if_exists(active);
    }

    remove_if_exists(&backup_path(active, max_files))?;
    for generation in (1..max_files).rev() {
        let from = backup_path(active, generation);
        if from.exists() {
            fs::rename(&from, backup_path(active, generation + 1))?;
        }
    }

    if active.exists() {
        fs::rename(active, backup_path(active, 1))?;
    }
    Ok(())
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Delete backups of `active` beyond `max_files` generations
///
/// Returns the number of files deleted.
pub fn cleanup_stale_backups(active: &Path, max_files: usize) -> io::Result<usize> {
    let Some(dir) = active.parent() else {
        return Ok(0);
    };
    if !dir.exists() {
        return Ok(0);
    }

    let (stem, ext) = split_name(active);
    let mut deleted_count = 0;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(generation) = name
            .strip_prefix(stem.as_str())
            .and_then(|rest| rest.strip_suffix(ext.as_str()))
            .and_then(|n| n.parse::<usize>().ok())
        else {
            continue;
        };

        if generation > max_files && fs::remove_file(&path).is_ok() {
            deleted_count += 1;
        }
    }

    Ok(deleted_count)
}
