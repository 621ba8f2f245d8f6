//! Publish-tree clearing and copying.
//!
//! The publish tree is disposable: the last successful build wholly replaces
//! it. Removal tolerates transient busy errors from an IDE or file watcher
//! holding a handle on the tree, with a small bounded retry.

use anyhow::{Context, Result};
use std::{fs, io, path::Path, thread, time::Duration};
use walkdir::WalkDir;

/// Attempts before giving up on clearing a busy publish directory.
const REMOVE_RETRIES: u32 = 3;
/// Delay between removal attempts.
const REMOVE_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Remove and recreate the publish directory.
pub fn clean_dir(dir: &Path) -> Result<()> {
    for attempt in 0..=REMOVE_RETRIES {
        match fs::remove_dir_all(dir) {
            Ok(()) => break,
            Err(err) if err.kind() == io::ErrorKind::NotFound => break,
            Err(_) if attempt < REMOVE_RETRIES => thread::sleep(REMOVE_RETRY_DELAY),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to clear publish directory: {}", dir.display())
                });
            }
        }
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create publish directory: {}", dir.display()))
}

/// Recursively copy `src` into `dst`, creating directories as needed.
///
/// Existing files are overwritten in place. Files only present in `dst` are
/// left alone; removing them is the clean step's job.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("Failed to create destination directory: {}", dst.display()))?;

    for entry in WalkDir::new(src) {
        let entry = entry.context("Failed to read source directory")?;
        let rel = entry.path().strip_prefix(src)?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory: {}", target.display()))?;
        } else {
            fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
        }
    }

    Ok(())
}

/// Count leaf files under `dir` recursively (directories excluded).
pub fn count_files(dir: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(dir) {
        let entry = entry.context("Failed to read directory")?;
        if entry.file_type().is_file() {
            count += 1;
        }
    }
    Ok(count)
}
