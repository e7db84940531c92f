//! Tree and single-file copies.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Recursively mirror `src` into `dst`, skipping excluded directory and file names.
///
/// Creates `dst` if it does not exist. Returns the number of files copied.
pub fn copy_tree(
    src: &Path,
    dst: &Path,
    exclude_dirs: &[String],
    exclude_files: &[String],
) -> Result<usize> {
    std::fs::create_dir_all(dst)?;
    let mut copied = 0;

    let walker = WalkDir::new(src)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !exclude_dirs.iter().any(|d| e.file_name() == d.as_str())
        });

    for entry in walker {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| anyhow::anyhow!("walked outside {}: {e}", src.display()))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if exclude_files.iter().any(|f| entry.file_name() == f.as_str()) {
                tracing::debug!("skipping {}", entry.path().display());
                continue;
            }
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Copy one file to `dest_root/subpath`, creating intermediate directories.
///
/// Returns the destination path.
pub fn place_unit(source: &Path, dest_root: &Path, subpath: &Path) -> Result<PathBuf> {
    let target = dest_root.join(subpath);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(source, &target)?;
    tracing::debug!("placed {} -> {}", source.display(), target.display());
    Ok(target)
}
