use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{AppError, AppResult};

const MARKDOWN_EXTENSION: &str = "md";

/// Collects every markdown file below `root`, in file-name order.
///
/// Symlinked directories are not descended into, but a symlink whose target is
/// a regular file is collected under its link path.
pub fn discover_markdown(root: &Path) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            AppError::Discovery(format!("failed to walk {}: {err}", root.display()))
        })?;
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if is_file && is_markdown(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension == MARKDOWN_EXTENSION)
}
