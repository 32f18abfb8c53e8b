//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob, Pattern};
use walkdir::WalkDir;

/// Recursively copy a directory tree, creating `dst` if needed.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    ensure_dir(dst)?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry =
            entry.with_context(|| format!("failed to read directory: {}", src.display()))?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else {
            fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
        }
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Find files under `base` matching a glob pattern.
///
/// `base` is escaped, so directories with glob metacharacters in their
/// names are matched literally.
pub fn glob_files(base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped = Pattern::escape(&base.to_string_lossy());
    let full_pattern = format!("{}/{}", escaped.trim_end_matches('/'), pattern);

    let mut results = Vec::new();
    for entry in glob(&full_pattern).with_context(|| format!("invalid glob pattern: {}", pattern))? {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    results.push(path);
                }
            }
            Err(e) => {
                tracing::warn!("glob error: {}", e);
            }
        }
    }

    results.sort();
    Ok(results)
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_glob_files() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("recipes [v2]");
        fs::create_dir_all(root.join("libfoo/1.0")).unwrap();
        fs::create_dir_all(root.join("libfoo/2.0")).unwrap();
        fs::write(root.join("libfoo/1.0/recipe.lua"), "return {}").unwrap();
        fs::write(root.join("libfoo/2.0/recipe.lua"), "return {}").unwrap();
        fs::write(root.join("libfoo/2.0/notes.txt"), "notes").unwrap();

        let files = glob_files(&root, "*/*/recipe.lua").unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("libfoo/1.0/recipe.lua"));
    }

    #[test]
    fn test_copy_dir_all() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        fs::create_dir_all(src.join("patches")).unwrap();
        fs::write(src.join("recipe.lua"), "return {}").unwrap();
        fs::write(src.join("patches/fix.patch"), "diff").unwrap();

        copy_dir_all(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("recipe.lua")).unwrap(), "return {}");
        assert!(dst.join("patches/fix.patch").exists());
    }
}
