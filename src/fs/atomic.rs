//! Atomic file writes.
//!
//! Content goes to `.{filename}.tmp` in the target's directory, is synced,
//! and is then renamed over the target, so the renderer never opens a
//! partially written script. Rename is atomic when source and target share
//! a filesystem, which holds because the temp file is a sibling.

use crate::error::{DoubtreelError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file, creating parent directories.
///
/// # Example
///
/// ```no_run
/// use doubtreel::fs::atomic_write;
/// use std::path::Path;
///
/// atomic_write(Path::new("/tmp/doubtreel/manim_x.py"), b"from manim import *\n")?;
/// # Ok::<(), doubtreel::error::DoubtreelError>(())
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| DoubtreelError::filesystem(parent, e))?;
    }

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;
    atomic_replace(&temp_path, path)
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

fn generate_temp_path(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            DoubtreelError::Config(format!(
                "invalid file path '{}': no file name",
                target.display()
            ))
        })?;

    Ok(parent.join(format!(".{filename}.tmp")))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| DoubtreelError::filesystem(path, e))?;

    let written = file.write_all(content).and_then(|()| file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(path);
        return Err(DoubtreelError::filesystem(path, e));
    }

    Ok(())
}

fn atomic_replace(source: &Path, target: &Path) -> Result<()> {
    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        DoubtreelError::filesystem(target, e)
    })?;

    // Persist the directory entry as well.
    #[cfg(unix)]
    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("manim_abc.py");

        atomic_write_file(&file_path, "from manim import *\n").unwrap();

        let content = fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, "from manim import *\n");
    }

    #[test]
    fn test_atomic_write_replace_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("renders.ndjson");
        fs::write(&file_path, "original content").unwrap();

        atomic_write(&file_path, b"new content").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("scratch").join("jobs").join("s.py");

        atomic_write(&file_path, b"nested content").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "nested content");
    }

    #[test]
    fn test_atomic_write_temp_file_cleanup() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("scene.py");

        atomic_write(&file_path, b"content").unwrap();

        assert!(!temp_dir.path().join(".scene.py.tmp").exists());
    }

    #[test]
    fn test_atomic_write_into_file_parent_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = atomic_write(blocker.join("scene.py"), b"x").unwrap_err();
        assert!(matches!(err, DoubtreelError::Filesystem { .. }));
    }

    #[test]
    fn test_generate_temp_path() {
        let temp = generate_temp_path(Path::new("/some/path/manim_1.py")).unwrap();
        assert_eq!(temp, Path::new("/some/path/.manim_1.py.tmp"));
    }

    #[test]
    fn test_atomic_write_unicode_content() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("scene.py");

        atomic_write_file(&file_path, "Text(\"f(x) = x²\")").unwrap();

        assert_eq!(
            fs::read_to_string(&file_path).unwrap(),
            "Text(\"f(x) = x²\")"
        );
    }
}
