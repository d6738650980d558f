//! Scoped ownership of a job's script file.

use crate::error::Result;
use crate::fs::atomic_write_file;
use std::io;
use std::path::{Path, PathBuf};

/// A script file that exists exactly as long as this value.
///
/// Call [`EphemeralScript::release`] to remove it and observe the result;
/// otherwise `Drop` removes it silently (error returns, panics, or a
/// cancelled render future).
#[derive(Debug)]
pub struct EphemeralScript {
    path: PathBuf,
    released: bool,
}

impl EphemeralScript {
    /// Atomically write `source` to `path` and take ownership of the file.
    pub fn write(path: impl Into<PathBuf>, source: &str) -> Result<Self> {
        let path = path.into();
        atomic_write_file(&path, source)?;
        Ok(Self {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now. A file that is already gone counts as removed.
    pub fn release(mut self) -> io::Result<()> {
        self.released = true;
        remove_if_present(&self.path)
    }
}

impl Drop for EphemeralScript {
    fn drop(&mut self) {
        if !self.released {
            let _ = remove_if_present(&self.path);
        }
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
