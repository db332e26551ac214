use crate::error::{Error, Result};
use std::env;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Creates an empty file, refusing to touch one that already exists.
#[tracing::instrument(level = "debug")]
pub(crate) fn create_file(root: &Path, name: &str) -> Result<PathBuf> {
    let path = root.join(name);
    match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(_) => Ok(path),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            Err(Error::AlreadyExists { path })
        }
        Err(source) => Err(Error::CreateFailed { path, source }),
    }
}

#[tracing::instrument(level = "debug")]
pub(crate) fn delete_file(root: &Path, name: &str) -> Result<PathBuf> {
    let path = root.join(name);
    match fs::remove_file(&path) {
        Ok(()) => Ok(path),
        Err(source) => Err(Error::RemoveFailed { path, source }),
    }
}

/// Moves the process into `target`, resolved against `root`, and returns the
/// new working directory.
#[tracing::instrument(level = "debug")]
pub(crate) fn change_directory(root: &Path, target: &str) -> Result<PathBuf> {
    let path = root.join(target);
    let failed = |source| Error::ChangeDirectoryFailed {
        path: path.clone(),
        source,
    };
    env::set_current_dir(&path).map_err(failed)?;
    env::current_dir().map_err(failed)
}
