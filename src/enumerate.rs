//! Lazy enumeration of the immediate children of a directory.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Type classification that comes for free with a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeHint {
    Directory,
    NonDirectory,
    Unknown,
}

#[derive(Debug)]
pub(crate) struct DirEntry {
    pub name: OsString,
    pub hint: TypeHint,
}

/// Iterator over the children of one directory.
///
/// The underlying directory handle is owned by the iterator and is closed
/// as soon as the iterator is exhausted, fails, or is dropped. A read error
/// is yielded once as `DirectoryReadFailed`, after which the iterator ends.
#[derive(Debug)]
pub(crate) struct Entries {
    path: PathBuf,
    inner: Option<fs::ReadDir>,
}

pub(crate) fn entries<P: AsRef<Path>>(path: P) -> Result<Entries> {
    let path = path.as_ref();
    tracing::debug!(?path, "opendir");

    let inner = fs::read_dir(path).map_err(|source| Error::DirectoryUnreadable {
        path: path.to_owned(),
        source,
    })?;

    Ok(Entries {
        path: path.to_owned(),
        inner: Some(inner),
    })
}

impl Iterator for Entries {
    type Item = Result<DirEntry>;

    fn next(&mut self) -> Option<Result<DirEntry>> {
        let inner = self.inner.as_mut()?;
        match inner.next() {
            Some(Ok(entry)) => {
                let hint = match entry.file_type() {
                    Ok(typ) if typ.is_dir() => TypeHint::Directory,
                    Ok(_) => TypeHint::NonDirectory,
                    Err(_) => TypeHint::Unknown,
                };
                Some(Ok(DirEntry {
                    name: entry.file_name(),
                    hint,
                }))
            }
            Some(Err(source)) => {
                tracing::warn!(path = ?self.path, ?source, "readdir failed");
                self.inner = None;
                Some(Err(Error::DirectoryReadFailed {
                    path: self.path.clone(),
                    source,
                }))
            }
            None => {
                self.inner = None;
                None
            }
        }
    }
}
