//! The filesystem primitives the lister and searcher are built on.

use crate::enumerate::{self, DirEntry};
use crate::error::Result;
use crate::metadata::{self, EntryMetadata, IdentityLookup};
use std::ffi::OsStr;
use std::path::Path;

pub(crate) type EntryIter<'a> = Box<dyn Iterator<Item = Result<DirEntry>> + 'a>;

pub(crate) trait Filesystem {
    /// Opens `dir` and enumerates its immediate children.
    fn entries(&self, dir: &Path) -> Result<EntryIter<'_>>;

    /// Resolves `dir/name` without following a symbolic link.
    fn resolve(
        &self,
        dir: &Path,
        name: &OsStr,
        identity: &dyn IdentityLookup,
    ) -> Result<EntryMetadata>;
}

/// The local filesystem of this process.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn entries(&self, dir: &Path) -> Result<EntryIter<'_>> {
        Ok(Box::new(enumerate::entries(dir)?))
    }

    fn resolve(
        &self,
        dir: &Path,
        name: &OsStr,
        identity: &dyn IdentityLookup,
    ) -> Result<EntryMetadata> {
        metadata::resolve(dir, name, identity)
    }
}

/// A local filesystem with failures injected at chosen paths.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FaultyFilesystem {
    /// Directories that fail to open.
    pub unreadable: Vec<std::path::PathBuf>,
    /// Directories whose enumeration fails after this many entries.
    pub broken: Vec<(std::path::PathBuf, usize)>,
    /// Entry names whose metadata cannot be resolved.
    pub unstatable: Vec<std::ffi::OsString>,
}

#[cfg(test)]
impl Filesystem for FaultyFilesystem {
    fn entries(&self, dir: &Path) -> Result<EntryIter<'_>> {
        use crate::error::Error;
        use std::io;

        if self.unreadable.iter().any(|p| p == dir) {
            return Err(Error::DirectoryUnreadable {
                path: dir.to_owned(),
                source: io::Error::from_raw_os_error(libc::EACCES),
            });
        }

        let inner = enumerate::entries(dir)?;
        match self.broken.iter().find(|(p, _)| p == dir) {
            Some(&(ref path, after)) => {
                let failure = Error::DirectoryReadFailed {
                    path: path.clone(),
                    source: io::Error::from_raw_os_error(libc::EIO),
                };
                Ok(Box::new(inner.take(after).chain(std::iter::once(Err(failure)))))
            }
            None => Ok(Box::new(inner)),
        }
    }

    fn resolve(
        &self,
        dir: &Path,
        name: &OsStr,
        identity: &dyn IdentityLookup,
    ) -> Result<EntryMetadata> {
        if self.unstatable.iter().any(|n| n == name) {
            return Err(crate::error::Error::MetadataUnavailable {
                path: dir.join(name),
                source: std::io::Error::from_raw_os_error(libc::ENOENT),
            });
        }
        metadata::resolve(dir, name, identity)
    }
}
