//! Recursive search for entries by exact name.

use crate::enumerate::TypeHint;
use crate::error::{Error, Result};
use crate::fs::Filesystem;
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::Path;

/// Receives search results as they are discovered.
///
/// An error returned from either method stops the walk.
pub(crate) trait SearchSink {
    fn found(&mut self, path: &Path) -> io::Result<()>;

    /// Called for every directory that could not be opened or read to the
    /// end. The walk continues regardless.
    fn skipped(&mut self, _path: &Path, _err: &Error) -> io::Result<()> {
        Ok(())
    }
}

/// Walks the tree under `root` and reports every non-directory entry whose
/// name equals `target` exactly.
///
/// Directories are descended into but never compared against `target`, so a
/// directory named `target` is not itself reported. Symbolic links are never
/// followed. Returns the number of matches.
#[tracing::instrument(level = "debug", skip(fs, sink))]
pub(crate) fn search(
    fs: &dyn Filesystem,
    root: &Path,
    target: &OsStr,
    sink: &mut dyn SearchSink,
) -> Result<usize> {
    let mut pending = vec![root.to_owned()];
    let mut matches = 0;

    while let Some(dir) = pending.pop() {
        let entries = match fs.entries(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(?dir, error = %err.report(), "skip subtree");
                sink.skipped(&dir, &err)?;
                continue;
            }
        };

        let mut subdirs = vec![];
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    // Whatever was read before the failure is still searched.
                    tracing::debug!(?dir, error = %err.report(), "partial subtree");
                    sink.skipped(&dir, &err)?;
                    break;
                }
            };
            let full = dir.join(&entry.name);
            match entry.hint {
                TypeHint::Directory => subdirs.push(full),
                TypeHint::NonDirectory | TypeHint::Unknown => {
                    if entry.name.as_os_str() == target {
                        matches += 1;
                        sink.found(&full)?;
                    }
                }
            }
        }

        // Visit siblings in the order they were enumerated.
        pending.extend(subdirs.into_iter().rev());
    }

    tracing::debug!(matches);
    Ok(matches)
}

/// Prints `Found: <path>` lines and, optionally, skipped subtrees.
pub(crate) struct PrintSink<'a, W: ?Sized, E: ?Sized> {
    out: &'a mut W,
    err: &'a mut E,
    report_skipped: bool,
}

impl<'a, W, E> PrintSink<'a, W, E>
where
    W: Write + ?Sized,
    E: Write + ?Sized,
{
    pub(crate) fn new(out: &'a mut W, err: &'a mut E, report_skipped: bool) -> Self {
        Self {
            out,
            err,
            report_skipped,
        }
    }
}

impl<W, E> SearchSink for PrintSink<'_, W, E>
where
    W: Write + ?Sized,
    E: Write + ?Sized,
{
    fn found(&mut self, path: &Path) -> io::Result<()> {
        writeln!(self.out, "Found: {}", path.display())?;
        self.out.flush()
    }

    fn skipped(&mut self, _path: &Path, err: &Error) -> io::Result<()> {
        if self.report_skipped {
            writeln!(self.err, "[search] skipped {}", err.report())?;
        }
        Ok(())
    }
}
