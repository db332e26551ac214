use crate::error::Result;
use crate::format;
use crate::fs::Filesystem;
use crate::metadata::IdentityLookup;
use std::error::Error as _;
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListSummary {
    pub listed: usize,
    pub failed: usize,
}

/// Lists the immediate children of `dir` in byte order.
///
/// A `dir` that cannot be opened or read to the end aborts the listing
/// before anything is written. In detailed mode an entry whose metadata
/// cannot be resolved is reported on `err` and the remaining entries are
/// still rendered. Failing to write to `out` or `err` stops the listing.
#[tracing::instrument(level = "debug", skip(fs, identity, out, err))]
pub(crate) fn list<W, E>(
    fs: &dyn Filesystem,
    dir: &Path,
    detailed: bool,
    identity: &dyn IdentityLookup,
    out: &mut W,
    err: &mut E,
) -> Result<ListSummary>
where
    W: Write + ?Sized,
    E: Write + ?Sized,
{
    let mut names = fs
        .entries(dir)?
        .map(|entry| entry.map(|entry| entry.name))
        .collect::<Result<Vec<OsString>>>()?;
    names.sort();
    tracing::debug!(count = names.len());

    if detailed {
        writeln!(out, "{}", format::header())?;
        writeln!(out, "{}", format::separator())?;
    } else {
        writeln!(out, "\nContents of {}:", dir.display())?;
    }

    let mut summary = ListSummary::default();
    for name in &names {
        if !detailed {
            writeln!(out, "  - {}", name.to_string_lossy())?;
            summary.listed += 1;
            continue;
        }

        match fs.resolve(dir, name, identity) {
            Ok(meta) => {
                writeln!(out, "{}", format::row(&meta, name))?;
                summary.listed += 1;
            }
            Err(e) => {
                tracing::warn!(?name, error = %e.report(), "skipping entry");
                write!(err, "  [stat error] {}", name.to_string_lossy())?;
                match e.source() {
                    Some(cause) => writeln!(err, " : {}", cause)?,
                    None => writeln!(err)?,
                }
                summary.failed += 1;
            }
        }
    }

    out.flush()?;
    Ok(summary)
}
