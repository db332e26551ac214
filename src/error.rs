use std::error::Error as _;
use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("opendir failed for {}", path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("readdir failed for {}", path.display())]
    DirectoryReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("stat failed for {}", path.display())]
    MetadataUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("create failed for {}", path.display())]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("remove failed for {}", path.display())]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("chdir failed for {}", path.display())]
    ChangeDirectoryFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output")]
    Output(
        #[from]
        #[source]
        io::Error,
    ),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wraps the error so that it displays as `<context> : <os error text>`.
    pub(crate) fn report(&self) -> Report<'_> {
        Report(self)
    }
}

pub(crate) struct Report<'a>(&'a Error);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        if let Some(source) = self.0.source() {
            write!(f, " : {}", source)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_appends_os_cause() {
        let err = Error::DirectoryUnreadable {
            path: PathBuf::from("/nope"),
            source: io::Error::from_raw_os_error(libc::ENOENT),
        };
        let text = err.report().to_string();
        assert!(text.starts_with("opendir failed for /nope : "));
        assert!(text.contains("No such file or directory"));
    }

    #[test]
    fn report_without_cause_is_plain() {
        let err = Error::AlreadyExists { path: PathBuf::from("f.txt") };
        assert_eq!(err.report().to_string(), "file already exists: f.txt");
    }
}
