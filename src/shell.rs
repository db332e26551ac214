//! The interactive menu and the operations it dispatches to.

use crate::error::{Error, Result};
use crate::fs::Filesystem;
use crate::list;
use crate::metadata::IdentityLookup;
use crate::ops;
use crate::search::{self, PrintSink};
use std::ffi::OsStr;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

const BANNER: &str = "=====================================\n\
                      \x20       File Explorer Tool\n\
                      =====================================";

const MENU: &str = "1. List files (names only)\n\
                    2. List files (detailed -> permissions, owner, size, mtime)\n\
                    3. Create file\n\
                    4. Delete file\n\
                    5. Change directory\n\
                    6. Search file (recursive)\n\
                    7. Exit";

/// Explorer state: the current root directory and where output goes.
pub(crate) struct Shell<W, E> {
    root: PathBuf,
    fs: Box<dyn Filesystem>,
    identity: Box<dyn IdentityLookup>,
    report_skipped: bool,
    pub(crate) out: W,
    pub(crate) err: E,
}

impl<W: Write, E: Write> Shell<W, E> {
    pub(crate) fn new(
        root: PathBuf,
        fs: Box<dyn Filesystem>,
        identity: Box<dyn IdentityLookup>,
        report_skipped: bool,
        out: W,
        err: E,
    ) -> Self {
        Self {
            root,
            fs,
            identity,
            report_skipped,
            out,
            err,
        }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    /// Runs the menu loop until the user exits or the input ends.
    pub(crate) fn run<R: BufRead>(&mut self, mut input: R) -> io::Result<()> {
        writeln!(self.out, "{}", BANNER)?;

        loop {
            writeln!(self.out, "\nCurrent Directory: {}", self.root.display())?;
            writeln!(self.out, "{}", MENU)?;
            write!(self.out, "Enter choice: ")?;
            self.out.flush()?;

            let line = match read_nonblank_line(&mut input)? {
                Some(line) => line,
                None => break,
            };

            let choice: u32 = match line.trim().parse() {
                Ok(choice) => choice,
                Err(_) => {
                    writeln!(self.out, "Invalid input")?;
                    continue;
                }
            };
            tracing::debug!(choice);

            let res = match choice {
                1 => self.do_list(None, false),
                2 => self.do_list(None, true),
                3 => match self.prompt(&mut input, "Enter filename to create: ")? {
                    Prompted::Word(name) => match self.do_create(&name) {
                        Err(Error::AlreadyExists { .. }) => {
                            writeln!(self.out, "File already exists: {}", name)?;
                            Ok(())
                        }
                        res => res,
                    },
                    Prompted::Invalid => continue,
                    Prompted::Eof => break,
                },
                4 => match self.prompt(&mut input, "Enter filename to delete: ")? {
                    Prompted::Word(name) => self.do_delete(&name),
                    Prompted::Invalid => continue,
                    Prompted::Eof => break,
                },
                5 => {
                    let question = "Enter directory to change to (absolute or relative): ";
                    match self.prompt(&mut input, question)? {
                        Prompted::Word(path) => self.do_change_directory(&path),
                        Prompted::Invalid => continue,
                        Prompted::Eof => break,
                    }
                }
                6 => {
                    let question = "Enter filename to search for (exact name): ";
                    match self.prompt(&mut input, question)? {
                        Prompted::Word(name) => {
                            writeln!(self.out, "Searching (this may take time for large trees)...")?;
                            self.do_search(&name).map(|_| ())
                        }
                        Prompted::Invalid => continue,
                        Prompted::Eof => break,
                    }
                }
                7 => break,
                _ => {
                    writeln!(self.out, "Invalid choice")?;
                    continue;
                }
            };

            match res {
                Ok(()) => {}
                Err(Error::Output(err)) => return Err(err),
                Err(err) => self.report(&err)?,
            }
        }

        writeln!(self.out, "Goodbye!")?;
        self.out.flush()
    }

    fn prompt<R: BufRead>(&mut self, input: &mut R, question: &str) -> io::Result<Prompted> {
        write!(self.out, "{}", question)?;
        self.out.flush()?;

        let line = match read_nonblank_line(input)? {
            Some(line) => line,
            None => return Ok(Prompted::Eof),
        };
        match shell_words::split(&line) {
            Ok(words) => match words.into_iter().next() {
                Some(word) => Ok(Prompted::Word(word)),
                None => {
                    writeln!(self.out, "Invalid input")?;
                    Ok(Prompted::Invalid)
                }
            },
            Err(err) => {
                tracing::debug!(?err, "unparsable input");
                writeln!(self.out, "Invalid input")?;
                Ok(Prompted::Invalid)
            }
        }
    }

    fn report(&mut self, err: &Error) -> io::Result<()> {
        writeln!(self.err, "{}", err.report())
    }

    /// Lists `path` (relative to the root) or the root itself.
    pub(crate) fn do_list(&mut self, path: Option<&str>, detailed: bool) -> Result<()> {
        let dir = match path {
            Some(path) => self.root.join(path),
            None => self.root.clone(),
        };
        let summary = list::list(
            self.fs.as_ref(),
            &dir,
            detailed,
            self.identity.as_ref(),
            &mut self.out,
            &mut self.err,
        )?;
        tracing::debug!(listed = summary.listed, failed = summary.failed);
        Ok(())
    }

    pub(crate) fn do_create(&mut self, name: &str) -> Result<()> {
        let path = ops::create_file(&self.root, name)?;
        tracing::info!(?path, "created");
        writeln!(self.out, "File created: {}", name)?;
        Ok(())
    }

    pub(crate) fn do_delete(&mut self, name: &str) -> Result<()> {
        let path = ops::delete_file(&self.root, name)?;
        tracing::info!(?path, "deleted");
        writeln!(self.out, "Deleted: {}", name)?;
        Ok(())
    }

    pub(crate) fn do_change_directory(&mut self, target: &str) -> Result<()> {
        self.root = ops::change_directory(&self.root, target)?;
        writeln!(self.out, "Changed directory to: {}", self.root.display())?;
        Ok(())
    }

    pub(crate) fn do_search(&mut self, name: &str) -> Result<usize> {
        let mut sink = PrintSink::new(&mut self.out, &mut self.err, self.report_skipped);
        search::search(self.fs.as_ref(), &self.root, OsStr::new(name), &mut sink)
    }
}

enum Prompted {
    Word(String),
    Invalid,
    Eof,
}

fn read_nonblank_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if !line.trim().is_empty() {
            return Ok(Some(line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFilesystem;
    use crate::metadata::NumericIdentity;
    use std::fs;
    use std::io::Cursor;

    fn session(root: &Path, script: &str) -> (String, String) {
        let mut shell = Shell::new(
            root.to_owned(),
            Box::new(LocalFilesystem),
            Box::new(NumericIdentity),
            true,
            Vec::new(),
            Vec::new(),
        );
        shell.run(Cursor::new(script.to_string())).unwrap();
        (
            String::from_utf8(shell.out).unwrap(),
            String::from_utf8(shell.err).unwrap(),
        )
    }

    #[test]
    fn exit_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let (out, err) = session(dir.path(), "7\n");
        assert!(out.contains("File Explorer Tool"));
        assert!(out.contains(&format!("Current Directory: {}", dir.path().display())));
        assert!(out.contains("Enter choice: "));
        assert!(out.ends_with("Goodbye!\n"));
        assert!(err.is_empty());
    }

    #[test]
    fn end_of_input_exits() {
        let dir = tempfile::tempdir().unwrap();
        let (out, _) = session(dir.path(), "");
        assert!(out.ends_with("Goodbye!\n"));
    }

    #[test]
    fn invalid_input_and_choice() {
        let dir = tempfile::tempdir().unwrap();
        let (out, _) = session(dir.path(), "abc\n9\n7\n");
        assert!(out.contains("Invalid input\n"));
        assert!(out.contains("Invalid choice\n"));
        assert_eq!(out.matches("Enter choice: ").count(), 3);
    }

    #[test]
    fn create_list_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let (out, err) = session(dir.path(), "3\nf.txt\n3\nf.txt\n1\n4\nf.txt\n1\n7\n");

        assert!(out.contains("File created: f.txt\n"));
        assert!(out.contains("File already exists: f.txt\n"));
        assert_eq!(out.matches("  - f.txt\n").count(), 1);
        assert!(out.contains("Deleted: f.txt\n"));
        assert!(err.is_empty());
        assert!(!dir.path().join("f.txt").exists());
    }

    #[test]
    fn existing_file_is_reported_by_the_name_typed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("f.txt"), b"keep").unwrap();

        let (out, err) = session(dir.path(), "3
sub/f.txt
7
");
        assert!(out.contains("File already exists: sub/f.txt\n"));
        assert!(!out.contains(&format!("File already exists: {}", dir.path().display())));
        assert!(err.is_empty());
        assert_eq!(fs::read(dir.path().join("sub").join("f.txt")).unwrap(), b"keep");
    }

    #[test]
    fn quoted_names_keep_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let (out, _) = session(dir.path(), "3\n\"my file.txt\"\n7\n");
        assert!(out.contains("File created: my file.txt\n"));
        assert!(dir.path().join("my file.txt").exists());
    }

    #[test]
    fn delete_missing_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let (_, err) = session(dir.path(), "4\nnope\n7\n");
        assert!(err.starts_with("remove failed for "));
    }

    #[test]
    fn detailed_listing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("zero"), b"").unwrap();
        let (out, _) = session(dir.path(), "2\n7\n");
        assert!(out.contains("PERMISSIONS OWNER   GROUP   SIZE"));
        assert!(out.contains(&"-".repeat(80)));
        assert!(out.lines().any(|l| l.starts_with('-') && l.ends_with("  zero")));
    }

    #[test]
    fn search_streams_matches() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("b.txt"), b"").unwrap();

        let (out, _) = session(dir.path(), "6\nb.txt\n7\n");
        assert!(out.contains("Searching (this may take time for large trees)...\n"));
        assert!(out.contains(&format!("Found: {}\n", dir.path().join("b.txt").display())));
        assert!(out.contains(&format!(
            "Found: {}\n",
            dir.path().join("sub").join("b.txt").display()
        )));
    }

    #[test]
    fn failed_change_directory_keeps_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = Shell::new(
            dir.path().to_owned(),
            Box::new(LocalFilesystem),
            Box::new(NumericIdentity),
            false,
            Vec::new(),
            Vec::new(),
        );
        shell.run(Cursor::new("5\nmissing\n7\n")).unwrap();
        assert_eq!(shell.root(), dir.path());
        assert!(String::from_utf8(shell.err).unwrap().starts_with("chdir failed for "));
    }

    #[test]
    fn unreadable_root_listing_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (_, err) = session(&dir.path().join("gone"), "1\n7\n");
        assert!(err.starts_with(&format!(
            "opendir failed for {} : ",
            dir.path().join("gone").display()
        )));
    }

    #[test]
    fn read_failure_during_listing_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), b"").unwrap();
        fs::write(dir.path().join("b"), b"").unwrap();

        let faulty = crate::fs::FaultyFilesystem {
            broken: vec![(dir.path().to_owned(), 1)],
            ..Default::default()
        };
        let mut shell = Shell::new(
            dir.path().to_owned(),
            Box::new(faulty),
            Box::new(NumericIdentity),
            false,
            Vec::new(),
            Vec::new(),
        );
        shell.run(Cursor::new("1\n7\n")).unwrap();

        let out = String::from_utf8(shell.out).unwrap();
        let err = String::from_utf8(shell.err).unwrap();
        assert!(!out.contains("Contents of"));
        assert!(out.ends_with("Goodbye!\n"));
        assert!(err.starts_with(&format!("readdir failed for {} : ", dir.path().display())));
    }
}
