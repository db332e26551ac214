mod config;
mod enumerate;
mod error;
mod format;
mod fs;
mod list;
mod logging;
mod metadata;
mod ops;
mod search;
mod shell;

use anyhow::{Context as _, Result};
use std::env;
use std::io;
use std::path::PathBuf;
use structopt::StructOpt;

use crate::config::Config;
use crate::fs::LocalFilesystem;
use crate::logging::LogFormat;
use crate::metadata::{IdentityLookup, NumericIdentity, SystemIdentity};
use crate::shell::Shell;

#[derive(Debug, StructOpt)]
struct Opt {
    /// Path to a YAML configuration file.
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Format of diagnostic logs written to stderr: text or json.
    ///
    /// Log verbosity is controlled by the RUST_LOG environment variable.
    #[structopt(long)]
    log_format: Option<LogFormat>,

    /// Directory to start in instead of the current working directory.
    #[structopt(short, long, parse(from_os_str))]
    root: Option<PathBuf>,

    /// Show owner and group ids instead of account names.
    #[structopt(short, long)]
    numeric_ids: bool,

    /// Runs a single operation. Without one, the interactive menu starts.
    #[structopt(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// List the contents of a directory.
    Ls {
        /// Show permissions, owner, group, size and modification time.
        #[structopt(short, long)]
        long: bool,

        /// Directory to list, relative to the root.
        path: Option<String>,
    },

    /// Create an empty file, failing if it already exists.
    Touch { name: String },

    /// Delete a file.
    Rm { name: String },

    /// Recursively search for files with exactly this name.
    Find { name: String },
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    let config = match opt.config {
        Some(ref path) => config::load(path)?,
        None => Config::default(),
    };

    logging::init(opt.log_format.or(config.log_format).unwrap_or_default());

    let root = match opt.root.clone().or_else(|| config.root.clone()) {
        Some(root) => root,
        None => env::current_dir().context("failed to get the current directory")?,
    };

    let identity: Box<dyn IdentityLookup> = if opt.numeric_ids || !config.identity.resolve_names {
        Box::new(NumericIdentity)
    } else {
        Box::new(SystemIdentity)
    };

    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut shell = Shell::new(
        root,
        Box::new(LocalFilesystem),
        identity,
        config.search.report_skipped,
        stdout.lock(),
        stderr.lock(),
    );
    tracing::debug!(root = ?shell.root(), command = ?opt.command);

    match opt.command {
        None => {
            let stdin = io::stdin();
            shell.run(stdin.lock()).context("failed to run the interactive menu")?;
        }
        Some(Command::Ls { long, path }) => shell.do_list(path.as_deref(), long)?,
        Some(Command::Touch { name }) => shell.do_create(&name)?,
        Some(Command::Rm { name }) => shell.do_delete(&name)?,
        Some(Command::Find { name }) => {
            shell.do_search(&name)?;
        }
    }

    Ok(())
}
