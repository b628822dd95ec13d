//! Command-line configuration. Every flag has an environment fallback and a
//! default inside the per-user data directory.

use std::path::PathBuf;

use clap::Parser;
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".bookshelf";
/// JSON file holding the catalog.
const DATA_FILE_NAME: &str = "library.json";
/// Default CSV export destination.
const EXPORT_FILE_NAME: &str = "library_export.csv";
/// Tracing output. The TUI owns stdout, so logs go to a file.
const LOG_FILE_NAME: &str = "bookshelf.log";

/// Bookshelf: a personal library catalog in your terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Path of the JSON file holding the library.
    #[arg(long, env = "BOOKSHELF_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Where "Export library to CSV" writes.
    #[arg(long, env = "BOOKSHELF_EXPORT_FILE")]
    pub export_file: Option<PathBuf>,

    /// Log file for diagnostics (level from RUST_LOG, default info).
    #[arg(long, env = "BOOKSHELF_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Fully resolved file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_file: PathBuf,
    pub export_file: PathBuf,
    pub log_file: PathBuf,
}

impl Cli {
    /// Fill every unset path from the default data directory.
    pub fn resolve(self) -> Settings {
        self.resolve_in(default_data_dir())
    }

    fn resolve_in(self, data_dir: PathBuf) -> Settings {
        Settings {
            data_file: self
                .data_file
                .unwrap_or_else(|| data_dir.join(DATA_FILE_NAME)),
            export_file: self
                .export_file
                .unwrap_or_else(|| data_dir.join(EXPORT_FILE_NAME)),
            log_file: self.log_file.unwrap_or_else(|| data_dir.join(LOG_FILE_NAME)),
        }
    }
}

/// `~/.bookshelf`, or `.bookshelf` in the working directory when no home
/// directory can be found.
fn default_data_dir() -> PathBuf {
    match BaseDirs::new() {
        Some(base_dirs) => base_dirs.home_dir().join(DATA_DIR_NAME),
        None => PathBuf::from(DATA_DIR_NAME),
    }
}
