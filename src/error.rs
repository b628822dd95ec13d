//! Error type surfaced by the library store. The UI converts these into
//! `anyhow::Error` and shows the innermost message in the footer; only a
//! failed load at startup ends the program.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not parse library file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid {kind} '{value}'. Expected one of: {expected}.")]
    InvalidArgument {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Book \"{title}\" not found in the library.")]
    NotFound { title: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
