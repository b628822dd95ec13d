//! Binary entry point: resolve file locations, start logging, load the library,
//! and drive the Ratatui event loop until the user exits.
use anyhow::Context;
use clap::Parser;

use bookshelf::{logging, run_app, App, Cli, LibraryStore};

/// A data file that cannot be read or parsed aborts here, before the terminal
/// is switched into raw mode, so the error prints normally.
fn main() -> anyhow::Result<()> {
    let settings = Cli::parse().resolve();
    logging::init(&settings.log_file)?;

    let store = LibraryStore::load(&settings.data_file).with_context(|| {
        format!(
            "failed to load library from {}",
            settings.data_file.display()
        )
    })?;

    let mut app = App::new(store, settings.export_file);
    let result = run_app(&mut app);
    tracing::info!(books = app.store().len(), "session ended");
    result
}
