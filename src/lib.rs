//! Core library surface for the Bookshelf catalog.
//!
//! The store and models carry all catalog semantics; the `ui` module is one
//! caller of them and the binary only wires configuration, logging, and the
//! terminal together.
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod store;
pub mod ui;

pub use config::{Cli, Settings};
pub use error::StoreError;

/// The domain types other layers manipulate.
pub use models::{Book, BookUpdate, SearchField, SortKey, Statistics};

pub use store::LibraryStore;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
