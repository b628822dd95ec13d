//! The library store: the in-memory book list plus the file operations that
//! keep it on disk. Every mutation rewrites the whole data file.

mod export;
mod library;
mod persistence;

pub use export::EXPORT_HEADER;
pub use library::LibraryStore;
