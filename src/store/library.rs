use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::{Book, BookUpdate, SearchField, SortKey, Statistics};

use super::export::write_csv;
use super::persistence::{read_books, write_books};

/// Owns the book list and the path it is persisted to. Mutations save the full
/// list before returning; queries never touch the disk.
///
/// The file is rewritten whole on every change instead of being patched, so
/// the on-disk order always equals the in-memory order. Search and sort
/// return copies and leave that order alone.
///
/// If a save fails the in-memory change is kept and the error is returned;
/// the next successful save writes it out.
#[derive(Debug)]
pub struct LibraryStore {
    /// JSON file backing the library. It need not exist until the first save;
    /// its parent directory is created on demand.
    path: PathBuf,
    /// Records in insertion order. Duplicate titles are allowed.
    books: Vec<Book>,
}

impl LibraryStore {
    /// Load the library at `path`, starting empty if the file does not exist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let books = read_books(&path)?;
        info!(path = %path.display(), count = books.len(), "loaded library");
        Ok(Self { path, books })
    }

    /// Wrap an existing list without touching the disk. Nothing is written
    /// until the first mutation or an explicit [`save`](Self::save).
    pub fn with_books(path: impl Into<PathBuf>, books: Vec<Book>) -> Self {
        Self {
            path: path.into(),
            books,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Rewrite the data file from the in-memory list.
    pub fn save(&self) -> Result<(), StoreError> {
        write_books(&self.path, &self.books)?;
        debug!(path = %self.path.display(), count = self.books.len(), "saved library");
        Ok(())
    }

    /// Append `book` and persist. Duplicate titles are allowed.
    pub fn add(&mut self, book: Book) -> Result<(), StoreError> {
        info!(title = %book.title, "adding book");
        self.books.push(book);
        self.save()
    }

    /// Remove every book whose title matches case-insensitively and return how
    /// many were dropped. Nothing is saved when no title matches.
    pub fn remove(&mut self, title: &str) -> Result<usize, StoreError> {
        let before = self.books.len();
        self.books.retain(|book| !book.title_matches(title));
        let removed = before - self.books.len();

        if removed == 0 {
            return Err(StoreError::NotFound {
                title: title.to_string(),
            });
        }

        info!(title, removed, "removed books");
        self.save()?;
        Ok(removed)
    }

    /// Apply `changes` to the first book whose title matches and persist.
    /// Later books with the same title are left alone.
    pub fn update(&mut self, title: &str, changes: BookUpdate) -> Result<Book, StoreError> {
        let book = self
            .books
            .iter_mut()
            .find(|book| book.title_matches(title))
            .ok_or_else(|| StoreError::NotFound {
                title: title.to_string(),
            })?;

        book.apply(changes);
        let updated = book.clone();

        info!(title, new_title = %updated.title, "updated book");
        self.save()?;
        Ok(updated)
    }

    /// First book matching `title`, used by the UI to show current values
    /// before an update.
    pub fn find(&self, title: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.title_matches(title))
    }

    /// Books whose `field` contains `term`, ignoring case, in library order.
    pub fn search(&self, field: SearchField, term: &str) -> Vec<Book> {
        let needle = term.to_lowercase();
        let results: Vec<Book> = self
            .books
            .iter()
            .filter(|book| field.value(book).to_lowercase().contains(&needle))
            .cloned()
            .collect();
        debug!(%field, term, hits = results.len(), "searched library");
        results
    }

    /// A copy of the library ordered by the raw text of `key`. Years compare
    /// as strings. The stored order is unchanged.
    pub fn sort(&self, key: SortKey) -> Vec<Book> {
        let mut sorted = self.books.clone();
        sorted.sort_by(|a, b| key.value(a).cmp(key.value(b)));
        debug!(%key, "sorted library");
        sorted
    }

    pub fn statistics(&self) -> Statistics {
        let total = self.books.len();
        let read = self.books.iter().filter(|book| book.read).count();
        let percentage_read = if total > 0 {
            read as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Statistics {
            total,
            read,
            percentage_read,
        }
    }

    /// Write the library as CSV to `destination` and return the row count.
    pub fn export(&self, destination: &Path) -> Result<usize, StoreError> {
        let rows = write_csv(destination, &self.books)?;
        info!(destination = %destination.display(), rows, "exported library");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn book(title: &str, author: &str, year: &str, read: bool) -> Book {
        Book::new(title, author, year, "Fiction", read)
    }

    fn store_in(dir: &TempDir, books: Vec<Book>) -> LibraryStore {
        let store = LibraryStore::with_books(dir.path().join("library.json"), books);
        store.save().unwrap();
        store
    }

    #[test]
    fn add_appends_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, vec![book("Emma", "Jane Austen", "1815", false)]);

        store
            .add(book("Dune", "Frank Herbert", "1965", true))
            .unwrap();

        assert_eq!(store.len(), 2);
        let reloaded = LibraryStore::load(store.path()).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.books().last().unwrap().title, "Dune");
    }

    #[test]
    fn add_allows_duplicate_titles() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, Vec::new());
        store.add(book("Emma", "Jane Austen", "1815", false)).unwrap();
        store.add(book("Emma", "Jane Austen", "1815", true)).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_drops_every_case_insensitive_match() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(
            &dir,
            vec![
                book("Emma", "Jane Austen", "1815", false),
                book("Dune", "Frank Herbert", "1965", true),
                book("EMMA", "Someone Else", "2001", true),
            ],
        );

        assert_eq!(store.remove("emma").unwrap(), 2);
        assert_eq!(store.len(), 1);
        let reloaded = LibraryStore::load(store.path()).unwrap();
        assert_eq!(reloaded.books(), store.books());
    }

    #[test]
    fn remove_missing_title_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, vec![book("Emma", "Jane Austen", "1815", false)]);
        let before = fs::read(store.path()).unwrap();

        let err = store.remove("Persuasion").unwrap_err();

        assert!(matches!(err, StoreError::NotFound { ref title } if title == "Persuasion"));
        assert_eq!(store.len(), 1);
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn remove_on_unsaved_store_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let mut store = LibraryStore::with_books(dir.path().join("library.json"), Vec::new());
        assert!(store.remove("anything").is_err());
        assert!(!store.path().exists());
    }

    #[test]
    fn failed_save_keeps_change_in_memory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        fs::create_dir(&path).unwrap();
        let mut store = LibraryStore::with_books(path.clone(), Vec::new());

        let err = store.add(book("Emma", "Jane Austen", "1815", false)).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(store.len(), 1);
        assert!(!dir.path().join("library.json.tmp").exists());
    }

    #[test]
    fn update_changes_only_requested_fields_of_first_match() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(
            &dir,
            vec![
                book("Emma", "Jane Austen", "1815", false),
                book("emma", "Other Author", "1999", false),
            ],
        );

        let updated = store
            .update(
                "EMMA",
                BookUpdate {
                    year: Some("1816".into()),
                    read: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated, Book::new("Emma", "Jane Austen", "1816", "Fiction", true));
        assert_eq!(store.books()[1], book("emma", "Other Author", "1999", false));
        let reloaded = LibraryStore::load(store.path()).unwrap();
        assert_eq!(reloaded.books(), store.books());
    }

    #[test]
    fn update_can_rename() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, vec![book("Emma", "Jane Austen", "1815", false)]);
        store
            .update(
                "emma",
                BookUpdate {
                    title: Some("Emma (Annotated)".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(store.find("emma").is_none());
        assert!(store.find("emma (annotated)").is_some());
    }

    #[test]
    fn update_missing_title_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, vec![book("Emma", "Jane Austen", "1815", false)]);
        let before = fs::read(store.path()).unwrap();

        let err = store
            .update(
                "Persuasion",
                BookUpdate {
                    read: Some(true),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.books()[0], book("Emma", "Jane Austen", "1815", false));
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn search_by_author_is_case_insensitive_substring() {
        let dir = TempDir::new().unwrap();
        let store = store_in(
            &dir,
            vec![
                book("The Hobbit", "J.R.R. Tolkien", "1937", true),
                book("Poirot", "Agatha Christie", "1920", false),
            ],
        );

        let results = store.search(SearchField::Author, "tolkien");
        assert_eq!(results, vec![book("The Hobbit", "J.R.R. Tolkien", "1937", true)]);
    }

    #[test]
    fn search_preserves_order_and_allows_empty_results() {
        let dir = TempDir::new().unwrap();
        let store = store_in(
            &dir,
            vec![
                book("The Two Towers", "J.R.R. Tolkien", "1954", false),
                book("Emma", "Jane Austen", "1815", false),
                book("The Hobbit", "J.R.R. Tolkien", "1937", true),
            ],
        );

        let titles: Vec<_> = store
            .search(SearchField::Title, "THE")
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, ["The Two Towers", "The Hobbit"]);
        assert!(store.search(SearchField::Title, "zzz").is_empty());
    }

    #[test]
    fn sort_by_year_is_lexicographic() {
        let dir = TempDir::new().unwrap();
        let store = store_in(
            &dir,
            vec![
                book("A", "X", "2", false),
                book("B", "X", "10", false),
                book("C", "X", "1", false),
            ],
        );

        let years: Vec<_> = store
            .sort(SortKey::Year)
            .into_iter()
            .map(|b| b.year)
            .collect();
        assert_eq!(years, ["1", "10", "2"]);
        let stored: Vec<_> = store.books().iter().map(|b| b.year.as_str()).collect();
        assert_eq!(stored, ["2", "10", "1"]);
    }

    #[test]
    fn sort_by_title_and_author() {
        let dir = TempDir::new().unwrap();
        let store = store_in(
            &dir,
            vec![
                book("Emma", "Jane Austen", "1815", false),
                book("Dune", "Frank Herbert", "1965", false),
                book("Beloved", "Toni Morrison", "1987", false),
            ],
        );

        let by_title: Vec<_> = store.sort(SortKey::Title).into_iter().map(|b| b.title).collect();
        assert_eq!(by_title, ["Beloved", "Dune", "Emma"]);
        let by_author: Vec<_> = store
            .sort(SortKey::Author)
            .into_iter()
            .map(|b| b.author)
            .collect();
        assert_eq!(by_author, ["Frank Herbert", "Jane Austen", "Toni Morrison"]);
    }

    #[test]
    fn statistics_counts_read_books() {
        let dir = TempDir::new().unwrap();
        let store = store_in(
            &dir,
            vec![
                book("A", "X", "1", true),
                book("B", "X", "2", false),
                book("C", "X", "3", false),
                book("D", "X", "4", false),
            ],
        );

        let stats = store.statistics();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.read, 1);
        assert_eq!(format!("{:.2}", stats.percentage_read), "25.00");
    }

    #[test]
    fn statistics_of_empty_library_is_zero() {
        let store = LibraryStore::with_books("unused.json", Vec::new());
        let stats = store.statistics();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.read, 0);
        assert_eq!(stats.percentage_read, 0.0);
    }

    #[test]
    fn export_is_idempotent_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = store_in(
            &dir,
            vec![
                book("Emma", "Jane Austen", "1815", false),
                book("Dune", "Frank Herbert", "1965", true),
            ],
        );
        let destination = dir.path().join("export.csv");
        fs::write(&destination, "stale content that is much longer than the export\n".repeat(20))
            .unwrap();

        assert_eq!(store.export(&destination).unwrap(), 2);
        let first = fs::read(&destination).unwrap();
        store.export(&destination).unwrap();
        let second = fs::read(&destination).unwrap();

        assert_eq!(first, second);
        assert!(String::from_utf8(first)
            .unwrap()
            .starts_with("title,author,year,genre,read\n"));
    }
}
