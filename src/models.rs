//! Domain models shared by the store and the TUI. These stay light-weight data
//! holders; persistence and presentation live elsewhere.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// One catalog entry. Field order matches the persisted JSON objects and the
/// CSV export columns.
///
/// There is no id: records are addressed by title. Text fields are stored
/// exactly as entered, without trimming, so a record loaded from disk is
/// found again by typing the same text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Lookup key for remove and update, compared case-insensitively.
    /// Several books may share a title; nothing enforces uniqueness.
    pub title: String,
    /// Searchable alongside the title.
    pub author: String,
    /// Free text. Kept as a string so sorting by year stays lexicographic
    /// ("10" sorts before "2") and odd values like "c. 1200" survive.
    pub year: String,
    /// Free text, displayed and exported but never queried.
    pub genre: String,
    /// Whether the book has been read. Counted by [`Statistics`] and shown
    /// as "Read"/"Unread" in listings.
    pub read: bool,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: impl Into<String>,
        genre: impl Into<String>,
        read: bool,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year: year.into(),
            genre: genre.into(),
            read,
        }
    }

    /// Case-insensitive title comparison used by remove and update lookups.
    pub fn title_matches(&self, title: &str) -> bool {
        self.title.to_lowercase() == title.to_lowercase()
    }

    pub fn status_label(&self) -> &'static str {
        if self.read {
            "Read"
        } else {
            "Unread"
        }
    }

    /// Apply every populated field of `changes`, leaving the rest untouched.
    pub fn apply(&mut self, changes: BookUpdate) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(author) = changes.author {
            self.author = author;
        }
        if let Some(year) = changes.year {
            self.year = year;
        }
        if let Some(genre) = changes.genre {
            self.genre = genre;
        }
        if let Some(read) = changes.read {
            self.read = read;
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} by {} | {} | {} | {}",
            self.title,
            self.author,
            self.year,
            self.genre,
            self.status_label()
        )
    }
}

/// Partial replacement for a book. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
    pub read: Option<bool>,
}

/// Fields a search may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Author,
}

impl SearchField {
    pub fn value<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            SearchField::Title => &book.title,
            SearchField::Author => &book.author,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Author => "author",
        }
    }
}

impl FromStr for SearchField {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SearchField::Title),
            "author" => Ok(SearchField::Author),
            _ => Err(StoreError::InvalidArgument {
                kind: "search field",
                value: s.trim().to_string(),
                expected: "title, author",
            }),
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys a listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Author,
    Year,
}

impl SortKey {
    pub fn value<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            SortKey::Title => &book.title,
            SortKey::Author => &book.author,
            SortKey::Year => &book.year,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Author => "author",
            SortKey::Year => "year",
        }
    }
}

impl FromStr for SortKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SortKey::Title),
            "author" => Ok(SortKey::Author),
            "year" => Ok(SortKey::Year),
            _ => Err(StoreError::InvalidArgument {
                kind: "sort field",
                value: s.trim().to_string(),
                expected: "title, author, year",
            }),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read progress across the whole library, computed on demand from the
/// current records rather than tracked incrementally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Number of records, duplicates included.
    pub total: usize,
    /// Number of records whose `read` flag is set.
    pub read: usize,
    /// `read / total * 100`, unrounded. Zero for an empty library rather
    /// than NaN; the UI rounds it to two decimals.
    pub percentage_read: f64,
}

/// Interpret a yes/no answer. Only "yes" counts as true.
pub fn parse_yes_no(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("yes")
}

/// Like [`parse_yes_no`], but blank input means "keep the current value".
pub fn parse_optional_yes_no(input: &str) -> Option<bool> {
    if input.trim().is_empty() {
        None
    } else {
        Some(parse_yes_no(input))
    }
}
