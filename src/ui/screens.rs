use crate::models::{Book, Statistics};

/// What the right-hand pane shows.
pub(crate) enum View {
    Listing(ListingScreen),
    Statistics(Statistics),
}

/// A scrollable list of books with a heading and a message for the empty case.
pub(crate) struct ListingScreen {
    pub(crate) heading: String,
    pub(crate) books: Vec<Book>,
    pub(crate) empty_message: String,
    pub(crate) selected: usize,
}

impl ListingScreen {
    pub(crate) fn all(books: &[Book]) -> Self {
        Self::new("All Books", books.to_vec(), "The library is empty.")
    }

    pub(crate) fn new(
        heading: impl Into<String>,
        books: Vec<Book>,
        empty_message: impl Into<String>,
    ) -> Self {
        Self {
            heading: heading.into(),
            books,
            empty_message: empty_message.into(),
            selected: 0,
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.books.is_empty() {
            return;
        }
        let len = self.books.len() as isize;
        let mut new = self.selected as isize + offset;
        if new < 0 {
            new = 0;
        }
        if new >= len {
            new = len - 1;
        }
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        if !self.books.is_empty() {
            self.selected = self.books.len() - 1;
        }
    }
}
