use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{parse_optional_yes_no, parse_yes_no, Book, BookUpdate, SearchField};

/// Fields of the book form, in tab order.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Year,
    Genre,
    Read,
}

impl BookField {
    pub(crate) const ALL: [BookField; 5] = [
        BookField::Title,
        BookField::Author,
        BookField::Year,
        BookField::Genre,
        BookField::Read,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Year => "Year",
            BookField::Genre => "Genre",
            BookField::Read => "Read (yes/no)",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Form state shared by "add" and "update". When `current` is set the form is
/// an update: blank fields keep the stored value and show it as a hint.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) genre: String,
    pub(crate) read: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
    pub(crate) current: Option<Book>,
}

impl BookForm {
    /// Blank form for an update of `book`.
    pub(crate) fn for_update(book: &Book) -> Self {
        Self {
            current: Some(book.clone()),
            ..Self::default()
        }
    }

    pub(crate) fn is_update(&self) -> bool {
        self.current.is_some()
    }

    pub(crate) fn next_field(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.previous();
    }

    fn value(&self, field: BookField) -> &String {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Year => &self.year,
            BookField::Genre => &self.genre,
            BookField::Read => &self.read,
        }
    }

    fn value_mut(&mut self, field: BookField) -> &mut String {
        match field {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
            BookField::Year => &mut self.year,
            BookField::Genre => &mut self.genre,
            BookField::Read => &mut self.read,
        }
    }

    /// Append a character to the active field. Control characters are ignored.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        self.value_mut(field).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Build a new book from the inputs exactly as typed. Only the title is
    /// mandatory, and only an empty field counts as missing.
    pub(crate) fn to_book(&self) -> Result<Book> {
        if self.title.is_empty() {
            return Err(anyhow!("Title is required."));
        }
        Ok(Book::new(
            self.title.as_str(),
            self.author.as_str(),
            self.year.as_str(),
            self.genre.as_str(),
            parse_yes_no(&self.read),
        ))
    }

    /// Collect the filled-in inputs as a partial update. An empty field keeps
    /// the current value; anything else is stored as typed.
    pub(crate) fn to_update(&self) -> BookUpdate {
        let text = |value: &str| (!value.is_empty()).then(|| value.to_string());
        BookUpdate {
            title: text(&self.title),
            author: text(&self.author),
            year: text(&self.year),
            genre: text(&self.genre),
            read: parse_optional_yes_no(&self.read),
        }
    }

    fn placeholder(&self, field: BookField) -> String {
        match &self.current {
            Some(book) => {
                let current = match field {
                    BookField::Title => book.title.clone(),
                    BookField::Author => book.author.clone(),
                    BookField::Year => book.year.clone(),
                    BookField::Genre => book.genre.clone(),
                    BookField::Read => (if book.read { "yes" } else { "no" }).to_string(),
                };
                format!("<current: {current}>")
            }
            None => match field {
                BookField::Title => "<required>".to_string(),
                BookField::Read => "<no>".to_string(),
                _ => "<blank>".to_string(),
            },
        }
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            self.placeholder(field)
        } else {
            value.clone()
        };

        let style = if is_active && !value.is_empty() {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Cursor column offset and row for the active field.
    pub(crate) fn cursor(&self) -> (u16, u16) {
        let field = self.active;
        let prefix = field.label().len() + 2;
        (
            (prefix + self.value(field).chars().count()) as u16,
            field.index() as u16,
        )
    }
}

/// Inputs of the search form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum SearchInput {
    #[default]
    Field,
    Term,
}

/// Search form: which field to look in and the substring to look for.
#[derive(Default, Clone)]
pub(crate) struct SearchForm {
    pub(crate) field: String,
    pub(crate) term: String,
    pub(crate) active: SearchInput,
    pub(crate) error: Option<String>,
}

impl SearchForm {
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            SearchInput::Field => SearchInput::Term,
            SearchInput::Term => SearchInput::Field,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            SearchInput::Field => self.field.push(ch),
            SearchInput::Term => self.term.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            SearchInput::Field => {
                self.field.pop();
            }
            SearchInput::Term => {
                self.term.pop();
            }
        }
    }

    /// Validate the field name. The term may be empty, which matches everything.
    pub(crate) fn parse_inputs(&self) -> Result<(SearchField, String)> {
        let field = self.field.parse::<SearchField>()?;
        Ok((field, self.term.clone()))
    }

    pub(crate) fn build_lines(&self) -> Vec<Line<'static>> {
        let line = |label: &str, value: &str, placeholder: &str, active: bool| {
            let (display, style) = if value.is_empty() {
                (placeholder.to_string(), Style::default().fg(Color::DarkGray))
            } else if active {
                (value.to_string(), Style::default().fg(Color::Yellow))
            } else {
                (value.to_string(), Style::default())
            };
            Line::from(vec![
                Span::raw(format!("{label}: ")),
                Span::styled(display, style),
            ])
        };
        vec![
            line(
                "Search by",
                &self.field,
                "<title or author>",
                self.active == SearchInput::Field,
            ),
            line(
                "Term",
                &self.term,
                "<text to find>",
                self.active == SearchInput::Term,
            ),
        ]
    }

    pub(crate) fn cursor(&self) -> (u16, u16) {
        match self.active {
            SearchInput::Field => (("Search by: ".len() + self.field.chars().count()) as u16, 0),
            SearchInput::Term => (("Term: ".len() + self.term.chars().count()) as u16, 1),
        }
    }
}

/// What a single-line prompt will be used for once submitted.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum PromptPurpose {
    Remove,
    Update,
    Sort,
}

impl PromptPurpose {
    pub(crate) fn title(self) -> &'static str {
        match self {
            PromptPurpose::Remove => "Remove Book",
            PromptPurpose::Update => "Update Book",
            PromptPurpose::Sort => "Sort Books",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            PromptPurpose::Remove | PromptPurpose::Update => "Title",
            PromptPurpose::Sort => "Sort by",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            PromptPurpose::Remove | PromptPurpose::Update => "<required>",
            PromptPurpose::Sort => "<title, author, or year>",
        }
    }
}

/// Single-line text prompt.
#[derive(Clone)]
pub(crate) struct Prompt {
    pub(crate) purpose: PromptPurpose,
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl Prompt {
    pub(crate) fn new(purpose: PromptPurpose) -> Self {
        Self {
            purpose,
            value: String::new(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    /// The answer as typed. Titles are matched against stored records without
    /// trimming, so an empty or padded answer is passed through unchanged.
    pub(crate) fn answer(&self) -> &str {
        &self.value
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        let (display, style) = if self.value.is_empty() {
            (
                self.purpose.placeholder().to_string(),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            (self.value.clone(), Style::default().fg(Color::Yellow))
        };
        Line::from(vec![
            Span::raw(format!("{}: ", self.purpose.label())),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn cursor(&self) -> (u16, u16) {
        (
            (self.purpose.label().len() + 2 + self.value.chars().count()) as u16,
            0,
        )
    }
}
