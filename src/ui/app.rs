use std::mem;
use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::warn;

use crate::error::StoreError;
use crate::models::{Book, SortKey, Statistics};
use crate::store::LibraryStore;

use super::forms::{BookField, BookForm, Prompt, PromptPurpose, SearchForm};
use super::helpers::{centered_rect, surface_error};
use super::screens::{ListingScreen, View};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Width of the menu column.
const MENU_WIDTH: u16 = 30;
/// Rows moved by PageUp/PageDown in a listing.
const PAGE_STEP: isize = 5;

/// Entries of the main menu, in the order (and numbering) shown to the user.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum MenuAction {
    Add,
    Remove,
    Update,
    Search,
    DisplayAll,
    Statistics,
    Sort,
    Export,
    Exit,
}

impl MenuAction {
    const ALL: [MenuAction; 9] = [
        MenuAction::Add,
        MenuAction::Remove,
        MenuAction::Update,
        MenuAction::Search,
        MenuAction::DisplayAll,
        MenuAction::Statistics,
        MenuAction::Sort,
        MenuAction::Export,
        MenuAction::Exit,
    ];

    fn label(self) -> &'static str {
        match self {
            MenuAction::Add => "Add a book",
            MenuAction::Remove => "Remove a book",
            MenuAction::Update => "Update a book",
            MenuAction::Search => "Search the library",
            MenuAction::DisplayAll => "Display all books",
            MenuAction::Statistics => "Display statistics",
            MenuAction::Sort => "Sort books",
            MenuAction::Export => "Export library to CSV",
            MenuAction::Exit => "Exit",
        }
    }

    /// Map a typed digit to its entry ('1' is the first).
    fn from_digit(ch: char) -> Option<Self> {
        let index = ch.to_digit(10)?.checked_sub(1)? as usize;
        Self::ALL.get(index).copied()
    }
}

/// Popup currently capturing keyboard input.
enum Mode {
    Normal,
    Adding(BookForm),
    Updating { title: String, form: BookForm },
    Prompting(Prompt),
    Searching(SearchForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
///
/// Every menu action goes through the store, which writes the library file
/// before returning. The app therefore never holds unsaved edits of its own;
/// the listings it shows are snapshots taken after each operation.
pub struct App {
    /// The catalog and its backing file. All mutations go through here.
    store: LibraryStore,
    /// Destination of the "Export library to CSV" entry. Overwritten on each
    /// export.
    export_file: PathBuf,
    /// Index into `MenuAction::ALL` of the highlighted menu entry. Digit keys
    /// move it too, so the highlight follows the last action run.
    menu_selected: usize,
    /// What the right-hand pane shows: a listing (all books, search results
    /// or a sorted copy) or the statistics gauge.
    view: View,
    /// Popup that currently receives key presses. `Normal` means the menu
    /// has focus.
    mode: Mode,
    /// Footer message from the last action, cleared when a new one starts.
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: LibraryStore, export_file: PathBuf) -> Self {
        let view = View::Listing(ListingScreen::all(store.books()));
        Self {
            store,
            export_file,
            menu_selected: 0,
            view,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn store(&self) -> &LibraryStore {
        &self.store
    }

    /// Route a key press to the active popup or the menu. Returns `true` once
    /// the user asks to exit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Adding(form) => self.handle_add(code, form),
            Mode::Updating { title, form } => self.handle_update(code, title, form),
            Mode::Prompting(prompt) => self.handle_prompt(code, prompt),
            Mode::Searching(form) => self.handle_search(code, form),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.move_menu(-1),
            KeyCode::Down => self.move_menu(1),
            KeyCode::Enter => {
                let action = MenuAction::ALL[self.menu_selected];
                return self.run_action(action, exit);
            }
            KeyCode::PageUp => self.scroll_listing(|l| l.move_selection(-PAGE_STEP)),
            KeyCode::PageDown => self.scroll_listing(|l| l.move_selection(PAGE_STEP)),
            KeyCode::Home => self.scroll_listing(ListingScreen::select_first),
            KeyCode::End => self.scroll_listing(ListingScreen::select_last),
            KeyCode::Char(ch) => match MenuAction::from_digit(ch) {
                Some(action) => {
                    self.menu_selected = MenuAction::ALL
                        .iter()
                        .position(|a| *a == action)
                        .unwrap_or(0);
                    return self.run_action(action, exit);
                }
                None => self.set_status("Invalid choice. Please try again.", StatusKind::Error),
            },
            _ => {}
        }
        Mode::Normal
    }

    fn run_action(&mut self, action: MenuAction, exit: &mut bool) -> Mode {
        self.clear_status();
        match action {
            MenuAction::Add => return Mode::Adding(BookForm::default()),
            MenuAction::Remove => return Mode::Prompting(Prompt::new(PromptPurpose::Remove)),
            MenuAction::Update => return Mode::Prompting(Prompt::new(PromptPurpose::Update)),
            MenuAction::Search => return Mode::Searching(SearchForm::default()),
            MenuAction::Sort => return Mode::Prompting(Prompt::new(PromptPurpose::Sort)),
            MenuAction::DisplayAll => self.show_all(),
            MenuAction::Statistics => {
                self.view = View::Statistics(self.store.statistics());
            }
            MenuAction::Export => self.export(),
            MenuAction::Exit => {
                self.set_status("Goodbye!", StatusKind::Info);
                *exit = true;
            }
        }
        Mode::Normal
    }

    fn handle_add(&mut self, code: KeyCode, mut form: BookForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_book(&form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = self.report_error(&err);
                    form.error = Some(message);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Adding(form)
    }

    fn handle_update(&mut self, code: KeyCode, title: String, mut form: BookForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Update cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_book(&title, &form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = self.report_error(&err);
                    form.error = Some(message);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Updating { title, form }
    }

    fn handle_prompt(&mut self, code: KeyCode, mut prompt: Prompt) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status(
                    format!("{} cancelled.", prompt.purpose.title()),
                    StatusKind::Info,
                );
                return Mode::Normal;
            }
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Enter => match self.submit_prompt(&prompt) {
                Ok(next) => return next,
                Err(err) => {
                    let message = self.report_error(&err);
                    prompt.error = Some(message);
                }
            },
            KeyCode::Char(ch) => {
                if prompt.push_char(ch) {
                    prompt.error = None;
                }
            }
            _ => {}
        }
        Mode::Prompting(prompt)
    }

    fn handle_search(&mut self, code: KeyCode, mut form: SearchForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Search cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.run_search(&form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = self.report_error(&err);
                    form.error = Some(message);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Searching(form)
    }

    /// Act on a submitted prompt. Returns the mode to continue in; an update
    /// prompt hands over to the update form.
    fn submit_prompt(&mut self, prompt: &Prompt) -> Result<Mode> {
        let value = prompt.answer().to_string();
        match prompt.purpose {
            PromptPurpose::Remove => {
                let removed = self.store.remove(&value)?;
                self.show_all();
                let noun = if removed == 1 { "book" } else { "books" };
                self.set_status(
                    format!("Removed {removed} {noun} titled \"{value}\"."),
                    StatusKind::Info,
                );
                Ok(Mode::Normal)
            }
            PromptPurpose::Update => {
                let book = self
                    .store
                    .find(&value)
                    .cloned()
                    .ok_or_else(|| StoreError::NotFound {
                        title: value.clone(),
                    })?;
                self.set_status(
                    "Leave a field blank to keep it unchanged.",
                    StatusKind::Info,
                );
                Ok(Mode::Updating {
                    title: value,
                    form: BookForm::for_update(&book),
                })
            }
            PromptPurpose::Sort => {
                let key = value.parse::<SortKey>()?;
                self.show_sorted(key);
                Ok(Mode::Normal)
            }
        }
    }

    fn save_new_book(&mut self, form: &BookForm) -> Result<()> {
        let book = form.to_book()?;
        let title = book.title.clone();
        self.store.add(book)?;
        self.show_all();
        self.set_status(
            format!("Book \"{title}\" added successfully."),
            StatusKind::Info,
        );
        Ok(())
    }

    fn save_existing_book(&mut self, title: &str, form: &BookForm) -> Result<()> {
        let changes = form.to_update();
        self.store.update(title, changes)?;
        self.show_all();
        self.set_status("Book updated successfully.", StatusKind::Info);
        Ok(())
    }

    fn run_search(&mut self, form: &SearchForm) -> Result<()> {
        let (field, term) = form.parse_inputs()?;
        let results = self.store.search(field, &term);
        let count = results.len();
        self.view = View::Listing(ListingScreen::new(
            format!("Search: {field} contains \"{term}\""),
            results,
            format!("No book found matching '{term}' in the {field} field."),
        ));
        self.set_status(
            format!("Found {count} matching book(s)."),
            StatusKind::Info,
        );
        Ok(())
    }

    fn export(&mut self) {
        match self.store.export(&self.export_file) {
            Ok(rows) => self.set_status(
                format!(
                    "Library exported to {} ({rows} rows).",
                    self.export_file.display()
                ),
                StatusKind::Info,
            ),
            Err(err) => {
                self.report_error(&anyhow::Error::from(err));
            }
        }
    }

    fn show_all(&mut self) {
        self.view = View::Listing(ListingScreen::all(self.store.books()));
    }

    fn show_sorted(&mut self, key: SortKey) {
        self.view = View::Listing(ListingScreen::new(
            format!("Books sorted by {key}"),
            self.store.sort(key),
            "The library is empty.",
        ));
    }

    fn scroll_listing(&mut self, scroll: impl FnOnce(&mut ListingScreen)) {
        if let View::Listing(listing) = &mut self.view {
            scroll(listing);
        }
    }

    fn move_menu(&mut self, offset: isize) {
        let len = MenuAction::ALL.len() as isize;
        self.menu_selected = (self.menu_selected as isize + offset).rem_euclid(len) as usize;
    }

    /// Log the error, show it in the footer, and hand back the message for the
    /// popup that triggered it.
    fn report_error(&mut self, err: &anyhow::Error) -> String {
        let message = surface_error(err);
        warn!(error = %message, "operation failed");
        self.set_status(message.clone(), StatusKind::Error);
        message
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(MENU_WIDTH), Constraint::Min(0)])
            .split(content_area);

        self.draw_menu(frame, columns[0]);
        match &self.view {
            View::Listing(listing) => self.draw_listing(frame, columns[1], listing),
            View::Statistics(stats) => self.draw_statistics(frame, columns[1], stats),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Adding(form) => self.draw_book_form(frame, area, "Add Book", form),
            Mode::Updating { title, form } => {
                self.draw_book_form(frame, area, &format!("Update \"{title}\""), form)
            }
            Mode::Prompting(prompt) => self.draw_prompt(frame, area, prompt),
            Mode::Searching(form) => self.draw_search_form(frame, area, form),
            Mode::Normal => {}
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = MenuAction::ALL
            .iter()
            .enumerate()
            .map(|(idx, action)| ListItem::new(format!("{}. {}", idx + 1, action.label())))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Menu").borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default().with_selected(Some(self.menu_selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_listing(&self, frame: &mut Frame, area: Rect, listing: &ListingScreen) {
        let block = Block::default()
            .title(format!("{} ({})", listing.heading, listing.books.len()))
            .borders(Borders::ALL);

        if listing.books.is_empty() {
            let paragraph = Paragraph::new(Span::styled(
                listing.empty_message.clone(),
                Style::default().fg(Color::DarkGray),
            ))
            .block(block)
            .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = listing
            .books
            .iter()
            .map(|book| ListItem::new(book_line(book)))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default().with_selected(Some(listing.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_statistics(&self, frame: &mut Frame, area: Rect, stats: &Statistics) {
        let block = Block::default().title("Statistics").borders(Borders::ALL);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Length(3), Constraint::Min(0)])
            .split(inner);

        let lines = vec![
            Line::from(format!("Total books: {}", stats.total)),
            Line::from(format!("Books read: {}", stats.read)),
            Line::from(format!("Percentage read: {:.2}%", stats.percentage_read)),
        ];
        frame.render_widget(Paragraph::new(lines), rows[0]);

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Read"))
            .gauge_style(Style::default().fg(Color::Green))
            .ratio((stats.percentage_read / 100.0).clamp(0.0, 1.0))
            .label(format!("{:.2}%", stats.percentage_read));
        frame.render_widget(gauge, rows[1]);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from(Span::styled(
                format!("Library: {}", self.store.path().display()),
                Style::default().fg(Color::DarkGray),
            ))
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match &self.mode {
            Mode::Normal => Line::from(vec![
                Span::styled("[1-9]", key_style),
                Span::raw(" Choose   "),
                Span::styled("[↑↓ Enter]", key_style),
                Span::raw(" Menu   "),
                Span::styled("[PgUp/PgDn]", key_style),
                Span::raw(" Scroll   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            Mode::Prompting(_) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Submit   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            _ => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next field   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Save   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
        }
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &BookForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = BookField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            let hint = if form.is_update() {
                "Blank fields keep their value • Enter to save • Esc to cancel"
            } else {
                "Enter to save • Tab to switch • Esc to cancel"
            };
            lines.push(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines), inner);

        let (x, y) = form.cursor();
        frame.set_cursor_position((inner.x + x, inner.y + y));
    }

    fn draw_search_form(&self, frame: &mut Frame, area: Rect, form: &SearchForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Search").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = form.build_lines();
        lines.push(Line::from(""));
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let (x, y) = form.cursor();
        frame.set_cursor_position((inner.x + x, inner.y + y));
    }

    fn draw_prompt(&self, frame: &mut Frame, area: Rect, prompt: &Prompt) {
        let popup_area = centered_rect(60, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(prompt.purpose.title())
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![prompt.build_line(), Line::from("")];
        if let Some(error) = &prompt.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let (x, y) = prompt.cursor();
        frame.set_cursor_position((inner.x + x, inner.y + y));
    }
}

/// One listing row: the book's `Display` text, dimmed while unread.
fn book_line(book: &Book) -> Line<'static> {
    let style = if book.read {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::styled(book.to_string(), style)
}
