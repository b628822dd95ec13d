//! Ratatui front-end for the catalog. The left pane is the numbered menu, the
//! right pane shows the current listing or statistics, and every operation
//! that needs input opens a popup form. Store errors land in the footer and
//! never end the session.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
