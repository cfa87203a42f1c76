//! Ratatui front-end split across logical submodules: `app` owns the state
//! machine and rendering, `forms` the modal add-entry forms, `terminal` the
//! event loop, and `helpers` the small layout/formatting utilities.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
