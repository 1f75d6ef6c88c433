//! Terminal interface: routines table, routine and profile forms, and the
//! event loop that ties them to the store.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
