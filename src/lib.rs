//! Core library surface for the routine tracker.
//!
//! The engine modules (`resource`, `selection`, `summary`, `bulk_delete`) know
//! nothing about the terminal; `db` supplies the SQLite store behind them and
//! `ui` drives everything from the keyboard.
pub mod bulk_delete;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod resource;
pub mod selection;
pub mod summary;
pub mod ui;

pub use bulk_delete::{delete_selected, DeleteOutcome, DeletePlan, DeleteReport};
pub use config::AppConfig;
pub use db::SqliteStore;
pub use error::{CoreError, StoreError};
pub use models::{Exercise, Muscle, Routine, RoutineDraft, RoutineExercise, UserProfile};
pub use resource::{Filter, Resource, ResourceStore};
pub use selection::Selection;
pub use summary::{summarize, RoutineSummary};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
