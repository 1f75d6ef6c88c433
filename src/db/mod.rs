//! Persistence module split across logical submodules.

mod connection;
mod exercises;
mod profiles;
mod routines;
mod store;

pub use connection::{ensure_schema, open_database};
pub use exercises::fetch_exercise_catalog;
pub use profiles::{
    create_profile, delete_profile, fetch_profile, fetch_profiles, update_profile, upsert_profile,
};
pub use routines::{
    create_routine, delete_routine, fetch_routine, fetch_routines, update_routine, upsert_routine,
};
pub use store::SqliteStore;
