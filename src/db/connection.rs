use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use super::exercises::{catalog_is_empty, seed_catalog};

/// Open (or create) the database at `path`, run lazy migrations, seed the
/// exercise catalogue on first use, and return a live connection. Foreign keys
/// are switched on so routine deletes cascade to their exercise rows.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    ensure_schema(&conn)?;

    if catalog_is_empty(&conn)? {
        seed_catalog(&conn)?;
        info!(path = %path.display(), "seeded exercise catalogue");
    }

    Ok(conn)
}

/// Create every table if missing. Safe to call on an existing database.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS muscles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )",
        [],
    )
    .context("failed to create muscles table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )",
        [],
    )
    .context("failed to create exercises table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS exercise_muscles (
            exercise_id INTEGER NOT NULL,
            muscle_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (exercise_id, muscle_id),
            FOREIGN KEY(exercise_id) REFERENCES exercises(id) ON DELETE CASCADE,
            FOREIGN KEY(muscle_id) REFERENCES muscles(id) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create exercise_muscles table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS routines (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            day TEXT
        )",
        [],
    )
    .context("failed to create routines table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS routine_exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            routine_id TEXT NOT NULL,
            exercise_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            sets INTEGER NOT NULL DEFAULT 0 CHECK (sets >= 0),
            reps INTEGER NOT NULL DEFAULT 0 CHECK (reps >= 0),
            duration INTEGER NOT NULL DEFAULT 0 CHECK (duration >= 0),
            FOREIGN KEY(routine_id) REFERENCES routines(id) ON DELETE CASCADE,
            FOREIGN KEY(exercise_id) REFERENCES exercises(id)
        )",
        [],
    )
    .context("failed to create routine_exercises table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_profile (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL,
            avatar TEXT NOT NULL DEFAULT ''
        )",
        [],
    )
    .context("failed to create user_profile table")?;

    Ok(())
}
