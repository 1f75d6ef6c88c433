use std::collections::HashMap;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::models::{Exercise, Muscle};

/// Starter catalogue written into a fresh database. Each exercise lists the
/// muscles it works, primary first.
const SEED_EXERCISES: &[(&str, &[&str])] = &[
    ("Bench Press", &["Chest", "Triceps", "Shoulders"]),
    ("Push Up", &["Chest", "Triceps"]),
    ("Overhead Press", &["Shoulders", "Triceps"]),
    ("Triceps Dip", &["Triceps", "Chest"]),
    ("Pull Up", &["Back", "Biceps"]),
    ("Barbell Row", &["Back", "Biceps"]),
    ("Biceps Curl", &["Biceps"]),
    ("Back Squat", &["Quadriceps", "Glutes", "Core"]),
    ("Deadlift", &["Hamstrings", "Glutes", "Back"]),
    ("Lunge", &["Quadriceps", "Glutes"]),
    ("Calf Raise", &["Calves"]),
    ("Plank", &["Core"]),
    ("Treadmill Run", &["Cardio"]),
    ("Rowing Machine", &["Cardio", "Back"]),
    ("Jump Rope", &["Cardio", "Calves"]),
];

pub(crate) fn catalog_is_empty(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))
        .context("failed to count exercises")?;
    Ok(count == 0)
}

/// Insert the starter exercises and their muscle tags in one transaction.
pub(crate) fn seed_catalog(conn: &Connection) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to start seed transaction")?;

    for (exercise, muscles) in SEED_EXERCISES {
        tx.execute("INSERT INTO exercises (name) VALUES (?1)", params![exercise])
            .context("failed to insert exercise")?;
        let exercise_id = tx.last_insert_rowid();

        for (position, muscle) in muscles.iter().enumerate() {
            tx.execute(
                "INSERT OR IGNORE INTO muscles (name) VALUES (?1)",
                params![muscle],
            )
            .context("failed to insert muscle")?;
            let muscle_id: i64 = tx
                .query_row(
                    "SELECT id FROM muscles WHERE name = ?1",
                    params![muscle],
                    |row| row.get(0),
                )
                .context("failed to look up muscle")?;
            tx.execute(
                "INSERT INTO exercise_muscles (exercise_id, muscle_id, position)
                 VALUES (?1, ?2, ?3)",
                params![exercise_id, muscle_id, position as i64],
            )
            .context("failed to tag exercise with muscle")?;
        }
    }

    tx.commit().context("failed to commit seed catalogue")
}

/// Every catalogue exercise with its muscles, sorted by name. Feeds the
/// exercise picker in the routine form.
pub fn fetch_exercise_catalog(conn: &Connection) -> Result<Vec<Exercise>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM exercises ORDER BY name COLLATE NOCASE")
        .context("failed to prepare exercise query")?;

    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
        .context("failed to load exercises")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect exercises")?;

    let mut muscles = MuscleCache::default();
    rows.into_iter()
        .map(|(id, name)| -> Result<Exercise> {
            Ok(Exercise {
                id,
                name,
                muscles: muscles.for_exercise(conn, id)?,
            })
        })
        .collect()
}

/// Memoizes muscle lookups for the duration of one query, since the same
/// exercise tends to show up in many routines.
#[derive(Default)]
pub(crate) struct MuscleCache {
    by_exercise: HashMap<i64, Vec<Muscle>>,
}

impl MuscleCache {
    pub(crate) fn for_exercise(
        &mut self,
        conn: &Connection,
        exercise_id: i64,
    ) -> Result<Vec<Muscle>> {
        if let Some(cached) = self.by_exercise.get(&exercise_id) {
            return Ok(cached.clone());
        }

        let mut stmt = conn
            .prepare_cached(
                "SELECT m.id, m.name
                 FROM exercise_muscles em
                 INNER JOIN muscles m ON m.id = em.muscle_id
                 WHERE em.exercise_id = ?1
                 ORDER BY em.position",
            )
            .context("failed to prepare muscle query")?;

        let muscles = stmt
            .query_map([exercise_id], |row| {
                Ok(Muscle {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .context("failed to iterate muscles")?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to collect muscles")?;

        self.by_exercise.insert(exercise_id, muscles.clone());
        Ok(muscles)
    }
}
