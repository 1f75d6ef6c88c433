use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::exercises::MuscleCache;
use crate::models::{Exercise, Routine, RoutineDraft, RoutineExercise};

/// Retrieve every routine with its exercises and muscle tags, sorted by name.
pub fn fetch_routines(conn: &Connection) -> Result<Vec<Routine>> {
    let mut stmt = conn
        .prepare("SELECT id, name, day FROM routines ORDER BY name COLLATE NOCASE, id")
        .context("failed to prepare routine query")?;

    let heads = stmt
        .query_map([], routine_head)
        .context("failed to load routines")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect routines")?;

    let mut muscles = MuscleCache::default();
    heads
        .into_iter()
        .map(|head| hydrate(conn, head, &mut muscles))
        .collect()
}

/// Load one routine graph, or `None` if the id is unknown.
pub fn fetch_routine(conn: &Connection, id: &str) -> Result<Option<Routine>> {
    let head = conn
        .query_row(
            "SELECT id, name, day FROM routines WHERE id = ?1",
            params![id],
            routine_head,
        )
        .optional()
        .context("failed to load routine")?;

    match head {
        Some(head) => Ok(Some(hydrate(conn, head, &mut MuscleCache::default())?)),
        None => Ok(None),
    }
}

/// Insert a routine and its exercise list under a fresh UUID.
pub fn create_routine(conn: &Connection, draft: &RoutineDraft) -> Result<Routine> {
    let id = Uuid::new_v4().to_string();
    let tx = conn
        .unchecked_transaction()
        .context("failed to start routine transaction")?;

    tx.execute(
        "INSERT INTO routines (id, name, day) VALUES (?1, ?2, ?3)",
        params![id, draft.name, draft.day],
    )
    .context("failed to insert routine")?;
    write_exercises(&tx, &id, draft)?;
    tx.commit().context("failed to commit routine")?;

    load_written(conn, &id)
}

/// Replace the name, day and exercise list of an existing routine.
pub fn update_routine(conn: &Connection, id: &str, draft: &RoutineDraft) -> Result<Routine> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to start routine transaction")?;

    let updated = tx
        .execute(
            "UPDATE routines SET name = ?1, day = ?2 WHERE id = ?3",
            params![draft.name, draft.day, id],
        )
        .context("failed to update routine")?;
    if updated == 0 {
        return Err(anyhow!("Routine not found"));
    }

    tx.execute(
        "DELETE FROM routine_exercises WHERE routine_id = ?1",
        params![id],
    )
    .context("failed to clear routine exercises")?;
    write_exercises(&tx, id, draft)?;
    tx.commit().context("failed to commit routine")?;

    load_written(conn, id)
}

/// Create the routine under `id` if it does not exist yet, otherwise replace it.
pub fn upsert_routine(conn: &Connection, id: &str, draft: &RoutineDraft) -> Result<Routine> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to start routine transaction")?;

    tx.execute(
        "INSERT INTO routines (id, name, day) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name, day = excluded.day",
        params![id, draft.name, draft.day],
    )
    .context("failed to upsert routine")?;
    tx.execute(
        "DELETE FROM routine_exercises WHERE routine_id = ?1",
        params![id],
    )
    .context("failed to clear routine exercises")?;
    write_exercises(&tx, id, draft)?;
    tx.commit().context("failed to commit routine")?;

    load_written(conn, id)
}

/// Remove a routine row. The schema cascades to `routine_exercises`.
pub fn delete_routine(conn: &Connection, id: &str) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM routines WHERE id = ?1", params![id])
        .context("failed to delete routine")?;

    if deleted == 0 {
        Err(anyhow!("Routine not found"))
    } else {
        Ok(())
    }
}

struct RoutineHead {
    id: String,
    name: String,
    day: Option<String>,
}

fn routine_head(row: &Row<'_>) -> rusqlite::Result<RoutineHead> {
    Ok(RoutineHead {
        id: row.get(0)?,
        name: row.get(1)?,
        day: row.get(2)?,
    })
}

/// Attach the ordered exercise list (and each exercise's muscles) to a routine.
fn hydrate(conn: &Connection, head: RoutineHead, muscles: &mut MuscleCache) -> Result<Routine> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT re.id, re.sets, re.reps, re.duration, e.id, e.name
             FROM routine_exercises re
             LEFT JOIN exercises e ON e.id = re.exercise_id
             WHERE re.routine_id = ?1
             ORDER BY re.position, re.id",
        )
        .context("failed to prepare routine exercise query")?;

    let rows = stmt
        .query_map(params![head.id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<i64>>(1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, Option<i64>>(3)?,
                row.get::<_, Option<i64>>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })
        .context("failed to iterate routine exercises")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect routine exercises")?;

    let mut exercises = Vec::with_capacity(rows.len());
    for (id, sets, reps, duration, exercise_id, exercise_name) in rows {
        let exercise = match (exercise_id, exercise_name) {
            (Some(exercise_id), Some(name)) => Some(Exercise {
                id: exercise_id,
                name,
                muscles: muscles.for_exercise(conn, exercise_id)?,
            }),
            _ => None,
        };
        exercises.push(RoutineExercise {
            id,
            sets,
            reps,
            duration,
            exercise,
        });
    }

    Ok(Routine {
        id: head.id,
        name: head.name,
        day: head.day,
        exercises,
    })
}

fn write_exercises(conn: &Connection, routine_id: &str, draft: &RoutineDraft) -> Result<()> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO routine_exercises
                (routine_id, exercise_id, position, sets, reps, duration)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .context("failed to prepare routine exercise insert")?;

    for (position, entry) in draft.exercises.iter().enumerate() {
        stmt.execute(params![
            routine_id,
            entry.exercise_id,
            position as i64,
            entry.sets,
            entry.reps,
            entry.duration
        ])
        .context("failed to insert routine exercise")?;
    }

    Ok(())
}

fn load_written(conn: &Connection, id: &str) -> Result<Routine> {
    fetch_routine(conn, id)?.ok_or_else(|| anyhow!("Routine not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fetch_exercise_catalog, open_database};
    use crate::models::RoutineExerciseDraft;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Connection) {
        let dir = TempDir::new().unwrap();
        let conn = open_database(&dir.path().join("routines.sqlite")).unwrap();
        (dir, conn)
    }

    fn exercise_id(conn: &Connection, name: &str) -> i64 {
        fetch_exercise_catalog(conn)
            .unwrap()
            .into_iter()
            .find(|exercise| exercise.name == name)
            .map(|exercise| exercise.id)
            .unwrap()
    }

    fn chest_day(conn: &Connection) -> RoutineDraft {
        RoutineDraft {
            name: "Chest Day".to_string(),
            day: Some("Monday".to_string()),
            exercises: vec![
                RoutineExerciseDraft {
                    exercise_id: exercise_id(conn, "Bench Press"),
                    sets: 3,
                    reps: 10,
                    duration: 0,
                },
                RoutineExerciseDraft {
                    exercise_id: exercise_id(conn, "Push Up"),
                    sets: 2,
                    reps: 12,
                    duration: 0,
                },
            ],
        }
    }

    #[test]
    fn created_routine_comes_back_as_nested_graph() {
        let (_dir, conn) = setup();
        let created = create_routine(&conn, &chest_day(&conn)).unwrap();

        let routines = fetch_routines(&conn).unwrap();
        assert_eq!(routines, vec![created.clone()]);

        let bench = &created.exercises[0];
        assert_eq!(bench.sets, Some(3));
        let bench_exercise = bench.exercise.as_ref().unwrap();
        assert_eq!(bench_exercise.name, "Bench Press");
        let muscles: Vec<_> = bench_exercise.muscles.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(muscles, vec!["Chest", "Triceps", "Shoulders"]);
    }

    #[test]
    fn update_replaces_exercise_list() {
        let (_dir, conn) = setup();
        let created = create_routine(&conn, &chest_day(&conn)).unwrap();

        let mut draft = chest_day(&conn);
        draft.name = "Push".to_string();
        draft.day = None;
        draft.exercises.truncate(1);
        let updated = update_routine(&conn, &created.id, &draft).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Push");
        assert_eq!(updated.day, None);
        assert_eq!(updated.exercises.len(), 1);
    }

    #[test]
    fn update_and_delete_of_unknown_id_fail() {
        let (_dir, conn) = setup();
        let draft = chest_day(&conn);

        let err = update_routine(&conn, "missing", &draft).unwrap_err();
        assert_eq!(err.to_string(), "Routine not found");
        assert!(delete_routine(&conn, "missing").is_err());
    }

    #[test]
    fn delete_cascades_to_routine_exercises() {
        let (_dir, conn) = setup();
        let created = create_routine(&conn, &chest_day(&conn)).unwrap();

        delete_routine(&conn, &created.id).unwrap();

        let leftover: i64 = conn
            .query_row("SELECT COUNT(*) FROM routine_exercises", [], |row| row.get(0))
            .unwrap();
        assert_eq!(leftover, 0);
        assert_eq!(fetch_routine(&conn, &created.id).unwrap(), None);
    }

    #[test]
    fn upsert_creates_then_replaces() {
        let (_dir, conn) = setup();
        let mut draft = chest_day(&conn);

        let first = upsert_routine(&conn, "fixed-id", &draft).unwrap();
        assert_eq!(first.exercises.len(), 2);

        draft.name = "Renamed".to_string();
        let second = upsert_routine(&conn, "fixed-id", &draft).unwrap();
        assert_eq!(second.name, "Renamed");
        assert_eq!(second.exercises.len(), 2);
        assert_eq!(fetch_routines(&conn).unwrap().len(), 1);
    }

    #[test]
    fn unknown_exercise_is_rejected_by_foreign_key() {
        let (_dir, conn) = setup();
        let mut draft = chest_day(&conn);
        draft.exercises[0].exercise_id = 9_999;

        assert!(create_routine(&conn, &draft).is_err());
        assert!(fetch_routines(&conn).unwrap().is_empty());
    }
}
