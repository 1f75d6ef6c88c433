//! Per-routine aggregate metrics. Summaries are derived on every read from the
//! routine's current exercise list and are never stored, so there is nothing to
//! invalidate when the list changes.

use crate::error::CoreError;
use crate::models::{Routine, RoutineExercise};

/// Totals shown next to each routine row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutineSummary {
    /// Sum of sets across all exercises.
    pub sets: u64,
    /// Sum of `sets * reps` across all exercises.
    pub reps: u64,
    /// Sum of durations in seconds.
    pub duration: u64,
    /// Unique muscle names in first-seen order.
    pub muscles: Vec<String>,
}

impl RoutineSummary {
    /// Muscles joined with `", "` for the table's muscles column.
    pub fn muscle_list(&self) -> String {
        self.muscles.join(", ")
    }
}

/// Reduce a routine's nested exercise and muscle records into a summary.
///
/// Missing or negative numeric fields, entries whose exercise join is absent,
/// and totals that do not fit in a `u64` are reported as
/// [`CoreError::DataShape`] rather than read as zero or wrapped.
pub fn summarize(routine: &Routine) -> Result<RoutineSummary, CoreError> {
    let mut summary = RoutineSummary::default();

    for (position, entry) in routine.exercises.iter().enumerate() {
        let sets = required(routine, position, "sets", entry.sets)?;
        let reps = required(routine, position, "reps", entry.reps)?;
        let duration = required(routine, position, "duration", entry.duration)?;

        let shape = |field| shape_error(routine, position, field);
        summary.sets = summary.sets.checked_add(sets).ok_or_else(|| shape("sets"))?;
        summary.reps = sets
            .checked_mul(reps)
            .and_then(|total| summary.reps.checked_add(total))
            .ok_or_else(|| shape("reps"))?;
        summary.duration = summary
            .duration
            .checked_add(duration)
            .ok_or_else(|| shape("duration"))?;

        for name in muscle_names(routine, position, entry)? {
            if !summary.muscles.iter().any(|seen| seen == name) {
                summary.muscles.push(name.to_string());
            }
        }
    }

    Ok(summary)
}

/// Render seconds as `m:ss`, which is how the cardio column reads.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn required(
    routine: &Routine,
    position: usize,
    field: &'static str,
    value: Option<i64>,
) -> Result<u64, CoreError> {
    value
        .and_then(|raw| u64::try_from(raw).ok())
        .ok_or_else(|| shape_error(routine, position, field))
}

fn muscle_names<'a>(
    routine: &Routine,
    position: usize,
    entry: &'a RoutineExercise,
) -> Result<impl Iterator<Item = &'a str>, CoreError> {
    let exercise = entry
        .exercise
        .as_ref()
        .ok_or_else(|| shape_error(routine, position, "exercise"))?;
    Ok(exercise.muscles.iter().map(|muscle| muscle.name.as_str()))
}

fn shape_error(routine: &Routine, position: usize, field: &'static str) -> CoreError {
    CoreError::DataShape {
        routine_id: routine.id.clone(),
        position: position + 1,
        field,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Exercise, Muscle};

    fn entry(sets: i64, reps: i64, duration: i64, muscles: &[&str]) -> RoutineExercise {
        RoutineExercise {
            id: 0,
            sets: Some(sets),
            reps: Some(reps),
            duration: Some(duration),
            exercise: Some(Exercise {
                id: 0,
                name: "exercise".to_string(),
                muscles: muscles
                    .iter()
                    .enumerate()
                    .map(|(idx, name)| Muscle {
                        id: idx as i64,
                        name: name.to_string(),
                    })
                    .collect(),
            }),
        }
    }

    fn routine(exercises: Vec<RoutineExercise>) -> Routine {
        Routine {
            id: "r1".to_string(),
            name: "Upper".to_string(),
            day: None,
            exercises,
        }
    }

    #[test]
    fn empty_routine_is_all_zero() {
        assert_eq!(summarize(&routine(Vec::new())), Ok(RoutineSummary::default()));
    }

    #[test]
    fn totals_and_muscles_for_chest_day() {
        let summary = summarize(&routine(vec![
            entry(3, 10, 0, &["Chest", "Triceps"]),
            entry(2, 12, 0, &["Chest"]),
        ]))
        .unwrap();

        assert_eq!(summary.sets, 5);
        assert_eq!(summary.reps, 54);
        assert_eq!(summary.duration, 0);
        assert_eq!(summary.muscles, vec!["Chest", "Triceps"]);
    }

    #[test]
    fn muscles_keep_first_seen_order_across_exercises() {
        let summary = summarize(&routine(vec![
            entry(1, 1, 0, &["Back"]),
            entry(1, 1, 0, &["Biceps", "Back"]),
            entry(1, 1, 0, &[]),
            entry(1, 1, 0, &["Core", "Biceps"]),
        ]))
        .unwrap();

        assert_eq!(summary.muscles, vec!["Back", "Biceps", "Core"]);
        assert_eq!(summary.muscle_list(), "Back, Biceps, Core");
    }

    #[test]
    fn durations_accumulate_for_cardio() {
        let summary = summarize(&routine(vec![
            entry(1, 0, 600, &["Cardio"]),
            entry(4, 15, 45, &["Quadriceps"]),
        ]))
        .unwrap();

        assert_eq!(summary.sets, 5);
        assert_eq!(summary.reps, 60);
        assert_eq!(summary.duration, 645);
        assert_eq!(format_duration(summary.duration), "10:45");
    }

    #[test]
    fn missing_reps_is_a_shape_error() {
        let mut broken = entry(3, 10, 0, &["Chest"]);
        broken.reps = None;
        let err = summarize(&routine(vec![entry(1, 1, 0, &[]), broken])).unwrap_err();

        assert_eq!(
            err,
            CoreError::DataShape {
                routine_id: "r1".to_string(),
                position: 2,
                field: "reps",
            }
        );
    }

    #[test]
    fn negative_sets_and_missing_join_are_rejected() {
        let negative = entry(-1, 10, 0, &[]);
        assert!(matches!(
            summarize(&routine(vec![negative])),
            Err(CoreError::DataShape { field: "sets", .. })
        ));

        let mut orphan = entry(1, 1, 0, &[]);
        orphan.exercise = None;
        assert!(matches!(
            summarize(&routine(vec![orphan])),
            Err(CoreError::DataShape {
                field: "exercise",
                ..
            })
        ));
    }

    #[test]
    fn oversized_totals_are_shape_errors_instead_of_overflowing() {
        let huge = entry(9_999_999_999, 9_999_999_999, 0, &["Chest"]);
        assert_eq!(
            summarize(&routine(vec![huge])),
            Err(CoreError::DataShape {
                routine_id: "r1".to_string(),
                position: 1,
                field: "reps",
            })
        );

        let long = entry(1, 1, i64::MAX, &[]);
        let err = summarize(&routine(vec![long.clone(), long.clone(), long])).unwrap_err();
        assert_eq!(
            err,
            CoreError::DataShape {
                routine_id: "r1".to_string(),
                position: 3,
                field: "duration",
            }
        );
    }

    #[test]
    fn summaries_do_not_leak_between_calls() {
        let first = routine(vec![entry(3, 10, 0, &["Chest"])]);
        let second = routine(vec![entry(2, 5, 0, &["Back"])]);

        let _ = summarize(&first).unwrap();
        let summary = summarize(&second).unwrap();
        assert_eq!(summary.sets, 2);
        assert_eq!(summary.muscles, vec!["Back"]);
    }
}
