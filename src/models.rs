//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. Routines arrive from the store as a fully loaded graph
//! (routine → routine exercises → exercise → muscles); nothing in here fetches
//! lazily.

use std::fmt;

use crate::resource::Entity;

/// Name shown for routines that were never pinned to a weekday.
pub const UNASSIGNED_DAY: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A muscle group tag. Names are what the summaries report.
pub struct Muscle {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Catalogue entry for a movement, together with the muscles it works through
/// the `exercise_muscles` association.
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub muscles: Vec<Muscle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One exercise's prescription inside a routine.
///
/// The numeric columns are optional because the store contract allows nulls;
/// the aggregation engine refuses to guess and reports a shape error instead.
pub struct RoutineExercise {
    /// Primary key of the `routine_exercises` row.
    pub id: i64,
    /// Number of sets.
    pub sets: Option<i64>,
    /// Repetitions per set.
    pub reps: Option<i64>,
    /// Seconds, used for cardio-style entries.
    pub duration: Option<i64>,
    /// The joined catalogue exercise. `None` means the join came back empty.
    pub exercise: Option<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A named workout plan. The routine owns its ordered exercise list.
pub struct Routine {
    /// Store-generated identifier (a UUID for the SQLite backend).
    pub id: String,
    pub name: String,
    /// Optional weekday label such as "Monday".
    pub day: Option<String>,
    pub exercises: Vec<RoutineExercise>,
}

impl Routine {
    /// Day label for display, falling back to [`UNASSIGNED_DAY`] when the
    /// routine has no day or only whitespace.
    pub fn day_label(&self) -> &str {
        match self.day.as_deref().map(str::trim) {
            Some(day) if !day.is_empty() => day,
            _ => UNASSIGNED_DAY,
        }
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Entity for Routine {
    type Draft = RoutineDraft;
    const KIND: &'static str = "Routine";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Payload used to create or replace a routine.
pub struct RoutineDraft {
    pub name: String,
    pub day: Option<String>,
    pub exercises: Vec<RoutineExerciseDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineExerciseDraft {
    pub exercise_id: i64,
    pub sets: i64,
    pub reps: i64,
    pub duration: i64,
}

impl RoutineDraft {
    /// Build a draft mirroring an existing routine. Entries whose exercise join
    /// is missing are dropped since they cannot be written back.
    pub fn from_routine(routine: &Routine) -> Self {
        let exercises = routine
            .exercises
            .iter()
            .filter_map(|entry| {
                let exercise = entry.exercise.as_ref()?;
                Some(RoutineExerciseDraft {
                    exercise_id: exercise.id,
                    sets: entry.sets.unwrap_or(0),
                    reps: entry.reps.unwrap_or(0),
                    duration: entry.duration.unwrap_or(0),
                })
            })
            .collect();

        Self {
            name: routine.name.clone(),
            day: routine.day.clone(),
            exercises,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The signed-in user's profile row. `id` is the user id itself.
pub struct UserProfile {
    pub id: String,
    pub username: String,
    /// Free-form avatar reference (usually a URL).
    pub avatar: String,
}

impl Entity for UserProfile {
    type Draft = ProfileDraft;
    const KIND: &'static str = "Profile";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub username: String,
    pub avatar: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routine_with_day(day: Option<&str>) -> Routine {
        Routine {
            id: "r1".to_string(),
            name: "Push".to_string(),
            day: day.map(str::to_string),
            exercises: Vec::new(),
        }
    }

    #[test]
    fn day_label_falls_back_when_blank() {
        assert_eq!(routine_with_day(None).day_label(), UNASSIGNED_DAY);
        assert_eq!(routine_with_day(Some("  ")).day_label(), UNASSIGNED_DAY);
        assert_eq!(routine_with_day(Some("Monday")).day_label(), "Monday");
    }

    #[test]
    fn draft_skips_entries_without_exercise() {
        let mut routine = routine_with_day(Some("Friday"));
        routine.exercises = vec![
            RoutineExercise {
                id: 1,
                sets: Some(3),
                reps: Some(10),
                duration: None,
                exercise: Some(Exercise {
                    id: 7,
                    name: "Bench Press".to_string(),
                    muscles: Vec::new(),
                }),
            },
            RoutineExercise {
                id: 2,
                sets: Some(1),
                reps: Some(1),
                duration: Some(60),
                exercise: None,
            },
        ];

        let draft = RoutineDraft::from_routine(&routine);
        assert_eq!(draft.day.as_deref(), Some("Friday"));
        assert_eq!(
            draft.exercises,
            vec![RoutineExerciseDraft {
                exercise_id: 7,
                sets: 3,
                reps: 10,
                duration: 0,
            }]
        );
    }
}
