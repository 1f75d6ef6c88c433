use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::{Exercise, ProfileDraft, Routine, RoutineDraft, RoutineExerciseDraft, UserProfile};

fn field_style(is_active: bool, is_empty: bool) -> Style {
    if is_active {
        Style::default().fg(Color::Yellow)
    } else if is_empty {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    }
}

fn labelled_line(field_name: &str, value: &str, placeholder: &str, is_active: bool) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };
    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, field_style(is_active, value.is_empty())),
    ])
}

fn parse_count(raw: &str, label: &str, exercise: &str) -> Result<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    let value = raw
        .parse::<u32>()
        .with_context(|| format!("{label} for {exercise} must be at most {}.", u32::MAX))?;
    Ok(i64::from(value))
}

/// Fields of the routine form, in focus order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum RoutineField {
    #[default]
    Name,
    Day,
    Exercise,
    Sets,
    Reps,
    Duration,
}

impl RoutineField {
    fn is_entry_field(self) -> bool {
        matches!(
            self,
            RoutineField::Exercise | RoutineField::Sets | RoutineField::Reps | RoutineField::Duration
        )
    }
}

/// One exercise line of the routine form. `exercise` indexes the catalogue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct EntryForm {
    pub(crate) exercise: usize,
    pub(crate) sets: String,
    pub(crate) reps: String,
    pub(crate) duration: String,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            exercise: 0,
            sets: "3".to_string(),
            reps: "10".to_string(),
            duration: "0".to_string(),
        }
    }
}

/// Create/edit state for a routine and its ordered exercise list.
#[derive(Default, Clone)]
pub(crate) struct RoutineForm {
    pub(crate) name: String,
    pub(crate) day: String,
    pub(crate) entries: Vec<EntryForm>,
    pub(crate) entry: usize,
    pub(crate) active: RoutineField,
    pub(crate) error: Option<String>,
}

impl RoutineForm {
    /// Populate the form from an existing routine. Entries whose exercise is no
    /// longer in the catalogue fall back to the first catalogue item.
    pub(crate) fn from_routine(routine: &Routine, catalog: &[Exercise]) -> Self {
        let entries = routine
            .exercises
            .iter()
            .map(|item| {
                let exercise = item
                    .exercise
                    .as_ref()
                    .and_then(|exercise| catalog.iter().position(|c| c.id == exercise.id))
                    .unwrap_or(0);
                EntryForm {
                    exercise,
                    sets: item.sets.unwrap_or(0).to_string(),
                    reps: item.reps.unwrap_or(0).to_string(),
                    duration: item.duration.unwrap_or(0).to_string(),
                }
            })
            .collect();

        Self {
            name: routine.name.clone(),
            day: routine.day.clone().unwrap_or_default(),
            entries,
            ..Self::default()
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            RoutineField::Name => RoutineField::Day,
            RoutineField::Day if self.entries.is_empty() => RoutineField::Name,
            RoutineField::Day => RoutineField::Exercise,
            RoutineField::Exercise => RoutineField::Sets,
            RoutineField::Sets => RoutineField::Reps,
            RoutineField::Reps => RoutineField::Duration,
            RoutineField::Duration => RoutineField::Name,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            RoutineField::Name if self.entries.is_empty() => RoutineField::Day,
            RoutineField::Name => RoutineField::Duration,
            RoutineField::Day => RoutineField::Name,
            RoutineField::Exercise => RoutineField::Day,
            RoutineField::Sets => RoutineField::Exercise,
            RoutineField::Reps => RoutineField::Sets,
            RoutineField::Duration => RoutineField::Reps,
        };
    }

    /// Move between exercise lines; only meaningful while an entry field has focus.
    pub(crate) fn move_entry(&mut self, offset: isize) {
        if self.entries.is_empty() || !self.active.is_entry_field() {
            return;
        }
        let max = self.entries.len() as isize - 1;
        self.entry = (self.entry as isize + offset).clamp(0, max) as usize;
    }

    /// Cycle the catalogue exercise of the focused line.
    pub(crate) fn cycle_exercise(&mut self, offset: isize, catalog_len: usize) {
        if self.active != RoutineField::Exercise || catalog_len == 0 {
            return;
        }
        if let Some(entry) = self.entries.get_mut(self.entry) {
            let len = catalog_len as isize;
            entry.exercise = ((entry.exercise as isize + offset).rem_euclid(len)) as usize;
        }
    }

    pub(crate) fn add_entry(&mut self) {
        self.entries.push(EntryForm::default());
        self.entry = self.entries.len() - 1;
        self.active = RoutineField::Exercise;
    }

    pub(crate) fn remove_entry(&mut self) {
        if self.entry >= self.entries.len() {
            return;
        }
        self.entries.remove(self.entry);
        if self.entries.is_empty() {
            self.entry = 0;
            self.active = RoutineField::Name;
        } else if self.entry >= self.entries.len() {
            self.entry = self.entries.len() - 1;
        }
    }

    fn active_text(&mut self) -> Option<&mut String> {
        match self.active {
            RoutineField::Name => Some(&mut self.name),
            RoutineField::Day => Some(&mut self.day),
            RoutineField::Exercise => None,
            RoutineField::Sets => self.entries.get_mut(self.entry).map(|e| &mut e.sets),
            RoutineField::Reps => self.entries.get_mut(self.entry).map(|e| &mut e.reps),
            RoutineField::Duration => self.entries.get_mut(self.entry).map(|e| &mut e.duration),
        }
    }

    /// Append a character to the active field. Numeric fields take digits only.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let numeric = matches!(
            self.active,
            RoutineField::Sets | RoutineField::Reps | RoutineField::Duration
        );
        let allowed = if numeric {
            ch.is_ascii_digit()
        } else {
            !ch.is_control()
        };
        match self.active_text() {
            Some(value) if allowed => {
                value.push(ch);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(value) = self.active_text() {
            value.pop();
        }
    }

    /// Validate the inputs and build a draft. Blank numbers count as zero.
    pub(crate) fn parse_inputs(&self, catalog: &[Exercise]) -> Result<RoutineDraft> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Routine name is required."));
        }
        let day = self.day.trim();

        let mut exercises = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let exercise = catalog
                .get(entry.exercise)
                .ok_or_else(|| anyhow!("Pick an exercise from the catalogue."))?;
            exercises.push(RoutineExerciseDraft {
                exercise_id: exercise.id,
                sets: parse_count(&entry.sets, "Sets", &exercise.name)?,
                reps: parse_count(&entry.reps, "Reps", &exercise.name)?,
                duration: parse_count(&entry.duration, "Duration", &exercise.name)?,
            });
        }

        Ok(RoutineDraft {
            name: name.to_string(),
            day: (!day.is_empty()).then(|| day.to_string()),
            exercises,
        })
    }

    pub(crate) fn build_line(&self, field_name: &str, field: RoutineField) -> Line<'static> {
        let (value, placeholder) = match field {
            RoutineField::Day => (&self.day, "<unassigned>"),
            _ => (&self.name, "<required>"),
        };
        labelled_line(field_name, value, placeholder, self.active == field)
    }

    /// One line per exercise entry; the focused line marks its active column.
    pub(crate) fn entry_lines(&self, catalog: &[Exercise]) -> Vec<Line<'static>> {
        if self.entries.is_empty() {
            return vec![Line::from(Span::styled(
                "No exercises yet. Ctrl+N adds one.",
                Style::default().fg(Color::DarkGray),
            ))];
        }

        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let focused = index == self.entry && self.active.is_entry_field();
                let cell = |field: RoutineField, text: String| {
                    let style = if focused && self.active == field {
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::UNDERLINED)
                    } else {
                        Style::default()
                    };
                    Span::styled(text, style)
                };
                let name = catalog
                    .get(entry.exercise)
                    .map(|exercise| exercise.name.clone())
                    .unwrap_or_else(|| "?".to_string());

                Line::from(vec![
                    Span::raw(if focused { "> " } else { "  " }),
                    Span::raw(format!("{}. ", index + 1)),
                    cell(RoutineField::Exercise, format!("{name:<22}")),
                    Span::raw(" sets "),
                    cell(RoutineField::Sets, entry.sets.clone()),
                    Span::raw("  reps "),
                    cell(RoutineField::Reps, entry.reps.clone()),
                    Span::raw("  sec "),
                    cell(RoutineField::Duration, entry.duration.clone()),
                ])
            })
            .collect()
    }

    pub(crate) fn value_len(&self, field: RoutineField) -> usize {
        match field {
            RoutineField::Day => self.day.chars().count(),
            _ => self.name.chars().count(),
        }
    }
}

/// Pending confirmation for deleting every selected routine.
#[derive(Clone)]
pub(crate) struct ConfirmBulkDelete {
    pub(crate) names: Vec<String>,
}

impl ConfirmBulkDelete {
    /// Names of the selected routines, in table order.
    pub(crate) fn new(routines: &[Routine], is_selected: impl Fn(&str) -> bool) -> Self {
        Self {
            names: routines
                .iter()
                .filter(|routine| is_selected(&routine.id))
                .map(|routine| routine.name.clone())
                .collect(),
        }
    }
}

/// Fields available within the profile form.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub(crate) enum ProfileField {
    #[default]
    Username,
    Avatar,
}

#[derive(Default, Clone)]
pub(crate) struct ProfileForm {
    pub(crate) username: String,
    pub(crate) avatar: String,
    pub(crate) active: ProfileField,
    pub(crate) error: Option<String>,
}

impl ProfileForm {
    pub(crate) fn from_profile(profile: &UserProfile) -> Self {
        Self {
            username: profile.username.clone(),
            avatar: profile.avatar.clone(),
            ..Self::default()
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            ProfileField::Username => ProfileField::Avatar,
            ProfileField::Avatar => ProfileField::Username,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            ProfileField::Username => self.username.push(ch),
            ProfileField::Avatar => self.avatar.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            ProfileField::Username => {
                self.username.pop();
            }
            ProfileField::Avatar => {
                self.avatar.pop();
            }
        }
    }

    pub(crate) fn parse_inputs(&self) -> Result<ProfileDraft> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(anyhow!("Username is required."));
        }
        Ok(ProfileDraft {
            username: username.to_string(),
            avatar: self.avatar.trim().to_string(),
        })
    }

    pub(crate) fn build_line(&self, field_name: &str, field: ProfileField) -> Line<'static> {
        let (value, placeholder) = match field {
            ProfileField::Username => (&self.username, "<required>"),
            ProfileField::Avatar => (&self.avatar, "<optional>"),
        };
        labelled_line(field_name, value, placeholder, self.active == field)
    }

    pub(crate) fn value_len(&self, field: ProfileField) -> usize {
        match field {
            ProfileField::Username => self.username.chars().count(),
            ProfileField::Avatar => self.avatar.chars().count(),
        }
    }
}
