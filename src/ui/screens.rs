use ratatui::layout::Constraint;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Cell, Row};

use crate::models::Routine;
use crate::selection::Selection;
use crate::summary::{format_duration, summarize};

use super::helpers::checkbox;

/// Column widths for the routines table, in header order.
pub(crate) const ROUTINE_COLUMNS: [Constraint; 8] = [
    Constraint::Length(4),
    Constraint::Percentage(22),
    Constraint::Length(11),
    Constraint::Min(18),
    Constraint::Length(10),
    Constraint::Length(6),
    Constraint::Length(6),
    Constraint::Length(7),
];

/// Cursor and selection state for the routines table. The selection is scoped
/// to the collection currently on screen.
#[derive(Default)]
pub(crate) struct RoutinesScreen {
    pub(crate) cursor: usize,
    pub(crate) selection: Selection,
}

impl RoutinesScreen {
    pub(crate) fn move_cursor(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let max = len as isize - 1;
        self.cursor = (self.cursor as isize + offset).clamp(0, max) as usize;
    }

    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    pub(crate) fn current<'a>(&self, routines: &'a [Routine]) -> Option<&'a Routine> {
        routines.get(self.cursor)
    }

    /// Called whenever a fetch replaces the collection.
    pub(crate) fn reset_for(&mut self, len: usize) {
        self.selection.clear();
        self.ensure_in_bounds(len);
    }

    /// Header row, including the select-all checkbox.
    pub(crate) fn header(&self, ids: &[String]) -> Row<'static> {
        let all = self.selection.is_all_selected(ids);
        Row::new(vec![
            Cell::from(checkbox(all)),
            Cell::from("Name"),
            Cell::from("Day"),
            Cell::from("Muscles"),
            Cell::from("Exercises"),
            Cell::from("Sets"),
            Cell::from("Reps"),
            Cell::from("Cardio"),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD))
    }

    /// Table row for one routine. Summaries are recomputed on every draw; a
    /// routine whose data does not add up shows `!` in the derived columns.
    pub(crate) fn row(&self, routine: &Routine) -> Row<'static> {
        let marker = checkbox(self.selection.is_selected(&routine.id));
        let exercises = routine.exercises.len().to_string();

        let cells = match summarize(routine) {
            Ok(summary) => vec![
                Cell::from(marker),
                Cell::from(routine.name.clone()),
                Cell::from(routine.day_label().to_string()),
                Cell::from(summary.muscle_list()),
                Cell::from(exercises),
                Cell::from(summary.sets.to_string()),
                Cell::from(summary.reps.to_string()),
                Cell::from(format_duration(summary.duration)),
            ],
            Err(_) => {
                let broken = Style::default().fg(Color::Red);
                vec![
                    Cell::from(marker),
                    Cell::from(routine.name.clone()),
                    Cell::from(routine.day_label().to_string()),
                    Cell::from("!").style(broken),
                    Cell::from(exercises),
                    Cell::from("!").style(broken),
                    Cell::from("!").style(broken),
                    Cell::from("!").style(broken),
                ]
            }
        };

        Row::new(cells)
    }
}
