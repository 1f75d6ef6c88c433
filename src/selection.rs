//! Multi-row selection state for a displayed collection.
//!
//! A [`Selection`] belongs to one collection instance. Callers reset it when a
//! fresh fetch replaces the collection and prune it after deletions so every
//! selected id still names a displayed row.

use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the id if absent, remove it if present. Other ids are untouched.
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Replace the selection with exactly the given ids.
    pub fn select_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = ids.into_iter().map(Into::into).collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Header checkbox behaviour: select every displayed id, or clear when
    /// everything is already selected.
    pub fn toggle_all<S: AsRef<str>>(&mut self, displayed: &[S]) {
        if self.is_all_selected(displayed) {
            self.clear();
        } else {
            self.select_all(displayed.iter().map(|id| id.as_ref().to_string()));
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// True only when something is displayed, the counts match, and every
    /// displayed id is actually selected. Equal counts alone are not enough
    /// once the displayed collection has changed underneath the selection.
    pub fn is_all_selected<S: AsRef<str>>(&self, displayed: &[S]) -> bool {
        !displayed.is_empty()
            && self.ids.len() == displayed.len()
            && displayed.iter().all(|id| self.ids.contains(id.as_ref()))
    }

    /// Drop every selected id that is no longer displayed.
    pub fn retain_existing<S: AsRef<str>>(&mut self, displayed: &[S]) {
        let displayed: HashSet<&str> = displayed.iter().map(|id| id.as_ref()).collect();
        self.ids.retain(|id| displayed.contains(id.as_str()));
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether the bulk delete affordance should be visible.
    pub fn show_bulk_delete(&self) -> bool {
        !self.is_empty()
    }

    /// Selected ids in sorted order, for deterministic iteration.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }
}
