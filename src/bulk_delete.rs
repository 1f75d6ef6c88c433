//! Deleting every selected row in one go.
//!
//! Deletes are independent and best effort: one request per selected id that
//! is still in the collection, all in flight at once, each bounded by the
//! request timeout. Nothing is rolled back when some fail. The coordinator
//! reports a per-id outcome instead, and:
//!
//! - removes deleted ids from the collection and from the selection,
//! - leaves failed ids in the collection and still selected, so a retry is one
//!   keypress away,
//! - prunes selected ids that were no longer displayed,
//! - names every failed id in the collection's error message.
//!
//! A timeout only stops the wait. The store may still commit the delete
//! afterwards (SQLite work runs on the blocking pool and cannot be
//! interrupted), so a timed-out or cancelled id has an unknown outcome.
//! [`resync_unresolved`] re-reads the collection when that happens.
//!
//! The work is split into plan / execute / apply so that `execute` can run on
//! a background task while the UI keeps going. `apply` refuses reports whose
//! collection has been replaced by a newer fetch in the meantime.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{info, warn};

use crate::error::{CoreError, StoreError};
use crate::resource::{with_timeout, Entity, Resource, ResourceStore};
use crate::selection::Selection;

/// Which ids to delete, captured against one collection generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePlan {
    generation: u64,
    targets: Vec<String>,
    skipped: Vec<String>,
}

impl DeletePlan {
    pub fn new<T: Entity>(selection: &Selection, collection: &Resource<T>) -> Self {
        let (targets, skipped): (Vec<String>, Vec<String>) = selection
            .ids()
            .into_iter()
            .partition(|id| collection.get(id).is_some());

        Self {
            generation: collection.generation(),
            targets,
            skipped,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Issue every delete concurrently and wait for all of them. Completion
    /// order does not matter; the report lists ids in plan order.
    pub async fn execute<T: Entity>(
        self,
        store: Arc<dyn ResourceStore<T>>,
        timeout: Duration,
    ) -> DeleteReport {
        let store = &store;
        let results = join_all(self.targets.iter().map(move |id| async move {
            let result = with_timeout(timeout, store.delete(id)).await;
            (id.clone(), result)
        }))
        .await;

        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        for (id, result) in results {
            match result {
                Ok(()) => deleted.push(id),
                Err(error) => {
                    warn!(kind = T::KIND, id = %id, error = %error, "bulk delete item failed");
                    failed.push(DeleteFailure { id, error });
                }
            }
        }

        DeleteReport {
            generation: self.generation,
            deleted,
            failed,
            skipped: self.skipped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub id: String,
    pub error: StoreError,
}

impl DeleteFailure {
    /// The request was abandoned rather than rejected, so the row may be gone.
    pub fn is_unresolved(&self) -> bool {
        matches!(self.error, StoreError::Timeout(_) | StoreError::Cancelled)
    }
}

/// Raw per-id results, not yet reconciled with local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    generation: u64,
    deleted: Vec<String>,
    failed: Vec<DeleteFailure>,
    skipped: Vec<String>,
}

impl DeleteReport {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reconcile the collection and selection with what the store did.
    ///
    /// Returns [`CoreError::StaleState`] without touching anything when the
    /// collection was re-fetched after the plan was made.
    pub fn apply<T: Entity>(
        self,
        collection: &mut Resource<T>,
        selection: &mut Selection,
    ) -> Result<DeleteOutcome, CoreError> {
        let current = collection.generation();
        if current != self.generation {
            warn!(
                kind = T::KIND,
                expected = self.generation,
                current,
                "discarding bulk delete report for a superseded collection"
            );
            return Err(CoreError::StaleState {
                expected: self.generation,
                current,
            });
        }

        collection.remove_local(&self.deleted);
        for id in &self.deleted {
            selection.remove(id);
        }
        selection.retain_existing(&collection.ids());

        let outcome = DeleteOutcome {
            deleted: self.deleted,
            failed: self.failed,
            skipped: self.skipped,
        };
        collection.set_error(outcome.error_message(T::KIND));

        info!(
            kind = T::KIND,
            deleted = outcome.deleted.len(),
            failed = outcome.failed.len(),
            skipped = outcome.skipped.len(),
            "bulk delete applied"
        );
        Ok(outcome)
    }
}

/// What a bulk delete did, after reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted: Vec<String>,
    pub failed: Vec<DeleteFailure>,
    /// Selected ids that were not in the collection and were never requested.
    pub skipped: Vec<String>,
}

impl DeleteOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Whether any failure left the store state unknown.
    pub fn has_unresolved(&self) -> bool {
        self.failed.iter().any(DeleteFailure::is_unresolved)
    }

    /// A message naming every failed id, or `None` when nothing failed.
    pub fn error_message(&self, kind: &str) -> Option<String> {
        if self.failed.is_empty() {
            return None;
        }

        let noun = kind.to_lowercase();
        let plural = if self.failed.len() == 1 { "" } else { "s" };
        let details = self
            .failed
            .iter()
            .map(|failure| format!("{} ({})", failure.id, failure.error))
            .collect::<Vec<_>>()
            .join("; ");

        Some(format!(
            "Could not delete {} {noun}{plural}: {details}",
            self.failed.len()
        ))
    }
}

/// Re-read the collection when an applied outcome has timed-out or cancelled
/// deletes, so rows the store removed late do not stay listed and selected.
///
/// Still-present failed ids stay selected and the failure message is kept.
/// Returns whether a fetch happened.
pub async fn resync_unresolved<T: Entity>(
    outcome: &DeleteOutcome,
    collection: &mut Resource<T>,
    selection: &mut Selection,
) -> Result<bool, CoreError> {
    if !outcome.has_unresolved() {
        return Ok(false);
    }

    info!(kind = T::KIND, "re-reading collection after unresolved deletes");
    collection.fetch().await?;
    selection.retain_existing(&collection.ids());
    collection.set_error(outcome.error_message(T::KIND));
    Ok(true)
}

/// Plan, execute and apply in one call, for callers that do not need the
/// phases split.
pub async fn delete_selected<T: Entity>(
    selection: &mut Selection,
    collection: &mut Resource<T>,
) -> Result<DeleteOutcome, CoreError> {
    let plan = DeletePlan::new(selection, collection);
    let report = plan.execute(collection.store(), collection.timeout()).await;
    let outcome = report.apply(collection, selection)?;
    resync_unresolved(&outcome, collection, selection).await?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Exercise, Muscle, Routine, RoutineDraft, RoutineExercise};
    use crate::resource::testing::ScriptedStore;
    use crate::resource::Filter;
    use crate::summary::summarize;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn with_workout(store: &ScriptedStore, id: &str) {
        let mut routines = store.routines.lock().unwrap();
        let routine = routines.iter_mut().find(|r| r.id == id).unwrap();
        *routine = Routine {
            exercises: vec![RoutineExercise {
                id: 1,
                sets: Some(4),
                reps: Some(8),
                duration: Some(0),
                exercise: Some(Exercise {
                    id: 1,
                    name: "Squat".to_string(),
                    muscles: vec![Muscle {
                        id: 1,
                        name: "Quadriceps".to_string(),
                    }],
                }),
            }],
            ..routine.clone()
        };
    }

    async fn loaded(store: ScriptedStore) -> (Arc<ScriptedStore>, Resource<Routine>) {
        let store = Arc::new(store);
        let shared: Arc<dyn ResourceStore<Routine>> = store.clone();
        let mut routines = Resource::new(shared, TIMEOUT);
        routines.fetch().await.unwrap();
        (store, routines)
    }

    #[tokio::test]
    async fn partial_failure_keeps_failed_row_selected() {
        let store = ScriptedStore::with_ids(&["a", "b", "c"]).failing_delete("c");
        with_workout(&store, "b");
        let (_store, mut routines) = loaded(store).await;
        let before = summarize(routines.get("b").unwrap()).unwrap();

        let mut selection = Selection::new();
        selection.select_all(["a", "c"]);

        let outcome = delete_selected(&mut selection, &mut routines).await.unwrap();

        assert_eq!(routines.ids(), vec!["b", "c"]);
        assert_eq!(selection.ids(), vec!["c".to_string()]);
        assert_eq!(outcome.deleted, vec!["a".to_string()]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].id, "c");
        assert!(!outcome.is_complete());

        let error = routines.error().unwrap();
        assert_eq!(
            error,
            "Could not delete 1 routine: c (permission denied for c)"
        );
        assert_eq!(summarize(routines.get("b").unwrap()).unwrap(), before);
    }

    #[tokio::test]
    async fn every_target_is_requested_once_and_ids_outside_collection_are_pruned() {
        let (store, mut routines) = loaded(ScriptedStore::with_ids(&["a", "b"])).await;
        let mut selection = Selection::new();
        selection.select_all(["a", "b", "ghost"]);

        let outcome = delete_selected(&mut selection, &mut routines).await.unwrap();

        let mut calls = store.delete_calls.lock().unwrap().clone();
        calls.sort();
        assert_eq!(calls, vec!["a", "b"]);
        assert_eq!(outcome.skipped, vec!["ghost".to_string()]);
        assert!(outcome.is_complete());
        assert!(routines.data().is_empty());
        assert!(selection.is_empty());
        assert_eq!(routines.error(), None);
    }

    #[tokio::test]
    async fn report_for_superseded_collection_is_discarded() {
        let (_store, mut routines) = loaded(ScriptedStore::with_ids(&["a", "b"])).await;
        let mut selection = Selection::new();
        selection.toggle("a");

        let plan = DeletePlan::new(&selection, &routines);
        assert_eq!(plan.targets(), ["a".to_string()]);
        let report = plan.execute(routines.store(), TIMEOUT).await;

        routines.fetch().await.unwrap();
        let ids_after_refetch = routines.ids();
        let err = report.apply(&mut routines, &mut selection).unwrap_err();

        assert_eq!(
            err,
            CoreError::StaleState {
                expected: 1,
                current: 2,
            }
        );
        assert_eq!(routines.ids(), ids_after_refetch);
        assert!(selection.is_selected("a"));
    }

    #[tokio::test]
    async fn timed_out_deletes_are_reported_as_failures() {
        let store = ScriptedStore {
            delay: Some(Duration::from_millis(200)),
            ..ScriptedStore::with_ids(&["a", "b"])
        };
        let store: Arc<dyn ResourceStore<Routine>> = Arc::new(store);
        let mut routines = Resource::new(store, Duration::from_secs(2));
        routines.fetch().await.unwrap();
        let mut selection = Selection::new();
        selection.select_all(["a", "b"]);

        let plan = DeletePlan::new(&selection, &routines);
        let report = plan
            .execute(routines.store(), Duration::from_millis(10))
            .await;
        let outcome = report.apply(&mut routines, &mut selection).unwrap();

        assert!(outcome.deleted.is_empty());
        assert!(outcome
            .failed
            .iter()
            .all(|failure| failure.error == StoreError::Timeout(Duration::from_millis(10))));
        assert_eq!(routines.ids(), vec!["a", "b"]);
        assert_eq!(selection.len(), 2);
        assert!(routines.error().unwrap().starts_with("Could not delete 2 routines"));
    }

    /// Commits deletes straight away but answers late, like a blocking backend
    /// whose work outlives the caller's deadline.
    struct LateAckStore {
        inner: ScriptedStore,
        ack_delay: Duration,
    }

    #[async_trait::async_trait]
    impl ResourceStore<Routine> for LateAckStore {
        async fn select(&self, filter: Filter) -> Result<Vec<Routine>, StoreError> {
            self.inner.select(filter).await
        }

        async fn insert(&self, draft: RoutineDraft) -> Result<Routine, StoreError> {
            self.inner.insert(draft).await
        }

        async fn update(&self, id: &str, draft: RoutineDraft) -> Result<Routine, StoreError> {
            self.inner.update(id, draft).await
        }

        async fn upsert(&self, id: &str, draft: RoutineDraft) -> Result<Routine, StoreError> {
            self.inner.upsert(id, draft).await
        }

        async fn delete(&self, id: &str) -> Result<(), StoreError> {
            self.inner.delete(id).await?;
            tokio::time::sleep(self.ack_delay).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn late_commit_after_timeout_is_picked_up_by_refetch() {
        let store = LateAckStore {
            inner: ScriptedStore::with_ids(&["a", "b", "c"]).failing_delete("c"),
            ack_delay: Duration::from_millis(500),
        };
        let store: Arc<dyn ResourceStore<Routine>> = Arc::new(store);
        let mut routines = Resource::new(store, Duration::from_millis(20));
        routines.fetch().await.unwrap();

        let mut selection = Selection::new();
        selection.select_all(["a", "c"]);

        let outcome = delete_selected(&mut selection, &mut routines).await.unwrap();

        assert!(outcome.deleted.is_empty());
        assert!(outcome.has_unresolved());
        assert_eq!(routines.generation(), 2);
        assert_eq!(routines.ids(), vec!["b", "c"]);
        assert_eq!(selection.ids(), vec!["c".to_string()]);
        let error = routines.error().unwrap();
        assert!(error.starts_with("Could not delete 2 routines: a (request timed out"));
        assert!(error.contains("c (permission denied for c)"));
    }

    #[tokio::test]
    async fn rejected_deletes_do_not_trigger_a_refetch() {
        let store = ScriptedStore::with_ids(&["a", "b"]).failing_delete("a");
        let (_store, mut routines) = loaded(store).await;
        let mut selection = Selection::new();
        selection.toggle("a");

        let outcome = delete_selected(&mut selection, &mut routines).await.unwrap();

        assert!(!outcome.has_unresolved());
        assert_eq!(routines.generation(), 1);
        assert!(!resync_unresolved(&outcome, &mut routines, &mut selection)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn empty_selection_plans_nothing() {
        let (store, mut routines) = loaded(ScriptedStore::with_ids(&["a"])).await;
        let mut selection = Selection::new();

        assert!(DeletePlan::new(&selection, &routines).is_empty());
        let outcome = delete_selected(&mut selection, &mut routines).await.unwrap();

        assert!(outcome.deleted.is_empty());
        assert!(store.delete_calls.lock().unwrap().is_empty());
        assert_eq!(routines.ids(), vec!["a"]);
    }
}
