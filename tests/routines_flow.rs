use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use routine_tracker::bulk_delete::DeletePlan;
use routine_tracker::models::RoutineExerciseDraft;
use routine_tracker::{
    delete_selected, summarize, CoreError, Filter, Resource, ResourceStore, Routine,
    RoutineDraft, Selection, SqliteStore, StoreError,
};
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(5);

fn open_store() -> (TempDir, SqliteStore) {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(&dir.path().join("routines.sqlite")).unwrap();
    (dir, store)
}

async fn exercise_id(store: &SqliteStore, name: &str) -> i64 {
    store
        .exercise_catalog()
        .await
        .unwrap()
        .into_iter()
        .find(|exercise| exercise.name == name)
        .unwrap()
        .id
}

fn entry(exercise_id: i64, sets: i64, reps: i64, duration: i64) -> RoutineExerciseDraft {
    RoutineExerciseDraft {
        exercise_id,
        sets,
        reps,
        duration,
    }
}

async fn seed(store: &SqliteStore, names: &[&str]) -> Vec<Routine> {
    let plank = exercise_id(store, "Plank").await;
    let mut created = Vec::new();
    for name in names {
        let draft = RoutineDraft {
            name: name.to_string(),
            day: None,
            exercises: vec![entry(plank, 3, 1, 60)],
        };
        created.push(ResourceStore::<Routine>::insert(store, draft).await.unwrap());
    }
    created
}

/// Wraps the SQLite store and refuses to delete one id.
struct GuardedStore {
    inner: SqliteStore,
    protected: String,
}

#[async_trait]
impl ResourceStore<Routine> for GuardedStore {
    async fn select(&self, filter: Filter) -> Result<Vec<Routine>, StoreError> {
        ResourceStore::<Routine>::select(&self.inner, filter).await
    }

    async fn insert(&self, draft: RoutineDraft) -> Result<Routine, StoreError> {
        ResourceStore::<Routine>::insert(&self.inner, draft).await
    }

    async fn update(&self, id: &str, draft: RoutineDraft) -> Result<Routine, StoreError> {
        ResourceStore::<Routine>::update(&self.inner, id, draft).await
    }

    async fn upsert(&self, id: &str, draft: RoutineDraft) -> Result<Routine, StoreError> {
        ResourceStore::<Routine>::upsert(&self.inner, id, draft).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        if id == self.protected {
            return Err(StoreError::remote("row is locked"));
        }
        ResourceStore::<Routine>::delete(&self.inner, id).await
    }
}

#[tokio::test]
async fn create_fetch_summarize_and_delete() {
    let (_dir, store) = open_store();
    let bench = exercise_id(&store, "Bench Press").await;
    let dip = exercise_id(&store, "Triceps Dip").await;

    let mut routines = Resource::<Routine>::new(Arc::new(store.clone()), TIMEOUT);
    let chest = routines
        .create(RoutineDraft {
            name: "Chest".to_string(),
            day: Some("Monday".to_string()),
            exercises: vec![entry(bench, 3, 10, 0), entry(dip, 2, 12, 0)],
        })
        .await
        .unwrap();
    routines
        .create(RoutineDraft {
            name: "Rest".to_string(),
            day: None,
            exercises: Vec::new(),
        })
        .await
        .unwrap();

    routines.fetch().await.unwrap();
    assert_eq!(routines.data().len(), 2);

    let loaded = routines.get(&chest.id).unwrap();
    let summary = summarize(loaded).unwrap();
    assert_eq!(summary.sets, 5);
    assert_eq!(summary.reps, 54);
    assert_eq!(summary.duration, 0);
    assert_eq!(summary.muscles, vec!["Chest", "Triceps", "Shoulders"]);

    let rest = routines.data().iter().find(|r| r.name == "Rest").unwrap();
    assert_eq!(rest.day_label(), "Unassigned");
    assert_eq!(summarize(rest).unwrap().sets, 0);

    let mut selection = Selection::new();
    selection.toggle_all(&routines.ids());
    assert!(selection.is_all_selected(&routines.ids()));

    let outcome = delete_selected(&mut selection, &mut routines).await.unwrap();
    assert!(outcome.is_complete());
    assert_eq!(outcome.deleted.len(), 2);
    assert!(routines.data().is_empty());
    assert!(selection.is_empty());
    assert_eq!(routines.error(), None);

    routines.fetch().await.unwrap();
    assert!(routines.data().is_empty());
}

#[tokio::test]
async fn failed_delete_keeps_row_and_selection() {
    let (_dir, store) = open_store();
    let created = seed(&store, &["A", "B", "C"]).await;
    let (a, c) = (created[0].id.clone(), created[2].id.clone());

    let guarded = GuardedStore {
        inner: store.clone(),
        protected: c.clone(),
    };
    let mut routines = Resource::<Routine>::new(Arc::new(guarded), TIMEOUT);
    routines.fetch().await.unwrap();

    let mut selection = Selection::new();
    selection.toggle(&a);
    selection.toggle(&c);

    let outcome = delete_selected(&mut selection, &mut routines).await.unwrap();
    assert_eq!(outcome.deleted, vec![a.clone()]);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].id, c);

    let names: Vec<&str> = routines.data().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["B", "C"]);
    assert_eq!(selection.ids(), vec![c.clone()]);
    assert_eq!(
        routines.error(),
        Some(format!("Could not delete 1 routine: {c} (row is locked)").as_str())
    );

    routines.fetch().await.unwrap();
    assert_eq!(routines.data().len(), 2);
}

#[tokio::test]
async fn report_for_refetched_collection_is_rejected() {
    let (_dir, store) = open_store();
    let created = seed(&store, &["A", "B"]).await;

    let mut routines = Resource::<Routine>::new(Arc::new(store.clone()), TIMEOUT);
    routines.fetch().await.unwrap();

    let mut selection = Selection::new();
    selection.toggle(&created[0].id);
    let plan = DeletePlan::new(&selection, &routines);
    let report = plan.execute(routines.store(), routines.timeout()).await;

    routines.fetch().await.unwrap();
    let err = report.apply(&mut routines, &mut selection).unwrap_err();
    assert_eq!(
        err,
        CoreError::StaleState {
            expected: 1,
            current: 2
        }
    );
    // The refetch already reflects the delete; the report changed nothing.
    assert_eq!(routines.data().len(), 1);
    assert!(selection.is_selected(&created[0].id));
}

#[tokio::test]
async fn update_replaces_exercise_list() {
    let (_dir, store) = open_store();
    let created = seed(&store, &["Core"]).await;
    let lunge = exercise_id(&store, "Lunge").await;

    let mut routines = Resource::<Routine>::new(Arc::new(store.clone()), TIMEOUT);
    routines.fetch().await.unwrap();
    let updated = routines
        .update(
            &created[0].id,
            RoutineDraft {
                name: "Legs".to_string(),
                day: Some("Friday".to_string()),
                exercises: vec![entry(lunge, 4, 12, 0)],
            },
        )
        .await
        .unwrap();

    assert_eq!(routines.data().len(), 1);
    assert_eq!(routines.data()[0], updated);
    let summary = summarize(&updated).unwrap();
    assert_eq!(summary.sets, 4);
    assert_eq!(summary.muscles, vec!["Quadriceps", "Glutes"]);

    let err = routines
        .update(
            "missing",
            RoutineDraft {
                name: "X".to_string(),
                day: None,
                exercises: Vec::new(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::remote("Routine not found"));
    assert_eq!(
        routines.error(),
        Some("Could not update routine: Routine not found")
    );
}
