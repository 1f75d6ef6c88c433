//! Async adapter that lets the rest of the application treat the embedded
//! SQLite database like any other remote store. Each call runs on tokio's
//! blocking pool and reports failures as [`StoreError`].

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rusqlite::Connection;
use tracing::{debug, warn};

use super::connection::open_database;
use super::exercises::fetch_exercise_catalog;
use super::profiles::{
    create_profile, delete_profile, fetch_profile, fetch_profiles, update_profile, upsert_profile,
};
use super::routines::{
    create_routine, delete_routine, fetch_routine, fetch_routines, update_routine, upsert_routine,
};
use crate::error::StoreError;
use crate::models::{Exercise, ProfileDraft, Routine, RoutineDraft, UserProfile};
use crate::resource::{Filter, ResourceStore};

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open the database file, creating schema and seed data when needed.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_connection(open_database(path)?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Catalogue exercises for the routine form's picker.
    pub async fn exercise_catalog(&self) -> Result<Vec<Exercise>, StoreError> {
        self.run("exercise catalogue", fetch_exercise_catalog).await
    }

    /// Run `work` on the blocking pool. Once started it runs to completion
    /// even if the caller stops waiting.
    async fn run<R, F>(&self, operation: &'static str, work: F) -> Result<R, StoreError>
    where
        R: Send + 'static,
        F: FnOnce(&Connection) -> Result<R> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let joined = tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| anyhow!("database connection is poisoned"))?;
            work(&*conn)
        })
        .await;

        match joined {
            Ok(Ok(value)) => {
                debug!(operation, "sqlite operation finished");
                Ok(value)
            }
            Ok(Err(err)) => {
                warn!(operation, error = %format!("{err:#}"), "sqlite operation failed");
                Err(StoreError::from_chain(&err))
            }
            Err(join_err) if join_err.is_cancelled() => Err(StoreError::Cancelled),
            Err(join_err) => Err(StoreError::remote(format!(
                "database worker failed: {join_err}"
            ))),
        }
    }
}

#[async_trait]
impl ResourceStore<Routine> for SqliteStore {
    async fn select(&self, filter: Filter) -> Result<Vec<Routine>, StoreError> {
        self.run("select routines", move |conn| match filter {
            Filter::All => fetch_routines(conn),
            Filter::Id(id) => Ok(fetch_routine(conn, &id)?.into_iter().collect()),
        })
        .await
    }

    async fn insert(&self, draft: RoutineDraft) -> Result<Routine, StoreError> {
        self.run("insert routine", move |conn| create_routine(conn, &draft))
            .await
    }

    async fn update(&self, id: &str, draft: RoutineDraft) -> Result<Routine, StoreError> {
        let id = id.to_string();
        self.run("update routine", move |conn| update_routine(conn, &id, &draft))
            .await
    }

    async fn upsert(&self, id: &str, draft: RoutineDraft) -> Result<Routine, StoreError> {
        let id = id.to_string();
        self.run("upsert routine", move |conn| upsert_routine(conn, &id, &draft))
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        self.run("delete routine", move |conn| delete_routine(conn, &id))
            .await
    }
}

#[async_trait]
impl ResourceStore<UserProfile> for SqliteStore {
    async fn select(&self, filter: Filter) -> Result<Vec<UserProfile>, StoreError> {
        self.run("select profiles", move |conn| match filter {
            Filter::All => fetch_profiles(conn),
            Filter::Id(id) => Ok(fetch_profile(conn, &id)?.into_iter().collect()),
        })
        .await
    }

    async fn insert(&self, draft: ProfileDraft) -> Result<UserProfile, StoreError> {
        self.run("insert profile", move |conn| create_profile(conn, &draft))
            .await
    }

    async fn update(&self, id: &str, draft: ProfileDraft) -> Result<UserProfile, StoreError> {
        let id = id.to_string();
        self.run("update profile", move |conn| update_profile(conn, &id, &draft))
            .await
    }

    async fn upsert(&self, id: &str, draft: ProfileDraft) -> Result<UserProfile, StoreError> {
        let id = id.to_string();
        self.run("upsert profile", move |conn| upsert_profile(conn, &id, &draft))
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        self.run("delete profile", move |conn| delete_profile(conn, &id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, SqliteStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&dir.path().join("routines.sqlite")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn missing_routine_delete_is_a_remote_failure() {
        let (_dir, store) = store();
        let err = ResourceStore::<Routine>::delete(&store, "nope").await.unwrap_err();
        assert_eq!(err, StoreError::remote("Routine not found"));
    }

    #[tokio::test]
    async fn catalogue_is_seeded_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("routines.sqlite");

        let first = SqliteStore::open(&path).unwrap().exercise_catalog().await.unwrap();
        let second = SqliteStore::open(&path).unwrap().exercise_catalog().await.unwrap();

        assert!(!first.is_empty());
        assert_eq!(first.len(), second.len());
        let plank = first.iter().find(|exercise| exercise.name == "Plank").unwrap();
        assert_eq!(plank.muscles.len(), 1);
        assert_eq!(plank.muscles[0].name, "Core");
    }

    #[tokio::test]
    async fn profile_select_by_id_returns_at_most_one() {
        let (_dir, store) = store();
        let draft = ProfileDraft {
            username: "alex".to_string(),
            avatar: String::new(),
        };
        ResourceStore::<UserProfile>::upsert(&store, "local", draft)
            .await
            .unwrap();

        let found = ResourceStore::<UserProfile>::select(&store, Filter::Id("local".into()))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "alex");

        let missing = ResourceStore::<UserProfile>::select(&store, Filter::Id("other".into()))
            .await
            .unwrap();
        assert!(missing.is_empty());
    }
}
