//! Generic CRUD resource shared by every entity the application manages.
//!
//! A [`Resource`] owns the last fetched collection together with its
//! `loading` / `error` flags and forwards mutations to a [`ResourceStore`].
//! Routines and the user profile are both instances of the same type, so the
//! loading/error bookkeeping lives in exactly one place.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::StoreError;

/// Something the store can hand back and the UI can key rows by.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Payload accepted by insert/update.
    type Draft: Clone + Send + Sync + 'static;
    /// Human-facing name used in messages and logs.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// Row filter for [`ResourceStore::select`]. Which relations get joined is
/// fixed per entity: routines always come back with exercises and muscles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    Id(String),
}

/// Query/mutation client for one entity type.
#[async_trait]
pub trait ResourceStore<T: Entity>: Send + Sync {
    async fn select(&self, filter: Filter) -> Result<Vec<T>, StoreError>;
    async fn insert(&self, draft: T::Draft) -> Result<T, StoreError>;
    async fn update(&self, id: &str, draft: T::Draft) -> Result<T, StoreError>;
    async fn upsert(&self, id: &str, draft: T::Draft) -> Result<T, StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Bound the wait for a store request by `limit`.
///
/// On timeout the request future is dropped, which only stops waiting. A store
/// that hands work to another thread, like `SqliteStore`, may still finish the
/// write afterwards, so a `Timeout` means the outcome is unknown.
pub async fn with_timeout<F, R>(limit: Duration, request: F) -> Result<R, StoreError>
where
    F: Future<Output = Result<R, StoreError>>,
{
    match tokio::time::timeout(limit, request).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

pub struct Resource<T: Entity> {
    store: Arc<dyn ResourceStore<T>>,
    timeout: Duration,
    loading: bool,
    error: Option<String>,
    data: Vec<T>,
    /// Bumped every time a fetch replaces `data`.
    generation: u64,
}

impl<T: Entity> Resource<T> {
    pub fn new(store: Arc<dyn ResourceStore<T>>, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            loading: false,
            error: None,
            data: Vec::new(),
            generation: 0,
        }
    }

    pub fn store(&self) -> Arc<dyn ResourceStore<T>> {
        Arc::clone(&self.store)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.data.iter().find(|item| item.id() == id)
    }

    /// Ids of the current collection in display order.
    pub fn ids(&self) -> Vec<String> {
        self.data.iter().map(|item| item.id().to_string()).collect()
    }

    /// Load every row, replacing the collection wholesale.
    pub async fn fetch(&mut self) -> Result<(), StoreError> {
        self.begin();
        let result = with_timeout(self.timeout, self.store.select(Filter::All)).await;
        self.loading = false;

        match result {
            Ok(items) => {
                self.replace(items);
                debug!(
                    kind = T::KIND,
                    count = self.data.len(),
                    generation = self.generation,
                    "fetched collection"
                );
                Ok(())
            }
            Err(err) => Err(self.fail("load", err)),
        }
    }

    /// Load a single row by id. The collection becomes that row, or empty when
    /// the store has no such id.
    pub async fn fetch_by_id(&mut self, id: &str) -> Result<Option<T>, StoreError> {
        self.begin();
        let request = self.store.select(Filter::Id(id.to_string()));
        let result = with_timeout(self.timeout, request).await;
        self.loading = false;

        match result {
            Ok(items) => {
                let found = items.into_iter().find(|item| item.id() == id);
                self.replace(found.iter().cloned().collect());
                debug!(kind = T::KIND, id, found = found.is_some(), "fetched single row");
                Ok(found)
            }
            Err(err) => Err(self.fail("load", err)),
        }
    }

    pub async fn create(&mut self, draft: T::Draft) -> Result<T, StoreError> {
        self.begin();
        let result = with_timeout(self.timeout, self.store.insert(draft)).await;
        self.loading = false;

        match result {
            Ok(item) => {
                debug!(kind = T::KIND, id = item.id(), "created row");
                self.data.push(item.clone());
                Ok(item)
            }
            Err(err) => Err(self.fail("create", err)),
        }
    }

    pub async fn update(&mut self, id: &str, draft: T::Draft) -> Result<T, StoreError> {
        self.begin();
        let result = with_timeout(self.timeout, self.store.update(id, draft)).await;
        self.loading = false;

        match result {
            Ok(item) => {
                debug!(kind = T::KIND, id, "updated row");
                self.put(item.clone());
                Ok(item)
            }
            Err(err) => Err(self.fail("update", err)),
        }
    }

    pub async fn upsert(&mut self, id: &str, draft: T::Draft) -> Result<T, StoreError> {
        self.begin();
        let result = with_timeout(self.timeout, self.store.upsert(id, draft)).await;
        self.loading = false;

        match result {
            Ok(item) => {
                debug!(kind = T::KIND, id, "upserted row");
                self.put(item.clone());
                Ok(item)
            }
            Err(err) => Err(self.fail("save", err)),
        }
    }

    /// Delete one row. Only that id leaves the collection, and only on success.
    pub async fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.begin();
        let result = with_timeout(self.timeout, self.store.delete(id)).await;
        self.loading = false;

        match result {
            Ok(()) => {
                debug!(kind = T::KIND, id, "deleted row");
                self.data.retain(|item| item.id() != id);
                Ok(())
            }
            Err(err) => Err(self.fail("delete", err)),
        }
    }

    /// Drop the given ids from the local collection without a round trip.
    pub(crate) fn remove_local(&mut self, ids: &[String]) {
        self.data.retain(|item| !ids.iter().any(|id| id == item.id()));
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn replace(&mut self, items: Vec<T>) {
        self.data = items;
        self.generation += 1;
    }

    fn put(&mut self, item: T) {
        match self.data.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => *existing = item,
            None => self.data.push(item),
        }
    }

    fn fail(&mut self, action: &str, err: StoreError) -> StoreError {
        warn!(kind = T::KIND, action, error = %err, "store request failed");
        self.error = Some(format!(
            "Could not {action} {}: {err}",
            T::KIND.to_lowercase()
        ));
        err
    }
}
