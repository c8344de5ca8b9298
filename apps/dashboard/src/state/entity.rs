//! # Entity Store
//!
//! Holds the current list of one entity type and keeps it in step with the
//! backend.
//!
//! ## Store Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Entity Store Operations                              │
//! │                                                                         │
//! │  Operation               Collaborator            Slice Change           │
//! │  ─────────               ────────────            ────────────           │
//! │                                                                         │
//! │  fetch_all() ──────────► GET collection ───────► items = response      │
//! │                          (failure) ────────────► error set, items kept  │
//! │                                                                         │
//! │  create(payload) ──────► POST collection ──────► items.push(created)   │
//! │                                                                         │
//! │  update(id, payload) ──► PATCH/PUT item ───────► items[i] = updated    │
//! │                                                                         │
//! │  remove(id) ───────────► DELETE item ──────────► items.retain(≠ id)    │
//! │                                                                         │
//! │  Mutation failures leave the slice untouched and go to the caller.     │
//! │  NOTE: the lock is never held while a request is in flight, and a      │
//! │  dropped fetch_all() leaves `loading` false.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::InFlight;
use crate::error::{Action, WorkflowError};
use stockflow_api::{ApiResult, EntityApi};
use stockflow_core::Entity;

/// The list of one entity type plus its loading/error flags.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySlice<T> {
    pub items: Vec<T>,
    pub loading: bool,
    /// Message of the last failed fetch, cleared by the next success.
    pub error: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl<T> Default for EntitySlice<T> {
    fn default() -> Self {
        EntitySlice {
            items: Vec::new(),
            loading: false,
            error: None,
            loaded_at: None,
        }
    }
}

/// Store of one entity type.
///
/// Clones share the same slice.
pub struct EntityStore<T: Entity> {
    api: Arc<dyn EntityApi<T>>,
    slice: Arc<RwLock<EntitySlice<T>>>,
}

impl<T: Entity> Clone for EntityStore<T> {
    fn clone(&self) -> Self {
        EntityStore {
            api: Arc::clone(&self.api),
            slice: Arc::clone(&self.slice),
        }
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new(api: Arc<dyn EntityApi<T>>) -> Self {
        EntityStore {
            api,
            slice: Arc::new(RwLock::new(EntitySlice::default())),
        }
    }

    /// Replaces the list with the backend's collection.
    ///
    /// On failure the previous list stays and `error` is set.
    pub async fn fetch_all(&self) -> ApiResult<Vec<T>> {
        self.slice.write().await.loading = true;
        let in_flight = InFlight::new(&self.slice, |slice: &mut EntitySlice<T>| slice.loading = false);

        let result = self.api.list().await;

        let mut slice = self.slice.write().await;
        in_flight.finish();
        slice.loading = false;
        match result {
            Ok(items) => {
                debug!(entity = %T::KIND, count = items.len(), "List replaced");
                slice.items = items.clone();
                slice.error = None;
                slice.loaded_at = Some(Utc::now());
                Ok(items)
            }
            Err(e) => {
                slice.error = Some(WorkflowError::from_api(&e, Action::Load).to_string());
                Err(e)
            }
        }
    }

    /// Creates a record and appends the backend's copy to the list.
    pub async fn create(&self, payload: &T::Payload) -> ApiResult<T> {
        let created = self.api.create(payload).await?;

        let mut slice = self.slice.write().await;
        // A fetch that finished meanwhile may already list the new record.
        slice.items.retain(|item| item.id() != created.id());
        slice.items.push(created.clone());
        Ok(created)
    }

    /// Updates a record and replaces its entry in the list.
    pub async fn update(&self, id: &str, payload: &T::Payload) -> ApiResult<T> {
        let updated = self.api.update(id, payload).await?;

        let mut slice = self.slice.write().await;
        match slice.items.iter_mut().find(|item| item.id() == id) {
            Some(entry) => *entry = updated.clone(),
            None => warn!(entity = %T::KIND, id = %id, "Updated record was not in the list"),
        }
        Ok(updated)
    }

    /// Deletes a record and drops it from the list.
    pub async fn remove(&self, id: &str) -> ApiResult<()> {
        self.api.remove(id).await?;

        self.slice.write().await.items.retain(|item| item.id() != id);
        Ok(())
    }

    pub async fn snapshot(&self) -> EntitySlice<T> {
        self.slice.read().await.clone()
    }

    pub async fn items(&self) -> Vec<T> {
        self.slice.read().await.items.clone()
    }

    pub async fn find(&self, id: &str) -> Option<T> {
        self.slice
            .read()
            .await
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    /// Forgets everything (logout).
    pub async fn clear(&self) {
        *self.slice.write().await = EntitySlice::default();
    }
}
