//! # In-Memory Collaborator
//!
//! A backend living in the test process. Records are kept as JSON values,
//! the same shape the REST backend exchanges, so payload encoding and
//! entity decoding are exercised exactly as over HTTP.
//!
//! ## Failure Injection
//! ```text
//!   api.fail_next("warehouse has stock").await;
//!
//!   next call ──► Err(ApiError::Remote { status: 422, message })
//!   call after ──► normal behaviour
//!
//!   api.stall_next().await;
//!
//!   next call ──► never answers (for abandoned-request tests)
//! ```
//!
//! Every trait call (failed or not) increments [`MemoryApi::calls`], which
//! lets tests assert that a flow made no request at all.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

use crate::auth::{Credentials, Session};
use crate::client::{AuthApi, DashboardApi, EntityApi, StockApi};
use crate::error::{ApiError, ApiResult};
use stockflow_core::{
    Customer, DashboardSummary, Entity, EntityKind, Order, Product, Stock, StockSheet, Warehouse,
    DEFAULT_LOW_STOCK_THRESHOLD,
};

/// A failure armed for the next call.
#[derive(Debug, Clone)]
enum Injected {
    Remote { status: u16, message: String },
    Unauthorized,
    Garbage(String),
}

impl Injected {
    fn into_error(self) -> ApiError {
        match self {
            Injected::Remote { status, message } => ApiError::remote(status, message),
            Injected::Unauthorized => ApiError::Unauthorized,
            Injected::Garbage(detail) => ApiError::InvalidResponse(detail),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<EntityKind, Vec<Value>>,
    stock: HashMap<String, BTreeMap<String, i64>>,
    session: Option<Session>,
    credentials: Option<(String, String)>,
    require_login: bool,
    failure: Option<Injected>,
    stall: bool,
    calls: usize,
}

/// In-process backend for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryApi {
    state: Arc<Mutex<MemoryState>>,
}

fn id_of(value: &Value) -> Option<String> {
    let id = value.get("id")?;
    id.as_str()
        .map(str::to_string)
        .or_else(|| id.as_i64().map(|n| n.to_string()))
}

fn not_found(kind: EntityKind, id: &str) -> ApiError {
    ApiError::remote(404, format!("{} {} not found", kind, id))
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only `email`/`password` will be accepted by `login`.
    pub async fn with_credentials(self, email: &str, password: &str) -> Self {
        self.state.lock().await.credentials = Some((email.to_string(), password.to_string()));
        self
    }

    /// Every call except `login` answers 401 until someone logs in.
    pub async fn require_login(&self) {
        self.state.lock().await.require_login = true;
    }

    /// Replaces the collection of `T` with `items`.
    pub async fn seed<T: Entity>(&self, items: &[T]) -> ApiResult<()> {
        let values = items
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.state.lock().await.collections.insert(T::KIND, values);
        Ok(())
    }

    /// Replaces the stock rows of `warehouse_id`.
    pub async fn seed_stock(&self, warehouse_id: &str, rows: &[(&str, i64)]) {
        let quantities = rows.iter().map(|(p, q)| (p.to_string(), *q)).collect();
        self.state
            .lock()
            .await
            .stock
            .insert(warehouse_id.to_string(), quantities);
    }

    /// The next call fails with a remote rejection carrying `message`.
    pub async fn fail_next(&self, message: &str) {
        self.arm(Injected::Remote {
            status: 422,
            message: message.to_string(),
        })
        .await;
    }

    /// The next call fails with 401.
    pub async fn fail_next_unauthorized(&self) {
        self.arm(Injected::Unauthorized).await;
    }

    /// The next call fails with an unusable response.
    pub async fn fail_next_garbage(&self) {
        self.arm(Injected::Garbage("unexpected end of body".into())).await;
    }

    /// The next call never completes; the caller has to drop it.
    pub async fn stall_next(&self) {
        self.state.lock().await.stall = true;
    }

    async fn arm(&self, failure: Injected) {
        self.state.lock().await.failure = Some(failure);
    }

    /// Number of calls received so far.
    pub async fn calls(&self) -> usize {
        self.state.lock().await.calls
    }

    /// Current quantities of a warehouse.
    pub async fn stock_of(&self, warehouse_id: &str) -> BTreeMap<String, i64> {
        self.state
            .lock()
            .await
            .stock
            .get(warehouse_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Counts a call, then fires the armed failure or the login guard.
    async fn begin(&self) -> ApiResult<MutexGuard<'_, MemoryState>> {
        let mut state = self.state.lock().await;
        state.calls += 1;

        if std::mem::take(&mut state.stall) {
            drop(state);
            debug!("Stalling call");
            return std::future::pending().await;
        }
        if let Some(failure) = state.failure.take() {
            debug!(?failure, "Injected failure");
            return Err(failure.into_error());
        }
        if state.require_login && state.session.is_none() {
            return Err(ApiError::Unauthorized);
        }
        Ok(state)
    }
}

fn decode_all<T: Entity>(state: &MemoryState) -> ApiResult<Vec<T>> {
    state
        .collections
        .get(&T::KIND)
        .map(|values| {
            values
                .iter()
                .map(|v| serde_json::from_value(v.clone()))
                .collect::<Result<Vec<T>, _>>()
        })
        .unwrap_or_else(|| Ok(Vec::new()))
        .map_err(ApiError::from)
}

// =============================================================================
// Trait Implementations
// =============================================================================

#[async_trait]
impl<T: Entity> EntityApi<T> for MemoryApi {
    async fn list(&self) -> ApiResult<Vec<T>> {
        let state = self.begin().await?;
        decode_all(&state)
    }

    async fn create(&self, payload: &T::Payload) -> ApiResult<T> {
        let mut state = self.begin().await?;

        let mut record = serde_json::to_value(payload)?;
        let fields = record
            .as_object_mut()
            .ok_or_else(|| ApiError::InvalidResponse("payload is not an object".into()))?;
        fields.insert("id".into(), Value::String(Uuid::new_v4().to_string()));

        let created: T = serde_json::from_value(record)?;
        let stored = serde_json::to_value(&created)?;
        state.collections.entry(T::KIND).or_default().push(stored);
        Ok(created)
    }

    async fn update(&self, id: &str, payload: &T::Payload) -> ApiResult<T> {
        let mut state = self.begin().await?;

        let patch = serde_json::to_value(payload)?;
        let records = state.collections.entry(T::KIND).or_default();
        let record = records
            .iter_mut()
            .find(|v| id_of(v).as_deref() == Some(id))
            .ok_or_else(|| not_found(T::KIND, id))?;

        let mut merged = record.clone();
        if let (Some(target), Value::Object(changes)) = (merged.as_object_mut(), patch) {
            target.extend(changes);
        }

        let updated: T = serde_json::from_value(merged)?;
        *record = serde_json::to_value(&updated)?;
        Ok(updated)
    }

    async fn remove(&self, id: &str) -> ApiResult<()> {
        let mut state = self.begin().await?;

        let records = state.collections.entry(T::KIND).or_default();
        let before = records.len();
        records.retain(|v| id_of(v).as_deref() != Some(id));
        if records.len() == before {
            return Err(not_found(T::KIND, id));
        }
        Ok(())
    }
}

#[async_trait]
impl StockApi for MemoryApi {
    async fn warehouse_stock(&self, warehouse_id: &str) -> ApiResult<Vec<Stock>> {
        let state = self.begin().await?;

        let mut sheet = StockSheet::new(warehouse_id);
        if let Some(quantities) = state.stock.get(warehouse_id) {
            sheet.quantities = quantities.clone();
        }
        Ok(sheet.to_stocks())
    }

    async fn save_stock(&self, sheet: &StockSheet) -> ApiResult<Vec<Stock>> {
        let mut state = self.begin().await?;
        state
            .stock
            .insert(sheet.warehouse_id.clone(), sheet.quantities.clone());
        Ok(sheet.to_stocks())
    }
}

#[async_trait]
impl DashboardApi for MemoryApi {
    async fn dashboard(&self) -> ApiResult<DashboardSummary> {
        let state = self.begin().await?;
        Ok(DashboardSummary::compute(
            &decode_all::<Customer>(&state)?,
            &decode_all::<Product>(&state)?,
            &decode_all::<Order>(&state)?,
            &decode_all::<Warehouse>(&state)?,
            DEFAULT_LOW_STOCK_THRESHOLD,
        ))
    }
}

#[async_trait]
impl AuthApi for MemoryApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
        let mut state = self.state.lock().await;
        state.calls += 1;

        if std::mem::take(&mut state.stall) {
            drop(state);
            debug!("Stalling call");
            return std::future::pending().await;
        }
        if let Some(failure) = state.failure.take() {
            return Err(failure.into_error());
        }
        if let Some((email, password)) = &state.credentials {
            if *email != credentials.email || *password != credentials.password {
                return Err(ApiError::Unauthorized);
            }
        }

        let session = Session::new(format!("memory-{}", Uuid::new_v4()), None);
        state.session = Some(session.clone());
        Ok(session)
    }

    async fn logout(&self) -> ApiResult<()> {
        let mut state = self.state.lock().await;
        state.calls += 1;
        state.session = None;
        Ok(())
    }

    async fn is_authenticated(&self) -> bool {
        self.state.lock().await.session.is_some()
    }
}
