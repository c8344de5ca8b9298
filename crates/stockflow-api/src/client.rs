//! # Collaborator Traits
//!
//! What the dashboard needs from the backend, independent of transport.
//!
//! ```text
//!            ┌──────────────────────────── Backend ────────────────────────────┐
//!            │                                                                 │
//!   EntityApi<Customer>  EntityApi<Product>  EntityApi<Order>  EntityApi<Warehouse>
//!            │              StockApi         AuthApi          DashboardApi     │
//!            └────────────────────────────────┬────────────────────────────────┘
//!                                             │ implemented by
//!                              ┌──────────────┴──────────────┐
//!                           HttpApi                     MemoryApi (tests)
//! ```
//!
//! Traits are object safe (`async_trait`) so stores hold
//! `Arc<dyn EntityApi<T>>` and tests swap in the in-memory backend.

use async_trait::async_trait;

use crate::auth::{Credentials, Session};
use crate::error::ApiResult;
use stockflow_core::{Customer, DashboardSummary, Entity, Order, Product, Stock, StockSheet, Warehouse};

/// List/create/update/delete of one entity collection.
#[async_trait]
pub trait EntityApi<T: Entity>: Send + Sync {
    /// The whole collection, in backend order.
    async fn list(&self) -> ApiResult<Vec<T>>;

    /// Creates a record and returns the backend's canonical copy.
    async fn create(&self, payload: &T::Payload) -> ApiResult<T>;

    /// Updates record `id` and returns the backend's canonical copy.
    async fn update(&self, id: &str, payload: &T::Payload) -> ApiResult<T>;

    async fn remove(&self, id: &str) -> ApiResult<()>;
}

/// Stock rows of a warehouse.
#[async_trait]
pub trait StockApi: Send + Sync {
    async fn warehouse_stock(&self, warehouse_id: &str) -> ApiResult<Vec<Stock>>;

    /// Replaces the quantities of `sheet.warehouse_id` in one request and
    /// returns the stored rows.
    async fn save_stock(&self, sheet: &StockSheet) -> ApiResult<Vec<Stock>>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> ApiResult<Session>;

    /// Ends the session. The local token is dropped even when the backend
    /// call fails.
    async fn logout(&self) -> ApiResult<()>;

    async fn is_authenticated(&self) -> bool;
}

#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Aggregates computed by the backend.
    async fn dashboard(&self) -> ApiResult<DashboardSummary>;
}

/// Everything the dashboard talks to.
pub trait Backend:
    EntityApi<Customer>
    + EntityApi<Product>
    + EntityApi<Order>
    + EntityApi<Warehouse>
    + StockApi
    + AuthApi
    + DashboardApi
{
}

impl<B> Backend for B where
    B: EntityApi<Customer>
        + EntityApi<Product>
        + EntityApi<Order>
        + EntityApi<Warehouse>
        + StockApi
        + AuthApi
        + DashboardApi
{
}
