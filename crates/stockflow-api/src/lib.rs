//! # stockflow-api: Backend Collaborator for Stockflow
//!
//! This crate is the only place that talks to the REST backend. The rest of
//! the workspace sees the backend through the traits in [`client`].
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Collaborator Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │               EntityStore / StockStore (dashboard)               │  │
//! │  │        hold Arc<dyn EntityApi<T>> and Arc<dyn StockApi>          │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┴─────────────────────┐                  │
//! │         ▼                                           ▼                   │
//! │  ┌────────────────┐                        ┌────────────────────────┐  │
//! │  │    HttpApi     │                        │      MemoryApi         │  │
//! │  │                │                        │  (feature "testing")   │  │
//! │  │ reqwest client │                        │                        │  │
//! │  │ bearer session │                        │ JSON records in memory │  │
//! │  │ error payloads │                        │ one-shot failures      │  │
//! │  └───────┬────────┘                        └────────────────────────┘  │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   REST backend: /customers /products /orders /warehouses               │
//! │                 /warehouses/{id}/stock /dashboard /auth/*              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`client`] - Collaborator traits (`EntityApi<T>`, `StockApi`, ...)
//! - [`http`] - `HttpApi`, the reqwest implementation
//! - [`auth`] - Credentials and the shared bearer session
//! - [`config`] - `ClientConfig` (TOML file + environment)
//! - [`error`] - `ApiError` and `ConfigError`
//! - `memory` - `MemoryApi` for tests (feature `testing`)
//!
//! ## Usage
//! ```rust,no_run
//! use stockflow_api::{AuthApi, ClientConfig, Credentials, EntityApi, HttpApi};
//! use stockflow_core::Customer;
//!
//! # async fn run() -> stockflow_api::ApiResult<()> {
//! let config = ClientConfig::load_or_default(None);
//! let api = HttpApi::new(&config)?;
//!
//! api.login(&Credentials::new("admin@example.com", "secret")).await?;
//! let customers: Vec<Customer> = api.list().await?;
//! println!("{} customers", customers.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;

#[cfg(any(test, feature = "testing"))]
pub mod memory;

pub use auth::{Credentials, Session, SessionStore, SessionUser};
pub use client::{AuthApi, Backend, DashboardApi, EntityApi, StockApi};
pub use config::{ClientConfig, UpdateMethod};
pub use error::{ApiError, ApiResult, ConfigError};
pub use http::HttpApi;

#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryApi;
