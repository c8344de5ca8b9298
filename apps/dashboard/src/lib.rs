//! # Stockflow Dashboard Library
//!
//! Client-side core of the inventory dashboard: stores that mirror the
//! backend collections and the controllers behind each page.
//!
//! ## Module Organization
//! ```text
//! stockflow_dashboard/
//! ├── lib.rs            ◄─── You are here (run & logging)
//! ├── dashboard.rs      ◄─── Dashboard lifecycle (login → pages → logout)
//! ├── state/
//! │   ├── mod.rs        ◄─── AppStore (one store per entity)
//! │   ├── entity.rs     ◄─── EntityStore<T>, EntitySlice<T>
//! │   └── stock.rs      ◄─── StockStore
//! ├── workflow/
//! │   ├── mod.rs        ◄─── Workflow exports
//! │   ├── controller.rs ◄─── Workflow<T>: list, search, dialogs
//! │   └── stock_editor.rs ◄─ StockEditor: per-warehouse quantities
//! └── error.rs          ◄─── WorkflowError and user messages
//! ```
//!
//! ## One Flow for Every Entity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   draft ──► Entity::validate(draft, store snapshot, editing id)        │
//! │                │ invalid: inline errors, nothing sent                   │
//! │                ▼                                                        │
//! │             Entity::payload(draft)                                      │
//! │                │                                                        │
//! │                ▼                                                        │
//! │             EntityStore::create / update ──► EntityApi<T> ──► backend   │
//! │                │ failure: dialog stays open, list untouched             │
//! │                ▼                                                        │
//! │             list updated, dialog closed                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod dashboard;
pub mod error;
pub mod state;
pub mod workflow;

#[cfg(test)]
pub(crate) mod log_capture;

use std::error::Error;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub use dashboard::Dashboard;
pub use error::{Failure, WorkflowError, WorkflowResult};
pub use state::{AppStore, EntitySlice, EntityStore, StockSlice, StockStore};
pub use workflow::{Dialog, Phase, StockEditor, StockRow, Workflow};

use stockflow_api::{ClientConfig, Credentials};

/// Runs the dashboard headless against the configured backend.
///
/// ## Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Connect ─────────► HttpApi from [api] settings                     │
/// │  2. Login ───────────► [auth] credentials, skipped when absent         │
/// │  3. Load ────────────► every list, failures logged per kind            │
/// │  4. Report ──────────► local summary (+ backend summary when offered)  │
/// │  5. Logout ──────────► token dropped, stores cleared                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(config: ClientConfig) -> Result<(), Box<dyn Error>> {
    info!("Starting Stockflow dashboard");

    let dashboard = Dashboard::connect(&config)?;

    match config.credentials() {
        Some((email, password)) => {
            dashboard.login(&Credentials::new(email, password)).await?;
        }
        None => warn!("No credentials configured, continuing without login"),
    }

    let failed = dashboard.load_all().await;
    if !failed.is_empty() {
        warn!(?failed, "Summary is based on partial data");
    }

    let summary = dashboard.summary().await;
    info!(
        customers = summary.customers,
        products = summary.products,
        orders = summary.orders,
        warehouses = summary.warehouses,
        open_orders = summary.open_orders,
        revenue = %summary.revenue,
        units_in_stock = summary.units_in_stock,
        low_stock = summary.low_stock.len(),
        "Dashboard summary"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    match dashboard.remote_summary().await {
        Ok(remote) => info!(revenue = %remote.revenue, "Backend summary"),
        Err(e) => warn!(error = %e, "Backend summary unavailable"),
    }

    dashboard.logout().await;
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG` wins when set (e.g. `RUST_LOG=stockflow_api=trace`)
/// - otherwise `default_filter`, from `[dashboard] log_filter`
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be installed (tests, embedding apps).
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
