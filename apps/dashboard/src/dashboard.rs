//! # Dashboard Lifecycle
//!
//! A `Dashboard` exists from start-up to logout: it owns the backend handle
//! and the stores, and hands out workflows over them.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Dashboard Lifecycle                               │
//! │                                                                         │
//! │  Dashboard::new(api, settings)                                         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  login(credentials) ───► token kept by the backend handle              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  load_all() ───────────► customers, products, orders, warehouses       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  customers() / products() / ... ──► Workflow<T> over the shared store  │
//! │  stock_editor(w) ─────────────────► StockEditor                        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  logout() ─────────────► token dropped, every store cleared            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{Action, WorkflowError, WorkflowResult};
use crate::state::AppStore;
use crate::workflow::{StockEditor, Workflow};
use stockflow_api::config::DashboardSettings;
use stockflow_api::{ApiResult, Backend, ClientConfig, Credentials, HttpApi, Session};
use stockflow_core::{Customer, DashboardSummary, EntityKind, Order, Product, Warehouse};

pub struct Dashboard<B: Backend + 'static> {
    api: Arc<B>,
    store: AppStore,
    settings: DashboardSettings,
}

impl Dashboard<HttpApi> {
    /// Dashboard talking to the REST backend of `config`.
    pub fn connect(config: &ClientConfig) -> ApiResult<Self> {
        let api = HttpApi::new(config)?;
        info!(base_url = %api.base_url(), "Backend configured");
        Ok(Dashboard::new(Arc::new(api), config.dashboard.clone()))
    }
}

impl<B: Backend + 'static> Dashboard<B> {
    pub fn new(api: Arc<B>, settings: DashboardSettings) -> Self {
        let store = AppStore::new(api.clone());
        Dashboard {
            api,
            store,
            settings,
        }
    }

    pub fn api(&self) -> &Arc<B> {
        &self.api
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub async fn login(&self, credentials: &Credentials) -> WorkflowResult<Session> {
        let session = self
            .api
            .login(credentials)
            .await
            .map_err(|e| WorkflowError::from_api(&e, Action::Login))?;
        debug!(email = %credentials.email, "Session started");
        Ok(session)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.api.is_authenticated().await
    }

    /// Ends the session and forgets every loaded record.
    ///
    /// A failed logout call is only logged; the local state is cleared
    /// either way.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            debug!(error = %e, "Logout call failed");
        }
        self.store.clear().await;
        debug!("Stores cleared");
    }

    // =========================================================================
    // Pages
    // =========================================================================

    /// Fetches every list; returns the kinds that failed.
    pub async fn load_all(&self) -> Vec<EntityKind> {
        self.store.load_all().await
    }

    pub fn customers(&self) -> Workflow<Customer> {
        Workflow::new(self.store.customers.clone())
    }

    pub fn products(&self) -> Workflow<Product> {
        Workflow::new(self.store.products.clone())
    }

    pub fn orders(&self) -> Workflow<Order> {
        Workflow::new(self.store.orders.clone())
    }

    pub fn warehouses(&self) -> Workflow<Warehouse> {
        Workflow::new(self.store.warehouses.clone())
    }

    /// Stock form of `warehouse_id` over the products currently loaded.
    pub async fn stock_editor(&self, warehouse_id: &str) -> WorkflowResult<StockEditor> {
        let products = self.store.products.items().await;
        StockEditor::open(self.store.stock.clone(), warehouse_id, &products).await
    }

    /// Summary of the lists held locally.
    pub async fn summary(&self) -> DashboardSummary {
        self.store.summary(self.settings.low_stock_threshold).await
    }

    /// Summary as computed by the backend.
    pub async fn remote_summary(&self) -> WorkflowResult<DashboardSummary> {
        self.api
            .dashboard()
            .await
            .map_err(|e| WorkflowError::from_api(&e, Action::Load))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LOGIN_FAILED;
    use stockflow_api::MemoryApi;
    use stockflow_core::WarehouseDraft;

    async fn dashboard() -> Dashboard<MemoryApi> {
        let api = MemoryApi::new().with_credentials("admin@stockflow.io", "secret").await;
        api.require_login().await;
        Dashboard::new(Arc::new(api), DashboardSettings::default())
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let dash = dashboard().await;
        let err = dash
            .login(&Credentials::new("admin@stockflow.io", "nope"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), LOGIN_FAILED);
        assert!(!dash.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_login_leaves_info_logging_to_the_backend() {
        let (recorder, _guard) = crate::log_capture::Recorder::install();
        let dash = dashboard().await;
        dash.login(&Credentials::new("admin@stockflow.io", "secret"))
            .await
            .unwrap();
        dash.logout().await;

        assert!(recorder.own_at_least(tracing::Level::INFO).is_empty());
        assert_eq!(recorder.count("Session started"), 1);
    }

    #[tokio::test]
    async fn test_login_load_logout() {
        let dash = dashboard().await;
        dash.login(&Credentials::new("admin@stockflow.io", "secret"))
            .await
            .unwrap();
        assert!(dash.load_all().await.is_empty());

        let mut warehouses = dash.warehouses();
        warehouses.start_add().unwrap();
        warehouses
            .edit_draft(|d: &mut WarehouseDraft| {
                d.name = "Main".into();
                d.address = "Via Roma 1".into();
            })
            .unwrap();
        warehouses.save().await.unwrap();
        assert_eq!(dash.summary().await.warehouses, 1);
        assert_eq!(dash.remote_summary().await.unwrap().warehouses, 1);

        dash.logout().await;
        assert!(!dash.is_authenticated().await);
        assert!(dash.store().warehouses.items().await.is_empty());
    }

    #[tokio::test]
    async fn test_expired_session_message() {
        let dash = dashboard().await;
        let mut customers = dash.customers();
        let err = customers.load().await.unwrap_err();
        assert_eq!(err.to_string(), crate::error::SESSION_EXPIRED);
    }
}
