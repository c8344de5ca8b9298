//! # State Module
//!
//! Client-side state of the dashboard.
//!
//! One store per entity type instead of a single state struct: every
//! workflow holds only the store it edits.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                         AppStore                                │   │
//! │  │  AppStore::new(Arc<B: Backend>)                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │      ┌──────────────┬────────┴─────┬──────────────┬──────────────┐     │
//! │      ▼              ▼              ▼              ▼              ▼      │
//! │  ┌─────────┐  ┌──────────┐  ┌─────────┐  ┌────────────┐  ┌─────────┐  │
//! │  │customers│  │ products │  │ orders  │  │ warehouses │  │  stock  │  │
//! │  │ Entity- │  │ Entity-  │  │ Entity- │  │ Entity-    │  │ Stock-  │  │
//! │  │ Store   │  │ Store    │  │ Store   │  │ Store      │  │ Store   │  │
//! │  └─────────┘  └──────────┘  └─────────┘  └────────────┘  └─────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Every slice lives behind Arc<tokio::sync::RwLock<_>>                │
//! │  • Guards are dropped before any request is awaited                    │
//! │  • An abandoned request clears its loading/saving flag (InFlight)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod entity;
mod stock;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub use entity::{EntitySlice, EntityStore};
pub use stock::{StockSlice, StockStore};

use stockflow_api::Backend;
use stockflow_core::{
    summary, Customer, DashboardSummary, EntityKind, Order, Product, Warehouse,
};

/// Clears a busy flag of a shared slice if the request future is dropped
/// before [`InFlight::finish`].
pub(crate) struct InFlight<S: Send + Sync + 'static> {
    slice: Arc<RwLock<S>>,
    reset: fn(&mut S),
    armed: bool,
}

impl<S: Send + Sync + 'static> InFlight<S> {
    pub(crate) fn new(slice: &Arc<RwLock<S>>, reset: fn(&mut S)) -> Self {
        InFlight {
            slice: Arc::clone(slice),
            reset,
            armed: true,
        }
    }

    /// The request answered; the caller writes the outcome itself.
    pub(crate) fn finish(mut self) {
        self.armed = false;
    }
}

impl<S: Send + Sync + 'static> Drop for InFlight<S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        debug!("Request abandoned, clearing busy flag");
        match self.slice.try_write() {
            Ok(mut slice) => (self.reset)(&mut *slice),
            Err(_) => {
                // Someone holds the lock right now: reset once it is free.
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    let slice = Arc::clone(&self.slice);
                    let reset = self.reset;
                    handle.spawn(async move { reset(&mut *slice.write().await) });
                }
            }
        }
    }
}

/// Every store of a logged-in dashboard.
#[derive(Clone)]
pub struct AppStore {
    pub customers: EntityStore<Customer>,
    pub products: EntityStore<Product>,
    pub orders: EntityStore<Order>,
    pub warehouses: EntityStore<Warehouse>,
    pub stock: StockStore,
}

impl AppStore {
    pub fn new<B: Backend + 'static>(api: Arc<B>) -> Self {
        AppStore {
            customers: EntityStore::<Customer>::new(api.clone()),
            products: EntityStore::<Product>::new(api.clone()),
            orders: EntityStore::<Order>::new(api.clone()),
            warehouses: EntityStore::<Warehouse>::new(api.clone()),
            stock: StockStore::new(api),
        }
    }

    /// Fetches every list, one after the other.
    ///
    /// A failing list keeps its stale items and its own error; the kinds
    /// that failed are returned.
    pub async fn load_all(&self) -> Vec<EntityKind> {
        let mut failed = Vec::new();

        if self.customers.fetch_all().await.is_err() {
            failed.push(EntityKind::Customer);
        }
        if self.products.fetch_all().await.is_err() {
            failed.push(EntityKind::Product);
        }
        if self.orders.fetch_all().await.is_err() {
            failed.push(EntityKind::Order);
        }
        if self.warehouses.fetch_all().await.is_err() {
            failed.push(EntityKind::Warehouse);
        }

        if failed.is_empty() {
            info!("All lists loaded");
        } else {
            warn!(?failed, "Some lists failed to load");
        }
        failed
    }

    /// Summary computed from the lists currently held.
    pub async fn summary(&self, low_stock_threshold: i64) -> DashboardSummary {
        DashboardSummary::compute(
            &self.customers.items().await,
            &self.products.items().await,
            &self.orders.items().await,
            &self.warehouses.items().await,
            low_stock_threshold,
        )
    }

    /// Customers with order count and total spent filled in from the
    /// loaded orders.
    pub async fn customers_with_stats(&self) -> Vec<Customer> {
        let mut customers = self.customers.items().await;
        summary::apply_customer_stats(&mut customers, &self.orders.items().await);
        customers
    }

    pub async fn clear(&self) {
        self.customers.clear().await;
        self.products.clear().await;
        self.orders.clear().await;
        self.warehouses.clear().await;
        self.stock.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockflow_api::MemoryApi;
    use stockflow_core::{Category, Money, OrderItem, OrderStatus, Stock};

    fn product(id: &str, stock: i64) -> Product {
        Product {
            id: id.into(),
            code: id.to_uppercase(),
            name: format!("Product {}", id),
            description: String::new(),
            price: Money::from_cents(1000),
            category: Category::Office,
            stocks: vec![Stock {
                product_id: id.into(),
                warehouse_id: "w1".into(),
                quantity: stock,
            }],
        }
    }

    fn order(id: &str, customer_id: &str, cents: i64) -> Order {
        Order {
            id: id.into(),
            customer_id: customer_id.into(),
            status: OrderStatus::Completed,
            total: Money::from_cents(cents),
            created_at: chrono::Utc::now(),
            items: vec![OrderItem {
                product_id: "p1".into(),
                quantity: 1,
                price: Money::from_cents(cents),
            }],
        }
    }

    fn customer(id: &str) -> Customer {
        Customer {
            id: id.into(),
            name: "Acme".into(),
            email: format!("{}@acme.com", id),
            phone: "1".into(),
            address: String::new(),
            orders_count: 0,
            total_spent: Money::zero(),
        }
    }

    #[tokio::test]
    async fn test_load_all_and_summary() {
        let api = Arc::new(MemoryApi::new());
        api.seed(&[customer("c1")]).await.unwrap();
        api.seed(&[product("p1", 2), product("p2", 50)]).await.unwrap();
        api.seed(&[order("o1", "c1", 2500), order("o2", "c1", 1000)]).await.unwrap();

        let store = AppStore::new(api);
        assert!(store.load_all().await.is_empty());

        let summary = store.summary(5).await;
        assert_eq!(summary.customers, 1);
        assert_eq!(summary.products, 2);
        assert_eq!(summary.orders, 2);
        assert_eq!(summary.warehouses, 0);
        assert_eq!(summary.revenue, Money::from_cents(3500));
        assert_eq!(summary.low_stock, vec!["p1".to_string()]);

        let customers = store.customers_with_stats().await;
        assert_eq!(customers[0].orders_count, 2);
        assert_eq!(customers[0].total_spent, Money::from_cents(3500));
    }

    #[tokio::test]
    async fn test_load_all_reports_failed_kind() {
        let api = Arc::new(MemoryApi::new());
        api.fail_next("boom").await;

        let store = AppStore::new(api);
        assert_eq!(store.load_all().await, vec![EntityKind::Customer]);
        assert_eq!(
            store.customers.snapshot().await.error.as_deref(),
            Some("boom")
        );
        assert!(store.products.snapshot().await.error.is_none());
    }

    #[tokio::test]
    async fn test_clear_forgets_everything() {
        let api = Arc::new(MemoryApi::new());
        api.seed(&[customer("c1")]).await.unwrap();
        let store = AppStore::new(api);
        store.load_all().await;

        store.clear().await;
        assert!(store.customers.items().await.is_empty());
    }
}
