//! Stock rows of the warehouse currently open in the stock editor.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use super::InFlight;
use crate::error::{Action, WorkflowError};
use stockflow_api::{ApiResult, StockApi};
use stockflow_core::{Stock, StockSheet};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSlice {
    pub warehouse_id: Option<String>,
    pub rows: Vec<Stock>,
    pub loading: bool,
    pub saving: bool,
    pub error: Option<String>,
}

impl StockSlice {
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.rows
            .iter()
            .find(|row| row.product_id == product_id)
            .map(|row| row.quantity)
            .unwrap_or(0)
    }
}

/// Shared handle to the stock slice.
#[derive(Clone)]
pub struct StockStore {
    api: Arc<dyn StockApi>,
    slice: Arc<RwLock<StockSlice>>,
}

impl StockStore {
    pub fn new(api: Arc<dyn StockApi>) -> Self {
        StockStore {
            api,
            slice: Arc::new(RwLock::new(StockSlice::default())),
        }
    }

    /// Loads the rows of `warehouse_id`, replacing whatever was loaded.
    ///
    /// On failure the previous warehouse and its rows stay.
    pub async fn load(&self, warehouse_id: &str) -> ApiResult<Vec<Stock>> {
        self.slice.write().await.loading = true;
        let in_flight = InFlight::new(&self.slice, |slice: &mut StockSlice| slice.loading = false);

        let result = self.api.warehouse_stock(warehouse_id).await;

        let mut slice = self.slice.write().await;
        in_flight.finish();
        slice.loading = false;
        match result {
            Ok(rows) => {
                debug!(warehouse_id = %warehouse_id, rows = rows.len(), "Stock loaded");
                slice.warehouse_id = Some(warehouse_id.to_string());
                slice.rows = rows.clone();
                slice.error = None;
                Ok(rows)
            }
            Err(e) => {
                slice.error = Some(WorkflowError::from_api(&e, Action::Load).to_string());
                Err(e)
            }
        }
    }

    /// Writes a whole sheet; on success the rows become the saved ones.
    pub async fn save(&self, sheet: &StockSheet) -> ApiResult<Vec<Stock>> {
        self.slice.write().await.saving = true;
        let in_flight = InFlight::new(&self.slice, |slice: &mut StockSlice| slice.saving = false);

        let result = self.api.save_stock(sheet).await;

        let mut slice = self.slice.write().await;
        in_flight.finish();
        slice.saving = false;
        let rows = match result {
            Ok(rows) => rows,
            Err(e) => {
                slice.error = Some(WorkflowError::from_api(&e, Action::Save).to_string());
                return Err(e);
            }
        };
        slice.error = None;
        debug!(warehouse_id = %sheet.warehouse_id, rows = rows.len(), "Stock rows replaced");
        slice.warehouse_id = Some(sheet.warehouse_id.clone());
        slice.rows = rows.clone();
        Ok(rows)
    }

    pub async fn snapshot(&self) -> StockSlice {
        self.slice.read().await.clone()
    }

    pub async fn clear(&self) {
        *self.slice.write().await = StockSlice::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockflow_api::MemoryApi;

    #[tokio::test]
    async fn test_load_and_save() {
        let api = Arc::new(MemoryApi::new());
        api.seed_stock("w1", &[("p1", 4)]).await;
        let store = StockStore::new(api.clone());

        store.load("w1").await.unwrap();
        let slice = store.snapshot().await;
        assert_eq!(slice.warehouse_id.as_deref(), Some("w1"));
        assert_eq!(slice.quantity_of("p1"), 4);
        assert_eq!(slice.quantity_of("p2"), 0);

        let mut sheet = StockSheet::new("w1");
        sheet.quantities.insert("p1".into(), 9);
        sheet.quantities.insert("p2".into(), 1);
        store.save(&sheet).await.unwrap();

        let slice = store.snapshot().await;
        assert!(!slice.saving);
        assert_eq!(slice.quantity_of("p1"), 9);
        assert_eq!(api.stock_of("w1").await.get("p2"), Some(&1));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_rows() {
        let api = Arc::new(MemoryApi::new());
        api.seed_stock("w1", &[("p1", 4)]).await;
        let store = StockStore::new(api.clone());
        store.load("w1").await.unwrap();

        api.fail_next("locked").await;
        let mut sheet = StockSheet::new("w1");
        sheet.quantities.insert("p1".into(), 0);
        assert!(store.save(&sheet).await.is_err());

        let slice = store.snapshot().await;
        assert!(!slice.saving);
        assert_eq!(slice.error.as_deref(), Some("locked"));
        assert_eq!(slice.quantity_of("p1"), 4);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_warehouse() {
        let api = Arc::new(MemoryApi::new());
        api.seed_stock("w1", &[("p1", 7)]).await;
        api.seed_stock("w2", &[("p1", 1)]).await;
        let store = StockStore::new(api.clone());
        store.load("w1").await.unwrap();

        api.fail_next("warehouse offline").await;
        assert!(store.load("w2").await.is_err());

        let slice = store.snapshot().await;
        assert_eq!(slice.warehouse_id.as_deref(), Some("w1"));
        assert_eq!(slice.quantity_of("p1"), 7);
        assert_eq!(slice.error.as_deref(), Some("warehouse offline"));
        assert!(!slice.loading);
    }

    #[tokio::test]
    async fn test_abandoned_requests_clear_flags() {
        let api = Arc::new(MemoryApi::new());
        api.seed_stock("w1", &[("p1", 4)]).await;
        let store = StockStore::new(api.clone());
        store.load("w1").await.unwrap();

        api.stall_next().await;
        tokio::select! {
            biased;
            _ = store.load("w2") => panic!("stalled load answered"),
            _ = async {} => {}
        }
        let slice = store.snapshot().await;
        assert!(!slice.loading);
        assert_eq!(slice.warehouse_id.as_deref(), Some("w1"));

        api.stall_next().await;
        let mut sheet = StockSheet::new("w1");
        sheet.quantities.insert("p1".into(), 9);
        tokio::select! {
            biased;
            _ = store.save(&sheet) => panic!("stalled save answered"),
            _ = async {} => {}
        }
        let slice = store.snapshot().await;
        assert!(!slice.saving);
        assert_eq!(slice.quantity_of("p1"), 4);
    }
}
