//! # Stock Editor
//!
//! Per-warehouse quantity form: one row per product, saved as a whole
//! sheet in a single request.
//!
//! ```text
//!   open(w1, products) ──► GET warehouses/w1/stock
//!                              │
//!                              ▼
//!   rows:  P-001  Stapler   12      (from backend)
//!          P-002  Paper      0      (no row yet: defaults to 0)
//!                              │ set_quantity(..)
//!                              ▼
//!   save() ──► validate sheet ──► PUT warehouses/w1/stock ──► rows = saved
//! ```

use serde::Serialize;
use tracing::debug;

use super::Submitting;
use crate::error::{Action, WorkflowError, WorkflowResult};
use crate::state::StockStore;
use stockflow_core::{validation, Product, StockSheet, ValidationReport};

/// One editable line of the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub product_id: String,
    pub code: String,
    pub name: String,
    pub quantity: i64,
}

pub struct StockEditor {
    store: StockStore,
    warehouse_id: String,
    rows: Vec<StockRow>,
    report: ValidationReport,
    error: Option<String>,
    saving: bool,
}

impl StockEditor {
    /// Loads the warehouse's stock and lays out one row per product.
    pub async fn open(store: StockStore, warehouse_id: &str, products: &[Product]) -> WorkflowResult<Self> {
        let stocks = store
            .load(warehouse_id)
            .await
            .map_err(|e| WorkflowError::classify(&e, Action::Load))?;

        let rows = products
            .iter()
            .map(|product| StockRow {
                product_id: product.id.clone(),
                code: product.code.clone(),
                name: product.name.clone(),
                quantity: stocks
                    .iter()
                    .find(|s| s.product_id == product.id)
                    .map(|s| s.quantity)
                    .unwrap_or(0),
            })
            .collect();

        Ok(StockEditor {
            store,
            warehouse_id: warehouse_id.to_string(),
            rows,
            report: ValidationReport::default(),
            error: None,
            saving: false,
        })
    }

    pub fn warehouse_id(&self) -> &str {
        &self.warehouse_id
    }

    pub fn rows(&self) -> &[StockRow] {
        &self.rows
    }

    pub fn quantity_of(&self, product_id: &str) -> Option<i64> {
        self.rows
            .iter()
            .find(|row| row.product_id == product_id)
            .map(|row| row.quantity)
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> WorkflowResult<()> {
        if self.saving {
            return Err(WorkflowError::Busy);
        }
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.product_id == product_id)
            .ok_or_else(|| WorkflowError::UnknownProduct(product_id.to_string()))?;
        row.quantity = quantity;
        Ok(())
    }

    /// The form as a sheet, every row included.
    pub fn sheet(&self) -> StockSheet {
        let mut sheet = StockSheet::new(self.warehouse_id.clone());
        for row in &self.rows {
            sheet.quantities.insert(row.product_id.clone(), row.quantity);
        }
        sheet
    }

    /// Validates and saves the whole sheet.
    pub async fn save(&mut self) -> WorkflowResult<()> {
        if self.saving {
            return Err(WorkflowError::Busy);
        }

        let sheet = self.sheet();
        let report = validation::validate_stock_sheet(&sheet);
        if !report.is_valid() {
            debug!(warehouse_id = %self.warehouse_id, errors = %report, "Stock sheet rejected");
            self.report = report.clone();
            return Err(WorkflowError::Validation(report));
        }
        self.report = ValidationReport::default();

        let store = self.store.clone();
        let result = {
            let _saving = Submitting::begin(&mut self.saving);
            store.save(&sheet).await
        };

        match result {
            Ok(saved) => {
                self.error = None;
                for row in &mut self.rows {
                    if let Some(stock) = saved.iter().find(|s| s.product_id == row.product_id) {
                        row.quantity = stock.quantity;
                    }
                }
                Ok(())
            }
            Err(e) => {
                let err = WorkflowError::classify(&e, Action::Save);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
