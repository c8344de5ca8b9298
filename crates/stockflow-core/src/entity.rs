//! # Entity Trait
//!
//! Ties each entity to its draft, its payload, its validation rules and
//! the fields searched in its list.
//!
//! ## One Flow, Four Entities
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Entity ──to_draft()──► Draft ──validate()──► ValidationReport         │
//! │                            │                                            │
//! │                            └──payload()──► Payload ──► backend          │
//! │                                                                         │
//! │   Customer   CustomerDraft   CustomerDraft (trimmed)     /customers     │
//! │   Product    ProductDraft    ProductPayload              /products      │
//! │   Order      OrderDraft      OrderPayload                /orders        │
//! │   Warehouse  WarehouseDraft  WarehouseDraft (trimmed)    /warehouses    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store and the workflow controllers are generic over this trait, so
//! the load/add/edit/delete flow is written once.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::search::contains_folded;
use crate::types::*;
use crate::validation::{self, ValidationReport};

/// Which entity a value, a list or an endpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Customer,
    Product,
    Order,
    Warehouse,
}

impl EntityKind {
    /// Collection path segment on the backend.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customers",
            EntityKind::Product => "products",
            EntityKind::Order => "orders",
            EntityKind::Warehouse => "warehouses",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Product => "product",
            EntityKind::Order => "order",
            EntityKind::Warehouse => "warehouse",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A record kept in a list, edited through a dialog and persisted remotely.
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Raw form fields of the add/edit dialog.
    type Draft: Clone + fmt::Debug + Default + PartialEq + Send + Sync + 'static;

    /// Body of create/update requests, built from a valid draft.
    type Payload: Clone + fmt::Debug + Serialize + Send + Sync + 'static;

    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Draft pre-filled with this record, for the edit dialog.
    fn to_draft(&self) -> Self::Draft;

    /// Checks `draft` against the field rules and against `existing`
    /// records. `editing_id` excludes the record being edited from
    /// uniqueness checks.
    fn validate(draft: &Self::Draft, existing: &[Self], editing_id: Option<&str>) -> ValidationReport;

    /// Converts a draft that passed [`Entity::validate`].
    fn payload(draft: &Self::Draft) -> CoreResult<Self::Payload>;

    /// Whether any searchable field contains `needle`, which must already
    /// be lowercase.
    fn matches(&self, needle: &str) -> bool;
}

// =============================================================================
// Implementations
// =============================================================================

impl Entity for Customer {
    type Draft = CustomerDraft;
    type Payload = CustomerDraft;

    const KIND: EntityKind = EntityKind::Customer;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_draft(&self) -> CustomerDraft {
        CustomerDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
        }
    }

    fn validate(draft: &CustomerDraft, existing: &[Self], editing_id: Option<&str>) -> ValidationReport {
        validation::validate_customer(draft, existing, editing_id)
    }

    fn payload(draft: &CustomerDraft) -> CoreResult<CustomerDraft> {
        Ok(draft.trimmed())
    }

    fn matches(&self, needle: &str) -> bool {
        contains_folded(&self.name, needle)
            || contains_folded(&self.email, needle)
            || contains_folded(&self.phone, needle)
    }
}

impl Entity for Product {
    type Draft = ProductDraft;
    type Payload = ProductPayload;

    const KIND: EntityKind = EntityKind::Product;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            code: self.code.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price.to_decimal_string(),
            category: self.category.as_str().to_string(),
        }
    }

    fn validate(draft: &ProductDraft, existing: &[Self], editing_id: Option<&str>) -> ValidationReport {
        validation::validate_product(draft, existing, editing_id)
    }

    fn payload(draft: &ProductDraft) -> CoreResult<ProductPayload> {
        ProductPayload::try_from(draft)
    }

    fn matches(&self, needle: &str) -> bool {
        contains_folded(&self.code, needle)
            || contains_folded(&self.name, needle)
            || contains_folded(self.category.as_str(), needle)
            || contains_folded(self.category.label(), needle)
    }
}

impl Entity for Order {
    type Draft = OrderDraft;
    type Payload = OrderPayload;

    const KIND: EntityKind = EntityKind::Order;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_draft(&self) -> OrderDraft {
        OrderDraft {
            customer_id: self.customer_id.clone(),
            status: self.status,
            items: self
                .items
                .iter()
                .map(|i| OrderItemDraft {
                    product_id: i.product_id.clone(),
                    quantity: i.quantity,
                    price: i.price,
                })
                .collect(),
        }
    }

    fn validate(draft: &OrderDraft, _existing: &[Self], _editing_id: Option<&str>) -> ValidationReport {
        validation::validate_order(draft)
    }

    fn payload(draft: &OrderDraft) -> CoreResult<OrderPayload> {
        OrderPayload::try_from(draft)
    }

    fn matches(&self, needle: &str) -> bool {
        contains_folded(&self.id, needle)
            || contains_folded(&self.customer_id, needle)
            || contains_folded(self.status.as_str(), needle)
    }
}

impl Entity for Warehouse {
    type Draft = WarehouseDraft;
    type Payload = WarehouseDraft;

    const KIND: EntityKind = EntityKind::Warehouse;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_draft(&self) -> WarehouseDraft {
        WarehouseDraft {
            name: self.name.clone(),
            address: self.address.clone(),
        }
    }

    fn validate(draft: &WarehouseDraft, existing: &[Self], editing_id: Option<&str>) -> ValidationReport {
        validation::validate_warehouse(draft, existing, editing_id)
    }

    fn payload(draft: &WarehouseDraft) -> CoreResult<WarehouseDraft> {
        Ok(draft.trimmed())
    }

    fn matches(&self, needle: &str) -> bool {
        contains_folded(&self.name, needle) || contains_folded(&self.address, needle)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
