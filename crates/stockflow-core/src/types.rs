//! # Domain Types
//!
//! Entities held by the store and the drafts edited in dialogs.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │     Order       │   │   Warehouse     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  customer_id    │   │  id             │       │
//! │  │  email (unique) │   │  status         │   │  name (unique)  │       │
//! │  │  orders_count*  │   │  items[] ───┐   │   │  address (uniq) │       │
//! │  │  total_spent*   │   │  total*     │   │   └────────┬────────┘       │
//! │  └─────────────────┘   └─────────────┼───┘            │                 │
//! │                                      ▼                ▼                 │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │◄──│   OrderItem     │   │     Stock       │       │
//! │  │  ─────────────  │   │  product_id     │   │  product_id     │       │
//! │  │  code (unique)  │◄──┼─────────────────┼───│  warehouse_id   │       │
//! │  │  price, category│   │  quantity ≥ 1   │   │  quantity ≥ 0   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  * derived                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Drafts and Payloads
//! Every entity has a `*Draft` (the raw field set edited in a dialog, text
//! where the user types text) and a payload (what is sent to the backend
//! once the draft validated). Customers and warehouses send their draft
//! as-is; products and orders convert typed fields first.
//!
//! ## Identifiers
//! Ids are opaque strings. The backend may send them as JSON numbers;
//! [`de_id`] accepts both.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::{self, Money};

/// Deserializes an id sent either as a JSON string or a JSON integer.
pub fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(n) => n.to_string(),
    })
}

// =============================================================================
// Customer
// =============================================================================

/// A customer of the business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    #[serde(deserialize_with = "de_id")]
    pub id: String,

    pub name: String,

    /// Unique among customers (case-insensitive).
    pub email: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub address: String,

    /// Number of non-cancelled orders. Derived, see [`crate::summary`].
    #[serde(default, alias = "ordersCount")]
    pub orders_count: i64,

    /// Sum of non-cancelled order totals. Derived.
    #[serde(default, alias = "totalSpent", with = "money::decimal")]
    #[ts(type = "number")]
    pub total_spent: Money,
}

/// Form fields of the customer dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl CustomerDraft {
    /// Copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        CustomerDraft {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// The fixed set of product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Electronics,
    Clothing,
    Food,
    Home,
    Office,
    Other,
}

impl Category {
    /// Every category, in the order forms list them.
    pub const ALL: [Category; 6] = [
        Category::Electronics,
        Category::Clothing,
        Category::Food,
        Category::Home,
        Category::Office,
        Category::Other,
    ];

    /// Wire name (`"electronics"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Clothing => "clothing",
            Category::Food => "food",
            Category::Home => "home",
            Category::Office => "office",
            Category::Other => "other",
        }
    }

    /// Human label for tables and selects.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Clothing => "Clothing",
            Category::Food => "Food",
            Category::Home => "Home",
            Category::Office => "Office",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted) || c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}

// =============================================================================
// Product & Stock
// =============================================================================

/// Units of one product held in one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Stock {
    #[serde(deserialize_with = "de_id", alias = "productId")]
    pub product_id: String,

    #[serde(deserialize_with = "de_id", alias = "warehouseId")]
    pub warehouse_id: String,

    pub quantity: i64,
}

/// A product in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    #[serde(deserialize_with = "de_id")]
    pub id: String,

    /// Business identifier, unique (case-insensitive).
    pub code: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub price: Money,

    pub category: Category,

    /// One row per warehouse holding this product.
    #[serde(default)]
    pub stocks: Vec<Stock>,
}

impl Product {
    /// Units across every warehouse.
    pub fn total_stock(&self) -> i64 {
        self.stocks.iter().map(|s| s.quantity).sum()
    }

    /// Units in one warehouse (0 when the product has no row there).
    pub fn stock_in(&self, warehouse_id: &str) -> i64 {
        self.stocks
            .iter()
            .find(|s| s.warehouse_id == warehouse_id)
            .map(|s| s.quantity)
            .unwrap_or(0)
    }
}

/// Form fields of the product dialog.
///
/// `price` and `category` hold the text of their inputs; validation checks
/// that they parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    pub code: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
}

/// Body sent when creating or updating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPayload {
    pub code: String,
    pub name: String,
    pub description: String,
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub price: Money,
    pub category: Category,
}

impl TryFrom<&ProductDraft> for ProductPayload {
    type Error = CoreError;

    fn try_from(draft: &ProductDraft) -> Result<Self, Self::Error> {
        Ok(ProductPayload {
            code: draft.code.trim().to_string(),
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            price: draft.price.parse()?,
            category: draft.category.parse()?,
        })
    }
}

// =============================================================================
// Order
// =============================================================================

/// The lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Orders that still need work.
    pub fn is_open(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

/// A line of an order. The price is frozen at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    #[serde(deserialize_with = "de_id", alias = "productId")]
    pub product_id: String,

    pub quantity: i64,

    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub price: Money,
}

impl OrderItem {
    /// quantity × price.
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    #[serde(deserialize_with = "de_id")]
    pub id: String,

    #[serde(deserialize_with = "de_id", alias = "customerId")]
    pub customer_id: String,

    #[serde(default)]
    pub status: OrderStatus,

    /// Sum of the line totals, as computed by the backend.
    #[serde(default, with = "money::decimal")]
    #[ts(type = "number")]
    pub total: Money,

    #[serde(default = "Utc::now", alias = "createdAt")]
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Total recomputed from the items.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

/// One line of the order dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItemDraft {
    pub product_id: String,
    pub quantity: i64,
    #[ts(type = "number")]
    pub price: Money,
}

impl OrderItemDraft {
    /// Line for `product` with its current catalogue price.
    pub fn for_product(product: &Product, quantity: i64) -> Self {
        OrderItemDraft {
            product_id: product.id.clone(),
            quantity,
            price: product.price,
        }
    }
}

/// Form fields of the order dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDraft {
    pub customer_id: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItemDraft>,
}

impl OrderDraft {
    /// Running total shown under the item table.
    pub fn total(&self) -> Money {
        self.items
            .iter()
            .map(|i| i.price.multiply_quantity(i.quantity))
            .sum()
    }

    /// Exact total, `None` when a line or the sum leaves the `i64` range.
    pub fn checked_total(&self) -> Option<Money> {
        self.items.iter().try_fold(Money::zero(), |acc, i| {
            acc.checked_add(i.price.checked_multiply_quantity(i.quantity)?)
        })
    }
}

/// Body sent when creating or updating an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderPayload {
    pub customer_id: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub total: Money,
}

impl TryFrom<&OrderDraft> for OrderPayload {
    type Error = CoreError;

    fn try_from(draft: &OrderDraft) -> Result<Self, CoreError> {
        let total = draft.checked_total().ok_or_else(|| CoreError::InvalidAmount {
            input: draft
                .items
                .iter()
                .map(|i| format!("{} x {}", i.quantity, i.price))
                .collect::<Vec<_>>()
                .join(" + "),
            reason: "order total is too large".into(),
        })?;

        Ok(OrderPayload {
            customer_id: draft.customer_id.trim().to_string(),
            status: draft.status,
            items: draft
                .items
                .iter()
                .map(|i| OrderItem {
                    product_id: i.product_id.trim().to_string(),
                    quantity: i.quantity,
                    price: i.price,
                })
                .collect(),
            total,
        })
    }
}

// =============================================================================
// Warehouse
// =============================================================================

/// A storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Warehouse {
    #[serde(deserialize_with = "de_id")]
    pub id: String,

    /// Unique (case-insensitive).
    pub name: String,

    /// Unique (case-insensitive), checked independently of the name.
    pub address: String,

    #[serde(default)]
    pub stocks: Vec<Stock>,
}

/// Form fields of the warehouse dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WarehouseDraft {
    pub name: String,
    pub address: String,
}

impl WarehouseDraft {
    pub fn trimmed(&self) -> Self {
        WarehouseDraft {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }
}

// =============================================================================
// Stock Sheet
// =============================================================================

/// The stock-management form of one warehouse: product id → quantity.
///
/// Submitted in a single request; only the `quantities` map goes on the
/// wire, the warehouse is part of the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockSheet {
    #[serde(skip)]
    pub warehouse_id: String,

    pub quantities: BTreeMap<String, i64>,
}

impl StockSheet {
    pub fn new(warehouse_id: impl Into<String>) -> Self {
        StockSheet {
            warehouse_id: warehouse_id.into(),
            quantities: BTreeMap::new(),
        }
    }

    /// Rows as stored stock records.
    pub fn to_stocks(&self) -> Vec<Stock> {
        self.quantities
            .iter()
            .map(|(product_id, quantity)| Stock {
                product_id: product_id.clone(),
                warehouse_id: self.warehouse_id.clone(),
                quantity: *quantity,
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
