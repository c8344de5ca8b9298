//! # stockflow-core: Pure Domain Logic for Stockflow
//!
//! This crate holds everything about customers, products, orders and
//! warehouses that can be decided without talking to the backend.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockflow Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Workflow Controllers (dashboard)                │   │
//! │  │    load ──► search ──► add/edit/delete dialog ──► save          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockflow-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ validation│  │  search   │  │   │
//! │  │   │ Customer  │  │   Money   │  │  reports  │  │  filter   │  │   │
//! │  │   │ Product   │  │  parsing  │  │  unique   │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockflow-api (REST collaborator)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities and their drafts (Customer, Product, Order, ...)
//! - [`entity`] - The [`Entity`] trait tying an entity to its draft and rules
//! - [`money`] - Integer-cent money type with form parsing
//! - [`validation`] - Per-entity form validation
//! - [`search`] - Case-insensitive list filtering
//! - [`summary`] - Dashboard aggregates and derived customer statistics
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockflow_core::{Customer, CustomerDraft, Entity};
//!
//! let draft = CustomerDraft {
//!     name: "Acme".into(),
//!     email: "a@a.com".into(),
//!     phone: "123".into(),
//!     address: "Via Roma 1".into(),
//! };
//!
//! let report = Customer::validate(&draft, &[], None);
//! assert!(report.is_valid());
//! ```

pub mod entity;
pub mod error;
pub mod money;
pub mod search;
pub mod summary;
pub mod types;
pub mod validation;

pub use entity::{Entity, EntityKind};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use summary::DashboardSummary;
pub use types::*;
pub use validation::ValidationReport;

/// Maximum length of a product code.
pub const MAX_CODE_LENGTH: usize = 50;

/// Maximum length of any display name (customer, product, warehouse).
pub const MAX_NAME_LENGTH: usize = 200;

/// Products with fewer units than this across all warehouses are flagged
/// on the dashboard unless configuration says otherwise.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;
