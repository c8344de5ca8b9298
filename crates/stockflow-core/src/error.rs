//! # Error Types
//!
//! Domain-specific error types for stockflow-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockflow-core errors (this file)                                     │
//! │  ├── CoreError        - Parsing and domain failures                    │
//! │  └── ValidationError  - One failed form rule                           │
//! │                                                                         │
//! │  stockflow-api errors (separate crate)                                 │
//! │  └── ApiError         - Remote collaborator failures                   │
//! │                                                                         │
//! │  dashboard errors (in app)                                             │
//! │  └── WorkflowError    - What a dialog shows                            │
//! │                                                                         │
//! │  Flow: ValidationError → ValidationReport → WorkflowError → dialog     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, value)
//! 3. Errors are enum variants, never String
//! 4. Each variant renders as the message shown next to the field

use thiserror::Error;

use crate::validation::ValidationReport;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Category text does not name one of the fixed categories.
    #[error("Unknown category: '{0}'")]
    UnknownCategory(String),

    /// Order status text is not one of pending/processing/completed/cancelled.
    #[error("Unknown order status: '{0}'")]
    UnknownStatus(String),

    /// Amount typed into a price field could not be read.
    ///
    /// ## When This Occurs
    /// - Letters in the amount ("12.5a")
    /// - More than two decimals ("1.999")
    /// - Empty input
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    /// A draft failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationReport),
}

// =============================================================================
// Validation Error
// =============================================================================

/// One failed validation rule.
///
/// Field-level variants are keyed by field name inside a
/// [`ValidationReport`]; `DuplicateProduct` and `NoItems` are form-level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (email without @, code with spaces, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Another record already uses this value.
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// An order draft lists the same product twice.
    #[error("Product {product_id} appears more than once in the order")]
    DuplicateProduct { product_id: String },

    /// An order draft has no line items.
    #[error("Order must contain at least one item")]
    NoItems,
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn duplicate(field: &str, value: &str) -> Self {
        ValidationError::Duplicate {
            field: field.to_string(),
            value: value.trim().to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
