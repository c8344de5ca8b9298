//! # Validation Module
//!
//! Form validation for every entity dialog.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dialog (this module)                                         │
//! │  ├── Required fields, formats, ranges                                  │
//! │  ├── Uniqueness against the list already in the store                  │
//! │  └── Runs before any request, errors shown inline                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Backend                                                      │
//! │  ├── The authority: may still reject                                   │
//! │  └── Its message is shown on the same dialog                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field validators (`validate_code`, `validate_email`, ...) return the first
//! problem of a single value. The `validate_<entity>` functions run every
//! rule of a draft and collect the results into a [`ValidationReport`].
//!
//! ## Usage
//! ```rust
//! use stockflow_core::validation::{validate_code, validate_email};
//!
//! assert!(validate_code("KB-01").is_ok());
//! assert!(validate_code("has space").is_err());
//! assert!(validate_email("mario@example.com").is_ok());
//! assert!(validate_email("mario").is_err());
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::*;
use crate::{MAX_CODE_LENGTH, MAX_NAME_LENGTH};

/// Result type for single-field validators.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Validation Report
// =============================================================================

/// Outcome of validating one draft.
///
/// Field errors are keyed by field name (one per field, the first rule that
/// failed). Form errors concern the draft as a whole, such as an order that
/// lists the same product twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub field_errors: BTreeMap<String, ValidationError>,
    pub form_errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty() && self.form_errors.is_empty()
    }

    /// Records an error for `field` unless one is already recorded.
    pub fn add_field(&mut self, field: &str, error: ValidationError) {
        self.field_errors.entry(field.to_string()).or_insert(error);
    }

    pub fn add_form(&mut self, error: ValidationError) {
        if !self.form_errors.contains(&error) {
            self.form_errors.push(error);
        }
    }

    /// Records the error of a field validator, if any.
    fn check(&mut self, field: &str, result: ValidationResult<()>) {
        if let Err(error) = result {
            self.add_field(field, error);
        }
    }

    pub fn field_error(&self, field: &str) -> Option<&ValidationError> {
        self.field_errors.get(field)
    }

    pub fn has_field_error(&self, field: &str) -> bool {
        self.field_errors.contains_key(field)
    }

    /// Messages of the form-level errors, for the banner above the form.
    pub fn form_messages(&self) -> Vec<String> {
        self.form_errors.iter().map(ToString::to_string).collect()
    }

    /// Field name → message, for inline display.
    pub fn field_messages(&self) -> BTreeMap<String, String> {
        self.field_errors
            .iter()
            .map(|(field, err)| (field.clone(), err.to_string()))
            .collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .form_errors
            .iter()
            .map(ToString::to_string)
            .chain(self.field_errors.values().map(ToString::to_string))
            .collect();

        if messages.is_empty() {
            f.write_str("no errors")
        } else {
            f.write_str(&messages.join("; "))
        }
    }
}

impl std::error::Error for ValidationReport {}

// =============================================================================
// Field Validators
// =============================================================================

/// Non-blank after trimming.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Required display name of at most [`MAX_NAME_LENGTH`] characters.
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    validate_required(field, value)?;

    if value.trim().chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only letters, digits, hyphens and underscores
///
/// ## Example
/// ```rust
/// use stockflow_core::validation::validate_code;
///
/// assert!(validate_code("MOUSE_2").is_ok());
/// assert!(validate_code("").is_err());
/// assert!(validate_code("A".repeat(51).as_str()).is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::required("code"));
    }

    if code.chars().count() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LENGTH,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "only letters, numbers, hyphens, and underscores allowed".to_string(),
        });
    }

    Ok(())
}

/// Email shape: one `@` with something on both sides, no whitespace.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(()),
        _ => Err(invalid("must look like name@domain")),
    }
}

/// Price text of the product form: required, parseable, strictly positive.
pub fn validate_price(text: &str) -> ValidationResult<Money> {
    if text.trim().is_empty() {
        return Err(ValidationError::required("price"));
    }

    let price: Money = text.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "price".to_string(),
        reason: "not a valid amount".to_string(),
    })?;

    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(price)
}

/// Category text of the product form: one of [`Category::ALL`].
pub fn validate_category(text: &str) -> ValidationResult<Category> {
    if text.trim().is_empty() {
        return Err(ValidationError::required("category"));
    }

    text.parse().map_err(|_| ValidationError::NotAllowed {
        field: "category".to_string(),
        allowed: Category::ALL.iter().map(|c| c.as_str().to_string()).collect(),
    })
}

/// Quantity of an order line.
pub fn validate_item_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Quantity held in stock.
pub fn validate_stock_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Uniqueness
// =============================================================================

/// Case-insensitive, trimmed comparison of unique values.
fn same_value(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Whether some record other than `editing_id` already holds `candidate`.
///
/// Blank candidates never conflict; the required rule reports them.
pub fn is_taken<'a, T, I, F>(records: I, candidate: &str, editing_id: Option<&str>, field: F) -> bool
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> (&str, &str),
{
    if candidate.trim().is_empty() {
        return false;
    }

    records.into_iter().any(|record| {
        let (id, value) = field(record);
        editing_id != Some(id) && same_value(value, candidate)
    })
}

// =============================================================================
// Entity Validators
// =============================================================================

pub fn validate_customer(draft: &CustomerDraft, existing: &[Customer], editing_id: Option<&str>) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.check("name", validate_name("name", &draft.name));
    report.check("email", validate_email(&draft.email));
    report.check("phone", validate_required("phone", &draft.phone));
    report.check("address", validate_required("address", &draft.address));

    if is_taken(existing, &draft.email, editing_id, |c: &Customer| (c.id.as_str(), c.email.as_str())) {
        report.add_field("email", ValidationError::duplicate("email", &draft.email));
    }

    report
}

pub fn validate_product(draft: &ProductDraft, existing: &[Product], editing_id: Option<&str>) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.check("code", validate_code(&draft.code));
    report.check("name", validate_name("name", &draft.name));
    report.check("description", validate_required("description", &draft.description));
    report.check("price", validate_price(&draft.price).map(|_| ()));
    report.check("category", validate_category(&draft.category).map(|_| ()));

    if is_taken(existing, &draft.code, editing_id, |p: &Product| (p.id.as_str(), p.code.as_str())) {
        report.add_field("code", ValidationError::duplicate("code", &draft.code));
    }

    report
}

pub fn validate_warehouse(draft: &WarehouseDraft, existing: &[Warehouse], editing_id: Option<&str>) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.check("name", validate_name("name", &draft.name));
    report.check("address", validate_required("address", &draft.address));

    if is_taken(existing, &draft.name, editing_id, |w: &Warehouse| (w.id.as_str(), w.name.as_str())) {
        report.add_field("name", ValidationError::duplicate("name", &draft.name));
    }
    if is_taken(existing, &draft.address, editing_id, |w: &Warehouse| (w.id.as_str(), w.address.as_str())) {
        report.add_field("address", ValidationError::duplicate("address", &draft.address));
    }

    report
}

/// Validates an order draft.
///
/// Item fields are keyed `items[<index>].<field>`. A product listed twice is
/// a single form-level error per product.
pub fn validate_order(draft: &OrderDraft) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.check("customer_id", validate_required("customer_id", &draft.customer_id));

    if draft.items.is_empty() {
        report.add_form(ValidationError::NoItems);
    }

    let mut seen = HashSet::new();
    for (index, item) in draft.items.iter().enumerate() {
        let product_field = format!("items[{}].product_id", index);
        let quantity_field = format!("items[{}].quantity", index);
        let price_field = format!("items[{}].price", index);

        report.check(&product_field, validate_required(&product_field, &item.product_id));
        report.check(&quantity_field, validate_item_quantity(&quantity_field, item.quantity));
        if !item.price.is_positive() {
            report.add_field(
                &price_field,
                ValidationError::MustBePositive {
                    field: price_field.clone(),
                },
            );
        }
        if item.price.checked_multiply_quantity(item.quantity).is_none() {
            report.add_field(
                &quantity_field,
                ValidationError::InvalidFormat {
                    field: quantity_field.clone(),
                    reason: "line total is too large".into(),
                },
            );
        }

        let product_id = item.product_id.trim();
        if !product_id.is_empty() && !seen.insert(product_id) {
            report.add_form(ValidationError::DuplicateProduct {
                product_id: product_id.to_string(),
            });
        }
    }

    if report.field_errors.is_empty() && draft.checked_total().is_none() {
        report.add_field(
            "items",
            ValidationError::InvalidFormat {
                field: "items".into(),
                reason: "order total is too large".into(),
            },
        );
    }

    report
}

/// Every quantity of the stock sheet must be zero or more.
pub fn validate_stock_sheet(sheet: &StockSheet) -> ValidationReport {
    let mut report = ValidationReport::default();

    if sheet.warehouse_id.trim().is_empty() {
        report.add_field("warehouse_id", ValidationError::required("warehouse_id"));
    }

    for (product_id, qty) in &sheet.quantities {
        report.check(product_id, validate_stock_quantity(product_id, *qty));
    }

    report
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn acme_draft() -> CustomerDraft {
        CustomerDraft {
            name: "Acme".into(),
            email: "a@a.com".into(),
            phone: "123".into(),
            address: "Via Roma 1".into(),
        }
    }

    fn customer(id: &str, email: &str) -> Customer {
        Customer {
            id: id.into(),
            name: "Someone".into(),
            email: email.into(),
            phone: "1".into(),
            address: "x".into(),
            orders_count: 0,
            total_spent: Money::zero(),
        }
    }

    fn product_draft() -> ProductDraft {
        ProductDraft {
            code: "KB-01".into(),
            name: "Keyboard".into(),
            description: "Mechanical keyboard".into(),
            price: "49.90".into(),
            category: "electronics".into(),
        }
    }

    fn product(id: &str, code: &str) -> Product {
        Product {
            id: id.into(),
            code: code.into(),
            name: "Thing".into(),
            description: "d".into(),
            price: Money::from_cents(100),
            category: Category::Other,
            stocks: vec![],
        }
    }

    fn warehouse(id: &str, name: &str, address: &str) -> Warehouse {
        Warehouse {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            stocks: vec![],
        }
    }

    fn item(product_id: &str, quantity: i64) -> OrderItemDraft {
        OrderItemDraft {
            product_id: product_id.into(),
            quantity,
            price: Money::from_cents(500),
        }
    }

    #[test]
    fn test_valid_customer_against_empty_list() {
        let report = validate_customer(&acme_draft(), &[], None);
        assert!(report.is_valid(), "{}", report);
    }

    #[test]
    fn test_each_missing_customer_field_is_reported_alone() {
        let blanks: [(&str, fn(&mut CustomerDraft)); 4] = [
            ("name", |d| d.name = "  ".into()),
            ("email", |d| d.email.clear()),
            ("phone", |d| d.phone.clear()),
            ("address", |d| d.address = "\t".into()),
        ];

        for (field, blank) in blanks {
            let mut draft = acme_draft();
            blank(&mut draft);
            let report = validate_customer(&draft, &[], None);
            assert!(!report.is_valid());
            assert_eq!(report.field_errors.len(), 1, "only {} should fail", field);
            assert!(matches!(
                report.field_error(field),
                Some(ValidationError::Required { .. })
            ));
        }
    }

    #[test]
    fn test_email_shape() {
        assert!(validate_email("a@a.com").is_ok());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("@a.com").is_err());
        assert!(validate_email("plain").is_err());
        assert!(validate_email("a b@c.d").is_err());
        assert!(validate_email("a@b@c").is_err());
    }

    #[test]
    fn test_customer_email_uniqueness() {
        let existing = vec![customer("1", "A@A.com ")];

        let report = validate_customer(&acme_draft(), &existing, None);
        assert!(matches!(
            report.field_error("email"),
            Some(ValidationError::Duplicate { .. })
        ));

        // editing the owner of the email is not a conflict
        let report = validate_customer(&acme_draft(), &existing, Some("1"));
        assert!(report.is_valid());

        // editing someone else still is
        let report = validate_customer(&acme_draft(), &existing, Some("2"));
        assert!(report.has_field_error("email"));
    }

    #[test]
    fn test_product_rules() {
        assert!(validate_product(&product_draft(), &[], None).is_valid());

        let mut draft = product_draft();
        draft.price = "0".into();
        assert!(matches!(
            validate_product(&draft, &[], None).field_error("price"),
            Some(ValidationError::MustBePositive { .. })
        ));

        draft.price = "abc".into();
        assert!(matches!(
            validate_product(&draft, &[], None).field_error("price"),
            Some(ValidationError::InvalidFormat { .. })
        ));

        let mut draft = product_draft();
        draft.category = "toys".into();
        assert!(matches!(
            validate_product(&draft, &[], None).field_error("category"),
            Some(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_each_missing_product_field_is_reported() {
        let blanks: [(&str, fn(&mut ProductDraft)); 5] = [
            ("code", |d| d.code.clear()),
            ("name", |d| d.name.clear()),
            ("description", |d| d.description.clear()),
            ("price", |d| d.price.clear()),
            ("category", |d| d.category.clear()),
        ];

        for (field, blank) in blanks {
            let mut draft = product_draft();
            blank(&mut draft);
            let report = validate_product(&draft, &[], None);
            assert_eq!(report.field_errors.len(), 1, "only {} should fail", field);
            assert!(matches!(
                report.field_error(field),
                Some(ValidationError::Required { .. })
            ));
        }
    }

    #[test]
    fn test_code_rules() {
        assert!(validate_code("ABC_123-x").is_ok());
        assert!(validate_code("A".repeat(50).as_str()).is_ok());
        assert!(matches!(
            validate_code("A".repeat(51).as_str()),
            Err(ValidationError::TooLong { max: 50, .. })
        ));
        assert!(validate_code("a.b").is_err());
    }

    #[test]
    fn test_product_code_uniqueness() {
        let existing = vec![product("p1", "kb-01")];
        assert!(validate_product(&product_draft(), &existing, None).has_field_error("code"));
        assert!(validate_product(&product_draft(), &existing, Some("p1")).is_valid());
    }

    #[test]
    fn test_each_missing_warehouse_field_is_reported_alone() {
        let existing = vec![warehouse("w1", "North", "Via Milano 9")];
        let blanks: [(&str, fn(&mut WarehouseDraft)); 2] = [
            ("name", |d| d.name = " ".into()),
            ("address", |d| d.address.clear()),
        ];

        for (field, blank) in blanks {
            let mut draft = WarehouseDraft {
                name: "Central".into(),
                address: "Via Po 3".into(),
            };
            blank(&mut draft);
            let report = validate_warehouse(&draft, &existing, None);
            assert!(!report.is_valid());
            assert_eq!(report.field_errors.len(), 1, "only {} should fail", field);
            assert!(matches!(
                report.field_error(field),
                Some(ValidationError::Required { .. })
            ));
        }
    }

    #[test]
    fn test_warehouse_name_and_address_unique_independently() {
        let existing = vec![warehouse("w1", "Central", "Via Po 3")];

        let draft = WarehouseDraft {
            name: "central".into(),
            address: "Via Milano 9".into(),
        };
        let report = validate_warehouse(&draft, &existing, None);
        assert!(report.has_field_error("name"));
        assert!(!report.has_field_error("address"));

        let draft = WarehouseDraft {
            name: "North".into(),
            address: " VIA PO 3 ".into(),
        };
        let report = validate_warehouse(&draft, &existing, None);
        assert!(!report.has_field_error("name"));
        assert!(report.has_field_error("address"));

        let draft = WarehouseDraft {
            name: "Central".into(),
            address: "Via Po 3".into(),
        };
        assert!(validate_warehouse(&draft, &existing, Some("w1")).is_valid());
    }

    #[test]
    fn test_order_requires_items() {
        let draft = OrderDraft {
            customer_id: "c1".into(),
            status: OrderStatus::Pending,
            items: vec![],
        };
        let report = validate_order(&draft);
        assert_eq!(report.form_errors, vec![ValidationError::NoItems]);
    }

    #[test]
    fn test_order_duplicate_product_is_form_level() {
        let draft = OrderDraft {
            customer_id: "c1".into(),
            status: OrderStatus::Pending,
            items: vec![item("p1", 1), item("p2", 2), item(" p1", 3)],
        };
        let report = validate_order(&draft);
        assert!(!report.is_valid());
        assert!(report.field_errors.is_empty());
        assert_eq!(
            report.form_errors,
            vec![ValidationError::DuplicateProduct {
                product_id: "p1".into()
            }]
        );
    }

    #[test]
    fn test_order_item_rules() {
        let mut bad_price = item("p2", 1);
        bad_price.price = Money::zero();
        let draft = OrderDraft {
            customer_id: String::new(),
            status: OrderStatus::Pending,
            items: vec![item("p1", 0), bad_price],
        };
        let report = validate_order(&draft);
        assert!(report.has_field_error("customer_id"));
        assert!(report.has_field_error("items[0].quantity"));
        assert!(report.has_field_error("items[1].price"));
        assert!(!report.has_field_error("items[1].quantity"));
    }

    #[test]
    fn test_order_line_total_overflow_is_a_field_error() {
        let mut huge = item("p1", i64::MAX / 10);
        huge.price = Money::from_cents(1000);
        let draft = OrderDraft {
            customer_id: "c1".into(),
            status: OrderStatus::Pending,
            items: vec![item("p2", 1), huge],
        };

        let report = validate_order(&draft);
        assert!(matches!(
            report.field_error("items[1].quantity"),
            Some(ValidationError::InvalidFormat { .. })
        ));
        assert!(!report.has_field_error("items[0].quantity"));
        assert!(!report.has_field_error("items"));
    }

    #[test]
    fn test_order_sum_overflow_is_reported_on_items() {
        let mut big = item("p1", 1);
        big.price = Money::from_cents(i64::MAX);
        let draft = OrderDraft {
            customer_id: "c1".into(),
            status: OrderStatus::Pending,
            items: vec![big, item("p2", 1)],
        };

        let report = validate_order(&draft);
        assert_eq!(report.field_errors.len(), 1);
        assert!(report.has_field_error("items"));
    }

    #[test]
    fn test_stock_sheet_rejects_negative() {
        let mut sheet = StockSheet::new("w1");
        sheet.quantities.insert("p1".into(), 0);
        sheet.quantities.insert("p2".into(), -1);

        let report = validate_stock_sheet(&sheet);
        assert!(!report.has_field_error("p1"));
        assert!(matches!(
            report.field_error("p2"),
            Some(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_report_display() {
        let mut report = ValidationReport::default();
        assert_eq!(report.to_string(), "no errors");

        report.add_form(ValidationError::NoItems);
        report.add_field("name", ValidationError::required("name"));
        report.add_field("name", ValidationError::required("ignored"));
        assert_eq!(
            report.to_string(),
            "Order must contain at least one item; name is required"
        );
        assert_eq!(report.field_messages()["name"], "name is required");
    }
}
