//! # Search
//!
//! Case-insensitive substring filtering of entity lists.
//!
//! ```text
//!   stored list (never mutated)        visible view
//!   ┌──────────────────────┐           ┌──────────────────────┐
//!   │ Acme      a@a.com    │  "ACM"    │ Acme      a@a.com    │
//!   │ Beta      b@b.com    │ ───────►  │ Acmeville c@acme.it  │
//!   │ Acmeville c@acme.it  │           └──────────────────────┘
//!   └──────────────────────┘
//! ```
//!
//! Which fields are searched is decided per entity by
//! [`Entity::matches`](crate::Entity::matches).

use crate::entity::Entity;

/// Whether `haystack` contains `needle`, ignoring case.
///
/// `needle` must already be lowercase; see [`normalize_term`].
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}

/// Lowercased, trimmed search term.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Items matching `term`, in list order.
///
/// A blank term returns every item.
pub fn filter<'a, T: Entity>(items: &'a [T], term: &str) -> Vec<&'a T> {
    let needle = normalize_term(term);
    if needle.is_empty() {
        return items.iter().collect();
    }
    items.iter().filter(|item| item.matches(&needle)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::*;
    use chrono::Utc;

    fn customer(id: &str, name: &str, email: &str, phone: &str) -> Customer {
        Customer {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            address: "Via Verdi 2".into(),
            orders_count: 0,
            total_spent: Money::zero(),
        }
    }

    fn customers() -> Vec<Customer> {
        vec![
            customer("1", "Acme", "a@a.com", "0101"),
            customer("2", "Beta", "b@b.com", "0202"),
            customer("3", "Acmeville", "c@acme.it", "0303"),
        ]
    }

    #[test]
    fn test_blank_term_returns_everything_in_order() {
        let list = customers();
        let ids: Vec<&str> = filter(&list, "").iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        assert_eq!(filter(&list, "   ").len(), 3);
    }

    #[test]
    fn test_case_insensitive_substring() {
        let list = customers();
        let ids: Vec<&str> = filter(&list, "ACM").iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let ids: Vec<&str> = filter(&list, "0202").iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);

        assert!(filter(&list, "zzz").is_empty());
    }

    #[test]
    fn test_address_is_not_searched_for_customers() {
        let list = customers();
        assert!(filter(&list, "verdi").is_empty());
    }

    #[test]
    fn test_orders_match_status_and_customer() {
        let order = Order {
            id: "o-17".into(),
            customer_id: "c-9".into(),
            status: OrderStatus::Processing,
            total: Money::zero(),
            created_at: Utc::now(),
            items: vec![],
        };
        let list = vec![order];
        assert_eq!(filter(&list, "process").len(), 1);
        assert_eq!(filter(&list, "C-9").len(), 1);
        assert_eq!(filter(&list, "o-17").len(), 1);
        assert!(filter(&list, "pending").is_empty());
    }

    #[test]
    fn test_warehouses_match_name_or_address() {
        let list = vec![Warehouse {
            id: "w1".into(),
            name: "Central".into(),
            address: "Via Po 3".into(),
            stocks: vec![],
        }];
        assert_eq!(filter(&list, "cent").len(), 1);
        assert_eq!(filter(&list, "po 3").len(), 1);
    }
}
