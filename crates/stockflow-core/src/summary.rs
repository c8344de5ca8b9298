//! # Dashboard Summary
//!
//! Aggregates shown on the dashboard page and the derived statistics of
//! customers.
//!
//! ```text
//!   customers ─┐
//!   products  ─┼──► DashboardSummary::compute(.., low_stock_threshold)
//!   orders    ─┤        counts, revenue, open orders, units, low stock
//!   warehouses ┘
//!
//!   orders ──► customer_stats() ──► orders_count / total_spent per customer
//! ```
//!
//! The backend exposes the same aggregate at `GET /dashboard`; the type
//! deserializes from it with every field optional.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{self, Money};
use crate::types::{Customer, Order, OrderStatus, Product, Warehouse};

/// Numbers shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct DashboardSummary {
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
    pub warehouses: usize,

    /// Sum of the totals of completed orders.
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub revenue: Money,

    /// Orders still pending or processing.
    pub open_orders: usize,

    /// Units across every product and warehouse.
    pub units_in_stock: i64,

    /// Ids of products whose total stock is below the threshold.
    pub low_stock: Vec<String>,
}

impl DashboardSummary {
    pub fn compute(
        customers: &[Customer],
        products: &[Product],
        orders: &[Order],
        warehouses: &[Warehouse],
        low_stock_threshold: i64,
    ) -> Self {
        let revenue = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Completed)
            .map(order_total)
            .sum();

        DashboardSummary {
            customers: customers.len(),
            products: products.len(),
            orders: orders.len(),
            warehouses: warehouses.len(),
            revenue,
            open_orders: orders.iter().filter(|o| o.status.is_open()).count(),
            units_in_stock: products.iter().map(Product::total_stock).sum(),
            low_stock: products
                .iter()
                .filter(|p| p.total_stock() < low_stock_threshold)
                .map(|p| p.id.clone())
                .collect(),
        }
    }
}

/// Backend total, or the sum of the lines when the backend sent none.
fn order_total(order: &Order) -> Money {
    if order.total.is_zero() {
        order.items_total()
    } else {
        order.total
    }
}

// =============================================================================
// Customer Statistics
// =============================================================================

/// Derived figures of one customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CustomerStats {
    pub orders_count: i64,
    pub total_spent: Money,
}

/// Per-customer statistics over every non-cancelled order.
pub fn customer_stats(orders: &[Order]) -> HashMap<String, CustomerStats> {
    let mut stats: HashMap<String, CustomerStats> = HashMap::new();

    for order in orders.iter().filter(|o| o.status != OrderStatus::Cancelled) {
        let entry = stats.entry(order.customer_id.clone()).or_default();
        entry.orders_count += 1;
        entry.total_spent += order_total(order);
    }

    stats
}

/// Overwrites the derived fields of `customers` from `orders`.
///
/// Customers without orders end up with zero.
pub fn apply_customer_stats(customers: &mut [Customer], orders: &[Order]) {
    let stats = customer_stats(orders);
    for customer in customers.iter_mut() {
        let s = stats.get(&customer.id).copied().unwrap_or_default();
        customer.orders_count = s.orders_count;
        customer.total_spent = s.total_spent;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, OrderItem, Stock};
    use chrono::Utc;

    fn order(id: &str, customer: &str, status: OrderStatus, total: i64) -> Order {
        Order {
            id: id.into(),
            customer_id: customer.into(),
            status,
            total: Money::from_cents(total),
            created_at: Utc::now(),
            items: vec![],
        }
    }

    fn product(id: &str, quantities: &[i64]) -> Product {
        Product {
            id: id.into(),
            code: id.to_uppercase(),
            name: id.into(),
            description: String::new(),
            price: Money::from_cents(100),
            category: Category::Home,
            stocks: quantities
                .iter()
                .enumerate()
                .map(|(i, q)| Stock {
                    product_id: id.into(),
                    warehouse_id: format!("w{}", i),
                    quantity: *q,
                })
                .collect(),
        }
    }

    fn customer(id: &str) -> Customer {
        Customer {
            id: id.into(),
            name: id.into(),
            email: format!("{}@x.it", id),
            phone: String::new(),
            address: String::new(),
            orders_count: 99,
            total_spent: Money::from_cents(1),
        }
    }

    #[test]
    fn test_compute_summary() {
        let orders = vec![
            order("o1", "c1", OrderStatus::Completed, 1000),
            order("o2", "c1", OrderStatus::Pending, 500),
            order("o3", "c2", OrderStatus::Processing, 700),
            order("o4", "c2", OrderStatus::Cancelled, 9000),
        ];
        let products = vec![product("a", &[2, 1]), product("b", &[10]), product("c", &[])];

        let summary = DashboardSummary::compute(&[customer("c1")], &products, &orders, &[], 5);

        assert_eq!(summary.customers, 1);
        assert_eq!(summary.products, 3);
        assert_eq!(summary.orders, 4);
        assert_eq!(summary.revenue.cents(), 1000);
        assert_eq!(summary.open_orders, 2);
        assert_eq!(summary.units_in_stock, 13);
        assert_eq!(summary.low_stock, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_order_total_falls_back_to_items() {
        let mut o = order("o1", "c1", OrderStatus::Completed, 0);
        o.items = vec![OrderItem {
            product_id: "a".into(),
            quantity: 3,
            price: Money::from_cents(250),
        }];
        let summary = DashboardSummary::compute(&[], &[], &[o], &[], 0);
        assert_eq!(summary.revenue.cents(), 750);
    }

    #[test]
    fn test_customer_stats_skip_cancelled() {
        let orders = vec![
            order("o1", "c1", OrderStatus::Completed, 1000),
            order("o2", "c1", OrderStatus::Pending, 500),
            order("o3", "c1", OrderStatus::Cancelled, 9000),
        ];
        let mut customers = vec![customer("c1"), customer("c2")];
        apply_customer_stats(&mut customers, &orders);

        assert_eq!(customers[0].orders_count, 2);
        assert_eq!(customers[0].total_spent.cents(), 1500);
        assert_eq!(customers[1].orders_count, 0);
        assert!(customers[1].total_spent.is_zero());
    }

    #[test]
    fn test_remote_summary_with_missing_fields() {
        let summary: DashboardSummary =
            serde_json::from_str(r#"{"customers": 4, "revenue": 120.5}"#).unwrap();
        assert_eq!(summary.customers, 4);
        assert_eq!(summary.revenue.cents(), 12050);
        assert!(summary.low_stock.is_empty());
    }
}
