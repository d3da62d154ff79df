//! Dashboard and lookup response types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{OrderId, SpecValue};

/// Aggregate counters from `GET /dashboard/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Number of orders ever registered.
    pub total_orders: u64,

    /// Sum of final prices.
    pub revenue: f64,

    /// Orders waiting for human review.
    pub pending: u64,
}

/// One row of `GET /dashboard/orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,

    #[serde(default)]
    pub product_type: Option<String>,

    /// Quantity as stored; older rows may hold text or out-of-range numbers.
    #[serde(default)]
    pub quantity: Option<SpecValue>,

    /// Status label; the server may leave it empty for freshly created rows.
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub final_price: Option<f64>,

    #[serde(default)]
    pub email: Option<String>,

    /// Comma-joined validation issues.
    #[serde(default)]
    pub issues: Option<String>,
}

/// Status histogram from `GET /dashboard/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsByStatus {
    #[serde(default)]
    pub by_status: HashMap<String, u64>,
}

impl StatsByStatus {
    /// Count for a status label. A missing label means zero orders.
    pub fn count_for(&self, status: &str) -> u64 {
        self.by_status.get(status).copied().unwrap_or(0)
    }

    /// Sum over all labels.
    pub fn total(&self) -> u64 {
        self.by_status.values().sum()
    }
}

/// Response of the backend root endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,

    #[serde(default)]
    pub service: Option<String>,
}

impl HealthStatus {
    /// Returns true if the backend reports itself as up.
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Response of `GET /orders/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatus {
    pub order_id: OrderId,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub final_price: Option<f64>,

    #[serde(default)]
    pub issues: Option<String>,

    #[serde(default)]
    pub product_type: Option<String>,

    #[serde(default)]
    pub quantity: Option<SpecValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_status_counts_as_zero() {
        let stats: StatsByStatus =
            serde_json::from_str(r#"{"by_status": {"auto_approved": 3, "needs_review": 1}}"#)
                .unwrap();
        assert_eq!(stats.count_for("auto_approved"), 3);
        assert_eq!(stats.count_for("rejected"), 0);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn test_empty_stats_body() {
        let stats: StatsByStatus = serde_json::from_str("{}").unwrap();
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_order_record_sparse_row() {
        let row: OrderRecord = serde_json::from_str(r#"{"id": 3, "status": "received"}"#).unwrap();
        assert_eq!(row.id, OrderId::Number(3));
        assert_eq!(row.status.as_deref(), Some("received"));
        assert_eq!(row.final_price, None);
    }

    #[test]
    fn test_order_record_with_odd_quantity() {
        let rows: Vec<OrderRecord> = serde_json::from_str(
            r#"[{"id": 1, "quantity": -5, "status": "rejected"}, {"id": 2, "quantity": "250"}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].quantity, Some(SpecValue::from(-5)));
        assert_eq!(
            rows[1].quantity.as_ref().map(|q| q.to_string()).as_deref(),
            Some("250")
        );
    }

    #[test]
    fn test_health_status() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status": "ok", "service": "ai-print-estimator"}"#).unwrap();
        assert!(health.is_ok());
    }
}
