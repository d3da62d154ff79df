//! Dashboard aggregation.
//!
//! Summary, orders and stats are fetched concurrently and joined fail-fast: if
//! any of them fails, none of the partial results is shown.

use std::fmt;
use std::sync::Arc;

use estimator_core::{ClientConfig, DashboardSummary, OrderRecord, StatsByStatus};
use estimator_state::{ObservableState, StateSubscription};
use tracing::{info, warn};

use crate::api::DashboardApi;
use crate::client::EstimatorClient;
use crate::presenter::{format_money, StatusBadge, MISSING};

/// View model of the dashboard page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardViewModel {
    pub summary: Option<DashboardSummary>,

    /// Most recent first, windowed.
    pub orders: Vec<OrderRecord>,

    pub stats: Option<StatsByStatus>,

    pub loading: bool,

    pub error: Option<String>,
}

impl DashboardViewModel {
    fn loading() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }

    fn failed(message: String) -> Self {
        Self {
            error: Some(message),
            ..Default::default()
        }
    }

    /// Table rows for the recent orders.
    pub fn rows(&self) -> Vec<OrderRow> {
        self.orders.iter().map(OrderRow::from).collect()
    }

    /// Status counts sorted by label, for stable output.
    pub fn status_counts(&self) -> Vec<(String, u64)> {
        let mut counts: Vec<(String, u64)> = self
            .stats
            .as_ref()
            .map(|s| s.by_status.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default();
        counts.sort();
        counts
    }
}

/// Display cells of one order row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub id: String,
    pub product: String,
    pub quantity: String,
    pub status: StatusBadge,
    pub price: String,
    pub email: String,
    pub issues: String,
}

impl From<&OrderRecord> for OrderRow {
    fn from(order: &OrderRecord) -> Self {
        let or_missing = |value: Option<&str>| {
            value
                .filter(|v| !v.is_empty())
                .unwrap_or(MISSING)
                .to_string()
        };
        Self {
            id: order.id.to_string(),
            product: or_missing(order.product_type.as_deref()),
            quantity: order
                .quantity
                .as_ref()
                .map(|q| q.to_string())
                .unwrap_or_else(|| MISSING.to_string()),
            status: StatusBadge::for_status(order.status.as_deref()),
            price: order
                .final_price
                .map(format_money)
                .unwrap_or_else(|| MISSING.to_string()),
            email: or_missing(order.email.as_deref()),
            issues: order.issues.clone().unwrap_or_default(),
        }
    }
}

impl fmt::Display for DashboardViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dashboard")?;
        if self.loading {
            writeln!(f, "Loading...")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "Error: {}", error)?;
        }
        if let Some(summary) = &self.summary {
            writeln!(f, "  Total Orders:    {}", summary.total_orders)?;
            writeln!(f, "  Revenue:         {}", format_money(summary.revenue))?;
            writeln!(f, "  Pending Reviews: {}", summary.pending)?;
        }
        if self.stats.is_some() {
            writeln!(f, "Stats")?;
            for (status, count) in self.status_counts() {
                writeln!(f, "  {:<20} {}", status, count)?;
            }
        }
        writeln!(f, "Recent Orders")?;
        writeln!(
            f,
            "  {:<6} {:<16} {:>6} {:<16} {:>10} {:<24} Issues",
            "ID", "Product", "Qty", "Status", "Price", "Email"
        )?;
        for row in self.rows() {
            writeln!(
                f,
                "  {:<6} {:<16} {:>6} {:<16} {:>10} {:<24} {}",
                row.id,
                row.product,
                row.quantity,
                row.status.label,
                row.price,
                row.email,
                row.issues
            )?;
        }
        Ok(())
    }
}

/// Most recent first, at most `window` rows.
pub fn recent_orders(orders: Vec<OrderRecord>, window: usize) -> Vec<OrderRecord> {
    orders.into_iter().rev().take(window).collect()
}

/// Loads the dashboard and owns its [`DashboardViewModel`].
pub struct DashboardAggregator {
    api: Arc<dyn DashboardApi>,
    orders_window: usize,
    state: ObservableState<DashboardViewModel>,
}

impl DashboardAggregator {
    /// Create an aggregator with the default window of 50 orders.
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self::with_window(api, ClientConfig::default().orders_window)
    }

    pub fn with_window(api: Arc<dyn DashboardApi>, orders_window: usize) -> Self {
        Self {
            api,
            orders_window,
            state: ObservableState::new(DashboardViewModel::default()),
        }
    }

    /// Create an aggregator backed by the HTTP client, using its configured window.
    pub fn with_client(client: Arc<EstimatorClient>) -> Self {
        let window = client.config().orders_window;
        Self::with_window(client, window)
    }

    pub fn view(&self) -> DashboardViewModel {
        self.state.get()
    }

    pub fn subscribe(&self) -> StateSubscription<DashboardViewModel> {
        self.state.subscribe()
    }

    /// Fetch all three parts concurrently and rebuild the view model.
    pub async fn load_dashboard(&self) -> DashboardViewModel {
        self.state.set(DashboardViewModel::loading());

        let joined = futures::try_join!(
            self.api.fetch_summary(),
            self.api.fetch_orders(),
            self.api.fetch_stats(),
        );

        let view = match joined {
            Ok((summary, orders, stats)) => {
                let total = orders.len();
                let orders = recent_orders(orders, self.orders_window);
                info!(total, shown = orders.len(), "Dashboard loaded");
                DashboardViewModel {
                    summary: Some(summary),
                    orders,
                    stats: Some(stats),
                    loading: false,
                    error: None,
                }
            }
            Err(err) => {
                warn!(error = %err, "Dashboard load failed");
                DashboardViewModel::failed(err.user_message())
            }
        };

        self.state.set(view.clone());
        view
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use estimator_core::{EstimatorError, OrderId, Result, SpecValue};

    use crate::presenter::DisplayCategory;

    use super::*;

    /// Which endpoint fails, and how long each one takes.
    struct FakeDashboard {
        failing: Option<&'static str>,
        delays_ms: [u64; 3],
        order_count: i64,
    }

    impl FakeDashboard {
        fn healthy(order_count: i64) -> Arc<Self> {
            Arc::new(Self {
                failing: None,
                delays_ms: [0, 0, 0],
                order_count,
            })
        }

        async fn settle(&self, index: usize, name: &'static str) -> Result<()> {
            tokio::time::sleep(Duration::from_millis(self.delays_ms[index])).await;
            if self.failing == Some(name) {
                return Err(EstimatorError::Transport {
                    message: format!("{} unavailable", name),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DashboardApi for FakeDashboard {
        async fn fetch_summary(&self) -> Result<DashboardSummary> {
            self.settle(0, "summary").await?;
            Ok(DashboardSummary {
                total_orders: self.order_count as u64,
                revenue: 1234.5,
                pending: 2,
            })
        }

        async fn fetch_orders(&self) -> Result<Vec<OrderRecord>> {
            self.settle(1, "orders").await?;
            Ok((1..=self.order_count)
                .map(|id| OrderRecord {
                    id: OrderId::Number(id),
                    product_type: Some("flyer".to_string()),
                    quantity: Some(SpecValue::from(100)),
                    status: Some("auto_approved".to_string()),
                    final_price: Some(10.0),
                    email: None,
                    issues: None,
                })
                .collect())
        }

        async fn fetch_stats(&self) -> Result<StatsByStatus> {
            self.settle(2, "stats").await?;
            Ok(StatsByStatus {
                by_status: HashMap::from([("auto_approved".to_string(), self.order_count as u64)]),
            })
        }
    }

    #[tokio::test]
    async fn test_success_windows_orders_most_recent_first() {
        let aggregator = DashboardAggregator::new(FakeDashboard::healthy(75));

        let view = aggregator.load_dashboard().await;

        assert!(!view.loading);
        assert_eq!(view.error, None);
        assert_eq!(view.orders.len(), 50);
        assert_eq!(view.orders[0].id, OrderId::Number(75));
        assert_eq!(view.orders[49].id, OrderId::Number(26));
        assert_eq!(view.summary.as_ref().unwrap().pending, 2);
        assert_eq!(view.stats.as_ref().unwrap().count_for("rejected"), 0);
        assert_eq!(aggregator.view(), view);
    }

    #[tokio::test]
    async fn test_short_list_is_only_reversed() {
        let aggregator = DashboardAggregator::new(FakeDashboard::healthy(3));
        let view = aggregator.load_dashboard().await;
        let ids: Vec<String> = view.rows().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[tokio::test]
    async fn test_any_failure_discards_everything() {
        for failing in ["summary", "orders", "stats"] {
            for delays_ms in [[0, 5, 10], [10, 5, 0], [5, 0, 10]] {
                let api = Arc::new(FakeDashboard {
                    failing: Some(failing),
                    delays_ms,
                    order_count: 5,
                });
                let view = DashboardAggregator::new(api).load_dashboard().await;

                assert!(!view.loading, "{} {:?}", failing, delays_ms);
                assert_eq!(view.summary, None);
                assert_eq!(view.stats, None);
                assert!(view.orders.is_empty());
                assert_eq!(view.error, Some(format!("{} unavailable", failing)));
            }
        }
    }

    #[tokio::test]
    async fn test_loading_flag_is_published() {
        let aggregator = DashboardAggregator::new(FakeDashboard::healthy(1));
        let mut sub = aggregator.subscribe();

        aggregator.load_dashboard().await;

        let started = sub.next().await.unwrap();
        assert!(started.current.loading);
        assert_eq!(started.current.summary, None);
        let settled = sub.next().await.unwrap();
        assert!(!settled.current.loading);
        assert!(settled.current.summary.is_some());
    }

    #[test]
    fn test_order_row_placeholders() {
        let row = OrderRow::from(&OrderRecord {
            id: OrderId::Number(4),
            product_type: None,
            quantity: None,
            status: Some("needs_review".to_string()),
            final_price: Some(88.0),
            email: Some(String::new()),
            issues: Some("missing_size,rush".to_string()),
        });
        assert_eq!(row.product, MISSING);
        assert_eq!(row.quantity, MISSING);
        assert_eq!(row.status.label, "NEEDS REVIEW");
        assert_eq!(row.price, "$88.00");
        assert_eq!(row.email, MISSING);
        assert_eq!(row.issues, "missing_size,rush");
    }

    #[test]
    fn test_order_row_shows_quantity_as_stored() {
        let row = OrderRow::from(&OrderRecord {
            id: OrderId::Number(5),
            product_type: Some("poster".to_string()),
            quantity: Some(SpecValue::from(-5)),
            status: Some("rejected".to_string()),
            final_price: None,
            email: None,
            issues: Some("invalid_quantity".to_string()),
        });
        assert_eq!(row.quantity, "-5");
        assert_eq!(row.status.category, DisplayCategory::Rejected);
    }

    #[test]
    fn test_recent_orders_window_zero() {
        let orders = vec![OrderRecord {
            id: OrderId::Number(1),
            product_type: None,
            quantity: None,
            status: None,
            final_price: None,
            email: None,
            issues: None,
        }];
        assert!(recent_orders(orders, 0).is_empty());
    }

    #[tokio::test]
    async fn test_rendered_dashboard() {
        let view = DashboardAggregator::new(FakeDashboard::healthy(2))
            .load_dashboard()
            .await;
        let text = view.to_string();
        assert!(text.contains("Revenue:         $1234.50"));
        assert!(text.contains("auto_approved"));
        assert!(text.contains("AUTO APPROVED"));
    }
}
