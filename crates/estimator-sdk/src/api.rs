//! Seams between the workflows and the backend.
//!
//! The orchestrator and the aggregator only see these traits, so tests can
//! swap in fakes and count calls.

use async_trait::async_trait;
use estimator_core::{
    DashboardSummary, DraftOrder, EstimateResult, IntakeResult, OrderRecord, Result,
    StatsByStatus,
};

/// Registers a raw submission with the backend.
#[async_trait]
pub trait IntakeApi: Send + Sync {
    /// Send text, optional file and optional email; get back the normalized order.
    async fn submit_intake(&self, draft: &DraftOrder) -> Result<IntakeResult>;
}

/// Turns normalized order data into a priced, validated spec.
#[async_trait]
pub trait EstimateApi: Send + Sync {
    /// Estimate the order registered by `intake`. The intake result is consumed.
    async fn submit_estimate(
        &self,
        intake: IntakeResult,
        customer_email: Option<String>,
    ) -> Result<EstimateResult>;
}

/// The three dashboard endpoints.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn fetch_summary(&self) -> Result<DashboardSummary>;

    /// All orders, oldest first.
    async fn fetch_orders(&self) -> Result<Vec<OrderRecord>>;

    async fn fetch_stats(&self) -> Result<StatsByStatus>;
}
