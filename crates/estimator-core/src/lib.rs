//! # Estimator Core
//!
//! Core types shared by the print estimator client.
//!
//! This crate provides the fundamental building blocks:
//! - [`DraftOrder`] - What the customer typed or attached
//! - [`IntakeResult`] / [`EstimateResult`] - What the backend returned
//! - [`DecisionKind`] - Server-side validation outcome, open to future values
//! - [`ClientConfig`] - Where the backend lives and how long to wait for it
//! - [`EstimatorError`] - Error taxonomy for every network call

pub mod config;
pub mod dashboard;
pub mod error;
pub mod order;
pub mod types;

// Re-exports for convenience
pub use config::ClientConfig;
pub use dashboard::{DashboardSummary, HealthStatus, OrderRecord, OrderStatus, StatsByStatus};
pub use error::{EstimatorError, Result};
pub use order::{
    Attachment, DraftOrder, EstimateRequest, EstimateResult, IntakeResult, OrderSpec,
    PricingBreakdown, ValidationOutcome,
};
pub use types::*;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::ClientConfig;
    pub use crate::dashboard::{DashboardSummary, OrderRecord, StatsByStatus};
    pub use crate::error::{EstimatorError, Result};
    pub use crate::order::{
        Attachment, DraftOrder, EstimateResult, IntakeResult, OrderSpec, PricingBreakdown,
        ValidationOutcome,
    };
    pub use crate::types::{DecisionKind, OrderId, SpecValue, SubmissionState};
}
