//! # Estimator SDK
//!
//! Client SDK for the print estimator backend.
//!
//! - [`EstimatorClient`] talks HTTP to the backend
//! - [`InputCollector`] holds the draft and decides whether it may be submitted
//! - [`SubmissionOrchestrator`] runs intake then estimation and owns the submission state
//! - [`EstimateView`] turns an estimate into display-ready parts
//! - [`DashboardAggregator`] loads the three dashboard endpoints as one view

pub mod api;
pub mod client;
pub mod dashboard;
pub mod input;
pub mod orchestrator;
pub mod presenter;

pub use api::{DashboardApi, EstimateApi, IntakeApi};
pub use client::EstimatorClient;
pub use dashboard::{DashboardAggregator, DashboardViewModel, OrderRow};
pub use input::InputCollector;
pub use orchestrator::{IntakeReceipt, SubmissionOrchestrator};
pub use presenter::{DisplayCategory, EstimateView, PriceCard, StatusBadge};

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::api::{DashboardApi, EstimateApi, IntakeApi};
    pub use crate::client::EstimatorClient;
    pub use crate::dashboard::{DashboardAggregator, DashboardViewModel};
    pub use crate::input::InputCollector;
    pub use crate::orchestrator::SubmissionOrchestrator;
    pub use crate::presenter::{DisplayCategory, EstimateView};
    pub use estimator_core::prelude::*;
    pub use estimator_state::{StateChangeEvent, StateSubscription};
}
