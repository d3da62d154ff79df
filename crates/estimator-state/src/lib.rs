//! # Estimator State
//!
//! Observable state containers. Each orchestrator owns one container and is the
//! only writer; front ends (or tests) subscribe and are notified on every
//! transition.

pub mod observable;
pub mod subscription;

pub use observable::ObservableState;
pub use subscription::{StateChangeEvent, StateSubscription};
