//! Common types used across the print estimator client.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::order::EstimateResult;

/// Opaque order identifier assigned by the intake endpoint.
///
/// The backend currently hands out integers, but nothing on the client side
/// depends on that, so strings are accepted as well and echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderId {
    /// Numeric identifier (database primary key).
    Number(i64),
    /// Any other identifier form.
    Text(String),
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderId::Number(n) => write!(f, "{}", n),
            OrderId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for OrderId {
    fn from(n: i64) -> Self {
        OrderId::Number(n)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        OrderId::Text(s.to_string())
    }
}

/// A spec value exactly as the server sent it.
///
/// Parsed specs come from a language model and are checked by the server, not
/// here: a quantity may arrive as `"250"` or `250.0`, a turnaround as `-2` or
/// `"3 days"`. Any JSON value is accepted and rendered as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecValue(pub Value);

impl SpecValue {
    /// The value as an integer, if it is a whole number.
    pub fn as_i64(&self) -> Option<i64> {
        match &self.0 {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            _ => None,
        }
    }
}

impl fmt::Display for SpecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", SpecValue(item.clone()))?;
                }
                Ok(())
            }
            other => write!(f, "{}", other),
        }
    }
}

impl From<Value> for SpecValue {
    fn from(value: Value) -> Self {
        SpecValue(value)
    }
}

impl From<i64> for SpecValue {
    fn from(n: i64) -> Self {
        SpecValue(Value::from(n))
    }
}

impl From<&str> for SpecValue {
    fn from(s: &str) -> Self {
        SpecValue(Value::from(s))
    }
}

/// Categorical outcome of server-side validation.
///
/// Decision kinds evolve on the server independently of this client, so any
/// value not listed here is kept as [`DecisionKind::Other`] instead of failing
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DecisionKind {
    /// Order passed every automatic check.
    AutoApproved,
    /// A human has to look at the order.
    NeedsReview,
    /// Order cannot be produced as described.
    Rejected,
    /// Order was registered but not yet evaluated.
    Received,
    /// A decision kind this client does not know about.
    Other(String),
}

impl DecisionKind {
    /// Wire representation of the decision.
    pub fn as_str(&self) -> &str {
        match self {
            DecisionKind::AutoApproved => "auto_approved",
            DecisionKind::NeedsReview => "needs_review",
            DecisionKind::Rejected => "rejected",
            DecisionKind::Received => "received",
            DecisionKind::Other(raw) => raw,
        }
    }

    /// Returns true if the value is one of the known decision kinds.
    pub fn is_known(&self) -> bool {
        !matches!(self, DecisionKind::Other(_))
    }
}

impl From<String> for DecisionKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "auto_approved" => DecisionKind::AutoApproved,
            "needs_review" => DecisionKind::NeedsReview,
            "rejected" => DecisionKind::Rejected,
            "received" => DecisionKind::Received,
            _ => DecisionKind::Other(raw),
        }
    }
}

impl From<&str> for DecisionKind {
    fn from(raw: &str) -> Self {
        DecisionKind::from(raw.to_string())
    }
}

impl From<DecisionKind> for String {
    fn from(kind: DecisionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one submission attempt, owned by the submission orchestrator.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// Intake or estimation in flight.
    Submitting,
    /// Estimation returned a result.
    Succeeded(EstimateResult),
    /// Intake or estimation failed; carries the display message.
    Failed(String),
}

impl SubmissionState {
    /// Returns true if this is a terminal state for the attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Succeeded(_) | SubmissionState::Failed(_)
        )
    }

    /// Returns true while a request is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionState::Submitting)
    }

    /// The result, if the attempt succeeded.
    pub fn result(&self) -> Option<&EstimateResult> {
        match self {
            SubmissionState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    /// The error message, if the attempt failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            SubmissionState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Succeeded(_) => "succeeded",
            SubmissionState::Failed(_) => "failed",
        }
    }
}
