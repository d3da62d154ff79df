//! Order types: the customer's draft, and what intake and estimation return.
//!
//! Response types keep unknown fields in a flattened map so that nothing the
//! server sends is dropped on the way to the presenter.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::types::{DecisionKind, OrderId, SpecValue};

/// A file attached to a draft order (PDF, image, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name as shown to the user and sent to the server.
    pub file_name: String,

    /// MIME type of the content.
    pub content_type: String,

    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Create a new attachment.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Size of the content in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the attachment has no content.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// What the customer has entered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftOrder {
    /// Free-text order description.
    pub text: String,

    /// Optional uploaded file.
    pub file: Option<Attachment>,

    /// Optional customer email.
    pub email: Option<String>,
}

impl DraftOrder {
    /// Create a text-only draft.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set the customer email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attach a file.
    pub fn with_file(mut self, file: Attachment) -> Self {
        self.file = Some(file);
        self
    }

    /// A draft may be submitted when it has non-blank text or an attachment.
    pub fn can_submit(&self) -> bool {
        !self.text.trim().is_empty() || self.file.is_some()
    }

    /// The email to send, if one was entered.
    pub fn customer_email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.trim().is_empty())
    }
}

/// Result of a successful intake call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeResult {
    /// Identifier assigned by the server.
    pub order_id: OrderId,

    /// Server-normalized text (may include text extracted from the file).
    pub raw_text: String,

    /// Issues detected at intake, e.g. `low_resolution`.
    #[serde(default)]
    pub issues: Vec<String>,

    /// Email as recorded by the server.
    #[serde(default)]
    pub email: Option<String>,
}

/// JSON body of the estimation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateRequest {
    pub order_id: OrderId,
    pub raw_text: String,
    pub customer_email: Option<String>,
}

impl EstimateRequest {
    /// Build the request from an intake result, consuming it.
    pub fn new(intake: IntakeResult, customer_email: Option<String>) -> Self {
        Self {
            order_id: intake.order_id,
            raw_text: intake.raw_text,
            customer_email,
        }
    }
}

/// Structured interpretation of the order text.
///
/// The server decides whether these values make sense; a spec with a negative
/// turnaround still arrives here attached to a `rejected` decision and has to
/// be shown as such.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderSpec {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<SpecValue>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub paper_type: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<String>,

    /// Usually a list of finishing steps, sometimes a single string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finishing: Option<SpecValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turnaround_days: Option<SpecValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rush: Option<SpecValue>,

    /// Any other field the parser produced.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accept any scalar for a descriptive field; numbers and booleans become text.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Price breakdown computed by the server.
///
/// `final_price` is expected to cover the three cost components, but that is
/// the server's business and is not checked here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    /// Production process, e.g. `digital` or `offset`.
    #[serde(default)]
    pub process: String,

    pub material_cost: f64,

    pub setup_cost: f64,

    pub finishing_cost: f64,

    pub final_price: f64,

    /// Margins, surcharges and nested breakdowns.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Server-side validation verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub decision: DecisionKind,

    #[serde(default)]
    pub issues: Vec<String>,
}

/// Result of a successful estimation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    /// Echo of the order identifier, when the server includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,

    pub spec: OrderSpec,

    pub pricing: PricingBreakdown,

    pub validation: ValidationOutcome,
}
