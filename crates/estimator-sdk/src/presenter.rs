//! Display mapping for estimates and order statuses.

use std::fmt;

use estimator_core::{DecisionKind, EstimateResult, PricingBreakdown};

/// Placeholder for a value the server did not provide.
pub const MISSING: &str = "—";

/// Visual category of a decision or status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayCategory {
    /// Green.
    Approved,
    /// Yellow.
    Review,
    /// Red.
    Rejected,
    /// Blue.
    Received,
    /// Grey; anything the client does not recognise.
    Neutral,
}

impl DisplayCategory {
    pub fn for_decision(decision: &DecisionKind) -> Self {
        match decision {
            DecisionKind::AutoApproved => DisplayCategory::Approved,
            DecisionKind::NeedsReview => DisplayCategory::Review,
            DecisionKind::Rejected => DisplayCategory::Rejected,
            DecisionKind::Received => DisplayCategory::Received,
            DecisionKind::Other(_) => DisplayCategory::Neutral,
        }
    }

    /// Category for a raw status string as listed on the dashboard.
    pub fn for_status(status: &str) -> Self {
        Self::for_decision(&DecisionKind::from(status))
    }
}

/// A status badge: label plus category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: String,
    pub category: DisplayCategory,
}

impl StatusBadge {
    pub fn for_decision(decision: &DecisionKind) -> Self {
        Self {
            label: badge_label(decision.as_str()),
            category: DisplayCategory::for_decision(decision),
        }
    }

    /// Badge for an optional dashboard status; a missing status is neutral.
    pub fn for_status(status: Option<&str>) -> Self {
        match status {
            Some(status) => Self::for_decision(&DecisionKind::from(status)),
            None => Self {
                label: MISSING.to_string(),
                category: DisplayCategory::Neutral,
            },
        }
    }
}

impl fmt::Display for StatusBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.label)
    }
}

fn badge_label(raw: &str) -> String {
    raw.replace('_', " ").to_uppercase()
}

/// Format an amount as dollars with two decimals.
pub fn format_money(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Price breakdown ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceCard {
    pub final_price: String,
    pub process: String,
    pub material: String,
    pub setup: String,
    pub finishing: String,
}

impl From<&PricingBreakdown> for PriceCard {
    fn from(pricing: &PricingBreakdown) -> Self {
        let process = if pricing.process.trim().is_empty() {
            MISSING.to_string()
        } else {
            pricing.process.clone()
        };
        Self {
            final_price: format_money(pricing.final_price),
            process,
            material: format_money(pricing.material_cost),
            setup: format_money(pricing.setup_cost),
            finishing: format_money(pricing.finishing_cost),
        }
    }
}

/// Everything needed to show an estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateView {
    /// "product — quantity".
    pub headline: String,

    /// "size • paper • color", skipping missing parts.
    pub details: String,

    pub badge: StatusBadge,

    /// Pretty-printed interpreted spec.
    pub spec_json: String,

    /// Validation issues; `None` when there are none, so nothing is rendered.
    pub issues: Option<Vec<String>>,

    /// Issues reported at intake (e.g. low resolution scans); `None` when empty.
    pub intake_issues: Option<Vec<String>>,

    pub price: PriceCard,
}

impl EstimateView {
    pub fn from_result(result: &EstimateResult) -> Self {
        let spec = &result.spec;

        let headline = format!(
            "{} — {}",
            spec.product_type.as_deref().unwrap_or(MISSING),
            spec.quantity
                .as_ref()
                .map(|q| q.to_string())
                .unwrap_or_else(|| MISSING.to_string())
        );

        let details = [&spec.size, &spec.paper_type, &spec.color]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .collect::<Vec<_>>()
            .join(" • ");

        Self {
            headline,
            details,
            badge: StatusBadge::for_decision(&result.validation.decision),
            spec_json: serde_json::to_string_pretty(spec).unwrap_or_default(),
            issues: non_empty(&result.validation.issues),
            intake_issues: None,
            price: PriceCard::from(&result.pricing),
        }
    }

    /// Attach issues reported at intake.
    pub fn with_intake_issues(mut self, issues: &[String]) -> Self {
        self.intake_issues = non_empty(issues);
        self
    }
}

fn non_empty(issues: &[String]) -> Option<Vec<String>> {
    (!issues.is_empty()).then(|| issues.to_vec())
}

impl fmt::Display for EstimateView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Estimation {}", self.badge)?;
        writeln!(f, "  Product:   {}", self.headline)?;
        if !self.details.is_empty() {
            writeln!(f, "  Details:   {}", self.details)?;
        }
        if let Some(issues) = &self.issues {
            writeln!(f, "  Issues:    {}", issues.join(", "))?;
        }
        if let Some(issues) = &self.intake_issues {
            writeln!(f, "  Intake:    {}", issues.join(", "))?;
        }
        writeln!(f, "Price")?;
        writeln!(f, "  Final:     {}", self.price.final_price)?;
        writeln!(f, "  Process:   {}", self.price.process)?;
        writeln!(f, "  Material:  {}", self.price.material)?;
        writeln!(f, "  Setup:     {}", self.price.setup)?;
        writeln!(f, "  Finishing: {}", self.price.finishing)?;
        writeln!(f, "Spec")?;
        for line in self.spec_json.lines() {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}
