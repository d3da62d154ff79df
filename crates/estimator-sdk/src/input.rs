//! Draft order collection.

use estimator_core::{Attachment, DraftOrder};

/// Hint shown next to a disabled submit trigger.
pub const SUBMIT_HINT: &str = "Enter text or upload a file to submit";

/// Holds the draft order for one form session.
#[derive(Debug, Clone, Default)]
pub struct InputCollector {
    draft: DraftOrder,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current draft.
    pub fn draft(&self) -> &DraftOrder {
        &self.draft
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.draft.text = text.into();
    }

    pub fn attach_file(&mut self, file: Attachment) {
        self.draft.file = Some(file);
    }

    pub fn clear_file(&mut self) {
        self.draft.file = None;
    }

    /// Set the customer email. A blank value clears it.
    pub fn set_email(&mut self, email: impl Into<String>) {
        let email = email.into();
        self.draft.email = if email.trim().is_empty() {
            None
        } else {
            Some(email)
        };
    }

    /// True when the draft has non-blank text or a file.
    pub fn can_submit(&self) -> bool {
        self.draft.can_submit()
    }

    /// Whether the submit trigger should be enabled right now.
    pub fn submit_enabled(&self, busy: bool) -> bool {
        !busy && self.can_submit()
    }

    /// Hint to show when there is nothing to submit.
    pub fn hint(&self) -> Option<&'static str> {
        (!self.can_submit()).then_some(SUBMIT_HINT)
    }

    /// Selected file name, for display.
    pub fn selected_file_name(&self) -> Option<&str> {
        self.draft.file.as_ref().map(|f| f.file_name.as_str())
    }

    /// End the form session and hand the draft over.
    pub fn into_draft(self) -> DraftOrder {
        self.draft
    }
}
