// ─── Terms Gate ───
// One confirmation dialog per process. A download for an item with terms
// text is parked here until the user ticks the acknowledgment box.

use serde::Serialize;
use tracing::info;

use crate::core::error::{ManagerError, ManagerResult};

pub const DEFAULT_TERMS_TITLE: &str = "利用規約";

/// What the dialog shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermsPrompt {
    pub title: String,
    pub body: String,
    pub agreed: bool,
}

/// Result of asking the gate to run an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision<A> {
    /// No terms to accept; run the action now.
    Proceed(A),
    /// The dialog is open and holds the action.
    AwaitingConsent,
}

#[derive(Debug)]
struct OpenDialog<A> {
    prompt: TermsPrompt,
    pending: A,
}

#[derive(Debug)]
pub struct TermsGate<A> {
    dialog: Option<OpenDialog<A>>,
}

impl<A> Default for TermsGate<A> {
    fn default() -> Self {
        Self { dialog: None }
    }
}

impl<A> TermsGate<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate `action` behind `terms`. Blank or absent terms let it through.
    /// A newly opened dialog replaces any pending one and starts unchecked.
    pub fn request(&mut self, terms: Option<&str>, action: A) -> GateDecision<A> {
        match terms.map(str::trim).filter(|t| !t.is_empty()) {
            None => GateDecision::Proceed(action),
            Some(body) => {
                self.dialog = Some(OpenDialog {
                    prompt: TermsPrompt {
                        title: DEFAULT_TERMS_TITLE.to_string(),
                        body: body.to_string(),
                        agreed: false,
                    },
                    pending: action,
                });
                GateDecision::AwaitingConsent
            }
        }
    }

    pub fn prompt(&self) -> Option<&TermsPrompt> {
        self.dialog.as_ref().map(|d| &d.prompt)
    }

    pub fn is_open(&self) -> bool {
        self.dialog.is_some()
    }

    /// Tick or untick the acknowledgment box.
    pub fn set_agreed(&mut self, agreed: bool) -> ManagerResult<()> {
        let dialog = self.dialog.as_mut().ok_or(ManagerError::NoPendingTerms)?;
        dialog.prompt.agreed = agreed;
        Ok(())
    }

    /// Close the dialog and hand back the parked action. Refused, with the
    /// dialog left open, until the box is ticked.
    pub fn confirm(&mut self) -> ManagerResult<A> {
        match &self.dialog {
            None => Err(ManagerError::NoPendingTerms),
            Some(d) if !d.prompt.agreed => Err(ManagerError::TermsNotAccepted),
            Some(_) => {
                let dialog = self.dialog.take().ok_or(ManagerError::NoPendingTerms)?;
                info!("Terms accepted");
                Ok(dialog.pending)
            }
        }
    }

    /// Close without running the action.
    pub fn dismiss(&mut self) {
        self.dialog = None;
    }
}
