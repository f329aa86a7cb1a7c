//! Caller-facing collaborator traits.
//!
//! Any front end (terminal, GUI, scripted harness) answers confirmations and
//! text prompts through [`ConfirmationPort`] and receives finished runs
//! through [`ReportSink`]. The core never depends on a presentation layer.

use crate::engine::RunOutcome;
use crate::error::DistributionError;

/// Interactive decisions the engine defers to the caller
pub trait ConfirmationPort {
    /// Yes/no decision on a rendered preview or warning
    fn confirm(&self, message: &str) -> bool;

    /// Free-text input; `None` means the caller withdrew
    fn prompt_text(&self, message: &str, default: Option<&str>) -> Option<String>;
}

/// Receives finished (or cancelled) runs for rendering and storage
pub trait ReportSink {
    fn record(&self, outcome: &RunOutcome) -> Result<(), DistributionError>;
}

/// Approves everything; prompts resolve to their default.
///
/// Used for scripted runs (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl ConfirmationPort for AutoApprove {
    fn confirm(&self, message: &str) -> bool {
        tracing::debug!(message, "Auto-approved");
        true
    }

    fn prompt_text(&self, _message: &str, default: Option<&str>) -> Option<String> {
        default.map(str::to_string)
    }
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn record(&self, _outcome: &RunOutcome) -> Result<(), DistributionError> {
        Ok(())
    }
}
