//! Finding data models for PlanSentry.
//!
//! A finding is a single AI-identified issue in a plan document, carrying a
//! severity, a verbatim source snippet quoted from the document, and a
//! recommendation. Findings are created in bulk when a report is produced
//! and individually resolved or dismissed afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Severity levels for findings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory issue worth reviewing.
    Warning,
    /// Blocking issue that must be addressed.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "Warning"),
            Severity::Critical => write!(f, "Critical"),
        }
    }
}

/// Lifecycle status of a finding.
///
/// `Resolved` and `Dismissed` are terminal: no public operation transitions
/// a finding back to `Active`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    /// Open and awaiting user action.
    Active,
    /// Addressed (manually or by an accepted enhancement).
    Resolved,
    /// Rejected by the user with a feedback reason.
    Dismissed,
}

impl std::fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingStatus::Active => write!(f, "Active"),
            FindingStatus::Resolved => write!(f, "Resolved"),
            FindingStatus::Dismissed => write!(f, "Dismissed"),
        }
    }
}

/// Errors raised by finding status transitions.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FindingError {
    /// The finding is already resolved or dismissed.
    #[error("Finding {id} is already {status}, cannot transition")]
    AlreadyClosed { id: Uuid, status: FindingStatus },
}

/// A single AI-identified issue in a plan document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Unique identifier for this finding.
    pub id: Uuid,
    /// Short title describing the issue.
    pub title: String,
    /// Severity of the issue.
    pub severity: Severity,
    /// Verbatim snippet quoted from the owning report's document content.
    /// The AI is instructed to quote exactly; the highlighter degrades to
    /// no highlight when it does not.
    pub source_snippet: String,
    /// Recommended remediation.
    pub recommendation: String,
    /// Current lifecycle status.
    pub status: FindingStatus,
}

impl Finding {
    /// Creates a new active finding.
    pub fn new(
        title: impl Into<String>,
        severity: Severity,
        source_snippet: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            severity,
            source_snippet: source_snippet.into(),
            recommendation: recommendation.into(),
            status: FindingStatus::Active,
        }
    }

    /// Returns true if the finding is still open.
    pub fn is_active(&self) -> bool {
        self.status == FindingStatus::Active
    }

    /// Marks the finding as resolved.
    ///
    /// Fails if the finding is not active; resolved and dismissed are
    /// terminal states.
    pub fn resolve(&mut self) -> Result<(), FindingError> {
        self.transition(FindingStatus::Resolved)
    }

    /// Marks the finding as dismissed.
    pub fn dismiss(&mut self) -> Result<(), FindingError> {
        self.transition(FindingStatus::Dismissed)
    }

    fn transition(&mut self, to: FindingStatus) -> Result<(), FindingError> {
        if self.status != FindingStatus::Active {
            return Err(FindingError::AlreadyClosed {
                id: self.id,
                status: self.status,
            });
        }
        self.status = to;
        Ok(())
    }
}

/// Rollup of finding counts for a report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FindingSummary {
    /// Number of critical findings.
    pub critical: usize,
    /// Number of warning findings.
    pub warning: usize,
    /// Total number of checks (findings) produced.
    pub checks: usize,
}

impl FindingSummary {
    /// Computes the summary over a slice of findings.
    pub fn from_findings(findings: &[Finding]) -> Self {
        let critical = findings
            .iter()
            .filter(|f| f.severity == Severity::Critical)
            .count();
        let warning = findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count();
        Self {
            critical,
            warning,
            checks: findings.len(),
        }
    }
}
