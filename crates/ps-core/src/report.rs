//! Analysis report model and lifecycle state machine for PlanSentry.
//!
//! A report owns one document's analysis: the extracted content, the AI
//! findings, and the enhancement (auto-fix) cycle. The lifecycle is an
//! explicit phase machine with guarded transitions, so states like
//! "enhancing while diffing" are unrepresentable:
//!
//! ```text
//! Uploading -> Analyzing -> Active -> Enhancing -> Diffing -> Active
//! ```
//!
//! `document_content` is the single source of truth for the document body.
//! `diff_content`, when present, is a transient overlay holding an
//! unreviewed AI revision: it is either accepted (replaces the content and
//! is cleared) or discarded (cleared, content untouched). It never coexists
//! with a committed change.
//!
//! Edits to report content and finding status are last-write-wins on the
//! whole report object; there is no field-level merge. Only one editor is
//! active per report in practice, so concurrent-session races are a
//! documented limitation rather than a handled case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::diff::{diff_lines, DiffSegment};
use crate::finding::{Finding, FindingError, FindingStatus, FindingSummary, Severity};

/// Lifecycle phase of a report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReportPhase {
    /// Document uploaded, text extraction pending.
    Uploading,
    /// External analysis call in flight.
    Analyzing,
    /// Findings populated, open for review.
    Active,
    /// External enhancement call in flight.
    Enhancing,
    /// An AI revision awaits accept/discard review.
    Diffing,
}

impl std::fmt::Display for ReportPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportPhase::Uploading => write!(f, "Uploading"),
            ReportPhase::Analyzing => write!(f, "Analyzing"),
            ReportPhase::Active => write!(f, "Active"),
            ReportPhase::Enhancing => write!(f, "Enhancing"),
            ReportPhase::Diffing => write!(f, "Diffing"),
        }
    }
}

/// Archival status, orthogonal to the lifecycle phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Shown in the default dashboard listing.
    Active,
    /// Hidden from the default listing but retrievable; reversible.
    Archived,
}

/// Per-category analysis scores (0-100).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryScores {
    /// Project feasibility score.
    pub project: u8,
    /// Alignment with strategic goals.
    pub strategic_goals: u8,
    /// Regulatory compliance score.
    pub regulations: u8,
    /// Risk posture score.
    pub risk: u8,
}

/// Errors raised by report lifecycle operations.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The requested transition is not valid from the current phase.
    #[error("Invalid report transition from {from} to {to}")]
    InvalidPhase { from: ReportPhase, to: ReportPhase },

    /// The report is archived and cannot be mutated.
    #[error("Report {0} is archived")]
    Archived(Uuid),

    /// No finding with the given id exists on this report.
    #[error("Finding not found: {0}")]
    FindingNotFound(Uuid),

    /// A finding status transition failed.
    #[error(transparent)]
    Finding(#[from] FindingError),
}

/// One document's analysis report, owned by exactly one workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Unique identifier for this report.
    pub id: Uuid,
    /// Owning workspace.
    pub workspace_id: Uuid,
    /// Report title, usually the uploaded filename.
    pub title: String,
    /// Aggregate 0-100 resilience score from the AI analysis.
    pub resilience_score: u8,
    /// Per-category scores, absent for synthetic error reports.
    pub scores: Option<CategoryScores>,
    /// Findings produced by the analysis.
    pub findings: Vec<Finding>,
    /// Rollup of finding counts.
    pub summary: FindingSummary,
    /// The document body; single source of truth.
    pub document_content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Archival status.
    pub status: ReportStatus,
    /// Unreviewed AI revision awaiting accept/discard, if any.
    pub diff_content: Option<String>,
    /// Current lifecycle phase.
    pub phase: ReportPhase,
}

impl AnalysisReport {
    /// Creates a report in the `Uploading` phase.
    pub fn uploading(workspace_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            title: title.into(),
            resilience_score: 0,
            scores: None,
            findings: Vec::new(),
            summary: FindingSummary::default(),
            document_content: String::new(),
            created_at: Utc::now(),
            status: ReportStatus::Active,
            diff_content: None,
            phase: ReportPhase::Uploading,
        }
    }

    /// Creates a synthetic error report for a failed extraction or
    /// analysis. An upload attempt must always leave the user with a
    /// viewable report object, so the failure becomes a single critical
    /// finding instead of an unhandled error.
    pub fn failed(
        workspace_id: Uuid,
        title: impl Into<String>,
        document_content: impl Into<String>,
        error_message: &str,
    ) -> Self {
        let finding = Finding::new(
            "Analysis failed",
            Severity::Critical,
            "",
            format!("The document could not be analyzed: {error_message}. Try again."),
        );
        let summary = FindingSummary::from_findings(std::slice::from_ref(&finding));
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            title: title.into(),
            resilience_score: 0,
            scores: None,
            findings: vec![finding],
            summary,
            document_content: document_content.into(),
            created_at: Utc::now(),
            status: ReportStatus::Active,
            diff_content: None,
            phase: ReportPhase::Active,
        }
    }

    /// Findings still open for review.
    pub fn active_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_active())
    }

    /// Records the extracted document text and moves to `Analyzing`.
    pub fn begin_analysis(&mut self, document_content: String) -> Result<(), ReportError> {
        self.guard(ReportPhase::Uploading, ReportPhase::Analyzing)?;
        self.document_content = document_content;
        self.phase = ReportPhase::Analyzing;
        Ok(())
    }

    /// Populates analysis results and moves to `Active`.
    pub fn complete_analysis(
        &mut self,
        resilience_score: u8,
        scores: Option<CategoryScores>,
        findings: Vec<Finding>,
    ) -> Result<(), ReportError> {
        self.guard(ReportPhase::Analyzing, ReportPhase::Active)?;
        self.summary = FindingSummary::from_findings(&findings);
        self.resilience_score = resilience_score;
        self.scores = scores;
        self.findings = findings;
        self.phase = ReportPhase::Active;
        info!(report_id = %self.id, checks = self.summary.checks, "analysis complete");
        Ok(())
    }

    /// Starts the auto-enhance cycle.
    pub fn begin_enhancement(&mut self) -> Result<(), ReportError> {
        self.ensure_not_archived()?;
        self.guard(ReportPhase::Active, ReportPhase::Enhancing)?;
        self.phase = ReportPhase::Enhancing;
        Ok(())
    }

    /// Stores the AI revision and moves to `Diffing` for review.
    pub fn complete_enhancement(&mut self, revised: String) -> Result<(), ReportError> {
        self.guard(ReportPhase::Enhancing, ReportPhase::Diffing)?;
        self.diff_content = Some(revised);
        self.phase = ReportPhase::Diffing;
        Ok(())
    }

    /// Abandons an in-flight enhancement after a service failure, leaving
    /// the document untouched.
    pub fn abort_enhancement(&mut self) -> Result<(), ReportError> {
        self.guard(ReportPhase::Enhancing, ReportPhase::Active)?;
        self.diff_content = None;
        self.phase = ReportPhase::Active;
        Ok(())
    }

    /// Line diff between the current content and the pending revision.
    /// Only available while `Diffing`.
    pub fn diff_segments(&self) -> Option<Vec<DiffSegment>> {
        match (&self.phase, &self.diff_content) {
            (ReportPhase::Diffing, Some(revised)) => {
                Some(diff_lines(&self.document_content, revised))
            }
            _ => None,
        }
    }

    /// Accepts the pending revision: the revised text becomes the document
    /// content, all open findings are marked resolved, and the overlay is
    /// cleared.
    pub fn accept_enhancement(&mut self) -> Result<(), ReportError> {
        self.guard(ReportPhase::Diffing, ReportPhase::Active)?;
        if let Some(revised) = self.diff_content.take() {
            self.document_content = revised;
        }
        for finding in self.findings.iter_mut().filter(|f| f.is_active()) {
            finding.resolve()?;
        }
        self.phase = ReportPhase::Active;
        info!(report_id = %self.id, "enhancement accepted");
        Ok(())
    }

    /// Discards the pending revision; content and findings are untouched.
    pub fn discard_enhancement(&mut self) -> Result<(), ReportError> {
        self.guard(ReportPhase::Diffing, ReportPhase::Active)?;
        self.diff_content = None;
        self.phase = ReportPhase::Active;
        info!(report_id = %self.id, "enhancement discarded");
        Ok(())
    }

    /// Marks one finding resolved. Only valid while `Active`.
    pub fn resolve_finding(&mut self, finding_id: Uuid) -> Result<(), ReportError> {
        self.guard(ReportPhase::Active, ReportPhase::Active)?;
        self.finding_mut(finding_id)?.resolve()?;
        Ok(())
    }

    /// Marks one finding dismissed. Only valid while `Active`. The caller
    /// is responsible for recording the dismissal reason as a rule.
    pub fn dismiss_finding(&mut self, finding_id: Uuid) -> Result<(), ReportError> {
        self.guard(ReportPhase::Active, ReportPhase::Active)?;
        self.finding_mut(finding_id)?.dismiss()?;
        Ok(())
    }

    /// Hides the report from the default listing.
    pub fn archive(&mut self) -> Result<(), ReportError> {
        self.guard(ReportPhase::Active, ReportPhase::Active)?;
        self.status = ReportStatus::Archived;
        Ok(())
    }

    /// Returns an archived report to the default listing.
    pub fn restore(&mut self) {
        self.status = ReportStatus::Active;
    }

    fn finding_mut(&mut self, finding_id: Uuid) -> Result<&mut Finding, ReportError> {
        self.findings
            .iter_mut()
            .find(|f| f.id == finding_id)
            .ok_or(ReportError::FindingNotFound(finding_id))
    }

    fn ensure_not_archived(&self) -> Result<(), ReportError> {
        if self.status == ReportStatus::Archived {
            return Err(ReportError::Archived(self.id));
        }
        Ok(())
    }

    fn guard(&self, expected: ReportPhase, to: ReportPhase) -> Result<(), ReportError> {
        if self.phase != expected {
            return Err(ReportError::InvalidPhase {
                from: self.phase,
                to,
            });
        }
        Ok(())
    }
}
