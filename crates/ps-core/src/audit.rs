//! Audit trail types for PlanSentry.
//!
//! Every successful mutating operation appends exactly one entry to the
//! owning workspace's audit log. Entries are append-only and ordered
//! newest-first; they are never edited or deleted individually, only
//! wholesale when the workspace itself is deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actions recorded in the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    WorkspaceCreated,
    WorkspaceRenamed,
    WorkspaceArchived,
    MemberInvited,
    MemberRemoved,
    MemberRoleChanged,
    ReportCreated,
    ReportArchived,
    ReportRestored,
    ReportDeleted,
    FindingResolved,
    FindingDismissed,
    EnhancementAccepted,
    EnhancementDiscarded,
    KnowledgeSourceAdded,
    KnowledgeSourceDeleted,
    DismissalRuleDeleted,
    CustomRegulationsUpdated,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AuditAction::WorkspaceCreated => "Workspace Created",
            AuditAction::WorkspaceRenamed => "Workspace Renamed",
            AuditAction::WorkspaceArchived => "Workspace Archived",
            AuditAction::MemberInvited => "Member Invited",
            AuditAction::MemberRemoved => "Member Removed",
            AuditAction::MemberRoleChanged => "Member Role Changed",
            AuditAction::ReportCreated => "Report Created",
            AuditAction::ReportArchived => "Report Archived",
            AuditAction::ReportRestored => "Report Restored",
            AuditAction::ReportDeleted => "Report Deleted",
            AuditAction::FindingResolved => "Finding Resolved",
            AuditAction::FindingDismissed => "Finding Dismissed",
            AuditAction::EnhancementAccepted => "Enhancement Accepted",
            AuditAction::EnhancementDiscarded => "Enhancement Discarded",
            AuditAction::KnowledgeSourceAdded => "Knowledge Source Added",
            AuditAction::KnowledgeSourceDeleted => "Knowledge Source Deleted",
            AuditAction::DismissalRuleDeleted => "Dismissal Rule Deleted",
            AuditAction::CustomRegulationsUpdated => "Custom Regulations Updated",
        };
        write!(f, "{name}")
    }
}

/// Structured detail payload for an audit entry.
///
/// A tagged union instead of a free-form string, so entries that reference
/// a report carry the id as data rather than as pseudo-JSON the UI has to
/// probe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditDetails {
    /// A human-readable message with no linked entity.
    Plain { text: String },
    /// A message linked to a specific report.
    Linked { text: String, report_id: Uuid },
}

impl AuditDetails {
    /// Creates a plain detail message.
    pub fn plain(text: impl Into<String>) -> Self {
        AuditDetails::Plain { text: text.into() }
    }

    /// Creates a detail message linked to a report.
    pub fn linked(text: impl Into<String>, report_id: Uuid) -> Self {
        AuditDetails::Linked {
            text: text.into(),
            report_id,
        }
    }

    /// The human-readable message regardless of variant.
    pub fn text(&self) -> &str {
        match self {
            AuditDetails::Plain { text } => text,
            AuditDetails::Linked { text, .. } => text,
        }
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique identifier.
    pub id: Uuid,
    /// When the action happened.
    pub timestamp: DateTime<Utc>,
    /// Email of the acting user.
    pub user_email: String,
    /// The action performed.
    pub action: AuditAction,
    /// Structured detail payload.
    pub details: AuditDetails,
}

impl AuditEntry {
    /// Creates a new audit entry stamped now.
    pub fn new(user_email: impl Into<String>, action: AuditAction, details: AuditDetails) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            user_email: user_email.into(),
            action,
            details,
        }
    }
}
