//! Workspace and membership models for PlanSentry.
//!
//! A workspace is the tenant boundary: it owns members, reports, knowledge
//! sources, dismissal rules, and an audit trail. Authorization is a single
//! pure function, [`Role::can`], shared by UI gating and the store's
//! mutation entry points so there is exactly one source of permission
//! truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Membership roles within a workspace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full control: membership, workspace settings, deletion.
    Administrator,
    /// Governs risk knowledge sources; reviews reports.
    RiskOfficer,
    /// Governs strategy knowledge sources; reviews reports.
    StrategyOfficer,
    /// Compliance officer: uploads and reviews reports.
    Member,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Administrator => write!(f, "Administrator"),
            Role::RiskOfficer => write!(f, "Risk Management Officer"),
            Role::StrategyOfficer => write!(f, "Strategy Officer"),
            Role::Member => write!(f, "Compliance Officer"),
        }
    }
}

/// Every gated operation in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkspaceAction {
    /// Invite a new member.
    InviteMember,
    /// Remove an existing member.
    RemoveMember,
    /// Change another member's role.
    ChangeMemberRole,
    /// Rename the workspace.
    RenameWorkspace,
    /// Archive the workspace.
    ArchiveWorkspace,
    /// Delete the workspace and all its collections.
    DeleteWorkspace,
    /// Upload a document and run analysis.
    UploadReport,
    /// Resolve or dismiss findings, run the enhancement cycle.
    ReviewReport,
    /// Archive, restore, or delete reports.
    ManageReports,
    /// Add knowledge sources.
    AddKnowledgeSource,
    /// Delete a dismissal rule.
    DeleteDismissalRule,
    /// Replace the workspace's custom regulation texts.
    EditCustomRegulations,
}

impl Role {
    /// The single authorization gate: can this role perform this action?
    pub fn can(&self, action: WorkspaceAction) -> bool {
        use WorkspaceAction::*;
        match action {
            InviteMember | RemoveMember | ChangeMemberRole | RenameWorkspace
            | ArchiveWorkspace | DeleteWorkspace | DeleteDismissalRule
            | EditCustomRegulations => matches!(self, Role::Administrator),
            UploadReport | ReviewReport | ManageReports | AddKnowledgeSource => true,
        }
    }
}

/// Status of a workspace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceStatus {
    Active,
    Archived,
}

/// Status of a workspace member.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Invitation accepted.
    Active,
    /// Invited but not yet accepted.
    Pending,
}

/// A tenant boundary containing members, reports, and audit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Identity of the creating user.
    pub creator_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Current status.
    pub status: WorkspaceStatus,
}

impl Workspace {
    /// Creates an active workspace.
    pub fn new(name: impl Into<String>, creator_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            creator_id: creator_id.into(),
            created_at: Utc::now(),
            status: WorkspaceStatus::Active,
        }
    }
}

/// One member of a workspace, keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceMember {
    /// Member email; identity within the workspace.
    pub email: String,
    /// Assigned role.
    pub role: Role,
    /// Invitation status.
    pub status: MemberStatus,
}

impl WorkspaceMember {
    /// Creates an active member.
    pub fn active(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
            status: MemberStatus::Active,
        }
    }

    /// Creates a pending (invited) member.
    pub fn pending(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
            status: MemberStatus::Pending,
        }
    }

    /// True for an active administrator.
    pub fn is_active_admin(&self) -> bool {
        self.role == Role::Administrator && self.status == MemberStatus::Active
    }
}

/// Counts the active administrators in a membership list.
///
/// A workspace must always retain at least one; removal and role-change
/// operations that would drop this to zero must be rejected.
pub fn active_admin_count(members: &[WorkspaceMember]) -> usize {
    members.iter().filter(|m| m.is_active_admin()).count()
}
