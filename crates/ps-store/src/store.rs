//! Persistence trait for workspace collections.
//!
//! The backing store is a per-workspace blob layout: each collection is
//! read and written whole. Mutations are therefore read-modify-write of an
//! entire collection with last-write-wins semantics; concurrent-session
//! merge is a documented non-goal. Reports additionally expose a
//! per-report delete so bulk deletion can fan out individual calls.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use ps_core::audit::AuditEntry;
use ps_core::dismissal::DismissalRule;
use ps_core::knowledge::KnowledgeSource;
use ps_core::report::AnalysisReport;
use ps_core::workspace::{Workspace, WorkspaceMember};

/// Errors raised by store operations.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The requested workspace or item does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backing store is unreachable or rejected the call.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A collection could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Whole-collection persistence for one workspace per collection.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    /// All workspaces in the store.
    async fn list_workspaces(&self) -> StoreResult<Vec<Workspace>>;

    /// One workspace's metadata.
    async fn get_workspace(&self, workspace_id: Uuid) -> StoreResult<Workspace>;

    /// Creates or replaces a workspace's metadata.
    async fn put_workspace(&self, workspace: Workspace) -> StoreResult<()>;

    /// Deletes a workspace and every collection it owns.
    async fn delete_workspace(&self, workspace_id: Uuid) -> StoreResult<()>;

    /// The workspace's membership list.
    async fn get_members(&self, workspace_id: Uuid) -> StoreResult<Vec<WorkspaceMember>>;

    /// Replaces the workspace's membership list.
    async fn set_members(
        &self,
        workspace_id: Uuid,
        members: Vec<WorkspaceMember>,
    ) -> StoreResult<()>;

    /// The workspace's reports.
    async fn get_reports(&self, workspace_id: Uuid) -> StoreResult<Vec<AnalysisReport>>;

    /// Replaces the workspace's reports.
    async fn set_reports(
        &self,
        workspace_id: Uuid,
        reports: Vec<AnalysisReport>,
    ) -> StoreResult<()>;

    /// Deletes a single report. Used by bulk deletion, which fans out one
    /// call per report instead of rewriting the collection.
    async fn delete_report(&self, workspace_id: Uuid, report_id: Uuid) -> StoreResult<()>;

    /// The workspace's audit log, newest first.
    async fn get_audit_log(&self, workspace_id: Uuid) -> StoreResult<Vec<AuditEntry>>;

    /// Replaces the workspace's audit log.
    async fn set_audit_log(&self, workspace_id: Uuid, entries: Vec<AuditEntry>) -> StoreResult<()>;

    /// The workspace's knowledge sources.
    async fn get_knowledge_sources(&self, workspace_id: Uuid) -> StoreResult<Vec<KnowledgeSource>>;

    /// Replaces the workspace's knowledge sources.
    async fn set_knowledge_sources(
        &self,
        workspace_id: Uuid,
        sources: Vec<KnowledgeSource>,
    ) -> StoreResult<()>;

    /// The workspace's dismissal rules.
    async fn get_dismissal_rules(&self, workspace_id: Uuid) -> StoreResult<Vec<DismissalRule>>;

    /// Replaces the workspace's dismissal rules.
    async fn set_dismissal_rules(
        &self,
        workspace_id: Uuid,
        rules: Vec<DismissalRule>,
    ) -> StoreResult<()>;

    /// The workspace's custom regulation texts.
    async fn get_custom_regulations(&self, workspace_id: Uuid) -> StoreResult<Vec<String>>;

    /// Replaces the workspace's custom regulation texts.
    async fn set_custom_regulations(
        &self,
        workspace_id: Uuid,
        regulations: Vec<String>,
    ) -> StoreResult<()>;
}
