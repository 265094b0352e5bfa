//! In-memory store implementation.
//!
//! The test double for the production blob store, in the same shape as
//! the real thing: one record per workspace holding every collection.
//! Fault injection hooks let tests script write and delete failures for
//! the partial-batch scenarios.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use ps_core::audit::AuditEntry;
use ps_core::dismissal::DismissalRule;
use ps_core::knowledge::KnowledgeSource;
use ps_core::report::AnalysisReport;
use ps_core::workspace::{Workspace, WorkspaceMember};

use crate::store::{StoreError, StoreResult, WorkspaceStore};

/// Every collection owned by one workspace.
#[derive(Debug, Clone, Default)]
struct WorkspaceRecord {
    workspace: Option<Workspace>,
    members: Vec<WorkspaceMember>,
    reports: Vec<AnalysisReport>,
    audit_log: Vec<AuditEntry>,
    knowledge_sources: Vec<KnowledgeSource>,
    dismissal_rules: Vec<DismissalRule>,
    custom_regulations: Vec<String>,
}

/// In-memory `WorkspaceStore` with scriptable failures.
#[derive(Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<Uuid, WorkspaceRecord>>>,
    fail_next_report_write: AtomicBool,
    failing_report_deletes: RwLock<HashSet<Uuid>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `set_reports` call fail with `Unavailable`.
    pub fn fail_next_report_write(&self) {
        self.fail_next_report_write.store(true, Ordering::SeqCst);
    }

    /// Makes every `delete_report` call for this report id fail with
    /// `Unavailable`.
    pub async fn fail_report_delete(&self, report_id: Uuid) {
        self.failing_report_deletes.write().await.insert(report_id);
    }

    async fn read<T>(
        &self,
        workspace_id: Uuid,
        pick: impl FnOnce(&WorkspaceRecord) -> T,
    ) -> StoreResult<T> {
        let records = self.records.read().await;
        let record = records
            .get(&workspace_id)
            .ok_or_else(|| StoreError::NotFound(format!("workspace {workspace_id}")))?;
        Ok(pick(record))
    }

    async fn write(
        &self,
        workspace_id: Uuid,
        apply: impl FnOnce(&mut WorkspaceRecord),
    ) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&workspace_id)
            .ok_or_else(|| StoreError::NotFound(format!("workspace {workspace_id}")))?;
        apply(record);
        Ok(())
    }
}

#[async_trait]
impl WorkspaceStore for MemoryStore {
    async fn list_workspaces(&self) -> StoreResult<Vec<Workspace>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter_map(|r| r.workspace.clone())
            .collect())
    }

    async fn get_workspace(&self, workspace_id: Uuid) -> StoreResult<Workspace> {
        self.read(workspace_id, |r| r.workspace.clone())
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("workspace {workspace_id}")))
    }

    async fn put_workspace(&self, workspace: Workspace) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let workspace_id = workspace.id;
        records.entry(workspace_id).or_default().workspace = Some(workspace);
        Ok(())
    }

    async fn delete_workspace(&self, workspace_id: Uuid) -> StoreResult<()> {
        let mut records = self.records.write().await;
        records
            .remove(&workspace_id)
            .ok_or_else(|| StoreError::NotFound(format!("workspace {workspace_id}")))?;
        Ok(())
    }

    async fn get_members(&self, workspace_id: Uuid) -> StoreResult<Vec<WorkspaceMember>> {
        self.read(workspace_id, |r| r.members.clone()).await
    }

    async fn set_members(
        &self,
        workspace_id: Uuid,
        members: Vec<WorkspaceMember>,
    ) -> StoreResult<()> {
        self.write(workspace_id, |r| r.members = members).await
    }

    async fn get_reports(&self, workspace_id: Uuid) -> StoreResult<Vec<AnalysisReport>> {
        self.read(workspace_id, |r| r.reports.clone()).await
    }

    async fn set_reports(
        &self,
        workspace_id: Uuid,
        reports: Vec<AnalysisReport>,
    ) -> StoreResult<()> {
        if self.fail_next_report_write.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        self.write(workspace_id, |r| r.reports = reports).await
    }

    async fn delete_report(&self, workspace_id: Uuid, report_id: Uuid) -> StoreResult<()> {
        if self.failing_report_deletes.read().await.contains(&report_id) {
            return Err(StoreError::Unavailable(format!(
                "injected delete failure for report {report_id}"
            )));
        }
        self.write(workspace_id, |r| {
            r.reports.retain(|report| report.id != report_id);
        })
        .await
    }

    async fn get_audit_log(&self, workspace_id: Uuid) -> StoreResult<Vec<AuditEntry>> {
        self.read(workspace_id, |r| r.audit_log.clone()).await
    }

    async fn set_audit_log(&self, workspace_id: Uuid, entries: Vec<AuditEntry>) -> StoreResult<()> {
        self.write(workspace_id, |r| r.audit_log = entries).await
    }

    async fn get_knowledge_sources(&self, workspace_id: Uuid) -> StoreResult<Vec<KnowledgeSource>> {
        self.read(workspace_id, |r| r.knowledge_sources.clone())
            .await
    }

    async fn set_knowledge_sources(
        &self,
        workspace_id: Uuid,
        sources: Vec<KnowledgeSource>,
    ) -> StoreResult<()> {
        self.write(workspace_id, |r| r.knowledge_sources = sources)
            .await
    }

    async fn get_dismissal_rules(&self, workspace_id: Uuid) -> StoreResult<Vec<DismissalRule>> {
        self.read(workspace_id, |r| r.dismissal_rules.clone()).await
    }

    async fn set_dismissal_rules(
        &self,
        workspace_id: Uuid,
        rules: Vec<DismissalRule>,
    ) -> StoreResult<()> {
        self.write(workspace_id, |r| r.dismissal_rules = rules).await
    }

    async fn get_custom_regulations(&self, workspace_id: Uuid) -> StoreResult<Vec<String>> {
        self.read(workspace_id, |r| r.custom_regulations.clone())
            .await
    }

    async fn set_custom_regulations(
        &self,
        workspace_id: Uuid,
        regulations: Vec<String>,
    ) -> StoreResult<()> {
        self.write(workspace_id, |r| r.custom_regulations = regulations)
            .await
    }
}
