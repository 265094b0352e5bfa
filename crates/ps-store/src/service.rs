//! Workspace orchestration service.
//!
//! Every mutating operation follows the same shape: resolve the signed-in
//! user, load their membership, check the role gate, apply the change,
//! and append exactly one audit entry. Authorization always goes through
//! [`Role::can`] (or per-category governance for knowledge sources), so
//! the store never trusts the UI's gating.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use ps_ai::{
    AiError, AnalysisRequest, DocumentAnalyzer, IdentityProvider, PlanEnhancer, UserProfile,
};
use ps_core::audit::{AuditAction, AuditDetails, AuditEntry};
use ps_core::dismissal::DismissalRule;
use ps_core::extraction::{DocumentExtractor, ExtractionConfig};
use ps_core::knowledge::{KnowledgeCategory, KnowledgeSource};
use ps_core::report::{AnalysisReport, ReportError, ReportStatus};
use ps_core::workspace::{
    active_admin_count, MemberStatus, Role, Workspace, WorkspaceAction, WorkspaceMember,
    WorkspaceStatus,
};

use crate::config::ServiceConfig;
use crate::optimistic::{delete_batch, BatchOutcome};
use crate::store::{StoreError, WorkspaceStore};

/// Errors raised by workspace service operations.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No user is signed in.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The acting user's role does not permit the operation.
    #[error("Role {role} is not permitted to {action}")]
    Unauthorized { role: Role, action: String },

    /// The acting user is not an active member of the workspace.
    #[error("{0} is not an active member of this workspace")]
    NotAMember(String),

    /// The workspace does not exist.
    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(Uuid),

    /// The report does not exist in this workspace.
    #[error("Report not found: {0}")]
    ReportNotFound(Uuid),

    /// The invited email has no registered account.
    #[error("No registered account for {0}")]
    UnregisteredUser(String),

    /// The email is already a member of the workspace.
    #[error("{0} is already a member of this workspace")]
    DuplicateMembership(String),

    /// The target email is not a member of the workspace.
    #[error("No member with email {0}")]
    MemberNotFound(String),

    /// Users cannot change their own role.
    #[error("Cannot change your own role")]
    SelfRoleChange,

    /// The operation would leave the workspace without an active
    /// administrator.
    #[error("A workspace must retain at least one active administrator")]
    LastAdminViolation,

    /// Dismissing a finding requires a feedback reason.
    #[error("A dismissal reason is required")]
    ReasonRequired,

    /// The knowledge source does not exist.
    #[error("Knowledge source not found: {0}")]
    KnowledgeSourceNotFound(Uuid),

    /// The dismissal rule does not exist.
    #[error("Dismissal rule not found: {0}")]
    DismissalRuleNotFound(Uuid),

    /// A report lifecycle operation failed.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An AI or identity provider call failed.
    #[error(transparent)]
    Provider(#[from] AiError),
}

/// Orchestrates workspace operations over a store and the AI boundary.
pub struct WorkspaceService<S, A, E, I> {
    store: Arc<S>,
    analyzer: Arc<A>,
    enhancer: Arc<E>,
    identity: Arc<I>,
    config: ServiceConfig,
}

impl<S, A, E, I> WorkspaceService<S, A, E, I>
where
    S: WorkspaceStore,
    A: DocumentAnalyzer,
    E: PlanEnhancer,
    I: IdentityProvider,
{
    /// Creates a service over the given store and providers.
    pub fn new(
        store: Arc<S>,
        analyzer: Arc<A>,
        enhancer: Arc<E>,
        identity: Arc<I>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            analyzer,
            enhancer,
            identity,
            config,
        }
    }

    // ---- session and authorization -------------------------------------

    async fn current_user(&self) -> Result<UserProfile, ServiceError> {
        self.identity
            .current_user()
            .await?
            .ok_or(ServiceError::NotAuthenticated)
    }

    /// Resolves the signed-in user and their active membership role in the
    /// workspace.
    async fn actor(&self, workspace_id: Uuid) -> Result<(UserProfile, Role), ServiceError> {
        let user = self.current_user().await?;
        let members = self.members_of(workspace_id).await?;
        let member = members
            .iter()
            .find(|m| m.email == user.email && m.status == MemberStatus::Active)
            .ok_or_else(|| ServiceError::NotAMember(user.email.clone()))?;
        Ok((user, member.role))
    }

    async fn authorized_actor(
        &self,
        workspace_id: Uuid,
        action: WorkspaceAction,
    ) -> Result<(UserProfile, Role), ServiceError> {
        let (user, role) = self.actor(workspace_id).await?;
        if !role.can(action) {
            return Err(ServiceError::Unauthorized {
                role,
                action: format!("{action:?}"),
            });
        }
        Ok((user, role))
    }

    async fn members_of(&self, workspace_id: Uuid) -> Result<Vec<WorkspaceMember>, ServiceError> {
        self.store.get_members(workspace_id).await.map_err(|e| {
            if matches!(e, StoreError::NotFound(_)) {
                ServiceError::WorkspaceNotFound(workspace_id)
            } else {
                e.into()
            }
        })
    }

    /// Appends one entry to the workspace's audit log, newest first.
    async fn record(
        &self,
        workspace_id: Uuid,
        user_email: &str,
        action: AuditAction,
        details: AuditDetails,
    ) -> Result<(), ServiceError> {
        let mut log = self.store.get_audit_log(workspace_id).await?;
        log.insert(0, AuditEntry::new(user_email, action, details));
        self.store.set_audit_log(workspace_id, log).await?;
        Ok(())
    }

    // ---- workspace lifecycle -------------------------------------------

    /// Creates a workspace with the current user as its sole active
    /// administrator.
    pub async fn create_workspace(
        &self,
        name: impl Into<String>,
    ) -> Result<Workspace, ServiceError> {
        let user = self.current_user().await?;
        let workspace = Workspace::new(name, user.email.clone());
        let workspace_id = workspace.id;

        self.store.put_workspace(workspace.clone()).await?;
        self.store
            .set_members(
                workspace_id,
                vec![WorkspaceMember::active(
                    user.email.clone(),
                    Role::Administrator,
                )],
            )
            .await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::WorkspaceCreated,
            AuditDetails::plain(format!("Created workspace '{}'", workspace.name)),
        )
        .await?;
        info!(%workspace_id, "workspace created");
        Ok(workspace)
    }

    /// Workspaces where the current user is an active member.
    pub async fn list_workspaces(&self) -> Result<Vec<Workspace>, ServiceError> {
        let user = self.current_user().await?;
        let mut visible = Vec::new();
        for workspace in self.store.list_workspaces().await? {
            let members = self.store.get_members(workspace.id).await?;
            if members
                .iter()
                .any(|m| m.email == user.email && m.status == MemberStatus::Active)
            {
                visible.push(workspace);
            }
        }
        Ok(visible)
    }

    /// Renames the workspace. Administrators only.
    pub async fn rename_workspace(
        &self,
        workspace_id: Uuid,
        new_name: impl Into<String>,
    ) -> Result<(), ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::RenameWorkspace)
            .await?;
        let mut workspace = self.store.get_workspace(workspace_id).await?;
        let old_name = std::mem::replace(&mut workspace.name, new_name.into());
        let new_name = workspace.name.clone();
        self.store.put_workspace(workspace).await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::WorkspaceRenamed,
            AuditDetails::plain(format!("Renamed '{old_name}' to '{new_name}'")),
        )
        .await
    }

    /// Archives the workspace. Administrators only.
    pub async fn archive_workspace(&self, workspace_id: Uuid) -> Result<(), ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::ArchiveWorkspace)
            .await?;
        let mut workspace = self.store.get_workspace(workspace_id).await?;
        workspace.status = WorkspaceStatus::Archived;
        let name = workspace.name.clone();
        self.store.put_workspace(workspace).await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::WorkspaceArchived,
            AuditDetails::plain(format!("Archived workspace '{name}'")),
        )
        .await
    }

    /// Deletes the workspace and every collection it owns, audit log
    /// included. Administrators only.
    pub async fn delete_workspace(&self, workspace_id: Uuid) -> Result<(), ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::DeleteWorkspace)
            .await?;
        self.store.delete_workspace(workspace_id).await?;
        // The audit log went with the workspace; the trace is all that
        // remains of this action.
        info!(%workspace_id, actor = %user.email, "workspace deleted");
        Ok(())
    }

    // ---- membership -----------------------------------------------------

    /// Invites a registered user as a pending member. Administrators only.
    pub async fn invite_member(
        &self,
        workspace_id: Uuid,
        email: impl Into<String>,
        role: Role,
    ) -> Result<(), ServiceError> {
        let email = email.into();
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::InviteMember)
            .await?;

        if !self.identity.is_registered(&email).await? {
            return Err(ServiceError::UnregisteredUser(email));
        }
        let mut members = self.members_of(workspace_id).await?;
        if members.iter().any(|m| m.email == email) {
            return Err(ServiceError::DuplicateMembership(email));
        }
        members.push(WorkspaceMember::pending(email.clone(), role));
        self.store.set_members(workspace_id, members).await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::MemberInvited,
            AuditDetails::plain(format!("Invited {email} as {role}")),
        )
        .await
    }

    /// Removes a member. Administrators only; the last active
    /// administrator can never be removed.
    pub async fn remove_member(
        &self,
        workspace_id: Uuid,
        email: &str,
    ) -> Result<(), ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::RemoveMember)
            .await?;

        let mut members = self.members_of(workspace_id).await?;
        let target = members
            .iter()
            .find(|m| m.email == email)
            .ok_or_else(|| ServiceError::MemberNotFound(email.to_string()))?;
        if target.is_active_admin() && active_admin_count(&members) <= 1 {
            return Err(ServiceError::LastAdminViolation);
        }
        members.retain(|m| m.email != email);
        self.store.set_members(workspace_id, members).await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::MemberRemoved,
            AuditDetails::plain(format!("Removed {email}")),
        )
        .await
    }

    /// Changes a member's role. Administrators only; self-changes are
    /// forbidden, and the last active administrator cannot be demoted.
    pub async fn change_member_role(
        &self,
        workspace_id: Uuid,
        email: &str,
        new_role: Role,
    ) -> Result<(), ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::ChangeMemberRole)
            .await?;
        if user.email == email {
            return Err(ServiceError::SelfRoleChange);
        }

        let mut members = self.members_of(workspace_id).await?;
        let position = members
            .iter()
            .position(|m| m.email == email)
            .ok_or_else(|| ServiceError::MemberNotFound(email.to_string()))?;
        let target = &members[position];
        if target.is_active_admin()
            && new_role != Role::Administrator
            && active_admin_count(&members) <= 1
        {
            return Err(ServiceError::LastAdminViolation);
        }
        let old_role = target.role;
        members[position].role = new_role;
        self.store.set_members(workspace_id, members).await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::MemberRoleChanged,
            AuditDetails::plain(format!("Changed {email} from {old_role} to {new_role}")),
        )
        .await
    }

    /// The workspace's membership list, for any active member.
    pub async fn members(&self, workspace_id: Uuid) -> Result<Vec<WorkspaceMember>, ServiceError> {
        self.actor(workspace_id).await?;
        self.members_of(workspace_id).await
    }

    // ---- read surfaces --------------------------------------------------

    /// Reports in the workspace; archived ones are excluded unless asked
    /// for.
    pub async fn list_reports(
        &self,
        workspace_id: Uuid,
        include_archived: bool,
    ) -> Result<Vec<AnalysisReport>, ServiceError> {
        self.actor(workspace_id).await?;
        let mut reports = self.store.get_reports(workspace_id).await?;
        if !include_archived {
            reports.retain(|r| r.status == ReportStatus::Active);
        }
        Ok(reports)
    }

    /// One report by id.
    pub async fn get_report(
        &self,
        workspace_id: Uuid,
        report_id: Uuid,
    ) -> Result<AnalysisReport, ServiceError> {
        self.actor(workspace_id).await?;
        let reports = self.store.get_reports(workspace_id).await?;
        reports
            .into_iter()
            .find(|r| r.id == report_id)
            .ok_or(ServiceError::ReportNotFound(report_id))
    }

    /// The audit log, newest first.
    pub async fn audit_log(&self, workspace_id: Uuid) -> Result<Vec<AuditEntry>, ServiceError> {
        self.actor(workspace_id).await?;
        Ok(self.store.get_audit_log(workspace_id).await?)
    }

    /// The workspace's knowledge sources.
    pub async fn knowledge_sources(
        &self,
        workspace_id: Uuid,
    ) -> Result<Vec<KnowledgeSource>, ServiceError> {
        self.actor(workspace_id).await?;
        Ok(self.store.get_knowledge_sources(workspace_id).await?)
    }

    /// The workspace's dismissal rules.
    pub async fn dismissal_rules(
        &self,
        workspace_id: Uuid,
    ) -> Result<Vec<DismissalRule>, ServiceError> {
        self.actor(workspace_id).await?;
        Ok(self.store.get_dismissal_rules(workspace_id).await?)
    }

    // ---- knowledge and rules -------------------------------------------

    /// Adds an editable knowledge source. Any active member.
    pub async fn add_knowledge_source(
        &self,
        workspace_id: Uuid,
        title: impl Into<String>,
        content: impl Into<String>,
        category: KnowledgeCategory,
    ) -> Result<KnowledgeSource, ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::AddKnowledgeSource)
            .await?;
        let source = KnowledgeSource::new(workspace_id, title, content, category);
        let mut sources = self.store.get_knowledge_sources(workspace_id).await?;
        sources.push(source.clone());
        self.store
            .set_knowledge_sources(workspace_id, sources)
            .await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::KnowledgeSourceAdded,
            AuditDetails::plain(format!("Added '{}' ({})", source.title, source.category)),
        )
        .await?;
        Ok(source)
    }

    /// Deletes a knowledge source. Governed per category: built-in
    /// sources never, user sources only by the category's governing role
    /// or an administrator.
    pub async fn delete_knowledge_source(
        &self,
        workspace_id: Uuid,
        source_id: Uuid,
    ) -> Result<(), ServiceError> {
        let (user, role) = self.actor(workspace_id).await?;
        let mut sources = self.store.get_knowledge_sources(workspace_id).await?;
        let source = sources
            .iter()
            .find(|s| s.id == source_id)
            .ok_or(ServiceError::KnowledgeSourceNotFound(source_id))?;
        if !source.deletable_by(role) {
            return Err(ServiceError::Unauthorized {
                role,
                action: format!("delete a {} knowledge source", source.category),
            });
        }
        let title = source.title.clone();
        sources.retain(|s| s.id != source_id);
        self.store
            .set_knowledge_sources(workspace_id, sources)
            .await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::KnowledgeSourceDeleted,
            AuditDetails::plain(format!("Deleted '{title}'")),
        )
        .await
    }

    /// Deletes a dismissal rule. Administrators only; future analyses
    /// stop suppressing the finding.
    pub async fn delete_dismissal_rule(
        &self,
        workspace_id: Uuid,
        rule_id: Uuid,
    ) -> Result<(), ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::DeleteDismissalRule)
            .await?;
        let mut rules = self.store.get_dismissal_rules(workspace_id).await?;
        let rule = rules
            .iter()
            .find(|r| r.id == rule_id)
            .ok_or(ServiceError::DismissalRuleNotFound(rule_id))?;
        let title = rule.finding_title.clone();
        rules.retain(|r| r.id != rule_id);
        self.store.set_dismissal_rules(workspace_id, rules).await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::DismissalRuleDeleted,
            AuditDetails::plain(format!("Deleted dismissal rule for '{title}'")),
        )
        .await
    }

    /// The workspace's custom regulation texts.
    pub async fn custom_regulations(
        &self,
        workspace_id: Uuid,
    ) -> Result<Vec<String>, ServiceError> {
        self.actor(workspace_id).await?;
        Ok(self.store.get_custom_regulations(workspace_id).await?)
    }

    /// Replaces the workspace's custom regulation texts. Administrators
    /// only; the new set applies to the next analysis.
    pub async fn set_custom_regulations(
        &self,
        workspace_id: Uuid,
        regulations: Vec<String>,
    ) -> Result<(), ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::EditCustomRegulations)
            .await?;
        let count = regulations.len();
        self.store
            .set_custom_regulations(workspace_id, regulations)
            .await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::CustomRegulationsUpdated,
            AuditDetails::plain(format!("Set {count} custom regulation(s)")),
        )
        .await
    }

    // ---- report lifecycle ----------------------------------------------

    /// Uploads a document, extracts its text, and runs the AI analysis.
    ///
    /// Fails closed: extraction or analysis errors produce a stored
    /// report carrying a single synthetic critical finding, never an
    /// unhandled error. The upload attempt always leaves the user with a
    /// viewable report.
    pub async fn upload_report(
        &self,
        workspace_id: Uuid,
        bytes: &[u8],
        filename: &str,
    ) -> Result<AnalysisReport, ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::UploadReport)
            .await?;

        let extractor = DocumentExtractor::with_config(ExtractionConfig {
            max_size: self.config.max_upload_bytes,
            ..ExtractionConfig::default()
        });

        let report = match extractor.extract(bytes, filename) {
            Err(error) => {
                warn!(%error, filename, "extraction failed");
                AnalysisReport::failed(workspace_id, filename, "", &error.to_string())
            }
            Ok(text) => self.analyze_document(workspace_id, filename, text).await?,
        };

        let mut reports = self.store.get_reports(workspace_id).await?;
        reports.insert(0, report.clone());
        self.store.set_reports(workspace_id, reports).await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::ReportCreated,
            AuditDetails::linked(format!("Uploaded '{filename}'"), report.id),
        )
        .await?;
        Ok(report)
    }

    async fn analyze_document(
        &self,
        workspace_id: Uuid,
        filename: &str,
        text: String,
    ) -> Result<AnalysisReport, ServiceError> {
        let request = AnalysisRequest {
            document_text: text.clone(),
            knowledge_sources: self.store.get_knowledge_sources(workspace_id).await?,
            dismissal_rules: self.store.get_dismissal_rules(workspace_id).await?,
            custom_regulations: self.store.get_custom_regulations(workspace_id).await?,
        };

        let mut report = AnalysisReport::uploading(workspace_id, filename);
        report.begin_analysis(text)?;
        match self.analyzer.analyze(request).await {
            Ok(outcome) => {
                let findings = outcome
                    .findings
                    .into_iter()
                    .map(|draft| draft.into_finding())
                    .collect();
                report.complete_analysis(
                    outcome.resilience_score,
                    Some(outcome.scores),
                    findings,
                )?;
                Ok(report)
            }
            Err(error) => {
                warn!(%error, filename, "analysis failed");
                Ok(AnalysisReport::failed(
                    workspace_id,
                    filename,
                    report.document_content,
                    &error.to_string(),
                ))
            }
        }
    }

    /// Runs the enhancement cycle up to the review point: the report
    /// moves to its diff-review state with the AI revision pending. On
    /// provider failure the report returns to its prior state with the
    /// document untouched.
    pub async fn enhance_report(
        &self,
        workspace_id: Uuid,
        report_id: Uuid,
    ) -> Result<AnalysisReport, ServiceError> {
        self.authorized_actor(workspace_id, WorkspaceAction::ReviewReport)
            .await?;

        let mut report = self.load_report(workspace_id, report_id).await?;
        report.begin_enhancement()?;
        let findings: Vec<_> = report.active_findings().cloned().collect();
        match self
            .enhancer
            .improve(&report.document_content, &findings)
            .await
        {
            Ok(revised) => report.complete_enhancement(revised)?,
            Err(error) => {
                warn!(%error, %report_id, "enhancement failed");
                report.abort_enhancement()?;
                self.save_report(workspace_id, report).await?;
                return Err(error.into());
            }
        }
        self.save_report(workspace_id, report.clone()).await?;
        Ok(report)
    }

    /// Accepts a pending enhancement: the revision becomes the document
    /// and all open findings are resolved.
    pub async fn accept_enhancement(
        &self,
        workspace_id: Uuid,
        report_id: Uuid,
    ) -> Result<AnalysisReport, ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::ReviewReport)
            .await?;
        let mut report = self.load_report(workspace_id, report_id).await?;
        report.accept_enhancement()?;
        self.save_report(workspace_id, report.clone()).await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::EnhancementAccepted,
            AuditDetails::linked(format!("Accepted enhancement of '{}'", report.title), report_id),
        )
        .await?;
        Ok(report)
    }

    /// Discards a pending enhancement, leaving the document untouched.
    pub async fn discard_enhancement(
        &self,
        workspace_id: Uuid,
        report_id: Uuid,
    ) -> Result<AnalysisReport, ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::ReviewReport)
            .await?;
        let mut report = self.load_report(workspace_id, report_id).await?;
        report.discard_enhancement()?;
        self.save_report(workspace_id, report.clone()).await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::EnhancementDiscarded,
            AuditDetails::linked(
                format!("Discarded enhancement of '{}'", report.title),
                report_id,
            ),
        )
        .await?;
        Ok(report)
    }

    /// Marks one finding resolved.
    pub async fn resolve_finding(
        &self,
        workspace_id: Uuid,
        report_id: Uuid,
        finding_id: Uuid,
    ) -> Result<(), ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::ReviewReport)
            .await?;
        let mut report = self.load_report(workspace_id, report_id).await?;
        report.resolve_finding(finding_id)?;
        self.save_report(workspace_id, report).await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::FindingResolved,
            AuditDetails::linked("Resolved finding".to_string(), report_id),
        )
        .await
    }

    /// Dismisses one finding with a required feedback reason. The reason
    /// is persisted as a dismissal rule so future analyses suppress the
    /// finding; exactly one rule and one audit entry are produced.
    pub async fn dismiss_finding(
        &self,
        workspace_id: Uuid,
        report_id: Uuid,
        finding_id: Uuid,
        reason: &str,
    ) -> Result<(), ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::ReviewReport)
            .await?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ServiceError::ReasonRequired);
        }

        let mut report = self.load_report(workspace_id, report_id).await?;
        let title = report
            .findings
            .iter()
            .find(|f| f.id == finding_id)
            .map(|f| f.title.clone())
            .ok_or(ReportError::FindingNotFound(finding_id))?;
        report.dismiss_finding(finding_id)?;
        self.save_report(workspace_id, report).await?;

        let mut rules = self.store.get_dismissal_rules(workspace_id).await?;
        rules.push(DismissalRule::new(workspace_id, title.clone(), reason));
        self.store.set_dismissal_rules(workspace_id, rules).await?;

        self.record(
            workspace_id,
            &user.email,
            AuditAction::FindingDismissed,
            AuditDetails::linked(format!("Dismissed '{title}': {reason}"), report_id),
        )
        .await
    }

    /// Hides a report from the default listing.
    pub async fn archive_report(
        &self,
        workspace_id: Uuid,
        report_id: Uuid,
    ) -> Result<(), ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::ManageReports)
            .await?;
        let mut report = self.load_report(workspace_id, report_id).await?;
        report.archive()?;
        let title = report.title.clone();
        self.save_report(workspace_id, report).await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::ReportArchived,
            AuditDetails::linked(format!("Archived '{title}'"), report_id),
        )
        .await
    }

    /// Returns an archived report to the default listing.
    pub async fn restore_report(
        &self,
        workspace_id: Uuid,
        report_id: Uuid,
    ) -> Result<(), ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::ManageReports)
            .await?;
        let mut report = self.load_report(workspace_id, report_id).await?;
        report.restore();
        let title = report.title.clone();
        self.save_report(workspace_id, report).await?;
        self.record(
            workspace_id,
            &user.email,
            AuditAction::ReportRestored,
            AuditDetails::linked(format!("Restored '{title}'"), report_id),
        )
        .await
    }

    /// Deletes reports in bulk with bounded concurrency. One failed
    /// delete never aborts the rest: failed reports are restored at
    /// their prior positions and the outcome says how many failed.
    pub async fn delete_reports(
        &self,
        workspace_id: Uuid,
        report_ids: &[Uuid],
    ) -> Result<BatchOutcome<Uuid>, ServiceError> {
        let (user, _) = self
            .authorized_actor(workspace_id, WorkspaceAction::ManageReports)
            .await?;

        let reports = self.store.get_reports(workspace_id).await?;
        let store = Arc::clone(&self.store);
        let (reconciled, outcome) = delete_batch(
            reports,
            report_ids,
            |report| report.id,
            self.config.delete_concurrency,
            move |report_id| {
                let store = Arc::clone(&store);
                async move { store.delete_report(workspace_id, report_id).await }
            },
        )
        .await;
        self.store.set_reports(workspace_id, reconciled).await?;

        self.record(
            workspace_id,
            &user.email,
            AuditAction::ReportDeleted,
            AuditDetails::plain(format!(
                "Deleted {} report(s), {} failed",
                outcome.succeeded.len(),
                outcome.failed.len()
            )),
        )
        .await?;
        Ok(outcome)
    }

    async fn load_report(
        &self,
        workspace_id: Uuid,
        report_id: Uuid,
    ) -> Result<AnalysisReport, ServiceError> {
        let reports = self.store.get_reports(workspace_id).await?;
        reports
            .into_iter()
            .find(|r| r.id == report_id)
            .ok_or(ServiceError::ReportNotFound(report_id))
    }

    async fn save_report(
        &self,
        workspace_id: Uuid,
        report: AnalysisReport,
    ) -> Result<(), ServiceError> {
        let mut reports = self.store.get_reports(workspace_id).await?;
        let position = reports
            .iter()
            .position(|r| r.id == report.id)
            .ok_or(ServiceError::ReportNotFound(report.id))?;
        reports[position] = report;
        self.store.set_reports(workspace_id, reports).await?;
        Ok(())
    }
}
