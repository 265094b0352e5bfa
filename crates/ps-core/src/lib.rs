//! # ps-core
//!
//! Core data models and algorithms for PlanSentry.
//!
//! This crate provides the finding and report models, the report lifecycle
//! state machine, the line/word diff engine, the snippet highlighter,
//! document text extraction, and the workspace/membership/audit types that
//! the rest of the system builds on.

pub mod audit;
pub mod diff;
pub mod dismissal;
pub mod draft;
pub mod export;
pub mod extraction;
pub mod finding;
pub mod highlight;
pub mod knowledge;
pub mod report;
pub mod workspace;

pub use audit::{AuditAction, AuditDetails, AuditEntry};
pub use diff::{apply_accept, apply_discard, diff_lines, diff_words, DiffKind, DiffSegment};
pub use dismissal::DismissalRule;
pub use draft::DraftStore;
pub use export::{to_pdf, to_plain_text, ExportError};
pub use extraction::{DocumentExtractor, DocumentFormat, ExtractionConfig, ExtractionError};
pub use finding::{Finding, FindingError, FindingStatus, FindingSummary, Severity};
pub use highlight::{highlight, HighlightState};
pub use knowledge::{KnowledgeCategory, KnowledgeSource};
pub use report::{AnalysisReport, CategoryScores, ReportError, ReportPhase, ReportStatus};
pub use workspace::{
    MemberStatus, Role, Workspace, WorkspaceAction, WorkspaceMember, WorkspaceStatus,
};
