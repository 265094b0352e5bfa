//! Document analysis provider interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use ps_core::dismissal::DismissalRule;
use ps_core::finding::{Finding, Severity};
use ps_core::knowledge::KnowledgeSource;
use ps_core::report::CategoryScores;

use crate::AiResult;

/// Everything the provider needs to analyze one plan document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// The extracted plan text.
    pub document_text: String,
    /// Workspace knowledge sources handed to the provider as context.
    pub knowledge_sources: Vec<KnowledgeSource>,
    /// Past dismissals; the provider suppresses matching findings.
    pub dismissal_rules: Vec<DismissalRule>,
    /// Workspace-specific regulation texts.
    pub custom_regulations: Vec<String>,
}

/// A finding as returned by the provider, before it becomes a tracked
/// `Finding` with an id and status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingDraft {
    /// Short issue title.
    pub title: String,
    /// Severity assigned by the provider.
    pub severity: Severity,
    /// Verbatim excerpt from the document the finding refers to.
    pub source_snippet: String,
    /// Suggested remediation.
    pub recommendation: String,
}

impl FindingDraft {
    /// Converts the draft into a tracked finding.
    pub fn into_finding(self) -> Finding {
        Finding::new(
            self.title,
            self.severity,
            self.source_snippet,
            self.recommendation,
        )
    }
}

/// The provider's full answer for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Aggregate 0-100 resilience score.
    pub resilience_score: u8,
    /// Per-category scores.
    pub scores: CategoryScores,
    /// Issues found in the document.
    pub findings: Vec<FindingDraft>,
}

/// Analyzes plan documents against workspace context.
///
/// Callers fail closed: any error from `analyze` becomes a synthetic
/// critical finding on the report rather than an unhandled error.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Runs a full analysis of one document.
    async fn analyze(&self, request: AnalysisRequest) -> AiResult<AnalysisOutcome>;
}
