//! Plan enhancement provider interface.

use async_trait::async_trait;

use ps_core::finding::Finding;

use crate::AiResult;

/// Rewrites a plan document to address its open findings.
///
/// `improve` returns the entire revised document, not a patch; the caller
/// diffs it against the original for review. On error the caller falls
/// back to the original text.
#[async_trait]
pub trait PlanEnhancer: Send + Sync {
    /// Produces a revised version of the document addressing the findings.
    async fn improve(&self, document_text: &str, findings: &[Finding]) -> AiResult<String>;
}
