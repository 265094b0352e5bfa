//! Dismissal rules for PlanSentry.
//!
//! When a user dismisses a finding they supply a feedback reason. The
//! reason is persisted as an immutable rule and handed to future analyses
//! as context so the AI can suppress matching findings. Rules are never
//! matched locally and never mutated; administrators may delete them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted user-feedback record for a dismissed finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DismissalRule {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning workspace.
    pub workspace_id: Uuid,
    /// Title of the dismissed finding; future analyses suppress findings
    /// with this title.
    pub finding_title: String,
    /// The user's feedback reason.
    pub reason: String,
    /// When the dismissal happened.
    pub timestamp: DateTime<Utc>,
}

impl DismissalRule {
    /// Records a dismissal with its feedback reason.
    pub fn new(
        workspace_id: Uuid,
        finding_title: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            finding_title: finding_title.into(),
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_captures_title_and_reason() {
        let workspace_id = Uuid::new_v4();
        let rule = DismissalRule::new(workspace_id, "Vague milestones", "This is a false positive");
        assert_eq!(rule.workspace_id, workspace_id);
        assert_eq!(rule.finding_title, "Vague milestones");
        assert_eq!(rule.reason, "This is a false positive");
    }
}
