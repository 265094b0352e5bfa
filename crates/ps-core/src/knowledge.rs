//! Knowledge base sources for PlanSentry.
//!
//! Knowledge sources are contextual documents fed to the AI analysis as
//! background material. Each belongs to a closed category with a governing
//! role; deletion is permitted only for editable sources and only by a
//! governing role.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workspace::Role;

/// Closed set of knowledge categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeCategory {
    /// Government regulations and directives.
    Government,
    /// Risk management material.
    Risk,
    /// Strategic goals and plans.
    Strategy,
}

impl KnowledgeCategory {
    /// The role that governs sources in this category. Administrators may
    /// always act regardless of category.
    pub fn governing_role(&self) -> Role {
        match self {
            KnowledgeCategory::Government => Role::Administrator,
            KnowledgeCategory::Risk => Role::RiskOfficer,
            KnowledgeCategory::Strategy => Role::StrategyOfficer,
        }
    }

    /// Whether the given role may manage sources in this category.
    pub fn governed_by(&self, role: Role) -> bool {
        role == Role::Administrator || role == self.governing_role()
    }
}

impl std::fmt::Display for KnowledgeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KnowledgeCategory::Government => write!(f, "Government"),
            KnowledgeCategory::Risk => write!(f, "Risk"),
            KnowledgeCategory::Strategy => write!(f, "Strategy"),
        }
    }
}

/// A contextual document passed to the AI analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSource {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning workspace.
    pub workspace_id: Uuid,
    /// Display title.
    pub title: String,
    /// Source text handed to the AI.
    pub content: String,
    /// Category, which determines governance.
    pub category: KnowledgeCategory,
    /// Built-in sources are not editable and can never be deleted.
    pub is_editable: bool,
}

impl KnowledgeSource {
    /// Creates an editable, user-supplied source.
    pub fn new(
        workspace_id: Uuid,
        title: impl Into<String>,
        content: impl Into<String>,
        category: KnowledgeCategory,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            title: title.into(),
            content: content.into(),
            category,
            is_editable: true,
        }
    }

    /// Whether the given role may delete this source.
    pub fn deletable_by(&self, role: Role) -> bool {
        self.is_editable && self.category.governed_by(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_governance() {
        assert!(KnowledgeCategory::Risk.governed_by(Role::RiskOfficer));
        assert!(KnowledgeCategory::Strategy.governed_by(Role::StrategyOfficer));
        assert!(!KnowledgeCategory::Risk.governed_by(Role::StrategyOfficer));
        assert!(!KnowledgeCategory::Strategy.governed_by(Role::Member));
        // Administrators govern every category.
        for category in [
            KnowledgeCategory::Government,
            KnowledgeCategory::Risk,
            KnowledgeCategory::Strategy,
        ] {
            assert!(category.governed_by(Role::Administrator));
        }
    }

    #[test]
    fn test_non_editable_source_never_deletable() {
        let mut source = KnowledgeSource::new(
            Uuid::new_v4(),
            "Built-in regulations",
            "...",
            KnowledgeCategory::Government,
        );
        source.is_editable = false;
        assert!(!source.deletable_by(Role::Administrator));
    }

    #[test]
    fn test_editable_source_deletable_by_governor() {
        let source = KnowledgeSource::new(
            Uuid::new_v4(),
            "Risk appetite statement",
            "...",
            KnowledgeCategory::Risk,
        );
        assert!(source.deletable_by(Role::RiskOfficer));
        assert!(source.deletable_by(Role::Administrator));
        assert!(!source.deletable_by(Role::Member));
    }
}
