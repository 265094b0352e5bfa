//! Scripted provider doubles for testing.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use ps_core::finding::Finding;
use ps_core::report::CategoryScores;

use crate::analyzer::{AnalysisOutcome, AnalysisRequest, DocumentAnalyzer};
use crate::enhancer::PlanEnhancer;
use crate::identity::{IdentityProvider, UserProfile};
use crate::{AiError, AiResult};

/// Scripted analyzer: returns a fixed outcome or a fixed error, and
/// records every request it receives.
pub struct MockAnalyzer {
    result: Result<AnalysisOutcome, AiError>,
    requests: Arc<RwLock<Vec<AnalysisRequest>>>,
}

impl MockAnalyzer {
    /// Always returns the given outcome.
    pub fn with_outcome(outcome: AnalysisOutcome) -> Self {
        Self {
            result: Ok(outcome),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Always fails with the given error.
    pub fn failing(error: AiError) -> Self {
        Self {
            result: Err(error),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl DocumentAnalyzer for MockAnalyzer {
    async fn analyze(&self, request: AnalysisRequest) -> AiResult<AnalysisOutcome> {
        self.requests.write().await.push(request);
        self.result.clone()
    }
}

/// Scripted enhancer: returns a fixed revision or a fixed error.
pub struct MockEnhancer {
    result: Result<String, AiError>,
}

impl MockEnhancer {
    /// Always returns the given revised document.
    pub fn with_revision(revised: impl Into<String>) -> Self {
        Self {
            result: Ok(revised.into()),
        }
    }

    /// Always fails with the given error.
    pub fn failing(error: AiError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl PlanEnhancer for MockEnhancer {
    async fn improve(&self, _document_text: &str, _findings: &[Finding]) -> AiResult<String> {
        self.result.clone()
    }
}

/// Identity double backed by a registered-email set and an optional
/// signed-in user.
pub struct MockIdentityProvider {
    current: RwLock<Option<UserProfile>>,
    registered: RwLock<HashSet<String>>,
}

impl MockIdentityProvider {
    /// No session, no registered accounts.
    pub fn logged_out() -> Self {
        Self {
            current: RwLock::new(None),
            registered: RwLock::new(HashSet::new()),
        }
    }

    /// Signed in as the given user, who is also registered.
    pub fn signed_in(user: UserProfile) -> Self {
        let mut registered = HashSet::new();
        registered.insert(user.email.clone());
        Self {
            current: RwLock::new(Some(user)),
            registered: RwLock::new(registered),
        }
    }

    /// Adds a registered account without signing it in.
    pub async fn register(&self, email: impl Into<String>) {
        self.registered.write().await.insert(email.into());
    }

    /// Ends the current session.
    pub async fn sign_out(&self) {
        *self.current.write().await = None;
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn current_user(&self) -> AiResult<Option<UserProfile>> {
        Ok(self.current.read().await.clone())
    }

    async fn is_registered(&self, email: &str) -> AiResult<bool> {
        Ok(self.registered.read().await.contains(email))
    }
}

/// A plausible outcome for tests that only need some findings.
pub fn sample_outcome() -> AnalysisOutcome {
    AnalysisOutcome {
        resilience_score: 68,
        scores: CategoryScores {
            project: 70,
            strategic_goals: 65,
            regulations: 72,
            risk: 60,
        },
        findings: Vec::new(),
    }
}
