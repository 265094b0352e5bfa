//! External AI and identity boundary for PlanSentry.
//!
//! This crate defines the interfaces the workspace service calls out
//! through: document analysis, plan enhancement, and user identity. All
//! are async traits so production providers and scripted test doubles are
//! interchangeable.

pub mod analyzer;
pub mod enhancer;
pub mod identity;
pub mod mock;

pub use analyzer::{AnalysisOutcome, AnalysisRequest, DocumentAnalyzer, FindingDraft};
pub use enhancer::PlanEnhancer;
pub use identity::{IdentityProvider, UserProfile};
pub use mock::{MockAnalyzer, MockEnhancer, MockIdentityProvider};

use thiserror::Error;

/// Errors from an AI provider call.
#[derive(Error, Debug, Clone)]
pub enum AiError {
    /// The provider rejected or could not parse the request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The provider returned a response the client could not interpret.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The provider is unreachable or returned a server error.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// The call exceeded its deadline.
    #[error("Timed out after {0} seconds")]
    Timeout(u64),
}

/// Result type for AI provider operations.
pub type AiResult<T> = Result<T, AiError>;
