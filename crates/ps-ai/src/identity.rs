//! Identity provider interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AiResult;

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    /// Display name.
    pub name: String,
    /// Email address; the stable key for membership records.
    pub email: String,
    /// Avatar URL, if the provider supplies one.
    pub avatar: Option<String>,
}

/// Resolves the current session user and looks up registered accounts.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The currently signed-in user. `None` means logged out, which blocks
    /// every workspace operation.
    async fn current_user(&self) -> AiResult<Option<UserProfile>>;

    /// Whether an account exists for the email. Backs the invite check.
    async fn is_registered(&self, email: &str) -> AiResult<bool>;
}
