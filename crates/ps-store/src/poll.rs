//! Membership polling.
//!
//! There is no push channel from the backing store, so newly shared
//! workspaces are discovered by polling: the watcher diffs the set of
//! workspace ids currently visible to a user against the ids it has
//! already seen and reports only the new ones. The id check also makes
//! stale in-flight completions harmless; a workspace is never reported
//! twice.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tracing::warn;
use uuid::Uuid;

use ps_core::workspace::{MemberStatus, Workspace};

use crate::store::{StoreResult, WorkspaceStore};

/// Polls the store for workspaces newly visible to one user.
pub struct MembershipWatcher<S> {
    store: Arc<S>,
    user_email: String,
    interval: Duration,
    known: Mutex<HashSet<Uuid>>,
}

impl<S: WorkspaceStore> MembershipWatcher<S> {
    /// Creates a watcher for the given user.
    pub fn new(store: Arc<S>, user_email: impl Into<String>, interval: Duration) -> Self {
        Self {
            store,
            user_email: user_email.into(),
            interval,
            known: Mutex::new(HashSet::new()),
        }
    }

    /// Seeds the known set without reporting, so the first poll after
    /// startup only surfaces genuinely new workspaces.
    pub async fn prime(&self) -> StoreResult<()> {
        let visible = self.visible().await?;
        let mut known = self.known.lock().await;
        known.extend(visible.into_iter().map(|w| w.id));
        Ok(())
    }

    /// One poll cycle: returns workspaces visible now that have not been
    /// seen before.
    pub async fn poll_once(&self) -> StoreResult<Vec<Workspace>> {
        let visible = self.visible().await?;
        let mut known = self.known.lock().await;
        let mut fresh = Vec::new();
        for workspace in visible {
            if known.insert(workspace.id) {
                fresh.push(workspace);
            }
        }
        Ok(fresh)
    }

    /// Polls at the configured interval, sending each newly visible
    /// workspace down the channel. Returns when the receiver is dropped.
    pub async fn run(&self, tx: mpsc::Sender<Workspace>) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(fresh) => {
                    for workspace in fresh {
                        if tx.send(workspace).await.is_err() {
                            return;
                        }
                    }
                }
                Err(error) => warn!(%error, "membership poll failed"),
            }
        }
    }

    async fn visible(&self) -> StoreResult<Vec<Workspace>> {
        let mut visible = Vec::new();
        for workspace in self.store.list_workspaces().await? {
            let members = self.store.get_members(workspace.id).await?;
            if members
                .iter()
                .any(|m| m.email == self.user_email && m.status == MemberStatus::Active)
            {
                visible.push(workspace);
            }
        }
        Ok(visible)
    }
}
