//! Draft cache for in-progress enhancement text.
//!
//! An explicit, injectable service keyed by report id. Components that
//! need to keep an unsaved enhanced draft across screens receive a
//! `DraftStore` instead of reaching for module-level shared state, which
//! keeps the cache mockable in tests.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

/// In-memory store of unsaved enhancement drafts, keyed by report id.
#[derive(Debug, Default)]
pub struct DraftStore {
    drafts: RwLock<HashMap<Uuid, String>>,
}

impl DraftStore {
    /// Creates an empty draft store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the draft for a report, if one is cached.
    pub fn get(&self, report_id: Uuid) -> Option<String> {
        self.drafts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&report_id)
            .cloned()
    }

    /// Stores or replaces the draft for a report.
    pub fn set(&self, report_id: Uuid, draft: impl Into<String>) {
        self.drafts
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(report_id, draft.into());
    }

    /// Drops the draft for a report, returning it if present.
    pub fn remove(&self, report_id: Uuid) -> Option<String> {
        self.drafts
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&report_id)
    }

    /// Drops all drafts.
    pub fn clear(&self) {
        self.drafts
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
