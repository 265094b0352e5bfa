//! Workspace persistence and orchestration for PlanSentry.
//!
//! The store layer treats each workspace as a set of whole collections
//! (members, reports, audit log, knowledge sources, dismissal rules)
//! behind the [`store::WorkspaceStore`] trait. [`service::WorkspaceService`]
//! sits on top and enforces authentication, role gating, tenant invariants,
//! and the one-audit-entry-per-mutation rule.

pub mod config;
pub mod memory;
pub mod optimistic;
pub mod poll;
pub mod service;
pub mod store;

pub use config::ServiceConfig;
pub use memory::MemoryStore;
pub use optimistic::{delete_batch, BatchOutcome};
pub use poll::MembershipWatcher;
pub use service::{ServiceError, WorkspaceService};
pub use store::{StoreError, StoreResult, WorkspaceStore};
