//! Optimistic batch deletion.
//!
//! Deleting many items proceeds in three phases: snapshot the targets
//! with their positions, remove them from the working collection up
//! front, then fan out one delete call per item with bounded concurrency.
//! A failed delete restores its item at the prior position; one failure
//! never aborts or rolls back its siblings.

use std::collections::HashSet;
use std::future::Future;
use std::hash::Hash;

use futures::stream::{self, StreamExt};
use tracing::warn;

/// Per-item result of a batch operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome<I> {
    /// Ids whose delete call succeeded.
    pub succeeded: Vec<I>,
    /// Ids whose delete call failed; their items were restored.
    pub failed: Vec<I>,
}

impl<I> BatchOutcome<I> {
    /// True when every requested delete succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Deletes the items with the given ids from the collection, calling
/// `delete_fn` once per item with at most `concurrency` calls in flight.
///
/// Returns the reconciled collection (failures restored at their prior
/// positions) and the per-id outcome. Ids not present in the collection
/// are ignored.
pub async fn delete_batch<T, I, E, G, F, Fut>(
    collection: Vec<T>,
    ids: &[I],
    id_of: G,
    concurrency: usize,
    delete_fn: F,
) -> (Vec<T>, BatchOutcome<I>)
where
    I: Eq + Hash + Clone,
    E: std::fmt::Display,
    G: Fn(&T) -> I,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let targets: HashSet<&I> = ids.iter().collect();

    // Phase 1: snapshot targets with their prior positions and remove
    // them from the working collection.
    let mut remaining = Vec::with_capacity(collection.len());
    let mut removed: Vec<(usize, T)> = Vec::new();
    for (position, item) in collection.into_iter().enumerate() {
        if targets.contains(&id_of(&item)) {
            removed.push((position, item));
        } else {
            remaining.push(item);
        }
    }

    // Phase 2: fan out one delete per item.
    let results: Vec<(I, Result<(), E>)> = stream::iter(removed.iter().map(|(_, item)| {
        let id = id_of(item);
        let call = delete_fn(id.clone());
        async move { (id, call.await) }
    }))
    .buffer_unordered(concurrency.max(1))
    .collect()
    .await;

    let mut outcome = BatchOutcome {
        succeeded: Vec::new(),
        failed: Vec::new(),
    };
    let mut failed_ids: HashSet<I> = HashSet::new();
    for (id, result) in results {
        match result {
            Ok(()) => outcome.succeeded.push(id),
            Err(error) => {
                warn!(%error, "batch delete item failed, restoring");
                failed_ids.insert(id.clone());
                outcome.failed.push(id);
            }
        }
    }

    // Phase 3: restore failed items at their prior positions. `removed`
    // is in ascending position order, so earlier restores keep later
    // positions accurate.
    for (position, item) in removed {
        if failed_ids.contains(&id_of(&item)) {
            let at = position.min(remaining.len());
            remaining.insert(at, item);
        }
    }

    (remaining, outcome)
}
