//! One-task-per-region fan-out with a join barrier
//!
//! A collection round executes one unit of work per enabled region, all
//! regions concurrently, and returns only once every region's task has
//! finished. A failing region logs its own error and contributes zero
//! records; sibling regions are unaffected. There is no per-call timeout
//! and no cancellation: dependent enrichment rounds rely on the
//! all-regions-completed barrier, so a hung regional call holds the whole
//! round.

use crate::error::ApiError;
use std::collections::BTreeMap;
use std::future::Future;
use tracing::error;

/// Region name to connected client handle, built once per collector and
/// read-only afterwards. Ordered so fan-out and merge order are stable,
/// which keeps inventories deterministic for tests.
pub type RegionalClientSet<C> = BTreeMap<String, C>;

/// Run `fetch` once per region, concurrently, and merge the per-region
/// record batches in region order.
///
/// Each task either contributes its full batch or, on failure, nothing;
/// partial batches are never merged. Failures (including panics) are
/// logged with region context and never propagate to the caller.
pub async fn fan_out<C, T, F, Fut>(
    clients: &RegionalClientSet<C>,
    what: &'static str,
    fetch: F,
) -> Vec<T>
where
    C: Clone + Send + 'static,
    T: Send + 'static,
    F: Fn(String, C) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ApiError>> + Send + 'static,
{
    let mut handles = Vec::with_capacity(clients.len());
    for (region, client) in clients {
        let fut = fetch(region.clone(), client.clone());
        let region = region.clone();
        handles.push(tokio::spawn(async move {
            match fut.await {
                Ok(records) => records,
                Err(err) => {
                    error!(%region, what, error = %err, "regional fetch failed");
                    Vec::new()
                }
            }
        }));
    }

    let mut merged = Vec::new();
    for (region, handle) in clients.keys().zip(handles) {
        match handle.await {
            Ok(records) => merged.extend(records),
            Err(err) => error!(%region, what, error = %err, "regional fetch task aborted"),
        }
    }
    merged
}
