// crates/nacre-trust/src/cache.rs
//
// Time-boxed memoization of the trust computation. Trust recomputation is
// the only moderately expensive path in the subsystem, so one coarse lock
// covers the whole check-age / recompute / store critical section.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use nacre_core::{Node, TimeProvider};
use rand::seq::SliceRandom;

use crate::context::{TrustContext, TrustResult};
use crate::provider::TrustProvider;

/// Upper bound on the node count handed to the inner provider. The power
/// iteration is O(n^2) per step; beyond this size the context is sampled
/// down instead.
const MAX_MATRIX_SIZE: usize = 101;

struct CacheEntry {
    result: TrustResult,
    computed_at: DateTime<Utc>,
}

/// Wraps another provider and serves the last computed result until it
/// goes stale.
///
/// Callers always receive a copy of the cached result, never the cached
/// instance itself, so nobody can mutate shared state. Concurrent callers
/// serialize on the cache lock: only one thread runs the expensive
/// pipeline, the rest block and then read the fresh entry.
pub struct CachedTrustProvider {
    inner: Arc<dyn TrustProvider>,
    cache_secs: i64,
    time_provider: Arc<dyn TimeProvider>,
    state: Mutex<Option<CacheEntry>>,
}

impl CachedTrustProvider {
    pub fn new(
        inner: Arc<dyn TrustProvider>,
        cache_secs: i64,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            inner,
            cache_secs,
            time_provider,
            state: Mutex::new(None),
        }
    }

    /// Cap the context at `MAX_MATRIX_SIZE` nodes.
    ///
    /// Nodes that scored at least the average trust in the previous round
    /// are kept so the best-known peers stay in every computation; the
    /// remaining slots are filled with a random sample, and the local node
    /// always occupies the last slot.
    fn truncate_context(&self, context: &TrustContext, previous: Option<&CacheEntry>) -> TrustContext {
        if context.nodes().len() <= MAX_MATRIX_SIZE {
            return context.clone();
        }

        let local = context.local_node().clone();
        let mut selected: Vec<Node> = Vec::with_capacity(MAX_MATRIX_SIZE);

        if let Some(entry) = previous {
            let cutoff = 1.0 / entry.result.nodes().len() as f64;
            for (i, node) in entry.result.nodes().iter().enumerate() {
                if entry.result.values().get(i) >= cutoff
                    && *node != local
                    && context.nodes().contains(node)
                    && !selected.contains(node)
                {
                    selected.push(node.clone());
                }
                if selected.len() == MAX_MATRIX_SIZE - 1 {
                    break;
                }
            }
        }

        let mut remaining: Vec<Node> = context
            .nodes()
            .iter()
            .filter(|node| **node != local && !selected.contains(node))
            .cloned()
            .collect();
        remaining.shuffle(&mut rand::thread_rng());
        let missing = MAX_MATRIX_SIZE - 1 - selected.len();
        selected.extend(remaining.into_iter().take(missing));
        selected.push(local);

        TrustContext::new(
            selected,
            context.local_node().clone(),
            Arc::clone(context.experiences()),
            context.pre_trusted().clone(),
        )
    }
}

impl TrustProvider for CachedTrustProvider {
    fn compute_trust(&self, context: &TrustContext) -> TrustResult {
        let mut state = self.state.lock().expect("trust cache lock poisoned");
        let now = self.time_provider.current_time();

        let stale = match state.as_ref() {
            None => true,
            Some(entry) => now - entry.computed_at > Duration::seconds(self.cache_secs),
        };

        if stale {
            let truncated = self.truncate_context(context, state.as_ref());
            let (nodes, mut values) = self.inner.compute_trust(&truncated).into_parts();
            values.normalize();
            tracing::debug!(nodes = nodes.len(), "recomputed trust vector");
            *state = Some(CacheEntry {
                result: TrustResult::new(nodes, values),
                computed_at: now,
            });
        }

        let entry = state.as_ref().expect("cache entry populated above");
        entry.result.clone()
    }
}
