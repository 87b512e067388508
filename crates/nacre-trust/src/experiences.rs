// crates/nacre-trust/src/experiences.rs
//
// Registry of every (source, peer) interaction record known to this node,
// and the matrices the trust computation materializes from it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use nacre_core::{ColumnVector, Matrix, Node, NodeId};

use crate::experience::{NodeExperience, NodeExperiencePair};

/// Experiences imported from peers are dropped when not refreshed within
/// this window.
const RETENTION_HOURS: i64 = 24;

/// Owning map `source -> (peer -> NodeExperience)`.
///
/// Lookup auto-creates missing entries, so callers must not read absence
/// as "no experience" — only a default-valued record. The maps sit behind
/// a read/write lock and hand out `Arc`s, so interaction-reporting threads
/// mutate counters while a trust computation reads them.
#[derive(Debug, Default)]
pub struct NodeExperiences {
    experiences: RwLock<HashMap<NodeId, HashMap<NodeId, Arc<NodeExperience>>>>,
    // Canonical node instances, so snapshots imported from peers resolve
    // to the nodes already known to the registry.
    node_cache: RwLock<HashMap<NodeId, Node>>,
}

impl NodeExperiences {
    pub fn new() -> Self {
        Self::default()
    }

    /// The experience record for the directed (source, peer) pair,
    /// created on first lookup.
    pub fn experience(&self, source: &Node, peer: &Node) -> Arc<NodeExperience> {
        {
            let map = self.experiences.read().expect("experiences lock poisoned");
            if let Some(experience) = map.get(source.id()).and_then(|row| row.get(peer.id())) {
                return Arc::clone(experience);
            }
        }

        self.cache_node(source);
        self.cache_node(peer);

        let mut map = self.experiences.write().expect("experiences lock poisoned");
        let row = map.entry(source.id().clone()).or_default();
        Arc::clone(row.entry(peer.id().clone()).or_default())
    }

    /// Read-only counter lookup; zero when the pair was never recorded.
    pub fn total_calls(&self, source: &Node, peer: &Node) -> u64 {
        let map = self.experiences.read().expect("experiences lock poisoned");
        map.get(source.id())
            .and_then(|row| row.get(peer.id()))
            .map(|experience| experience.total_calls())
            .unwrap_or(0)
    }

    /// Read-only local-trust lookup; zero when the pair was never recorded.
    pub fn local_trust(&self, source: &Node, peer: &Node) -> f64 {
        let map = self.experiences.read().expect("experiences lock poisoned");
        map.get(source.id())
            .and_then(|row| row.get(peer.id()))
            .map(|experience| experience.local_trust())
            .unwrap_or(0.0)
    }

    /// Read-only credibility lookup; the default 1.0 when never recorded.
    pub fn feedback_credibility(&self, source: &Node, peer: &Node) -> f64 {
        let map = self.experiences.read().expect("experiences lock poisoned");
        map.get(source.id())
            .and_then(|row| row.get(peer.id()))
            .map(|experience| experience.feedback_credibility())
            .unwrap_or(1.0)
    }

    /// Export `source`'s experience row as counter snapshots, for the
    /// peer-exchange endpoint.
    pub fn experiences_for(&self, source: &Node) -> Vec<NodeExperiencePair> {
        let map = self.experiences.read().expect("experiences lock poisoned");
        let cache = self.node_cache.read().expect("node cache lock poisoned");
        let Some(row) = map.get(source.id()) else {
            return Vec::new();
        };
        row.iter()
            .filter_map(|(peer_id, experience)| {
                cache.get(peer_id).map(|peer| {
                    NodeExperiencePair::new(
                        peer.clone(),
                        experience.successful_calls(),
                        experience.failed_calls(),
                    )
                })
            })
            .collect()
    }

    /// Import counter snapshots reported by `source`, stamping each record
    /// with the exchange time. Peer nodes already known to the registry
    /// keep their canonical instances.
    pub fn set_experiences(
        &self,
        source: &Node,
        pairs: &[NodeExperiencePair],
        timestamp: DateTime<Utc>,
    ) {
        for pair in pairs {
            let peer = self.canonical_node(&pair.node);
            let experience = self.experience(source, &peer);
            experience.set_successful_calls(pair.successful_calls);
            experience.set_failed_calls(pair.failed_calls);
            experience.touch(timestamp);
        }
    }

    /// The transposed local-trust matrix for `nodes`: entry (j, i) is
    /// node i's local trust in node j, so column i is node i's trust
    /// distribution.
    pub fn transposed_local_trust_matrix(&self, nodes: &[Node]) -> Matrix {
        let n = nodes.len();
        let mut matrix = Matrix::new(n, n);
        for (i, source) in nodes.iter().enumerate() {
            for (j, peer) in nodes.iter().enumerate() {
                matrix.set(j, i, self.local_trust(source, peer));
            }
        }
        matrix
    }

    /// Local-trust vector of `source` over `nodes`.
    pub fn local_trust_vector(&self, source: &Node, nodes: &[Node]) -> ColumnVector {
        let mut vector = ColumnVector::new(nodes.len());
        for (i, peer) in nodes.iter().enumerate() {
            vector.set(i, self.local_trust(source, peer));
        }
        vector
    }

    /// Write the converged global trust for each node onto `local`'s
    /// experience row. Panics when `values` is not aligned with `nodes`.
    pub fn set_global_trust(&self, local: &Node, nodes: &[Node], values: &ColumnVector) {
        assert_eq!(
            nodes.len(),
            values.len(),
            "global trust vector must be aligned with the node slice"
        );
        for (i, node) in nodes.iter().enumerate() {
            self.experience(local, node).set_global_trust(values.get(i));
        }
    }

    /// The shared-experience matrix used by credibility scoring.
    ///
    /// Entry (i, j) is 1.0 exactly when node i is neither `local` nor
    /// node j, and both `local` and node i have at least one recorded
    /// call with node j.
    pub fn shared_experience_matrix(&self, local: &Node, nodes: &[Node]) -> Matrix {
        let n = nodes.len();
        let mut matrix = Matrix::new(n, n);
        for (i, node_i) in nodes.iter().enumerate() {
            if node_i == local {
                continue;
            }
            for (j, node_j) in nodes.iter().enumerate() {
                if i == j {
                    continue;
                }
                if self.total_calls(local, node_j) > 0 && self.total_calls(node_i, node_j) > 0 {
                    matrix.set(i, j, 1.0);
                }
            }
        }
        matrix
    }

    /// Drop experiences imported longer than the retention window ago.
    /// Records without an import timestamp are locally owned and kept.
    pub fn prune(&self, now: DateTime<Utc>) {
        let cutoff = now - Duration::hours(RETENTION_HOURS);
        let mut map = self.experiences.write().expect("experiences lock poisoned");
        for row in map.values_mut() {
            row.retain(|_, experience| match experience.last_update() {
                Some(timestamp) => timestamp >= cutoff,
                None => true,
            });
        }
        map.retain(|_, row| !row.is_empty());
    }

    fn cache_node(&self, node: &Node) {
        let mut cache = self.node_cache.write().expect("node cache lock poisoned");
        cache.entry(node.id().clone()).or_insert_with(|| node.clone());
    }

    fn canonical_node(&self, node: &Node) -> Node {
        {
            let cache = self.node_cache.read().expect("node cache lock poisoned");
            if let Some(known) = cache.get(node.id()) {
                return known.clone();
            }
        }
        self.cache_node(node);
        node.clone()
    }
}
