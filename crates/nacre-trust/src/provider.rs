// crates/nacre-trust/src/provider.rs
//
// The TrustProvider contract, the uniform baseline, and the assembly of
// the provider chain a Nacre node boots with.

use std::sync::Arc;

use nacre_core::{ColumnVector, NodeCollection, TimeProvider};

use crate::cache::CachedTrustProvider;
use crate::config::EigenTrustConfig;
use crate::context::{TrustContext, TrustResult};
use crate::eigentrust::{EigenTrust, EigenTrustProvider};
use crate::low_com::LowComTrustProvider;
use crate::mask::ActiveNodeTrustProvider;

/// Seconds a computed trust vector stays fresh in the standard chain.
const TRUST_CACHE_SECS: i64 = 300;

/// Boost weight for rarely contacted nodes in the standard chain.
const LOW_COMMUNICATION_WEIGHT: u32 = 30;

/// Computes a trust vector for a network snapshot.
///
/// A pure function of the context: implementations never mutate the
/// context itself (internal caches are provider state, not context state).
pub trait TrustProvider: Send + Sync {
    /// The trust vector aligned 1:1 with the nodes of the returned result.
    fn compute_trust(&self, context: &TrustContext) -> TrustResult;
}

/// Equal score for every node. Deterministic fallback and testing baseline.
#[derive(Debug, Default)]
pub struct UniformTrustProvider;

impl TrustProvider for UniformTrustProvider {
    fn compute_trust(&self, context: &TrustContext) -> TrustResult {
        let mut values = ColumnVector::new(context.nodes().len());
        values.set_all(1.0);
        values.normalize();
        TrustResult::new(context.nodes().to_vec(), values)
    }
}

/// The provider chain a node boots with.
///
/// The cache wraps the expensive EigenTrust++/low-communication pipeline;
/// the activity mask sits outside it so status changes apply to every
/// selection, not just cache misses.
pub fn standard_trust_provider(
    node_collection: Arc<NodeCollection>,
    time_provider: Arc<dyn TimeProvider>,
    config: EigenTrustConfig,
) -> Arc<dyn TrustProvider> {
    let eigen_trust = EigenTrustProvider::new(EigenTrust::plus_plus(config));
    let boosted = LowComTrustProvider::new(Arc::new(eigen_trust), LOW_COMMUNICATION_WEIGHT);
    let cached = CachedTrustProvider::new(Arc::new(boosted), TRUST_CACHE_SECS, time_provider);
    Arc::new(ActiveNodeTrustProvider::new(
        Arc::new(cached),
        node_collection,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiences::NodeExperiences;
    use crate::pre_trusted::PreTrustedNodes;
    use nacre_core::{Node, NodeId, NodeStatus, SystemTimeProvider};

    fn node(name: &str) -> Node {
        Node::new(NodeId::new(format!("did:nacre:{name}")), format!("http://{name}:7890"))
    }

    fn context(names: &[&str], local: &str) -> TrustContext {
        TrustContext::new(
            names.iter().map(|n| node(n)).collect(),
            node(local),
            Arc::new(NodeExperiences::new()),
            PreTrustedNodes::default(),
        )
    }

    #[test]
    fn uniform_provider_scores_all_nodes_equally() {
        let context = context(&["a", "b", "c", "l"], "l");
        let result = UniformTrustProvider.compute_trust(&context);
        assert_eq!(result.nodes().len(), 4);
        for i in 0..4 {
            assert!((result.values().get(i) - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn standard_chain_produces_a_normalized_vector_over_active_peers() {
        let collection = Arc::new(NodeCollection::new());
        for name in ["a", "b", "l"] {
            collection.update(node(name), NodeStatus::Active);
        }
        let provider = standard_trust_provider(
            collection,
            Arc::new(SystemTimeProvider),
            EigenTrustConfig::default(),
        );

        let context = context(&["a", "b", "l"], "l");
        let result = provider.compute_trust(&context);

        assert_eq!(result.nodes().len(), 3);
        assert!((result.values().sum() - 1.0).abs() < 1e-9);
        // The chain masks the local node before selection.
        assert_eq!(result.values().get(2), 0.0);
    }
}
