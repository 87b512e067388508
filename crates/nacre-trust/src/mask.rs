// crates/nacre-trust/src/mask.rs
//
// Decorator that removes trust from nodes a selection must not land on:
// anything not currently ACTIVE, and the local node itself.

use std::sync::Arc;

use nacre_core::{Node, NodeCollection, NodeStatus};

use crate::context::{TrustContext, TrustResult};
use crate::provider::TrustProvider;

/// Eligibility check applied to every node of the inner result:
/// `(node, status, is_local_node)`.
pub type EligibilityPredicate = dyn Fn(&Node, NodeStatus, bool) -> bool + Send + Sync;

/// Wraps another provider and zeroes the trust of ineligible nodes.
///
/// The surviving mass is renormalized. When every eligible node ended up
/// with zero trust, the mass is spread uniformly over the eligible nodes
/// instead, so a fresh network can still select somebody. With no eligible
/// node at all the zero vector is returned and selection fails upstream.
pub struct ActiveNodeTrustProvider {
    inner: Arc<dyn TrustProvider>,
    node_collection: Arc<NodeCollection>,
    predicate: Box<EligibilityPredicate>,
}

impl ActiveNodeTrustProvider {
    /// Default mask: a node is eligible when ACTIVE and not the local node.
    pub fn new(inner: Arc<dyn TrustProvider>, node_collection: Arc<NodeCollection>) -> Self {
        Self::with_predicate(
            inner,
            node_collection,
            Box::new(|_, status, is_local| status == NodeStatus::Active && !is_local),
        )
    }

    pub fn with_predicate(
        inner: Arc<dyn TrustProvider>,
        node_collection: Arc<NodeCollection>,
        predicate: Box<EligibilityPredicate>,
    ) -> Self {
        Self {
            inner,
            node_collection,
            predicate,
        }
    }
}

impl TrustProvider for ActiveNodeTrustProvider {
    fn compute_trust(&self, context: &TrustContext) -> TrustResult {
        let result = self.inner.compute_trust(context);
        let (nodes, mut values) = result.into_parts();

        let mut eligible = vec![false; nodes.len()];
        for (i, node) in nodes.iter().enumerate() {
            let status = self.node_collection.status(node);
            let is_local = node == context.local_node();
            eligible[i] = (self.predicate)(node, status, is_local);
            if !eligible[i] {
                values.set(i, 0.0);
            }
        }

        if values.sum() > 0.0 {
            values.normalize();
        } else {
            // No eligible node retained any trust; fall back to a uniform
            // distribution over whatever is eligible.
            for (i, &keep) in eligible.iter().enumerate() {
                if keep {
                    values.set(i, 1.0);
                }
            }
            values.normalize();
        }

        TrustResult::new(nodes, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiences::NodeExperiences;
    use crate::pre_trusted::PreTrustedNodes;
    use nacre_core::{ColumnVector, NodeId};
    use std::sync::Mutex;

    fn node(name: &str) -> Node {
        Node::new(NodeId::new(format!("did:nacre:{name}")), format!("http://{name}:7890"))
    }

    /// Provider returning a fixed vector over the context nodes.
    struct FixedTrustProvider {
        values: Vec<f64>,
    }

    impl TrustProvider for FixedTrustProvider {
        fn compute_trust(&self, context: &TrustContext) -> TrustResult {
            TrustResult::new(
                context.nodes().to_vec(),
                ColumnVector::from_values(self.values.clone()),
            )
        }
    }

    /// Five nodes with the local node last, everything ACTIVE.
    fn test_setup(values: Vec<f64>) -> (TrustContext, Arc<NodeCollection>, ActiveNodeTrustProvider) {
        let nodes: Vec<Node> = ["a", "b", "c", "d", "l"].iter().map(|n| node(n)).collect();
        let context = TrustContext::new(
            nodes.clone(),
            node("l"),
            Arc::new(NodeExperiences::new()),
            PreTrustedNodes::default(),
        );
        let collection = Arc::new(NodeCollection::new());
        for n in &nodes {
            collection.update(n.clone(), NodeStatus::Active);
        }
        let provider = ActiveNodeTrustProvider::new(
            Arc::new(FixedTrustProvider { values }),
            Arc::clone(&collection),
        );
        (context, collection, provider)
    }

    fn masked_with_third_node_status(status: NodeStatus) -> ColumnVector {
        let (context, collection, provider) = test_setup(vec![1.0; 5]);
        collection.update(node("c"), status);
        provider.compute_trust(&context).into_parts().1
    }

    #[test]
    fn active_nodes_are_kept() {
        let values = masked_with_third_node_status(NodeStatus::Active);
        assert_eq!(values.get(2), 0.25);
    }

    #[test]
    fn inactive_nodes_are_masked_out() {
        let values = masked_with_third_node_status(NodeStatus::Inactive);
        assert_eq!(values.get(2), 0.0);
    }

    #[test]
    fn failure_nodes_are_masked_out() {
        let values = masked_with_third_node_status(NodeStatus::Failure);
        assert_eq!(values.get(2), 0.0);
    }

    #[test]
    fn busy_nodes_are_masked_out() {
        let values = masked_with_third_node_status(NodeStatus::Busy);
        assert_eq!(values.get(2), 0.0);
    }

    #[test]
    fn the_local_node_is_always_masked_out() {
        let values = masked_with_third_node_status(NodeStatus::Active);
        assert_eq!(values.get(4), 0.0);
    }

    #[test]
    fn surviving_mass_is_renormalized_proportionally() {
        let (context, collection, provider) = test_setup(vec![3.0, 1.0, 5.0, 2.0, 1.0]);
        collection.update(node("b"), NodeStatus::Inactive);
        let values = provider.compute_trust(&context).into_parts().1;
        assert_eq!(values.as_slice(), &[0.3, 0.0, 0.5, 0.2, 0.0]);
    }

    #[test]
    fn tiny_trust_on_one_active_node_is_not_diluted() {
        let (context, _, provider) = test_setup(vec![0.0, 0.0001, 0.0, 0.0, 1.0]);
        let values = provider.compute_trust(&context).into_parts().1;
        assert_eq!(values.as_slice(), &[0.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_trust_over_eligible_nodes_falls_back_to_uniform() {
        let (context, collection, provider) = test_setup(vec![0.0, 0.0001, 0.0, 0.0, 1.0]);
        collection.update(node("b"), NodeStatus::Inactive);
        let values = provider.compute_trust(&context).into_parts().1;
        assert_eq!(
            values.as_slice(),
            &[1.0 / 3.0, 0.0, 1.0 / 3.0, 1.0 / 3.0, 0.0]
        );
    }

    #[test]
    fn all_ineligible_yields_the_zero_vector() {
        let (context, collection, provider) = test_setup(vec![1.0; 5]);
        for name in ["a", "b", "c", "d", "l"] {
            collection.update(node(name), NodeStatus::Inactive);
        }
        let values = provider.compute_trust(&context).into_parts().1;
        assert_eq!(values.as_slice(), &[0.0; 5]);
    }

    #[test]
    fn custom_predicate_sees_every_node_with_status_and_locality() {
        let (context, collection, _) = test_setup(vec![1.0; 5]);
        collection.update(node("a"), NodeStatus::Busy);
        collection.update(node("b"), NodeStatus::Inactive);

        let seen: Arc<Mutex<Vec<(String, NodeStatus, bool)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_by_predicate = Arc::clone(&seen);
        let provider = ActiveNodeTrustProvider::with_predicate(
            Arc::new(FixedTrustProvider { values: vec![1.0; 5] }),
            collection,
            Box::new(move |node, status, is_local| {
                seen_by_predicate
                    .lock()
                    .unwrap()
                    .push((node.id().to_string(), status, is_local));
                true
            }),
        );
        provider.compute_trust(&context);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], ("did:nacre:a".to_string(), NodeStatus::Busy, false));
        assert_eq!(seen[1], ("did:nacre:b".to_string(), NodeStatus::Inactive, false));
        assert_eq!(seen[4], ("did:nacre:l".to_string(), NodeStatus::Active, true));
    }
}
