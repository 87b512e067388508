// crates/nacre-trust/src/context.rs
//
// The immutable inputs of one trust computation, and its result.

use std::sync::Arc;

use nacre_core::{ColumnVector, Node};

use crate::experiences::NodeExperiences;
use crate::pre_trusted::PreTrustedNodes;

/// Snapshot of the network handed into every trust computation.
///
/// Assembled fresh by the peer-network component before each round; the
/// trust engine never mutates it. By convention `nodes` includes the local
/// node as its last element.
#[derive(Debug, Clone)]
pub struct TrustContext {
    nodes: Vec<Node>,
    local_node: Node,
    experiences: Arc<NodeExperiences>,
    pre_trusted: PreTrustedNodes,
}

impl TrustContext {
    pub fn new(
        nodes: Vec<Node>,
        local_node: Node,
        experiences: Arc<NodeExperiences>,
        pre_trusted: PreTrustedNodes,
    ) -> Self {
        Self {
            nodes,
            local_node,
            experiences,
            pre_trusted,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn local_node(&self) -> &Node {
        &self.local_node
    }

    pub fn experiences(&self) -> &Arc<NodeExperiences> {
        &self.experiences
    }

    pub fn pre_trusted(&self) -> &PreTrustedNodes {
        &self.pre_trusted
    }
}

/// A computed trust vector, aligned 1:1 with its node slice.
#[derive(Debug, Clone)]
pub struct TrustResult {
    nodes: Vec<Node>,
    values: ColumnVector,
}

impl TrustResult {
    /// Panics unless there is exactly one value per node.
    pub fn new(nodes: Vec<Node>, values: ColumnVector) -> Self {
        assert_eq!(
            nodes.len(),
            values.len(),
            "trust result requires one value per node"
        );
        Self { nodes, values }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn values(&self) -> &ColumnVector {
        &self.values
    }

    pub fn into_parts(self) -> (Vec<Node>, ColumnVector) {
        (self.nodes, self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nacre_core::NodeId;

    fn node(name: &str) -> Node {
        Node::new(NodeId::new(format!("did:nacre:{name}")), format!("http://{name}:7890"))
    }

    #[test]
    fn context_exposes_its_parts() {
        let nodes = vec![node("a"), node("l")];
        let context = TrustContext::new(
            nodes.clone(),
            node("l"),
            Arc::new(NodeExperiences::new()),
            PreTrustedNodes::default(),
        );
        assert_eq!(context.nodes(), nodes.as_slice());
        assert_eq!(context.local_node(), &node("l"));
        assert!(context.pre_trusted().is_empty());
    }

    #[test]
    fn trust_result_pairs_nodes_with_values() {
        let result = TrustResult::new(
            vec![node("a"), node("b")],
            ColumnVector::from_values(vec![0.25, 0.75]),
        );
        assert_eq!(result.nodes().len(), 2);
        assert_eq!(result.values().get(1), 0.75);
    }

    #[test]
    #[should_panic(expected = "one value per node")]
    fn mismatched_trust_result_panics() {
        TrustResult::new(vec![node("a")], ColumnVector::new(2));
    }
}
