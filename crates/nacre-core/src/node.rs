// crates/nacre-core/src/node.rs
//
// Node identity, status, and the shared status registry for the Nacre
// peer network.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// Identity of a node on the Nacre network.
///
/// A DID derived from the node's long-term key (e.g., "did:nacre:0xabc...").
/// Key material itself is owned by the crypto layer; the trust engine only
/// needs a stable, hashable identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node known to the peer network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    /// Stable identity.
    id: NodeId,
    /// Publicly reachable URL (e.g., "http://10.0.0.2:7890").
    endpoint: String,
}

impl Node {
    pub fn new(id: NodeId, endpoint: impl Into<String>) -> Self {
        Self {
            id,
            endpoint: endpoint.into(),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Communication status of a node, updated by the networking layer after
/// every exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    /// Responding normally.
    Active,
    /// Responding but overloaded.
    Busy,
    /// Did not respond to the last contact attempt.
    Inactive,
    /// Repeated failures; candidate for removal.
    Failure,
}

/// Shared registry of known nodes and their current statuses.
///
/// Written by the networking layer, read by the trust engine (the active
/// mask and the pre-trust-aware selector). Nodes never seen by the
/// registry report `Failure`.
#[derive(Debug, Default)]
pub struct NodeCollection {
    nodes: RwLock<HashMap<NodeId, (Node, NodeStatus)>>,
}

impl NodeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a node with the given status.
    pub fn update(&self, node: Node, status: NodeStatus) {
        let mut nodes = self.nodes.write().expect("node collection lock poisoned");
        nodes.insert(node.id().clone(), (node, status));
    }

    /// Current status of `node`, `Failure` when unknown.
    pub fn status(&self, node: &Node) -> NodeStatus {
        let nodes = self.nodes.read().expect("node collection lock poisoned");
        nodes
            .get(node.id())
            .map(|(_, status)| *status)
            .unwrap_or(NodeStatus::Failure)
    }

    pub fn is_active(&self, node: &Node) -> bool {
        self.status(node) == NodeStatus::Active
    }

    /// All nodes currently marked `Active`.
    pub fn active_nodes(&self) -> Vec<Node> {
        let nodes = self.nodes.read().expect("node collection lock poisoned");
        nodes
            .values()
            .filter(|(_, status)| *status == NodeStatus::Active)
            .map(|(node, _)| node.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.read().expect("node collection lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
