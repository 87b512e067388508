// crates/nacre-trust/src/selector.rs
//
// Weighted random peer selection over a computed trust vector, and the
// pre-trust-aware wrapper that guarantees a bootstrap path when regular
// selection comes up empty.

use std::sync::Arc;

use nacre_core::{Node, NodeCollection};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::context::TrustContext;
use crate::error::TrustError;
use crate::experience::NodeExperience;
use crate::provider::TrustProvider;

/// A selected peer paired with the local node's experience record for it,
/// so the caller can report the interaction outcome straight back.
pub type SelectedNode = (Node, Arc<NodeExperience>);

/// Chooses communication partners for the synchronization loop.
pub trait NodeSelector: Send + Sync {
    /// One weighted draw. Fails with `TrustError::NoEligiblePeers` when no
    /// node retains any trust mass.
    fn select_node(&self, context: &TrustContext) -> Result<SelectedNode, TrustError>;

    /// Up to `max_nodes` draws without replacement. May return fewer when
    /// the trust mass runs out.
    fn select_nodes(&self, context: &TrustContext, max_nodes: usize) -> Vec<SelectedNode>;
}

/// Roulette selection: a uniform draw walks the node list accumulating
/// trust mass until it passes the drawn value.
pub struct BasicNodeSelector {
    provider: Arc<dyn TrustProvider>,
}

impl BasicNodeSelector {
    pub fn new(provider: Arc<dyn TrustProvider>) -> Self {
        Self { provider }
    }

    pub fn select_node_with<R: Rng>(
        &self,
        context: &TrustContext,
        rng: &mut R,
    ) -> Result<SelectedNode, TrustError> {
        let (nodes, mut trust) = self.provider.compute_trust(context).into_parts();
        trust.normalize();

        let drawn: f64 = rng.gen();
        let mut sum = 0.0;
        for (i, node) in nodes.iter().enumerate() {
            sum += trust.get(i);
            if sum > drawn {
                return Ok(self.pair(context, node));
            }
        }
        Err(TrustError::NoEligiblePeers)
    }

    pub fn select_nodes_with<R: Rng>(
        &self,
        context: &TrustContext,
        max_nodes: usize,
        rng: &mut R,
    ) -> Vec<SelectedNode> {
        let (nodes, mut trust) = self.provider.compute_trust(context).into_parts();
        trust.normalize();

        let mut used = vec![false; nodes.len()];
        let mut remaining = trust.sum();
        let mut selected = Vec::new();

        while selected.len() < max_nodes && remaining > 0.0 {
            let drawn = rng.gen::<f64>() * remaining;
            let mut sum = 0.0;
            let mut hit = None;
            for (i, used_before) in used.iter().enumerate() {
                if *used_before {
                    continue;
                }
                sum += trust.get(i);
                if sum > drawn {
                    hit = Some(i);
                    break;
                }
            }
            let Some(i) = hit else {
                break;
            };
            used[i] = true;
            remaining -= trust.get(i);
            selected.push(self.pair(context, &nodes[i]));
        }
        selected
    }

    fn pair(&self, context: &TrustContext, node: &Node) -> SelectedNode {
        let experience = context.experiences().experience(context.local_node(), node);
        (node.clone(), experience)
    }
}

impl NodeSelector for BasicNodeSelector {
    fn select_node(&self, context: &TrustContext) -> Result<SelectedNode, TrustError> {
        self.select_node_with(context, &mut rand::thread_rng())
    }

    fn select_nodes(&self, context: &TrustContext, max_nodes: usize) -> Vec<SelectedNode> {
        self.select_nodes_with(context, max_nodes, &mut rand::thread_rng())
    }
}

/// Wraps another selector and falls back to the pre-trusted set, so a node
/// always has somewhere to turn even when every scored peer is exhausted
/// or the trust vector collapsed to zero.
pub struct PreTrustAwareNodeSelector {
    inner: Box<dyn NodeSelector>,
    node_collection: Arc<NodeCollection>,
}

impl PreTrustAwareNodeSelector {
    pub fn new(inner: Box<dyn NodeSelector>, node_collection: Arc<NodeCollection>) -> Self {
        Self {
            inner,
            node_collection,
        }
    }

    pub fn select_node_with<R: Rng>(
        &self,
        context: &TrustContext,
        rng: &mut R,
    ) -> Result<SelectedNode, TrustError> {
        match self.inner.select_node(context) {
            Ok(selected) => Ok(selected),
            Err(TrustError::NoEligiblePeers) => self.fallback_node(context, rng),
            Err(e) => Err(e),
        }
    }

    pub fn select_nodes_with<R: Rng>(
        &self,
        context: &TrustContext,
        max_nodes: usize,
        rng: &mut R,
    ) -> Vec<SelectedNode> {
        let mut selected = self.inner.select_nodes(context, max_nodes);

        let online = self.online_pre_trusted(context);
        let extras: Vec<Node> = if online.is_empty() {
            // Everything pre-trusted looks offline; take them all and let
            // the caller discover which ones answer.
            self.offline_fallback_candidates(context)
        } else if context.pre_trusted().is_pre_trusted(context.local_node()) {
            online
        } else {
            online.choose(rng).cloned().into_iter().collect()
        };

        for node in extras {
            if selected.iter().any(|(selected_node, _)| *selected_node == node) {
                continue;
            }
            let experience = context.experiences().experience(context.local_node(), &node);
            selected.push((node, experience));
        }
        selected
    }

    fn fallback_node<R: Rng>(
        &self,
        context: &TrustContext,
        rng: &mut R,
    ) -> Result<SelectedNode, TrustError> {
        let online = self.online_pre_trusted(context);
        let candidates = if online.is_empty() {
            self.offline_fallback_candidates(context)
        } else {
            online
        };
        let node = candidates.choose(rng).ok_or(TrustError::NoEligiblePeers)?;
        let experience = context.experiences().experience(context.local_node(), node);
        Ok((node.clone(), experience))
    }

    fn online_pre_trusted(&self, context: &TrustContext) -> Vec<Node> {
        context
            .pre_trusted()
            .nodes()
            .filter(|node| *node != context.local_node() && self.node_collection.is_active(node))
            .cloned()
            .collect()
    }

    fn offline_fallback_candidates(&self, context: &TrustContext) -> Vec<Node> {
        context
            .pre_trusted()
            .nodes()
            .filter(|node| *node != context.local_node())
            .cloned()
            .collect()
    }
}

impl NodeSelector for PreTrustAwareNodeSelector {
    fn select_node(&self, context: &TrustContext) -> Result<SelectedNode, TrustError> {
        self.select_node_with(context, &mut rand::thread_rng())
    }

    fn select_nodes(&self, context: &TrustContext, max_nodes: usize) -> Vec<SelectedNode> {
        self.select_nodes_with(context, max_nodes, &mut rand::thread_rng())
    }
}
