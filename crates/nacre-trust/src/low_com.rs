// crates/nacre-trust/src/low_com.rs
//
// Decorator that boosts rarely contacted nodes so the network keeps
// discovering and vetting new peers instead of entrenching only the
// already-trusted ones.

use std::sync::Arc;

use nacre_core::ColumnVector;

use crate::context::{TrustContext, TrustResult};
use crate::provider::TrustProvider;

/// Total calls with the local node below which a peer counts as
/// under-communicated.
pub const MIN_COMMUNICATION: u64 = 10;

/// Wraps another provider and adds a normalized low-communication
/// indicator vector, scaled by `weight / 100`, to the inner trust vector.
pub struct LowComTrustProvider {
    inner: Arc<dyn TrustProvider>,
    weight: u32,
}

impl LowComTrustProvider {
    pub fn new(inner: Arc<dyn TrustProvider>, weight: u32) -> Self {
        Self { inner, weight }
    }
}

impl TrustProvider for LowComTrustProvider {
    fn compute_trust(&self, context: &TrustContext) -> TrustResult {
        let result = self.inner.compute_trust(context);
        let (nodes, mut trust) = result.into_parts();
        trust.normalize();

        let mut low_com = ColumnVector::new(nodes.len());
        let experiences = context.experiences();
        for (i, node) in nodes.iter().enumerate() {
            let total = experiences.total_calls(context.local_node(), node);
            if total < MIN_COMMUNICATION {
                low_com.set(i, 1.0);
            }
        }
        low_com.normalize();

        let mut combined = trust.add(&low_com.scale(f64::from(self.weight) / 100.0));
        combined.normalize();
        TrustResult::new(nodes, combined)
    }
}
