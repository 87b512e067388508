// crates/nacre-trust/src/eigentrust.rs
//
// EigenTrust / EigenTrust++ core: derives local trust from experience
// counters, weighs reporters by feedback credibility, and converges the
// global trust vector.

use nacre_core::{ColumnVector, Matrix};

use crate::config::EigenTrustConfig;
use crate::context::{TrustContext, TrustResult};
use crate::error::TrustError;
use crate::experience::NodeExperience;
use crate::power::TrustPowerIterator;
use crate::provider::TrustProvider;

/// Scoring strategy plugged into the EigenTrust core.
///
/// The engine and the power iteration depend only on this trait, so the
/// first-generation EigenTrust formula, EigenTrust++, and the uniform
/// baseline stay interchangeable.
pub trait ScoreStrategy: Send + Sync {
    /// Raw (pre-normalization) trust derived from the call counters.
    /// Invoked only when at least one call was recorded.
    fn trust_score(&self, successful_calls: u64, failed_calls: u64) -> f64;

    /// Squared disagreement between the local node's record for a common
    /// third party and a reporter's record for the same third party.
    fn credibility_score(&self, local: &NodeExperience, remote: &NodeExperience) -> f64;
}

/// Equal raw trust for every contacted peer; reports never disagree.
/// Deterministic baseline for tests and fallback wiring.
#[derive(Debug, Default)]
pub struct UniformScoring;

impl ScoreStrategy for UniformScoring {
    fn trust_score(&self, _successful_calls: u64, _failed_calls: u64) -> f64 {
        1.0
    }

    fn credibility_score(&self, _local: &NodeExperience, _remote: &NodeExperience) -> f64 {
        0.0
    }
}

/// First-generation EigenTrust: failures subtract from successes, clamped
/// at zero.
#[derive(Debug, Default)]
pub struct EigenTrustScoring;

impl ScoreStrategy for EigenTrustScoring {
    fn trust_score(&self, successful_calls: u64, failed_calls: u64) -> f64 {
        let total = successful_calls + failed_calls;
        let score = successful_calls as f64 - failed_calls as f64;
        (score / total as f64).max(0.0)
    }

    fn credibility_score(&self, _local: &NodeExperience, _remote: &NodeExperience) -> f64 {
        0.0
    }
}

/// EigenTrust++: success ratio for trust, and report disagreement measured
/// on the un-normalized raw scores (local trust times its pre-normalization
/// sum), so normalization cannot hide large disagreements.
#[derive(Debug, Default)]
pub struct EigenTrustPlusPlusScoring;

impl ScoreStrategy for EigenTrustPlusPlusScoring {
    fn trust_score(&self, successful_calls: u64, failed_calls: u64) -> f64 {
        let total = successful_calls + failed_calls;
        successful_calls as f64 / total as f64
    }

    fn credibility_score(&self, local: &NodeExperience, remote: &NodeExperience) -> f64 {
        let local_raw = local.local_trust() * local.local_trust_sum();
        let remote_raw = remote.local_trust() * remote.local_trust_sum();
        let diff = local_raw - remote_raw;
        diff * diff
    }
}

/// The EigenTrust computation engine.
pub struct EigenTrust {
    strategy: Box<dyn ScoreStrategy>,
    config: EigenTrustConfig,
}

impl EigenTrust {
    pub fn new(strategy: Box<dyn ScoreStrategy>, config: EigenTrustConfig) -> Self {
        Self { strategy, config }
    }

    /// Engine with the EigenTrust++ strategy, the network default.
    pub fn plus_plus(config: EigenTrustConfig) -> Self {
        Self::new(Box::new(EigenTrustPlusPlusScoring), config)
    }

    /// Run the full pipeline for `context` and return the converged
    /// global trust vector, aligned with `context.nodes()`.
    pub fn compute(&self, context: &TrustContext) -> ColumnVector {
        self.update_local_trust(context);
        self.update_feedback_credibility(context);

        let matrix = self.trust_matrix(context);
        let pre_trust = context.pre_trusted().pre_trust_vector(context.nodes());

        let mut iterator = TrustPowerIterator::new(pre_trust, matrix, &self.config);
        let vector = iterator.run();
        if !iterator.has_converged() {
            tracing::warn!(
                iterations = iterator.iterations(),
                epsilon = self.config.epsilon,
                "global trust did not converge; using the last iterate"
            );
        }
        vector
    }

    /// Derive each node's local-trust distribution over the context nodes.
    ///
    /// A node with recorded calls scores peers by the strategy's call
    /// ratio; with no experience it trusts only pre-trusted peers and
    /// itself. Each row is normalized to sum to 1, and the
    /// pre-normalization sum is kept for credibility scoring.
    fn update_local_trust(&self, context: &TrustContext) {
        let nodes = context.nodes();
        let experiences = context.experiences();

        for source in nodes {
            let mut raw = Vec::with_capacity(nodes.len());
            let mut sum = 0.0;
            for peer in nodes {
                let experience = experiences.experience(source, peer);
                let score = if experience.total_calls() > 0 {
                    self.strategy
                        .trust_score(experience.successful_calls(), experience.failed_calls())
                } else if context.pre_trusted().is_pre_trusted(peer) || source == peer {
                    1.0
                } else {
                    0.0
                };
                sum += score.abs();
                raw.push(score);
            }

            for (peer, score) in nodes.iter().zip(raw) {
                let experience = experiences.experience(source, peer);
                if sum > 0.0 {
                    experience.set_local_trust(score / sum);
                } else {
                    experience.set_local_trust(0.0);
                }
                experience.set_local_trust_sum(sum);
            }
        }
    }

    /// Update the local node's credibility assessment of every peer by
    /// correlating reports about common third parties.
    ///
    /// A peer without common third parties keeps its current credibility
    /// for the round. A peer whose computation degenerates is logged and
    /// skipped; one bad record must not abort the round.
    fn update_feedback_credibility(&self, context: &TrustContext) {
        let nodes = context.nodes();
        let local = context.local_node();
        let experiences = context.experiences();

        experiences
            .experience(local, local)
            .set_feedback_credibility(1.0);

        let shared = experiences.shared_experience_matrix(local, nodes);
        for (i, peer) in nodes.iter().enumerate() {
            if peer == local {
                continue;
            }
            match self.peer_credibility(context, &shared, i) {
                Ok(Some(credibility)) => {
                    experiences
                        .experience(local, peer)
                        .set_feedback_credibility(credibility);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(peer = %peer.id(), error = %e, "skipping credibility update");
                }
            }
        }
    }

    /// Credibility of the reporter at index `i`, or `None` when there is
    /// no common third party to compare against this round.
    fn peer_credibility(
        &self,
        context: &TrustContext,
        shared: &Matrix,
        i: usize,
    ) -> Result<Option<f64>, TrustError> {
        let nodes = context.nodes();
        let local = context.local_node();
        let peer = &nodes[i];
        let experiences = context.experiences();

        let mut diff_sum = 0.0;
        let mut common = 0u32;
        for (j, third_party) in nodes.iter().enumerate() {
            if shared.get(i, j) == 0.0 {
                continue;
            }
            let local_view = experiences.experience(local, third_party);
            let peer_view = experiences.experience(peer, third_party);
            diff_sum += self.strategy.credibility_score(&local_view, &peer_view);
            common += 1;
        }
        if common == 0 {
            return Ok(None);
        }

        let mean = diff_sum / f64::from(common);
        if !mean.is_finite() {
            return Err(TrustError::Credibility {
                peer: peer.id().to_string(),
                reason: format!("non-finite report disagreement {mean}"),
            });
        }

        // The fourth power pushes even moderately inconsistent reporters
        // toward zero while keeping consistent ones near one. Divergence
        // past the unit disagreement floors at zero.
        let similarity = 1.0 - mean.sqrt();
        let credibility = if similarity <= 0.0 {
            0.0
        } else {
            similarity.powi(4).min(1.0)
        };
        Ok(Some(credibility))
    }

    /// The column-normalized trust matrix: column i is node i's local
    /// trust distribution, scaled by the local node's credibility
    /// assessment of node i.
    fn trust_matrix(&self, context: &TrustContext) -> Matrix {
        let nodes = context.nodes();
        let experiences = context.experiences();
        let mut matrix = experiences.transposed_local_trust_matrix(nodes);
        for (i, reporter) in nodes.iter().enumerate() {
            if reporter == context.local_node() {
                continue;
            }
            matrix.scale_column(i, experiences.feedback_credibility(context.local_node(), reporter));
        }
        matrix.normalize_columns();
        matrix
    }
}

/// `TrustProvider` over the EigenTrust engine. Also records the converged
/// scores on the local node's experience rows so the rest of the node can
/// read per-peer global trust without re-running the pipeline.
pub struct EigenTrustProvider {
    engine: EigenTrust,
}

impl EigenTrustProvider {
    pub fn new(engine: EigenTrust) -> Self {
        Self { engine }
    }
}

impl TrustProvider for EigenTrustProvider {
    fn compute_trust(&self, context: &TrustContext) -> TrustResult {
        let vector = self.engine.compute(context);
        context
            .experiences()
            .set_global_trust(context.local_node(), context.nodes(), &vector);
        TrustResult::new(context.nodes().to_vec(), vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiences::NodeExperiences;
    use crate::pre_trusted::PreTrustedNodes;
    use nacre_core::{Node, NodeId};
    use std::sync::Arc;

    fn node(name: &str) -> Node {
        Node::new(NodeId::new(format!("did:nacre:{name}")), format!("http://{name}:7890"))
    }

    /// Three nodes {a, b, c} with c as the local node; a is pre-trusted.
    fn three_node_context(experiences: Arc<NodeExperiences>) -> TrustContext {
        let nodes = vec![node("a"), node("b"), node("c")];
        let pre_trusted: PreTrustedNodes = [node("a")].into_iter().collect();
        TrustContext::new(nodes, node("c"), experiences, pre_trusted)
    }

    #[test]
    fn zero_experience_node_trusts_only_pre_trusted_peers_and_itself() {
        let experiences = Arc::new(NodeExperiences::new());
        let context = three_node_context(Arc::clone(&experiences));
        let engine = EigenTrust::plus_plus(EigenTrustConfig::default());

        engine.update_local_trust(&context);

        // c has no experience: mass splits between the pre-trusted a and
        // c itself, with nothing for b.
        let c = node("c");
        assert_eq!(experiences.local_trust(&c, &node("a")), 0.5);
        assert_eq!(experiences.local_trust(&c, &node("b")), 0.0);
        assert_eq!(experiences.local_trust(&c, &c), 0.5);
        assert_eq!(experiences.experience(&c, &node("a")).local_trust_sum(), 2.0);
    }

    #[test]
    fn local_trust_follows_the_success_ratio() {
        let experiences = Arc::new(NodeExperiences::new());
        let context = three_node_context(Arc::clone(&experiences));
        let engine = EigenTrust::plus_plus(EigenTrustConfig::default());

        // b: 9 successful / 1 failed calls with a.
        let b = node("b");
        let ab = experiences.experience(&b, &node("a"));
        ab.set_successful_calls(9);
        ab.set_failed_calls(1);

        engine.update_local_trust(&context);

        // Raw scores for b's row: a = 0.9, b (self, no calls) = 1.0, c = 0.
        let sum = 1.9;
        assert!((experiences.local_trust(&b, &node("a")) - 0.9 / sum).abs() < 1e-12);
        assert!((experiences.local_trust(&b, &b) - 1.0 / sum).abs() < 1e-12);
        assert_eq!(experiences.local_trust(&b, &node("c")), 0.0);
    }

    #[test]
    fn first_generation_scoring_penalizes_failures() {
        let strategy = EigenTrustScoring;
        assert!((strategy.trust_score(9, 1) - 0.8).abs() < 1e-12);
        assert_eq!(strategy.trust_score(1, 9), 0.0);
    }

    #[test]
    fn consistent_reporter_keeps_credibility_near_one() {
        let experiences = Arc::new(NodeExperiences::new());
        let context = three_node_context(Arc::clone(&experiences));
        let engine = EigenTrust::plus_plus(EigenTrustConfig::default());

        // Local node c and reporter b both saw a behave identically.
        for source in [node("c"), node("b")] {
            let experience = experiences.experience(&source, &node("a"));
            experience.set_successful_calls(8);
            experience.set_failed_calls(2);
        }

        engine.update_local_trust(&context);
        engine.update_feedback_credibility(&context);

        let credibility = experiences.feedback_credibility(&node("c"), &node("b"));
        assert!(
            credibility > 0.95,
            "identical reports should stay credible, got {credibility}"
        );
    }

    #[test]
    fn divergent_reporter_loses_credibility() {
        let experiences = Arc::new(NodeExperiences::new());
        let context = three_node_context(Arc::clone(&experiences));
        let engine = EigenTrust::plus_plus(EigenTrustConfig::default());

        // c saw a fail every call; b claims a succeeded every call.
        let ca = experiences.experience(&node("c"), &node("a"));
        ca.set_failed_calls(10);
        let ba = experiences.experience(&node("b"), &node("a"));
        ba.set_successful_calls(10);

        engine.update_local_trust(&context);
        engine.update_feedback_credibility(&context);

        let credibility = experiences.feedback_credibility(&node("c"), &node("b"));
        assert!(
            credibility < 0.2,
            "sharply divergent reports should collapse credibility, got {credibility}"
        );
    }

    #[test]
    fn reporter_without_common_third_parties_keeps_default_credibility() {
        let experiences = Arc::new(NodeExperiences::new());
        let context = three_node_context(Arc::clone(&experiences));
        let engine = EigenTrust::plus_plus(EigenTrustConfig::default());

        // Only b has any experience; c shares nothing with it.
        experiences
            .experience(&node("b"), &node("a"))
            .set_successful_calls(5);

        engine.update_local_trust(&context);
        engine.update_feedback_credibility(&context);

        assert_eq!(experiences.feedback_credibility(&node("c"), &node("b")), 1.0);
    }

    #[test]
    fn local_node_credibility_in_itself_is_one() {
        let experiences = Arc::new(NodeExperiences::new());
        let context = three_node_context(Arc::clone(&experiences));
        let engine = EigenTrust::plus_plus(EigenTrustConfig::default());

        engine.update_feedback_credibility(&context);

        assert_eq!(experiences.feedback_credibility(&node("c"), &node("c")), 1.0);
    }

    #[test]
    fn bootstrap_scenario_ranks_the_pre_trusted_node_first() {
        // {a, b, c}: a pre-trusted, b has 9/1 calls with a, c has none.
        let experiences = Arc::new(NodeExperiences::new());
        let context = three_node_context(Arc::clone(&experiences));
        let ba = experiences.experience(&node("b"), &node("a"));
        ba.set_successful_calls(9);
        ba.set_failed_calls(1);

        let config = EigenTrustConfig {
            alpha: 0.2,
            epsilon: 1e-6,
            max_iterations: 50,
        };
        let engine = EigenTrust::plus_plus(config);
        let vector = engine.compute(&context);

        assert!((vector.sum() - 1.0).abs() < 1e-9);
        let (a, b, c) = (vector.get(0), vector.get(1), vector.get(2));
        assert!(a >= b, "pre-trusted a ({a}) should outrank b ({b})");
        assert!(b >= c, "experienced b ({b}) should outrank silent c ({c})");
    }

    #[test]
    fn provider_records_global_trust_on_the_local_rows() {
        let experiences = Arc::new(NodeExperiences::new());
        let context = three_node_context(Arc::clone(&experiences));
        let provider = EigenTrustProvider::new(EigenTrust::plus_plus(EigenTrustConfig::default()));

        let result = provider.compute_trust(&context);

        assert_eq!(result.nodes(), context.nodes());
        for (i, peer) in context.nodes().iter().enumerate() {
            let recorded = experiences.experience(&node("c"), peer).global_trust();
            assert!((recorded - result.values().get(i)).abs() < 1e-12);
        }
    }
}
