// crates/nacre-trust/src/experience.rs
//
// Per-(source, peer) interaction record: call counters plus the trust
// scores derived from them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use nacre_core::Node;
use serde::{Deserialize, Serialize};

/// Scores derived from the call counters by the trust computation pass.
#[derive(Debug, Clone, Copy)]
struct DerivedScores {
    /// The source's normalized trust in the peer, in [0, 1].
    local_trust: f64,
    /// The pre-normalization sum the local trust was divided by.
    local_trust_sum: f64,
    /// Converged global trust. Only meaningful on the local node's rows.
    global_trust: f64,
    /// How much the source's reports about other peers should be believed.
    feedback_credibility: f64,
}

impl Default for DerivedScores {
    fn default() -> Self {
        Self {
            local_trust: 0.0,
            local_trust_sum: 0.0,
            global_trust: 0.0,
            feedback_credibility: 1.0,
        }
    }
}

/// Directed interaction record for one (source, peer) pair.
///
/// The call counters are atomics so the networking layer can report
/// outcomes while a trust computation reads them; the computation tolerates
/// slightly stale snapshots. The derived scores are written only by the
/// trust pass and sit behind one lock.
#[derive(Debug, Default)]
pub struct NodeExperience {
    successful_calls: AtomicU64,
    failed_calls: AtomicU64,
    scores: RwLock<DerivedScores>,
    last_update: RwLock<Option<DateTime<Utc>>>,
}

/// Sanitize a score input: non-finite or negative values collapse to zero
/// rather than propagating through the pipeline.
fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

impl NodeExperience {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successful_calls(&self) -> u64 {
        self.successful_calls.load(Ordering::Relaxed)
    }

    pub fn set_successful_calls(&self, calls: u64) {
        self.successful_calls.store(calls, Ordering::Relaxed);
    }

    /// Record one successful interaction with the peer.
    pub fn record_success(&self) {
        self.successful_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed_calls(&self) -> u64 {
        self.failed_calls.load(Ordering::Relaxed)
    }

    pub fn set_failed_calls(&self, calls: u64) {
        self.failed_calls.store(calls, Ordering::Relaxed);
    }

    /// Record one failed interaction with the peer.
    pub fn record_failure(&self) {
        self.failed_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_calls(&self) -> u64 {
        self.successful_calls().saturating_add(self.failed_calls())
    }

    pub fn local_trust(&self) -> f64 {
        self.scores.read().expect("experience lock poisoned").local_trust
    }

    pub fn set_local_trust(&self, value: f64) {
        self.scores.write().expect("experience lock poisoned").local_trust = sanitize(value);
    }

    pub fn local_trust_sum(&self) -> f64 {
        self.scores
            .read()
            .expect("experience lock poisoned")
            .local_trust_sum
    }

    pub fn set_local_trust_sum(&self, value: f64) {
        self.scores
            .write()
            .expect("experience lock poisoned")
            .local_trust_sum = sanitize(value);
    }

    pub fn global_trust(&self) -> f64 {
        self.scores
            .read()
            .expect("experience lock poisoned")
            .global_trust
    }

    pub fn set_global_trust(&self, value: f64) {
        self.scores
            .write()
            .expect("experience lock poisoned")
            .global_trust = sanitize(value);
    }

    pub fn feedback_credibility(&self) -> f64 {
        self.scores
            .read()
            .expect("experience lock poisoned")
            .feedback_credibility
    }

    pub fn set_feedback_credibility(&self, value: f64) {
        self.scores
            .write()
            .expect("experience lock poisoned")
            .feedback_credibility = sanitize(value);
    }

    /// When this record was last refreshed from a peer snapshot. `None`
    /// for records only ever updated by local interaction reporting.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.read().expect("experience lock poisoned")
    }

    pub fn touch(&self, timestamp: DateTime<Utc>) {
        *self.last_update.write().expect("experience lock poisoned") = Some(timestamp);
    }
}

/// Snapshot of one peer's counters, as exchanged with other nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeExperiencePair {
    pub node: Node,
    pub successful_calls: u64,
    pub failed_calls: u64,
}

impl NodeExperiencePair {
    pub fn new(node: Node, successful_calls: u64, failed_calls: u64) -> Self {
        Self {
            node,
            successful_calls,
            failed_calls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_experience_has_zero_counters_and_default_scores() {
        let experience = NodeExperience::new();
        assert_eq!(experience.successful_calls(), 0);
        assert_eq!(experience.failed_calls(), 0);
        assert_eq!(experience.total_calls(), 0);
        assert_eq!(experience.local_trust(), 0.0);
        assert_eq!(experience.local_trust_sum(), 0.0);
        assert_eq!(experience.global_trust(), 0.0);
        assert_eq!(experience.feedback_credibility(), 1.0);
        assert_eq!(experience.last_update(), None);
    }

    #[test]
    fn counters_accumulate() {
        let experience = NodeExperience::new();
        experience.record_success();
        experience.record_success();
        experience.record_failure();
        assert_eq!(experience.successful_calls(), 2);
        assert_eq!(experience.failed_calls(), 1);
        assert_eq!(experience.total_calls(), 3);
    }

    #[test]
    fn non_finite_trust_inputs_are_sanitized_to_zero() {
        let experience = NodeExperience::new();
        experience.set_local_trust(f64::NAN);
        assert_eq!(experience.local_trust(), 0.0);
        experience.set_local_trust(f64::INFINITY);
        assert_eq!(experience.local_trust(), 0.0);
        experience.set_local_trust(-0.5);
        assert_eq!(experience.local_trust(), 0.0);
        experience.set_local_trust(0.7);
        assert_eq!(experience.local_trust(), 0.7);
    }

    #[test]
    fn touch_records_the_snapshot_time() {
        let experience = NodeExperience::new();
        let t = Utc::now();
        experience.touch(t);
        assert_eq!(experience.last_update(), Some(t));
    }
}
