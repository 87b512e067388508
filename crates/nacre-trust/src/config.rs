// crates/nacre-trust/src/config.rs
//
// Configuration for the EigenTrust power iteration.

use serde::{Deserialize, Serialize};

/// Configuration for the damped power iteration that converges the global
/// trust vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EigenTrustConfig {
    /// Weight given to the pre-trust vector at each step. Default: 0.05.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Convergence threshold (Euclidean distance between successive
    /// iterates). Default: 1e-4.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Maximum iterations before the computation is cut off. Default: 10.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_alpha() -> f64 {
    0.05
}

fn default_epsilon() -> f64 {
    1e-4
}

fn default_max_iterations() -> u32 {
    10
}

impl Default for EigenTrustConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            epsilon: default_epsilon(),
            max_iterations: default_max_iterations(),
        }
    }
}
