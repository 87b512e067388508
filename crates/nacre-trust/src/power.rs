// crates/nacre-trust/src/power.rs
//
// Damped power iteration over the trust matrix. Finds the fixed point
//
//     t = (1 - alpha) * M * t + alpha * p
//
// where p is the pre-trust vector and alpha anchors the result against
// runaway collusion. The iteration bound doubles as the cost bound, so a
// trust recomputation stays cheap enough to run periodically.

use nacre_core::{ColumnVector, Matrix};

use crate::config::EigenTrustConfig;

/// Runs the damped power iteration to convergence or the iteration cap.
#[derive(Debug)]
pub struct TrustPowerIterator {
    pre_trust: ColumnVector,
    matrix: Matrix,
    alpha: f64,
    epsilon: f64,
    max_iterations: u32,
    converged: bool,
    iterations: u32,
}

impl TrustPowerIterator {
    /// Panics when the matrix is not square over the pre-trust length.
    pub fn new(pre_trust: ColumnVector, matrix: Matrix, config: &EigenTrustConfig) -> Self {
        assert_eq!(
            matrix.row_count(),
            pre_trust.len(),
            "trust matrix rows must match the pre-trust vector"
        );
        assert_eq!(
            matrix.column_count(),
            pre_trust.len(),
            "trust matrix columns must match the pre-trust vector"
        );
        Self {
            pre_trust,
            matrix,
            alpha: config.alpha,
            epsilon: config.epsilon,
            max_iterations: config.max_iterations,
            converged: false,
            iterations: 0,
        }
    }

    /// Iterate from the pre-trust vector until successive iterates are
    /// within epsilon of each other, or the iteration cap is reached.
    /// Always returns the last iterate; check `has_converged` for whether
    /// the threshold was met.
    pub fn run(&mut self) -> ColumnVector {
        let mut current = self.pre_trust.clone();
        self.converged = false;
        self.iterations = 0;

        while self.iterations < self.max_iterations {
            let next = self.step(&current);
            let delta = current.distance(&next);
            current = next;
            self.iterations += 1;
            if delta <= self.epsilon {
                self.converged = true;
                break;
            }
        }

        tracing::trace!(
            iterations = self.iterations,
            converged = self.converged,
            "power iteration finished"
        );
        current
    }

    fn step(&self, current: &ColumnVector) -> ColumnVector {
        let mut next = self
            .matrix
            .multiply(current)
            .scale(1.0 - self.alpha)
            .add(&self.pre_trust.scale(self.alpha));
        next.align();
        next.normalize();
        next
    }

    pub fn has_converged(&self) -> bool {
        self.converged
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}
