// crates/nacre-core/src/lib.rs
//
// nacre-core: Core node types, math primitives, and time source for the
// Nacre Protocol.
//
// This is the leaf crate the rest of the workspace depends on. It defines
// the node model the peer network shares, the dense linear-algebra types
// the trust engine computes with, and the clock abstraction that keeps
// time-dependent components testable.

pub mod error;
pub mod math;
pub mod node;
pub mod time;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use nacre_core::Node;`

// Node types
pub use node::{Node, NodeCollection, NodeId, NodeStatus};

// Math types
pub use math::{ColumnVector, Matrix};

// Time types
pub use time::{SystemTimeProvider, TimeProvider};

// Error type
pub use error::NacreError;
