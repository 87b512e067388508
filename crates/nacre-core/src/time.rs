// crates/nacre-core/src/time.rs
//
// Clock abstraction so time-dependent components (trust cache, experience
// pruning) can be driven by a mock clock in tests.

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait TimeProvider: Send + Sync {
    fn current_time(&self) -> DateTime<Utc>;
}

/// Production time source backed by the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn current_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
