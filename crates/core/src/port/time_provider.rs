// Time Provider Port (for testability)

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;

    /// Get current time in nanoseconds since epoch (latency probes)
    fn now_nanos(&self) -> i64;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn now_nanos(&self) -> i64 {
        // Out of range only after year 2262
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
    }
}

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Manually advanced clock
    pub struct FixedTimeProvider {
        nanos: AtomicI64,
    }

    impl FixedTimeProvider {
        pub fn new(nanos: i64) -> Self {
            Self {
                nanos: AtomicI64::new(nanos),
            }
        }

    }

    impl TimeProvider for FixedTimeProvider {
        fn now_millis(&self) -> i64 {
            self.nanos.load(Ordering::SeqCst) / 1_000_000
        }

        fn now_nanos(&self) -> i64 {
            self.nanos.load(Ordering::SeqCst)
        }
    }
}
