// Domain Layer - Pure lifecycle rules and value types

pub mod error;
pub mod invocation;
pub mod latency;
pub mod stage;

// Re-exports
pub use error::DomainError;
pub use invocation::{Invocation, Params};
pub use latency::{Latency, LatencySource};
pub use stage::{Lifecycle, Stage};
