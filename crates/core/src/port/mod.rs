// Port Layer - Interfaces for external dependencies

pub mod http_client;
pub mod id_provider; // For deterministic testing
pub mod process_launcher;
pub mod time_provider;

// Re-exports
pub use http_client::{HttpClient, HttpResponse, TransportError};
pub use id_provider::IdProvider;
pub use process_launcher::{
    ExecutionError, ExecutionStatus, LaunchOutcome, LaunchSpec, ProcessLauncher,
};
pub use time_provider::TimeProvider;
