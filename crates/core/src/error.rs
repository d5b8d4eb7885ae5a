// Central Error Type for the Supervisor

use thiserror::Error;

/// Supervisor-level error type
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Transport error: {0}")]
    Transport(#[from] crate::port::TransportError),

    #[error("Remote endpoint {url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Execution error: {0}")]
    Execution(#[from] crate::port::ExecutionError),

    #[error("Module '{module}' does not accept {invocation} invocations")]
    InvalidInvocation { module: String, invocation: String },

    #[error("Module '{0}' already has a detached launch in flight")]
    LaunchInFlight(String),

    #[error("Background launch failed: {0}")]
    LaunchJoin(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using SupervisorError
pub type Result<T> = std::result::Result<T, SupervisorError>;

impl SupervisorError {
    /// Transport and HTTP status failures, i.e. the remote side is unreachable or unhappy
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            SupervisorError::Transport(_) | SupervisorError::HttpStatus { .. }
        )
    }
}
