// Process Launcher Port
// Abstraction for running a local executable to completion

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Everything needed to start one process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<String>,
    pub env: HashMap<String, String>,
    pub timeout_ms: Option<i64>,
}

impl LaunchSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Command line as a single string (logging only, no quoting)
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub status: ExecutionStatus,
    pub duration_ms: i64,
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl LaunchOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// Execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failed,
}

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Process timeout after {0}ms")]
    Timeout(i64),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Process Launcher trait
///
/// Implementations:
/// - SubprocessLauncher (infra-system): spawns a child process via tokio
/// - mocks::MockProcessLauncher (tests)
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Run the process described by `spec` and wait for it to exit
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if process cannot be started
    /// - ExecutionError::Timeout if execution exceeds `spec.timeout_ms`
    async fn launch(&self, spec: &LaunchSpec) -> Result<LaunchOutcome, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    /// Mock launcher behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit 0 with "mock output"
        Success,
        /// Exit with the given non-zero code
        Exit(i32),
        /// Fail to spawn
        Fail(String),
        /// Block until the notify fires, then succeed
        Gated(Arc<Notify>),
    }

    /// Mock Process Launcher for testing
    pub struct MockProcessLauncher {
        behavior: Arc<Mutex<MockBehavior>>,
        specs: Arc<Mutex<Vec<LaunchSpec>>>,
    }

    impl MockProcessLauncher {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                specs: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_exit(code: i32) -> Self {
            Self::new(MockBehavior::Exit(code))
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn new_gated(gate: Arc<Notify>) -> Self {
            Self::new(MockBehavior::Gated(gate))
        }

        pub fn call_count(&self) -> usize {
            self.specs.lock().unwrap().len()
        }

        pub fn launched_specs(&self) -> Vec<LaunchSpec> {
            self.specs.lock().unwrap().clone()
        }
    }

    fn outcome(exit_code: i32) -> LaunchOutcome {
        LaunchOutcome {
            status: if exit_code == 0 {
                ExecutionStatus::Success
            } else {
                ExecutionStatus::Failed
            },
            duration_ms: 10,
            exit_code: Some(exit_code),
            stdout: Some("mock output".to_string()),
            stderr: None,
        }
    }

    #[async_trait]
    impl ProcessLauncher for MockProcessLauncher {
        async fn launch(&self, spec: &LaunchSpec) -> Result<LaunchOutcome, ExecutionError> {
            self.specs.lock().unwrap().push(spec.clone());

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Success => Ok(outcome(0)),
                MockBehavior::Exit(code) => Ok(outcome(code)),
                MockBehavior::Fail(msg) => Err(ExecutionError::SpawnFailed(msg)),
                MockBehavior::Gated(gate) => {
                    gate.notified().await;
                    Ok(outcome(0))
                }
            }
        }
    }
}
