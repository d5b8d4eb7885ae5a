// Module lifecycle stage (Created -> Started -> Stopped)

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, Result};

/// Lifecycle stage of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Created,
    Started,
    Stopped,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Created => write!(f, "CREATED"),
            Stage::Started => write!(f, "STARTED"),
            Stage::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// Stage holder enforcing the forward-only transitions.
///
/// `start` and `stop` are idempotent on their own stage. There is no way back
/// from `Stopped` to `Started`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    stage: Stage,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            stage: Stage::Created,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Created -> Started; Started stays Started
    pub fn start(&mut self) -> Result<()> {
        match self.stage {
            Stage::Created | Stage::Started => {
                self.stage = Stage::Started;
                Ok(())
            }
            Stage::Stopped => Err(DomainError::InvalidStageTransition {
                from: self.stage.to_string(),
                to: Stage::Started.to_string(),
            }),
        }
    }

    /// Any stage -> Stopped
    pub fn stop(&mut self) {
        self.stage = Stage::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        let mut lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.stage(), Stage::Created);

        lifecycle.start().unwrap();
        assert_eq!(lifecycle.stage(), Stage::Started);

        // Idempotent start
        lifecycle.start().unwrap();
        assert_eq!(lifecycle.stage(), Stage::Started);

        lifecycle.stop();
        lifecycle.stop();
        assert_eq!(lifecycle.stage(), Stage::Stopped);
    }

    #[test]
    fn test_no_restart_after_stop() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.start().unwrap();
        lifecycle.stop();

        let err = lifecycle.start().unwrap_err();
        assert!(err.to_string().contains("STOPPED -> STARTED"));
        assert_eq!(lifecycle.stage(), Stage::Stopped);
    }

    #[test]
    fn test_stop_without_start() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.stop();
        assert_eq!(lifecycle.stage(), Stage::Stopped);
    }
}
