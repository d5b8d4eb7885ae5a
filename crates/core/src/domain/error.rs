// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid lifecycle transition: {from} -> {to}")]
    InvalidStageTransition { from: String, to: String },

    #[error("Adoption would create a cycle in the module tree")]
    CycleDetected,
}

pub type Result<T> = std::result::Result<T, DomainError>;
