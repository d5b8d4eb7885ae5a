// Module contract shared by every execution backend

use async_trait::async_trait;

use crate::domain::{Invocation, Latency, Stage};
use crate::error::Result;

/// A unit of work with a lifecycle and a `run` operation.
///
/// Implementations:
/// - ProcessModule: launches a local executable
/// - RemoteModule: dispatches commands to an HTTP endpoint
///
/// `enter`/`exit` are the scope hooks used by [`crate::scoped`]. They default to
/// `start`/`stop`; variants override them when acquiring the scope means
/// something else (e.g. a connectivity probe).
#[async_trait]
pub trait Module: Send + Sync {
    /// Identity string. Uniqueness inside a System is not enforced.
    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);

    fn stage(&self) -> Stage;

    /// Initiate execution.
    ///
    /// Returns whether the work succeeded, or for detached launches whether
    /// the launch was accepted. A remote command outside the permitted set
    /// returns `Ok(false)` without touching the network.
    ///
    /// # Errors
    /// - SupervisorError::InvalidInvocation if the invocation kind does not match the backend
    /// - Transport, HTTP status and execution failures are propagated
    async fn run(&mut self, invocation: Invocation) -> Result<bool>;

    async fn start(&mut self) -> Result<()>;

    async fn stop(&mut self) -> Result<()>;

    /// Scope entry
    async fn enter(&mut self) -> Result<()> {
        self.start().await
    }

    /// Scope exit, called on every exit path once `enter` succeeded
    async fn exit(&mut self) -> Result<()> {
        self.stop().await
    }

    /// Reachability probe; `None` for backends with nothing to probe
    async fn health_check(&self) -> Result<Option<Latency>> {
        Ok(None)
    }
}
