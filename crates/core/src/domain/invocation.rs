// Typed arguments for Module::run

use std::collections::BTreeMap;

/// Query parameters forwarded to a remote command (ordered for stable URLs)
pub type Params = BTreeMap<String, String>;

/// What a caller asks a module to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Launch a local process target; `detached` returns as soon as the launch is accepted
    Launch { detached: bool },
    /// Dispatch a named command to a remote endpoint
    Command { cmd: String, params: Params },
}

impl Invocation {
    pub fn launch(detached: bool) -> Self {
        Invocation::Launch { detached }
    }

    pub fn command(cmd: impl Into<String>, params: Params) -> Self {
        Invocation::Command {
            cmd: cmd.into(),
            params,
        }
    }

    /// Short label used in logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            Invocation::Launch { .. } => "launch",
            Invocation::Command { .. } => "command",
        }
    }
}
