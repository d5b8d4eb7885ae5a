// Overseer Core - Module contract, lifecycle & ports
// NO infrastructure dependencies (process spawning and HTTP live in infra crates)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{
    scoped, Module, ModuleNode, ProcessModule, RemoteModule, System, DEFAULT_INTERPRETER,
};
pub use domain::{Invocation, Latency, LatencySource, Params, Stage};
pub use error::{Result, SupervisorError};
