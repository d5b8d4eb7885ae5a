// Application Layer - Module variants, scoped lifecycle, ownership tree, System aggregate

pub mod constants;
pub mod module;
pub mod process_module;
pub mod remote_module;
pub mod scope;
pub mod system;
pub mod tree;

// Re-exports
pub use constants::DEFAULT_INTERPRETER;
pub use module::Module;
pub use process_module::{LaunchResult, Launcher, ProcessModule};
pub use remote_module::RemoteModule;
pub use scope::scoped;
pub use system::System;
pub use tree::ModuleNode;
