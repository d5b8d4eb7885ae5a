//! Turns configuration into a System wired to the infrastructure adapters

use std::sync::Arc;

use overseer_core::port::{HttpClient, ProcessLauncher};
use overseer_core::{Invocation, Module, ProcessModule, RemoteModule, SupervisorError, System};

use crate::settings::{ModuleSpec, SupervisorConfig};

/// Adapters shared by every module built from configuration
pub struct Adapters {
    pub process_launcher: Arc<dyn ProcessLauncher>,
    pub http: Arc<dyn HttpClient>,
}

/// A ready System plus what to run on each module once it is started
pub struct Bootstrapped {
    pub system: System,
    /// Index-aligned with `system.modules()`
    pub startup: Vec<Option<Invocation>>,
}

/// Build one module from its spec
///
/// # Errors
/// - SupervisorError::Config for an empty name, a host without scheme or an invalid port
pub fn build_module(
    spec: &ModuleSpec,
    adapters: &Adapters,
) -> Result<Box<dyn Module>, SupervisorError> {
    match spec {
        ModuleSpec::Process {
            name,
            executable,
            args,
            kwargs,
            env,
            working_dir,
            timeout_ms,
            ..
        } => {
            if name.trim().is_empty() {
                return Err(SupervisorError::Config(
                    "process module name must not be empty".to_string(),
                ));
            }

            let mut module = ProcessModule::new(name.clone(), Arc::clone(&adapters.process_launcher))
                .with_args(args.iter().cloned());
            for (key, value) in kwargs {
                module = module.with_kwarg(key.clone(), value.clone());
            }
            for (key, value) in env {
                module = module.with_env(key.clone(), value.clone());
            }
            if let Some(executable) = executable {
                module = module.with_executable(executable.clone());
            }
            if let Some(dir) = working_dir {
                module = module.with_working_dir(dir.clone());
            }
            if let Some(timeout_ms) = timeout_ms {
                module = module.with_timeout_ms(*timeout_ms);
            }

            Ok(Box::new(module))
        }
        ModuleSpec::Remote {
            name,
            host,
            port,
            cmds,
        } => {
            if !host.contains("://") {
                return Err(SupervisorError::Config(format!(
                    "remote host '{}' must include a scheme, e.g. http://{}",
                    host, host
                )));
            }
            let port = port.to_string();
            if port.parse::<u16>().is_err() {
                return Err(SupervisorError::Config(format!(
                    "remote port '{}' is not a valid port",
                    port
                )));
            }

            let mut module = RemoteModule::new(host.clone(), port, Arc::clone(&adapters.http))
                .with_commands(cmds.iter().cloned());
            if let Some(name) = name {
                module = module.with_name(name.clone());
            }

            Ok(Box::new(module))
        }
    }
}

fn startup_invocation(spec: &ModuleSpec) -> Option<Invocation> {
    match spec {
        ModuleSpec::Process { detached, .. } => Some(Invocation::launch(*detached)),
        ModuleSpec::Remote { .. } => None,
    }
}

/// Build the System; a single bad spec leaves no module behind
pub fn build_system(
    config: &SupervisorConfig,
    adapters: &Adapters,
) -> Result<Bootstrapped, SupervisorError> {
    let mut system = System::new(config.name.clone(), Vec::new());
    system.try_set_modules(config.modules.iter().map(|spec| build_module(spec, adapters)))?;

    let startup = config.modules.iter().map(startup_invocation).collect();

    Ok(Bootstrapped { system, startup })
}
