// Process-backed module
// Launches `<executable> -m <name> ...` through the ProcessLauncher port
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::constants::{DEFAULT_INTERPRETER, MODULE_FLAG};
use crate::application::module::Module;
use crate::domain::{Invocation, Lifecycle, Stage};
use crate::error::{Result, SupervisorError};
use crate::port::id_provider::UuidProvider;
use crate::port::{ExecutionError, IdProvider, LaunchOutcome, LaunchSpec, ProcessLauncher};

/// Outcome of one launch as stored in the result slot
pub type LaunchResult = std::result::Result<LaunchOutcome, ExecutionError>;

/// Tracks the single in-flight launch of a ProcessModule and its last result.
///
/// The result slot is read-once: [`Launcher::take_result`] moves the value out
/// and leaves the slot empty.
#[derive(Default)]
pub struct Launcher {
    handle: Option<JoinHandle<()>>,
    slot: Arc<Mutex<Option<LaunchResult>>>,
}

impl Launcher {
    /// True while a detached launch has not finished
    pub fn is_in_flight(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Move the last result out of the slot; a second call returns `None`
    pub fn take_result(&self) -> Option<LaunchResult> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn store(slot: &Mutex<Option<LaunchResult>>, result: LaunchResult) {
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
    }

    /// Wait for the detached launch, if any
    pub async fn wait(&mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => handle
                .await
                .map_err(|e| SupervisorError::LaunchJoin(e.to_string())),
            None => Ok(()),
        }
    }
}

/// Module backed by a locally launched executable
pub struct ProcessModule {
    name: String,
    executable: String,
    args: Vec<String>,
    kwargs: BTreeMap<String, String>,
    env: HashMap<String, String>,
    working_dir: Option<String>,
    timeout_ms: Option<i64>,
    lifecycle: Lifecycle,
    launcher: Launcher,
    process_launcher: Arc<dyn ProcessLauncher>,
    id_provider: Arc<dyn IdProvider>,
}

impl ProcessModule {
    /// Create a process module
    ///
    /// # Arguments
    /// * `name` - Full dot-separated module name, e.g. `my.facerec.FacialRecModule`
    /// * `process_launcher` - Backend that actually spawns processes
    ///
    /// # Example
    /// ```text
    /// let module = ProcessModule::new("pkg.mod", Arc::new(SubprocessLauncher::new(vec![])))
    ///     .with_args(["--verbose"])
    ///     .with_kwarg("port", "9000");
    /// ```
    pub fn new(name: impl Into<String>, process_launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            name: name.into(),
            executable: DEFAULT_INTERPRETER.to_string(),
            args: Vec::new(),
            kwargs: BTreeMap::new(),
            env: HashMap::new(),
            working_dir: None,
            timeout_ms: None,
            lifecycle: Lifecycle::new(),
            launcher: Launcher::default(),
            process_launcher,
            id_provider: Arc::new(UuidProvider),
        }
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    /// Read-once access to the last launch result
    pub fn take_result(&self) -> Option<LaunchResult> {
        self.launcher.take_result()
    }

    /// Wait for an in-flight detached launch to finish
    pub async fn wait(&mut self) -> Result<()> {
        self.launcher.wait().await
    }

    /// Build the command line: `<exec> -m <name> <args...> --<key>=<value>...`
    pub fn launch_spec(&self) -> LaunchSpec {
        let mut args = vec![MODULE_FLAG.to_string(), self.name.clone()];
        args.extend(self.args.iter().cloned());
        args.extend(
            self.kwargs
                .iter()
                .map(|(key, value)| format!("--{}={}", key, value)),
        );

        LaunchSpec {
            program: self.executable.clone(),
            args,
            working_dir: self.working_dir.clone(),
            env: self.env.clone(),
            timeout_ms: self.timeout_ms,
        }
    }

    /// Launch the target.
    ///
    /// Detached: spawns a background task and returns `Ok(true)` once the launch
    /// is accepted; the outcome lands in the result slot. Otherwise waits for the
    /// process, stores the outcome and returns whether it exited successfully.
    ///
    /// # Errors
    /// - SupervisorError::LaunchInFlight if a detached launch is still running
    /// - SupervisorError::Execution if a blocking launch cannot spawn
    pub async fn launch(&mut self, detached: bool) -> Result<bool> {
        if self.launcher.is_in_flight() {
            return Err(SupervisorError::LaunchInFlight(self.name.clone()));
        }

        let spec = self.launch_spec();
        let launch_id = self.id_provider.generate_id();

        info!(
            module = %self.name,
            launch_id = %launch_id,
            command = %spec.command_line(),
            detached = detached,
            "Launching process module"
        );

        if detached {
            let process_launcher = Arc::clone(&self.process_launcher);
            let slot = Arc::clone(&self.launcher.slot);
            let name = self.name.clone();

            let handle = tokio::spawn(async move {
                let result = process_launcher.launch(&spec).await;
                log_outcome(&name, &launch_id, &result);
                Launcher::store(&slot, result);
            });
            self.launcher.handle = Some(handle);

            return Ok(true);
        }

        let result = self.process_launcher.launch(&spec).await;
        log_outcome(&self.name, &launch_id, &result);

        match result {
            Ok(outcome) => {
                let succeeded = outcome.succeeded();
                Launcher::store(&self.launcher.slot, Ok(outcome));
                Ok(succeeded)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn log_outcome(name: &str, launch_id: &str, result: &LaunchResult) {
    match result {
        Ok(outcome) => info!(
            module = %name,
            launch_id = %launch_id,
            exit_code = ?outcome.exit_code,
            duration_ms = outcome.duration_ms,
            status = ?outcome.status,
            "Process module finished"
        ),
        Err(e) => warn!(
            module = %name,
            launch_id = %launch_id,
            error = %e,
            "Process module launch failed"
        ),
    }
}

#[async_trait]
impl Module for ProcessModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn stage(&self) -> Stage {
        self.lifecycle.stage()
    }

    async fn run(&mut self, invocation: Invocation) -> Result<bool> {
        match invocation {
            Invocation::Launch { detached } => self.launch(detached).await,
            other => Err(SupervisorError::InvalidInvocation {
                module: self.name.clone(),
                invocation: other.kind().to_string(),
            }),
        }
    }

    // Process lifetime is per launch; start/stop only move the stage.
    async fn start(&mut self) -> Result<()> {
        self.lifecycle.start()?;
        debug!(module = %self.name, "Process module started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if self.launcher.is_in_flight() {
            // No cancellation: the detached launch keeps running.
            warn!(module = %self.name, "Stopping module with a detached launch still running");
        }
        self.lifecycle.stop();
        debug!(module = %self.name, "Process module stopped");
        Ok(())
    }
}
