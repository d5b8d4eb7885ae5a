// Subprocess launcher implementation
// reason: tokio for async process management
use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::info;

use overseer_core::port::process_launcher::{
    ExecutionError, ExecutionStatus, LaunchOutcome, LaunchSpec, ProcessLauncher,
};
use overseer_core::port::time_provider::SystemTimeProvider;
use overseer_core::port::TimeProvider;

/// Spawns child processes with an environment allowlist.
///
/// Only allowlisted variables of the parent environment are inherited;
/// variables set explicitly on the `LaunchSpec` always pass.
pub struct SubprocessLauncher {
    time_provider: Arc<dyn TimeProvider>,
    env_allowlist: Vec<String>,
}

impl SubprocessLauncher {
    /// Create a new subprocess launcher
    ///
    /// # Arguments
    /// * `env_allowlist` - Parent environment variables the child may inherit
    ///
    /// # Example
    /// ```ignore
    /// let launcher = SubprocessLauncher::new(
    ///     vec!["PATH".to_string(), "HOME".to_string(), "USER".to_string()],
    /// );
    /// ```
    pub fn new(env_allowlist: Vec<String>) -> Self {
        Self::with_time_provider(Arc::new(SystemTimeProvider), env_allowlist)
    }

    pub fn with_time_provider(
        time_provider: Arc<dyn TimeProvider>,
        env_allowlist: Vec<String>,
    ) -> Self {
        Self {
            time_provider,
            env_allowlist,
        }
    }

    /// Filter environment variables to allowlist only
    fn filter_env(&self, env: &HashMap<String, String>) -> HashMap<String, String> {
        env.iter()
            .filter(|(k, _)| self.env_allowlist.contains(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Allowlisted parent environment overlaid with the LaunchSpec variables
    fn child_env(&self, spec: &LaunchSpec) -> HashMap<String, String> {
        let parent: HashMap<String, String> = std::env::vars().collect();
        let mut env = self.filter_env(&parent);
        env.extend(spec.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        env
    }

    /// Spawn child process and wait for output
    async fn spawn_and_wait(&self, spec: &LaunchSpec) -> Result<std::process::Output, ExecutionError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .env_clear()
            .envs(self.child_env(spec))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A timed-out child must not outlive its handle
            .kill_on_drop(true);

        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }

        let child = command
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", spec.program, e)))?;

        if let Some(timeout_ms) = spec.timeout_ms {
            match timeout(
                Duration::from_millis(timeout_ms.max(0) as u64),
                child.wait_with_output(),
            )
            .await
            {
                Ok(Ok(output)) => Ok(output),
                Ok(Err(e)) => Err(ExecutionError::IoError(e.to_string())),
                Err(_) => Err(ExecutionError::Timeout(timeout_ms)),
            }
        } else {
            child
                .wait_with_output()
                .await
                .map_err(|e| ExecutionError::IoError(e.to_string()))
        }
    }

    /// Build launch outcome from process output
    fn build_outcome(&self, output: std::process::Output, duration_ms: i64) -> LaunchOutcome {
        let status = if output.status.success() {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        };

        LaunchOutcome {
            status,
            exit_code: output.status.code(),
            duration_ms,
            stdout: Some(String::from_utf8_lossy(&output.stdout).to_string()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        }
    }
}

#[async_trait]
impl ProcessLauncher for SubprocessLauncher {
    async fn launch(&self, spec: &LaunchSpec) -> Result<LaunchOutcome, ExecutionError> {
        let start_time = self.time_provider.now_millis();

        info!(
            program = %spec.program,
            args = ?spec.args,
            working_dir = ?spec.working_dir,
            timeout_ms = ?spec.timeout_ms,
            "Starting subprocess"
        );

        let output = self.spawn_and_wait(spec).await?;

        let duration_ms = self.time_provider.now_millis() - start_time;
        let outcome = self.build_outcome(output, duration_ms);

        info!(
            program = %spec.program,
            duration_ms = %duration_ms,
            exit_code = ?outcome.exit_code,
            status = ?outcome.status,
            "Subprocess completed"
        );

        Ok(outcome)
    }
}
