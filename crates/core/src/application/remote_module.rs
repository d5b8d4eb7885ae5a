// HTTP-backed module
// Every operation is a stateless GET through the HttpClient port
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::constants::{NOTIFY_PARAM, PING_START_PARAM, TEST_CONNECTION_PATH};
use crate::application::module::Module;
use crate::domain::{Invocation, Latency, Lifecycle, Params, Stage};
use crate::error::{Result, SupervisorError};
use crate::port::time_provider::SystemTimeProvider;
use crate::port::{HttpClient, HttpResponse, TimeProvider};

#[derive(Deserialize)]
struct PingReply {
    ping_end: Option<i64>,
}

/// Module controlled remotely over HTTP, gated by a permitted-command set
pub struct RemoteModule {
    name: Option<String>,
    endpoint: String,
    cmds: HashSet<String>,
    lifecycle: Lifecycle,
    http: Arc<dyn HttpClient>,
    time_provider: Arc<dyn TimeProvider>,
}

impl RemoteModule {
    /// Create a remote module with no permitted commands
    ///
    /// # Arguments
    /// * `host` - Host including scheme, e.g. `http://localhost`
    /// * `port` - Port as given by configuration
    /// * `http` - HTTP client used for every round trip
    pub fn new(host: impl Into<String>, port: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        let host = host.into();
        let endpoint = format!("{}:{}", host.trim_end_matches('/'), port.into());

        Self {
            name: None,
            endpoint,
            cmds: HashSet::new(),
            lifecycle: Lifecycle::new(),
            http,
            time_provider: Arc::new(SystemTimeProvider),
        }
    }

    pub fn with_commands<I, S>(mut self, cmds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cmds.extend(cmds.into_iter().map(Into::into));
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_time_provider(mut self, time_provider: Arc<dyn TimeProvider>) -> Self {
        self.time_provider = time_provider;
        self
    }

    /// `{host}:{port}`
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_permitted(&self, cmd: &str) -> bool {
        self.cmds.contains(cmd)
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    fn ensure_success(url: String, response: &HttpResponse) -> Result<()> {
        if response.is_success() {
            Ok(())
        } else {
            Err(SupervisorError::HttpStatus {
                url,
                status: response.status,
            })
        }
    }

    /// Send `cmd` with `params` if it is permitted.
    ///
    /// Returns `Ok(false)` without any network call when `cmd` is not in the
    /// permitted set, `Ok(true)` after a successful round trip.
    ///
    /// # Errors
    /// - SupervisorError::Transport on connection failure
    /// - SupervisorError::HttpStatus on a non-2xx answer
    pub async fn dispatch(&self, cmd: &str, params: &Params) -> Result<bool> {
        if !self.is_permitted(cmd) {
            debug!(module = %self.name(), cmd = %cmd, "Command not permitted, ignoring");
            return Ok(false);
        }

        let url = self.url_for(cmd);
        debug!(module = %self.name(), url = %url, "Dispatching remote command");

        let response = self.http.get(&url, params).await?;
        Self::ensure_success(url, &response)?;

        Ok(true)
    }

    /// Probe `/test_connection` and measure latency.
    ///
    /// Uses the server-reported `ping_end` when the body carries one, the local
    /// clock otherwise. No retry at this layer.
    ///
    /// # Errors
    /// - SupervisorError::Transport on connection failure
    /// - SupervisorError::HttpStatus on a non-2xx answer
    pub async fn check_connection(&self, notify: bool) -> Result<Latency> {
        let ping_start = self.time_provider.now_nanos();

        let mut params = Params::new();
        params.insert(PING_START_PARAM.to_string(), ping_start.to_string());
        params.insert(NOTIFY_PARAM.to_string(), notify.to_string());

        let url = self.url_for(TEST_CONNECTION_PATH);
        let response = self.http.get(&url, &params).await?;
        Self::ensure_success(url, &response)?;

        let ping_end = response
            .json::<PingReply>()
            .ok()
            .and_then(|reply| reply.ping_end);
        let latency = Latency::measure(ping_start, ping_end, || self.time_provider.now_nanos());

        info!(
            module = %self.name(),
            endpoint = %self.endpoint,
            latency_ms = latency.as_millis_f64(),
            source = ?latency.source,
            "Remote module reachable"
        );

        Ok(latency)
    }
}

#[async_trait]
impl Module for RemoteModule {
    /// Falls back to the endpoint when no name was set
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.endpoint)
    }

    fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    fn stage(&self) -> Stage {
        self.lifecycle.stage()
    }

    async fn run(&mut self, invocation: Invocation) -> Result<bool> {
        match invocation {
            Invocation::Command { cmd, params } => self.dispatch(&cmd, &params).await,
            other => Err(SupervisorError::InvalidInvocation {
                module: self.name().to_string(),
                invocation: other.kind().to_string(),
            }),
        }
    }

    async fn start(&mut self) -> Result<()> {
        self.lifecycle.start()?;
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.lifecycle.stop();
        Ok(())
    }

    /// Verify the endpoint answers before the scope body runs
    async fn enter(&mut self) -> Result<()> {
        if let Err(e) = self.check_connection(true).await {
            warn!(module = %self.name(), error = %e, "Connectivity check failed");
            return Err(e);
        }
        self.start().await
    }

    async fn health_check(&self) -> Result<Option<Latency>> {
        self.check_connection(false).await.map(Some)
    }
}
