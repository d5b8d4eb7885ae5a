//! Supervisor configuration
//!
//! Precedence (lowest first): built-in defaults, TOML file, `OVERSEER_*`
//! environment variables, command-line flags. Module names given with `-m`
//! are appended after the modules of the file.

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::BTreeMap;

pub const DEFAULT_SYSTEM_NAME: &str = "overseer";
pub const DEFAULT_CHAOS: f64 = 10.0;
const ENV_PREFIX: &str = "OVERSEER";
const DEFAULT_ENV_ALLOWLIST: [&str; 3] = ["PATH", "HOME", "USER"];

#[derive(Parser, Debug, Default)]
#[command(name = "overseer")]
#[command(about = "Supervise local and remote modules under one lifecycle", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Process modules to supervise (dot-separated module names)
    #[arg(short, long, num_args = 1..)]
    pub modules: Vec<String>,

    /// Chaos tuning factor, passed through untouched
    #[arg(short, long)]
    pub chaos: Option<f64>,

    /// System name
    #[arg(long)]
    pub name: Option<String>,

    /// TOML configuration file
    #[arg(long, env = "OVERSEER_CONFIG")]
    pub config: Option<String>,
}

/// Port as written in configuration: `8080` or `"8080"`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u16),
    Text(String),
}

impl std::fmt::Display for PortValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortValue::Number(n) => write!(f, "{}", n),
            PortValue::Text(s) => write!(f, "{}", s),
        }
    }
}

fn default_detached() -> bool {
    true
}

/// One `[[modules]]` table
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModuleSpec {
    Process {
        name: String,
        #[serde(default)]
        executable: Option<String>,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        kwargs: BTreeMap<String, String>,
        /// Extra variables for the child, on top of the allowlisted ones
        #[serde(default)]
        env: BTreeMap<String, String>,
        #[serde(default)]
        working_dir: Option<String>,
        #[serde(default)]
        timeout_ms: Option<i64>,
        #[serde(default = "default_detached")]
        detached: bool,
    },
    Remote {
        #[serde(default)]
        name: Option<String>,
        host: String,
        port: PortValue,
        #[serde(default)]
        cmds: Vec<String>,
    },
}

impl ModuleSpec {
    /// Detached process module with defaults, as produced by `-m`
    pub fn process(name: impl Into<String>) -> Self {
        ModuleSpec::Process {
            name: name.into(),
            executable: None,
            args: Vec::new(),
            kwargs: BTreeMap::new(),
            env: BTreeMap::new(),
            working_dir: None,
            timeout_ms: None,
            detached: true,
        }
    }
}

fn default_env_allowlist() -> Vec<String> {
    DEFAULT_ENV_ALLOWLIST.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorConfig {
    pub name: String,
    pub chaos: f64,
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
    /// Parent environment variables process modules may inherit
    #[serde(default = "default_env_allowlist")]
    pub env_allowlist: Vec<String>,
    /// Whole-request timeout for remote calls; unset means no timeout
    #[serde(default)]
    pub http_timeout_ms: Option<u64>,
}

/// `OVERSEER_*` variables. `OVERSEER_ENV_ALLOWLIST` takes a comma-separated
/// list; `modules` can only come from the file or `-m`.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .ignore_empty(true)
        .list_separator(",")
        .with_list_parse_key("env_allowlist")
}

/// Merge defaults, file, environment and CLI into one configuration
pub fn load(cli: &Cli) -> Result<SupervisorConfig> {
    load_with(cli, environment())
}

fn load_with(cli: &Cli, env: Environment) -> Result<SupervisorConfig> {
    let mut builder = Config::builder()
        .set_default("name", DEFAULT_SYSTEM_NAME)?
        .set_default("chaos", DEFAULT_CHAOS)?;

    if let Some(path) = &cli.config {
        let expanded = shellexpand::tilde(path).into_owned();
        builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
    }

    builder = builder
        .add_source(env)
        .set_override_option("name", cli.name.clone())?
        .set_override_option("chaos", cli.chaos)?;

    let mut config: SupervisorConfig = builder
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;

    config
        .modules
        .extend(cli.modules.iter().map(ModuleSpec::process));

    Ok(config)
}
