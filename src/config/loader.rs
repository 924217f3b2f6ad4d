// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::config::consts::{DEFAULT_POLL_TIMEOUT_MS, DEFAULT_RESTART_DELAY_MS};
use crate::engine::{RestartPolicy, RunOptions};
use crate::errors::ConfigError;

/// Main configuration structure for an adaptor.
///
/// Describes the producers and nodes to wire, the routes between them, the
/// application's error kinds and how the adaptor runs. It is typically
/// loaded from a YAML or TOML file.
///
/// # Fields
/// * `run` - Supervisor behaviour (optional, see [`RunConfig`])
/// * `error_kinds` - Application error kinds added to the built-in hierarchy
/// * `producers` - Sources of batches, each polled by its own worker
/// * `nodes` - Steps and sinks that messages are routed to
/// * `pipeline` - Shorthand chaining ids in order by output routes
/// * `routes` - Output, discard and error routes keyed by origin id
/// * `default_error_routes` - Where errors go when their node has no matching rule
///
/// # Example
/// ```yaml
/// run:
///   fail_fast: true
/// producers:
///   - id: reader
///     impl_: static_items
///     options:
///       items: ["a", "b"]
/// nodes:
///   - id: upper
///     role: step
///     impl_: change_text_case_upper
///   - id: out
///     role: sink
///     impl_: stdout
/// routes:
///   reader:
///     output: [upper]
///   upper:
///     output: [out]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub error_kinds: Vec<ErrorKindConfig>,
    #[serde(default)]
    pub producers: Vec<ProducerConfig>,
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub pipeline: Vec<String>,
    #[serde(default)]
    pub routes: BTreeMap<String, RouteConfig>,
    #[serde(default)]
    pub default_error_routes: Vec<String>,
}

/// How the adaptor supervises its workers.
///
/// # Fields
/// * `fail_fast` - Stop every worker once one fails (defaults to true)
/// * `poll_timeout_ms` - Poll timeout for producers without their own
/// * `restart_after_fail_limit` - Reconnect attempts per worker (defaults to 0)
/// * `restart_delay_ms` - Pause before each reconnect
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RunConfig {
    #[serde(default = "default_true")]
    pub fail_fast: bool,
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
    #[serde(default)]
    pub restart_after_fail_limit: u32,
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fail_fast: true,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            restart_after_fail_limit: 0,
            restart_delay_ms: DEFAULT_RESTART_DELAY_MS,
        }
    }
}

impl RunConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            fail_fast: self.fail_fast,
            restart: RestartPolicy {
                limit: self.restart_after_fail_limit,
                delay: Duration::from_millis(self.restart_delay_ms),
            },
        }
    }
}

/// An application error kind; without a parent it sits directly under the root.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ErrorKindConfig {
    pub kind: String,
    pub parent: Option<String>,
}

/// Configuration for a single producer.
///
/// # Example
/// ```yaml
/// id: reader
/// impl_: static_items
/// poll_timeout_ms: 250
/// options:
///   items: [1, 2, 3]
///   batch_size: 2
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ProducerConfig {
    pub id: String,
    pub impl_: Option<String>,
    pub poll_timeout_ms: Option<u64>,
    #[serde(default)]
    pub options: HashMap<String, Value>,
}

/// Whether a node transforms items, delivers them or enriches them from a reader.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeRoleConfig {
    Step,
    Sink,
    Enrich,
}

/// Configuration for a single node.
///
/// # Fields
/// * `id` - Unique identifier, shared with producers
/// * `role` - `step`, `sink` or `enrich`
/// * `impl_` - Local implementation name
/// * `accepts_batches` - When false the node sees one item at a time (defaults to true)
/// * `best_effort` - Record unrouted errors instead of failing the traversal
/// * `options` - Implementation-specific options
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    pub id: String,
    pub role: NodeRoleConfig,
    pub impl_: Option<String>,
    #[serde(default = "default_true")]
    pub accepts_batches: bool,
    #[serde(default)]
    pub best_effort: bool,
    #[serde(default)]
    pub options: HashMap<String, Value>,
}

/// Routes leaving one producer or node.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RouteConfig {
    #[serde(default)]
    pub output: Vec<String>,
    #[serde(default)]
    pub discard: Vec<String>,
    #[serde(default)]
    pub errors: Vec<ErrorRouteConfig>,
}

/// Errors of `kind` (or any descendant kind) go to `to`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ErrorRouteConfig {
    pub kind: String,
    pub to: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_poll_timeout_ms() -> u64 {
    DEFAULT_POLL_TIMEOUT_MS
}

fn default_restart_delay_ms() -> u64 {
    DEFAULT_RESTART_DELAY_MS
}

pub fn parse_yaml(content: &str) -> Result<Config, ConfigError> {
    Ok(serde_yaml::from_str(content)?)
}

pub fn parse_toml(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load a config file. Files ending in `.toml` are read as TOML, anything else as YAML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        parse_toml(&content)
    } else {
        parse_yaml(&content)
    }
}

/// Load a config file and validate its topology.
///
/// Every validation problem is reported, not just the first.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg).map_err(ConfigError::Validation)?;
    Ok(cfg)
}
