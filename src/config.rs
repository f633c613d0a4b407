//! Configuration management for the RAX storage node
//!
//! Values are layered: built-in defaults, then an optional `config.toml`,
//! then `STORAGE_NODE_*` environment variables, then positional command-line
//! arguments `[node_name] [port] [base_path]`.

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::storage::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_COUNT};

pub const DEFAULT_NODE_NAME: &str = "Node1";
pub const DEFAULT_PORT: u16 = 1100;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_MAX_PAYLOAD_MB: u64 = 100;
pub const DEFAULT_MAX_COMMAND_LENGTH: usize = 4096;

/// Config file locations, tried in order (both optional)
const CONFIG_PATHS: [&str; 2] = [
    "storage-node/config", // container layout: /app/storage-node/config.toml
    "config",              // local development: ./config.toml
];

/// Storage node configuration
#[derive(Debug, Deserialize, Clone)]
pub struct NodeConfig {
    /// Symbolic name the node is registered under
    pub node_name: String,

    /// IP address the listener binds to
    pub bind_address: String,

    /// Listening port
    pub port: u16,

    /// Host advertised to callers; detected from local interfaces when unset
    #[serde(default)]
    pub advertised_host: Option<String>,

    /// Storage root; defaults to `<cwd>/data/files/<node_name>`
    #[serde(default)]
    pub base_path: Option<String>,

    /// Maximum simultaneous filesystem operations
    pub worker_count: usize,

    /// Units of work that may wait for a free worker
    pub queue_capacity: usize,

    /// Largest accepted upload, in MB
    pub max_payload_mb: u64,

    /// Longest accepted command line, in bytes
    pub max_command_length: usize,
}

/// Positional command-line overrides, in the order the node has always
/// accepted them: `[node_name] [port] [base_path]`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliOverrides {
    pub node_name: Option<String>,
    pub port: Option<u16>,
    pub base_path: Option<String>,
}

impl CliOverrides {
    /// Parses positional arguments (program name already stripped).
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let node_name = args.next();
        let port = match args.next() {
            Some(raw) => Some(raw.parse::<u16>().map_err(|_| {
                ConfigError::Message(format!("Invalid port argument: {raw}"))
            })?),
            None => None,
        };
        let base_path = args.next();

        Ok(Self {
            node_name,
            port,
            base_path,
        })
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_name: DEFAULT_NODE_NAME.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            advertised_host: None,
            base_path: None,
            worker_count: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_payload_mb: DEFAULT_MAX_PAYLOAD_MB,
            max_command_length: DEFAULT_MAX_COMMAND_LENGTH,
        }
    }
}

impl NodeConfig {
    /// Load configuration from config.toml with environment and command-line
    /// overrides
    pub fn load(cli: &CliOverrides) -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;
        for path in CONFIG_PATHS {
            builder = builder.add_source(File::with_name(path).required(false));
        }
        Self::finish(builder, cli)
    }

    /// Load configuration from one explicit file plus overrides
    pub fn load_from(path: &Path, cli: &CliOverrides) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?.add_source(File::from(path));
        Self::finish(builder, cli)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("node_name", DEFAULT_NODE_NAME)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("worker_count", DEFAULT_WORKER_COUNT as i64)?
            .set_default("queue_capacity", DEFAULT_QUEUE_CAPACITY as i64)?
            .set_default("max_payload_mb", DEFAULT_MAX_PAYLOAD_MB as i64)?
            .set_default("max_command_length", DEFAULT_MAX_COMMAND_LENGTH as i64)
    }

    fn finish(
        builder: ConfigBuilder<DefaultState>,
        cli: &CliOverrides,
    ) -> Result<Self, ConfigError> {
        let mut builder =
            builder.add_source(Environment::with_prefix("STORAGE_NODE").try_parsing(true));

        if let Some(name) = &cli.node_name {
            builder = builder.set_override("node_name", name.as_str())?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("port", i64::from(port))?;
        }
        if let Some(path) = &cli.base_path {
            builder = builder.set_override("base_path", path.as_str())?;
        }

        let mut config: NodeConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        config.base_path = Some(config.resolved_base_path().to_string_lossy().to_string());
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_name.trim().is_empty() {
            return Err(ConfigError::Message("node_name cannot be empty".into()));
        }

        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.worker_count == 0 {
            return Err(ConfigError::Message(
                "worker_count must be greater than 0".into(),
            ));
        }

        if self.queue_capacity == 0 {
            return Err(ConfigError::Message(
                "queue_capacity must be greater than 0".into(),
            ));
        }

        if self.max_payload_mb == 0 {
            return Err(ConfigError::Message(
                "max_payload_mb must be greater than 0".into(),
            ));
        }

        if self.max_command_length == 0 {
            return Err(ConfigError::Message(
                "max_command_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Storage root, falling back to `<cwd>/data/files/<node_name>`
    pub fn resolved_base_path(&self) -> PathBuf {
        match self.base_path.as_deref() {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("data")
                .join("files")
                .join(&self.node_name),
        }
    }

    /// Get base path as PathBuf
    pub fn base_path_buf(&self) -> PathBuf {
        self.resolved_base_path()
    }

    /// Get bind address and port as socket address
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get maximum upload size in bytes
    pub fn max_payload_bytes(&self) -> usize {
        usize::try_from(self.max_payload_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}
