//! Settings for the reference task service.
//!
//! A flag wins over `TASKDECK_BIND` / `TASKDECK_SERVER_LOG`, which win over
//! the `[server]` table of `taskdeck-server/config.toml` in the user config
//! directory. Anything still unset falls back to [`ServerConfig::default`].

use std::path::{Path, PathBuf};

/// Why the service's settings could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The settings file exists (or was named with `--config`) but could
    /// not be read.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// File the service tried to open.
        path: PathBuf,
        /// Cause reported by the filesystem.
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or a value has the wrong type.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerConfigFile {
    server: ServerSection,
}

/// `[server]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerSection {
    bind_addr: Option<String>,
    max_title_len: Option<usize>,
}

/// CLI arguments for the server.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "In-memory task-storage service for taskdeck")]
pub struct ServerCliArgs {
    /// `host:port` the task API listens on.
    #[arg(short, long, env = "TASKDECK_BIND")]
    pub bind: Option<String>,

    /// Path to config file (default: `~/.config/taskdeck-server/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum task title length in characters.
    #[arg(long)]
    pub max_title_len: Option<usize>,

    /// `tracing` filter for request and task-book logs, e.g. `debug`.
    #[arg(long, default_value = "info", env = "TASKDECK_SERVER_LOG")]
    pub log_level: String,
}

/// Fully resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address for the task API.
    pub bind_addr: String,
    /// Maximum task title length in characters.
    pub max_title_len: usize,
    /// Filter handed to the stdout subscriber.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            max_title_len: 256,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Resolves the service's settings from `cli` and the settings file.
    ///
    /// A missing default settings file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the settings file cannot be opened or
    /// does not parse. A file named with `--config` must exist.
    pub fn load(cli: &ServerCliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    fn resolve(cli: &ServerCliArgs, file: &ServerConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: cli
                .bind
                .clone()
                .or_else(|| file.server.bind_addr.clone())
                .unwrap_or(defaults.bind_addr),
            max_title_len: cli
                .max_title_len
                .or(file.server.max_title_len)
                .unwrap_or(defaults.max_title_len),
            log_level: cli.log_level.clone(),
        }
    }
}

fn load_config_file(explicit_path: Option<&Path>) -> Result<ServerConfigFile, ConfigError> {
    if let Some(path) = explicit_path {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(path) = dirs::config_dir().map(|dir| dir.join("taskdeck-server").join("config.toml"))
    else {
        return Ok(ServerConfigFile::default());
    };
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
