//! Runtime configuration.
//!
//! Built in three layers, later ones winning:
//! - built-in defaults
//! - `config.toml` (explicit `--config` path, or the platform config dir)
//! - command line flags

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cli::GlobalArgs;
use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 3388;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub results_dir: PathBuf,
    pub server: ServerConfig,
    pub remote: RemoteConfig,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            results_dir: PathBuf::from("results"),
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: DEFAULT_PORT,
            },
            remote: RemoteConfig {
                host: "localhost".to_string(),
                port: DEFAULT_PORT,
                timeout: Duration::from_secs(60),
            },
            verbose: false,
        }
    }
}

// on-disk shape; every key optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    results_dir: Option<PathBuf>,
    server: FileServer,
    remote: FileRemote,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileServer {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileRemote {
    host: Option<String>,
    port: Option<u16>,
    timeout: Option<String>,
}

impl Config {
    /// Defaults overlaid with the config file and then the global flags.
    /// An explicit `--config` path must exist; the default location is optional.
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Config::from_file(path)?,
            None => match default_path().filter(|p| p.is_file()) {
                Some(path) => Config::from_file(&path)?,
                None => Config::default(),
            },
        };

        if let Some(dir) = &args.results_dir {
            config.results_dir = dir.clone();
        }
        config.verbose = args.verbose;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io("reading", path, e))?;
        Config::from_toml(&text, path)
    }

    pub fn from_toml(text: &str, path: &Path) -> Result<Self> {
        let invalid = |message: String| Error::Config {
            path: path.to_path_buf(),
            message,
        };

        let file: FileConfig = toml::from_str(text).map_err(|e| invalid(e.to_string()))?;
        let mut config = Config::default();

        if let Some(dir) = file.results_dir {
            config.results_dir = dir;
        }
        if let Some(host) = file.server.host {
            config.server.host = host;
        }
        if let Some(port) = file.server.port {
            config.server.port = port;
        }
        if let Some(host) = file.remote.host {
            config.remote.host = host;
        }
        if let Some(port) = file.remote.port {
            config.remote.port = port;
        }
        if let Some(timeout) = file.remote.timeout {
            config.remote.timeout = humantime::parse_duration(&timeout)
                .map_err(|e| invalid(format!("remote.timeout '{timeout}': {e}")))?;
        }

        Ok(config)
    }
}

/// `config.toml` in the platform config dir (~/.config/hostscan on Linux).
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "hostscan")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
