//! Dev environment configuration
//!
//! Built once at startup from defaults, an optional YAML file and CLI flags, then
//! shared read-only with every component.

use std::{
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
    time::Duration
};

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::domain::{address::ServiceAddress, constant::DEFAULT_NAMESPACE, error::DevError};

/// File looked up in the platform config directory when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "devstack.yaml";

/// Top-level configuration of one dev session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevConfig {
    /// Loopback IP every service binds to
    pub ip:                        IpAddr,
    /// Fixed backend API port
    pub server_port:               u16,
    /// Fixed UI port
    pub ui_port:                   u16,
    /// Namespace shared by the engine and the backend's workflow client
    pub namespace:                 String,
    /// Workflow engine executable
    pub engine_program:            String,
    pub engine_log_level:          String,
    pub engine_ready_timeout_secs: u64,
    /// Composite backend executable and extra arguments
    pub backend_program:           String,
    pub backend_args:              Vec<String>,
    /// Prebuilt single-page application
    pub assets_dir:                PathBuf,
    /// Parent of the per-session working directories
    pub data_dir:                  PathBuf,
    /// Upper bound on waiting for services to unwind after cancellation
    pub shutdown_timeout_secs:     u64,
    pub structured_logging:        bool
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            ip:                        IpAddr::V4(Ipv4Addr::LOCALHOST),
            server_port:               4400,
            ui_port:                   5400,
            namespace:                 DEFAULT_NAMESPACE.to_string(),
            engine_program:            "temporal".to_string(),
            engine_log_level:          "error".to_string(),
            engine_ready_timeout_secs: 30,
            backend_program:           "devstack-backend".to_string(),
            backend_args:              Vec::new(),
            assets_dir:                PathBuf::from("ui/dist"),
            data_dir:                  default_data_dir(),
            shutdown_timeout_secs:     10,
            structured_logging:        false
        }
    }
}

impl DevConfig {
    /// Load configuration from `path`, or from the default config file if it exists.
    ///
    /// An explicit path that cannot be read is an error; a missing default file is not.
    pub fn load(path: Option<&Path>) -> Result<Self, DevError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_file() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default())
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config =
            Self::from_yaml(&content).with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Parse a YAML document; an empty document yields the defaults
    pub fn from_yaml(content: &str) -> Result<Self, DevError> {
        let config: Option<Self> = serde_yaml::from_str(content)?;
        Ok(config.unwrap_or_default())
    }

    pub fn validate(&self) -> Result<(), DevError> {
        if !self.ip.is_loopback() {
            return Err(DevError::Configuration(format!("ip {} is not a loopback address", self.ip)));
        }
        if self.server_port == 0 || self.ui_port == 0 {
            return Err(DevError::Configuration("server_port and ui_port must be non-zero".to_string()));
        }
        if self.server_port == self.ui_port {
            return Err(DevError::Configuration(format!(
                "server_port and ui_port must differ (both are {})",
                self.server_port
            )));
        }
        if self.namespace.trim().is_empty() {
            return Err(DevError::Configuration("namespace must not be empty".to_string()));
        }
        if self.engine_ready_timeout_secs == 0 {
            return Err(DevError::Configuration("engine_ready_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn ui_address(&self) -> Result<ServiceAddress, DevError> {
        ServiceAddress::loopback(self.ip, self.ui_port)
    }

    pub fn engine_ready_timeout(&self) -> Duration {
        Duration::from_secs(self.engine_ready_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Get the project directories for cross-platform path resolution
pub fn get_project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "devstack")
}

/// `devstack.yaml` in the platform config directory
pub fn default_config_file() -> Option<PathBuf> {
    get_project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Session directories live under the platform local data directory
pub fn default_data_dir() -> PathBuf {
    get_project_dirs()
        .map(|dirs| dirs.data_local_dir().join("sessions"))
        .unwrap_or_else(|| std::env::temp_dir().join("devstack").join("sessions"))
}
