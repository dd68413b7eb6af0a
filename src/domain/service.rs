//! Configuration handed to the composite backend
//!
//! Built once after the workflow engine is reachable and shared read-only
//! (behind an `Arc`) for the rest of the run.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::address::ServiceAddress;

/// File name of the backend's embedded store inside the session directory
pub const STORAGE_FILE: &str = "backend.db";

/// Complete backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceConfig {
    /// Backend API listen port
    pub port:               u16,
    /// Origins allowed by the backend's CORS policy
    pub cors_origins:       Vec<String>,
    pub structured_logging: bool,
    /// Session-scoped working directory
    pub data_dir:           PathBuf,
    pub storage:            StorageConfig,
    pub broker:             BrokerConfig,
    pub workflow:           WorkflowClientConfig
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Embedded storage engine backed by a single file
    File { path: PathBuf }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokerConfig {
    pub host_port: ServiceAddress,
    /// Run the broker inside the backend process
    pub embedded:  bool
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowClientConfig {
    pub host_port: ServiceAddress,
    pub namespace: String
}

impl ServiceConfig {
    /// Dev configuration: file-backed storage in `data_dir`, embedded broker on `broker`,
    /// workflow client pointed at `engine`, and only the UI origin allowed
    pub fn dev(
        port: u16,
        ui: &ServiceAddress,
        structured_logging: bool,
        data_dir: PathBuf,
        broker: ServiceAddress,
        engine: ServiceAddress,
        namespace: &str
    ) -> Self {
        Self {
            port,
            cors_origins: vec![ui.http_origin()],
            structured_logging,
            storage: StorageConfig::File { path: data_dir.join(STORAGE_FILE) },
            data_dir,
            broker: BrokerConfig { host_port: broker, embedded: true },
            workflow: WorkflowClientConfig { host_port: engine, namespace: namespace.to_string() }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;

    fn address(port: u16) -> ServiceAddress {
        ServiceAddress::loopback(IpAddr::V4(Ipv4Addr::LOCALHOST), port).unwrap()
    }

    #[test]
    fn test_dev_config_serializes_to_yaml() {
        let config = ServiceConfig::dev(
            4400,
            &address(5400),
            false,
            PathBuf::from("/tmp/session"),
            address(4222),
            address(7233),
            "default"
        );

        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("port: 4400"));
        assert!(yaml.contains("http://127.0.0.1:5400"));
        assert!(yaml.contains("mode: file"));
        assert!(yaml.contains("/tmp/session/backend.db"));
        assert!(yaml.contains("host_port: 127.0.0.1:4222"));
        assert!(yaml.contains("namespace: default"));
    }
}
