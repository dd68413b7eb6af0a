use std::net::IpAddr;

use uuid::Uuid;

use crate::domain::{address::ServiceAddress, constant::cluster, error::DevError};

/// Everything the dev workflow engine needs to come up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineStartOptions {
    /// Bind IP for both the frontend and the engine's own UI
    pub ip:                       IpAddr,
    /// Frontend (client API) port
    pub frontend_port:            u16,
    /// Port of the engine's bundled web UI
    pub ui_port:                  u16,
    /// Namespaces registered before `start` returns
    pub namespaces:               Vec<String>,
    /// Freshly generated per run
    pub cluster_id:               String,
    pub master_cluster_name:      String,
    pub current_cluster_name:     String,
    pub initial_failover_version: i64,
    /// Log level handed to the engine process
    pub log_level:                String
}

impl EngineStartOptions {
    /// Options for a single-namespace, non-failover dev cluster with a new identity
    pub fn dev(ip: IpAddr, frontend_port: u16, ui_port: u16, namespace: &str, log_level: &str) -> Self {
        Self {
            ip,
            frontend_port,
            ui_port,
            namespaces: vec![namespace.to_string()],
            cluster_id: Uuid::new_v4().to_string(),
            master_cluster_name: cluster::MASTER_CLUSTER_NAME.to_string(),
            current_cluster_name: cluster::CURRENT_CLUSTER_NAME.to_string(),
            initial_failover_version: cluster::INITIAL_FAILOVER_VERSION,
            log_level: log_level.to_string()
        }
    }

    pub fn frontend_address(&self) -> Result<ServiceAddress, DevError> {
        ServiceAddress::loopback(self.ip, self.frontend_port)
    }
}
