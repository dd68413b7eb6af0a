//! CLI argument parsing

use std::{net::IpAddr, path::PathBuf};

use clap::Parser;

use crate::{config::DevConfig, domain::error::DevError};

/// Run the workflow engine, the backend and the web UI as one local dev environment
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML configuration file (defaults to devstack.yaml in the platform config dir)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Loopback IP every service binds to
    #[arg(long)]
    pub ip: Option<IpAddr>,

    /// Backend API port
    #[arg(long, value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Web UI port
    #[arg(long, value_name = "PORT")]
    pub ui_port: Option<u16>,

    /// Directory holding the prebuilt web UI
    #[arg(long, value_name = "DIR")]
    pub assets_dir: Option<PathBuf>,

    /// Directory for per-session state
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Workflow engine executable
    #[arg(long, value_name = "PROGRAM")]
    pub engine_program: Option<String>,

    /// Backend executable
    #[arg(long, value_name = "PROGRAM")]
    pub backend_program: Option<String>,

    /// Extra argument passed to the backend (repeatable)
    #[arg(long = "backend-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub backend_args: Vec<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool
}

impl Cli {
    /// Apply flags on top of file/default configuration
    pub fn apply(&self, mut config: DevConfig) -> DevConfig {
        if let Some(ip) = self.ip {
            config.ip = ip;
        }
        if let Some(port) = self.server_port {
            config.server_port = port;
        }
        if let Some(port) = self.ui_port {
            config.ui_port = port;
        }
        if let Some(dir) = &self.assets_dir {
            config.assets_dir = dir.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(program) = &self.engine_program {
            config.engine_program = program.clone();
        }
        if let Some(program) = &self.backend_program {
            config.backend_program = program.clone();
        }
        if !self.backend_args.is_empty() {
            config.backend_args = self.backend_args.clone();
        }
        if self.json_logs {
            config.structured_logging = true;
        }
        config
    }

    /// Load, override and validate the session configuration
    pub fn resolve_config(&self) -> Result<DevConfig, DevError> {
        let config = self.apply(DevConfig::load(self.config.as_deref())?);
        config.validate()?;
        Ok(config)
    }
}
