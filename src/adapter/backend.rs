//! Composite backend launched as a child process
//!
//! The backend receives its configuration as a YAML file (`--config <file>`) written
//! into the session directory right before launch.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{Level, event};

use crate::{
    adapter::process,
    domain::{constant::backend, error::DevError, service::ServiceConfig},
    port::backend::Backend
};

/// File name of the rendered backend configuration
pub const CONFIG_FILE: &str = "backend.yaml";

pub struct ProcessBackend {
    program: String,
    args:    Vec<String>
}

impl ProcessBackend {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }
}

async fn write_config(config: &ServiceConfig) -> Result<PathBuf, DevError> {
    tokio::fs::create_dir_all(&config.data_dir).await?;

    let path = config.data_dir.join(CONFIG_FILE);
    let content = serde_yaml::to_string(config)?;
    tokio::fs::write(&path, content).await?;

    event!(Level::DEBUG, event = backend::CONFIG_WRITTEN, path = %path.display());
    Ok(path)
}

#[async_trait]
impl Backend for ProcessBackend {
    async fn run(&self, token: CancellationToken, config: Arc<ServiceConfig>) -> Result<(), DevError> {
        let config_path =
            write_config(&config).await.map_err(|e| DevError::Backend(format!("failed to write config: {}", e)))?;

        let mut child = process::supervised_command(&self.program)
            .args(&self.args)
            .arg("--config")
            .arg(&config_path)
            .current_dir(&config.data_dir)
            .spawn()
            .map_err(|e| DevError::backend_launch_failed(&self.program, e))?;
        process::log_spawned("backend", &child);

        let exited = tokio::select! {
            status = child.wait() => Some(status),
            _ = token.cancelled() => None
        };

        match exited {
            Some(Ok(status)) if status.success() => {
                event!(Level::INFO, event = backend::BACKEND_EXITED, status = %status);
                Ok(())
            }
            Some(Ok(status)) => {
                event!(Level::ERROR, event = backend::BACKEND_EXITED, status = %status);
                Err(DevError::backend_exit_status(status))
            }
            Some(Err(e)) => Err(DevError::Backend(e.to_string())),
            None => {
                process::terminate(&mut child, "backend").await;
                event!(Level::INFO, event = backend::BACKEND_CANCELLED);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::{IpAddr, Ipv4Addr},
        time::Duration
    };

    use tempfile::TempDir;

    use super::*;
    use crate::domain::address::ServiceAddress;

    fn config(dir: &TempDir) -> Arc<ServiceConfig> {
        let address = |port| ServiceAddress::loopback(IpAddr::V4(Ipv4Addr::LOCALHOST), port).unwrap();
        Arc::new(ServiceConfig::dev(
            4400,
            &address(5400),
            false,
            dir.path().join("session"),
            address(4222),
            address(7233),
            "default"
        ))
    }

    fn shell(script: &str) -> ProcessBackend {
        ProcessBackend::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn test_config_file_written_before_launch() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);

        // The script only succeeds if the config file already exists when it runs
        let backend = shell("test -f backend.yaml");
        backend.run(CancellationToken::new(), config.clone()).await.unwrap();

        let written = std::fs::read_to_string(config.data_dir.join(CONFIG_FILE)).unwrap();
        assert!(written.contains("namespace: default"));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = shell("exit 3").run(CancellationToken::new(), config(&dir)).await;
        assert!(matches!(result, Err(DevError::Backend(_))));
    }

    #[tokio::test]
    async fn test_cancellation_kills_child_and_returns_ok() {
        let dir = TempDir::new().unwrap();
        let token = CancellationToken::new();
        let backend = shell("sleep 30");

        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(Duration::from_secs(10), backend.run(token, config(&dir))).await;
        assert_eq!(result.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_missing_program_is_a_backend_error() {
        let dir = TempDir::new().unwrap();
        let backend = ProcessBackend::new("devstack-no-such-backend-binary", vec![]);
        let result = backend.run(CancellationToken::new(), config(&dir)).await;
        assert!(matches!(result, Err(DevError::Backend(_))));
    }
}
