//! Per-run working directory
//!
//! Holds the backend's file-backed storage and rendered config. Nothing in it is
//! meant to outlive the dev session.

use std::path::{Path, PathBuf};

use tracing::{Level, event};
use uuid::Uuid;

use crate::domain::{constant::orchestrator, error::DevError};

#[derive(Debug)]
pub struct Session {
    id:  Uuid,
    dir: PathBuf
}

impl Session {
    /// Create `<data_dir>/<uuid>`
    pub fn create(data_dir: &Path) -> Result<Self, DevError> {
        let id = Uuid::new_v4();
        let dir = data_dir.join(id.to_string());

        std::fs::create_dir_all(&dir).map_err(|e| {
            DevError::Configuration(format!("cannot create session directory {}: {}", dir.display(), e))
        })?;

        event!(Level::DEBUG, event = orchestrator::SESSION_CREATED, session_id = %id, dir = %dir.display());
        Ok(Self { id, dir })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Best-effort removal; failures are only logged
    pub fn remove(self) {
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            event!(Level::WARN, event = orchestrator::SESSION_CLEANUP_FAILED,
                   dir = %self.dir.display(), error = %e);
        }
    }
}
