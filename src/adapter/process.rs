//! Child process helpers shared by the engine and backend adapters

use std::{ffi::OsStr, process::Stdio};

use tokio::process::{Child, Command};
use tracing::{Level, event};

use crate::domain::constant::process;

/// Command with the defaults every supervised child gets: no stdin, inherited
/// output and killed if its handle is dropped
pub fn supervised_command(program: impl AsRef<OsStr>) -> Command {
    let mut command = Command::new(program);
    command.stdin(Stdio::null()).stdout(Stdio::inherit()).stderr(Stdio::inherit()).kill_on_drop(true);
    command
}

pub fn log_spawned(name: &str, child: &Child) {
    event!(Level::DEBUG, event = process::PROCESS_SPAWNED, process = name, pid = ?child.id());
}

/// Kill the child (if still running) and reap it. Never fails.
pub async fn terminate(child: &mut Child, name: &str) {
    if let Ok(Some(status)) = child.try_wait() {
        event!(Level::DEBUG, event = process::PROCESS_KILLED, process = name, status = %status, already_exited = true);
        return;
    }

    if let Err(e) = child.start_kill() {
        event!(Level::WARN, event = process::PROCESS_KILL_FAILED, process = name, error = %e);
    }

    match child.wait().await {
        Ok(status) => event!(Level::DEBUG, event = process::PROCESS_KILLED, process = name, status = %status),
        Err(e) => event!(Level::WARN, event = process::PROCESS_KILL_FAILED, process = name, error = %e)
    }
}
