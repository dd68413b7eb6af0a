//! Domain constants - shared identifiers and structured event names

/// Namespace registered with the dev workflow engine and used by the backend's client
pub const DEFAULT_NAMESPACE: &str = "default";

/// Document served for any path the asset bundle cannot resolve
pub const INDEX_PAGE: &str = "index.html";

/// Cluster identity for the single, non-failover dev engine
pub mod cluster {
    pub const MASTER_CLUSTER_NAME: &str = "active";
    pub const CURRENT_CLUSTER_NAME: &str = "active";
    pub const INITIAL_FAILOVER_VERSION: i64 = 1;
}

/// Orchestrator Events
pub mod orchestrator {
    pub const PHASE_CHANGED: &str = "phase.changed";
    pub const PORTS_ALLOCATED: &str = "ports.allocated";
    pub const SERVICES_CONFIGURED: &str = "services.configured";
    pub const SETUP_FAILED: &str = "setup.failed";
    pub const INTERRUPTED: &str = "run.interrupted";
    pub const TASK_FINISHED: &str = "task.finished";
    pub const ERROR_DISCARDED: &str = "error.discarded";
    pub const DRAIN_TIMED_OUT: &str = "drain.timed_out";
    pub const SESSION_CREATED: &str = "session.created";
    pub const SESSION_CLEANUP_FAILED: &str = "session.cleanup_failed";
    pub const RUN_COMPLETED: &str = "run.completed";
}

/// Port allocation Events
pub mod ports {
    pub const PORT_ALLOCATED: &str = "port.allocated";
    pub const PORT_COLLISION: &str = "port.collision";
}

/// Child process Events
pub mod process {
    pub const PROCESS_SPAWNED: &str = "process.spawned";
    pub const PROCESS_KILLED: &str = "process.killed";
    pub const PROCESS_KILL_FAILED: &str = "process.kill_failed";
}

/// Workflow engine Events
pub mod engine {
    pub const ENGINE_READY: &str = "engine.ready";
    pub const ENGINE_START_FAILED: &str = "engine.start_failed";
    pub const ENGINE_STOPPED: &str = "engine.stopped";
}

/// Backend Events
pub mod backend {
    pub const CONFIG_WRITTEN: &str = "backend.config_written";
    pub const BACKEND_EXITED: &str = "backend.exited";
    pub const BACKEND_CANCELLED: &str = "backend.cancelled";
}

/// UI server Events
pub mod ui {
    pub const UI_SERVING: &str = "ui.serving";
    pub const UI_LISTENING: &str = "ui.listening";
    pub const UI_CLOSED: &str = "ui.closed";
    pub const UI_CLOSE_FAILED: &str = "ui.close_failed";
    pub const INDEX_FALLBACK: &str = "ui.index_fallback";
    pub const INDEX_MISSING: &str = "ui.index_missing";
    pub const ASSET_LOOKUP_FAILED: &str = "ui.asset_lookup_failed";
}
