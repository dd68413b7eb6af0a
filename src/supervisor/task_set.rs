//! Fixed-size task set with first-error-wins aggregation
//!
//! Each supervised service runs on its own task inside a `JoinSet`, so the
//! coordinator can wait for "whichever finishes first" and later drain the rest.

use std::{collections::HashMap, future::Future};

use tokio::task::{self, JoinSet};
use tracing::{Level, event};

use crate::domain::{constant::orchestrator, error::DevError, state::ServiceKind};

pub type TaskResult = (ServiceKind, Result<(), DevError>);

#[derive(Default)]
pub struct TaskSet {
    tasks:    JoinSet<TaskResult>,
    /// Maps task ids back to their service when a task panics or is aborted
    services: HashMap<task::Id, ServiceKind>
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` on its own tokio task. Panics and aborts are reported as `DevError::Task`.
    pub fn spawn<F>(&mut self, service: ServiceKind, task: F)
    where
        F: Future<Output = Result<(), DevError>> + Send + 'static
    {
        let handle = self.tasks.spawn(async move { (service, task.await) });
        self.services.insert(handle.id(), service);
    }

    /// Next result in completion order, `None` once every task has reported
    pub async fn next(&mut self) -> Option<TaskResult> {
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(result) => return Some(result),
                Err(e) => {
                    // Every id is registered in `spawn`
                    if let Some(service) = self.services.get(&e.id()).copied() {
                        return Some((service, Err(DevError::from(e))));
                    }
                }
            }
        }
        None
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Abort every task that has not finished yet
    pub fn abort_all(&mut self) {
        event!(Level::WARN, event = orchestrator::DRAIN_TIMED_OUT, pending = self.tasks.len(), action = "abort");
        self.tasks.abort_all();
    }
}

/// Keeps the first error reported by any service; later ones are logged and dropped
#[derive(Debug, Default)]
pub struct FirstError {
    first: Option<DevError>
}

impl FirstError {
    /// Returns true when `error` became the surfaced error
    pub fn record(&mut self, service: ServiceKind, error: DevError) -> bool {
        if self.first.is_none() {
            self.first = Some(error);
            return true;
        }
        self.discard(service, error);
        false
    }

    /// Log `error` without ever surfacing it
    pub fn discard(&self, service: ServiceKind, error: DevError) {
        event!(Level::WARN, event = orchestrator::ERROR_DISCARDED, service = %service, error = %error);
    }

    pub fn into_inner(self) -> Option<DevError> {
        self.first
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_results_arrive_in_completion_order() {
        let mut tasks = TaskSet::new();
        tasks.spawn(ServiceKind::Backend, async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        });
        tasks.spawn(ServiceKind::Ui, async { Err(DevError::Ui("bind".to_string())) });
        assert_eq!(tasks.pending(), 2);

        assert_eq!(tasks.next().await, Some((ServiceKind::Ui, Err(DevError::Ui("bind".to_string())))));
        assert_eq!(tasks.next().await, Some((ServiceKind::Backend, Ok(()))));
        assert_eq!(tasks.next().await, None);
    }

    #[tokio::test]
    async fn test_panic_is_reported_as_task_error() {
        async fn explode() -> Result<(), DevError> {
            panic!("backend blew up")
        }

        let mut tasks = TaskSet::new();
        tasks.spawn(ServiceKind::Backend, explode());

        let (service, result) = tasks.next().await.unwrap();
        assert_eq!(service, ServiceKind::Backend);
        assert!(matches!(result, Err(DevError::Task(_))));
    }

    #[tokio::test]
    async fn test_abort_reports_pending_tasks() {
        let mut tasks = TaskSet::new();
        tasks.spawn(ServiceKind::Ui, std::future::pending());
        assert_eq!(tasks.pending(), 1);

        tasks.abort_all();
        let (service, result) = tasks.next().await.unwrap();
        assert_eq!(service, ServiceKind::Ui);
        assert!(matches!(result, Err(DevError::Task(_))));
        assert_eq!(tasks.pending(), 0);
        assert_eq!(tasks.next().await, None);
    }

    #[test]
    fn test_first_error_wins() {
        let mut errors = FirstError::default();
        assert!(errors.record(ServiceKind::Ui, DevError::Ui("first".to_string())));
        assert!(!errors.record(ServiceKind::Backend, DevError::Backend("second".to_string())));
        errors.discard(ServiceKind::Backend, DevError::Backend("after interrupt".to_string()));
        assert_eq!(errors.into_inner(), Some(DevError::Ui("first".to_string())));
    }
}
