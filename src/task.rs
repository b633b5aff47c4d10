use std::{future::Future, time::Duration};

use tokio::{task::JoinHandle, time};
use tokio_util::sync::{CancellationToken, DropGuard};

pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// A spawned loop that stops when its token is cancelled or the handle is dropped.
pub struct BackgroundTask {
    name: &'static str,
    task_handle: JoinHandle<()>,
    cancellation_guard: DropGuard,
}

impl BackgroundTask {
    pub fn spawn<F, Fut>(name: &'static str, work: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancellation_token = CancellationToken::new();
        let task_handle = tokio::spawn(work(cancellation_token.child_token()));

        log::info!("Started {name} task");

        Self {
            name,
            task_handle,
            cancellation_guard: cancellation_token.drop_guard(),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.task_handle.is_finished()
    }

    pub async fn cancel(self, timeout: Duration) {
        let Self {
            name,
            task_handle,
            cancellation_guard,
        } = self;
        drop(cancellation_guard);

        match time::timeout(timeout, task_handle).await {
            Ok(Ok(())) => log::info!("Stopped {name} task"),
            Ok(Err(error)) => log::error!("{name} task failed: {error}"),
            Err(_) => log::warn!("{name} task did not stop within {timeout:?}"),
        }
    }
}
