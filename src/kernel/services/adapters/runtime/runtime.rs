use crate::kernel::services::ports::{Job, TaskExecutor};
use std::io;
use std::sync::Mutex;
use std::time::Duration;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Executes blocking collaborator calls on a tokio runtime's blocking pool.
pub struct TokioExecutor {
    runtime: Mutex<Option<tokio::runtime::Runtime>>,
}

impl TokioExecutor {
    pub fn new(worker_threads: usize) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .thread_name("dashgrid-worker")
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
        })
    }

    pub fn tokio_handle(&self) -> Option<tokio::runtime::Handle> {
        self.runtime
            .lock()
            .ok()
            .and_then(|rt| rt.as_ref().map(|rt| rt.handle().clone()))
    }
}

impl TaskExecutor for TokioExecutor {
    fn execute(&self, job: Job) {
        match self.tokio_handle() {
            Some(handle) => {
                handle.spawn_blocking(job);
            }
            None => tracing::warn!("executor already shut down, job dropped"),
        }
    }

    fn shutdown(&self) {
        let runtime = match self.runtime.lock() {
            Ok(mut rt) => rt.take(),
            Err(_) => None,
        };
        if let Some(runtime) = runtime {
            runtime.shutdown_timeout(SHUTDOWN_GRACE);
            tracing::debug!("tokio executor shut down");
        }
    }
}

impl Drop for TokioExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/runtime/runtime.rs"]
mod tests;
