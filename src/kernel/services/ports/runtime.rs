/// A unit of blocking work handed to a worker thread.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs off the interactive thread.
pub trait TaskExecutor: Send + Sync {
    fn execute(&self, job: Job);

    /// Stop accepting work and release worker threads.
    fn shutdown(&self) {}
}
