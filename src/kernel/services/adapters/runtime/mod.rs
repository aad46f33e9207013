//! Async runtime adapter: runs task bodies on worker threads.

mod runtime;

pub use runtime::TokioExecutor;
