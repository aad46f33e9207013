//! 交互线程上下文
//!
//! 持有任务完成消息总线与执行器。工作线程只发送结果，观察者回调统一在
//! `pump()` 中于交互线程上执行。

use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use std::thread::ThreadId;
use std::time::{Duration, Instant};

use super::bus::{
    task_bus, ContextClosed, Outcome, TaskBusReceiver, TaskBusSender, TaskId, TaskMessage,
};
use super::ports::TaskExecutor;

/// Applies a task outcome on the interactive thread.
pub(crate) type Completion = Box<dyn FnOnce(Outcome)>;

pub struct InteractiveContext {
    thread: ThreadId,
    bus: TaskBusSender,
    rx: TaskBusReceiver,
    executor: Arc<dyn TaskExecutor>,
    pending: RefCell<FxHashMap<TaskId, Completion>>,
    next_id: Cell<u64>,
    closed: Cell<bool>,
}

impl InteractiveContext {
    /// Bind a context to the calling thread.
    pub fn init(executor: Arc<dyn TaskExecutor>) -> Self {
        let (bus, rx) = task_bus();
        tracing::debug!("interactive context initialized");
        Self {
            thread: std::thread::current().id(),
            bus,
            rx,
            executor,
            pending: RefCell::new(FxHashMap::default()),
            next_id: Cell::new(1),
            closed: Cell::new(false),
        }
    }

    pub fn owner_thread(&self) -> ThreadId {
        self.thread
    }

    pub fn is_interactive_thread(&self) -> bool {
        std::thread::current().id() == self.thread
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Run `job` on the executor and apply its outcome with `completion` during a
    /// later `pump()`. Returns `None` once the context is torn down.
    pub(crate) fn submit<J>(&self, job: J, completion: Completion) -> Option<TaskId>
    where
        J: FnOnce() -> Outcome + Send + 'static,
    {
        debug_assert!(self.is_interactive_thread());
        if self.closed.get() {
            return None;
        }
        let id = TaskId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.pending.borrow_mut().insert(id, completion);

        let tx = self.bus.clone();
        self.executor.execute(Box::new(move || {
            let outcome = job();
            if tx.send_completed(id, outcome).is_err() {
                tracing::debug!(task = id.0, "task finished after context teardown");
            }
        }));
        Some(id)
    }

    /// Apply every outcome that has arrived. Never blocks.
    pub fn pump(&self) -> usize {
        debug_assert!(self.is_interactive_thread());
        let mut applied = 0;
        while let Ok(msg) = self.rx.try_recv() {
            applied += usize::from(self.apply(msg));
        }
        applied
    }

    /// Block until no task is pending or `timeout` elapses. For host loops and
    /// tests; returns whether everything completed.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.pump();
        while self.pending_count() > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            match self.rx.recv_timeout(deadline - now) {
                Ok(msg) => {
                    self.apply(msg);
                    self.pump();
                }
                Err(_) => return self.pending_count() == 0,
            }
        }
        true
    }

    fn apply(&self, msg: TaskMessage) -> bool {
        match msg {
            TaskMessage::Completed { id, outcome } => {
                // Released before the completion runs: observers may start new tasks.
                let completion = self.pending.borrow_mut().remove(&id);
                match completion {
                    Some(completion) => {
                        completion(outcome);
                        true
                    }
                    None if self.closed.get() => {
                        tracing::debug!(task = id.0, "outcome arrived after teardown");
                        false
                    }
                    None => {
                        tracing::warn!(task = id.0, "completion for unknown task dropped");
                        false
                    }
                }
            }
        }
    }

    /// Stop the executor and complete every outstanding task with
    /// `ContextClosed`, so each still reaches `Finished`. Outcomes that arrive
    /// later are ignored.
    pub fn teardown(&self) {
        if self.closed.replace(true) {
            return;
        }
        let mut pending: Vec<(TaskId, Completion)> = self.pending.borrow_mut().drain().collect();
        pending.sort_unstable_by_key(|(id, _)| *id);
        if !pending.is_empty() {
            tracing::warn!(
                pending = pending.len(),
                "interactive context torn down with pending tasks"
            );
        }
        for (_, completion) in pending {
            completion(Box::new(ContextClosed));
        }
        self.executor.shutdown();
        tracing::debug!("interactive context torn down");
    }
}

impl Drop for InteractiveContext {
    fn drop(&mut self) {
        self.teardown();
    }
}
