//! One-shot background operation with lifecycle observers.
//!
//! `Created → Running → {Succeeded, Failed} → Finished`. Started observers run
//! synchronously inside `start()`; the operation body runs on the executor; the
//! remaining observers run on the interactive thread when the context pumps the
//! outcome. Each observer call is isolated: a panicking observer is logged and
//! the rest still run.

use std::any::Any;
use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use super::services::ports::CollaboratorError;
use super::services::{ContextClosed, InteractiveContext, Outcome, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Created,
    Running,
    Succeeded,
    Failed,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    Collaborator(CollaboratorError),
    Panicked(String),
    /// The interactive context was torn down before the task could run.
    Closed,
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskError::Collaborator(e) => write!(f, "{}", e),
            TaskError::Panicked(msg) => write!(f, "task panicked: {}", msg),
            TaskError::Closed => write!(f, "interactive context closed"),
        }
    }
}

impl std::error::Error for TaskError {}

impl From<CollaboratorError> for TaskError {
    fn from(e: CollaboratorError) -> Self {
        TaskError::Collaborator(e)
    }
}

type Operation<T> = Box<dyn FnOnce() -> Result<T, CollaboratorError> + Send>;

pub struct AsyncTask<T> {
    label: &'static str,
    operation: Operation<T>,
    state: Rc<Cell<TaskState>>,
    started: Vec<Box<dyn FnMut()>>,
    success: Vec<Box<dyn FnMut(&T)>>,
    failure: Vec<Box<dyn FnMut(&TaskError)>>,
    finished: Vec<Box<dyn FnMut()>>,
}

/// Observes a started task's state from the interactive thread.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: Option<TaskId>,
    label: &'static str,
    state: Rc<Cell<TaskState>>,
}

impl TaskHandle {
    pub fn id(&self) -> Option<TaskId> {
        self.id
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn state(&self) -> TaskState {
        self.state.get()
    }

    pub fn is_finished(&self) -> bool {
        self.state.get() == TaskState::Finished
    }
}

impl<T: Send + 'static> AsyncTask<T> {
    pub fn new<F>(label: &'static str, operation: F) -> Self
    where
        F: FnOnce() -> Result<T, CollaboratorError> + Send + 'static,
    {
        Self {
            label,
            operation: Box::new(operation),
            state: Rc::new(Cell::new(TaskState::Created)),
            started: Vec::new(),
            success: Vec::new(),
            failure: Vec::new(),
            finished: Vec::new(),
        }
    }

    pub fn state(&self) -> TaskState {
        self.state.get()
    }

    pub fn on_started(mut self, f: impl FnMut() + 'static) -> Self {
        self.started.push(Box::new(f));
        self
    }

    pub fn on_success(mut self, f: impl FnMut(&T) + 'static) -> Self {
        self.success.push(Box::new(f));
        self
    }

    pub fn on_failure(mut self, f: impl FnMut(&TaskError) + 'static) -> Self {
        self.failure.push(Box::new(f));
        self
    }

    pub fn on_finished(mut self, f: impl FnMut() + 'static) -> Self {
        self.finished.push(Box::new(f));
        self
    }

    pub fn start(self, ctx: &InteractiveContext) -> TaskHandle {
        let AsyncTask {
            label,
            operation,
            state,
            mut started,
            success,
            failure,
            finished,
        } = self;

        state.set(TaskState::Running);
        tracing::debug!(task = label, "task started");
        for observer in started.iter_mut() {
            notify(label, "started", || observer());
        }

        let observers = Observers {
            label,
            state: Rc::clone(&state),
            success,
            failure,
            finished,
        };

        if ctx.is_closed() {
            tracing::warn!(task = label, "task started on a closed context");
            observers.deliver(Err(TaskError::Closed));
            return TaskHandle {
                id: None,
                label,
                state,
            };
        }

        let id = ctx.submit(
            move || -> Outcome {
                let result: Result<T, TaskError> = match catch_unwind(AssertUnwindSafe(operation))
                {
                    Ok(r) => r.map_err(TaskError::from),
                    Err(payload) => Err(TaskError::Panicked(panic_message(payload))),
                };
                Box::new(result)
            },
            Box::new(move |outcome: Outcome| observers.complete(outcome)),
        );

        TaskHandle { id, label, state }
    }
}

struct Observers<T> {
    label: &'static str,
    state: Rc<Cell<TaskState>>,
    success: Vec<Box<dyn FnMut(&T)>>,
    failure: Vec<Box<dyn FnMut(&TaskError)>>,
    finished: Vec<Box<dyn FnMut()>>,
}

impl<T: 'static> Observers<T> {
    fn complete(self, outcome: Outcome) {
        let result = match outcome.downcast::<Result<T, TaskError>>() {
            Ok(result) => *result,
            Err(other) if other.is::<ContextClosed>() => Err(TaskError::Closed),
            Err(_) => Err(TaskError::Panicked("unexpected task outcome type".to_string())),
        };
        self.deliver(result);
    }

    fn deliver(mut self, result: Result<T, TaskError>) {
        let label = self.label;
        match &result {
            Ok(value) => {
                self.state.set(TaskState::Succeeded);
                tracing::debug!(task = label, "task succeeded");
                for observer in self.success.iter_mut() {
                    notify(label, "success", || observer(value));
                }
            }
            Err(err) => {
                self.state.set(TaskState::Failed);
                tracing::error!(task = label, error = %err, "task failed");
                for observer in self.failure.iter_mut() {
                    notify(label, "failure", || observer(err));
                }
            }
        }
        self.state.set(TaskState::Finished);
        for observer in self.finished.iter_mut() {
            notify(label, "finished", || observer());
        }
    }
}

fn notify(label: &'static str, stage: &'static str, f: impl FnOnce()) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(f)) {
        tracing::error!(
            task = label,
            stage,
            panic = %panic_message(payload),
            "task observer panicked"
        );
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/task.rs"]
mod tests;
