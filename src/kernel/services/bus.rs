use std::any::Any;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// Type-erased task result, unpacked by the task that produced it.
pub type Outcome = Box<dyn Any + Send>;

/// Outcome handed to completions still pending when the context is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextClosed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

pub enum TaskMessage {
    Completed { id: TaskId, outcome: Outcome },
}

impl std::fmt::Debug for TaskMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskMessage::Completed { id, .. } => {
                f.debug_struct("Completed").field("id", id).finish_non_exhaustive()
            }
        }
    }
}

#[derive(Clone)]
pub struct TaskBusSender {
    tx: Sender<TaskMessage>,
}

pub struct TaskBusReceiver {
    rx: Receiver<TaskMessage>,
}

pub fn task_bus() -> (TaskBusSender, TaskBusReceiver) {
    let (tx, rx) = mpsc::channel();
    (TaskBusSender { tx }, TaskBusReceiver { rx })
}

impl TaskBusSender {
    pub fn send_completed(
        &self,
        id: TaskId,
        outcome: Outcome,
    ) -> Result<(), mpsc::SendError<TaskMessage>> {
        self.tx.send(TaskMessage::Completed { id, outcome })
    }
}

impl TaskBusReceiver {
    pub fn try_recv(&self) -> Result<TaskMessage, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<TaskMessage, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}
