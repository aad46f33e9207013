//! 宿主会话：把 `Store` 产生的 effect 变成后台任务
//!
//! Every effect runs as an `AsyncTask` whose observers feed lifecycle actions
//! back into the store on the interactive thread. A follow-up effect raised by
//! one of those actions (the refresh after a save) is started the same way.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Duration;

use super::services::ports::{ChangeSink, ExportSettings, PageData, PageSource, Settings};
use super::services::InteractiveContext;
use super::task::{AsyncTask, TaskHandle};
use super::{Action, Effect, GridState, Store};
use crate::models::{ChangeSet, GridError, Result};

pub struct GridSession {
    ctx: Rc<InteractiveContext>,
    store: Rc<RefCell<Store>>,
    runner: EffectRunner,
    export: ExportSettings,
}

impl GridSession {
    pub fn new(
        ctx: Rc<InteractiveContext>,
        settings: &Settings,
        source: Arc<dyn PageSource>,
        sink: Arc<dyn ChangeSink>,
    ) -> Self {
        let store = Rc::new(RefCell::new(Store::new(GridState::new(&ctx, &settings.grid))));
        let runner = EffectRunner {
            ctx: Rc::downgrade(&ctx),
            store: Rc::downgrade(&store),
            source,
            sink,
        };
        Self {
            ctx,
            store,
            runner,
            export: settings.export.clone(),
        }
    }

    pub fn context(&self) -> &InteractiveContext {
        &self.ctx
    }

    /// Request the first page.
    pub fn open(&self) -> Result<Vec<TaskHandle>> {
        self.dispatch(Action::GoTo(1))
    }

    /// Dispatch an interaction and start any task it asks for. Lifecycle
    /// actions are rejected here; only task observers raise them.
    pub fn dispatch(&self, action: Action) -> Result<Vec<TaskHandle>> {
        if action.is_lifecycle() {
            tracing::warn!(action = action.name(), "lifecycle action dispatched by host");
            return Err(GridError::LifecycleAction(action.name()));
        }
        let result = self.store.borrow_mut().dispatch(action)?;
        Ok(self.runner.run_all(result.effects))
    }

    pub fn go_to(&self, page: u32) -> Result<Vec<TaskHandle>> {
        self.dispatch(Action::GoTo(page))
    }

    pub fn save(&self) -> Result<Vec<TaskHandle>> {
        self.dispatch(Action::Save)
    }

    pub fn delete_selected(&self) -> Result<Vec<TaskHandle>> {
        self.dispatch(Action::DeleteSelected)
    }

    /// Apply finished task outcomes. Call from the host's event loop.
    pub fn pump(&self) -> usize {
        self.ctx.pump()
    }

    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.ctx.wait_idle(timeout)
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&GridState) -> R) -> R {
        f(self.store.borrow().state())
    }

    pub fn diff(&self) -> ChangeSet {
        self.with_state(|s| s.model.diff())
    }

    pub fn last_error(&self) -> Option<GridError> {
        self.with_state(|s| s.last_error.clone())
    }

    pub fn is_busy(&self) -> bool {
        self.with_state(GridState::is_busy)
    }

    pub fn export_rows(&self) -> Vec<Vec<String>> {
        self.with_state(|s| s.model.export_rows(self.export.include_hidden))
    }
}

#[derive(Clone)]
struct EffectRunner {
    ctx: Weak<InteractiveContext>,
    store: Weak<RefCell<Store>>,
    source: Arc<dyn PageSource>,
    sink: Arc<dyn ChangeSink>,
}

impl EffectRunner {
    fn run_all(&self, effects: Vec<Effect>) -> Vec<TaskHandle> {
        effects.into_iter().filter_map(|e| self.run(e)).collect()
    }

    fn run(&self, effect: Effect) -> Option<TaskHandle> {
        let ctx = self.ctx.upgrade()?;
        let handle = match effect {
            Effect::FetchPage(page) => {
                let source = Arc::clone(&self.source);
                let loaded = self.clone();
                let failed = self.clone();
                self.lifecycle(AsyncTask::new("fetch_page", move || source.fetch(page)))
                    .on_success(move |data: &PageData| {
                        loaded.feed(Action::PageLoaded {
                            page,
                            data: data.clone(),
                        })
                    })
                    .on_failure(move |err| failed.feed(Action::FetchFailed(err.to_string())))
                    .start(&ctx)
            }
            Effect::SubmitChanges(changes) => {
                let sink = Arc::clone(&self.sink);
                let saved = self.clone();
                let failed = self.clone();
                self.lifecycle(AsyncTask::new("submit_changes", move || {
                    sink.submit(&changes)
                }))
                .on_success(move |_: &()| saved.feed(Action::SaveSucceeded))
                .on_failure(move |err| failed.feed(Action::SaveFailed(err.to_string())))
                .start(&ctx)
            }
        };
        Some(handle)
    }

    /// Disable the view for the lifetime of `task`.
    fn lifecycle<T: Send + 'static>(&self, task: AsyncTask<T>) -> AsyncTask<T> {
        let started = self.clone();
        let finished = self.clone();
        task.on_started(move || started.feed(Action::TaskStarted))
            .on_finished(move || finished.feed(Action::TaskFinished))
    }

    fn feed(&self, action: Action) {
        let Some(store) = self.store.upgrade() else {
            return;
        };
        let dispatched = store.borrow_mut().dispatch(action);
        match dispatched {
            Ok(result) => {
                self.run_all(result.effects);
            }
            Err(err) => tracing::warn!(error = %err, "lifecycle action rejected"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/session.rs"]
mod tests;
