// SPDX-License-Identifier: MIT
//! View controllers and the root container.
//!
//! The application is a single event loop: user intents call methods on
//! [`App`], which spawn one HTTP request each and return immediately. Every
//! response comes back through the shared channel as a [`UiEvent`] tagged
//! with the generation the issuing view had at spawn time; `App::handle`
//! applies it, and the view discards it if the generation no longer matches
//! (the view was cancelled or re-loaded in the meantime).
//!
//! All three mutating paths (create, update, delete) complete by sending a
//! single `UiEvent::MutationCompleted` — one subscription reloads the list,
//! no matter which view fired.

pub mod create;
pub mod edit;
pub mod list;
pub mod tui;

use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::client::{MutationOutcome, TaskClient};
use crate::model::TaskRecord;
use create::CreateView;
use edit::EditView;
use list::ListView;

/// Which view issued a failed request — used to route the failure back to
/// the right controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    List,
    Create,
    Edit,
}

/// Everything that can land on the application event loop.
#[derive(Debug)]
pub enum UiEvent {
    TasksLoaded {
        generation: u64,
        tasks: Vec<TaskRecord>,
    },
    TaskLoaded {
        generation: u64,
        task: TaskRecord,
    },
    CreateFinished {
        generation: u64,
        outcome: MutationOutcome,
    },
    UpdateFinished {
        generation: u64,
        outcome: MutationOutcome,
    },
    DeleteFinished {
        generation: u64,
    },
    /// Transport-level failure (network, non-2xx, undecodable body).
    RequestFailed {
        view: ViewKind,
        generation: u64,
        message: String,
    },
    /// A create, update, or delete succeeded somewhere — reload the list.
    MutationCompleted,
}

/// Root container: composes the three views and routes events between them.
pub struct App {
    client: Arc<TaskClient>,
    tx: UnboundedSender<UiEvent>,
    pub list: ListView,
    pub create: CreateView,
    pub edit: EditView,
    /// Last transport failure, surfaced as a status-line message.
    pub last_error: Option<String>,
}

impl App {
    pub fn new(client: Arc<TaskClient>, tx: UnboundedSender<UiEvent>) -> Self {
        Self {
            client,
            tx,
            list: ListView::new(),
            create: CreateView::new(),
            edit: EditView::new(),
            last_error: None,
        }
    }

    /// Convenience constructor returning the receiving half of the loop.
    pub fn with_channel(client: TaskClient) -> (Self, UnboundedReceiver<UiEvent>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Self::new(Arc::new(client), tx), rx)
    }

    // ─── User intents ─────────────────────────────────────────────────────────

    /// Fetch all tasks. Runs once at startup and again after every mutation.
    pub fn reload_list(&mut self) {
        let generation = self.list.begin_load();
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = match client.list().await {
                Ok(tasks) => UiEvent::TasksLoaded { generation, tasks },
                Err(e) => failure(ViewKind::List, generation, e),
            };
            let _ = tx.send(event);
        });
    }

    /// Route the list's select-for-edit to the edit view's loader.
    pub fn open_editor(&mut self, id: i64) {
        let generation = self.edit.begin_load();
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = match client.get_one(id).await {
                Ok(task) => UiEvent::TaskLoaded { generation, task },
                Err(e) => failure(ViewKind::Edit, generation, e),
            };
            let _ = tx.send(event);
        });
    }

    /// Submit the creation view's draft.
    pub fn submit_create(&mut self) {
        let (generation, draft) = self.create.begin_submit();
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = match client.create(&draft).await {
                Ok(outcome) => UiEvent::CreateFinished { generation, outcome },
                Err(e) => failure(ViewKind::Create, generation, e),
            };
            let _ = tx.send(event);
        });
    }

    /// Submit the edit panel's record as an update. No-op when the panel
    /// holds no saved record.
    pub fn submit_edit(&mut self) {
        let Some((generation, id, task)) = self.edit.begin_submit() else {
            return;
        };
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = match client.update(id, &task).await {
                Ok(outcome) => UiEvent::UpdateFinished { generation, outcome },
                Err(e) => failure(ViewKind::Edit, generation, e),
            };
            let _ = tx.send(event);
        });
    }

    /// Delete the record in the edit panel. Unconditional — no confirmation.
    pub fn delete_current(&mut self) {
        let Some((generation, id)) = self.edit.begin_delete() else {
            return;
        };
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = match client.delete(id).await {
                Ok(()) => UiEvent::DeleteFinished { generation },
                Err(e) => failure(ViewKind::Edit, generation, e),
            };
            let _ = tx.send(event);
        });
    }

    /// Dismiss the edit panel, discarding edits and any in-flight request.
    pub fn cancel_edit(&mut self) {
        self.edit.cancel();
    }

    // ─── Event dispatch ───────────────────────────────────────────────────────

    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::TasksLoaded { generation, tasks } => {
                if !self.list.apply_loaded(generation, tasks) {
                    debug!("discarded stale list response");
                }
            }
            UiEvent::TaskLoaded { generation, task } => {
                if !self.edit.apply_loaded(generation, task) {
                    debug!("discarded stale edit load");
                }
            }
            UiEvent::CreateFinished { generation, outcome } => {
                if self.create.apply_outcome(generation, outcome) {
                    self.mutation_completed();
                }
            }
            UiEvent::UpdateFinished { generation, outcome } => {
                if self.edit.apply_outcome(generation, outcome) {
                    self.mutation_completed();
                }
            }
            UiEvent::DeleteFinished { generation } => {
                if self.edit.apply_deleted(generation) {
                    self.mutation_completed();
                }
            }
            UiEvent::RequestFailed {
                view,
                generation,
                message,
            } => {
                let current = match view {
                    ViewKind::List => self.list.apply_failed(generation),
                    ViewKind::Create => self.create.apply_failed(generation),
                    ViewKind::Edit => self.edit.apply_failed(generation),
                };
                if current {
                    warn!(?view, %message, "request failed");
                    self.last_error = Some(message);
                }
            }
            UiEvent::MutationCompleted => self.reload_list(),
        }
    }

    /// The single reload-on-mutation path: every mutating view funnels here
    /// instead of carrying its own reload wiring.
    fn mutation_completed(&mut self) {
        self.last_error = None;
        let _ = self.tx.send(UiEvent::MutationCompleted);
    }
}

fn failure(view: ViewKind, generation: u64, err: crate::client::ClientError) -> UiEvent {
    UiEvent::RequestFailed {
        view,
        generation,
        message: err.to_string(),
    }
}
