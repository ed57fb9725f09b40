// SPDX-License-Identifier: MIT
// Edit view controller.
//
// The visible/hidden boolean is the one nontrivial state machine in the
// application: hidden → visible when a load resolves; visible → hidden on
// cancel, successful submit, or successful delete. Cancel and load bump the
// generation so responses from an abandoned panel state can never land.

use crate::client::MutationOutcome;
use crate::model::{FieldErrors, TaskRecord};

#[derive(Debug, Default)]
pub struct EditView {
    pub visible: bool,
    pub task: TaskRecord,
    pub errors: FieldErrors,
    pub busy: bool,
    generation: u64,
}

impl EditView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start loading a record into the panel. Any previous unsaved edits are
    /// discarded when the response arrives (no dirty-check).
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.busy = true;
        self.generation
    }

    /// Show the loaded record. Stale loads are discarded.
    pub fn apply_loaded(&mut self, generation: u64, task: TaskRecord) -> bool {
        if generation != self.generation {
            return false;
        }
        self.busy = false;
        self.task = task;
        self.errors.clear();
        self.visible = true;
        true
    }

    /// Hide the panel and discard edits. Also invalidates every in-flight
    /// request issued by this panel.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.task.clear();
        self.errors.clear();
        self.visible = false;
        self.busy = false;
    }

    /// Start submitting the current record. `None` when the panel holds no
    /// saved record (nothing to update).
    pub fn begin_submit(&mut self) -> Option<(u64, i64, TaskRecord)> {
        let id = self.task.id()?;
        self.generation += 1;
        self.busy = true;
        Some((self.generation, id, self.task.clone()))
    }

    /// Apply a submit outcome. `true` = saved (panel hidden, caller signals
    /// mutation-completed); rejected keeps the panel open with the errors.
    pub fn apply_outcome(&mut self, generation: u64, outcome: MutationOutcome) -> bool {
        if generation != self.generation {
            return false;
        }
        self.busy = false;
        match outcome {
            MutationOutcome::Saved(_) => {
                self.task.clear();
                self.errors.clear();
                self.visible = false;
                true
            }
            MutationOutcome::Rejected(errors) => {
                self.errors = errors;
                false
            }
        }
    }

    /// Start deleting the current record. No confirmation step.
    pub fn begin_delete(&mut self) -> Option<(u64, i64)> {
        let id = self.task.id()?;
        self.generation += 1;
        self.busy = true;
        Some((self.generation, id))
    }

    pub fn apply_deleted(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.busy = false;
        self.task.clear();
        self.errors.clear();
        self.visible = false;
        true
    }

    /// Transport failure: stay visible, keep edits.
    pub fn apply_failed(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.busy = false;
        true
    }
}
