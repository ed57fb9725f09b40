// SPDX-License-Identifier: MIT
// Creation view controller: a draft record plus the validation errors from
// the last rejected submit.

use crate::client::MutationOutcome;
use crate::model::{FieldErrors, TaskRecord};

#[derive(Debug, Default)]
pub struct CreateView {
    pub draft: TaskRecord,
    pub errors: FieldErrors,
    pub submitting: bool,
    generation: u64,
}

impl CreateView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a submit. Returns the generation tag and a snapshot of the
    /// draft to send; the live draft stays untouched until the server
    /// accepts it.
    pub fn begin_submit(&mut self) -> (u64, TaskRecord) {
        self.generation += 1;
        self.submitting = true;
        (self.generation, self.draft.clone())
    }

    /// Apply a mutation outcome. Returns `true` when the draft was saved
    /// (the caller then signals mutation-completed). Stale outcomes are
    /// discarded.
    pub fn apply_outcome(&mut self, generation: u64, outcome: MutationOutcome) -> bool {
        if generation != self.generation {
            return false;
        }
        self.submitting = false;
        match outcome {
            MutationOutcome::Saved(_) => {
                self.draft.clear();
                self.errors.clear();
                true
            }
            MutationOutcome::Rejected(errors) => {
                self.errors = errors;
                false
            }
        }
    }

    /// Transport failure: the draft is preserved for retry.
    pub fn apply_failed(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.submitting = false;
        true
    }
}
