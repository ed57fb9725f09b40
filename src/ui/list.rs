// SPDX-License-Identifier: MIT
// List view controller: holds whatever the server returned on the most
// recent fetch, plus a selection cursor for the terminal front-end.

use crate::model::TaskRecord;

#[derive(Debug, Default)]
pub struct ListView {
    pub tasks: Vec<TaskRecord>,
    /// Cursor into `tasks` (terminal front-end concern only).
    pub selected: usize,
    pub loading: bool,
    generation: u64,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a reload. Returns the generation the response must carry back.
    /// Bumping the generation makes any still-in-flight fetch stale.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.generation
    }

    /// Replace the list wholesale. A stale response (generation mismatch)
    /// is discarded and `false` returned.
    pub fn apply_loaded(&mut self, generation: u64, tasks: Vec<TaskRecord>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        self.tasks = tasks;
        if self.selected >= self.tasks.len() {
            self.selected = self.tasks.len().saturating_sub(1);
        }
        true
    }

    pub fn apply_failed(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        true
    }

    /// Identifier of the task under the cursor, if any.
    pub fn selected_id(&self) -> Option<i64> {
        self.tasks.get(self.selected).and_then(TaskRecord::id)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.tasks.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}
