use tui_textarea::{Input, TextArea};

use crate::editor::{textarea_from, textarea_text};
use crate::task::{Task, TaskId};

/// Note editing state for the details pane.
///
/// The draft is a local buffer; the store only sees it on `take_draft`.
pub struct NoteEditor {
    task_id: Option<TaskId>,
    editing: bool,
    draft: TextArea<'static>,
}

impl NoteEditor {
    pub fn new() -> Self {
        Self {
            task_id: None,
            editing: false,
            draft: textarea_from(""),
        }
    }

    pub fn task_id(&self) -> Option<&TaskId> {
        self.task_id.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn draft(&self) -> &TextArea<'static> {
        &self.draft
    }

    /// Follow the displayed task. A different id drops any unsaved edit and
    /// reseeds the draft; returns true when that happened.
    pub fn sync(&mut self, shown: Option<&Task>) -> bool {
        let shown_id = shown.map(|t| &t.id);
        if shown_id == self.task_id.as_ref() {
            return false;
        }
        self.task_id = shown_id.cloned();
        self.editing = false;
        self.draft = textarea_from(shown.and_then(|t| t.notes.as_deref()).unwrap_or(""));
        true
    }

    pub fn begin(&mut self, committed: Option<&str>) {
        if self.task_id.is_none() {
            return;
        }
        self.draft = textarea_from(committed.unwrap_or(""));
        self.editing = true;
    }

    pub fn cancel(&mut self) {
        self.editing = false;
    }

    pub fn handle_input(&mut self, input: Input) {
        if self.editing {
            self.draft.input(input);
        }
    }

    /// Leave edit mode and hand back the text to commit.
    pub fn take_draft(&mut self) -> Option<(TaskId, String)> {
        if !self.editing {
            return None;
        }
        self.editing = false;
        let id = self.task_id.clone()?;
        Some((id, textarea_text(&self.draft)))
    }
}

impl Default for NoteEditor {
    fn default() -> Self {
        Self::new()
    }
}
