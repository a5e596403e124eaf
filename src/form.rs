use thiserror::Error;
use tui_textarea::{Input, Key, TextArea};

use crate::datetime::parse_timestamp;
use crate::editor::{textarea_from, textarea_text};
use crate::task::{REMINDER_FORMAT, TITLE_MAX_CHARS, Task, TaskFields, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Title cannot be empty.")]
    EmptyTitle,
    #[error("Reminder \"{0}\" is not a date and time. Use YYYY-MM-DD HH:MM.")]
    InvalidReminder(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Reminder,
    Notes,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Reminder,
            FormField::Reminder => FormField::Notes,
            FormField::Notes => FormField::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Title => FormField::Notes,
            FormField::Reminder => FormField::Title,
            FormField::Notes => FormField::Reminder,
        }
    }
}

/// Create/edit form. Holds nothing between openings except what `initial` seeds.
pub struct TaskForm {
    initial: Option<Task>,
    title: String,
    reminder: String,
    notes: TextArea<'static>,
    focus: FormField,
}

impl TaskForm {
    pub fn new() -> Self {
        Self {
            initial: None,
            title: String::new(),
            reminder: String::new(),
            notes: textarea_from(""),
            focus: FormField::Title,
        }
    }

    pub fn edit(task: &Task) -> Self {
        Self {
            initial: Some(task.clone()),
            title: task.title.clone(),
            reminder: task.reminder.clone().unwrap_or_default(),
            notes: textarea_from(task.notes.as_deref().unwrap_or("")),
            focus: FormField::Title,
        }
    }

    pub fn editing_id(&self) -> Option<TaskId> {
        self.initial.as_ref().map(|t| t.id.clone())
    }

    pub fn heading(&self) -> &'static str {
        if self.initial.is_some() { "Edit Task" } else { "Add a New Task" }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.initial.is_some() { "Save Changes" } else { "Add Task" }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn reminder(&self) -> &str {
        &self.reminder
    }

    pub fn notes(&self) -> &TextArea<'static> {
        &self.notes
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn set_focus(&mut self, field: FormField) {
        self.focus = field;
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Replace the title; anything past the length cap is dropped.
    pub fn set_title(&mut self, title: &str) {
        self.title = title.chars().take(TITLE_MAX_CHARS).collect();
    }

    pub fn set_reminder(&mut self, reminder: &str) {
        self.reminder = reminder.to_string();
    }

    #[cfg(test)]
    pub(crate) fn set_notes(&mut self, notes: &str) {
        self.notes = textarea_from(notes);
    }

    /// Feed a key to the focused field.
    pub fn handle_input(&mut self, input: Input) {
        match self.focus {
            FormField::Notes => {
                self.notes.input(input);
            }
            FormField::Title => {
                if edit_line(&mut self.title, input) && self.title.chars().count() > TITLE_MAX_CHARS {
                    self.title = self.title.chars().take(TITLE_MAX_CHARS).collect();
                }
            }
            FormField::Reminder => {
                edit_line(&mut self.reminder, input);
            }
        }
    }

    /// Validate and produce the values to save. On error nothing is cleared.
    pub fn submit(&self) -> Result<TaskFields, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::EmptyTitle);
        }
        let reminder = normalize_reminder(&self.reminder)?;
        let notes = textarea_text(&self.notes).trim().to_string();

        Ok(TaskFields {
            title: title.to_string(),
            notes: (!notes.is_empty()).then_some(notes),
            reminder,
            completed: self.initial.as_ref().is_some_and(|t| t.completed),
        })
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

// Helper: single-line append/backspace editing, true when the buffer changed
fn edit_line(buffer: &mut String, input: Input) -> bool {
    match input.key {
        Key::Char(c) if !input.ctrl && !input.alt => {
            buffer.push(c);
            true
        }
        Key::Backspace => buffer.pop().is_some(),
        _ => false,
    }
}

fn normalize_reminder(raw: &str) -> Result<Option<String>, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    // Anything a stored task may hold is accepted, so editing never trips over it
    parse_timestamp(raw)
        .map(|at| Some(at.format(REMINDER_FORMAT).to_string()))
        .ok_or_else(|| FormError::InvalidReminder(raw.to_string()))
}
