use anyhow::Result;
use chrono::{DateTime, Local};
use tracing::{debug, info};
use tui_textarea::Input;

use crate::details::NoteEditor;
use crate::filter::{Filter, resolve_selection, visible_tasks};
use crate::form::TaskForm;
use crate::store::TaskStore;
use crate::task::{Task, TaskId};
use crate::theme::Theme;
use crate::ui::ClickAreas;

pub const DELETE_PROMPT: &str = "Delete this to-do item permanently?";

/// Where plain typing goes when no form, note edit or popup has it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    List,
    Search,
}

/// Notification sent to subscribers after every state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    TasksChanged,
    SearchChanged(String),
    FilterChanged(Filter),
    FocusChanged(Focus),
    Selected(TaskId),
    FormOpened { editing: Option<TaskId> },
    FormClosed,
    DeleteRequested(TaskId),
    DeleteResolved { id: TaskId, accepted: bool },
    NoteEditing(bool),
    DetailsReset(Option<TaskId>),
    ThemeChanged(Theme),
    Alert(String),
    AlertDismissed,
}

pub type Observer = Box<dyn FnMut(&Change)>;

/// Derived, read-only picture of what the screen shows.
pub struct ViewModel<'a> {
    pub visible: Vec<&'a Task>,
    pub selected: Option<&'a Task>,
}

impl ViewModel<'_> {
    /// True when the list pane should say "No tasks found."
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}

/// The single owned application state: the store plus all UI state.
pub struct App {
    store: TaskStore,
    selected_id: Option<TaskId>,
    filter: Filter,
    search: String,
    focus: Focus,
    form: Option<TaskForm>,
    details: NoteEditor,
    theme: Theme,
    pending_delete: Option<TaskId>,
    alert: Option<String>,
    observers: Vec<Observer>,

    // UI areas for mouse support, refreshed on every draw
    pub areas: ClickAreas,
}

impl App {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store,
            selected_id: None,
            filter: Filter::All,
            search: String::new(),
            focus: Focus::List,
            form: None,
            details: NoteEditor::new(),
            theme: Theme::default(),
            pending_delete: None,
            alert: None,
            observers: Vec::new(),
            areas: ClickAreas::default(),
        }
    }

    pub fn subscribe(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    fn emit(&mut self, change: Change) {
        for observer in &mut self.observers {
            observer(&change);
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn selected_id(&self) -> Option<&TaskId> {
        self.selected_id.as_ref()
    }

    pub fn form(&self) -> Option<&TaskForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut TaskForm> {
        self.form.as_mut()
    }

    pub fn details(&self) -> &NoteEditor {
        &self.details
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn pending_delete(&self) -> Option<&TaskId> {
        self.pending_delete.as_ref()
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn is_note_editing(&self) -> bool {
        self.details.is_editing()
    }

    pub fn view(&self, now: DateTime<Local>) -> ViewModel<'_> {
        let tasks = self.store.tasks();
        let visible = visible_tasks(tasks, self.filter, &self.search, now);
        let selected = resolve_selection(tasks, &visible, self.selected_id.as_deref());
        ViewModel { visible, selected }
    }

    pub fn displayed_id(&self, now: DateTime<Local>) -> Option<TaskId> {
        self.view(now).selected.map(|t| t.id.clone())
    }

    /// Point the note editor at whatever the details pane now shows.
    pub fn sync_details(&mut self, now: DateTime<Local>) {
        let tasks = self.store.tasks();
        let visible = visible_tasks(tasks, self.filter, &self.search, now);
        let shown = resolve_selection(tasks, &visible, self.selected_id.as_deref());
        if self.details.sync(shown) {
            let id = self.details.task_id().cloned();
            self.emit(Change::DetailsReset(id));
        }
    }

    // ------------------------------------------------------------------
    // Search, filter, selection
    // ------------------------------------------------------------------

    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_string();
        self.emit(Change::SearchChanged(self.search.clone()));
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
        self.emit(Change::SearchChanged(self.search.clone()));
    }

    pub fn pop_search_char(&mut self) {
        if self.search.pop().is_some() {
            self.emit(Change::SearchChanged(self.search.clone()));
        }
    }

    pub fn set_focus(&mut self, focus: Focus) {
        if self.focus != focus {
            self.focus = focus;
            self.emit(Change::FocusChanged(focus));
        }
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.emit(Change::FilterChanged(filter));
    }

    pub fn select(&mut self, id: &str) {
        self.selected_id = Some(id.to_string());
        self.emit(Change::Selected(id.to_string()));
    }

    /// Step through the visible list. A selection that fell out of view restarts at the top.
    pub fn move_selection(&mut self, delta: isize, now: DateTime<Local>) {
        let target = {
            let view = self.view(now);
            if view.visible.is_empty() {
                return;
            }
            let current = view
                .selected
                .and_then(|sel| view.visible.iter().position(|t| t.id == sel.id));
            let idx = match current {
                Some(idx) => idx.saturating_add_signed(delta).min(view.visible.len() - 1),
                None => 0,
            };
            view.visible[idx].id.clone()
        };
        self.select(&target);
    }

    // ------------------------------------------------------------------
    // Form
    // ------------------------------------------------------------------

    pub fn open_new_form(&mut self) {
        self.form = Some(TaskForm::new());
        self.emit(Change::FormOpened { editing: None });
    }

    pub fn open_edit_form(&mut self, id: &str) {
        let Some(task) = self.store.get(id) else {
            return;
        };
        self.form = Some(TaskForm::edit(task));
        self.emit(Change::FormOpened {
            editing: Some(id.to_string()),
        });
    }

    pub fn edit_displayed(&mut self, now: DateTime<Local>) {
        if let Some(id) = self.displayed_id(now) {
            self.open_edit_form(&id);
        }
    }

    pub fn cancel_form(&mut self) {
        if self.form.take().is_some() {
            self.emit(Change::FormClosed);
        }
    }

    pub fn form_input(&mut self, input: Input) {
        if let Some(form) = self.form.as_mut() {
            form.handle_input(input);
        }
    }

    /// Validate and save the open form. A validation failure raises the alert and
    /// keeps the form open untouched.
    pub fn submit_form(&mut self, now: DateTime<Local>) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let editing = form.editing_id();
        let fields = match form.submit() {
            Ok(fields) => fields,
            Err(err) => {
                debug!(error = %err, "form rejected");
                self.show_alert(err.to_string());
                return;
            }
        };

        let result = match editing {
            Some(id) => self.store.update(&id, fields).map(|_| ()),
            None => self.store.add(fields, now).map(|id| {
                info!(id = %id, "task created");
            }),
        };
        self.form = None;
        self.emit(Change::FormClosed);
        self.after_store_change(result);
    }

    // ------------------------------------------------------------------
    // Task actions
    // ------------------------------------------------------------------

    pub fn toggle_completed(&mut self, id: &str) {
        let result = self.store.toggle_completed(id).map(|_| ());
        self.after_store_change(result);
    }

    pub fn toggle_displayed(&mut self, now: DateTime<Local>) {
        if let Some(id) = self.displayed_id(now) {
            self.toggle_completed(&id);
        }
    }

    /// Ask before deleting; nothing changes until `confirm_delete`.
    pub fn request_delete(&mut self, id: &str) {
        if !self.store.contains(id) {
            return;
        }
        self.pending_delete = Some(id.to_string());
        self.emit(Change::DeleteRequested(id.to_string()));
    }

    pub fn delete_displayed(&mut self, now: DateTime<Local>) {
        if let Some(id) = self.displayed_id(now) {
            self.request_delete(&id);
        }
    }

    pub fn confirm_delete(&mut self, accept: bool) {
        let Some(id) = self.pending_delete.take() else {
            return;
        };
        if accept {
            let result = self.store.remove(&id).map(|_| ());
            if self.selected_id.as_deref() == Some(id.as_str()) {
                self.selected_id = None;
            }
            info!(id = %id, "task deleted");
            self.after_store_change(result);
        }
        self.emit(Change::DeleteResolved { id, accepted: accept });
    }

    // ------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------

    pub fn begin_note_edit(&mut self, now: DateTime<Local>) {
        self.sync_details(now);
        let committed = self
            .details
            .task_id()
            .and_then(|id| self.store.get(id))
            .and_then(|t| t.notes.clone());
        self.details.begin(committed.as_deref());
        if self.details.is_editing() {
            self.emit(Change::NoteEditing(true));
        }
    }

    pub fn note_input(&mut self, input: Input) {
        self.details.handle_input(input);
    }

    pub fn save_note(&mut self) {
        let Some((id, text)) = self.details.take_draft() else {
            return;
        };
        self.emit(Change::NoteEditing(false));
        let result = self.store.set_note(&id, &text).map(|_| ());
        self.after_store_change(result);
    }

    pub fn cancel_note_edit(&mut self) {
        if self.details.is_editing() {
            self.details.cancel();
            self.emit(Change::NoteEditing(false));
        }
    }

    // ------------------------------------------------------------------
    // Theme and alerts
    // ------------------------------------------------------------------

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.emit(Change::ThemeChanged(self.theme));
    }

    pub fn show_alert(&mut self, message: String) {
        self.alert = Some(message.clone());
        self.emit(Change::Alert(message));
    }

    pub fn dismiss_alert(&mut self) {
        if self.alert.take().is_some() {
            self.emit(Change::AlertDismissed);
        }
    }

    fn after_store_change(&mut self, result: Result<()>) {
        self.emit(Change::TasksChanged);
        if let Err(err) = result {
            self.show_alert(format!("Could not save tasks: {err:#}"));
        }
    }
}
