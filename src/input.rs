// ============================================================================
// EVENT HANDLING - keyboard and mouse intents, dispatched to App operations
// ============================================================================

use anyhow::Result;
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, Focus};
use crate::editor::key_to_input;
use crate::filter::Filter;
use crate::form::FormField;

/// Handle one key press. Returns `Ok(true)` when the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent, now: DateTime<Local>) -> Result<bool> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }

    // Delete confirmation blocks everything else
    if app.pending_delete().is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.confirm_delete(false),
            _ => {}
        }
        return Ok(false);
    }

    // Esc/Enter: Dismiss alert popup
    if app.alert().is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            app.dismiss_alert();
        }
        return Ok(false);
    }

    if app.form().is_some() {
        handle_form_key(app, key, now);
        return Ok(false);
    }

    if app.is_note_editing() {
        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            app.save_note();
        } else if key.code == KeyCode::Esc {
            app.cancel_note_edit();
        } else {
            app.note_input(key_to_input(key));
        }
        return Ok(false);
    }

    if app.focus() == Focus::Search {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Tab => app.set_focus(Focus::List),
            KeyCode::Backspace => app.pop_search_char(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.push_search_char(c)
            }
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Char('/') => app.set_focus(Focus::Search),
        KeyCode::Char('1') => app.set_filter(Filter::All),
        KeyCode::Char('2') => app.set_filter(Filter::Upcoming),
        KeyCode::Char('3') => app.set_filter(Filter::Completed),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1, now),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1, now),
        KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_displayed(now),
        KeyCode::Char('e') | KeyCode::Enter => app.edit_displayed(now),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_displayed(now),
        KeyCode::Char('a') | KeyCode::Char('n') => app.open_new_form(),
        KeyCode::Char('o') => app.begin_note_edit(now),
        KeyCode::Char('t') => app.toggle_theme(),
        _ => {}
    }

    Ok(false)
}

fn handle_form_key(app: &mut App, key: KeyEvent, now: DateTime<Local>) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let on_notes = app.form().is_some_and(|f| f.focus() == FormField::Notes);

    match key.code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Char('s') if ctrl => app.submit_form(now),
        KeyCode::Enter if !on_notes => app.submit_form(now),
        KeyCode::Tab => {
            if let Some(form) = app.form_mut() {
                form.focus_next();
            }
        }
        KeyCode::BackTab => {
            if let Some(form) = app.form_mut() {
                form.focus_prev();
            }
        }
        _ => app.form_input(key_to_input(key)),
    }
}

fn inside_rect(mouse: MouseEvent, rect: Rect) -> bool {
    mouse.column >= rect.x
        && mouse.column < rect.x + rect.width
        && mouse.row >= rect.y
        && mouse.row < rect.y + rect.height
}

pub fn handle_mouse(app: &mut App, mouse: MouseEvent, now: DateTime<Local>) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => handle_mouse_left(app, mouse, now),
        MouseEventKind::Down(MouseButton::Middle) => {
            if let Some(id) = clicked_row(app, mouse) {
                if app.pending_delete().is_none() && app.alert().is_none() {
                    app.toggle_completed(&id);
                }
            }
        }
        MouseEventKind::Down(MouseButton::Right) => {
            if let Some(id) = clicked_row(app, mouse) {
                if app.pending_delete().is_none() && app.alert().is_none() {
                    app.request_delete(&id);
                }
            }
        }
        MouseEventKind::ScrollUp if no_modal(app) => app.move_selection(-1, now),
        MouseEventKind::ScrollDown if no_modal(app) => app.move_selection(1, now),
        _ => {}
    }
}

fn no_modal(app: &App) -> bool {
    app.pending_delete().is_none()
        && app.alert().is_none()
        && app.form().is_none()
        && !app.is_note_editing()
}

fn clicked_row(app: &App, mouse: MouseEvent) -> Option<String> {
    app.areas
        .rows
        .iter()
        .find(|r| inside_rect(mouse, r.row))
        .map(|r| r.id.clone())
}

fn handle_mouse_left(app: &mut App, mouse: MouseEvent, now: DateTime<Local>) {
    let areas = app.areas.clone();

    if app.pending_delete().is_some() {
        if inside_rect(mouse, areas.confirm_yes_btn) {
            app.confirm_delete(true);
        } else if inside_rect(mouse, areas.confirm_no_btn) {
            app.confirm_delete(false);
        }
        return;
    }

    if app.alert().is_some() {
        if inside_rect(mouse, areas.alert_ok_btn) {
            app.dismiss_alert();
        }
        return;
    }

    // Navbar
    if inside_rect(mouse, areas.search_box) {
        app.set_focus(Focus::Search);
        return;
    }
    app.set_focus(Focus::List);

    for (filter, rect) in &areas.filter_btns {
        if inside_rect(mouse, *rect) {
            app.set_filter(*filter);
            return;
        }
    }
    if inside_rect(mouse, areas.theme_btn) {
        app.toggle_theme();
        return;
    }
    if inside_rect(mouse, areas.add_btn) {
        app.open_new_form();
        return;
    }

    // Task rows: inline controls first, then the row itself
    for row in &areas.rows {
        if inside_rect(mouse, row.toggle) {
            app.toggle_completed(&row.id);
            return;
        }
        if inside_rect(mouse, row.edit) {
            app.open_edit_form(&row.id);
            return;
        }
        if inside_rect(mouse, row.delete) {
            app.request_delete(&row.id);
            return;
        }
        if inside_rect(mouse, row.row) {
            app.select(&row.id);
            return;
        }
    }

    // Form pane
    if app.form().is_some() {
        if inside_rect(mouse, areas.form_submit_btn) {
            app.submit_form(now);
        } else if inside_rect(mouse, areas.form_cancel_btn) {
            app.cancel_form();
        } else if let Some((field, _)) = areas.form_fields.iter().find(|(_, r)| inside_rect(mouse, *r)) {
            if let Some(form) = app.form_mut() {
                form.set_focus(*field);
            }
        }
        return;
    }

    // Details pane
    if app.is_note_editing() {
        if inside_rect(mouse, areas.note_save_btn) {
            app.save_note();
        } else if inside_rect(mouse, areas.note_cancel_btn) {
            app.cancel_note_edit();
        }
        return;
    }
    if inside_rect(mouse, areas.note_btn) {
        app.begin_note_edit(now);
    } else if inside_rect(mouse, areas.edit_task_btn) {
        app.edit_displayed(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::store::TaskStore;
    use chrono::TimeZone;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE), noon()).unwrap()
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn app() -> App {
        App::new(TaskStore::load(Box::new(MemoryStore::new())))
    }

    fn click(app: &mut App, rect: Rect) {
        let mouse = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: rect.x,
            row: rect.y,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(app, mouse, noon());
    }

    #[test]
    fn add_toggle_and_delete_by_keyboard() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "Buy milk");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store().len(), 1);
        assert!(app.form().is_none());

        press(&mut app, KeyCode::Char(' '));
        assert!(app.store().tasks()[0].completed);

        press(&mut app, KeyCode::Char('d'));
        assert!(app.pending_delete().is_some());
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.store().len(), 1, "modal swallows other keys");
        press(&mut app, KeyCode::Char('y'));
        assert!(app.store().is_empty());
    }

    #[test]
    fn search_mode_captures_typing_until_escape() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "qa");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.search(), "q");
        assert!(!press(&mut app, KeyCode::Esc));
        assert_eq!(app.focus(), Focus::List);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn empty_title_alert_blocks_until_dismissed() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);
        assert!(app.alert().is_some());

        press(&mut app, KeyCode::Char('z'));
        assert_eq!(app.form().unwrap().title(), "");
        press(&mut app, KeyCode::Esc);
        assert!(app.alert().is_none());
        assert!(app.form().is_some());
    }

    #[test]
    fn note_edit_saves_with_ctrl_s() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "x");
        press(&mut app, KeyCode::Enter);
        app.sync_details(noon());

        press(&mut app, KeyCode::Char('o'));
        type_str(&mut app, "note");
        let save = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        handle_key(&mut app, save, noon()).unwrap();

        assert_eq!(app.store().tasks()[0].notes.as_deref(), Some("note"));
    }

    #[test]
    fn clicks_use_recorded_areas() {
        let mut app = app();
        let add = Rect::new(0, 0, 10, 3);
        app.areas.add_btn = add;
        click(&mut app, add);
        assert!(app.form().is_some());

        let cancel = Rect::new(20, 20, 5, 3);
        app.areas.form_cancel_btn = cancel;
        click(&mut app, cancel);
        assert!(app.form().is_none());
    }
}
