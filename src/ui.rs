// ============================================================================
// RENDERING - navbar, task list pane, details/form pane, footer, popups
// ============================================================================

use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};
use tui_textarea::TextArea;

use crate::app::{App, DELETE_PROMPT, Focus, ViewModel};
use crate::datetime::format_timestamp;
use crate::filter::Filter;
use crate::form::{FormField, TaskForm};
use crate::task::{TITLE_MAX_CHARS, Task, TaskId};
use crate::theme::Palette;

const ROW_ACTIONS: &str = " edit  del";

/// Clickable regions recorded during the last draw.
#[derive(Debug, Clone, Default)]
pub struct ClickAreas {
    pub search_box: Rect,
    pub filter_btns: Vec<(Filter, Rect)>,
    pub theme_btn: Rect,
    pub add_btn: Rect,
    pub rows: Vec<RowArea>,
    pub note_btn: Rect,
    pub edit_task_btn: Rect,
    pub note_save_btn: Rect,
    pub note_cancel_btn: Rect,
    pub form_fields: Vec<(FormField, Rect)>,
    pub form_submit_btn: Rect,
    pub form_cancel_btn: Rect,
    pub confirm_yes_btn: Rect,
    pub confirm_no_btn: Rect,
    pub alert_ok_btn: Rect,
}

/// One task row: the whole line plus its inline controls.
#[derive(Debug, Clone)]
pub struct RowArea {
    pub id: TaskId,
    pub row: Rect,
    pub toggle: Rect,
    pub edit: Rect,
    pub delete: Rect,
}

pub fn draw(frame: &mut Frame, app: &mut App, now: DateTime<Local>) {
    let mut areas = ClickAreas::default();
    draw_screen(frame, app, now, &mut areas);
    app.areas = areas;
}

fn draw_screen(frame: &mut Frame, app: &App, now: DateTime<Local>, areas: &mut ClickAreas) {
    let palette = app.theme().palette();
    let size = frame.size();
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
        size,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(size);

    draw_navbar(frame, app, &palette, chunks[0], areas);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    let view = app.view(now);
    draw_task_list(frame, &view, &palette, body[0], areas);

    if let Some(form) = app.form() {
        draw_form(frame, form, &palette, body[1], areas);
    } else if let Some(task) = view.selected {
        draw_task_details(frame, app, task, now, &palette, body[1], areas);
    } else {
        let empty = Paragraph::new("Select a task to view details.")
            .block(Block::default().title("Details").borders(Borders::ALL))
            .style(Style::default().fg(palette.muted))
            .wrap(Wrap { trim: false });
        frame.render_widget(empty, body[1]);
    }

    draw_footer(frame, app, &palette, chunks[2]);

    if let Some(id) = app.pending_delete() {
        let title = app.store().get(id).map(|t| t.title.as_str()).unwrap_or("");
        draw_confirm_popup(frame, title, &palette, areas);
    }

    if let Some(message) = app.alert() {
        draw_alert_popup(frame, message, &palette, areas);
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Get centered popup area for overlays
fn get_popup_area(frame_width: u16, frame_height: u16, width_percent: u16, height_percent: u16) -> Rect {
    let width = frame_width.saturating_mul(width_percent) / 100;
    let height = frame_height.saturating_mul(height_percent) / 100;
    let x = (frame_width.saturating_sub(width)) / 2;
    let y = (frame_height.saturating_sub(height)) / 2;
    Rect { x, y, width, height }
}

// Helper: Render button with a style
fn render_button(frame: &mut Frame, text: &str, area: Rect, style: Style) {
    let btn = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .style(style);
    frame.render_widget(btn, area);
}

// Helper: Split a rectangular area into N equal horizontal chunks
fn split_equal_horizontal(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let pct = 100 / count.max(1) as u16;
    let constraints = vec![Constraint::Percentage(pct); count];
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area)
        .to_vec()
}

fn field_block<'a>(title: String, focused: bool, palette: &Palette) -> Block<'a> {
    let border = if focused {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.muted)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border)
}

fn textarea_lines_with_cursor(
    textarea: &TextArea<'_>,
    height: u16,
    focused: bool,
    palette: &Palette,
) -> Vec<Line<'static>> {
    let (cursor_row, cursor_col) = textarea.cursor();
    let text_lines = textarea.lines();
    let mut lines = Vec::with_capacity(text_lines.len());

    for (idx, line) in text_lines.iter().enumerate() {
        if focused && idx == cursor_row {
            let char_col = cursor_col.min(line.chars().count());
            let mut new_line = String::new();
            for (i, c) in line.chars().enumerate() {
                if i == char_col {
                    new_line.push('|');
                }
                new_line.push(c);
            }
            if char_col == line.chars().count() {
                new_line.push('|');
            }
            lines.push(Line::from(Span::styled(
                new_line,
                Style::default().fg(palette.warning),
            )));
        } else {
            lines.push(Line::from(line.clone()));
        }
    }

    let view_height = height.max(1) as usize;
    if lines.len() > view_height {
        let start = cursor_row.saturating_sub(view_height.saturating_sub(1));
        let end = (start + view_height).min(lines.len());
        lines[start..end].to_vec()
    } else {
        lines
    }
}

fn render_textarea_editor(
    frame: &mut Frame,
    textarea: &TextArea<'_>,
    area: Rect,
    title: String,
    focused: bool,
    palette: &Palette,
) {
    let inner_height = area.height.saturating_sub(2); // account for borders
    let lines_display = textarea_lines_with_cursor(textarea, inner_height, focused, palette);
    let panel = Paragraph::new(lines_display)
        .block(field_block(title, focused, palette))
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

// ============================================================================
// NAVBAR
// ============================================================================

fn draw_navbar(frame: &mut Frame, app: &App, palette: &Palette, area: Rect, areas: &mut ClickAreas) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12),
            Constraint::Min(20),
            Constraint::Length(7),
            Constraint::Length(12),
            Constraint::Length(13),
            Constraint::Length(9),
        ])
        .split(area);

    let brand = Paragraph::new("TODO App")
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD));
    frame.render_widget(brand, chunks[0]);

    let searching = app.focus() == Focus::Search;
    let search_line = if app.search().is_empty() && !searching {
        Line::from(Span::styled("Search to-dos...", Style::default().fg(palette.muted)))
    } else if searching {
        Line::from(format!("{}|", app.search()))
    } else {
        Line::from(app.search().to_string())
    };
    let search = Paragraph::new(search_line).block(field_block("Search (/)".to_string(), searching, palette));
    frame.render_widget(search, chunks[1]);
    areas.search_box = chunks[1];

    for (filter, rect) in Filter::ALL.into_iter().zip(chunks[2..5].iter().copied()) {
        let style = if app.filter() == filter {
            Style::default()
                .bg(palette.accent)
                .fg(palette.selected_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.fg)
        };
        render_button(frame, filter.label(), rect, style);
        areas.filter_btns.push((filter, rect));
    }

    render_button(
        frame,
        app.theme().toggle_label(),
        chunks[5],
        Style::default().fg(palette.warning),
    );
    areas.theme_btn = chunks[5];
}

// ============================================================================
// TASK LIST
// ============================================================================

fn draw_task_list(frame: &mut Frame, view: &ViewModel<'_>, palette: &Palette, area: Rect, areas: &mut ClickAreas) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(14)])
        .split(chunks[0]);

    let heading = Paragraph::new("Your Tasks")
        .block(Block::default().borders(Borders::BOTTOM))
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(heading, header[0]);
    render_button(frame, "+ Add Task", header[1], Style::default().fg(palette.success));
    areas.add_btn = header[1];

    let block = Block::default()
        .title(format!("Tasks ({})", view.visible.len()))
        .borders(Borders::ALL);
    let inner = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);

    if view.is_empty() {
        let empty = Paragraph::new("No tasks found.")
            .style(Style::default().fg(palette.muted).italic());
        frame.render_widget(empty, inner);
        return;
    }

    let height = inner.height as usize;
    if height == 0 {
        return;
    }
    let selected_pos = view
        .selected
        .and_then(|sel| view.visible.iter().position(|t| t.id == sel.id))
        .unwrap_or(0);
    let start = (selected_pos + 1).saturating_sub(height);

    for (offset, task) in view.visible.iter().skip(start).take(height).enumerate() {
        let is_selected = view.selected.is_some_and(|sel| sel.id == task.id);
        let row = Rect {
            x: inner.x,
            y: inner.y + offset as u16,
            width: inner.width,
            height: 1,
        };

        let style = if is_selected {
            Style::default().bg(palette.selected_bg).fg(palette.selected_fg)
        } else if task.completed {
            Style::default().fg(palette.completed)
        } else {
            Style::default()
        };

        let with_actions = row.width as usize >= ROW_ACTIONS.len() + 12;
        let line = build_row_line(task, row.width as usize, with_actions, palette, is_selected);
        frame.render_widget(Paragraph::new(line).style(style), row);

        let mut row_area = RowArea {
            id: task.id.clone(),
            row,
            toggle: Rect { width: row.width.min(3), ..row },
            edit: Rect::default(),
            delete: Rect::default(),
        };
        if with_actions {
            let right = row.x + row.width;
            row_area.edit = Rect { x: right - 9, width: 4, ..row };
            row_area.delete = Rect { x: right - 3, width: 3, ..row };
        }
        areas.rows.push(row_area);
    }
}

// Helper: "[x] Title (reminder) ....... edit  del", padded to the row width
fn build_row_line(task: &Task, width: usize, with_actions: bool, palette: &Palette, selected: bool) -> Line<'static> {
    let checkbox = if task.completed { "[x] " } else { "[ ] " };
    let marker = if task.reminder.is_some() { " (reminder)" } else { "" };
    let actions_len = if with_actions { ROW_ACTIONS.len() } else { 0 };
    let room = width.saturating_sub(checkbox.len() + marker.len() + actions_len);

    let title: String = task.title.chars().take(room).collect();
    let padding = " ".repeat(room.saturating_sub(title.chars().count()));

    let mut spans = vec![Span::raw(checkbox), Span::raw(title)];
    if task.completed {
        spans[1].style = Style::default().add_modifier(Modifier::CROSSED_OUT);
    }
    if !marker.is_empty() {
        let marker_style = if selected {
            Style::default()
        } else {
            Style::default().fg(palette.warning)
        };
        spans.push(Span::styled(marker, marker_style));
    }
    spans.push(Span::raw(padding));
    if with_actions {
        let action_style = if selected {
            Style::default()
        } else {
            Style::default().fg(palette.muted)
        };
        spans.push(Span::styled(ROW_ACTIONS, action_style));
    }
    Line::from(spans)
}

// ============================================================================
// DETAILS
// ============================================================================

fn draw_task_details(
    frame: &mut Frame,
    app: &App,
    task: &Task,
    now: DateTime<Local>,
    palette: &Palette,
    area: Rect,
    areas: &mut ClickAreas,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    let mut heading = vec![Span::styled(
        task.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if task.completed {
        heading.push(Span::styled(" [done]", Style::default().fg(palette.success)));
    }
    let reminder = task
        .reminder
        .as_deref()
        .map(|r| format_timestamp(r, now))
        .unwrap_or_else(|| "None".to_string());

    let mut lines = vec![
        Line::from(heading),
        Line::from(""),
        Line::from(vec![Span::styled("Reminder: ", Style::default().bold()), Span::raw(reminder)]),
        Line::from(vec![
            Span::styled("Created: ", Style::default().bold()),
            Span::raw(format_timestamp(&task.created_at, now)),
        ]),
        Line::from(""),
        Line::from(Span::styled("Notes:", Style::default().bold())),
    ];

    let editing = app.is_note_editing();
    let block = Block::default()
        .title("Task Details")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    if editing {
        let inner = block.inner(chunks[0]);
        frame.render_widget(block, chunks[0]);
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(lines.len() as u16), Constraint::Min(3)])
            .split(inner);
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), parts[0]);
        render_textarea_editor(
            frame,
            app.details().draft(),
            parts[1],
            "Editing Notes (Ctrl+S to save, Esc to cancel)".to_string(),
            true,
            palette,
        );
    } else {
        match task.notes.as_deref() {
            Some(notes) => lines.extend(notes.lines().map(|l| Line::from(l.to_string()))),
            None => lines.push(Line::from(Span::styled(
                "No notes.",
                Style::default().fg(palette.muted).italic(),
            ))),
        }
        let details_panel = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
        frame.render_widget(details_panel, chunks[0]);
    }

    let btn_chunks = split_equal_horizontal(chunks[1], 2);
    if editing {
        render_button(frame, "Save", btn_chunks[0], Style::default().fg(palette.success));
        render_button(frame, "Cancel", btn_chunks[1], Style::default().fg(palette.danger));
        areas.note_save_btn = btn_chunks[0];
        areas.note_cancel_btn = btn_chunks[1];
    } else {
        let note_label = if task.notes.is_some() { "Edit Note" } else { "Add Note" };
        render_button(frame, note_label, btn_chunks[0], Style::default().fg(palette.accent));
        render_button(frame, "Edit Task", btn_chunks[1], Style::default().fg(palette.warning));
        areas.note_btn = btn_chunks[0];
        areas.edit_task_btn = btn_chunks[1];
    }
}

// ============================================================================
// FORM
// ============================================================================

fn draw_form(frame: &mut Frame, form: &TaskForm, palette: &Palette, area: Rect, areas: &mut ClickAreas) {
    let block = Block::default()
        .title(form.heading())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(inner);

    let focus = form.focus();

    let title_focused = focus == FormField::Title;
    let title_label = format!("Title* ({}/{})", form.title().chars().count(), TITLE_MAX_CHARS);
    let title_text = if title_focused {
        format!("{}|", form.title())
    } else {
        form.title().to_string()
    };
    frame.render_widget(
        Paragraph::new(title_text).block(field_block(title_label, title_focused, palette)),
        chunks[0],
    );

    let reminder_focused = focus == FormField::Reminder;
    let reminder_text = if reminder_focused {
        format!("{}|", form.reminder())
    } else {
        form.reminder().to_string()
    };
    frame.render_widget(
        Paragraph::new(reminder_text).block(field_block(
            "Reminder (YYYY-MM-DD HH:MM, optional)".to_string(),
            reminder_focused,
            palette,
        )),
        chunks[1],
    );

    render_textarea_editor(
        frame,
        form.notes(),
        chunks[2],
        "Notes".to_string(),
        focus == FormField::Notes,
        palette,
    );

    areas.form_fields = vec![
        (FormField::Title, chunks[0]),
        (FormField::Reminder, chunks[1]),
        (FormField::Notes, chunks[2]),
    ];

    let btn_chunks = split_equal_horizontal(chunks[3], 2);
    render_button(frame, form.submit_label(), btn_chunks[0], Style::default().fg(palette.success));
    render_button(frame, "Cancel", btn_chunks[1], Style::default().fg(palette.danger));
    areas.form_submit_btn = btn_chunks[0];
    areas.form_cancel_btn = btn_chunks[1];
}

// ============================================================================
// FOOTER & POPUPS
// ============================================================================

fn draw_footer(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let hints = if app.form().is_some() {
        "Tab: next field | Enter/Ctrl+S: save | Esc: cancel"
    } else if app.is_note_editing() {
        "Ctrl+S: save note | Esc: cancel"
    } else if app.focus() == Focus::Search {
        "Type to search | Enter/Esc: done"
    } else {
        "a: add | e: edit | space: done | d: delete | o: note | /: search | 1-3: filter | t: theme | q: quit"
    };
    let footer = Paragraph::new(format!("{hints}  ::  Minimal Task Manager"))
        .style(Style::default().fg(palette.muted));
    frame.render_widget(footer, area);
}

fn draw_confirm_popup(frame: &mut Frame, title: &str, palette: &Palette, areas: &mut ClickAreas) {
    let size = frame.size();
    let area = get_popup_area(size.width, size.height, 50, 30);

    let block = Block::default()
        .title("[?] Confirm")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(palette.danger).bg(palette.bg));

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(3)])
        .split(inner);

    let text = vec![
        Line::from(DELETE_PROMPT),
        Line::from(Span::styled(title.to_string(), Style::default().fg(palette.fg).bold())),
    ];
    let para = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .style(Style::default().fg(palette.fg));
    frame.render_widget(para, chunks[0]);

    let btn_chunks = split_equal_horizontal(chunks[1], 2);
    render_button(frame, "Yes (y)", btn_chunks[0], Style::default().fg(palette.danger));
    render_button(frame, "No (n)", btn_chunks[1], Style::default().fg(palette.fg));
    areas.confirm_yes_btn = btn_chunks[0];
    areas.confirm_no_btn = btn_chunks[1];
}

fn draw_alert_popup(frame: &mut Frame, message: &str, palette: &Palette, areas: &mut ClickAreas) {
    let size = frame.size();
    let area = get_popup_area(size.width, size.height, 60, 30);

    let block = Block::default()
        .title("[!] Alert")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(palette.danger).bg(palette.bg));

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(3)])
        .split(inner);

    let para = Paragraph::new(message)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .style(Style::default().fg(palette.fg));
    frame.render_widget(para, chunks[0]);

    let ok = split_equal_horizontal(chunks[1], 3)[1];
    render_button(frame, "OK (Esc)", ok, Style::default().fg(palette.fg).italic());
    areas.alert_ok_btn = ok;
}
