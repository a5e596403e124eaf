use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_textarea::{CursorMove, Input, Key, TextArea};

/// Build a textarea holding `text`, cursor parked at the end.
///
/// Splits on `'\n'` only, so `textarea_text` gives back exactly `text`,
/// trailing newlines included.
pub fn textarea_from(text: &str) -> TextArea<'static> {
    let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    let end_row = lines.len().saturating_sub(1) as u16;
    let end_col = lines.last().map(|l| l.chars().count()).unwrap_or(0) as u16;
    let mut textarea = TextArea::new(lines);
    textarea.move_cursor(CursorMove::Jump(end_row, end_col));
    textarea
}

pub fn textarea_text(textarea: &TextArea<'_>) -> String {
    textarea.lines().join("\n")
}

// Forward crossterm keys to the textarea for normal text editing (arrow keys, etc.)
pub fn key_to_input(key: KeyEvent) -> Input {
    Input {
        key: match key.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Tab => Key::Tab,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Esc => Key::Esc,
            KeyCode::F(n) => Key::F(n),
            _ => Key::Null,
        },
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
    }
}
