/// Translation of crossterm key events into the engine's key model
use crossterm::event::{self, KeyCode, KeyEventKind, KeyModifiers};
use scene3d_core::{Key, KeyAction, KeyEvent, Modifiers};

pub fn map_key_event(event: &event::KeyEvent) -> KeyEvent {
    let key = match event.code {
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        KeyCode::Esc => Key::Escape,
        KeyCode::Char(c) => Key::Char(c.to_ascii_lowercase()),
        _ => Key::Other,
    };

    let action = match event.kind {
        KeyEventKind::Press => KeyAction::Press,
        KeyEventKind::Repeat => KeyAction::Repeat,
        KeyEventKind::Release => KeyAction::Release,
    };

    KeyEvent {
        key,
        action,
        modifiers: Modifiers {
            shift: event.modifiers.contains(KeyModifiers::SHIFT),
            control: event.modifiers.contains(KeyModifiers::CONTROL),
            alt: event.modifiers.contains(KeyModifiers::ALT),
        },
    }
}
