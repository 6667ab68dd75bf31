use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use crate::ui::ScreenLayout;

/// What a terminal event asks the controller to do
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Stop,
    /// The "delete window" signal
    Close,
    Edit(KeyEvent),
}

pub fn map_key(key: KeyEvent) -> Command {
    match key.code {
        KeyCode::Esc => Command::Close,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Close,
        KeyCode::F(5) => Command::Start,
        KeyCode::F(6) => Command::Stop,
        _ => Command::Edit(key),
    }
}

/// Left clicks on the buttons; everything else is ignored
pub fn map_mouse(mouse: MouseEvent, area: Rect) -> Option<Command> {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }

    let layout = ScreenLayout::new(area);
    let at = Position::new(mouse.column, mouse.row);
    if layout.start_button.contains(at) {
        Some(Command::Start)
    } else if layout.stop_button.contains(at) {
        Some(Command::Stop)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn function_keys_drive_the_buttons() {
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE)),
            Command::Start
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::F(6), KeyModifiers::NONE)),
            Command::Stop
        );
    }

    #[test]
    fn escape_and_ctrl_c_close() {
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
            Command::Close
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Command::Close
        );
    }

    #[test]
    fn plain_chars_are_edits() {
        let k = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(map_key(k), Command::Edit(k));
    }

    #[test]
    fn clicks_hit_the_buttons() {
        let area = Rect::new(0, 0, 80, 24);
        let layout = ScreenLayout::new(area);

        let start = layout.start_button;
        let stop = layout.stop_button;
        assert_eq!(
            map_mouse(click(start.x + 1, start.y + 1), area),
            Some(Command::Start)
        );
        assert_eq!(
            map_mouse(click(stop.x + 1, stop.y + 1), area),
            Some(Command::Stop)
        );

        let text = layout.text;
        assert_eq!(map_mouse(click(text.x + 1, text.y + 1), area), None);
    }

    #[test]
    fn non_left_clicks_are_ignored() {
        let area = Rect::new(0, 0, 80, 24);
        let start = ScreenLayout::new(area).start_button;
        let mut ev = click(start.x + 1, start.y + 1);
        ev.kind = MouseEventKind::Moved;
        assert_eq!(map_mouse(ev, area), None);
    }
}
