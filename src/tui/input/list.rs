use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;

pub(super) fn handle_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Char('g') | KeyCode::Home => app.move_selection(isize::MIN),
        KeyCode::Char('G') | KeyCode::End => app.move_selection(isize::MAX),
        KeyCode::Left | KeyCode::Char('h') => app.set_collapsed_selected(true),
        KeyCode::Right | KeyCode::Char('l') => app.set_collapsed_selected(false),
        KeyCode::Enter => app.toggle_collapsed_selected(),
        _ => {}
    }
}
