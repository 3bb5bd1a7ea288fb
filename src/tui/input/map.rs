use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

use crate::layout::compute_layout;
use crate::tui::app::App;

/// Wheel units per zoom step, keyboard or scroll
const ZOOM_STEP: f64 = 100.0;
/// Cells moved per pan key press
const PAN_COLUMNS: f64 = 4.0;
const PAN_ROWS: f64 = 2.0;

pub(super) fn handle_map_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('f') => app.fit(),
        KeyCode::Char('0') => app.viewport.reset(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_center(ZOOM_STEP),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_center(-ZOOM_STEP),
        // Keys move the view; the map slides the other way
        KeyCode::Left | KeyCode::Char('h') => app.pan_cells(PAN_COLUMNS, 0.0),
        KeyCode::Right | KeyCode::Char('l') => app.pan_cells(-PAN_COLUMNS, 0.0),
        KeyCode::Up | KeyCode::Char('k') => app.pan_cells(0.0, PAN_ROWS),
        KeyCode::Down | KeyCode::Char('j') => app.pan_cells(0.0, -PAN_ROWS),
        _ => {}
    }
}

pub(super) fn handle_map_mouse(app: &mut App, mouse: MouseEvent) {
    let Some(screen) = app.cell_to_screen(mouse.column, mouse.row) else {
        // Releasing off the map drops a draft on nothing
        if matches!(mouse.kind, MouseEventKind::Up(_)) {
            app.interaction.cancel();
        } else {
            app.interaction.pointer_leave();
        }
        return;
    };

    let request = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let layout = compute_layout(&app.store.tree, &app.store.config.layout);
            app.interaction.pointer_down(screen, &layout, &app.viewport)
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let layout = compute_layout(&app.store.tree, &app.store.config.layout);
            app.interaction.pointer_up(screen, &layout, &app.viewport)
        }
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            app.interaction.pointer_move(screen, &mut app.viewport);
            None
        }
        MouseEventKind::ScrollUp => {
            app.viewport.zoom_at(ZOOM_STEP, screen);
            None
        }
        MouseEventKind::ScrollDown => {
            app.viewport.zoom_at(-ZOOM_STEP, screen);
            None
        }
        _ => None,
    };

    if let Some(request) = request {
        app.apply_request(request);
    }
}
