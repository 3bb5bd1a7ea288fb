mod list;
mod map;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};

use super::app::{App, View};

use list::handle_list_key;
use map::handle_map_key;

/// Handle a key event in the current view
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    app.message = None;

    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.interaction.cancel();
            app.view = match app.view {
                View::Map => View::List,
                View::List => View::Map,
            };
            return;
        }
        KeyCode::Esc => {
            app.interaction.cancel();
            return;
        }
        KeyCode::Char(' ') => {
            app.toggle_collapsed_selected();
            return;
        }
        KeyCode::Char('x') => {
            app.toggle_completed_selected();
            return;
        }
        KeyCode::Char('t') => {
            app.toggle_timer_selected();
            return;
        }
        _ => {}
    }

    match app.view {
        View::Map => handle_map_key(app, key),
        View::List => handle_list_key(app, key),
    }
}

/// Handle a mouse event; only the map view takes pointer input
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.view == View::Map {
        map::handle_map_mouse(app, mouse);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{MouseButton, MouseEventKind};
    use ratatui::layout::Rect;

    use super::*;
    use crate::io::store;
    use crate::ops::task_ops::find_task;
    use crate::tui::render::test_helpers::*;
    use crate::view::Interaction;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Map filling an 80x22 area at the identity transform, so one cell
    /// is 8x16 world pixels starting at the origin
    fn identity_map_app() -> App {
        let mut app = app_with_tree(sample_tree());
        app.map_area = Rect::new(0, 0, 80, 22);
        app.viewport = crate::view::Viewport::restored(
            app.store.config.viewport,
            crate::view::ViewportTransform {
                translate_x: 0.0,
                translate_y: 0.0,
                scale: 1.0,
            },
        );
        app
    }

    #[test]
    fn quit_and_tab() {
        let mut app = app_with_tree(sample_tree());
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.view, View::List);
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.view, View::Map);
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn space_and_x_edit_selected_task() {
        let (_tmp, mut app) = app_on_disk(sample_tree());
        handle_key(&mut app, key(KeyCode::Char(' ')));
        handle_key(&mut app, key(KeyCode::Char('x')));
        let on_disk = store::read_tree(&app.store.dir).unwrap();
        let root = find_task(&on_disk, "T-001").unwrap();
        assert!(root.collapsed);
        assert!(root.completed);
    }

    #[test]
    fn list_keys_move_and_fold() {
        let (_tmp, mut app) = app_on_disk(sample_tree());
        app.view = View::List;
        handle_key(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.selected.as_deref(), Some("T-002"));
        handle_key(&mut app, key(KeyCode::Left));
        assert!(find_task(&app.store.tree, "T-002").unwrap().collapsed);
        handle_key(&mut app, key(KeyCode::Char('G')));
        assert_eq!(app.selected.as_deref(), Some("T-004"));
        handle_key(&mut app, key(KeyCode::Char('g')));
        assert_eq!(app.selected.as_deref(), Some("T-001"));
    }

    #[test]
    fn map_keys_pan_and_zoom() {
        let mut app = identity_map_app();
        handle_key(&mut app, key(KeyCode::Right));
        assert_eq!(app.viewport.transform().translate_x, -32.0);
        handle_key(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.viewport.transform().translate_y, 32.0);
        handle_key(&mut app, key(KeyCode::Char('+')));
        assert!((app.viewport.scale() - 1.1).abs() < 1e-9);
        handle_key(&mut app, key(KeyCode::Char('0')));
        assert_eq!(app.viewport.scale(), 1.0);
        assert_eq!(app.viewport.transform().translate_x, 50.0);
    }

    #[test]
    fn background_drag_pans() {
        let mut app = identity_map_app();
        // Below every node
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 5, 15));
        assert!(matches!(app.interaction, Interaction::Panning { .. }));
        handle_mouse(&mut app, mouse(MouseEventKind::Drag(MouseButton::Left), 8, 16));
        let t = app.viewport.transform();
        assert_eq!((t.translate_x, t.translate_y), (24.0, 16.0));
        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 8, 16));
        assert!(app.interaction.is_idle());
    }

    #[test]
    fn clicking_a_node_selects_it() {
        let mut app = identity_map_app();
        // T-004 box spans x 300..500, y 80..140 (rows 5..8)
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 45, 6));
        assert_eq!(app.selected.as_deref(), Some("T-004"));
        assert!(app.interaction.is_idle());
    }

    #[test]
    fn dragging_from_handle_connects() {
        let (_tmp, mut app) = app_on_disk(sample_tree());
        app.map_area = Rect::new(0, 0, 80, 22);
        app.viewport = crate::view::Viewport::restored(
            app.store.config.viewport,
            crate::view::ViewportTransform {
                translate_x: 0.0,
                translate_y: 0.0,
                scale: 1.0,
            },
        );
        // T-004 handle sits at (500, 110): column 62 center x = 500, row 6 center y = 104
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 62, 6));
        assert!(app.interaction.draft().is_some());
        // Drop on T-001, box x 0..200, y 40..100
        handle_mouse(&mut app, mouse(MouseEventKind::Drag(MouseButton::Left), 10, 4));
        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 10, 4));
        assert!(app.interaction.is_idle());
        let on_disk = store::read_tree(&app.store.dir).unwrap();
        let pairs: Vec<_> = on_disk.connection_pairs().collect();
        assert_eq!(pairs, vec![("T-004", "T-001")]);
    }

    #[test]
    fn releasing_off_the_map_cancels_the_draft() {
        let (_tmp, mut app) = app_on_disk(sample_tree());
        app.map_area = Rect::new(0, 0, 80, 22);
        app.viewport = crate::view::Viewport::restored(
            app.store.config.viewport,
            crate::view::ViewportTransform {
                translate_x: 0.0,
                translate_y: 0.0,
                scale: 1.0,
            },
        );
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 62, 6));
        handle_mouse(&mut app, mouse(MouseEventKind::Drag(MouseButton::Left), 10, 4));
        assert!(app.interaction.draft().is_some());
        // Row 23 is the status row, outside the 22-row map
        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 10, 23));
        assert!(app.interaction.is_idle());
        assert_eq!(app.store.tree.connection_pairs().count(), 0);
        let on_disk = store::read_tree(&app.store.dir).unwrap();
        assert_eq!(on_disk.connection_pairs().count(), 0);
    }

    #[test]
    fn leaving_the_map_ends_a_pan_but_not_a_draft() {
        let mut app = identity_map_app();
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 5, 15));
        assert!(matches!(app.interaction, Interaction::Panning { .. }));
        handle_mouse(&mut app, mouse(MouseEventKind::Drag(MouseButton::Left), 5, 30));
        assert!(app.interaction.is_idle());
        let t = app.viewport.transform();
        assert_eq!((t.translate_x, t.translate_y), (0.0, 0.0));

        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 62, 6));
        handle_mouse(&mut app, mouse(MouseEventKind::Moved, 90, 3));
        assert_eq!(app.interaction.draft().map(|d| d.source_id.as_str()), Some("T-004"));
    }

    #[test]
    fn scroll_zooms_under_cursor() {
        let mut app = identity_map_app();
        handle_mouse(&mut app, mouse(MouseEventKind::ScrollUp, 10, 5));
        let t = app.viewport.transform();
        assert!((t.scale - 1.1).abs() < 1e-9);
        // The world point under (84, 88) stays put
        let world = app.viewport.to_world(crate::layout::Point::new(84.0, 88.0));
        assert!((world.x - 84.0).abs() < 1e-9);
        assert!((world.y - 88.0).abs() < 1e-9);
    }

    #[test]
    fn list_view_ignores_mouse() {
        let mut app = identity_map_app();
        app.view = View::List;
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 5, 15));
        assert!(app.interaction.is_idle());
    }
}
