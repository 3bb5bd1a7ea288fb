use std::collections::HashMap;
use std::fmt::Display;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::io::config_io::read_config;
use crate::io::lock::StoreLock;
use crate::io::state::{UiState, read_ui_state, write_ui_state};
use crate::io::store::{self, Store, StoreError};
use crate::io::watcher::{StoreEvent, StoreWatcher};
use crate::layout::{Point, compute_layout};
use crate::model::{TaskTree, Timer};
use crate::ops::{outline, task_ops, timer_ops};
use crate::view::{Interaction, MapRequest, Viewport, ViewportSize};

use super::input;
use super::render;
use super::theme::Theme;

/// Which view is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Mindmap on a braille canvas
    Map,
    /// Indented tree listing
    List,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::Map => "map",
            View::List => "list",
        }
    }

    fn parse(s: &str) -> Option<View> {
        match s {
            "map" => Some(View::Map),
            "list" => Some(View::List),
            _ => None,
        }
    }
}

/// Main application state
pub struct App {
    pub store: Store,
    pub view: View,
    pub should_quit: bool,
    pub theme: Theme,
    pub viewport: Viewport,
    pub interaction: Interaction,
    /// Selected task: list cursor and highlighted box on the map
    pub selected: Option<String>,
    /// Map drawing area from the last frame, in terminal cells
    pub map_area: Rect,
    /// First visible row of the list view
    pub list_scroll: usize,
    /// Transient message for the status row
    pub message: Option<String>,
    /// User edits not yet written to disk
    pub dirty: bool,
    /// Timer countdowns moved since the last save
    timer_progress: bool,
    /// Seconds of timer ticks since the last save
    unsaved_secs: u64,
    /// Timers as last read from or written to `tasks.json`
    synced_timers: HashMap<String, Timer>,
}

impl App {
    pub fn new(store: Store) -> Self {
        let theme = Theme::from_config(&store.config.ui);
        let viewport = Viewport::new(store.config.viewport);
        let selected = store.tree.roots.first().map(|t| t.id.clone());
        let synced_timers = timer_ops::snapshot(&store.tree);
        App {
            store,
            view: View::Map,
            should_quit: false,
            theme,
            viewport,
            interaction: Interaction::default(),
            selected,
            map_area: Rect::default(),
            list_scroll: 0,
            message: None,
            dirty: false,
            timer_progress: false,
            unsaved_secs: 0,
            synced_timers,
        }
    }

    // -----------------------------------------------------------------------
    // Saved UI state
    // -----------------------------------------------------------------------

    pub fn restore_ui_state(&mut self, state: UiState) {
        if let Some(view) = View::parse(&state.view) {
            self.view = view;
        }
        if let Some(transform) = state.transform {
            self.viewport = Viewport::restored(self.store.config.viewport, transform);
        }
        if let Some(id) = state.cursor
            && task_ops::find_task(&self.store.tree, &id).is_some()
        {
            self.selected = Some(id);
        }
    }

    pub fn ui_state(&self) -> UiState {
        UiState {
            view: self.view.as_str().to_string(),
            // An unfitted view has nothing worth restoring
            transform: self.viewport.has_fitted().then(|| self.viewport.transform()),
            cursor: self.selected.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Coordinates
    // -----------------------------------------------------------------------

    fn cell_size(&self) -> (f64, f64) {
        (self.store.config.ui.cell_width, self.store.config.ui.cell_height)
    }

    /// Size of the map area in virtual pixels
    pub fn viewport_size(&self) -> ViewportSize {
        let (cw, ch) = self.cell_size();
        ViewportSize {
            width: self.map_area.width as f64 * cw,
            height: self.map_area.height as f64 * ch,
        }
    }

    /// Center of a terminal cell in map screen pixels, if it lies on the map
    pub fn cell_to_screen(&self, column: u16, row: u16) -> Option<Point> {
        let area = self.map_area;
        if column < area.x || row < area.y || column >= area.x + area.width || row >= area.y + area.height {
            return None;
        }
        let (cw, ch) = self.cell_size();
        Some(Point::new(
            (column - area.x) as f64 * cw + cw / 2.0,
            (row - area.y) as f64 * ch + ch / 2.0,
        ))
    }

    // -----------------------------------------------------------------------
    // Viewport
    // -----------------------------------------------------------------------

    /// Fit the first non-empty layout once the map has a size
    pub fn auto_fit(&mut self) {
        let bounds = compute_layout(&self.store.tree, &self.store.config.layout).bounds;
        if self.viewport.auto_fit(bounds, self.viewport_size()) {
            debug!(scale = self.viewport.scale(), "auto-fit on first layout");
        }
    }

    pub fn fit(&mut self) {
        let bounds = compute_layout(&self.store.tree, &self.store.config.layout).bounds;
        self.viewport.fit_to_view(bounds, self.viewport_size());
    }

    /// Zoom keeping the middle of the map fixed
    pub fn zoom_center(&mut self, delta: f64) {
        let size = self.viewport_size();
        self.viewport
            .zoom_at(delta, Point::new(size.width / 2.0, size.height / 2.0));
    }

    /// Pan by whole terminal cells
    pub fn pan_cells(&mut self, columns: f64, rows: f64) {
        let (cw, ch) = self.cell_size();
        self.viewport.pan(columns * cw, rows * ch);
    }

    // -----------------------------------------------------------------------
    // Edits
    // -----------------------------------------------------------------------

    /// Apply an edit to the tree; success saves, failure shows the error
    fn edit<T, E: Display>(&mut self, f: impl FnOnce(&mut TaskTree) -> Result<T, E>) -> Option<T> {
        match f(&mut self.store.tree) {
            Ok(value) => {
                self.dirty = true;
                self.save();
                Some(value)
            }
            Err(e) => {
                self.message = Some(e.to_string());
                None
            }
        }
    }

    pub fn apply_request(&mut self, request: MapRequest) {
        debug!(?request, "map request");
        match request {
            MapRequest::AddConnection { source, target } => {
                if self.edit(|tree| task_ops::add_connection(tree, &source, &target)) == Some(true) {
                    self.message = Some(format!("connected {} -> {}", source, target));
                }
            }
            MapRequest::DeleteConnection { source, target } => {
                let removed = self.edit(|tree| {
                    Ok::<_, task_ops::TaskError>(task_ops::remove_connection(tree, &source, &target))
                });
                if removed == Some(true) {
                    self.message = Some(format!("disconnected {} -> {}", source, target));
                }
            }
            MapRequest::Select(id) => self.selected = Some(id),
        }
    }

    pub fn toggle_collapsed_selected(&mut self) {
        if let Some(id) = self.selected.clone() {
            self.edit(|tree| task_ops::toggle_collapsed(tree, &id));
        }
    }

    pub fn set_collapsed_selected(&mut self, collapsed: bool) {
        let Some(id) = self.selected.clone() else {
            return;
        };
        let Some(task) = task_ops::find_task(&self.store.tree, &id) else {
            return;
        };
        if task.is_leaf() || task.collapsed == collapsed {
            return;
        }
        self.edit(|tree| task_ops::set_collapsed(tree, &id, collapsed));
    }

    pub fn toggle_completed_selected(&mut self) {
        if let Some(id) = self.selected.clone() {
            self.edit(|tree| task_ops::toggle_completed(tree, &id));
        }
    }

    /// Start or pause the selected task's timer
    pub fn toggle_timer_selected(&mut self) {
        let Some(id) = self.selected.clone() else {
            return;
        };
        let running = task_ops::find_task(&self.store.tree, &id)
            .and_then(|t| t.timer)
            .map(|t| t.running);
        match running {
            Some(true) => {
                self.edit(|tree| timer_ops::pause_timer(tree, &id));
            }
            Some(false) => {
                self.edit(|tree| timer_ops::start_timer(tree, &id));
            }
            None => {
                self.message = Some(format!("{} has no timer (tm timer set {} <minutes>)", id, id));
            }
        }
    }

    /// Move the selection through the visible list rows
    pub fn move_selection(&mut self, delta: isize) {
        let rows = outline::flatten(&self.store.tree, false);
        if rows.is_empty() {
            self.selected = None;
            return;
        }
        let current = self
            .selected
            .as_deref()
            .and_then(|id| outline::row_index(&rows, id))
            .unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(rows.len() - 1);
        self.selected = Some(rows[next].task.id.clone());
    }

    /// Keep the selection on something that still exists
    fn repair_selection(&mut self) {
        let valid = self
            .selected
            .as_deref()
            .is_some_and(|id| task_ops::find_task(&self.store.tree, id).is_some());
        if !valid {
            self.selected = self.store.tree.roots.first().map(|t| t.id.clone());
        }
    }

    // -----------------------------------------------------------------------
    // Timers and persistence
    // -----------------------------------------------------------------------

    /// Advance running timers; finished ones save immediately, the rest
    /// every `autosave_secs`
    pub fn tick_timers(&mut self, secs: u64) {
        if !timer_ops::any_running(&self.store.tree) {
            return;
        }
        let finished = timer_ops::tick(&mut self.store.tree, secs);
        self.timer_progress = true;
        self.unsaved_secs += secs;
        if !finished.is_empty() {
            self.message = Some(format!("timer finished: {}", finished.join(", ")));
            self.save();
        } else if self.unsaved_secs >= self.store.config.ui.autosave_secs {
            self.save();
        }
    }

    /// Write pending changes. User edits replace `tasks.json`; timer
    /// progress alone is merged into whatever is on disk now.
    pub fn save(&mut self) {
        if !self.dirty && !self.timer_progress {
            return;
        }
        let result = if self.dirty {
            self.write_tree()
        } else {
            self.sync_timer_progress()
        };
        match result {
            Ok(()) => {
                self.dirty = false;
                self.timer_progress = false;
                self.unsaved_secs = 0;
                self.synced_timers = timer_ops::snapshot(&self.store.tree);
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                self.message = Some(format!("save failed: {}", e));
            }
        }
    }

    fn write_tree(&self) -> Result<(), StoreError> {
        let _lock = StoreLock::acquire_default(&self.store.dir)?;
        self.store.save()
    }

    fn sync_timer_progress(&mut self) -> Result<(), StoreError> {
        let local = timer_ops::snapshot(&self.store.tree);
        let written = store::update_tree(&self.store.dir, |disk| {
            timer_ops::merge_progress(disk, &self.synced_timers, &local);
        })?;
        self.replace_tree(written);
        Ok(())
    }

    /// Swap in a tree that came from disk
    fn replace_tree(&mut self, tree: TaskTree) {
        if tree == self.store.tree {
            return;
        }
        self.store.tree = tree;
        self.interaction.cancel();
        self.repair_selection();
    }

    /// React to external edits of the store files
    pub fn handle_store_events(&mut self, events: Vec<StoreEvent>) {
        for event in events {
            match event {
                StoreEvent::TreeChanged => self.reload_tree(),
                StoreEvent::ConfigChanged => self.reload_config(),
            }
        }
    }

    fn reload_tree(&mut self) {
        let mut tree = match store::read_tree(&self.store.dir) {
            Ok(tree) => tree,
            // Usually a half-written file; the next event brings the rest
            Err(e) => {
                debug!(error = %e, "ignoring unreadable tasks.json");
                return;
            }
        };
        if tree == self.store.tree {
            return;
        }
        if self.dirty {
            self.message = Some("tasks.json changed on disk; keeping local edits".into());
            return;
        }
        let on_disk = timer_ops::snapshot(&tree);
        let local = timer_ops::snapshot(&self.store.tree);
        let carried = timer_ops::merge_progress(&mut tree, &self.synced_timers, &local);
        self.synced_timers = on_disk;
        info!(carried, "reloaded tasks.json");
        self.replace_tree(tree);
    }

    fn reload_config(&mut self) {
        match read_config(&self.store.dir) {
            Ok(config) => {
                self.theme = Theme::from_config(&config.ui);
                self.store.config = config;
                info!("reloaded config.toml");
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }
}

pub fn save_ui_state(app: &App) {
    if let Err(e) = write_ui_state(&app.store.dir, &app.ui_state()) {
        warn!(error = %e, "could not write .state.json");
    }
}

pub fn run(start: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let root = store::discover_store(start)?;
    let store = store::load_store(&root)?;

    let mut app = App::new(store);
    if let Some(state) = read_ui_state(&app.store.dir) {
        app.restore_ui_state(state);
    }

    let watcher = match StoreWatcher::start(&app.store.dir) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!(error = %e, "file watcher unavailable");
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    app.save();
    save_ui_state(&app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&StoreWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                _ => {}
            }
        }

        if let Some(watcher) = watcher {
            app.handle_store_events(watcher.poll());
        }

        let elapsed = last_tick.elapsed().as_secs();
        if elapsed > 0 {
            last_tick += Duration::from_secs(elapsed);
            app.tick_timers(elapsed);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Task, Timer};
    use crate::tui::render::test_helpers::*;
    use crate::view::ViewportTransform;

    #[test]
    fn restore_state_uses_saved_transform_and_cursor() {
        let mut app = app_with_tree(sample_tree());
        app.restore_ui_state(UiState {
            view: "list".into(),
            transform: Some(ViewportTransform {
                translate_x: 10.0,
                translate_y: 20.0,
                scale: 1.5,
            }),
            cursor: Some("T-004".into()),
        });
        assert_eq!(app.view, View::List);
        assert_eq!(app.viewport.scale(), 1.5);
        assert!(app.viewport.has_fitted());
        assert_eq!(app.selected.as_deref(), Some("T-004"));
    }

    #[test]
    fn restore_ignores_unknown_cursor_and_view() {
        let mut app = app_with_tree(sample_tree());
        app.restore_ui_state(UiState {
            view: "weird".into(),
            transform: None,
            cursor: Some("T-999".into()),
        });
        assert_eq!(app.view, View::Map);
        assert_eq!(app.selected.as_deref(), Some("T-001"));
        assert!(!app.viewport.has_fitted());
        assert!(app.ui_state().transform.is_none());
    }

    #[test]
    fn cell_to_screen_uses_cell_centers() {
        let mut app = app_with_tree(sample_tree());
        app.map_area = Rect::new(0, 1, 80, 22);
        assert_eq!(app.cell_to_screen(0, 1), Some(Point::new(4.0, 8.0)));
        assert_eq!(app.cell_to_screen(10, 3), Some(Point::new(84.0, 40.0)));
        assert_eq!(app.cell_to_screen(0, 0), None);
        assert_eq!(app.cell_to_screen(80, 5), None);
        assert_eq!(
            app.viewport_size(),
            ViewportSize {
                width: 640.0,
                height: 352.0
            }
        );
    }

    #[test]
    fn auto_fit_happens_once_map_has_size() {
        let mut app = app_with_tree(sample_tree());
        app.auto_fit();
        assert!(!app.viewport.has_fitted());
        app.map_area = Rect::new(0, 1, 80, 22);
        app.auto_fit();
        assert!(app.viewport.has_fitted());
    }

    #[test]
    fn move_selection_walks_visible_rows() {
        let mut app = app_with_tree(sample_tree());
        app.move_selection(1);
        assert_eq!(app.selected.as_deref(), Some("T-002"));
        app.move_selection(10);
        assert_eq!(app.selected.as_deref(), Some("T-004"));
        app.move_selection(-10);
        assert_eq!(app.selected.as_deref(), Some("T-001"));
    }

    #[test]
    fn failed_edit_reports_message() {
        let mut app = app_with_tree(sample_tree());
        app.selected = Some("T-002".into());
        app.toggle_timer_selected();
        assert!(app.message.as_deref().unwrap().contains("has no timer"));
        assert!(!app.dirty);
    }

    #[test]
    fn tick_timers_without_running_timers_is_a_noop() {
        let mut app = app_with_tree(sample_tree());
        app.tick_timers(5);
        assert!(!app.dirty);
    }

    #[test]
    fn finished_timer_sets_message() {
        let mut tree = sample_tree();
        tree.roots[0].children[0].timer = Some(Timer {
            duration_secs: 60,
            remaining_secs: 2,
            running: true,
        });
        let (_tmp, mut app) = app_on_disk(tree);
        app.tick_timers(3);
        assert_eq!(app.message.as_deref(), Some("timer finished: T-002"));
        // Saved straight away
        assert!(!app.dirty);
        let on_disk = store::read_tree(&app.store.dir).unwrap();
        let timer = task_ops::find_task(&on_disk, "T-002").unwrap().timer.unwrap();
        assert_eq!(timer.remaining_secs, 0);
        assert!(!timer.running);
    }

    #[test]
    fn connection_requests_edit_and_save() {
        let (_tmp, mut app) = app_on_disk(sample_tree());
        app.apply_request(MapRequest::AddConnection {
            source: "T-004".into(),
            target: "T-002".into(),
        });
        assert_eq!(app.message.as_deref(), Some("connected T-004 -> T-002"));
        let on_disk = store::read_tree(&app.store.dir).unwrap();
        assert_eq!(on_disk.connection_pairs().count(), 1);

        app.apply_request(MapRequest::DeleteConnection {
            source: "T-004".into(),
            target: "T-002".into(),
        });
        let on_disk = store::read_tree(&app.store.dir).unwrap();
        assert_eq!(on_disk.connection_pairs().count(), 0);
    }

    fn tree_with_running_timer() -> TaskTree {
        let mut tree = sample_tree();
        tree.roots[0].children[1].timer = Some(Timer {
            duration_secs: 600,
            remaining_secs: 600,
            running: true,
        });
        tree
    }

    fn titles(tree: &TaskTree) -> Vec<&str> {
        tree.all_tasks().iter().map(|t| t.title.as_str()).collect()
    }

    fn pack_timer(tree: &TaskTree) -> Timer {
        task_ops::find_task(tree, "T-004").unwrap().timer.unwrap()
    }

    #[test]
    fn running_timer_does_not_block_external_edits() {
        let (_tmp, mut app) = app_on_disk(tree_with_running_timer());
        app.tick_timers(1);
        assert!(!app.dirty);

        let mut from_cli = store::read_tree(&app.store.dir).unwrap();
        task_ops::add_task(&mut from_cli, "from cli", None, "T").unwrap();
        store::save_tree(&app.store.dir, &from_cli).unwrap();
        app.handle_store_events(vec![StoreEvent::TreeChanged]);

        assert_eq!(app.message, None);
        assert!(titles(&app.store.tree).contains(&"from cli"));
        // Local countdown survives the reload
        assert_eq!(pack_timer(&app.store.tree).remaining_secs, 599);

        let autosave = app.store.config.ui.autosave_secs;
        app.tick_timers(autosave);
        let on_disk = store::read_tree(&app.store.dir).unwrap();
        assert!(titles(&on_disk).contains(&"from cli"));
        assert_eq!(pack_timer(&on_disk).remaining_secs, 599 - autosave);
    }

    #[test]
    fn autosave_keeps_edits_the_watcher_has_not_reported() {
        let (_tmp, mut app) = app_on_disk(tree_with_running_timer());
        let mut from_cli = store::read_tree(&app.store.dir).unwrap();
        task_ops::set_title(&mut from_cli, "T-003", "Compare fares").unwrap();
        store::save_tree(&app.store.dir, &from_cli).unwrap();

        let autosave = app.store.config.ui.autosave_secs;
        app.tick_timers(autosave);

        let on_disk = store::read_tree(&app.store.dir).unwrap();
        assert!(titles(&on_disk).contains(&"Compare fares"));
        assert_eq!(pack_timer(&on_disk).remaining_secs, 600 - autosave);
        assert_eq!(app.store.tree, on_disk);
    }

    #[test]
    fn timer_paused_elsewhere_stays_paused() {
        let (_tmp, mut app) = app_on_disk(tree_with_running_timer());
        app.tick_timers(5);

        let mut from_cli = store::read_tree(&app.store.dir).unwrap();
        timer_ops::pause_timer(&mut from_cli, "T-004").unwrap();
        store::save_tree(&app.store.dir, &from_cli).unwrap();
        app.handle_store_events(vec![StoreEvent::TreeChanged]);

        let timer = pack_timer(&app.store.tree);
        assert!(!timer.running);
        assert_eq!(timer.remaining_secs, 600);
        assert!(!timer_ops::any_running(&app.store.tree));
    }

    #[test]
    fn external_edit_reloads_tree() {
        let (_tmp, mut app) = app_on_disk(sample_tree());
        app.selected = Some("T-004".into());
        let replacement = TaskTree::new(vec![Task::new("T-010", "Fresh")]);
        store::save_tree(&app.store.dir, &replacement).unwrap();
        app.handle_store_events(vec![StoreEvent::TreeChanged]);
        assert_eq!(app.store.tree, replacement);
        assert_eq!(app.selected.as_deref(), Some("T-010"));
    }
}
