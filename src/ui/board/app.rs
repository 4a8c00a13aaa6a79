//! Terminal loop and input handling for the board.
//!
//! Owns the application state, translates key and mouse input into
//! store mutations routed through the drag controller, and watches the
//! data directory so edits made by another process show up without a
//! manual refresh.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use notify::{RecursiveMode, Watcher};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::UiConfig;
use crate::drag::{DragController, DragTransfer, DropOutcome};
use crate::error::Result;
use crate::events::{self, EventKind, EventSink};
use crate::task::{Status, Task, TaskStore};

use super::editor::{EditorAction, EditorState};
use super::model;
use super::view;

/// Below this width the columns stack vertically instead of side by side.
const NARROW_WIDTH: u16 = 70;
const WATCH_DEBOUNCE_MS: u64 = 200;

enum UiMsg {
    FileChanged,
    WatchError(String),
}

#[derive(Clone, Copy)]
pub(crate) enum StatusKind {
    Info,
    Error,
}

#[derive(Default, Clone, Copy)]
struct Viewport {
    width: u16,
    height: u16,
}

pub(crate) struct AppState {
    pub(crate) store: TaskStore,
    pub(crate) drag: DragController,
    pub(crate) focus: Status,
    pub(crate) cursor: usize,
    pub(crate) editor: Option<EditorState>,
    /// Index ranges of the cards each column last rendered, kept for
    /// pointer hit-testing.
    pub(crate) todo_window: (usize, usize),
    pub(crate) done_window: (usize, usize),
    sink: Option<EventSink>,
    /// Payload handed out at drag start, returned to the controller at
    /// drop time.
    transfer: Option<DragTransfer>,
    /// Card pressed but not yet moved. A drag only starts once the
    /// pointer travels, so a plain click stays a selection.
    armed: Option<Task>,
    status_message: Option<(String, StatusKind)>,
    watch_error: Option<String>,
    viewport: Viewport,
}

impl AppState {
    fn new(store: TaskStore, sink: Option<EventSink>) -> Self {
        Self {
            store,
            drag: DragController::new(),
            focus: Status::Todo,
            cursor: 0,
            editor: None,
            todo_window: (0, 0),
            done_window: (0, 0),
            sink,
            transfer: None,
            armed: None,
            status_message: None,
            watch_error: None,
            viewport: Viewport::default(),
        }
    }

    fn update_viewport(&mut self, width: u16, height: u16) {
        self.viewport = Viewport { width, height };
    }

    pub(crate) fn is_narrow(&self) -> bool {
        self.viewport.width > 0 && self.viewport.width < NARROW_WIDTH
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        if let Some((message, kind)) = self.status_message.as_ref() {
            return Some((message.clone(), *kind));
        }
        self.watch_error
            .as_ref()
            .map(|message| (message.clone(), StatusKind::Error))
    }

    pub(crate) fn task_count_summary(&mut self) -> String {
        let partition = self.store.partition();
        format!(
            "todo: {}  done: {}",
            partition.todo.len(),
            partition.done.len()
        )
    }

    pub(crate) fn footer_hint(&self) -> &'static str {
        if self.editor.is_some() {
            "enter save  tab field  ctrl+u clear  esc cancel"
        } else if self.drag.is_dragging() {
            "release over a column to drop  esc cancel"
        } else {
            "j/k move  tab column  a add  space toggle  m move  d delete  q quit"
        }
    }

    fn set_info(&mut self, message: String) {
        self.status_message = Some((message, StatusKind::Info));
    }

    fn set_error(&mut self, message: String) {
        self.status_message = Some((message, StatusKind::Error));
    }

    fn focused_len(&mut self) -> usize {
        let focus = self.focus;
        self.store.partition().column(focus).len()
    }

    fn normalize_cursor(&mut self) {
        let len = self.focused_len();
        self.cursor = model::clamp_cursor(len, self.cursor).unwrap_or(0);
    }

    fn selected_task(&mut self) -> Option<Task> {
        let focus = self.focus;
        let cursor = self.cursor;
        let column = self.store.partition().column(focus);
        let index = model::clamp_cursor(column.len(), cursor)?;
        column.get(index).cloned()
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.focused_len();
        self.cursor = model::step(len, self.cursor, delta);
    }

    fn switch_column(&mut self) {
        self.focus = self.focus.toggled();
        self.normalize_cursor();
    }

    fn open_editor(&mut self) {
        self.editor = Some(EditorState::new());
        self.status_message = None;
    }

    fn submit_editor(&mut self) {
        let Some(editor) = self.editor.as_ref() else {
            return;
        };
        let title = editor.title().to_string();
        let note = editor.note().to_string();
        match self.store.add(&title, &note) {
            Ok(task) => {
                self.record(events::Event::new(EventKind::TaskAdded, &task.id).with_task(&task));
                self.set_info(format!("Added '{}'", task.title));
                self.editor = None;
                self.focus = Status::Todo;
                self.cursor = 0;
            }
            // The form stays open so the input can be corrected in place.
            Err(err) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.set_error(err.to_string());
                }
            }
        }
    }

    fn toggle_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        match self.store.toggle(&task.id) {
            Ok(true) => {
                if let Some(status) = self.store.get(&task.id).map(|task| task.status) {
                    self.record(
                        events::Event::new(EventKind::TaskToggled, &task.id)
                            .with_data(serde_json::json!({ "status": status })),
                    );
                    self.set_info(format!("'{}' is now {status}", task.title));
                }
                self.normalize_cursor();
            }
            Ok(false) => {}
            Err(err) => self.set_error(format!("toggle failed: {err}")),
        }
    }

    /// Keyboard path through the same drag machinery the mouse uses.
    fn move_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let target = task.status.toggled();
        let transfer = self.drag.drag_start(&task);
        self.drag.drag_enter(target);
        if let Some(outcome) = self.drag.drop_on(target, Some(&transfer)) {
            self.apply_drop(outcome);
        }
        self.drag.drag_end();
    }

    fn delete_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        match self.store.delete(&task.id) {
            Ok(true) => {
                self.record(Ok(events::Event::new(EventKind::TaskDeleted, &task.id)));
                self.set_info(format!("Deleted '{}'", task.title));
                self.normalize_cursor();
            }
            Ok(false) => {}
            Err(err) => self.set_error(format!("delete failed: {err}")),
        }
    }

    fn reload(&mut self) {
        self.store.reload();
        self.normalize_cursor();
    }

    fn cancel_drag(&mut self) {
        self.transfer = None;
        self.armed = None;
        self.drag.drag_end();
    }

    fn zone_at(&self, x: u16, y: u16) -> Option<Status> {
        [Status::Todo, Status::Done].into_iter().find(|zone| {
            self.drag
                .zone_bounds(*zone)
                .is_some_and(|bounds| bounds.contains(x, y))
        })
    }

    fn card_under(&mut self, x: u16, y: u16) -> Option<(Status, usize)> {
        let zone = self.zone_at(x, y)?;
        let bounds = self.drag.zone_bounds(zone)?;
        let window = match zone {
            Status::Todo => self.todo_window,
            Status::Done => self.done_window,
        };
        let index = model::card_at(model::content_area(bounds), window, x, y)?;
        Some((zone, index))
    }

    fn pointer_down(&mut self, x: u16, y: u16) {
        let Some((zone, index)) = self.card_under(x, y) else {
            return;
        };
        self.focus = zone;
        self.cursor = index;
        self.armed = self.store.partition().column(zone).get(index).cloned();
    }

    fn pointer_drag(&mut self, x: u16, y: u16) {
        if let Some(task) = self.armed.take() {
            self.transfer = Some(self.drag.drag_start(&task));
        }
        if !self.drag.is_dragging() {
            return;
        }
        match self.zone_at(x, y) {
            Some(zone) => {
                self.drag.drag_enter(zone);
                // Crossing from the target straight into the other column
                // must also clear the stale highlight.
                self.drag.drag_leave(zone.toggled(), (x, y));
            }
            None => {
                for zone in [Status::Todo, Status::Done] {
                    self.drag.drag_leave(zone, (x, y));
                }
            }
        }
    }

    fn pointer_up(&mut self, x: u16, y: u16) {
        self.armed = None;
        if !self.drag.is_dragging() {
            return;
        }
        let transfer = self.transfer.take();
        if let Some(zone) = self.zone_at(x, y) {
            if let Some(outcome) = self.drag.drop_on(zone, transfer.as_ref()) {
                self.apply_drop(outcome);
            }
        }
        self.drag.drag_end();
    }

    fn apply_drop(&mut self, outcome: DropOutcome) {
        let target = outcome.target;
        match self.store.move_to(&outcome.task_id, target) {
            Ok(true) => {
                self.record(
                    events::Event::new(EventKind::TaskMoved, &outcome.task_id)
                        .with_data(serde_json::json!({ "status": target })),
                );
                self.focus = target;
                let index = self
                    .store
                    .partition()
                    .column(target)
                    .iter()
                    .position(|task| task.id == outcome.task_id);
                if let Some(index) = index {
                    self.cursor = index;
                }
            }
            // The card vanished between pickup and drop; nothing to move.
            Ok(false) => {}
            Err(err) => self.set_error(format!("move failed: {err}")),
        }
    }

    fn record(&mut self, event: Result<events::Event>) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if let Err(err) = event.and_then(|event| sink.emit(&event)) {
            self.set_error(format!("event not recorded: {err}"));
        }
    }
}

/// Run the board until the user quits.
pub fn run(store: TaskStore, sink: Option<EventSink>, ui: &UiConfig) -> Result<()> {
    // The watcher needs an existing directory to attach to.
    let _ = std::fs::create_dir_all(store.storage().data_dir());

    let (ui_tx, ui_rx) = mpsc::channel();
    if ui.watch {
        spawn_watch(store.storage().data_dir().to_path_buf(), ui_tx);
    }

    let mut app = AppState::new(store, sink);
    run_terminal(&mut app, ui_rx, Duration::from_millis(ui.poll_ms))
}

fn run_terminal(app: &mut AppState, ui_rx: Receiver<UiMsg>, poll: Duration) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;
    app.update_viewport(size.width, size.height);

    let result = run_loop(&mut terminal, app, ui_rx, poll);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
    poll: Duration,
) -> Result<()> {
    let mut dirty = true;
    loop {
        while let Ok(msg) = ui_rx.try_recv() {
            match msg {
                UiMsg::FileChanged => app.reload(),
                UiMsg::WatchError(message) => app.watch_error = Some(message),
            }
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| {
                let area = frame.size();
                app.update_viewport(area.width, area.height);
                view::render(frame, app);
            })?;
            dirty = false;
        }

        if event::poll(poll)? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Mouse(mouse) => {
                    handle_mouse(app, mouse);
                    dirty = true;
                }
                Event::Resize(width, height) => {
                    app.update_viewport(width, height);
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Returns true when the app should exit.
fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    if let Some(editor) = app.editor.as_mut() {
        match editor.handle_key(key) {
            EditorAction::Cancel => app.editor = None,
            EditorAction::Submit => app.submit_editor(),
            EditorAction::None => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            if app.drag.is_dragging() {
                app.cancel_drag();
                return false;
            }
            return true;
        }
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::Tab
        | KeyCode::BackTab
        | KeyCode::Char('h')
        | KeyCode::Char('l')
        | KeyCode::Left
        | KeyCode::Right => app.switch_column(),
        KeyCode::Char('a') => app.open_editor(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(),
        KeyCode::Char('m') => app.move_selected(),
        KeyCode::Char('d') => app.delete_selected(),
        KeyCode::Char('r') => app.reload(),
        _ => {}
    }
    false
}

fn handle_mouse(app: &mut AppState, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.pointer_down(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.pointer_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.pointer_up(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.move_cursor(1),
        MouseEventKind::ScrollUp => app.move_cursor(-1),
        _ => {}
    }
}

/// Watch the data directory and nudge the UI after writes settle.
///
/// Raw notifications are debounced so an editor save (often several
/// filesystem events back to back) produces a single reload.
fn spawn_watch(dir: PathBuf, ui_tx: Sender<UiMsg>) {
    thread::spawn(move || {
        let (event_tx, event_rx) = mpsc::channel();
        let watcher = notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        });

        let mut watcher = match watcher {
            Ok(watcher) => watcher,
            Err(err) => {
                let _ = ui_tx.send(UiMsg::WatchError(format!("watch failed: {err}")));
                return;
            }
        };

        if watcher.watch(&dir, RecursiveMode::NonRecursive).is_err() {
            let _ = ui_tx.send(UiMsg::WatchError(format!(
                "cannot watch {}",
                dir.display()
            )));
            return;
        }

        let debounce = Duration::from_millis(WATCH_DEBOUNCE_MS);
        let mut pending: Option<Instant> = None;

        loop {
            let timeout = pending
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(Duration::from_secs(3600));
            match event_rx.recv_timeout(timeout) {
                Ok(Ok(_)) => {
                    pending = Some(Instant::now() + debounce);
                }
                Ok(Err(err)) => {
                    let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if pending.take().is_some() && ui_tx.send(UiMsg::FileChanged).is_err() {
                        break;
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
    });
}
