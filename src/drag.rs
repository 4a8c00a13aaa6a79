//! Drag-and-drop session state machine.
//!
//! Tracks one in-progress drag gesture from start to drop or cancel: which
//! task is being dragged, which column it came from, and which column is
//! currently highlighted as a valid target. The controller never mutates
//! the task collection itself; a successful drop yields a move command for
//! the caller to apply through the store.
//!
//! The leave guard works on registered zone rectangles and the pointer
//! position, so "did the pointer actually leave the column" is an explicit
//! containment check rather than a property of how events bubble in any
//! particular UI toolkit.

use serde::{Deserialize, Serialize};

use crate::task::{Status, Task};

/// Schema tag carried by serialized transfer payloads.
pub const TRANSFER_SCHEMA_VERSION: &str = "tb.drag.v1";

/// Typed payload recorded at drag start for drop targets to consume.
///
/// Transfer channels are environment-dependent and can drop data, so drop
/// handling treats this as best-effort: a payload that fails [`decode`]
/// simply never reaches the state machine, and the session-held id takes
/// over.
///
/// [`decode`]: DragTransfer::decode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragTransfer {
    schema_version: String,
    task_id: String,
}

impl DragTransfer {
    fn new(task_id: &str) -> Self {
        Self {
            schema_version: TRANSFER_SCHEMA_VERSION.to_string(),
            task_id: task_id.to_string(),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Serialize for handoff over an untyped channel.
    pub fn encode(&self) -> String {
        // Two plain strings cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse and validate an incoming payload.
    ///
    /// Returns `None` for anything that is not well-formed JSON with the
    /// expected schema tag and a non-empty task id.
    pub fn decode(raw: &str) -> Option<Self> {
        let transfer: DragTransfer = serde_json::from_str(raw.trim()).ok()?;
        if transfer.schema_version != TRANSFER_SCHEMA_VERSION {
            return None;
        }
        if transfer.task_id.trim().is_empty() {
            return None;
        }
        Some(transfer)
    }
}

/// Axis-aligned dropzone rectangle in terminal cell coordinates.
///
/// A plain struct on purpose: the containment guard must not depend on a
/// rendering toolkit's geometry types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl ZoneRect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the point lies inside. Right and bottom edges are
    /// exclusive.
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x
            && x < self.x.saturating_add(self.width)
            && y >= self.y
            && y < self.y.saturating_add(self.height)
    }
}

/// Drag session states. At most one session exists at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragSession {
    #[default]
    Idle,
    Dragging {
        task_id: String,
        origin: Status,
        highlight: Option<Status>,
    },
}

/// The move command produced by a successful drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropOutcome {
    pub task_id: String,
    pub target: Status,
}

/// State machine over drag gestures, plus the registered zone bounds the
/// leave guard checks against.
#[derive(Debug, Default)]
pub struct DragController {
    session: DragSession,
    zones: ZoneBounds,
}

#[derive(Debug, Default)]
struct ZoneBounds {
    todo: Option<ZoneRect>,
    done: Option<ZoneRect>,
}

impl ZoneBounds {
    fn get(&self, zone: Status) -> Option<ZoneRect> {
        match zone {
            Status::Todo => self.todo,
            Status::Done => self.done,
        }
    }

    fn set(&mut self, zone: Status, bounds: ZoneRect) {
        match zone {
            Status::Todo => self.todo = Some(bounds),
            Status::Done => self.done = Some(bounds),
        }
    }
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.session, DragSession::Dragging { .. })
    }

    /// Id of the task being dragged, if any.
    pub fn dragging_id(&self) -> Option<&str> {
        match &self.session {
            DragSession::Dragging { task_id, .. } => Some(task_id),
            DragSession::Idle => None,
        }
    }

    /// Register where a dropzone currently sits on screen.
    ///
    /// The renderer calls this every frame; the leave guard checks the
    /// pointer against the registered rectangle.
    pub fn set_zone_bounds(&mut self, zone: Status, bounds: ZoneRect) {
        self.zones.set(zone, bounds);
    }

    pub fn zone_bounds(&self, zone: Status) -> Option<ZoneRect> {
        self.zones.get(zone)
    }

    /// Begin a drag on `task`, recording its status as the origin.
    ///
    /// Returns the transfer payload for drop targets. Starting a drag
    /// while one is active restarts the session on the new task.
    pub fn drag_start(&mut self, task: &Task) -> DragTransfer {
        self.session = DragSession::Dragging {
            task_id: task.id.clone(),
            origin: task.status,
            highlight: None,
        };
        DragTransfer::new(&task.id)
    }

    /// Highlight `zone` as the active target, unless it matches the
    /// dragged task's origin (a task never targets its own column).
    /// Ignored when idle.
    pub fn drag_enter(&mut self, zone: Status) {
        if let DragSession::Dragging {
            origin, highlight, ..
        } = &mut self.session
        {
            if zone != *origin {
                *highlight = Some(zone);
            }
        }
    }

    /// Clear the highlight when the pointer genuinely leaves `zone`.
    ///
    /// Two conditions must hold: `zone` is the currently highlighted
    /// target, and `pointer` sits outside its registered bounds. A leave
    /// reported while the pointer is still inside the rectangle (crossing
    /// between cards within the column) is suppressed. Unregistered
    /// bounds count as outside.
    pub fn drag_leave(&mut self, zone: Status, pointer: (u16, u16)) {
        let inside = self
            .zones
            .get(zone)
            .map(|bounds| bounds.contains(pointer.0, pointer.1))
            .unwrap_or(false);
        if inside {
            return;
        }

        if let DragSession::Dragging { highlight, .. } = &mut self.session {
            if *highlight == Some(zone) {
                *highlight = None;
            }
        }
    }

    /// Finish the drag over `zone`.
    ///
    /// Resets to idle and yields the move command to apply through the
    /// store. The task id comes from the transfer payload when one
    /// arrived; otherwise the session-held id stands in.
    pub fn drop_on(&mut self, zone: Status, transfer: Option<&DragTransfer>) -> Option<DropOutcome> {
        let session = std::mem::take(&mut self.session);
        let DragSession::Dragging { task_id, .. } = session else {
            return None;
        };
        let task_id = transfer
            .map(|payload| payload.task_id().to_string())
            .unwrap_or(task_id);
        Some(DropOutcome {
            task_id,
            target: zone,
        })
    }

    /// Cancel the drag. Always resets to idle; never yields a move.
    pub fn drag_end(&mut self) {
        self.session = DragSession::Idle;
    }

    /// Whether a drag is active that could land on `zone` (renders the
    /// passive invitation).
    pub fn can_accept(&self, zone: Status) -> bool {
        matches!(&self.session, DragSession::Dragging { origin, .. } if *origin != zone)
    }

    /// Whether `zone` is the currently highlighted target (renders the
    /// emphasized overlay).
    pub fn is_highlighted(&self, zone: Status) -> bool {
        matches!(&self.session, DragSession::Dragging { highlight, .. } if *highlight == Some(zone))
    }
}
