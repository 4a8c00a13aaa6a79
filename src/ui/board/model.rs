//! Pure cursor and layout math for the board.
//!
//! Cards render at a fixed height, so pointer hit-testing and scroll
//! windows reduce to index arithmetic.

use crate::drag::ZoneRect;

/// Rendered height of one task card, borders included.
pub const CARD_HEIGHT: u16 = 4;

/// Clamp a remembered cursor onto a column that may have shrunk.
pub fn clamp_cursor(len: usize, cursor: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(cursor.min(len - 1))
    }
}

/// Move the cursor by `delta` card positions, clamped to the column.
pub fn step(len: usize, cursor: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let max = (len - 1) as isize;
    (cursor as isize + delta).clamp(0, max) as usize
}

/// Scroll window over `len` cards keeping `selected` visible within
/// `rows` card slots. Returns a half-open index range.
pub fn visible_window(len: usize, selected: Option<usize>, rows: usize) -> (usize, usize) {
    if len == 0 || rows == 0 {
        return (0, 0);
    }
    if len <= rows {
        return (0, len);
    }
    let selected = selected.unwrap_or(0).min(len - 1);
    let mut start = selected.saturating_sub(rows / 2);
    if start + rows > len {
        start = len - rows;
    }
    (start, start + rows)
}

/// How many whole cards fit in a column's content area.
pub fn rows_in(content: ZoneRect) -> usize {
    (content.height / CARD_HEIGHT) as usize
}

/// Content area of a column, inside its one-cell border.
pub fn content_area(zone: ZoneRect) -> ZoneRect {
    ZoneRect::new(
        zone.x.saturating_add(1),
        zone.y.saturating_add(1),
        zone.width.saturating_sub(2),
        zone.height.saturating_sub(2),
    )
}

/// Map a pointer row inside a column's content area to the card index
/// under it, given the window of card indices currently drawn.
pub fn card_at(content: ZoneRect, window: (usize, usize), x: u16, y: u16) -> Option<usize> {
    if !content.contains(x, y) {
        return None;
    }
    let offset = (y - content.y) / CARD_HEIGHT;
    let index = window.0 + offset as usize;
    if index < window.1 {
        Some(index)
    } else {
        None
    }
}
