//! Rendering for the board: header, the two columns with their cards,
//! the footer, and the new-task modal.

use chrono::{DateTime, Utc};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::drag::{DragController, ZoneRect};
use crate::task::{Status, Task};

use super::app::{AppState, StatusKind};
use super::editor::EditorState;
use super::model::{self, CARD_HEIGHT};

const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_FORM: Color = Color::Rgb(180, 156, 92);

pub fn render(frame: &mut Frame, app: &mut AppState) {
    let area = frame.size();
    let narrow = app.is_narrow();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    render_header(frame, chunks[0], app.store.len());

    let (todo_area, done_area) = split_columns(chunks[1], narrow);

    let AppState {
        store,
        drag,
        focus,
        cursor,
        todo_window,
        done_window,
        ..
    } = app;
    let focus = *focus;
    let cursor = *cursor;
    let partition = store.partition();
    *todo_window = render_column(
        frame,
        todo_area,
        Status::Todo,
        &partition.todo,
        drag,
        focus,
        cursor,
    );
    *done_window = render_column(
        frame,
        done_area,
        Status::Done,
        &partition.done,
        drag,
        focus,
        cursor,
    );

    render_footer(frame, app, chunks[2]);

    if let Some(editor) = app.editor.as_ref() {
        render_editor_modal(frame, area, editor);
    }
}

fn render_header(frame: &mut Frame, area: Rect, total: usize) {
    let line = Line::from(vec![
        Span::styled(
            "To-Do App",
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {total} task(s)"),
            Style::default().fg(COLOR_MUTED_DARK),
        ),
    ]);
    let widget = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn split_columns(area: Rect, narrow: bool) -> (Rect, Rect) {
    let direction = if narrow {
        Direction::Vertical
    } else {
        Direction::Horizontal
    };
    let parts = Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);
    (parts[0], parts[1])
}

/// Draw one column and report the card window it showed, so pointer
/// hits can be mapped back to task indices.
fn render_column(
    frame: &mut Frame,
    area: Rect,
    status: Status,
    tasks: &[Task],
    drag: &mut DragController,
    focus: Status,
    cursor: usize,
) -> (usize, usize) {
    drag.set_zone_bounds(status, zone_from(area));

    let focused = focus == status;
    let highlighted = drag.is_highlighted(status);
    let inviting = drag.can_accept(status) && !highlighted;

    let border_style = if highlighted {
        Style::default()
            .fg(COLOR_SUCCESS)
            .add_modifier(Modifier::BOLD)
    } else if inviting {
        Style::default().fg(COLOR_ACCENT)
    } else if focused {
        Style::default()
            .fg(COLOR_BORDER)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_BG_MUTED)
    };

    let title = format!(" {} ({}) ", column_title(status), tasks.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            title,
            Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if highlighted {
        render_drop_overlay(frame, inner);
        return (0, 0);
    }

    if tasks.is_empty() {
        let message = match status {
            Status::Todo => "Please Add a To-Do",
            Status::Done => "Empty",
        };
        let widget = Paragraph::new(message)
            .style(Style::default().fg(COLOR_MUTED))
            .alignment(Alignment::Center);
        frame.render_widget(widget, center_line(inner));
        return (0, 0);
    }

    let rows = model::rows_in(zone_from(inner));
    let selected = if focused {
        model::clamp_cursor(tasks.len(), cursor)
    } else {
        None
    };
    let window = model::visible_window(tasks.len(), selected, rows);
    let dragging_id = drag.dragging_id().map(str::to_string);

    for (slot, index) in (window.0..window.1).enumerate() {
        let Some(task) = tasks.get(index) else {
            break;
        };
        let card_area = Rect::new(
            inner.x,
            inner.y + (slot as u16) * CARD_HEIGHT,
            inner.width,
            CARD_HEIGHT,
        );
        let dragging = dragging_id.as_deref() == Some(task.id.as_str());
        render_card(frame, card_area, task, selected == Some(index), dragging);
    }

    window
}

fn render_card(frame: &mut Frame, area: Rect, task: &Task, selected: bool, dragging: bool) {
    let border_style = if selected {
        Style::default()
            .fg(COLOR_ACCENT)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_MUTED_DARK)
    };

    let mut title_style = Style::default().fg(COLOR_TEXT);
    if task.status == Status::Done {
        title_style = Style::default()
            .fg(COLOR_MUTED)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    if dragging {
        title_style = title_style.add_modifier(Modifier::DIM);
    }

    let width = area.width.saturating_sub(2) as usize;
    let detail = if task.note.is_empty() {
        Span::styled(
            format_timestamp(task.created_at),
            Style::default().fg(COLOR_MUTED_DARK),
        )
    } else {
        Span::styled(
            truncate_text(&task.note, width),
            Style::default().fg(COLOR_MUTED),
        )
    };

    let lines = vec![
        Line::from(Span::styled(truncate_text(&task.title, width), title_style)),
        Line::from(detail),
    ];
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(widget, area);
}

fn render_drop_overlay(frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);
    let widget = Paragraph::new(Line::from(Span::styled(
        "Drop here",
        Style::default()
            .fg(COLOR_SUCCESS)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(widget, center_line(area));
}

fn render_footer(frame: &mut Frame, app: &mut AppState, area: Rect) {
    let hint = app.footer_hint();
    let hint_span = Span::styled(hint, Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status, status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let counts_line = Line::from(Span::styled(
        app.task_count_summary(),
        Style::default().fg(COLOR_ACCENT),
    ));
    let widget = Paragraph::new(vec![line, counts_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER)),
        );
    frame.render_widget(widget, area);
}

fn render_editor_modal(frame: &mut Frame, area: Rect, editor: &EditorState) {
    let width = area.width.saturating_sub(8).min(56);
    let modal = centered_rect(width, 9, area);
    frame.render_widget(Clear, modal);

    let value_width = modal.width.saturating_sub(12) as usize;
    let mut lines: Vec<Line<'static>> = vec![Line::from("")];
    for (index, field) in editor.fields().iter().enumerate() {
        let active = index == editor.active_index();
        let label_style = if active {
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_MUTED_DARK)
        };
        let mut spans = vec![
            Span::styled(format!(" {:<6} ", field.label), label_style),
            Span::styled(
                tail_text(&field.value, value_width),
                Style::default().fg(COLOR_TEXT),
            ),
        ];
        if active {
            spans.push(Span::styled(
                " ",
                Style::default().add_modifier(Modifier::REVERSED),
            ));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    if let Some(error) = editor.error() {
        lines.push(Line::from(Span::styled(
            format!(" {error}"),
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            " enter save  tab field  esc cancel",
            Style::default().fg(COLOR_MUTED_DARK),
        )));
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER_FORM))
            .title(Span::styled(
                " New Task ",
                Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
            )),
    );
    frame.render_widget(widget, modal);
}

fn column_title(status: Status) -> &'static str {
    match status {
        Status::Todo => "To-Do",
        Status::Done => "Done",
    }
}

fn zone_from(area: Rect) -> ZoneRect {
    ZoneRect::new(area.x, area.y, area.width, area.height)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn center_line(area: Rect) -> Rect {
    if area.height == 0 {
        return area;
    }
    Rect::new(area.x, area.y + area.height / 2, area.width, 1)
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

/// Keep the tail of an input value visible while typing.
fn tail_text(value: &str, max: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    chars[chars.len() - max..].iter().collect()
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}
