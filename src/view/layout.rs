//! Board rendering: columns of cards and placeholders plus a status bar.

use super::board::{column_areas, Board};
use super::card::{truncate_to_width, Card};
use super::constants::{ROW_PX, STATUS_BAR_HEIGHT};
use super::styles::BoardStyles;
use crate::cell::{CellMode, DeferredContentCell};
use crate::list::DeferredList;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use ratatui::Frame;

/// Split the frame into board and status bar.
pub fn split_frame(area: Rect) -> (Rect, Rect) {
    let [board, status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)]).areas(area);
    (board, status)
}

/// Render the whole board.
pub fn render_board(frame: &mut Frame, board: &Board, styles: &BoardStyles) {
    let (board_area, status_area) = split_frame(frame.area());

    for (index, (list, area)) in board
        .columns()
        .iter()
        .zip(column_areas(board_area, board.columns().len()))
        .enumerate()
    {
        render_column(frame, list, area, index, index == board.focus(), styles);
    }

    let status = truncate_to_width(&board.status(), usize::from(status_area.width));
    frame.render_widget(Paragraph::new(status).style(styles.status), status_area);
}

fn render_column(
    frame: &mut Frame,
    list: &DeferredList<Card>,
    area: Rect,
    index: usize,
    focused: bool,
    styles: &BoardStyles,
) {
    let border_style = if focused {
        styles.focused_column
    } else {
        styles.column
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" column {} ", index + 1));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    for cell in list.cells() {
        let Some(rect) = cell.element().and_then(|e| list.surface().element_rect(e)) else {
            continue;
        };
        let Some(target) = rows_for(rect.top, rect.bottom(), inner) else {
            continue;
        };
        frame.render_widget(Clear, target);
        match cell.mode() {
            CellMode::Placeholder => render_placeholder(frame, cell, target, styles),
            CellMode::Content => render_card(frame, cell.content(), target, styles),
        }
    }
}

/// Terminal rows covered by a pixel span, clipped to `inner`.
fn rows_for(top: f64, bottom: f64, inner: Rect) -> Option<Rect> {
    let viewport = f64::from(inner.height) * ROW_PX;
    if bottom <= 0.0 || top >= viewport || bottom <= top {
        return None;
    }
    let first = (top.max(0.0) / ROW_PX).floor() as u16;
    let last = (bottom.min(viewport) / ROW_PX).ceil() as u16;
    let height = last.saturating_sub(first).min(inner.height.saturating_sub(first));
    (height > 0).then(|| Rect::new(inner.x, inner.y + first, inner.width, height))
}

fn render_placeholder(
    frame: &mut Frame,
    cell: &DeferredContentCell<Card>,
    area: Rect,
    styles: &BoardStyles,
) {
    let label = truncate_to_width(
        &format!("· {} ·", cell.dimensions()),
        usize::from(area.width),
    );
    let line = Line::from(Span::styled(label, styles.placeholder)).centered();
    frame.render_widget(Paragraph::new(line).style(styles.placeholder), area);
}

fn render_card(frame: &mut Frame, card: &Card, area: Rect, styles: &BoardStyles) {
    let title_width = usize::from(area.width.saturating_sub(4));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles.card_border)
        .title(Span::styled(
            truncate_to_width(&card.title, title_width),
            styles.card_title,
        ));
    let body: Vec<Line> = card
        .body
        .iter()
        .map(|line| Line::from(line.as_str()))
        .collect();
    frame.render_widget(Paragraph::new(body).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inner() -> Rect {
        Rect::new(1, 1, 30, 10)
    }

    #[test]
    fn rows_for_maps_pixels_to_rows() {
        assert_eq!(rows_for(0.0, 60.0, inner()), Some(Rect::new(1, 1, 30, 3)));
        assert_eq!(rows_for(40.0, 100.0, inner()), Some(Rect::new(1, 3, 30, 3)));
    }

    #[test]
    fn rows_for_clips_to_viewport() {
        assert_eq!(rows_for(-50.0, 30.0, inner()), Some(Rect::new(1, 1, 30, 2)));
        assert_eq!(rows_for(180.0, 400.0, inner()), Some(Rect::new(1, 10, 30, 1)));
    }

    #[test]
    fn rows_for_skips_offscreen_spans() {
        assert_eq!(rows_for(-100.0, 0.0, inner()), None);
        assert_eq!(rows_for(200.0, 260.0, inner()), None);
        assert_eq!(rows_for(50.0, 50.0, inner()), None);
    }
}
