//! Drawing cards and the status bar.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::grid::GridView;
use crate::model::BoundingBox;

use super::constants::{PX_PER_COLUMN, PX_PER_ROW};
use super::host::CardView;

/// Where a card lands on screen: its box shifted by the animation translate, scaled to
/// cells and clipped to `area`. `None` when nothing of it is visible.
pub fn card_rect(area: Rect, bbox: BoundingBox, card: &CardView) -> Option<Rect> {
    let translate = card.frame().translate;
    let x = ((bbox.x + translate.dx) / PX_PER_COLUMN).round() as i32;
    let y = ((bbox.y + translate.dy) / PX_PER_ROW).round() as i32;
    let width = (bbox.width / PX_PER_COLUMN).round().max(1.0) as i32;
    let height = (bbox.height / PX_PER_ROW).round().max(1.0) as i32;

    let left = i32::from(area.x) + x;
    let top = i32::from(area.y) + y;
    let right = (left + width).min(i32::from(area.right()));
    let bottom = (top + height).min(i32::from(area.bottom()));
    let left = left.max(i32::from(area.x));
    let top = top.max(i32::from(area.y));

    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect::new(
        left as u16,
        top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    ))
}

/// Cut `text` to at most `max_width` display columns, marking the cut with `…`.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Draw every card that is at least partly inside `area`.
pub fn render_cards<'a>(frame: &mut Frame, area: Rect, cards: impl IntoIterator<Item = &'a CardView>) {
    for card in cards {
        let Some(rect) = card_rect(area, card.bounding_box(), card) else {
            continue;
        };

        let style = if card.is_dimmed() {
            Style::default().add_modifier(Modifier::DIM)
        } else if card.context().first {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };

        let block = Block::bordered()
            .title(card.context().rank().to_string())
            .border_style(style);
        let inner = block.inner(rect);
        let text_width = usize::from(inner.width);

        let mut lines = vec![Line::from(Span::styled(
            truncate_to_width(card.title(), text_width),
            style.add_modifier(Modifier::BOLD),
        ))];
        if let Some(detail) = card.detail() {
            lines.push(Line::from(Span::styled(
                truncate_to_width(detail, text_width),
                style,
            )));
        }

        frame.render_widget(Paragraph::new(lines).block(block), rect);
    }
}

/// Everything the status bar shows.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusInfo {
    /// Visible item count.
    pub items: usize,
    /// Column count of the current geometry.
    pub columns: usize,
    /// Active sort, e.g. `weight:number ↓`.
    pub sort: Option<String>,
    /// Active filter value.
    pub filter: Option<String>,
    /// Pass phase, lowercase.
    pub phase: &'static str,
    /// Last error, if any.
    pub error: Option<String>,
}

/// Draw the one-line status bar.
pub fn render_status(frame: &mut Frame, area: Rect, info: &StatusInfo) {
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
        Span::raw(format!("{} items", info.items)),
        Span::styled("  ", dim),
        Span::raw(format!("{} cols", info.columns)),
        Span::styled("  sort:", dim),
        Span::raw(info.sort.clone().unwrap_or_else(|| "none".to_string())),
        Span::styled("  filter:", dim),
        Span::raw(info.filter.clone().unwrap_or_else(|| "all".to_string())),
        Span::styled("  ", dim),
        Span::styled(info.phase, Style::default().fg(Color::Yellow)),
    ];
    if let Some(error) = &info.error {
        spans.push(Span::styled(
            format!("  {error}"),
            Style::default().fg(Color::Red),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
