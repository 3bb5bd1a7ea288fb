use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, View};
use crate::util::unicode::{display_width, truncate_to_width};

const MAP_HINTS: &str = "drag pan  scroll zoom  f fit  Tab list  q quit";
const LIST_HINTS: &str = "space fold  x done  t timer  Tab map  q quit";

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut left = format!(" {}", app.view.as_str());
    if app.view == View::Map {
        left.push_str(&format!(" {:.0}%", app.viewport.scale() * 100.0));
    }
    if let Some(id) = &app.selected {
        left.push_str(&format!("  {}", id));
    }
    let mut spans = vec![Span::styled(left, Style::default().fg(app.theme.dim).bg(bg))];

    if let Some(draft) = app.interaction.draft() {
        spans.push(Span::styled(
            format!("  {} \u{2192} ?", draft.source_id),
            Style::default().fg(app.theme.highlight).bg(bg),
        ));
    } else if let Some(message) = &app.message {
        let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
        let room = width.saturating_sub(used + 2);
        spans.push(Span::styled(
            format!("  {}", truncate_to_width(message, room)),
            Style::default().fg(app.theme.yellow).bg(bg),
        ));
    }

    let hint = match app.view {
        View::Map => MAP_HINTS,
        View::List => LIST_HINTS,
    };
    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(hint) + 1;
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(
            format!("{} ", hint),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
