use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::outline;
use crate::ops::timer_ops::format_remaining;
use crate::tui::app::App;
use crate::util::unicode;

/// Render the tree as an indented list with the selection highlighted
pub fn render_list_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;
    let rows = outline::flatten(&app.store.tree, false);

    if rows.is_empty() {
        let empty = Paragraph::new(" No tasks (tm add <title>)")
            .style(Style::default().fg(theme.dim).bg(theme.background));
        frame.render_widget(empty, area);
        return;
    }

    let cursor = app
        .selected
        .as_deref()
        .and_then(|id| outline::row_index(&rows, id));
    let w = area.width as usize;
    let mut lines: Vec<Line> = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let task = row.task;
        let is_cursor = cursor == Some(i);
        let bg = if is_cursor { theme.selection_bg } else { theme.background };
        let mut spans: Vec<Span> = Vec::new();

        // Column 0 reservation
        if is_cursor {
            spans.push(Span::styled(
                "\u{258E}",
                Style::default().fg(theme.highlight).bg(bg),
            ));
        } else {
            spans.push(Span::styled(" ", Style::default().bg(bg)));
        }

        spans.push(Span::styled(row.guide.clone(), Style::default().fg(theme.dim).bg(bg)));

        let (check, check_color) = if task.completed {
            ("[x] ", theme.green)
        } else {
            ("[ ] ", theme.text)
        };
        spans.push(Span::styled(check, Style::default().fg(check_color).bg(bg)));
        spans.push(Span::styled(
            format!("{} ", task.id),
            Style::default().fg(theme.dim).bg(bg),
        ));

        // Right side: fold count and timer
        let fold = if row.folded {
            format!(" [+{}]", task.children.len())
        } else {
            String::new()
        };
        let timer = task.timer.map(|t| {
            let style = if t.running {
                Style::default().fg(theme.yellow).bg(bg)
            } else {
                Style::default().fg(theme.dim).bg(bg)
            };
            let glyph = if t.running { " \u{25B6}" } else { "" };
            (format!("{}{}", format_remaining(t.remaining_secs), glyph), style)
        });
        let timer_width = timer.as_ref().map_or(0, |(s, _)| unicode::display_width(s) + 1);

        let prefix_width: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
        let available = w.saturating_sub(prefix_width + unicode::display_width(&fold) + timer_width + 1);
        let mut title_style = Style::default().fg(theme.text_bright).bg(bg);
        if task.completed {
            title_style = Style::default()
                .fg(theme.dim)
                .bg(bg)
                .add_modifier(Modifier::CROSSED_OUT);
        } else if is_cursor {
            title_style = title_style.add_modifier(Modifier::BOLD);
        }
        spans.push(Span::styled(
            unicode::truncate_to_width(&task.title, available),
            title_style,
        ));
        if !fold.is_empty() {
            spans.push(Span::styled(fold, Style::default().fg(theme.dim).bg(bg)));
        }

        if let Some((text, style)) = timer {
            let content_width: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
            let start = w.saturating_sub(unicode::display_width(&text) + 1);
            if content_width < start {
                spans.push(Span::styled(" ".repeat(start - content_width), Style::default().bg(bg)));
            }
            spans.push(Span::styled(text, style));
        }

        // Fill the rest of the row so the selection band spans the width
        let final_width: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
        if final_width < w {
            spans.push(Span::styled(" ".repeat(w - final_width), Style::default().bg(bg)));
        }
        lines.push(Line::from(spans));
    }

    // Auto-adjust scroll to keep cursor visible
    let visible_height = area.height as usize;
    let mut scroll = app.list_scroll.min(lines.len().saturating_sub(1));
    if let Some(cl) = cursor {
        if cl < scroll {
            scroll = cl;
        } else if cl >= scroll + visible_height {
            scroll = cl.saturating_sub(visible_height.saturating_sub(1));
        }
    }

    let visible: Vec<Line> = lines.into_iter().skip(scroll).take(visible_height).collect();
    let paragraph = Paragraph::new(visible).style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, area);
    app.list_scroll = scroll;
}
