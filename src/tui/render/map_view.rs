use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as CanvasLine, Rectangle};

use crate::layout::{MapLayout, Point, compute_layout};
use crate::tui::app::App;
use crate::tui::theme::Theme;
use crate::util::unicode::truncate_to_width;
use crate::view::Viewport;

/// Segments per connector when approximating the curve with lines
const CURVE_STEPS: usize = 32;

/// Screen-space geometry shared by the paint closure
struct MapPainter<'a> {
    layout: &'a MapLayout<'a>,
    viewport: &'a Viewport,
    theme: &'a Theme,
    selected: Option<&'a str>,
    /// Connection being drawn, world start and end
    draft: Option<(Point, Point)>,
    /// Canvas height in virtual pixels; canvas y grows upward
    height: f64,
    cell_width: f64,
}

impl MapPainter<'_> {
    /// World point to canvas coordinates
    fn project(&self, world: Point) -> (f64, f64) {
        let s = self.viewport.to_screen(world);
        (s.x, self.height - s.y)
    }

    fn line(&self, ctx: &mut Context, from: Point, to: Point, color: Color) {
        let (x1, y1) = self.project(from);
        let (x2, y2) = self.project(to);
        ctx.draw(&CanvasLine { x1, y1, x2, y2, color });
    }

    fn paint(&self, ctx: &mut Context) {
        let scale = self.viewport.scale();
        let config = &self.layout.config;

        for curve in &self.layout.connectors {
            let color = self
                .theme
                .depth_color(curve.color_index(self.theme.depth_palette.len()));
            let points = curve.path.sample(CURVE_STEPS);
            for pair in points.windows(2) {
                self.line(ctx, pair[0], pair[1], color);
            }
        }
        ctx.layer();

        for pos in &self.layout.positions {
            let rect = pos.rect(config);
            let is_selected = self.selected == Some(pos.id());
            let color = if is_selected {
                self.theme.highlight
            } else if pos.task.completed {
                self.theme.dim
            } else {
                self.theme.node
            };
            let (x, top) = self.project(Point::new(rect.x, rect.y));
            ctx.draw(&Rectangle {
                x,
                y: top - rect.height * scale,
                width: rect.width * scale,
                height: rect.height * scale,
                color,
            });

            let (hx, hy) = self.project(rect.right_mid());
            ctx.draw(&Circle {
                x: hx,
                y: hy,
                radius: config.handle_radius * scale,
                color,
            });

            let cells = (rect.width * scale / self.cell_width) - 2.0;
            if cells >= 1.0 {
                let mut style = Style::default().fg(self.theme.text_bright);
                if pos.task.completed {
                    style = style.fg(self.theme.dim).add_modifier(Modifier::CROSSED_OUT);
                } else if is_selected {
                    style = style.fg(self.theme.highlight).add_modifier(Modifier::BOLD);
                }
                let (lx, ly) = self.project(Point::new(rect.x, rect.y + rect.height / 2.0));
                ctx.print(
                    lx + self.cell_width,
                    ly,
                    Span::styled(truncate_to_width(&pos.task.title, cells as usize), style),
                );
            }
        }

        if let Some((start, end)) = self.draft {
            ctx.layer();
            self.line(ctx, start, end, self.theme.highlight);
        }
    }
}

/// Render the mindmap on a braille canvas. Records the drawing area so
/// mouse input can be mapped back to virtual pixels.
pub fn render_map_view(frame: &mut Frame, app: &mut App, area: Rect) {
    app.map_area = area;
    app.auto_fit();

    if app.store.tree.is_empty() {
        let empty = Paragraph::new(" Empty map (tm add <title>)")
            .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
        frame.render_widget(empty, area);
        return;
    }

    let size = app.viewport_size();
    let layout = compute_layout(&app.store.tree, &app.store.config.layout);
    let painter = MapPainter {
        layout: &layout,
        viewport: &app.viewport,
        theme: &app.theme,
        selected: app.selected.as_deref(),
        draft: app.interaction.draft().map(|d| (d.start, d.end)),
        height: size.height,
        cell_width: app.store.config.ui.cell_width,
    };

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .background_color(app.theme.background)
        .x_bounds([0.0, size.width])
        .y_bounds([0.0, size.height])
        .paint(|ctx| painter.paint(ctx));
    frame.render_widget(canvas, area);
}
