use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::{CanvasBounds, Point};
use crate::model::ViewportConfig;

/// World → screen affine transform: `screen = world * scale + translate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl ViewportTransform {
    pub fn to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.scale + self.translate_x,
            world.y * self.scale + self.translate_y,
        )
    }

    pub fn to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.translate_x) / self.scale,
            (screen.y - self.translate_y) / self.scale,
        )
    }
}

/// Pixel size of the surface the map is drawn into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

/// Owns the pan/zoom transform. The transform survives layout recomputes;
/// only gestures, `fit_to_view` and `reset` change it.
#[derive(Debug, Clone)]
pub struct Viewport {
    transform: ViewportTransform,
    config: ViewportConfig,
    /// Set once the first non-degenerate layout has been fitted
    fitted: bool,
}

impl Viewport {
    pub fn new(config: ViewportConfig) -> Self {
        Viewport {
            transform: default_transform(&config),
            config,
            fitted: false,
        }
    }

    /// Start from a saved transform; a restored view never auto-fits
    pub fn restored(config: ViewportConfig, transform: ViewportTransform) -> Self {
        let mut viewport = Viewport::new(config);
        viewport.transform = ViewportTransform {
            scale: viewport.clamp_scale(transform.scale),
            ..transform
        };
        viewport.fitted = true;
        viewport
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    pub fn has_fitted(&self) -> bool {
        self.fitted
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.config.min_scale, self.config.max_scale)
    }

    /// Zoom by `delta` wheel units keeping the world point under `cursor`
    /// fixed on screen. Positive `delta` zooms in.
    pub fn zoom_at(&mut self, delta: f64, cursor: Point) {
        let old = self.transform.scale;
        let new = self.clamp_scale(old + delta * self.config.zoom_sensitivity);
        if new == old {
            return;
        }
        let ratio = new / old;
        self.transform = ViewportTransform {
            translate_x: cursor.x - (cursor.x - self.transform.translate_x) * ratio,
            translate_y: cursor.y - (cursor.y - self.transform.translate_y) * ratio,
            scale: new,
        };
    }

    /// Shift the view by a raw pointer delta in screen pixels
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.transform.translate_x += dx;
        self.transform.translate_y += dy;
    }

    /// Scale the whole canvas into the viewport (with margin) and center it.
    /// Falls back to the default transform when there is nothing to fit.
    pub fn fit_to_view(&mut self, bounds: CanvasBounds, size: ViewportSize) {
        if bounds.is_degenerate() || size.width <= 0.0 || size.height <= 0.0 {
            self.reset();
            return;
        }
        let raw = (size.width / bounds.width).min(size.height / bounds.height) * self.config.fit_margin;
        let scale = self.clamp_scale(raw);
        self.transform = ViewportTransform {
            translate_x: (size.width - bounds.width * scale) / 2.0,
            translate_y: (size.height - bounds.height * scale) / 2.0,
            scale,
        };
        debug!(scale, "fit to view");
    }

    /// Fit only if this is the first layout with something to show.
    /// Returns whether a fit happened.
    pub fn auto_fit(&mut self, bounds: CanvasBounds, size: ViewportSize) -> bool {
        if self.fitted || bounds.is_degenerate() || size.width <= 0.0 || size.height <= 0.0 {
            return false;
        }
        self.fit_to_view(bounds, size);
        self.fitted = true;
        true
    }

    pub fn reset(&mut self) {
        self.transform = default_transform(&self.config);
    }

    pub fn to_world(&self, screen: Point) -> Point {
        self.transform.to_world(screen)
    }

    pub fn to_screen(&self, world: Point) -> Point {
        self.transform.to_screen(world)
    }
}

fn default_transform(config: &ViewportConfig) -> ViewportTransform {
    ViewportTransform {
        translate_x: config.default_translate_x,
        translate_y: config.default_translate_y,
        scale: config.default_scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn viewport() -> Viewport {
        Viewport::new(ViewportConfig::default())
    }

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn starts_at_default_transform() {
        let vp = viewport();
        assert_eq!(
            vp.transform(),
            ViewportTransform {
                translate_x: 50.0,
                translate_y: 50.0,
                scale: 1.0
            }
        );
        assert!(!vp.has_fitted());
    }

    #[test]
    fn zoom_keeps_cursor_anchored() {
        let mut vp = viewport();
        vp.pan(-37.0, 12.5);
        for (delta, cursor) in [
            (250.0, Point::new(400.0, 300.0)),
            (-600.0, Point::new(13.0, 700.0)),
            (100.0, Point::new(0.0, 0.0)),
        ] {
            let before = vp.to_world(cursor);
            vp.zoom_at(delta, cursor);
            let after = vp.to_world(cursor);
            assert!(close(before, after), "{:?} != {:?}", before, after);
        }
    }

    #[test]
    fn zoom_clamps_scale() {
        let mut vp = viewport();
        vp.zoom_at(100_000.0, Point::new(10.0, 10.0));
        assert_eq!(vp.scale(), 2.0);
        vp.zoom_at(-100_000.0, Point::new(10.0, 10.0));
        assert_eq!(vp.scale(), 0.2);

        // Already at the bound: nothing moves
        let before = vp.transform();
        vp.zoom_at(-50.0, Point::new(300.0, 300.0));
        assert_eq!(vp.transform(), before);
    }

    #[test]
    fn zoom_step_matches_sensitivity() {
        let mut vp = viewport();
        vp.zoom_at(100.0, Point::new(50.0, 50.0));
        assert!((vp.scale() - 1.1).abs() < EPS);
        // Cursor on the translate origin: translate does not move
        assert!((vp.transform().translate_x - 50.0).abs() < EPS);
    }

    #[test]
    fn pan_adds_raw_delta() {
        let mut vp = viewport();
        vp.pan(10.0, -5.0);
        vp.pan(2.5, 0.0);
        assert_eq!(vp.transform().translate_x, 62.5);
        assert_eq!(vp.transform().translate_y, 45.0);
        assert_eq!(vp.scale(), 1.0);
    }

    #[test]
    fn fit_centers_canvas() {
        let mut vp = viewport();
        let bounds = CanvasBounds {
            width: 500.0,
            height: 140.0,
        };
        let size = ViewportSize {
            width: 800.0,
            height: 600.0,
        };
        vp.fit_to_view(bounds, size);
        // min(800/500, 600/140) * 0.9 = 1.44
        assert!((vp.scale() - 1.44).abs() < EPS);

        let top_left = vp.to_screen(Point::new(0.0, 0.0));
        let bottom_right = vp.to_screen(Point::new(bounds.width, bounds.height));
        let center = Point::new((top_left.x + bottom_right.x) / 2.0, (top_left.y + bottom_right.y) / 2.0);
        assert!(close(center, Point::new(400.0, 300.0)));
        // Limiting dimension fills 90%
        assert!((bottom_right.x - top_left.x - 720.0).abs() < EPS);
    }

    #[test]
    fn fit_respects_max_scale() {
        let mut vp = viewport();
        vp.fit_to_view(
            CanvasBounds {
                width: 100.0,
                height: 50.0,
            },
            ViewportSize {
                width: 1000.0,
                height: 1000.0,
            },
        );
        assert_eq!(vp.scale(), 2.0);
        assert_eq!(vp.transform().translate_x, 400.0);
        assert_eq!(vp.transform().translate_y, 450.0);
    }

    #[test]
    fn fit_on_degenerate_canvas_resets() {
        let mut vp = viewport();
        vp.zoom_at(300.0, Point::new(1.0, 2.0));
        vp.fit_to_view(
            CanvasBounds::default(),
            ViewportSize {
                width: 800.0,
                height: 600.0,
            },
        );
        assert_eq!(vp.transform(), viewport().transform());
    }

    #[test]
    fn auto_fit_runs_once() {
        let mut vp = viewport();
        let size = ViewportSize {
            width: 800.0,
            height: 600.0,
        };
        assert!(!vp.auto_fit(CanvasBounds::default(), size));
        assert!(!vp.has_fitted());

        let bounds = CanvasBounds {
            width: 500.0,
            height: 140.0,
        };
        assert!(vp.auto_fit(bounds, size));
        vp.pan(30.0, 0.0);
        let panned = vp.transform();
        assert!(!vp.auto_fit(bounds, size));
        assert_eq!(vp.transform(), panned);
    }

    #[test]
    fn restored_viewport_never_auto_fits() {
        let saved = ViewportTransform {
            translate_x: -20.0,
            translate_y: 4.0,
            scale: 9.0,
        };
        let mut vp = Viewport::restored(ViewportConfig::default(), saved);
        assert_eq!(vp.scale(), 2.0);
        assert!(!vp.auto_fit(
            CanvasBounds {
                width: 10.0,
                height: 10.0
            },
            ViewportSize {
                width: 100.0,
                height: 100.0
            }
        ));
    }
}
