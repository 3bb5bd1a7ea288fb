use serde::Serialize;

/// A point in either world (layout) or screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Axis-aligned rectangle, `y` grows downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn right_mid(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height / 2.0)
    }

    pub fn left_mid(&self) -> Point {
        Point::new(self.x, self.y + self.height / 2.0)
    }
}

/// Cubic Bézier segment: start, two control points, end
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CubicBezier {
    pub start: Point,
    pub c1: Point,
    pub c2: Point,
    pub end: Point,
}

impl CubicBezier {
    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let a = u * u * u;
        let b = 3.0 * u * u * t;
        let c = 3.0 * u * t * t;
        let d = t * t * t;
        Point::new(
            a * self.start.x + b * self.c1.x + c * self.c2.x + d * self.end.x,
            a * self.start.y + b * self.c1.y + c * self.c2.y + d * self.end.y,
        )
    }

    /// Polyline approximation with `steps` segments (`steps + 1` points)
    pub fn sample(&self, steps: usize) -> Vec<Point> {
        let steps = steps.max(1);
        (0..=steps)
            .map(|i| self.point_at(i as f64 / steps as f64))
            .collect()
    }

    /// SVG path data, e.g. `M 0 0 C 40 0, 60 80, 100 80`
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            fmt_num(self.start.x),
            fmt_num(self.start.y),
            fmt_num(self.c1.x),
            fmt_num(self.c1.y),
            fmt_num(self.c2.x),
            fmt_num(self.c2.y),
            fmt_num(self.end.x),
            fmt_num(self.end.y),
        )
    }

    /// Squared distance from `p` to the sampled curve
    pub fn distance_sq_to(&self, p: Point, steps: usize) -> f64 {
        self.sample(steps)
            .windows(2)
            .map(|seg| distance_sq_point_segment(p, seg[0], seg[1]))
            .fold(f64::INFINITY, f64::min)
    }
}

fn distance_sq_point_segment(p: Point, a: Point, b: Point) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq <= f64::EPSILON {
        return p.distance_sq(a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    p.distance_sq(Point::new(a.x + abx * t, a.y + aby * t))
}

/// Format a coordinate with at most two decimals and no trailing zeros
pub fn fmt_num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight() -> CubicBezier {
        CubicBezier {
            start: Point::new(0.0, 0.0),
            c1: Point::new(10.0, 0.0),
            c2: Point::new(20.0, 0.0),
            end: Point::new(30.0, 0.0),
        }
    }

    #[test]
    fn bezier_endpoints() {
        let b = straight();
        assert_eq!(b.point_at(0.0), b.start);
        assert_eq!(b.point_at(1.0), b.end);
        let pts = b.sample(10);
        assert_eq!(pts.len(), 11);
        assert_eq!(pts[10], b.end);
    }

    #[test]
    fn distance_to_straight_curve() {
        let b = straight();
        assert!((b.distance_sq_to(Point::new(15.0, 4.0), 12) - 16.0).abs() < 1e-9);
        assert!((b.distance_sq_to(Point::new(-3.0, 0.0), 12) - 9.0).abs() < 1e-9);
    }

    #[test]
    fn rect_contains_edges() {
        let r = Rect {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 10.0,
        };
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(30.0, 20.0)));
        assert!(!r.contains(Point::new(30.1, 15.0)));
        assert_eq!(r.right_mid(), Point::new(30.0, 15.0));
        assert_eq!(r.left_mid(), Point::new(10.0, 15.0));
    }

    #[test]
    fn svg_path_formatting() {
        assert_eq!(straight().to_svg_path(), "M 0 0 C 10 0, 20 0, 30 0");
        assert_eq!(fmt_num(12.5), "12.5");
        assert_eq!(fmt_num(-0.001), "0");
        assert_eq!(fmt_num(1.0 / 3.0), "0.33");
    }
}
