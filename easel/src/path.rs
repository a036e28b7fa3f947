//! Bezier paths and the primitive shapes that build them.

use std::f64::consts::PI;

use kurbo::{Arc, BezPath, PathEl, Point, Rect, Shape, Vec2};

// Distance from an endpoint to its control point when approximating a
// quarter circle with one cubic.
const KAPPA: f64 = 0.5519150244935105;

// Tolerance used when flattening arcs into cubic segments.
const ARC_TOLERANCE: f64 = 0.01;

/// Winding direction for arcs and curved lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Cw,
    Ccw,
}

/// The angular extent of a partial oval or arc, in degrees from 3 o'clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArcRange {
    /// From 0° to the given angle.
    To(f64),
    /// From a start angle to a stop angle.
    Between(f64, f64),
}

impl ArcRange {
    fn endpoints(self) -> (f64, f64) {
        match self {
            ArcRange::To(stop) => (0.0, stop),
            ArcRange::Between(start, stop) => (start, stop),
        }
    }
}

/// Options for drawing only a section of an oval or arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcSlice {
    pub range: ArcRange,
    pub direction: Direction,
    /// Close the open section: a chord for ovals, a pie slice for arcs.
    pub close: bool,
}

impl ArcSlice {
    pub fn new(range: ArcRange) -> ArcSlice {
        ArcSlice {
            range,
            direction: Direction::Cw,
            close: false,
        }
    }

    pub fn ccw(mut self) -> ArcSlice {
        self.direction = Direction::Ccw;
        self
    }

    pub fn closed(mut self) -> ArcSlice {
        self.close = true;
        self
    }
}

/// Corner treatment for rectangles.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RectCorners {
    #[default]
    Sharp,
    /// Size-relative rounding from 0.0 (sharp) to 1.0 (maximally round,
    /// radius `min(w, h) / 2`). Corners stay circular at every size.
    Roundness(f64),
    /// Explicit per-axis corner radii in canvas units.
    Radius(f64, f64),
}

/// The two classic arrow geometries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArrowStyle {
    #[default]
    Normal,
    FortyFive,
}

/// A mutable sequence of path elements.
///
/// This is the unit of geometry for every path-shaped grob: the active-path
/// builder appends into one, the primitive commands construct one, and the
/// renderer consumes one. Multiple subpaths (contours) are allowed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BezierPath {
    elements: Vec<PathEl>,
}

impl BezierPath {
    pub fn new() -> BezierPath {
        BezierPath::default()
    }

    /// Build a polyline (optionally closed) through the given points.
    pub fn from_points(points: &[(f64, f64)], close: bool) -> BezierPath {
        let mut path = BezierPath::new();
        let mut iter = points.iter();
        if let Some(&(x, y)) = iter.next() {
            path.move_to(x, y);
            for &(x, y) in iter {
                path.line_to(x, y);
            }
            if close {
                path.close_path();
            }
        }
        path
    }

    pub fn elements(&self) -> &[PathEl] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The endpoint of the last element, if any.
    ///
    /// A trailing `ClosePath` yields the start of the subpath it closed.
    pub fn current_point(&self) -> Option<Point> {
        let mut current = None;
        let mut subpath_start = None;
        for el in &self.elements {
            match *el {
                PathEl::MoveTo(p) => {
                    subpath_start = Some(p);
                    current = Some(p);
                }
                PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
                    current = Some(p);
                }
                PathEl::ClosePath => current = subpath_start,
            }
        }
        current
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.elements.push(PathEl::MoveTo(Point::new(x, y)));
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.elements.push(PathEl::LineTo(Point::new(x, y)));
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.elements.push(PathEl::CurveTo(
            Point::new(x1, y1),
            Point::new(x2, y2),
            Point::new(x3, y3),
        ));
    }

    pub fn close_path(&mut self) {
        self.elements.push(PathEl::ClosePath);
    }

    /// Append another path's contours to this one.
    pub fn extend(&mut self, other: &BezierPath) {
        self.elements.extend_from_slice(&other.elements);
    }

    /// Convert into a [`kurbo::BezPath`].
    pub fn to_bez_path(&self) -> BezPath {
        BezPath::from_vec(self.elements.clone())
    }

    /// The bounding box of the path.
    pub fn bounds(&self) -> Rect {
        self.to_bez_path().bounding_box()
    }

    /// Append a flattened arc, connecting to the current point with a line
    /// when one exists (or starting a new contour otherwise).
    fn append_arc(&mut self, arc: Arc) {
        let mut els = arc.path_elements(ARC_TOLERANCE);
        if let Some(PathEl::MoveTo(start)) = els.next() {
            match self.current_point() {
                Some(p) if (p - start).hypot() < 1e-9 => {}
                Some(_) => self.line_to(start.x, start.y),
                None => self.move_to(start.x, start.y),
            }
            self.elements.extend(els);
        }
    }

    /// Draw a semicircular arc from the current point to `(x, y)`.
    pub fn arc_to(&mut self, x: f64, y: f64, direction: Direction) {
        let from = self.current_point().unwrap_or(Point::ZERO);
        let to = Point::new(x, y);
        let chord = to - from;
        if chord.hypot() < 1e-12 {
            return;
        }
        let center = from.midpoint(to);
        let radius = chord.hypot() / 2.0;
        let start = (from - center).atan2();
        let sweep = match direction {
            Direction::Cw => PI,
            Direction::Ccw => -PI,
        };
        self.append_arc(Arc {
            center,
            radii: Vec2::new(radius, radius),
            start_angle: start,
            sweep_angle: sweep,
            x_rotation: 0.0,
        });
    }

    /// Draw an arc of the given radius tangent to the lines from the current
    /// point to `(cx, cy)` and from there to `(x, y)`, then a line on to
    /// `(x, y)`.
    pub fn arc_through(&mut self, cx: f64, cy: f64, x: f64, y: f64, radius: f64) {
        let from = self.current_point().unwrap_or(Point::ZERO);
        let corner = Point::new(cx, cy);
        let to = Point::new(x, y);
        let v1 = from - corner;
        let v2 = to - corner;
        let cross = v1.cross(v2);
        if v1.hypot() < 1e-12 || v2.hypot() < 1e-12 || cross.abs() < 1e-12 || radius <= 0.0 {
            // Collinear or degenerate; the arc has no room.
            self.line_to(x, y);
            return;
        }
        let u1 = v1 / v1.hypot();
        let u2 = v2 / v2.hypot();
        let half = (u1.dot(u2)).clamp(-1.0, 1.0).acos() / 2.0;
        let dist = radius / half.tan();
        let t1 = corner + u1 * dist;
        let t2 = corner + u2 * dist;
        let bisector = u1 + u2;
        let center = corner + (bisector / bisector.hypot()) * (radius / half.sin());

        let start = (t1 - center).atan2();
        let end = (t2 - center).atan2();
        let mut sweep = end - start;
        // Take the short way around, oriented by the turn direction.
        while sweep > PI {
            sweep -= 2.0 * PI;
        }
        while sweep < -PI {
            sweep += 2.0 * PI;
        }
        self.line_to(t1.x, t1.y);
        self.append_arc(Arc {
            center,
            radii: Vec2::new(radius, radius),
            start_angle: start,
            sweep_angle: sweep,
            x_rotation: 0.0,
        });
        self.line_to(x, y);
    }

    /// Append a rectangle contour, optionally with rounded corners.
    ///
    /// Radii are clamped so opposing corners never overlap.
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: Option<(f64, f64)>) {
        let radius = radius.filter(|&(rx, ry)| rx != 0.0 || ry != 0.0);
        match radius {
            None => {
                self.move_to(x, y);
                self.line_to(x + w, y);
                self.line_to(x + w, y + h);
                self.line_to(x, y + h);
                self.close_path();
            }
            Some((rx, ry)) => {
                let rx = rx.abs().min(w.abs() / 2.0);
                let ry = ry.abs().min(h.abs() / 2.0);
                let (kx, ky) = (KAPPA * rx, KAPPA * ry);
                self.move_to(x + rx, y);
                self.line_to(x + w - rx, y);
                self.curve_to(x + w - rx + kx, y, x + w, y + ry - ky, x + w, y + ry);
                self.line_to(x + w, y + h - ry);
                self.curve_to(
                    x + w,
                    y + h - ry + ky,
                    x + w - rx + kx,
                    y + h,
                    x + w - rx,
                    y + h,
                );
                self.line_to(x + rx, y + h);
                self.curve_to(x + rx - kx, y + h, x, y + h - ry + ky, x, y + h - ry);
                self.line_to(x, y + ry);
                self.curve_to(x, y + ry - ky, x + rx - kx, y, x + rx, y);
                self.close_path();
            }
        }
    }

    /// Append an ellipse fitted to the given rectangle, or a section of it.
    pub fn oval(&mut self, x: f64, y: f64, w: f64, h: f64, slice: Option<ArcSlice>) {
        let center = Point::new(x + w / 2.0, y + h / 2.0);
        let radii = Vec2::new(w / 2.0, h / 2.0);
        match slice {
            None => self.ellipse(center, radii),
            Some(slice) => {
                let (start, stop) = slice.range.endpoints();
                let mut sweep = (stop - start).to_radians();
                if slice.direction == Direction::Ccw {
                    sweep = -sweep;
                }
                self.move_arc_start(center, radii, start.to_radians());
                self.append_arc(Arc {
                    center,
                    radii,
                    start_angle: start.to_radians(),
                    sweep_angle: sweep,
                    x_rotation: 0.0,
                });
                if slice.close {
                    // A chord between the unconnected endpoints.
                    self.close_path();
                }
            }
        }
    }

    /// Append a full circle or pie-sliceable arc centered at `(x, y)`.
    pub fn arc(&mut self, x: f64, y: f64, radius: f64, slice: Option<ArcSlice>) {
        let center = Point::new(x, y);
        let radii = Vec2::new(radius, radius);
        match slice {
            None => self.ellipse(center, radii),
            Some(slice) => {
                let (start, stop) = slice.range.endpoints();
                let mut sweep = (stop - start).to_radians();
                if slice.direction == Direction::Ccw {
                    sweep = -sweep;
                }
                self.move_arc_start(center, radii, start.to_radians());
                self.append_arc(Arc {
                    center,
                    radii,
                    start_angle: start.to_radians(),
                    sweep_angle: sweep,
                    x_rotation: 0.0,
                });
                if slice.close {
                    // A pie slice back through the center.
                    self.line_to(x, y);
                    self.close_path();
                }
            }
        }
    }

    /// Append a line segment, or a semicircular arc between the endpoints.
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, curve: Option<Direction>) {
        self.move_to(x1, y1);
        match curve {
            None => self.line_to(x2, y2),
            Some(direction) => self.arc_to(x2, y2, direction),
        }
    }

    /// Append a regular polygon centered at `(x, y)`, base horizontal.
    pub fn poly(&mut self, x: f64, y: f64, radius: f64, sides: u32) {
        let n = sides as f64;
        let start = PI / 2.0 + if sides % 2 == 0 { PI / n } else { 0.0 };
        for i in 0..sides {
            let theta = start + (i as f64) * 2.0 * PI / n;
            let px = x + radius * theta.cos();
            let py = y + radius * theta.sin();
            if i == 0 {
                self.move_to(px, py);
            } else {
                self.line_to(px, py);
            }
        }
        self.close_path();
    }

    /// Append a star centered at `(x, y)` with alternating outer and inner
    /// radii.
    pub fn star(&mut self, x: f64, y: f64, points: u32, outer: f64, inner: f64) {
        self.move_to(x, y + outer);
        for i in 1..(2 * points) {
            let angle = (i as f64) * PI / (points as f64);
            let radius = if i % 2 == 1 { inner } else { outer };
            self.line_to(x + radius * angle.sin(), y + radius * angle.cos());
        }
        self.close_path();
    }

    /// Append an arrow pointing at `(x, y)`.
    pub fn arrow(&mut self, x: f64, y: f64, width: f64, style: ArrowStyle) {
        match style {
            ArrowStyle::Normal => {
                let head = width * 0.4;
                let tail = width * 0.2;
                self.move_to(x, y);
                self.line_to(x - head, y + head);
                self.line_to(x - head, y + tail);
                self.line_to(x - width, y + tail);
                self.line_to(x - width, y - tail);
                self.line_to(x - head, y - tail);
                self.line_to(x - head, y - head);
                self.line_to(x, y);
                self.close_path();
            }
            ArrowStyle::FortyFive => {
                let head = 0.3;
                let tail = 1.0 + head;
                self.move_to(x, y);
                self.line_to(x, y + width * (1.0 - head));
                self.line_to(x - width * head, y + width);
                self.line_to(x - width * head, y + width * tail * 0.4);
                self.line_to(x - width * tail * 0.6, y + width);
                self.line_to(x - width, y + width * tail * 0.6);
                self.line_to(x - width * tail * 0.4, y + width * head);
                self.line_to(x - width, y + width * head);
                self.line_to(x - width * (1.0 - head), y);
                self.line_to(x, y);
                self.close_path();
            }
        }
    }

    // Four-cubic ellipse, one curve per quadrant.
    fn ellipse(&mut self, center: Point, radii: Vec2) {
        let (cx, cy) = (center.x, center.y);
        let (rx, ry) = (radii.x, radii.y);
        let (kx, ky) = (KAPPA * rx, KAPPA * ry);
        self.move_to(cx + rx, cy);
        self.curve_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
        self.curve_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
        self.curve_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);
        self.curve_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
        self.close_path();
    }

    fn move_arc_start(&mut self, center: Point, radii: Vec2, start_angle: f64) {
        let start = Point::new(
            center.x + radii.x * start_angle.cos(),
            center.y + radii.y * start_angle.sin(),
        );
        self.move_to(start.x, start.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_curves(path: &BezierPath) -> usize {
        path.elements()
            .iter()
            .filter(|el| matches!(el, PathEl::CurveTo(..)))
            .count()
    }

    fn count_lines(path: &BezierPath) -> usize {
        path.elements()
            .iter()
            .filter(|el| matches!(el, PathEl::LineTo(..)))
            .count()
    }

    #[test]
    fn sharp_rect_is_four_lines() {
        let mut p = BezierPath::new();
        p.rect(0.0, 0.0, 100.0, 100.0, None);
        assert_eq!(count_curves(&p), 0);
        assert_eq!(count_lines(&p), 3);
        assert_eq!(p.elements().last(), Some(&PathEl::ClosePath));
        assert_eq!(p.bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn rounded_rect_has_four_corner_curves() {
        let mut p = BezierPath::new();
        p.rect(0.0, 0.0, 100.0, 60.0, Some((10.0, 10.0)));
        assert_eq!(count_curves(&p), 4);
        assert_eq!(count_lines(&p), 4);
    }

    #[test]
    fn corner_radii_clamp_to_half_extent() {
        let mut p = BezierPath::new();
        p.rect(0.0, 0.0, 100.0, 40.0, Some((500.0, 500.0)));
        // The clamped path may not escape the rectangle.
        let b = p.bounds();
        assert!(b.x0 >= -1e-9 && b.y0 >= -1e-9);
        assert!(b.x1 <= 100.0 + 1e-9 && b.y1 <= 40.0 + 1e-9);
    }

    #[test]
    fn oval_is_closed_and_bounded() {
        let mut p = BezierPath::new();
        p.oval(10.0, 20.0, 80.0, 40.0, None);
        assert_eq!(count_curves(&p), 4);
        assert_eq!(p.elements().last(), Some(&PathEl::ClosePath));
        let b = p.bounds();
        assert!((b.x0 - 10.0).abs() < 0.1 && (b.y0 - 20.0).abs() < 0.1);
        assert!((b.x1 - 90.0).abs() < 0.1 && (b.y1 - 60.0).abs() < 0.1);
    }

    #[test]
    fn partial_oval_chord_closes() {
        let mut p = BezierPath::new();
        p.oval(
            0.0,
            0.0,
            100.0,
            100.0,
            Some(ArcSlice::new(ArcRange::To(90.0)).closed()),
        );
        assert_eq!(p.elements().last(), Some(&PathEl::ClosePath));
        // Starts at 3 o'clock on the oval.
        assert_eq!(p.elements().first(), Some(&PathEl::MoveTo(Point::new(100.0, 50.0))));
    }

    #[test]
    fn pie_slice_passes_through_center() {
        let mut p = BezierPath::new();
        p.arc(
            50.0,
            50.0,
            40.0,
            Some(ArcSlice::new(ArcRange::Between(0.0, 90.0)).closed()),
        );
        let has_center_line = p
            .elements()
            .iter()
            .any(|el| matches!(el, PathEl::LineTo(p) if (*p - Point::new(50.0, 50.0)).hypot() < 1e-9));
        assert!(has_center_line);
        assert_eq!(p.elements().last(), Some(&PathEl::ClosePath));
    }

    #[test]
    fn star_alternates_radii() {
        let mut p = BezierPath::new();
        p.star(0.0, 0.0, 5, 100.0, 50.0);
        // moveto + 9 linetos + close
        assert_eq!(p.elements().len(), 11);
        assert_eq!(p.elements().first(), Some(&PathEl::MoveTo(Point::new(0.0, 100.0))));
        let max = p
            .elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::LineTo(pt) => Some(pt.to_vec2().hypot()),
                _ => None,
            })
            .fold(0.0f64, f64::max);
        assert!((max - 100.0).abs() < 1e-9);
    }

    #[test]
    fn poly_vertices_sit_on_the_radius() {
        let mut p = BezierPath::new();
        p.poly(0.0, 0.0, 10.0, 6);
        let on_circle = p.elements().iter().all(|el| match el {
            PathEl::MoveTo(pt) | PathEl::LineTo(pt) => (pt.to_vec2().hypot() - 10.0).abs() < 1e-9,
            _ => true,
        });
        assert!(on_circle);
        assert_eq!(count_lines(&p), 5);
    }

    #[test]
    fn semicircular_line_spans_the_chord() {
        let mut p = BezierPath::new();
        p.line(0.0, 0.0, 100.0, 0.0, Some(Direction::Cw));
        assert!(count_curves(&p) > 0);
        let end = p.current_point().unwrap();
        assert!((end - Point::new(100.0, 0.0)).hypot() < 0.1);
    }

    #[test]
    fn arc_through_is_tangent_line_arc_line() {
        let mut p = BezierPath::new();
        p.move_to(0.0, 0.0);
        p.arc_through(100.0, 0.0, 100.0, 100.0, 20.0);
        let end = p.current_point().unwrap();
        assert_eq!(end, Point::new(100.0, 100.0));
        // First tangent point sits on the incoming segment, radius-distance
        // short of the corner.
        assert_eq!(p.elements()[1], PathEl::LineTo(Point::new(80.0, 0.0)));
    }

    #[test]
    fn extend_appends_contours() {
        let mut a = BezierPath::new();
        a.rect(0.0, 0.0, 10.0, 10.0, None);
        let mut b = BezierPath::new();
        b.oval(20.0, 0.0, 10.0, 10.0, None);
        let len = a.elements().len();
        a.extend(&b);
        assert_eq!(a.elements().len(), len + b.elements().len());
    }
}
