//! Glyph outline flattening and solid/hole grouping

use serde::{Deserialize, Serialize};

use crate::typeface::PathCommand;

/// Segments each curve is flattened into
pub const DEFAULT_CURVE_SEGMENTS: usize = 12;

/// A 2D point in scene units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, other: Point2, t: f32) -> Point2 {
        Point2::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    pub fn distance_squared(self, other: Point2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }
}

/// A closed filled region with optional holes.
///
/// `outer` winds counter-clockwise and every hole winds clockwise.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    pub outer: Vec<Point2>,
    pub holes: Vec<Vec<Point2>>,
}

impl Shape {
    /// Number of points across the outer contour and all holes
    pub fn point_count(&self) -> usize {
        self.outer.len() + self.holes.iter().map(Vec::len).sum::<usize>()
    }

    /// Filled area (outer minus holes)
    pub fn area(&self) -> f32 {
        signed_area(&self.outer).abs() - self.holes.iter().map(|h| signed_area(h).abs()).sum::<f32>()
    }
}

/// Shoelace area; positive for counter-clockwise winding in a y-up frame
pub fn signed_area(points: &[Point2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    let mut q = n - 1;
    for p in 0..n {
        area += points[q].x * points[p].y - points[p].x * points[q].y;
        q = p;
    }
    area * 0.5
}

pub fn is_clockwise(points: &[Point2]) -> bool {
    signed_area(points) < 0.0
}

/// Even-odd containment test
pub fn contains_point(polygon: &[Point2], point: Point2) -> bool {
    let n = polygon.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Flatten path commands into closed contours.
///
/// Every `MoveTo` starts a new contour. Curves contribute `segments` points,
/// lines one. Consecutive duplicates and the closing duplicate are dropped.
pub fn flatten(commands: &[PathCommand], segments: usize) -> Vec<Vec<Point2>> {
    let segments = segments.max(1);
    let mut contours: Vec<Vec<Point2>> = Vec::new();
    let mut current: Vec<Point2> = Vec::new();
    let mut cursor = Point2::default();

    fn push(contour: &mut Vec<Point2>, p: Point2) {
        if contour.last() != Some(&p) {
            contour.push(p);
        }
    }

    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => {
                if !current.is_empty() {
                    contours.push(std::mem::take(&mut current));
                }
                current.push(p);
                cursor = p;
            }
            PathCommand::LineTo(p) => {
                push(&mut current, p);
                cursor = p;
            }
            PathCommand::QuadTo { ctrl, to } => {
                for i in 1..=segments {
                    let t = i as f32 / segments as f32;
                    let a = cursor.lerp(ctrl, t);
                    let b = ctrl.lerp(to, t);
                    push(&mut current, a.lerp(b, t));
                }
                cursor = to;
            }
            PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                for i in 1..=segments {
                    let t = i as f32 / segments as f32;
                    let it = 1.0 - t;
                    let w0 = it * it * it;
                    let w1 = 3.0 * it * it * t;
                    let w2 = 3.0 * it * t * t;
                    let w3 = t * t * t;
                    push(
                        &mut current,
                        Point2::new(
                            w0 * cursor.x + w1 * ctrl1.x + w2 * ctrl2.x + w3 * to.x,
                            w0 * cursor.y + w1 * ctrl1.y + w2 * ctrl2.y + w3 * to.y,
                        ),
                    );
                }
                cursor = to;
            }
            PathCommand::Close => {}
        }
    }
    if !current.is_empty() {
        contours.push(current);
    }

    for contour in &mut contours {
        while contour.len() > 1 && contour.first() == contour.last() {
            contour.pop();
        }
    }
    contours.retain(|c| c.len() >= 3);
    contours
}

/// Group flattened contours into shapes.
///
/// Clockwise contours are solids, counter-clockwise ones are holes. A lone
/// contour is always a solid. Holes go to the solid containing their first
/// point, or to the most recent solid when no solid contains them.
pub fn group_shapes(contours: Vec<Vec<Point2>>) -> Vec<Shape> {
    if contours.len() == 1 {
        let mut outer = contours.into_iter().next().unwrap_or_default();
        if is_clockwise(&outer) {
            outer.reverse();
        }
        return vec![Shape { outer, holes: Vec::new() }];
    }

    let mut shapes: Vec<Shape> = Vec::new();
    let mut orphan_holes: Vec<(Option<usize>, Vec<Point2>)> = Vec::new();

    for mut contour in contours {
        if is_clockwise(&contour) {
            contour.reverse();
            shapes.push(Shape { outer: contour, holes: Vec::new() });
        } else {
            orphan_holes.push((shapes.len().checked_sub(1), contour));
        }
    }

    if shapes.is_empty() {
        // Only counter-clockwise contours: treat them all as solids
        return orphan_holes
            .into_iter()
            .map(|(_, outer)| Shape { outer, holes: Vec::new() })
            .collect();
    }

    for (preceding, mut hole) in orphan_holes {
        let first = hole[0];
        let owner = shapes
            .iter()
            .position(|s| contains_point(&s.outer, first))
            .or(preceding)
            .unwrap_or(0);
        hole.reverse();
        shapes[owner].holes.push(hole);
    }

    shapes
}

/// Flatten and group in one step
pub fn shapes_from_commands(commands: &[PathCommand], segments: usize) -> Vec<Shape> {
    let contours = flatten(commands, segments);
    if contours.is_empty() {
        return Vec::new();
    }
    group_shapes(contours)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f32, y0: f32, size: f32, clockwise: bool) -> Vec<PathCommand> {
        let mut pts = vec![
            Point2::new(x0, y0),
            Point2::new(x0 + size, y0),
            Point2::new(x0 + size, y0 + size),
            Point2::new(x0, y0 + size),
        ];
        if clockwise {
            pts.reverse();
        }
        let mut cmds = vec![PathCommand::MoveTo(pts[0])];
        cmds.extend(pts[1..].iter().map(|p| PathCommand::LineTo(*p)));
        cmds.push(PathCommand::LineTo(pts[0]));
        cmds.push(PathCommand::Close);
        cmds
    }

    #[test]
    fn test_signed_area_orientation() {
        let ccw = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        assert_eq!(signed_area(&ccw), 4.0);
        assert!(!is_clockwise(&ccw));

        let mut cw = ccw.to_vec();
        cw.reverse();
        assert_eq!(signed_area(&cw), -4.0);
        assert!(is_clockwise(&cw));
    }

    #[test]
    fn test_flatten_drops_closing_duplicate() {
        let contours = flatten(&square(0.0, 0.0, 1.0, true), DEFAULT_CURVE_SEGMENTS);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 4);
    }

    #[test]
    fn test_flatten_curve_segments() {
        let cmds = vec![
            PathCommand::MoveTo(Point2::new(0.0, 0.0)),
            PathCommand::QuadTo { ctrl: Point2::new(1.0, 2.0), to: Point2::new(2.0, 0.0) },
            PathCommand::CubicTo {
                ctrl1: Point2::new(2.0, -1.0),
                ctrl2: Point2::new(0.0, -1.0),
                to: Point2::new(0.0, 0.0),
            },
        ];
        let contours = flatten(&cmds, 4);
        // start + 4 quad points + 3 cubic points (last one closes onto the start)
        assert_eq!(contours[0].len(), 8);
        // Quadratic midpoint at t = 0.5
        assert_eq!(contours[0][2], Point2::new(1.0, 1.0));
        assert_eq!(contours[0][4], Point2::new(2.0, 0.0));
    }

    #[test]
    fn test_degenerate_contours_ignored() {
        let cmds = vec![
            PathCommand::MoveTo(Point2::new(0.0, 0.0)),
            PathCommand::LineTo(Point2::new(1.0, 0.0)),
        ];
        assert!(shapes_from_commands(&cmds, 12).is_empty());
    }

    #[test]
    fn test_hole_assignment() {
        // Two solids side by side, each with a hole
        let mut cmds = square(0.0, 0.0, 4.0, true);
        cmds.extend(square(10.0, 0.0, 4.0, true));
        cmds.extend(square(11.0, 1.0, 1.0, false));
        cmds.extend(square(1.0, 1.0, 1.0, false));

        let shapes = shapes_from_commands(&cmds, 12);
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].holes.len(), 1);
        assert_eq!(shapes[1].holes.len(), 1);
        assert!(shapes[0].holes[0].iter().all(|p| p.x < 4.0));
        assert!(shapes[1].holes[0].iter().all(|p| p.x > 10.0));

        // Normalised winding
        assert!(!is_clockwise(&shapes[0].outer));
        assert!(is_clockwise(&shapes[0].holes[0]));
        assert_eq!(shapes[0].area(), 15.0);
    }

    #[test]
    fn test_single_contour_is_solid() {
        let shapes = shapes_from_commands(&square(0.0, 0.0, 1.0, false), 12);
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].holes.is_empty());
        assert!(!is_clockwise(&shapes[0].outer));
    }

    #[test]
    fn test_contains_point() {
        let poly = [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        assert!(contains_point(&poly, Point2::new(1.0, 1.0)));
        assert!(!contains_point(&poly, Point2::new(5.0, 1.0)));
    }
}
