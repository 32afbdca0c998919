//! Polygon triangulation by hole bridging and ear clipping
//!
//! Holes are spliced into the outer contour through a zero-width bridge,
//! turning the shape into a single weakly simple polygon that is then
//! clipped ear by ear. Triangles wind counter-clockwise.

use crate::outline::{Point2, Shape};

/// Twice the signed area of triangle (a, b, c)
fn area2(a: Point2, b: Point2, c: Point2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
}

fn point_in_triangle(a: Point2, b: Point2, c: Point2, p: Point2) -> bool {
    area2(a, b, p) >= 0.0 && area2(b, c, p) >= 0.0 && area2(c, a, p) >= 0.0
}

/// Proper intersection: the segments cross at a single interior point
fn segments_cross(p1: Point2, p2: Point2, q1: Point2, q2: Point2) -> bool {
    let d1 = area2(q1, q2, p1);
    let d2 = area2(q1, q2, p2);
    let d3 = area2(p1, p2, q1);
    let d4 = area2(p1, p2, q2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

/// Whether `target` lies strictly inside the interior angle at `vertex`
/// of a counter-clockwise polygon.
fn in_cone(prev: Point2, vertex: Point2, next: Point2, target: Point2) -> bool {
    if area2(vertex, next, prev) >= 0.0 {
        area2(vertex, target, prev) > 0.0 && area2(target, vertex, next) > 0.0
    } else {
        !(area2(vertex, target, next) >= 0.0 && area2(target, vertex, prev) >= 0.0)
    }
}

fn ring_crosses(points: &[Point2], ring: &[usize], a: Point2, b: Point2) -> bool {
    let n = ring.len();
    (0..n).any(|i| segments_cross(a, b, points[ring[i]], points[ring[(i + 1) % n]]))
}

/// Splice `hole` into `polygon`, returning false when no bridge was found
fn bridge_hole(
    points: &[Point2],
    polygon: &mut Vec<usize>,
    hole: &[usize],
    pending: &[Vec<usize>],
) -> bool {
    let Some(m) = (0..hole.len()).max_by(|&a, &b| {
        points[hole[a]]
            .x
            .total_cmp(&points[hole[b]].x)
            .then(points[hole[b]].y.total_cmp(&points[hole[a]].y))
    }) else {
        return false;
    };
    let anchor = points[hole[m]];

    let mut candidates: Vec<usize> = (0..polygon.len()).collect();
    candidates.sort_by(|&a, &b| {
        anchor
            .distance_squared(points[polygon[a]])
            .total_cmp(&anchor.distance_squared(points[polygon[b]]))
    });

    let n = polygon.len();
    let chosen = candidates.into_iter().find(|&pos| {
        let target = points[polygon[pos]];
        if target == anchor {
            return false;
        }
        let prev = points[polygon[(pos + n - 1) % n]];
        let next = points[polygon[(pos + 1) % n]];
        in_cone(prev, target, next, anchor)
            && !ring_crosses(points, polygon, anchor, target)
            && !ring_crosses(points, hole, anchor, target)
            && !pending.iter().any(|other| ring_crosses(points, other, anchor, target))
    });

    let Some(pos) = chosen else {
        return false;
    };

    let mut spliced = Vec::with_capacity(polygon.len() + hole.len() + 2);
    spliced.extend_from_slice(&polygon[..=pos]);
    spliced.extend(hole[m..].iter().chain(hole[..m].iter()));
    spliced.push(hole[m]);
    spliced.extend_from_slice(&polygon[pos..]);
    *polygon = spliced;
    true
}

fn is_ear(points: &[Point2], polygon: &[usize], i: usize) -> bool {
    let n = polygon.len();
    let a = points[polygon[(i + n - 1) % n]];
    let b = points[polygon[i]];
    let c = points[polygon[(i + 1) % n]];
    if area2(a, b, c) <= 0.0 {
        return false;
    }
    polygon.iter().all(|&idx| {
        let p = points[idx];
        p == a || p == b || p == c || !point_in_triangle(a, b, c, p)
    })
}

/// Triangulate a shape.
///
/// Indices refer to the concatenation of the outer contour followed by each
/// hole in order, which is the layout [`Shape::point_count`] describes.
pub fn triangulate(shape: &Shape) -> Vec<[u32; 3]> {
    let mut points: Vec<Point2> = shape.outer.clone();
    let mut polygon: Vec<usize> = (0..shape.outer.len()).collect();

    let mut holes: Vec<Vec<usize>> = Vec::with_capacity(shape.holes.len());
    for hole in &shape.holes {
        let start = points.len();
        points.extend_from_slice(hole);
        holes.push((start..points.len()).collect());
    }

    // Bridge rightmost holes first so later bridges never cross earlier ones
    holes.sort_by(|a, b| {
        let max_x = |ring: &[usize]| ring.iter().map(|&i| points[i].x).fold(f32::MIN, f32::max);
        max_x(b).total_cmp(&max_x(a))
    });
    while !holes.is_empty() {
        let hole = holes.remove(0);
        if !bridge_hole(&points, &mut polygon, &hole, &holes) {
            tracing::warn!(points = hole.len(), "Could not bridge hole, dropping it");
        }
    }

    let mut triangles = Vec::with_capacity(polygon.len().saturating_sub(2));
    while polygon.len() > 3 {
        let n = polygon.len();
        if let Some(i) = (0..n).find(|&i| is_ear(&points, &polygon, i)) {
            triangles.push([
                polygon[(i + n - 1) % n] as u32,
                polygon[i] as u32,
                polygon[(i + 1) % n] as u32,
            ]);
            polygon.remove(i);
            continue;
        }

        // No clean ear: drop a degenerate vertex, else force the first convex one
        let corner = |i: usize| {
            (
                points[polygon[(i + n - 1) % n]],
                points[polygon[i]],
                points[polygon[(i + 1) % n]],
            )
        };
        if let Some(i) = (0..n).find(|&i| {
            let (a, b, c) = corner(i);
            area2(a, b, c) == 0.0
        }) {
            polygon.remove(i);
        } else if let Some(i) = (0..n).find(|&i| {
            let (a, b, c) = corner(i);
            area2(a, b, c) > 0.0
        }) {
            triangles.push([
                polygon[(i + n - 1) % n] as u32,
                polygon[i] as u32,
                polygon[(i + 1) % n] as u32,
            ]);
            polygon.remove(i);
        } else {
            tracing::warn!(remaining = n, "Triangulation stalled on a non-simple polygon");
            break;
        }
    }

    if polygon.len() == 3 && area2(points[polygon[0]], points[polygon[1]], points[polygon[2]]) > 0.0 {
        triangles.push([polygon[0] as u32, polygon[1] as u32, polygon[2] as u32]);
    }

    triangles
}

/// Sum of triangle areas, for checking coverage
pub fn triangulated_area(shape: &Shape, triangles: &[[u32; 3]]) -> f32 {
    let points: Vec<Point2> = shape
        .outer
        .iter()
        .chain(shape.holes.iter().flatten())
        .copied()
        .collect();
    triangles
        .iter()
        .map(|t| area2(points[t[0] as usize], points[t[1] as usize], points[t[2] as usize]) * 0.5)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ]
    }

    fn cw(mut ring: Vec<Point2>) -> Vec<Point2> {
        ring.reverse();
        ring
    }

    #[test]
    fn test_convex_polygon() {
        let shape = Shape { outer: rect(0.0, 0.0, 2.0, 1.0), holes: Vec::new() };
        let tris = triangulate(&shape);
        assert_eq!(tris.len(), 2);
        assert_eq!(triangulated_area(&shape, &tris), 2.0);
    }

    #[test]
    fn test_concave_polygon() {
        // L shape
        let outer = vec![
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(3.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 3.0),
            Point2::new(0.0, 3.0),
        ];
        let shape = Shape { outer, holes: Vec::new() };
        let tris = triangulate(&shape);
        assert_eq!(tris.len(), 4);
        assert_eq!(triangulated_area(&shape, &tris), 5.0);
    }

    #[test]
    fn test_polygon_with_hole() {
        let shape = Shape {
            outer: rect(0.0, 0.0, 4.0, 4.0),
            holes: vec![cw(rect(1.0, 1.0, 3.0, 3.0))],
        };
        let tris = triangulate(&shape);
        // n_total + 2h - 2
        assert_eq!(tris.len(), 8);
        assert_eq!(triangulated_area(&shape, &tris), 12.0);
        assert!(tris.iter().flatten().all(|&i| (i as usize) < shape.point_count()));
    }

    #[test]
    fn test_polygon_with_two_holes() {
        // Figure-eight style: one outline, two counters
        let shape = Shape {
            outer: rect(0.0, 0.0, 4.0, 8.0),
            holes: vec![cw(rect(1.0, 1.0, 3.0, 3.0)), cw(rect(1.5, 5.0, 2.5, 7.0))],
        };
        let tris = triangulate(&shape);
        assert_eq!(tris.len(), 14);
        assert_eq!(triangulated_area(&shape, &tris), 26.0);
    }

    #[test]
    fn test_triangles_wind_counter_clockwise() {
        let shape = Shape {
            outer: rect(0.0, 0.0, 4.0, 4.0),
            holes: vec![cw(rect(1.0, 1.0, 2.0, 2.0))],
        };
        let points: Vec<Point2> = shape.outer.iter().chain(shape.holes.iter().flatten()).copied().collect();
        for t in triangulate(&shape) {
            assert!(area2(points[t[0] as usize], points[t[1] as usize], points[t[2] as usize]) > 0.0);
        }
    }

    #[test]
    fn test_segments_cross() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 2.0);
        assert!(segments_cross(a, b, Point2::new(0.0, 2.0), Point2::new(2.0, 0.0)));
        // Touching at an endpoint is not a crossing
        assert!(!segments_cross(a, b, b, Point2::new(3.0, 0.0)));
    }
}
