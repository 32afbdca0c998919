//! Shape extrusion into indexed triangle meshes

use crate::outline::{shapes_from_commands, Point2, Shape, DEFAULT_CURVE_SEGMENTS};
use crate::triangulate::triangulate;
use crate::typeface::{Typeface, TypefaceError};

/// Engine-neutral triangle list with per-vertex normals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append another mesh, rebasing its indices
    pub fn append(&mut self, other: MeshData) {
        let base = self.positions.len() as u32;
        self.positions.extend(other.positions);
        self.normals.extend(other.normals);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }

    /// Axis-aligned bounds as (min, max), or None for an empty mesh
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(mut lo, mut hi), p| {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(p[axis]);
                hi[axis] = hi[axis].max(p[axis]);
            }
            (lo, hi)
        }))
    }
}

/// Parameters for extruded text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOptions {
    /// Em size in scene units
    pub size: f32,
    /// Extrusion depth along +Z
    pub depth: f32,
    pub curve_segments: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            size: 1.0,
            depth: 0.2,
            curve_segments: DEFAULT_CURVE_SEGMENTS,
        }
    }
}

/// Extrude a shape from z = 0 to z = `depth`.
///
/// Caps share the triangulation; side walls get flat per-face normals.
pub fn extrude_shape(shape: &Shape, depth: f32) -> MeshData {
    let mut mesh = MeshData::default();
    let ring_points: Vec<Point2> = shape
        .outer
        .iter()
        .chain(shape.holes.iter().flatten())
        .copied()
        .collect();
    let triangles = triangulate(shape);

    // Back cap, facing -Z
    let back = mesh.positions.len() as u32;
    for p in &ring_points {
        mesh.positions.push([p.x, p.y, 0.0]);
        mesh.normals.push([0.0, 0.0, -1.0]);
    }
    for t in &triangles {
        mesh.indices.extend([back + t[0], back + t[2], back + t[1]]);
    }

    // Front cap, facing +Z
    let front = mesh.positions.len() as u32;
    for p in &ring_points {
        mesh.positions.push([p.x, p.y, depth]);
        mesh.normals.push([0.0, 0.0, 1.0]);
    }
    for t in &triangles {
        mesh.indices.extend([front + t[0], front + t[1], front + t[2]]);
    }

    for ring in std::iter::once(&shape.outer).chain(shape.holes.iter()) {
        extrude_walls(&mut mesh, ring, depth);
    }

    mesh
}

fn extrude_walls(mesh: &mut MeshData, ring: &[Point2], depth: f32) {
    let n = ring.len();
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            continue;
        }
        // Outward for counter-clockwise outers and clockwise holes alike
        let normal = [dy / len, -dx / len, 0.0];

        let base = mesh.positions.len() as u32;
        mesh.positions.extend([
            [a.x, a.y, 0.0],
            [b.x, b.y, 0.0],
            [b.x, b.y, depth],
            [a.x, a.y, depth],
        ]);
        mesh.normals.extend([normal; 4]);
        mesh.indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Build an extruded mesh for `text`
pub fn text_mesh(typeface: &Typeface, text: &str, options: TextOptions) -> Result<MeshData, TypefaceError> {
    let mut mesh = MeshData::default();
    for glyph in typeface.layout(text, options.size)? {
        for shape in shapes_from_commands(&glyph.commands, options.curve_segments) {
            mesh.append(extrude_shape(&shape, options.depth));
        }
    }
    tracing::debug!(
        text,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        bounds = ?mesh.bounds(),
        "Built text mesh"
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Shape {
        Shape {
            outer: vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            holes: Vec::new(),
        }
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    #[test]
    fn test_extruded_square() {
        let mesh = extrude_shape(&unit_square(), 0.5);
        // 4 + 4 cap vertices, 4 walls x 4 vertices
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        // 2 + 2 cap triangles, 4 walls x 2
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
        assert_eq!(mesh.bounds(), Some(([0.0, 0.0, 0.0], [1.0, 1.0, 0.5])));
    }

    #[test]
    fn test_winding_matches_normals() {
        let mesh = extrude_shape(&unit_square(), 1.0);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.positions[i as usize]);
            let face = cross(
                [b[0] - a[0], b[1] - a[1], b[2] - a[2]],
                [c[0] - a[0], c[1] - a[1], c[2] - a[2]],
            );
            let n = mesh.normals[tri[0] as usize];
            let dot = face[0] * n[0] + face[1] * n[1] + face[2] * n[2];
            assert!(dot > 0.0, "triangle {:?} faces away from its normal", tri);
        }
    }

    #[test]
    fn test_append_rebases_indices() {
        let mut mesh = extrude_shape(&unit_square(), 1.0);
        let count = mesh.vertex_count() as u32;
        mesh.append(extrude_shape(&unit_square(), 1.0));
        assert_eq!(mesh.vertex_count(), 48);
        assert_eq!(*mesh.indices.iter().max().unwrap(), 2 * count - 1);
    }

    #[test]
    fn test_text_mesh() {
        let json = r#"{
            "glyphs": {
                "o": { "ha": 1000, "o": "m 0 0 l 0 1000 l 1000 1000 l 1000 0 z m 250 250 l 750 250 l 750 750 l 250 750 z" }
            },
            "resolution": 1000
        }"#;
        let typeface = Typeface::from_json(json).unwrap();
        let mesh = text_mesh(
            &typeface,
            "o",
            TextOptions { size: 2.0, depth: 0.1, ..Default::default() },
        )
        .unwrap();

        // Caps: 8 points each, 8 triangles each; walls: 8 edges
        assert_eq!(mesh.vertex_count(), 8 + 8 + 8 * 4);
        assert_eq!(mesh.triangle_count(), 8 + 8 + 8 * 2);
        let (lo, hi) = mesh.bounds().unwrap();
        assert!((hi[0] - 2.0).abs() < 1e-6 && (hi[1] - 2.0).abs() < 1e-6);
        assert_eq!(lo[2], 0.0);
        assert!((hi[2] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_empty_text() {
        let json = r#"{ "glyphs": { " ": { "ha": 300 } }, "resolution": 1000 }"#;
        let typeface = Typeface::from_json(json).unwrap();
        let mesh = text_mesh(&typeface, " ", TextOptions::default()).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.bounds(), None);
    }
}
