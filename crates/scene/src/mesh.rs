//! Procedural meshes for test scenes and fullscreen passes.

use glam::{Vec2, Vec3};
use lumen_rhi::vertex::Vertex;

use crate::bounds::Aabb;

/// CPU-side triangle mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Two triangles covering clip space, used by post-processing passes.
    pub fn fullscreen_quad() -> Self {
        let corners = [
            (Vec2::new(-1.0, -1.0), Vec2::new(0.0, 0.0)),
            (Vec2::new(1.0, -1.0), Vec2::new(1.0, 0.0)),
            (Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0)),
            (Vec2::new(-1.0, 1.0), Vec2::new(0.0, 1.0)),
        ];
        Self {
            vertices: corners
                .iter()
                .map(|(p, uv)| Vertex::new(p.extend(0.0), Vec3::Z, *uv))
                .collect(),
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }

    /// Horizontal square of side `size` centred at the origin, facing +Y.
    pub fn plane(size: f32) -> Self {
        let h = size * 0.5;
        let corners = [
            (Vec3::new(-h, 0.0, h), Vec2::new(0.0, 0.0)),
            (Vec3::new(h, 0.0, h), Vec2::new(1.0, 0.0)),
            (Vec3::new(h, 0.0, -h), Vec2::new(1.0, 1.0)),
            (Vec3::new(-h, 0.0, -h), Vec2::new(0.0, 1.0)),
        ];
        Self {
            vertices: corners
                .iter()
                .map(|(p, uv)| Vertex::new(*p, Vec3::Y, *uv))
                .collect(),
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }

    /// Axis-aligned cube of side `size` centred at the origin, one quad per face.
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        let faces = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
        let mut mesh = Self::default();

        for normal in faces {
            // Two axes spanning the face, chosen so (u, v, normal) is right handed.
            let u = if normal.y.abs() > 0.5 {
                Vec3::X
            } else {
                normal.cross(Vec3::Y)
            };
            let v = normal.cross(u);
            let base = mesh.vertices.len() as u32;

            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let position = (normal + u * su + v * sv) * h;
                let uv = Vec2::new((su + 1.0) * 0.5, (sv + 1.0) * 0.5);
                mesh.vertices.push(Vertex::new(position, normal, uv));
            }
            mesh.indices
                .extend([base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        mesh
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Bounds of all vertex positions.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|v| v.position))
    }
}
