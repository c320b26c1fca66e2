//! Vertex format and attribute layout.
//!
//! Meshes use a single interleaved stream:
//! - Offset 0: position (12 bytes)
//! - Offset 12: normal (12 bytes)
//! - Offset 24: tex_coord (8 bytes)
//! - Total size: 32 bytes

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// One vertex attribute inside an interleaved buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    /// Number of `f32` components.
    pub components: u32,
    /// Byte offset inside one vertex.
    pub offset: u32,
    /// Byte distance between consecutive vertices.
    pub stride: u32,
}

/// Position, normal and UV.
///
/// # Shader Locations
///
/// - location 0: position (vec3)
/// - location 1: normal (vec3)
/// - location 2: tex_coord (vec2)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// 3D position in object space.
    pub position: Vec3,
    /// Surface normal vector (should be normalized).
    pub normal: Vec3,
    /// Texture coordinates (UV).
    pub tex_coord: Vec2,
}

impl Vertex {
    #[inline]
    pub const fn new(position: Vec3, normal: Vec3, tex_coord: Vec2) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }

    /// Returns the size of the vertex in bytes.
    #[inline]
    pub const fn size() -> usize {
        std::mem::size_of::<Self>()
    }

    /// Attribute layout matching the shader locations above.
    pub fn attributes() -> [VertexAttribute; 3] {
        let stride = Self::size() as u32;
        [
            VertexAttribute {
                location: 0,
                components: 3,
                offset: 0,
                stride,
            },
            VertexAttribute {
                location: 1,
                components: 3,
                offset: 12,
                stride,
            },
            VertexAttribute {
                location: 2,
                components: 2,
                offset: 24,
                stride,
            },
        ]
    }
}
