//! Drawable records.
//!
//! A [`RenderModel`] is plain data: instance uniform bindings read its
//! fields by byte offset while striding over a `&[RenderModel]`.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use lumen_rhi::buffer::{create_index_buffer, create_vertex_buffer};
use lumen_rhi::vertex::Vertex;
use lumen_rhi::{BufferHandle, GraphicsContext, RhiResult, TextureHandle, VertexArrayHandle};
use lumen_scene::{Aabb, MeshData};
use tracing::debug;

/// Material maps sampled by the lighting shader. Null handles are drawn
/// with the renderer's placeholder texture.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct MaterialTextures {
    pub albedo: TextureHandle,
    pub normal: TextureHandle,
    pub bump: TextureHandle,
    pub metallic: TextureHandle,
    pub roughness: TextureHandle,
}

impl MaterialTextures {
    /// Number of material texture slots.
    pub const COUNT: usize = 5;

    /// Slots in sampler order.
    pub fn as_array(&self) -> [TextureHandle; Self::COUNT] {
        [
            self.albedo,
            self.normal,
            self.bump,
            self.metallic,
            self.roughness,
        ]
    }
}

/// Reflectance model selected per model.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Brdf {
    #[default]
    Lambert = 0,
    CookTorrance = 1,
}

/// One drawable: geometry, material and transform.
///
/// # Memory Layout
///
/// - Offset 0: transform (64 bytes)
/// - Offset 64: color (12 bytes)
/// - Offset 76: world-space center (12 bytes)
/// - Offset 88: object-space bounds (24 bytes)
/// - Offset 112: vertex array, vertex buffer, index buffer, index count (16 bytes)
/// - Offset 128: material textures (20 bytes)
/// - Offset 148: debug draw flag (4 bytes)
/// - Offset 152: BRDF (4 bytes)
/// - Offset 156: padding (20 bytes)
/// - Total size: 176 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct RenderModel {
    /// Object to world transform.
    pub transform: Mat4,
    pub color: Vec3,
    pub center: Vec3,
    pub aabb: Aabb,
    pub vertex_array: VertexArrayHandle,
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
    pub index_count: u32,
    pub textures: MaterialTextures,
    /// Non-zero for helper geometry drawn in debug colors.
    pub debug_draw: u32,
    pub brdf: u32,
    pub _padding: [u32; 5],
}

impl Default for RenderModel {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            color: Vec3::splat(0.5),
            center: Vec3::ZERO,
            aabb: Aabb::default(),
            vertex_array: VertexArrayHandle::NULL,
            vertex_buffer: BufferHandle::NULL,
            index_buffer: BufferHandle::NULL,
            index_count: 0,
            textures: MaterialTextures::default(),
            debug_draw: 0,
            brdf: Brdf::Lambert as u32,
            _padding: [0; 5],
        }
    }
}

impl RenderModel {
    /// Size of the struct in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Upload `mesh` and wrap it in a model placed at `transform`.
    pub fn upload<G: GraphicsContext + ?Sized>(
        gfx: &mut G,
        mesh: &MeshData,
        transform: Mat4,
    ) -> RhiResult<Self> {
        let vertex_buffer = create_vertex_buffer(gfx, &mesh.vertices)?;
        let index_buffer = match create_index_buffer(gfx, &mesh.indices) {
            Ok(buffer) => buffer,
            Err(e) => {
                gfx.delete_buffer(vertex_buffer);
                return Err(e);
            }
        };
        let vertex_array =
            match gfx.create_vertex_array(&[vertex_buffer], index_buffer, &Vertex::attributes()) {
                Ok(vertex_array) => vertex_array,
                Err(e) => {
                    gfx.delete_buffer(index_buffer);
                    gfx.delete_buffer(vertex_buffer);
                    return Err(e);
                }
            };

        let aabb = mesh.bounds().unwrap_or_default();
        debug!(
            "Uploaded model {} ({} vertices, {} indices)",
            vertex_array,
            mesh.vertices.len(),
            mesh.indices.len()
        );

        Ok(Self {
            transform,
            center: transform.transform_point3(aabb.center()),
            aabb,
            vertex_array,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
            ..Self::default()
        })
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_textures(mut self, textures: MaterialTextures) -> Self {
        self.textures = textures;
        self
    }

    pub fn with_brdf(mut self, brdf: Brdf) -> Self {
        self.brdf = brdf as u32;
        self
    }

    /// Move the model, keeping `center` in sync.
    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
        self.center = transform.transform_point3(self.aabb.center());
    }

    /// Bounds in world space.
    pub fn world_bounds(&self) -> Aabb {
        self.aabb.transformed(&self.transform)
    }

    /// Wireframe-style helper model enclosing this model's world bounds.
    ///
    /// Shares `unit_cube`'s geometry, which must span `[-0.5, 0.5]³`.
    pub fn bounds_helper(&self, unit_cube: &RenderModel) -> RenderModel {
        let bounds = self.world_bounds();
        let transform = Mat4::from_scale_rotation_translation(
            bounds.extent(),
            glam::Quat::IDENTITY,
            bounds.center(),
        );
        let mut helper = RenderModel {
            color: Vec3::X,
            debug_draw: 1,
            textures: MaterialTextures::default(),
            ..*unit_cube
        };
        helper.set_transform(transform);
        helper
    }

    /// Delete the geometry objects. Textures belong to their cache.
    pub fn release<G: GraphicsContext + ?Sized>(&self, gfx: &mut G) {
        gfx.delete_vertex_array(self.vertex_array);
        gfx.delete_buffer(self.index_buffer);
        gfx.delete_buffer(self.vertex_buffer);
    }
}
