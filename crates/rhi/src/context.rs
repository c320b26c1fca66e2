//! The command surface the renderer drives.
//!
//! [`GraphicsContext`] is a GL-style, immediate-mode interface: objects are
//! named by integer handles, state is global to the context and commands
//! execute in call order on one thread. The render pass executor relies on
//! strict bind → use → unbind nesting rather than on any state tracking
//! here.

use std::fmt;

use crate::buffer::BufferKind;
use crate::handle::{
    BufferHandle, FramebufferHandle, ProgramHandle, ShaderHandle, TextureHandle, UniformLocation,
    VertexArrayHandle,
};
use crate::shader::ShaderStage;
use crate::texture::TextureDesc;
use crate::vertex::VertexAttribute;
use crate::RhiResult;

/// Maximum number of color attachments a framebuffer may carry.
pub const MAX_COLOR_ATTACHMENTS: u8 = 8;

/// Where a texture is attached on a framebuffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttachmentPoint {
    /// Color attachment slot `0..MAX_COLOR_ATTACHMENTS`.
    Color(u8),
    Depth,
}

impl AttachmentPoint {
    pub const COLOR0: Self = Self::Color(0);

    #[inline]
    pub const fn is_color(self) -> bool {
        matches!(self, Self::Color(_))
    }
}

impl fmt::Display for AttachmentPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(i) => write!(f, "color{i}"),
            Self::Depth => f.write_str("depth"),
        }
    }
}

/// Result of a framebuffer completeness check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    /// No image is attached at all.
    MissingAttachment,
    /// An attached texture is dead or its format does not fit the point.
    IncompleteAttachment,
    /// Attached images differ in size.
    IncompleteDimensions,
    /// A draw buffer names a point with nothing attached.
    IncompleteDrawBuffer,
    /// The handle does not name a live framebuffer.
    Undefined,
}

impl FramebufferStatus {
    #[inline]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::MissingAttachment => "missing attachment",
            Self::IncompleteAttachment => "incomplete attachment",
            Self::IncompleteDimensions => "attachment dimensions differ",
            Self::IncompleteDrawBuffer => "draw buffer without attachment",
            Self::Undefined => "undefined framebuffer",
        }
    }
}

impl fmt::Display for FramebufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Depth comparison function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    #[default]
    Always,
}

impl CompareOp {
    /// Evaluate `incoming <op> stored`.
    pub fn passes(self, incoming: f32, stored: f32) -> bool {
        match self {
            Self::Never => false,
            Self::Less => incoming < stored,
            Self::Equal => incoming == stored,
            Self::LessEqual => incoming <= stored,
            Self::Greater => incoming > stored,
            Self::NotEqual => incoming != stored,
            Self::GreaterEqual => incoming >= stored,
            Self::Always => true,
        }
    }
}

/// Depth test configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthState {
    pub test: bool,
    pub write: bool,
    pub func: CompareOp,
}

/// Which buffers a clear touches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClearFlags {
    pub color: bool,
    pub depth: bool,
}

impl ClearFlags {
    #[inline]
    pub const fn any(self) -> bool {
        self.color || self.depth
    }
}

/// Rasterizer viewport; the scissor rectangle is set to the same area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn sized(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// Constant and slope scaled depth offset applied to filled polygons.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolygonOffset {
    pub factor: f32,
    pub units: f32,
}

/// A typed uniform upload borrowing its data from the caller.
///
/// Vector and matrix variants hold their components flattened, so a
/// `Vec3` value with two elements carries six floats. Matrices are
/// column-major, sixteen floats per element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue<'a> {
    Uint(&'a [u32]),
    Float(&'a [f32]),
    Vec2(&'a [f32]),
    Vec3(&'a [f32]),
    Vec4(&'a [f32]),
    Mat4(&'a [f32]),
}

impl UniformValue<'_> {
    /// Raw 32-bit words of the value.
    pub fn words(&self) -> &[u32] {
        match *self {
            Self::Uint(values) => values,
            Self::Float(values)
            | Self::Vec2(values)
            | Self::Vec3(values)
            | Self::Vec4(values)
            | Self::Mat4(values) => bytemuck::cast_slice(values),
        }
    }

    /// Number of array elements carried.
    pub fn element_count(&self) -> usize {
        let components = match self {
            Self::Uint(_) | Self::Float(_) => 1,
            Self::Vec2(_) => 2,
            Self::Vec3(_) => 3,
            Self::Vec4(_) => 4,
            Self::Mat4(_) => 16,
        };
        self.words().len() / components
    }
}

/// Immediate-mode graphics API.
///
/// Creation calls return `Err` only when the backend cannot produce an
/// object at all. Shader compile and link errors are also `Err` so the
/// caller can decide how to degrade. Calls taking a handle accept null and
/// dead handles and ignore them.
pub trait GraphicsContext {
    // Resources

    fn create_texture(
        &mut self,
        desc: &TextureDesc,
        pixels: Option<&[u8]>,
    ) -> RhiResult<TextureHandle>;
    fn generate_mipmaps(&mut self, texture: TextureHandle) -> RhiResult<()>;
    fn delete_texture(&mut self, texture: TextureHandle);

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> RhiResult<BufferHandle>;
    fn delete_buffer(&mut self, buffer: BufferHandle);

    fn create_vertex_array(
        &mut self,
        vertex_buffers: &[BufferHandle],
        index_buffer: BufferHandle,
        attributes: &[VertexAttribute],
    ) -> RhiResult<VertexArrayHandle>;
    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    fn create_framebuffer(&mut self) -> RhiResult<FramebufferHandle>;
    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle);
    fn attach_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        point: AttachmentPoint,
        texture: TextureHandle,
    );
    /// Select the color points fragment outputs are written to, in order.
    fn set_draw_buffers(&mut self, framebuffer: FramebufferHandle, points: &[AttachmentPoint]);
    fn framebuffer_status(&self, framebuffer: FramebufferHandle) -> FramebufferStatus;

    // Shaders

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> RhiResult<ShaderHandle>;
    fn delete_shader(&mut self, shader: ShaderHandle);
    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> RhiResult<ProgramHandle>;
    fn delete_program(&mut self, program: ProgramHandle);
    /// Location of an active uniform, [`UniformLocation::UNBOUND`] if absent.
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> UniformLocation;

    // State and commands

    /// Bind a render target. [`FramebufferHandle::NULL`] selects the back buffer.
    fn bind_framebuffer(&mut self, framebuffer: FramebufferHandle);
    fn set_clear_color(&mut self, color: [f32; 4]);
    fn set_clear_depth(&mut self, depth: f32);
    fn set_color_mask(&mut self, enabled: bool);
    fn set_depth_state(&mut self, state: DepthState);
    fn set_viewport(&mut self, viewport: Viewport);
    fn clear(&mut self, flags: ClearFlags);
    fn use_program(&mut self, program: ProgramHandle);
    /// Upload a value to the program bound with [`GraphicsContext::use_program`].
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue<'_>);
    /// Bind a texture to a sampler unit. A null texture unbinds the unit.
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);
    fn bind_vertex_array(&mut self, vertex_array: VertexArrayHandle);
    fn draw_indexed(&mut self, index_count: u32);
    fn set_polygon_offset(&mut self, offset: Option<PolygonOffset>);
    /// Copy one attachment of `source` to the back buffer, scaling to `width`×`height`.
    fn blit_to_back_buffer(
        &mut self,
        source: FramebufferHandle,
        point: AttachmentPoint,
        width: u32,
        height: u32,
    );
    fn push_debug_group(&mut self, name: &str);
    fn pop_debug_group(&mut self);
}
