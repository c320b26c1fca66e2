//! Graphics abstraction layer (Render Hardware Interface).
//!
//! This crate defines the command surface the renderer is written against
//! and the resource factory built on top of it:
//! - Typed object handles
//! - The [`GraphicsContext`] trait and its state types
//! - Texture, buffer and vertex layout creation
//! - GLSL uniform reflection
//! - [`HeadlessContext`], a recording backend

mod error;

pub mod buffer;
pub mod context;
pub mod handle;
pub mod headless;
pub mod shader;
pub mod texture;
pub mod vertex;

pub use context::{
    AttachmentPoint, ClearFlags, CompareOp, DepthState, FramebufferStatus, GraphicsContext,
    PolygonOffset, UniformValue, Viewport,
};
pub use error::{RhiError, RhiResult};
pub use handle::{
    BufferHandle, FramebufferHandle, ProgramHandle, ShaderHandle, TextureHandle, UniformLocation,
    VertexArrayHandle,
};
pub use headless::HeadlessContext;
pub use shader::ShaderStage;
pub use texture::{TextureDesc, TextureFormat};
