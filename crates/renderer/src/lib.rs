//! Render pass pipeline and uniform binding engine.
//!
//! This crate orchestrates the rendering process:
//! - Uniform binding from plain-data records by byte offset
//! - Shader programs and their resolved bindings
//! - Render passes, subpasses and framebuffer wiring
//! - The forward pipeline and its temporal state
//! - Per-frame execution and the frame driver

pub mod executor;
pub mod frame_context;
pub mod model;
pub mod pipeline;
pub mod render_pass;
pub mod renderer;
pub mod shader;
pub mod taa;
pub mod uniform;

pub use executor::{execute_back_buffer_blit, execute_render_pass};
pub use frame_context::{FrameContext, FrameUniforms, RenderMode};
pub use model::{Brdf, MaterialTextures, RenderModel};
pub use pipeline::{
    uniform_layout, ForwardPipeline, ForwardPrograms, PassId, PipelineSettings, FORWARD_PASS_COUNT,
};
pub use render_pass::{
    create_render_pass, delete_render_pass, AttachmentDesc, AttachmentSource, CapacityError,
    RenderPass, SubPass, SubPassDescriptor,
};
pub use renderer::Renderer;
pub use shader::ShaderProgram;
pub use taa::TaaState;
pub use uniform::{BindingTable, FieldAccessor, InstanceData, InstanceSource, UniformKind, UniformLayout};
