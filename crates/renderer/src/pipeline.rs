//! The forward pipeline: eight passes wired by texture handle.
//!
//! # Wiring
//!
//! | Pass          | Samples                                              | Writes                         |
//! |---------------|------------------------------------------------------|--------------------------------|
//! | depth pre-pass| -                                                    | depth (owned)                  |
//! | shadow map    | -                                                    | shadow depth (owned)           |
//! | lighting      | shadow depth                                         | color (owned), pre-pass depth  |
//! | transparency  | shadow depth                                         | lighting color, pre-pass depth |
//! | velocity      | pre-pass depth                                       | color (owned), pre-pass depth  |
//! | TAA (A / B)   | lighting, pre-pass depth, history, velocity          | TAA texture A / B              |
//! | tone mapping  | tone-map input                                       | color (owned)                  |
//! | debug         | lighting, depth, velocity, tone-mapped, TAA pair     | color (owned)                  |
//!
//! The TAA textures belong to the pipeline. Only handles are passed
//! between passes; nothing is copied.

use std::mem::offset_of;
use std::path::Path;

use lumen_core::{DiagnosticKind, Diagnostics, LumenConfig, Result};
use lumen_rhi::texture::create_texture;
use lumen_rhi::{
    AttachmentPoint, CompareOp, FramebufferHandle, GraphicsContext, TextureDesc, TextureHandle,
};
use lumen_scene::POINT_LIGHT_COUNT;
use tracing::info;

use crate::frame_context::FrameUniforms;
use crate::model::{MaterialTextures, RenderModel};
use crate::render_pass::{
    create_render_pass, delete_render_pass, AttachmentDesc, CapacityError, RenderPass,
    SubPassDescriptor,
};
use crate::shader::{load_sources, ShaderProgram};
use crate::taa::TaaState;
use crate::uniform::{InstanceSource, UniformKind, UniformLayout};

/// Number of passes in [`ForwardPipeline`].
pub const FORWARD_PASS_COUNT: usize = 8;

/// Debug pass dependency slot holding the TAA history.
const DEBUG_HISTORY_SLOT: usize = 4;
/// Debug pass dependency slot holding the current TAA resolve.
const DEBUG_CURRENT_SLOT: usize = 5;

/// Identifies a pass; the discriminant is its execution index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassId {
    DepthPrePass,
    ShadowMapping,
    Lighting,
    Transparency,
    Velocity,
    Taa,
    ToneMapping,
    Debug,
}

impl PassId {
    /// Every pass in execution order.
    pub const ALL: [PassId; FORWARD_PASS_COUNT] = [
        Self::DepthPrePass,
        Self::ShadowMapping,
        Self::Lighting,
        Self::Transparency,
        Self::Velocity,
        Self::Taa,
        Self::ToneMapping,
        Self::Debug,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Debug group name of the pass.
    pub const fn name(self) -> &'static str {
        match self {
            Self::DepthPrePass => "Depth Pre-Pass",
            Self::ShadowMapping => "Shadow Mapping",
            Self::Lighting => "Lighting",
            Self::Transparency => "Transparency",
            Self::Velocity => "Velocity",
            Self::Taa => "Temporal Pass",
            Self::ToneMapping => "Tone Mapping",
            Self::Debug => "Debug",
        }
    }

    /// File stem of the pass's `.vert` / `.frag` sources.
    pub const fn shader_stem(self) -> &'static str {
        match self {
            Self::DepthPrePass => "depth_pre_pass",
            Self::ShadowMapping => "shadow_mapping",
            Self::Lighting | Self::Transparency => "lighting",
            Self::Velocity => "velocity",
            Self::Taa => "taa",
            Self::ToneMapping => "tone_mapping",
            Self::Debug => "debug",
        }
    }

    /// Name of the program built for the pass.
    pub const fn program_name(self) -> &'static str {
        match self {
            Self::Transparency => "transparency",
            _ => self.shader_stem(),
        }
    }
}

/// Uniforms each pass reads, by name as declared in the shaders.
pub fn uniform_layout(pass: PassId) -> UniformLayout {
    use UniformKind::{Float, Mat4, Uint, Vec2, Vec3};

    let model_transform = offset_of!(RenderModel, transform);
    match pass {
        PassId::DepthPrePass => UniformLayout::new()
            .global("uTaaEnabledUint", offset_of!(FrameUniforms, taa_enabled), Uint)
            .global(
                "uTaaJitterEnabledUint",
                offset_of!(FrameUniforms, taa_jitter_enabled),
                Uint,
            )
            .global("uProjMat", offset_of!(FrameUniforms, projection), Mat4)
            .global(
                "uProjUnjitMat",
                offset_of!(FrameUniforms, projection_unjittered),
                Mat4,
            )
            .global("uViewMat", offset_of!(FrameUniforms, view), Mat4)
            .instance("uModelMat", InstanceSource::Models, model_transform, Mat4),

        PassId::ShadowMapping => UniformLayout::new()
            .global("uProjMat", offset_of!(FrameUniforms, light_projection), Mat4)
            .global("uViewMat", offset_of!(FrameUniforms, light_view), Mat4)
            .instance("uModelMat", InstanceSource::Models, model_transform, Mat4),

        PassId::Lighting | PassId::Transparency => {
            let textures = offset_of!(RenderModel, textures);
            UniformLayout::new()
                .global("uRenderModeUint", offset_of!(FrameUniforms, render_mode), Uint)
                .global(
                    "uDirectLightEnabledUint",
                    offset_of!(FrameUniforms, direct_light_enabled),
                    Uint,
                )
                .global(
                    "uPointLightEnabledUint",
                    offset_of!(FrameUniforms, point_light_enabled),
                    Uint,
                )
                .global(
                    "uShadowMappingEnabledUint",
                    offset_of!(FrameUniforms, shadow_mapping_enabled),
                    Uint,
                )
                .global(
                    "uBumpMappingEnabledUint",
                    offset_of!(FrameUniforms, bump_mapping_enabled),
                    Uint,
                )
                .global("uTaaEnabledUint", offset_of!(FrameUniforms, taa_enabled), Uint)
                .global(
                    "uTaaJitterEnabledUint",
                    offset_of!(FrameUniforms, taa_jitter_enabled),
                    Uint,
                )
                .global(
                    "uBumpMapScaleFactorFloat",
                    offset_of!(FrameUniforms, bump_map_scale),
                    Float,
                )
                .global(
                    "uAmbientLightRadiantFluxFloat",
                    offset_of!(FrameUniforms, ambient_flux),
                    Float,
                )
                .global(
                    "uDirectLightRadiantFluxFloat",
                    offset_of!(FrameUniforms, direct_light_flux),
                    Float,
                )
                .global(
                    "uPointLightRadiantFluxFloat",
                    offset_of!(FrameUniforms, point_light_flux),
                    Float,
                )
                .global("uCameraPos", offset_of!(FrameUniforms, camera_position), Vec3)
                .global_array(
                    "uPointLightPosVec3Array",
                    offset_of!(FrameUniforms, point_lights),
                    Vec3,
                    POINT_LIGHT_COUNT,
                )
                .global("uProjMat", offset_of!(FrameUniforms, projection), Mat4)
                .global(
                    "uProjUnjitMat",
                    offset_of!(FrameUniforms, projection_unjittered),
                    Mat4,
                )
                .global("uViewMat", offset_of!(FrameUniforms, view), Mat4)
                .global(
                    "uDirLightProjMat",
                    offset_of!(FrameUniforms, light_projection),
                    Mat4,
                )
                .global("uDirLightViewMat", offset_of!(FrameUniforms, light_view), Mat4)
                .instance(
                    "uBumpMapAvailableUint",
                    InstanceSource::Models,
                    textures + offset_of!(MaterialTextures, bump),
                    Uint,
                )
                .instance(
                    "uMetallicMapAvailableUint",
                    InstanceSource::Models,
                    textures + offset_of!(MaterialTextures, metallic),
                    Uint,
                )
                .instance(
                    "uRoughnessMapAvailableUint",
                    InstanceSource::Models,
                    textures + offset_of!(MaterialTextures, roughness),
                    Uint,
                )
                .instance(
                    "uDebugRenderModeEnabledUint",
                    InstanceSource::Models,
                    offset_of!(RenderModel, debug_draw),
                    Uint,
                )
                .instance(
                    "uBrdfUint",
                    InstanceSource::Models,
                    offset_of!(RenderModel, brdf),
                    Uint,
                )
                .instance(
                    "uColor",
                    InstanceSource::Models,
                    offset_of!(RenderModel, color),
                    Vec3,
                )
                .instance("uModelMat", InstanceSource::Models, model_transform, Mat4)
        }

        PassId::Velocity => UniformLayout::new()
            .global("uPrevViewMat4", offset_of!(FrameUniforms, prev_view), Mat4)
            .global(
                "uPrevProjUnjitMat4",
                offset_of!(FrameUniforms, prev_projection_unjittered),
                Mat4,
            )
            .global("uViewMat4", offset_of!(FrameUniforms, view), Mat4)
            .global(
                "uProjUnjitMat4",
                offset_of!(FrameUniforms, projection_unjittered),
                Mat4,
            )
            .instance("uPrevModelMat4", InstanceSource::PreviousTransforms, 0, Mat4)
            .instance("uModelMat4", InstanceSource::Models, model_transform, Mat4),

        PassId::Taa => UniformLayout::new()
            .global("uFrameCountUint", offset_of!(FrameUniforms, frame_count), Uint)
            .global("uTaaEnabledUint", offset_of!(FrameUniforms, taa_enabled), Uint)
            .global(
                "uTaaJitterEnabledUint",
                offset_of!(FrameUniforms, taa_jitter_enabled),
                Uint,
            )
            .global("uJitterVec2", offset_of!(FrameUniforms, jitter), Vec2)
            .global("uViewMat", offset_of!(FrameUniforms, view), Mat4)
            .global("uProjMat", offset_of!(FrameUniforms, projection), Mat4)
            .global(
                "uProjUnjitMat",
                offset_of!(FrameUniforms, projection_unjittered),
                Mat4,
            )
            .global("uPrevViewMat", offset_of!(FrameUniforms, prev_view), Mat4)
            .global("uPrevProjMat", offset_of!(FrameUniforms, prev_projection), Mat4)
            .global(
                "uPrevProjUnjitMat",
                offset_of!(FrameUniforms, prev_projection_unjittered),
                Mat4,
            ),

        PassId::ToneMapping => UniformLayout::new().global(
            "uToneMappingEnabledUint",
            offset_of!(FrameUniforms, tone_mapping_enabled),
            Uint,
        ),

        PassId::Debug => UniformLayout::new().global(
            "uTaaEnabledUint",
            offset_of!(FrameUniforms, taa_enabled),
            Uint,
        ),
    }
}

/// One program per pass, indexed by [`PassId`].
#[derive(Debug, Default)]
pub struct ForwardPrograms {
    programs: [ShaderProgram; FORWARD_PASS_COUNT],
}

impl ForwardPrograms {
    pub fn new(programs: [ShaderProgram; FORWARD_PASS_COUNT]) -> Self {
        Self { programs }
    }

    /// Read every pass's sources from `dir` and compile them.
    ///
    /// All files are read before anything is compiled, so a missing file
    /// leaves no objects behind.
    ///
    /// # Errors
    /// [`lumen_core::Error::Shader`] if a source file cannot be read.
    pub fn load<G: GraphicsContext + ?Sized>(
        gfx: &mut G,
        dir: &Path,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let mut sources = Vec::with_capacity(FORWARD_PASS_COUNT);
        for pass in PassId::ALL {
            let stem = pass.shader_stem();
            sources.push(load_sources(dir, &format!("{stem}.vert"), &format!("{stem}.frag"))?);
        }

        let programs = std::array::from_fn(|i| {
            let (vertex, fragment) = &sources[i];
            ShaderProgram::from_sources(gfx, PassId::ALL[i].program_name(), vertex, fragment, diagnostics)
        });
        info!("Loaded forward programs from {}", dir.display());
        Ok(Self { programs })
    }

    pub fn get(&self, pass: PassId) -> &ShaderProgram {
        &self.programs[pass.index()]
    }

    /// Resolve each program's [`uniform_layout`].
    pub fn bind_uniforms<G: GraphicsContext + ?Sized>(&mut self, gfx: &G, diagnostics: &mut Diagnostics) {
        for (pass, program) in PassId::ALL.into_iter().zip(self.programs.iter_mut()) {
            program.bind_uniforms(gfx, &uniform_layout(pass), diagnostics);
        }
    }

    /// Free programs that never made it into a pipeline.
    pub fn delete<G: GraphicsContext + ?Sized>(self, gfx: &mut G) {
        for mut program in self.programs {
            program.delete(gfx);
        }
    }
}

/// Sizes the pipeline allocates its targets at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineSettings {
    pub width: u32,
    pub height: u32,
    pub shadow_map_size: u32,
}

impl PipelineSettings {
    pub fn from_config(config: &LumenConfig) -> Self {
        Self {
            width: config.window.width,
            height: config.window.height,
            shadow_map_size: config.shadow.map_size,
        }
    }
}

/// Textures produced so far, threaded into later passes.
#[derive(Clone, Copy, Debug)]
struct Links {
    prepass_depth: TextureHandle,
    shadow_depth: TextureHandle,
    lighting_color: TextureHandle,
    velocity_color: TextureHandle,
    tone_input: TextureHandle,
    tone_mapped: TextureHandle,
    taa: [TextureHandle; 2],
    taa_state: TaaState,
}

fn subpass(
    dependencies: &[TextureHandle],
    attachments: &[AttachmentDesc],
) -> std::result::Result<SubPassDescriptor, CapacityError> {
    let mut desc = SubPassDescriptor::new();
    for texture in dependencies {
        desc.push_dependency(*texture)?;
    }
    for attachment in attachments {
        desc.push_attachment(*attachment)?;
    }
    Ok(desc)
}

fn describe(
    pass: PassId,
    links: &Links,
    settings: &PipelineSettings,
) -> std::result::Result<Vec<SubPassDescriptor>, CapacityError> {
    use AttachmentPoint::Depth;
    const COLOR0: AttachmentPoint = AttachmentPoint::COLOR0;

    let (w, h) = (settings.width, settings.height);
    let color = AttachmentDesc::allocate(COLOR0, TextureDesc::color_attachment(w, h));
    let prepass_depth = AttachmentDesc::existing(Depth, links.prepass_depth);

    let descs = match pass {
        PassId::DepthPrePass => vec![subpass(
            &[],
            &[AttachmentDesc::allocate(Depth, TextureDesc::depth(w, h))],
        )?
        .with_depth(CompareOp::Less, true)
        .clearing_depth(1.0)],

        PassId::ShadowMapping => {
            let size = settings.shadow_map_size;
            vec![subpass(
                &[],
                &[AttachmentDesc::allocate(Depth, TextureDesc::depth(size, size))],
            )?
            .with_depth(CompareOp::Less, true)
            .clearing_depth(1.0)]
        }

        PassId::Lighting => vec![subpass(&[links.shadow_depth], &[color, prepass_depth])?
            .with_depth(CompareOp::LessEqual, false)
            .with_color_write(true)
            .clearing_color([1.0; 4])],

        PassId::Transparency => vec![subpass(
            &[links.shadow_depth],
            &[
                AttachmentDesc::existing(COLOR0, links.lighting_color),
                prepass_depth,
            ],
        )?
        .with_depth(CompareOp::LessEqual, false)
        .with_color_write(true)],

        PassId::Velocity => vec![subpass(&[links.prepass_depth], &[color, prepass_depth])?
            .with_depth(CompareOp::LessEqual, false)
            .with_color_write(true)
            .clearing_color([0.0; 4])],

        PassId::Taa => {
            let [a, b] = links.taa;
            let resolve = |history: TextureHandle, target: TextureHandle| {
                subpass(
                    &[
                        links.lighting_color,
                        links.prepass_depth,
                        history,
                        links.velocity_color,
                    ],
                    &[AttachmentDesc::existing(COLOR0, target)],
                )
                .map(|desc| {
                    desc.with_depth(CompareOp::Always, false)
                        .with_color_write(true)
                        .clearing_color([0.0; 4])
                })
            };
            vec![resolve(b, a)?, resolve(a, b)?]
        }

        PassId::ToneMapping => vec![subpass(&[links.tone_input], &[color])?
            .with_depth(CompareOp::Always, false)
            .with_color_write(true)
            .clearing_color([0.0; 4])],

        PassId::Debug => {
            let mut dependencies = [
                links.lighting_color,
                links.prepass_depth,
                links.velocity_color,
                links.tone_mapped,
                TextureHandle::NULL,
                TextureHandle::NULL,
            ];
            dependencies[DEBUG_HISTORY_SLOT] = links.taa[links.taa_state.history_index()];
            dependencies[DEBUG_CURRENT_SLOT] = links.taa[links.taa_state.index()];
            vec![subpass(&dependencies, &[color])?
                .with_depth(CompareOp::Always, false)
                .with_color_write(true)
                .clearing_color([0.0; 4])]
        }
    };
    Ok(descs)
}

/// The forward renderer's passes and the state carried between frames.
#[derive(Debug)]
pub struct ForwardPipeline {
    /// One pass per [`PassId`], in execution order.
    passes: Vec<RenderPass>,
    taa_textures: [TextureHandle; 2],
    taa_state: TaaState,
    frame_count: u32,
    settings: PipelineSettings,
}

impl ForwardPipeline {
    /// Build every pass, consuming the programs.
    pub fn create<G: GraphicsContext + ?Sized>(
        gfx: &mut G,
        programs: ForwardPrograms,
        settings: PipelineSettings,
    ) -> (Self, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let mut pipeline = Self::empty(settings);
        pipeline.taa_textures = create_taa_textures(gfx, &settings, &mut diagnostics);

        for (pass, program) in PassId::ALL.into_iter().zip(programs.programs) {
            let descs = pipeline.describe(pass, &mut diagnostics);
            let (size_w, size_h) = pipeline.pass_size(pass);
            let (render_pass, pass_diagnostics) =
                create_render_pass(gfx, pass.name(), descs, program, size_w, size_h);
            diagnostics.extend(pass_diagnostics);
            pipeline.passes.push(render_pass);
        }
        pipeline.apply_taa_state();

        info!(
            "Forward pipeline created at {}x{} ({} diagnostics)",
            settings.width,
            settings.height,
            diagnostics.len()
        );
        (pipeline, diagnostics)
    }

    /// Free every pass, then the TAA pair.
    pub fn delete<G: GraphicsContext + ?Sized>(self, gfx: &mut G) {
        for pass in self.passes {
            delete_render_pass(gfx, pass);
        }
        for texture in self.taa_textures {
            gfx.delete_texture(texture);
        }
    }

    /// Delete every pass and build them again, e.g. after shader sources
    /// changed. TAA history and the frame count start over.
    pub fn rebuild<G: GraphicsContext + ?Sized>(
        &mut self,
        gfx: &mut G,
        programs: ForwardPrograms,
        settings: PipelineSettings,
    ) -> Diagnostics {
        std::mem::replace(self, Self::empty(settings)).delete(gfx);
        let (pipeline, diagnostics) = Self::create(gfx, programs, settings);
        *self = pipeline;
        diagnostics
    }

    fn empty(settings: PipelineSettings) -> Self {
        Self {
            passes: Vec::with_capacity(FORWARD_PASS_COUNT),
            taa_textures: [TextureHandle::NULL; 2],
            taa_state: TaaState::default(),
            frame_count: 0,
            settings,
        }
    }

    /// Reallocate viewport-sized targets, keeping programs and the shadow map.
    ///
    /// Zero sizes are ignored.
    pub fn resize<G: GraphicsContext + ?Sized>(&mut self, gfx: &mut G, width: u32, height: u32) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        if width == 0 || height == 0 {
            return diagnostics;
        }
        self.settings.width = width;
        self.settings.height = height;

        for texture in self.taa_textures {
            gfx.delete_texture(texture);
        }
        self.taa_textures = create_taa_textures(gfx, &self.settings, &mut diagnostics);

        for pass in PassId::ALL {
            if pass == PassId::ShadowMapping {
                continue;
            }
            let descs = self.describe(pass, &mut diagnostics);
            let render_pass = &mut self.passes[pass.index()];
            for (subpass, desc) in render_pass.subpasses_mut().iter_mut().zip(descs) {
                *subpass.descriptor_mut() = desc;
            }
            diagnostics.extend(render_pass.reallocate(gfx, width, height));
        }
        self.apply_taa_state();

        info!("Forward pipeline resized to {}x{}", width, height);
        diagnostics
    }

    fn describe(&self, pass: PassId, diagnostics: &mut Diagnostics) -> Vec<SubPassDescriptor> {
        describe(pass, &self.links(), &self.settings).unwrap_or_else(|e| {
            diagnostics.push(DiagnosticKind::CapacityExceeded, pass.name(), e.to_string());
            Vec::new()
        })
    }

    fn pass_size(&self, pass: PassId) -> (u32, u32) {
        match pass {
            PassId::ShadowMapping => (self.settings.shadow_map_size, self.settings.shadow_map_size),
            _ => (self.settings.width, self.settings.height),
        }
    }

    fn links(&self) -> Links {
        let output = |pass: PassId, point: AttachmentPoint| {
            self.passes
                .get(pass.index())
                .map_or(TextureHandle::NULL, |p| p.output(0, point))
        };
        let lighting_color = output(PassId::Lighting, AttachmentPoint::COLOR0);
        Links {
            prepass_depth: output(PassId::DepthPrePass, AttachmentPoint::Depth),
            shadow_depth: output(PassId::ShadowMapping, AttachmentPoint::Depth),
            lighting_color,
            velocity_color: output(PassId::Velocity, AttachmentPoint::COLOR0),
            tone_input: if self.frame_count == 0 {
                lighting_color
            } else {
                self.taa_textures[self.taa_state.index()]
            },
            tone_mapped: output(PassId::ToneMapping, AttachmentPoint::COLOR0),
            taa: self.taa_textures,
            taa_state: self.taa_state,
        }
    }

    fn apply_taa_state(&mut self) {
        let active = self.taa_state.index();
        if let Some(pass) = self.passes.get_mut(PassId::Taa.index()) {
            for (i, subpass) in pass.subpasses_mut().iter_mut().enumerate() {
                subpass.active = i == active && subpass.is_complete();
            }
        }
    }

    /// Advance the ping-pong after the TAA pass ran.
    pub fn finish_taa(&mut self) {
        self.taa_state = self.taa_state.next();
        self.frame_count = self.frame_count.wrapping_add(1);
        self.apply_taa_state();
    }

    /// Point tone mapping at the texture the next TAA resolve writes.
    pub fn repoint_tone_mapping(&mut self) {
        let target = self.taa_textures[self.taa_state.index()];
        if let Some(subpass) = self.passes[PassId::ToneMapping.index()].subpass_mut(0) {
            subpass.descriptor_mut().set_dependency(0, target);
        }
    }

    /// Exchange the debug pass's history and current TAA inputs.
    pub fn swap_debug_history(&mut self) {
        if let Some(subpass) = self.passes[PassId::Debug.index()].subpass_mut(0) {
            subpass
                .descriptor_mut()
                .swap_dependencies(DEBUG_HISTORY_SLOT, DEBUG_CURRENT_SLOT);
        }
    }

    pub fn pass(&self, pass: PassId) -> &RenderPass {
        &self.passes[pass.index()]
    }

    pub fn pass_mut(&mut self, pass: PassId) -> &mut RenderPass {
        &mut self.passes[pass.index()]
    }

    pub fn passes(&self) -> &[RenderPass] {
        &self.passes
    }

    pub fn passes_mut(&mut self) -> &mut [RenderPass] {
        &mut self.passes
    }

    pub fn depth_pre_pass(&self) -> &RenderPass {
        self.pass(PassId::DepthPrePass)
    }

    pub fn shadow_mapping(&self) -> &RenderPass {
        self.pass(PassId::ShadowMapping)
    }

    pub fn lighting(&self) -> &RenderPass {
        self.pass(PassId::Lighting)
    }

    pub fn transparency(&self) -> &RenderPass {
        self.pass(PassId::Transparency)
    }

    pub fn velocity(&self) -> &RenderPass {
        self.pass(PassId::Velocity)
    }

    pub fn taa(&self) -> &RenderPass {
        self.pass(PassId::Taa)
    }

    pub fn tone_mapping(&self) -> &RenderPass {
        self.pass(PassId::ToneMapping)
    }

    pub fn debug(&self) -> &RenderPass {
        self.pass(PassId::Debug)
    }

    pub fn taa_state(&self) -> TaaState {
        self.taa_state
    }

    pub fn taa_textures(&self) -> [TextureHandle; 2] {
        self.taa_textures
    }

    /// TAA resolves executed since creation.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Framebuffer holding the final image.
    pub fn output_framebuffer(&self) -> FramebufferHandle {
        self.debug()
            .subpass(0)
            .map_or(FramebufferHandle::NULL, |s| s.framebuffer())
    }
}

fn create_taa_textures<G: GraphicsContext + ?Sized>(
    gfx: &mut G,
    settings: &PipelineSettings,
    diagnostics: &mut Diagnostics,
) -> [TextureHandle; 2] {
    let desc = TextureDesc::color_attachment(settings.width, settings.height);
    [(); 2].map(|_| {
        create_texture(gfx, &desc, None).unwrap_or_else(|e| {
            diagnostics.push(
                DiagnosticKind::FramebufferIncomplete,
                PassId::Taa.name(),
                format!("history texture: {e}"),
            );
            TextureHandle::NULL
        })
    })
}
