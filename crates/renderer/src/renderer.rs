//! Frame driver.
//!
//! [`Renderer`] owns the pipeline, the scene models and the frame context
//! and runs the passes in their fixed order once per frame. Hot reloads and
//! resizes are requested at any time and applied before the next frame.

use std::path::PathBuf;

use glam::Mat4;
use lumen_core::{Diagnostics, LumenConfig, Result, Timer};
use lumen_rhi::texture::{create_placeholder_texture, TextureCache, TextureSource};
use lumen_rhi::{AttachmentPoint, GraphicsContext, PolygonOffset, TextureHandle};
use lumen_scene::MeshData;
use tracing::{debug, info, trace};

use crate::executor::{execute_back_buffer_blit, execute_render_pass};
use crate::frame_context::FrameContext;
use crate::model::RenderModel;
use crate::pipeline::{ForwardPipeline, ForwardPrograms, PipelineSettings};
use crate::uniform::InstanceData;

/// Drives the forward pipeline over a set of models.
#[derive(Debug)]
pub struct Renderer {
    shader_dir: PathBuf,
    pipeline: ForwardPipeline,
    frame: FrameContext,
    models: Vec<RenderModel>,
    /// Bounding-box helpers drawn by the transparency pass.
    bounds_models: Vec<RenderModel>,
    quad: RenderModel,
    unit_cube: RenderModel,
    /// Stands in for null material maps.
    placeholder: TextureHandle,
    textures: TextureCache,
    depth_bias: PolygonOffset,
    reload_requested: bool,
    pending_resize: Option<(u32, u32)>,
    timer: Timer,
}

impl Renderer {
    /// Load the shaders named by `config` and build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, a shader source
    /// cannot be read, or the shared meshes and placeholder texture cannot
    /// be created. Compile failures and incomplete framebuffers are returned
    /// as diagnostics instead.
    pub fn new<G: GraphicsContext + ?Sized>(
        gfx: &mut G,
        config: &LumenConfig,
    ) -> Result<(Self, Diagnostics)> {
        config.validate()?;
        let settings = PipelineSettings::from_config(config);
        info!(
            "Initializing renderer ({}x{}, shadow map {})",
            settings.width, settings.height, settings.shadow_map_size
        );

        let quad = RenderModel::upload(gfx, &MeshData::fullscreen_quad(), Mat4::IDENTITY)?;
        let unit_cube = match RenderModel::upload(gfx, &MeshData::cube(1.0), Mat4::IDENTITY) {
            Ok(cube) => cube,
            Err(e) => {
                quad.release(gfx);
                return Err(e.into());
            }
        };
        let placeholder = match create_placeholder_texture(gfx) {
            Ok(texture) => texture,
            Err(e) => {
                quad.release(gfx);
                unit_cube.release(gfx);
                return Err(e.into());
            }
        };

        let mut diagnostics = Diagnostics::new();
        let shader_dir = config.shaders.directory.clone();
        let mut programs = match ForwardPrograms::load(gfx, &shader_dir, &mut diagnostics) {
            Ok(programs) => programs,
            Err(e) => {
                quad.release(gfx);
                unit_cube.release(gfx);
                gfx.delete_texture(placeholder);
                return Err(e);
            }
        };
        programs.bind_uniforms(&*gfx, &mut diagnostics);
        let (pipeline, pipeline_diagnostics) = ForwardPipeline::create(gfx, programs, settings);
        diagnostics.extend(pipeline_diagnostics);

        let renderer = Self {
            shader_dir,
            pipeline,
            frame: FrameContext::new(config, settings.width, settings.height),
            models: Vec::new(),
            bounds_models: Vec::new(),
            quad,
            unit_cube,
            placeholder,
            textures: TextureCache::new(),
            depth_bias: PolygonOffset {
                factor: config.shadow.depth_bias_scale,
                units: config.shadow.depth_unit_scale,
            },
            reload_requested: false,
            pending_resize: None,
            timer: Timer::new(),
        };
        Ok((renderer, diagnostics))
    }

    /// Take ownership of a model; it is released on [`Renderer::shutdown`].
    pub fn add_model(&mut self, model: RenderModel) {
        self.models.push(model);
    }

    /// Upload a material map, reusing the texture of an already loaded
    /// image. Cached textures are released on [`Renderer::shutdown`].
    ///
    /// # Errors
    ///
    /// Returns an error if the channel count is unsupported or the pixel
    /// data does not match the image size.
    pub fn load_texture<G: GraphicsContext + ?Sized>(
        &mut self,
        gfx: &mut G,
        source: &TextureSource,
    ) -> Result<TextureHandle> {
        Ok(self.textures.get_or_create(gfx, source)?)
    }

    /// Texture bound for material maps a model leaves null.
    pub fn placeholder_texture(&self) -> TextureHandle {
        self.placeholder
    }

    pub fn models(&self) -> &[RenderModel] {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut [RenderModel] {
        &mut self.models
    }

    pub fn frame_context(&self) -> &FrameContext {
        &self.frame
    }

    pub fn frame_context_mut(&mut self) -> &mut FrameContext {
        &mut self.frame
    }

    pub fn pipeline(&self) -> &ForwardPipeline {
        &self.pipeline
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Reload every shader and rebuild the pipeline before the next frame.
    pub fn request_hot_reload(&mut self) {
        self.reload_requested = true;
    }

    /// Resize viewport-sized targets before the next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!("Ignoring resize to zero dimensions");
            return;
        }
        debug!("Resize requested: {}x{}", width, height);
        self.pending_resize = Some((width, height));
    }

    /// Render one frame and blit it to the back buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if a requested hot reload cannot read its shader
    /// sources. The current pipeline is kept and no frame is rendered.
    pub fn render_frame<G: GraphicsContext + ?Sized>(&mut self, gfx: &mut G) -> Result<Diagnostics> {
        let mut diagnostics = Diagnostics::new();

        if self.reload_requested {
            self.reload_requested = false;
            self.hot_reload(gfx, &mut diagnostics)?;
        }
        if let Some((width, height)) = self.pending_resize.take() {
            self.frame.set_viewport(width, height);
            diagnostics.extend(self.pipeline.resize(gfx, width, height));
        }

        self.frame.prepare(&self.models, self.pipeline.frame_count());
        if self.frame.features.draw_aabbs {
            self.bounds_models.clear();
            let unit_cube = &self.unit_cube;
            self.bounds_models
                .extend(self.models.iter().map(|model| model.bounds_helper(unit_cube)));
        }

        let uniforms = self.frame.uniforms();
        let scene = InstanceData::new(&self.models, self.frame.previous_transforms())
            .with_placeholder(self.placeholder);
        let quad = InstanceData::models(std::slice::from_ref(&self.quad));

        gfx.set_polygon_offset(Some(self.depth_bias));
        execute_render_pass(gfx, self.pipeline.depth_pre_pass(), uniforms, &scene);
        gfx.set_polygon_offset(None);

        execute_render_pass(gfx, self.pipeline.shadow_mapping(), uniforms, &scene);
        execute_render_pass(gfx, self.pipeline.lighting(), uniforms, &scene);
        if self.frame.features.draw_aabbs {
            let helpers = InstanceData::models(&self.bounds_models).with_placeholder(self.placeholder);
            execute_render_pass(gfx, self.pipeline.transparency(), uniforms, &helpers);
        }
        execute_render_pass(gfx, self.pipeline.velocity(), uniforms, &scene);

        execute_render_pass(gfx, self.pipeline.taa(), uniforms, &quad);
        self.pipeline.finish_taa();

        execute_render_pass(gfx, self.pipeline.tone_mapping(), uniforms, &quad);
        self.pipeline.repoint_tone_mapping();

        execute_render_pass(gfx, self.pipeline.debug(), uniforms, &quad);
        self.pipeline.swap_debug_history();

        let settings = self.pipeline.settings();
        execute_back_buffer_blit(
            gfx,
            self.pipeline.output_framebuffer(),
            AttachmentPoint::COLOR0,
            settings.width,
            settings.height,
        );

        let delta = self.timer.tick();
        trace!("Frame {} rendered in {:?}", self.timer.frames(), delta);
        Ok(diagnostics)
    }

    fn hot_reload<G: GraphicsContext + ?Sized>(&mut self, gfx: &mut G, diagnostics: &mut Diagnostics) -> Result<()> {
        let mut programs = ForwardPrograms::load(gfx, &self.shader_dir, diagnostics)?;
        programs.bind_uniforms(&*gfx, diagnostics);

        let settings = *self.pipeline.settings();
        diagnostics.extend(self.pipeline.rebuild(gfx, programs, settings));
        info!(
            "Hot reload: backbuffer size {}x{}",
            settings.width, settings.height
        );
        Ok(())
    }

    /// Release the pipeline, every model and every texture the renderer
    /// created.
    pub fn shutdown<G: GraphicsContext + ?Sized>(mut self, gfx: &mut G) {
        self.pipeline.delete(gfx);
        for model in &self.models {
            model.release(gfx);
        }
        self.quad.release(gfx);
        self.unit_cube.release(gfx);
        self.textures.release(gfx);
        gfx.delete_texture(self.placeholder);
        info!("Renderer destroyed after {} frames", self.timer.frames());
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use std::sync::Arc;

    use glam::Vec3;
    use lumen_rhi::HeadlessContext;

    use super::*;
    use crate::pipeline::PassId;

    const SHADER_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../shaders");

    fn config(width: u32, height: u32) -> LumenConfig {
        let mut config = LumenConfig::default();
        config.window.width = width;
        config.window.height = height;
        config.shadow.map_size = 256;
        config.shaders.directory = PathBuf::from(SHADER_DIR);
        config
    }

    fn renderer(gfx: &mut HeadlessContext) -> Renderer {
        let (mut renderer, diagnostics) = Renderer::new(gfx, &config(64, 48)).unwrap();
        assert!(!diagnostics.has_errors(), "{diagnostics:?}");
        let cube = RenderModel::upload(gfx, &MeshData::cube(10.0), Mat4::IDENTITY).unwrap();
        renderer.add_model(cube);
        renderer
    }

    #[test]
    fn test_frame_runs_every_pass_in_order() {
        let mut gfx = HeadlessContext::new();
        let mut renderer = renderer(&mut gfx);
        renderer.render_frame(&mut gfx).unwrap();

        let passes: Vec<_> = gfx.draw_calls().iter().map(|d| d.pass.as_str()).collect();
        assert_eq!(
            passes,
            [
                PassId::DepthPrePass.name(),
                PassId::ShadowMapping.name(),
                PassId::Lighting.name(),
                PassId::Velocity.name(),
                PassId::Taa.name(),
                PassId::ToneMapping.name(),
                PassId::Debug.name(),
            ]
        );
        assert!(gfx.state().polygon_offset.is_none());
        assert_eq!(renderer.pipeline().frame_count(), 1);

        renderer.shutdown(&mut gfx);
        assert_eq!(gfx.resource_counts().total(), 0);
    }

    #[test]
    fn test_null_material_maps_use_placeholder() {
        let mut gfx = HeadlessContext::new();
        let mut renderer = renderer(&mut gfx);
        let placeholder = renderer.placeholder_texture();
        assert!(gfx.is_texture_live(placeholder));

        let pixels: Arc<[u8]> = vec![255u8; 4 * 4 * 4].into();
        let albedo_source = TextureSource {
            width: 4,
            height: 4,
            channels: 4,
            pixels,
        };
        let albedo = renderer.load_texture(&mut gfx, &albedo_source).unwrap();
        assert_eq!(renderer.load_texture(&mut gfx, &albedo_source.clone()).unwrap(), albedo);
        renderer.models_mut()[0].textures.albedo = albedo;
        renderer.render_frame(&mut gfx).unwrap();

        let n = renderer.pipeline().lighting().subpasses()[0]
            .descriptor()
            .dependencies()
            .len() as u32;
        let draw = gfx.draws_in(PassId::Lighting.name()).next().unwrap();
        let material: Vec<_> = draw.textures.iter().filter(|(unit, _)| *unit >= n).copied().collect();
        assert_eq!(
            material,
            [
                (n, albedo),
                (n + 1, placeholder),
                (n + 2, placeholder),
                (n + 3, placeholder),
                (n + 4, placeholder),
            ]
        );

        renderer.shutdown(&mut gfx);
        assert!(!gfx.is_texture_live(placeholder));
        assert!(!gfx.is_texture_live(albedo));
        assert_eq!(gfx.resource_counts().total(), 0);
    }

    #[test]
    fn test_transparency_draws_bounds_helpers() {
        let mut gfx = HeadlessContext::new();
        let mut renderer = renderer(&mut gfx);
        renderer.frame_context_mut().features.draw_aabbs = true;
        renderer.render_frame(&mut gfx).unwrap();

        assert_eq!(gfx.draws_in(PassId::Transparency.name()).count(), 1);
        renderer.shutdown(&mut gfx);
        assert_eq!(gfx.resource_counts().total(), 0);
    }

    #[test]
    fn test_hot_reload_and_resize_keep_counts() {
        let mut gfx = HeadlessContext::new();
        let mut renderer = renderer(&mut gfx);
        renderer.render_frame(&mut gfx).unwrap();
        let counts = gfx.resource_counts();

        renderer.request_hot_reload();
        renderer.render_frame(&mut gfx).unwrap();
        assert_eq!(gfx.resource_counts(), counts);

        renderer.resize(64, 48);
        renderer.render_frame(&mut gfx).unwrap();
        assert_eq!(gfx.resource_counts(), counts);

        renderer.resize(0, 10);
        renderer.resize(128, 96);
        renderer.render_frame(&mut gfx).unwrap();
        assert_eq!(gfx.resource_counts(), counts);
        assert_eq!(renderer.frame_context().viewport(), (128, 96));

        renderer.shutdown(&mut gfx);
        assert_eq!(gfx.resource_counts().total(), 0);
    }

    #[test]
    fn test_failed_reload_keeps_pipeline() {
        let mut gfx = HeadlessContext::new();
        let mut renderer = renderer(&mut gfx);
        let output = renderer.pipeline().output_framebuffer();

        renderer.shader_dir = Path::new("/nonexistent/shaders").to_path_buf();
        renderer.request_hot_reload();
        assert!(renderer.render_frame(&mut gfx).is_err());
        assert_eq!(renderer.pipeline().output_framebuffer(), output);
        assert!(renderer.render_frame(&mut gfx).is_ok());

        renderer.shutdown(&mut gfx);
        assert_eq!(gfx.resource_counts().total(), 0);
    }

    #[test]
    fn test_previous_transforms_feed_velocity() {
        let mut gfx = HeadlessContext::new();
        let mut renderer = renderer(&mut gfx);
        renderer.render_frame(&mut gfx).unwrap();

        let moved = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        renderer.models_mut()[0].set_transform(moved);
        renderer.render_frame(&mut gfx).unwrap();

        let program = renderer.pipeline().velocity().program().handle();
        let previous = Mat4::IDENTITY.to_cols_array().map(f32::to_bits);
        let current = moved.to_cols_array().map(f32::to_bits);
        assert_eq!(gfx.uniform_words_by_name(program, "uPrevModelMat4"), Some(&previous[..]));
        assert_eq!(gfx.uniform_words_by_name(program, "uModelMat4"), Some(&current[..]));

        renderer.shutdown(&mut gfx);
    }

    #[test]
    fn test_missing_shader_dir_is_error() {
        let mut gfx = HeadlessContext::new();
        let mut config = config(32, 32);
        config.shaders.directory = PathBuf::from("/nonexistent/shaders");
        assert!(Renderer::new(&mut gfx, &config).is_err());
        assert_eq!(gfx.resource_counts().total(), 0);
    }
}
