//! Per-frame shader inputs and the update that produces them.
//!
//! [`FrameUniforms`] is the single block of plain data every global
//! uniform binding reads from. Bindings store byte offsets into it, so the
//! struct layout is part of the contract with [`crate::uniform`].

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use lumen_core::config::{FeatureConfig, LightingConfig};
use lumen_core::LumenConfig;
use lumen_scene::{Camera, DirectionalLight, DEFAULT_POINT_LIGHTS, POINT_LIGHT_COUNT};
use tracing::trace;

use crate::model::RenderModel;

/// What the lighting shader writes to its color output.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    #[default]
    Full = 0,
    Normal = 1,
    NormalMap = 2,
    BumpMap = 3,
    Depth = 4,
    ShadowMap = 5,
    MetallicMap = 6,
    RoughnessMap = 7,
}

impl RenderMode {
    pub const ALL: [RenderMode; 8] = [
        Self::Full,
        Self::Normal,
        Self::NormalMap,
        Self::BumpMap,
        Self::Depth,
        Self::ShadowMap,
        Self::MetallicMap,
        Self::RoughnessMap,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
            Self::NormalMap => "normal map",
            Self::BumpMap => "bump map",
            Self::Depth => "depth",
            Self::ShadowMap => "shadow map",
            Self::MetallicMap => "metallic map",
            Self::RoughnessMap => "roughness map",
        }
    }

    /// Cycle to the next mode, wrapping after the last.
    pub fn next(self) -> Self {
        Self::ALL[(self as usize + 1) % Self::ALL.len()]
    }
}

/// Every value a shader reads once per frame.
///
/// # Memory Layout
///
/// - Offset 0: eight matrices (512 bytes), see field order
/// - Offset 512: point light positions (60 bytes)
/// - Offset 572: camera position (12 bytes)
/// - Offset 584: TAA jitter (8 bytes)
/// - Offset 592: render mode, seven feature flags and frame count (36 bytes)
/// - Offset 628: bump scale and three radiant fluxes (16 bytes)
/// - Offset 644: padding (12 bytes)
/// - Total size: 656 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    /// Jittered camera projection.
    pub projection: Mat4,
    pub projection_unjittered: Mat4,
    pub view: Mat4,
    pub prev_projection: Mat4,
    pub prev_projection_unjittered: Mat4,
    pub prev_view: Mat4,
    pub light_projection: Mat4,
    pub light_view: Mat4,
    pub point_lights: [Vec3; POINT_LIGHT_COUNT],
    pub camera_position: Vec3,
    /// Clip-space jitter applied to `projection`.
    pub jitter: Vec2,
    pub render_mode: u32,
    pub direct_light_enabled: u32,
    pub point_light_enabled: u32,
    pub shadow_mapping_enabled: u32,
    pub bump_mapping_enabled: u32,
    pub taa_enabled: u32,
    pub taa_jitter_enabled: u32,
    pub tone_mapping_enabled: u32,
    /// Number of TAA resolves executed so far.
    pub frame_count: u32,
    pub bump_map_scale: f32,
    pub ambient_flux: f32,
    pub direct_light_flux: f32,
    pub point_light_flux: f32,
    pub _padding: [u32; 3],
}

impl FrameUniforms {
    /// Size of the struct in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

#[inline]
fn flag(enabled: bool) -> u32 {
    u32::from(enabled)
}

/// Camera, lights and toggles for the frame being built.
#[derive(Clone, Debug)]
pub struct FrameContext {
    pub camera: Camera,
    pub light: DirectionalLight,
    pub point_lights: [Vec3; POINT_LIGHT_COUNT],
    pub render_mode: RenderMode,
    pub features: FeatureConfig,
    pub lighting: LightingConfig,
    uniforms: FrameUniforms,
    current_transforms: Vec<Mat4>,
    previous_transforms: Vec<Mat4>,
    width: u32,
    height: u32,
    prepared: bool,
}

impl FrameContext {
    pub fn new(config: &LumenConfig, width: u32, height: u32) -> Self {
        let mut camera = Camera::new(
            config.camera.fov_y,
            1.0,
            config.camera.near,
            config.camera.far,
        );
        camera.set_viewport(width, height);

        let light = DirectionalLight {
            radiant_flux: config.lighting.direct_flux,
            ..DirectionalLight::default()
        };

        Self {
            camera,
            light,
            point_lights: DEFAULT_POINT_LIGHTS,
            render_mode: RenderMode::default(),
            features: config.features.clone(),
            lighting: config.lighting.clone(),
            uniforms: FrameUniforms::default(),
            current_transforms: Vec::new(),
            previous_transforms: Vec::new(),
            width: width.max(1),
            height: height.max(1),
            prepared: false,
        }
    }

    pub fn uniforms(&self) -> &FrameUniforms {
        &self.uniforms
    }

    /// Model transforms of the previous frame, one per model.
    pub fn previous_transforms(&self) -> &[Mat4] {
        &self.previous_transforms
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Change the viewport the next frame is prepared for. Zero sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        self.camera.set_viewport(width, height);
    }

    /// Bring the frame uniforms up to date before any pass runs.
    ///
    /// `frame_index` selects the jitter sample; pass the number of TAA
    /// resolves done so far. On the first call the previous-frame values
    /// equal the current ones.
    pub fn prepare(&mut self, models: &[RenderModel], frame_index: u32) {
        self.light
            .fit_to_bounds(models.iter().map(RenderModel::world_bounds));

        self.previous_transforms = std::mem::take(&mut self.current_transforms);
        self.current_transforms
            .extend(models.iter().map(|model| model.transform));
        if self.previous_transforms.len() != self.current_transforms.len() {
            self.previous_transforms.clone_from(&self.current_transforms);
        }

        let u = &mut self.uniforms;
        if self.prepared {
            u.prev_view = u.view;
            u.prev_projection = u.projection;
            u.prev_projection_unjittered = u.projection_unjittered;
        }

        let jitter = if self.features.taa_jitter {
            self.camera.jitter(frame_index, self.width, self.height)
        } else {
            Vec2::ZERO
        };
        u.view = self.camera.view_matrix();
        u.projection_unjittered = self.camera.projection_unjittered();
        u.projection = Mat4::from_translation(jitter.extend(0.0)) * u.projection_unjittered;
        u.jitter = jitter;
        u.camera_position = self.camera.position;

        if !self.prepared {
            u.prev_view = u.view;
            u.prev_projection = u.projection;
            u.prev_projection_unjittered = u.projection_unjittered;
            self.prepared = true;
        }

        u.light_projection = self.light.projection;
        u.light_view = self.light.view_matrix();
        u.point_lights = self.point_lights;

        u.render_mode = self.render_mode as u32;
        u.direct_light_enabled = flag(self.features.direct_light);
        u.point_light_enabled = flag(self.features.point_light);
        u.shadow_mapping_enabled = flag(self.features.shadow_mapping);
        u.bump_mapping_enabled = flag(self.features.bump_mapping);
        u.taa_enabled = flag(self.features.taa);
        u.taa_jitter_enabled = flag(self.features.taa_jitter);
        u.tone_mapping_enabled = flag(self.features.tone_mapping);
        u.frame_count = frame_index;

        u.bump_map_scale = self.lighting.bump_map_scale;
        u.ambient_flux = self.lighting.ambient_flux;
        u.direct_light_flux = self.light.radiant_flux;
        u.point_light_flux = self.lighting.point_flux;

        trace!(frame_index, jitter = ?jitter, "frame uniforms prepared");
    }
}
