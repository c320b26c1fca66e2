//! Perspective camera and temporal jitter.

use glam::{Mat4, Quat, Vec2, Vec3};

/// Number of distinct sub-pixel offsets in the jitter sequence.
pub const JITTER_SAMPLE_COUNT: usize = 16;

/// A first-person perspective camera.
///
/// Orientation is stored as world-space yaw (around +Y) and pitch (around
/// +X) so it can be driven directly by mouse deltas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Rotation around the world Y axis, radians
    pub yaw: f32,
    /// Rotation around the camera X axis, radians
    pub pitch: f32,
    /// Vertical field of view, radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 200.0, 600.0),
            yaw: 0.0,
            pitch: 0.0,
            fov_y: 1.0472,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 10000.0,
        }
    }
}

impl Camera {
    /// Create a camera with the given projection parameters.
    pub fn new(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y,
            aspect,
            near,
            far,
            ..Self::default()
        }
    }

    /// Update the aspect ratio from a viewport size. Zero sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    /// Camera-to-world transform.
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.position)
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    /// Projection without any sub-pixel jitter.
    pub fn projection_unjittered(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Get the forward direction vector.
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    /// Get the right direction vector.
    pub fn right(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    /// Turn towards a target position.
    pub fn look_at(&mut self, target: Vec3) {
        let direction = (target - self.position).normalize_or_zero();
        if direction != Vec3::ZERO {
            self.yaw = (-direction.x).atan2(-direction.z);
            self.pitch = direction.y.clamp(-1.0, 1.0).asin();
        }
    }

    /// Clip-space offset for frame `frame_index` of a `width`×`height` target.
    ///
    /// Offsets follow a Halton(2, 3) sequence centred on the pixel and
    /// repeat every [`JITTER_SAMPLE_COUNT`] frames.
    pub fn jitter(&self, frame_index: u32, width: u32, height: u32) -> Vec2 {
        let extent_y = (0.5 * self.fov_y).tan();
        let extent_x = extent_y * self.aspect;
        let texel = Vec2::new(
            extent_x / (0.5 * width.max(1) as f32),
            extent_y / (0.5 * height.max(1) as f32),
        );
        texel * halton_2_3(frame_index as usize % JITTER_SAMPLE_COUNT)
    }
}

/// Element `index` of the Halton(2, 3) sequence shifted to `[-0.5, 0.5)`.
pub fn halton_2_3(index: usize) -> Vec2 {
    Vec2::new(halton(index + 1, 2), halton(index + 1, 3)) - Vec2::splat(0.5)
}

fn halton(mut index: usize, base: usize) -> f32 {
    let mut fraction = 1.0;
    let mut result = 0.0;
    while index > 0 {
        fraction /= base as f32;
        result += fraction * (index % base) as f32;
        index /= base;
    }
    result
}
