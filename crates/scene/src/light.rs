//! Light definitions for the scene.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::bounds::Aabb;

/// Number of point lights the lighting shaders read.
pub const POINT_LIGHT_COUNT: usize = 5;

/// Point light positions of the default scene.
pub const DEFAULT_POINT_LIGHTS: [Vec3; POINT_LIGHT_COUNT] = [
    Vec3::new(-1200.0, 200.0, -45.0),
    Vec3::new(-700.0, 200.0, -45.0),
    Vec3::new(0.0, 200.0, -45.0),
    Vec3::new(700.0, 200.0, -45.0),
    Vec3::new(1100.0, 200.0, -45.0),
];

/// A directional light (sun-like) casting an orthographic shadow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Origin of the shadow camera
    pub position: Vec3,
    /// Euler angles (x, y, z) in radians
    pub orientation: Vec3,
    pub radiant_flux: f32,
    /// Orthographic projection fitted by [`DirectionalLight::fit_to_bounds`]
    pub projection: Mat4,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10000.0, 0.0),
            orientation: Vec3::new(-1.5, -0.5, 0.0),
            radiant_flux: 1.5,
            projection: Mat4::orthographic_rh_gl(-1.0, 1.0, -1.0, 1.0, 0.1, 100.0),
        }
    }
}

impl DirectionalLight {
    /// World-to-light transform.
    pub fn view_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::ZYX,
            -self.orientation.z,
            -self.orientation.y,
            -self.orientation.x,
        );
        Mat4::from_quat(rotation) * Mat4::from_translation(-self.position)
    }

    /// Direction the light travels in world space.
    pub fn direction(&self) -> Vec3 {
        self.view_matrix()
            .inverse()
            .transform_vector3(Vec3::NEG_Z)
            .normalize_or_zero()
    }

    /// Fit the shadow frustum tightly around `bounds` as seen by the light.
    ///
    /// Returns `false` and keeps the previous projection when the bounds
    /// are empty or flat along an axis.
    pub fn fit_to_bounds(&mut self, bounds: impl IntoIterator<Item = Aabb>) -> bool {
        let view = self.view_matrix();
        let light_space = bounds
            .into_iter()
            .map(|aabb| aabb.transformed(&view))
            .reduce(|a, b| a.union(&b));

        let Some(fit) = light_space else {
            return false;
        };
        let extent = fit.extent();
        if extent.x <= 0.0 || extent.y <= 0.0 || extent.z <= 0.0 {
            return false;
        }

        // Light looks down -Z: the nearest geometry has the largest z.
        self.projection = Mat4::orthographic_rh_gl(
            fit.min.x, fit.max.x, fit.min.y, fit.max.y, -fit.max.z, -fit.min.z,
        );
        true
    }
}
