//! Scene description consumed by the renderer.
//!
//! This crate provides:
//! - A perspective camera with temporal jitter
//! - Directional and point lights
//! - Axis-aligned bounds
//! - Procedural meshes

pub mod bounds;
pub mod camera;
pub mod light;
pub mod mesh;

pub use bounds::Aabb;
pub use camera::Camera;
pub use light::{DirectionalLight, DEFAULT_POINT_LIGHTS, POINT_LIGHT_COUNT};
pub use mesh::MeshData;
