//! Name-resolved uniform bindings.
//!
//! A [`UniformLayout`] says, for one program, which uniform names are fed
//! from where. [`BindingTable::build`] resolves every name to a location
//! once; afterwards pushing values is a flat walk over pre-resolved
//! entries with no string lookups.
//!
//! # Sources
//!
//! - Global uniforms read a field of [`FrameUniforms`] by byte offset and
//!   are pushed once per pass.
//! - Instance uniforms stride through a per-model array
//!   ([`InstanceSource`]) and are pushed once per draw.
//!
//! Both read through a [`FieldAccessor`] that is validated when the table
//! is built, so a push never reads outside its record.

use std::borrow::Cow;

use glam::Mat4;
use lumen_core::{DiagnosticKind, Diagnostics};
use lumen_rhi::{GraphicsContext, ProgramHandle, TextureHandle, UniformLocation, UniformValue};
use thiserror::Error;
use tracing::debug;

use crate::frame_context::FrameUniforms;
use crate::model::RenderModel;

/// Element type of a uniform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Uint,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformKind {
    /// 32-bit words per element.
    pub const fn components(self) -> usize {
        match self {
            Self::Uint | Self::Float => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
            Self::Mat4 => 16,
        }
    }

    /// Bytes per element.
    pub const fn size(self) -> usize {
        self.components() * 4
    }

    fn value(self, words: &[u32]) -> UniformValue<'_> {
        let floats: &[f32] = bytemuck::cast_slice(words);
        match self {
            Self::Uint => UniformValue::Uint(words),
            Self::Float => UniformValue::Float(floats),
            Self::Vec2 => UniformValue::Vec2(floats),
            Self::Vec3 => UniformValue::Vec3(floats),
            Self::Vec4 => UniformValue::Vec4(floats),
            Self::Mat4 => UniformValue::Mat4(floats),
        }
    }
}

/// Why a [`FieldAccessor`] was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AccessorError {
    #[error("offset {offset} or stride {stride} is not 4-byte aligned")]
    Misaligned { offset: usize, stride: usize },

    #[error("stride is zero")]
    ZeroStride,

    #[error("element count is zero")]
    ZeroCount,

    #[error("field [{offset}, {end}) does not fit a {stride} byte stride")]
    OutOfBounds {
        offset: usize,
        end: usize,
        stride: usize,
    },

    #[error("stride {stride} does not match the {record_size} byte record")]
    StrideMismatch { stride: usize, record_size: usize },
}

/// Reads `count` elements of `kind` at `offset` inside record `i` of a
/// byte array whose records are `stride` bytes apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldAccessor {
    offset: usize,
    stride: usize,
    kind: UniformKind,
    count: usize,
}

impl FieldAccessor {
    /// Validate an accessor against the records it will read.
    pub fn new(
        offset: usize,
        stride: usize,
        kind: UniformKind,
        count: usize,
        record_size: usize,
    ) -> Result<Self, AccessorError> {
        let accessor = Self {
            offset,
            stride,
            kind,
            count,
        };
        accessor.validate(record_size)?;
        Ok(accessor)
    }

    fn validate(&self, record_size: usize) -> Result<(), AccessorError> {
        if self.stride == 0 {
            return Err(AccessorError::ZeroStride);
        }
        if self.count == 0 {
            return Err(AccessorError::ZeroCount);
        }
        if self.offset % 4 != 0 || self.stride % 4 != 0 {
            return Err(AccessorError::Misaligned {
                offset: self.offset,
                stride: self.stride,
            });
        }
        let end = self.offset + self.byte_len();
        if end > self.stride {
            return Err(AccessorError::OutOfBounds {
                offset: self.offset,
                end,
                stride: self.stride,
            });
        }
        if self.stride != record_size {
            return Err(AccessorError::StrideMismatch {
                stride: self.stride,
                record_size,
            });
        }
        Ok(())
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn kind(&self) -> UniformKind {
        self.kind
    }

    pub fn count(&self) -> usize {
        self.count
    }

    fn byte_len(&self) -> usize {
        self.kind.size() * self.count
    }

    /// Value of record `index`, `None` if `bytes` holds no such record.
    pub fn read<'a>(&self, bytes: &'a [u8], index: usize) -> Option<UniformValue<'a>> {
        let start = index.checked_mul(self.stride)?.checked_add(self.offset)?;
        let field = bytes.get(start..start.checked_add(self.byte_len())?)?;
        let words: &[u32] = bytemuck::try_cast_slice(field).ok()?;
        Some(self.kind.value(words))
    }
}

/// Per-model array an instance uniform strides through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstanceSource {
    /// The models being drawn.
    Models,
    /// Last frame's model transforms, one `Mat4` per model.
    PreviousTransforms,
}

impl InstanceSource {
    /// Size of one record of this source.
    pub const fn record_size(self) -> usize {
        match self {
            Self::Models => RenderModel::SIZE,
            Self::PreviousTransforms => std::mem::size_of::<Mat4>(),
        }
    }
}

/// The per-model arrays of one pass execution.
#[derive(Clone, Copy, Debug)]
pub struct InstanceData<'a> {
    pub models: &'a [RenderModel],
    pub previous_transforms: &'a [Mat4],
    /// Bound in place of null material maps; null leaves those units unbound.
    pub placeholder: TextureHandle,
}

impl<'a> InstanceData<'a> {
    pub fn new(models: &'a [RenderModel], previous_transforms: &'a [Mat4]) -> Self {
        Self {
            models,
            previous_transforms,
            placeholder: TextureHandle::NULL,
        }
    }

    pub fn with_placeholder(mut self, placeholder: TextureHandle) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Models only; instance uniforms reading previous transforms are skipped.
    pub fn models(models: &'a [RenderModel]) -> Self {
        Self::new(models, &[])
    }

    fn bytes(&self, source: InstanceSource) -> &'a [u8] {
        match source {
            InstanceSource::Models => bytemuck::cast_slice(self.models),
            InstanceSource::PreviousTransforms => bytemuck::cast_slice(self.previous_transforms),
        }
    }
}

/// A uniform fed from [`FrameUniforms`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalUniform {
    pub name: Cow<'static, str>,
    /// Byte offset of the field, usually from `offset_of!`.
    pub offset: usize,
    pub kind: UniformKind,
    /// Array length, 1 for plain values.
    pub count: usize,
}

/// A uniform fed from a per-model array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceUniform {
    pub name: Cow<'static, str>,
    pub source: InstanceSource,
    pub offset: usize,
    pub stride: usize,
    pub kind: UniformKind,
}

/// Uniform names a program reads and where their values come from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UniformLayout {
    pub globals: Vec<GlobalUniform>,
    pub instances: Vec<InstanceUniform>,
}

impl UniformLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global(self, name: impl Into<Cow<'static, str>>, offset: usize, kind: UniformKind) -> Self {
        self.global_array(name, offset, kind, 1)
    }

    pub fn global_array(
        mut self,
        name: impl Into<Cow<'static, str>>,
        offset: usize,
        kind: UniformKind,
        count: usize,
    ) -> Self {
        self.globals.push(GlobalUniform {
            name: name.into(),
            offset,
            kind,
            count,
        });
        self
    }

    /// Instance uniform striding by the source's record size.
    pub fn instance(
        self,
        name: impl Into<Cow<'static, str>>,
        source: InstanceSource,
        offset: usize,
        kind: UniformKind,
    ) -> Self {
        self.instance_strided(name, source, offset, source.record_size(), kind)
    }

    pub fn instance_strided(
        mut self,
        name: impl Into<Cow<'static, str>>,
        source: InstanceSource,
        offset: usize,
        stride: usize,
        kind: UniformKind,
    ) -> Self {
        self.instances.push(InstanceUniform {
            name: name.into(),
            source,
            offset,
            stride,
            kind,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.globals.len() + self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty() && self.instances.is_empty()
    }
}

/// Resolved global uniform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalBinding {
    pub name: Cow<'static, str>,
    pub location: UniformLocation,
    pub accessor: FieldAccessor,
}

/// Resolved instance uniform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceBinding {
    pub name: Cow<'static, str>,
    pub location: UniformLocation,
    pub source: InstanceSource,
    pub accessor: FieldAccessor,
}

/// Uniform bindings of one program, resolved once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindingTable {
    globals: Vec<GlobalBinding>,
    instances: Vec<InstanceBinding>,
}

impl BindingTable {
    /// Resolve every uniform of `layout` against `program`.
    ///
    /// Unknown names produce a warning and invalid accessors an error; in
    /// both cases the binding is kept but never pushed.
    pub fn build<G: GraphicsContext + ?Sized>(
        gfx: &G,
        program: ProgramHandle,
        layout: &UniformLayout,
        subject: &str,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut resolve = |name: &str, accessor: Result<FieldAccessor, AccessorError>| {
            if let Err(e) = accessor {
                diagnostics.push(
                    DiagnosticKind::InvalidAccessor,
                    subject,
                    format!("uniform {name}: {e}"),
                );
                return UniformLocation::UNBOUND;
            }
            let location = gfx.uniform_location(program, name);
            if !location.is_bound() {
                diagnostics.push(
                    DiagnosticKind::UniformNotFound,
                    subject,
                    format!("uniform {name} is not active in {program}"),
                );
            }
            location
        };

        let globals: Vec<_> = layout
            .globals
            .iter()
            .map(|spec| {
                let stride = FrameUniforms::SIZE;
                let checked = FieldAccessor::new(spec.offset, stride, spec.kind, spec.count, stride);
                let location = resolve(&spec.name, checked);
                GlobalBinding {
                    name: spec.name.clone(),
                    location,
                    accessor: checked.unwrap_or(FieldAccessor {
                        offset: spec.offset,
                        stride,
                        kind: spec.kind,
                        count: spec.count,
                    }),
                }
            })
            .collect();

        let instances: Vec<_> = layout
            .instances
            .iter()
            .map(|spec| {
                let checked = FieldAccessor::new(
                    spec.offset,
                    spec.stride,
                    spec.kind,
                    1,
                    spec.source.record_size(),
                );
                let location = resolve(&spec.name, checked);
                InstanceBinding {
                    name: spec.name.clone(),
                    location,
                    source: spec.source,
                    accessor: checked.unwrap_or(FieldAccessor {
                        offset: spec.offset,
                        stride: spec.stride,
                        kind: spec.kind,
                        count: 1,
                    }),
                }
            })
            .collect();

        let table = Self { globals, instances };
        debug!(
            "{}: {} of {} uniforms bound",
            subject,
            table.bound_count(),
            layout.len()
        );
        table
    }

    pub fn globals(&self) -> &[GlobalBinding] {
        &self.globals
    }

    pub fn instances(&self) -> &[InstanceBinding] {
        &self.instances
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty() && self.instances.is_empty()
    }

    /// Bindings that resolved to a location.
    pub fn bound_count(&self) -> usize {
        let globals = self.globals.iter().filter(|b| b.location.is_bound());
        let instances = self.instances.iter().filter(|b| b.location.is_bound());
        globals.count() + instances.count()
    }

    /// Location a name resolved to.
    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        let global = self
            .globals
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.location);
        global.or_else(|| {
            self.instances
                .iter()
                .find(|b| b.name == name)
                .map(|b| b.location)
        })
    }

    /// Upload every global uniform to the program in use.
    pub fn push_globals<G: GraphicsContext + ?Sized>(&self, gfx: &mut G, frame: &FrameUniforms) {
        let bytes = bytemuck::bytes_of(frame);
        for binding in self.globals.iter().filter(|b| b.location.is_bound()) {
            if let Some(value) = binding.accessor.read(bytes, 0) {
                gfx.set_uniform(binding.location, value);
            }
        }
    }

    /// Upload the instance uniforms of model `index`.
    ///
    /// Sources shorter than `index + 1` records are skipped.
    pub fn push_instance<G: GraphicsContext + ?Sized>(
        &self,
        gfx: &mut G,
        data: &InstanceData<'_>,
        index: usize,
    ) {
        for binding in self.instances.iter().filter(|b| b.location.is_bound()) {
            if let Some(value) = binding.accessor.read(data.bytes(binding.source), index) {
                gfx.set_uniform(binding.location, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::mem::offset_of;

    use glam::{Vec2, Vec3};
    use lumen_rhi::{HeadlessContext, ShaderStage};

    use super::*;

    const VERTEX: &str = r#"
        uniform mat4 uProjMat;
        uniform vec3 uPointLightPosVec3Array[5];
        uniform vec2 uJitterVec2;
        uniform mat4 uModelMat;
        uniform mat4 uPrevModelMat4;
        void main() {}
    "#;
    const FRAGMENT: &str = r#"
        uniform uint uTaaEnabledUint;
        uniform float uAmbientLightRadiantFluxFloat;
        uniform vec3 uColor;
        uniform uint uBrdfUint;
        void main() {}
    "#;

    fn program(gfx: &mut HeadlessContext) -> ProgramHandle {
        let vs = gfx.compile_shader(ShaderStage::Vertex, VERTEX).unwrap();
        let fs = gfx.compile_shader(ShaderStage::Fragment, FRAGMENT).unwrap();
        gfx.link_program(vs, fs).unwrap()
    }

    fn layout() -> UniformLayout {
        UniformLayout::new()
            .global("uProjMat", offset_of!(FrameUniforms, projection), UniformKind::Mat4)
            .global_array(
                "uPointLightPosVec3Array",
                offset_of!(FrameUniforms, point_lights),
                UniformKind::Vec3,
                5,
            )
            .global("uJitterVec2", offset_of!(FrameUniforms, jitter), UniformKind::Vec2)
            .global("uTaaEnabledUint", offset_of!(FrameUniforms, taa_enabled), UniformKind::Uint)
            .global(
                "uAmbientLightRadiantFluxFloat",
                offset_of!(FrameUniforms, ambient_flux),
                UniformKind::Float,
            )
            .instance(
                "uModelMat",
                InstanceSource::Models,
                offset_of!(RenderModel, transform),
                UniformKind::Mat4,
            )
            .instance("uColor", InstanceSource::Models, offset_of!(RenderModel, color), UniformKind::Vec3)
            .instance("uBrdfUint", InstanceSource::Models, offset_of!(RenderModel, brdf), UniformKind::Uint)
            .instance("uPrevModelMat4", InstanceSource::PreviousTransforms, 0, UniformKind::Mat4)
    }

    fn models() -> Vec<RenderModel> {
        (0..3)
            .map(|i| RenderModel {
                transform: Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0)),
                color: Vec3::new(0.1 * i as f32, 0.2, 0.3),
                brdf: i,
                ..RenderModel::default()
            })
            .collect()
    }

    #[test]
    fn test_kind_sizes() {
        assert_eq!(UniformKind::Uint.size(), 4);
        assert_eq!(UniformKind::Vec3.size(), 12);
        assert_eq!(UniformKind::Mat4.size(), 64);
    }

    #[test]
    fn test_accessor_validation() {
        let size = RenderModel::SIZE;
        assert!(FieldAccessor::new(0, size, UniformKind::Mat4, 1, size).is_ok());
        assert_eq!(
            FieldAccessor::new(2, size, UniformKind::Uint, 1, size),
            Err(AccessorError::Misaligned { offset: 2, stride: size })
        );
        assert_eq!(
            FieldAccessor::new(0, 0, UniformKind::Uint, 1, size),
            Err(AccessorError::ZeroStride)
        );
        assert!(matches!(
            FieldAccessor::new(size - 4, size, UniformKind::Vec2, 1, size),
            Err(AccessorError::OutOfBounds { .. })
        ));
        assert_eq!(
            FieldAccessor::new(0, 64, UniformKind::Mat4, 1, size),
            Err(AccessorError::StrideMismatch { stride: 64, record_size: size })
        );
        assert_eq!(
            FieldAccessor::new(0, size, UniformKind::Uint, 0, size),
            Err(AccessorError::ZeroCount)
        );
    }

    #[test]
    fn test_accessor_read_out_of_range() {
        let accessor = FieldAccessor::new(0, 64, UniformKind::Mat4, 1, 64).unwrap();
        let transforms = [Mat4::IDENTITY];
        let bytes: &[u8] = bytemuck::cast_slice(&transforms);
        assert!(accessor.read(bytes, 0).is_some());
        assert!(accessor.read(bytes, 1).is_none());
        assert!(accessor.read(bytes, usize::MAX).is_none());
    }

    #[test]
    fn test_build_resolves_locations() {
        let mut gfx = HeadlessContext::new();
        let program = program(&mut gfx);
        let mut diagnostics = Diagnostics::new();

        let table = BindingTable::build(&gfx, program, &layout(), "test", &mut diagnostics);
        assert!(diagnostics.is_empty());
        assert_eq!(table.globals().len(), 5);
        assert_eq!(table.instances().len(), 4);
        assert_eq!(table.bound_count(), 9);
        assert_eq!(
            table.location("uModelMat"),
            Some(gfx.uniform_location(program, "uModelMat"))
        );
    }

    #[test]
    fn test_missing_uniform_is_warning() {
        let mut gfx = HeadlessContext::new();
        let program = program(&mut gfx);
        let mut diagnostics = Diagnostics::new();
        let layout = layout().global("uMissing", 0, UniformKind::Float);

        let table = BindingTable::build(&gfx, program, &layout, "test", &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert!(!diagnostics.has_errors());
        assert_eq!(table.location("uMissing"), Some(UniformLocation::UNBOUND));
    }

    #[test]
    fn test_invalid_accessor_is_error_and_unbound() {
        let mut gfx = HeadlessContext::new();
        let program = program(&mut gfx);
        let mut diagnostics = Diagnostics::new();
        let layout = UniformLayout::new().instance_strided(
            "uModelMat",
            InstanceSource::Models,
            0,
            64,
            UniformKind::Mat4,
        );

        let table = BindingTable::build(&gfx, program, &layout, "test", &mut diagnostics);
        assert_eq!(diagnostics.of_kind(DiagnosticKind::InvalidAccessor).count(), 1);
        assert_eq!(table.bound_count(), 0);
    }

    #[test]
    fn test_global_round_trip() {
        let mut gfx = HeadlessContext::new();
        let program = program(&mut gfx);
        let table = BindingTable::build(&gfx, program, &layout(), "test", &mut Diagnostics::new());

        let frame = FrameUniforms {
            projection: Mat4::perspective_rh_gl(1.0, 1.5, 0.1, 100.0),
            point_lights: [Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE, Vec3::NEG_X],
            jitter: Vec2::new(0.25, -0.125),
            taa_enabled: 1,
            ambient_flux: 0.5,
            ..FrameUniforms::default()
        };
        gfx.use_program(program);
        table.push_globals(&mut gfx, &frame);

        let proj = frame.projection.to_cols_array().map(f32::to_bits);
        assert_eq!(gfx.uniform_words_by_name(program, "uProjMat"), Some(&proj[..]));
        let lights: &[u32] = bytemuck::cast_slice(&frame.point_lights);
        assert_eq!(gfx.uniform_words_by_name(program, "uPointLightPosVec3Array"), Some(lights));
        assert_eq!(gfx.uniform_words_by_name(program, "uTaaEnabledUint"), Some(&[1u32][..]));
        assert_eq!(
            gfx.uniform_words_by_name(program, "uAmbientLightRadiantFluxFloat"),
            Some(&[0.5f32.to_bits()][..])
        );
    }

    #[test]
    fn test_instance_striding() {
        let mut gfx = HeadlessContext::new();
        let program = program(&mut gfx);
        let table = BindingTable::build(&gfx, program, &layout(), "test", &mut Diagnostics::new());
        let models = models();
        let previous: Vec<Mat4> = models.iter().map(|m| m.transform.transpose()).collect();
        let data = InstanceData::new(&models, &previous);

        gfx.use_program(program);
        for (i, model) in models.iter().enumerate() {
            table.push_instance(&mut gfx, &data, i);

            let transform = model.transform.to_cols_array().map(f32::to_bits);
            assert_eq!(gfx.uniform_words_by_name(program, "uModelMat"), Some(&transform[..]));
            let color = model.color.to_array().map(f32::to_bits);
            assert_eq!(gfx.uniform_words_by_name(program, "uColor"), Some(&color[..]));
            assert_eq!(gfx.uniform_words_by_name(program, "uBrdfUint"), Some(&[model.brdf][..]));
            let prev = previous[i].to_cols_array().map(f32::to_bits);
            assert_eq!(gfx.uniform_words_by_name(program, "uPrevModelMat4"), Some(&prev[..]));
        }
    }

    #[test]
    fn test_short_source_is_skipped() {
        let mut gfx = HeadlessContext::new();
        let program = program(&mut gfx);
        let table = BindingTable::build(&gfx, program, &layout(), "test", &mut Diagnostics::new());
        let models = models();

        gfx.use_program(program);
        table.push_instance(&mut gfx, &InstanceData::models(&models), 1);
        assert!(gfx.uniform_words_by_name(program, "uPrevModelMat4").is_none());
        assert!(gfx.uniform_words_by_name(program, "uModelMat").is_some());
    }
}
