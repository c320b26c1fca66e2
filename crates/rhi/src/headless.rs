//! CPU-side [`GraphicsContext`] that records instead of rendering.
//!
//! `HeadlessContext` keeps the bookkeeping a driver would: object
//! lifetimes, framebuffer attachments, per-program uniform locations and
//! values, and the currently bound state. Every draw and blit is appended
//! to a log so callers can assert on what a frame would have submitted.
//! Tests use it for leak counting and uniform read-back; the command-line
//! driver uses it to run frames without a window.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::buffer::BufferKind;
use crate::context::{
    AttachmentPoint, ClearFlags, CompareOp, DepthState, FramebufferStatus, GraphicsContext,
    PolygonOffset, UniformValue, Viewport,
};
use crate::error::{RhiError, RhiResult};
use crate::handle::{
    BufferHandle, FramebufferHandle, ProgramHandle, ShaderHandle, TextureHandle, UniformLocation,
    VertexArrayHandle,
};
use crate::shader::{reflect_uniforms, ReflectedUniform, ShaderStage};
use crate::texture::TextureDesc;
use crate::vertex::VertexAttribute;

/// Sources containing this directive fail to compile.
pub const COMPILE_ERROR_DIRECTIVE: &str = "#error";

/// Live object counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub textures: usize,
    pub buffers: usize,
    pub vertex_arrays: usize,
    pub framebuffers: usize,
    pub shaders: usize,
    pub programs: usize,
}

impl ResourceCounts {
    pub fn total(&self) -> usize {
        self.textures
            + self.buffers
            + self.vertex_arrays
            + self.framebuffers
            + self.shaders
            + self.programs
    }
}

/// One recorded indexed draw.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    /// Innermost debug group open at draw time, empty if none.
    pub pass: String,
    pub program: ProgramHandle,
    pub framebuffer: FramebufferHandle,
    pub vertex_array: VertexArrayHandle,
    pub index_count: u32,
    /// Texture units bound at draw time, ascending by unit.
    pub textures: Vec<(u32, TextureHandle)>,
}

/// Commands that change what ends up in a render target, plus releases
/// of live objects.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    PushDebugGroup(String),
    PopDebugGroup,
    Clear {
        framebuffer: FramebufferHandle,
        flags: ClearFlags,
    },
    /// Index into [`HeadlessContext::draw_calls`].
    Draw(usize),
    Blit {
        source: FramebufferHandle,
        point: AttachmentPoint,
        width: u32,
        height: u32,
    },
    DeleteShader(ShaderHandle),
    DeleteProgram(ProgramHandle),
    DeleteTexture(TextureHandle),
    DeleteFramebuffer(FramebufferHandle),
}

#[derive(Debug, Default)]
struct FramebufferRecord {
    attachments: Vec<(AttachmentPoint, TextureHandle)>,
    draw_buffers: Vec<AttachmentPoint>,
}

#[derive(Debug)]
struct ShaderRecord {
    stage: ShaderStage,
    uniforms: Vec<ReflectedUniform>,
}

#[derive(Debug, Default)]
struct ProgramRecord {
    locations: HashMap<String, UniformLocation>,
    values: HashMap<i32, Vec<u32>>,
}

/// Pipeline state as last set through the context.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundState {
    pub framebuffer: FramebufferHandle,
    pub program: ProgramHandle,
    pub vertex_array: VertexArrayHandle,
    pub textures: BTreeMap<u32, TextureHandle>,
    pub clear_color: [f32; 4],
    pub clear_depth: f32,
    pub color_mask: bool,
    pub depth: DepthState,
    pub viewport: Viewport,
    pub polygon_offset: Option<PolygonOffset>,
}

impl Default for BoundState {
    fn default() -> Self {
        Self {
            framebuffer: FramebufferHandle::NULL,
            program: ProgramHandle::NULL,
            vertex_array: VertexArrayHandle::NULL,
            textures: BTreeMap::new(),
            clear_color: [0.0; 4],
            clear_depth: 1.0,
            color_mask: true,
            depth: DepthState {
                test: true,
                write: true,
                func: CompareOp::Less,
            },
            viewport: Viewport::default(),
            polygon_offset: None,
        }
    }
}

/// Recording graphics context.
#[derive(Debug, Default)]
pub struct HeadlessContext {
    next_name: u32,
    textures: HashMap<TextureHandle, TextureDesc>,
    buffers: HashMap<BufferHandle, (BufferKind, usize)>,
    vertex_arrays: HashMap<VertexArrayHandle, Vec<BufferHandle>>,
    framebuffers: HashMap<FramebufferHandle, FramebufferRecord>,
    shaders: HashMap<ShaderHandle, ShaderRecord>,
    programs: HashMap<ProgramHandle, ProgramRecord>,
    state: BoundState,
    debug_groups: Vec<String>,
    commands: Vec<Command>,
    draws: Vec<DrawCall>,
    uniform_uploads: usize,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }

    // Inspection

    pub fn resource_counts(&self) -> ResourceCounts {
        ResourceCounts {
            textures: self.textures.len(),
            buffers: self.buffers.len(),
            vertex_arrays: self.vertex_arrays.len(),
            framebuffers: self.framebuffers.len(),
            shaders: self.shaders.len(),
            programs: self.programs.len(),
        }
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_framebuffers(&self) -> usize {
        self.framebuffers.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn is_texture_live(&self, texture: TextureHandle) -> bool {
        self.textures.contains_key(&texture)
    }

    pub fn is_framebuffer_live(&self, framebuffer: FramebufferHandle) -> bool {
        self.framebuffers.contains_key(&framebuffer)
    }

    pub fn is_program_live(&self, program: ProgramHandle) -> bool {
        self.programs.contains_key(&program)
    }

    pub fn texture_desc(&self, texture: TextureHandle) -> Option<&TextureDesc> {
        self.textures.get(&texture)
    }

    /// Texture attached at `point`, if any.
    pub fn attachment(
        &self,
        framebuffer: FramebufferHandle,
        point: AttachmentPoint,
    ) -> Option<TextureHandle> {
        self.framebuffers
            .get(&framebuffer)?
            .attachments
            .iter()
            .find(|(p, _)| *p == point)
            .map(|(_, texture)| *texture)
    }

    pub fn draw_buffers(&self, framebuffer: FramebufferHandle) -> Option<&[AttachmentPoint]> {
        self.framebuffers
            .get(&framebuffer)
            .map(|fb| fb.draw_buffers.as_slice())
    }

    /// Words last uploaded to `location` of `program`.
    pub fn uniform_words(&self, program: ProgramHandle, location: UniformLocation) -> Option<&[u32]> {
        self.programs
            .get(&program)?
            .values
            .get(&location.0)
            .map(Vec::as_slice)
    }

    /// Words last uploaded to the uniform called `name`.
    pub fn uniform_words_by_name(&self, program: ProgramHandle, name: &str) -> Option<&[u32]> {
        let location = self.uniform_location(program, name);
        self.uniform_words(program, location)
    }

    /// Number of `set_uniform` calls that reached a live location.
    pub fn uniform_uploads(&self) -> usize {
        self.uniform_uploads
    }

    pub fn state(&self) -> &BoundState {
        &self.state
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Draw calls recorded inside the debug group `pass`.
    pub fn draws_in(&self, pass: &str) -> impl Iterator<Item = &DrawCall> {
        let pass = pass.to_owned();
        self.draws.iter().filter(move |d| d.pass == pass)
    }

    /// Forget recorded commands and draws, keeping objects and state.
    pub fn clear_log(&mut self) {
        self.commands.clear();
        self.draws.clear();
        self.uniform_uploads = 0;
    }

    fn framebuffer_size_mismatch(&self, record: &FramebufferRecord) -> bool {
        let mut sizes = record
            .attachments
            .iter()
            .filter_map(|(_, texture)| self.textures.get(texture))
            .map(|desc| (desc.width, desc.height));
        match sizes.next() {
            Some(first) => sizes.any(|size| size != first),
            None => false,
        }
    }
}

impl GraphicsContext for HeadlessContext {
    fn create_texture(
        &mut self,
        desc: &TextureDesc,
        pixels: Option<&[u8]>,
    ) -> RhiResult<TextureHandle> {
        if let Some(pixels) = pixels {
            if pixels.len() != desc.byte_size() {
                return Err(RhiError::ResourceCreation(format!(
                    "pixel data is {} bytes, texture needs {}",
                    pixels.len(),
                    desc.byte_size()
                )));
            }
        }
        let texture = TextureHandle(self.allocate_name());
        self.textures.insert(texture, *desc);
        trace!("headless: texture {} created", texture);
        Ok(texture)
    }

    fn generate_mipmaps(&mut self, texture: TextureHandle) -> RhiResult<()> {
        match self.textures.get_mut(&texture) {
            Some(desc) => {
                desc.mipmapped = true;
                Ok(())
            }
            None => Err(RhiError::InvalidHandle(texture.to_string())),
        }
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(&texture).is_some() {
            self.state.textures.retain(|_, bound| *bound != texture);
            self.commands.push(Command::DeleteTexture(texture));
            trace!("headless: texture {} deleted", texture);
        }
    }

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> RhiResult<BufferHandle> {
        let buffer = BufferHandle(self.allocate_name());
        self.buffers.insert(buffer, (kind, data.len()));
        Ok(buffer)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer);
    }

    fn create_vertex_array(
        &mut self,
        vertex_buffers: &[BufferHandle],
        index_buffer: BufferHandle,
        attributes: &[VertexAttribute],
    ) -> RhiResult<VertexArrayHandle> {
        let kind_of = |buffer: &BufferHandle| self.buffers.get(buffer).map(|(kind, _)| *kind);

        if let Some(bad) = vertex_buffers
            .iter()
            .find(|b| kind_of(b) != Some(BufferKind::Vertex))
        {
            return Err(RhiError::InvalidHandle(format!("{bad} is not a vertex buffer")));
        }
        if kind_of(&index_buffer) != Some(BufferKind::Index) {
            return Err(RhiError::InvalidHandle(format!(
                "{index_buffer} is not an index buffer"
            )));
        }
        if attributes.is_empty() {
            return Err(RhiError::ResourceCreation(
                "vertex array needs at least one attribute".into(),
            ));
        }

        let vertex_array = VertexArrayHandle(self.allocate_name());
        let mut referenced = vertex_buffers.to_vec();
        referenced.push(index_buffer);
        self.vertex_arrays.insert(vertex_array, referenced);
        Ok(vertex_array)
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.vertex_arrays.remove(&vertex_array);
        if self.state.vertex_array == vertex_array {
            self.state.vertex_array = VertexArrayHandle::NULL;
        }
    }

    fn create_framebuffer(&mut self) -> RhiResult<FramebufferHandle> {
        let framebuffer = FramebufferHandle(self.allocate_name());
        self.framebuffers
            .insert(framebuffer, FramebufferRecord::default());
        Ok(framebuffer)
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        if self.framebuffers.remove(&framebuffer).is_none() {
            return;
        }
        if self.state.framebuffer == framebuffer {
            self.state.framebuffer = FramebufferHandle::NULL;
        }
        self.commands.push(Command::DeleteFramebuffer(framebuffer));
    }

    fn attach_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        point: AttachmentPoint,
        texture: TextureHandle,
    ) {
        let Some(record) = self.framebuffers.get_mut(&framebuffer) else {
            return;
        };
        record.attachments.retain(|(p, _)| *p != point);
        if !texture.is_null() {
            record.attachments.push((point, texture));
        }
    }

    fn set_draw_buffers(&mut self, framebuffer: FramebufferHandle, points: &[AttachmentPoint]) {
        if let Some(record) = self.framebuffers.get_mut(&framebuffer) {
            record.draw_buffers = points.to_vec();
        }
    }

    fn framebuffer_status(&self, framebuffer: FramebufferHandle) -> FramebufferStatus {
        let Some(record) = self.framebuffers.get(&framebuffer) else {
            return FramebufferStatus::Undefined;
        };
        if record.attachments.is_empty() {
            return FramebufferStatus::MissingAttachment;
        }

        let attachment_ok = |(point, texture): &(AttachmentPoint, TextureHandle)| {
            self.textures
                .get(texture)
                .is_some_and(|desc| desc.format.is_depth() == (*point == AttachmentPoint::Depth))
        };
        if !record.attachments.iter().all(attachment_ok) {
            return FramebufferStatus::IncompleteAttachment;
        }
        if self.framebuffer_size_mismatch(record) {
            return FramebufferStatus::IncompleteDimensions;
        }
        let has_point = |point: &AttachmentPoint| record.attachments.iter().any(|(p, _)| p == point);
        if !record.draw_buffers.iter().all(has_point) {
            return FramebufferStatus::IncompleteDrawBuffer;
        }
        FramebufferStatus::Complete
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> RhiResult<ShaderHandle> {
        if source.trim().is_empty() {
            return Err(RhiError::ShaderCompilation {
                stage,
                log: "empty source".into(),
            });
        }
        if let Some(line) = source
            .lines()
            .position(|l| l.trim_start().starts_with(COMPILE_ERROR_DIRECTIVE))
        {
            return Err(RhiError::ShaderCompilation {
                stage,
                log: format!("0:{}: {} directive", line + 1, COMPILE_ERROR_DIRECTIVE),
            });
        }

        let shader = ShaderHandle(self.allocate_name());
        self.shaders.insert(
            shader,
            ShaderRecord {
                stage,
                uniforms: reflect_uniforms(source),
            },
        );
        Ok(shader)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        if self.shaders.remove(&shader).is_some() {
            self.commands.push(Command::DeleteShader(shader));
        }
    }

    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> RhiResult<ProgramHandle> {
        let stage_of = |shader: &ShaderHandle| self.shaders.get(shader).map(|s| s.stage);
        if stage_of(&vertex) != Some(ShaderStage::Vertex)
            || stage_of(&fragment) != Some(ShaderStage::Fragment)
        {
            return Err(RhiError::ProgramLink {
                log: format!("{vertex} and {fragment} are not a vertex/fragment pair"),
            });
        }

        let mut record = ProgramRecord::default();
        let mut next_location = 0i32;
        let declared = self.shaders[&vertex]
            .uniforms
            .iter()
            .chain(&self.shaders[&fragment].uniforms);
        for uniform in declared {
            if !record.locations.contains_key(&uniform.name) {
                record
                    .locations
                    .insert(uniform.name.clone(), UniformLocation(next_location));
                next_location += uniform.array_len.max(1) as i32;
            }
        }

        let program = ProgramHandle(self.allocate_name());
        debug!(
            "headless: program {} linked with {} uniforms",
            program,
            record.locations.len()
        );
        self.programs.insert(program, record);
        Ok(program)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        if self.programs.remove(&program).is_none() {
            return;
        }
        if self.state.program == program {
            self.state.program = ProgramHandle::NULL;
        }
        self.commands.push(Command::DeleteProgram(program));
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> UniformLocation {
        self.programs
            .get(&program)
            .and_then(|p| p.locations.get(name).copied())
            .unwrap_or(UniformLocation::UNBOUND)
    }

    fn bind_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.state.framebuffer = framebuffer;
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.state.clear_color = color;
    }

    fn set_clear_depth(&mut self, depth: f32) {
        self.state.clear_depth = depth;
    }

    fn set_color_mask(&mut self, enabled: bool) {
        self.state.color_mask = enabled;
    }

    fn set_depth_state(&mut self, state: DepthState) {
        self.state.depth = state;
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.state.viewport = viewport;
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.commands.push(Command::Clear {
            framebuffer: self.state.framebuffer,
            flags,
        });
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.state.program = program;
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue<'_>) {
        if !location.is_bound() {
            return;
        }
        let Some(record) = self.programs.get_mut(&self.state.program) else {
            return;
        };
        if !record.locations.values().any(|l| *l == location) {
            return;
        }
        record.values.insert(location.0, value.words().to_vec());
        self.uniform_uploads += 1;
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        if texture.is_null() {
            self.state.textures.remove(&unit);
        } else {
            self.state.textures.insert(unit, texture);
        }
    }

    fn bind_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.state.vertex_array = vertex_array;
    }

    fn draw_indexed(&mut self, index_count: u32) {
        let draw = DrawCall {
            pass: self.debug_groups.last().cloned().unwrap_or_default(),
            program: self.state.program,
            framebuffer: self.state.framebuffer,
            vertex_array: self.state.vertex_array,
            index_count,
            textures: self
                .state
                .textures
                .iter()
                .map(|(unit, texture)| (*unit, *texture))
                .collect(),
        };
        self.commands.push(Command::Draw(self.draws.len()));
        self.draws.push(draw);
    }

    fn set_polygon_offset(&mut self, offset: Option<PolygonOffset>) {
        self.state.polygon_offset = offset;
    }

    fn blit_to_back_buffer(
        &mut self,
        source: FramebufferHandle,
        point: AttachmentPoint,
        width: u32,
        height: u32,
    ) {
        self.commands.push(Command::Blit {
            source,
            point,
            width,
            height,
        });
    }

    fn push_debug_group(&mut self, name: &str) {
        self.debug_groups.push(name.to_owned());
        self.commands.push(Command::PushDebugGroup(name.to_owned()));
    }

    fn pop_debug_group(&mut self) {
        if self.debug_groups.pop().is_some() {
            self.commands.push(Command::PopDebugGroup);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::TextureFormat;

    const VERTEX: &str = "uniform mat4 uModelMat;\nuniform vec3 uLights[4];\nvoid main() {}\n";
    const FRAGMENT: &str = "uniform mat4 uModelMat;\nuniform float uExposure;\nvoid main() {}\n";

    fn program(gfx: &mut HeadlessContext) -> ProgramHandle {
        let vs = gfx.compile_shader(ShaderStage::Vertex, VERTEX).unwrap();
        let fs = gfx.compile_shader(ShaderStage::Fragment, FRAGMENT).unwrap();
        gfx.link_program(vs, fs).unwrap()
    }

    #[test]
    fn test_locations_follow_declaration_order() {
        let mut gfx = HeadlessContext::new();
        let program = program(&mut gfx);

        assert_eq!(gfx.uniform_location(program, "uModelMat"), UniformLocation(0));
        assert_eq!(gfx.uniform_location(program, "uLights"), UniformLocation(1));
        assert_eq!(gfx.uniform_location(program, "uExposure"), UniformLocation(5));
        assert_eq!(
            gfx.uniform_location(program, "uMissing"),
            UniformLocation::UNBOUND
        );
    }

    #[test]
    fn test_uniform_read_back() {
        let mut gfx = HeadlessContext::new();
        let program = program(&mut gfx);
        let location = gfx.uniform_location(program, "uExposure");

        gfx.use_program(program);
        gfx.set_uniform(location, UniformValue::Float(&[0.25]));

        assert_eq!(
            gfx.uniform_words(program, location),
            Some(&[0.25f32.to_bits()][..])
        );
        assert_eq!(gfx.uniform_uploads(), 1);
    }

    #[test]
    fn test_uniform_ignored_without_program() {
        let mut gfx = HeadlessContext::new();
        gfx.set_uniform(UniformLocation(0), UniformValue::Uint(&[1]));
        assert_eq!(gfx.uniform_uploads(), 0);
    }

    #[test]
    fn test_compile_error_directive() {
        let mut gfx = HeadlessContext::new();
        let result = gfx.compile_shader(ShaderStage::Fragment, "void main() {}\n#error broken\n");
        assert!(matches!(
            result,
            Err(RhiError::ShaderCompilation {
                stage: ShaderStage::Fragment,
                ..
            })
        ));
        assert_eq!(gfx.resource_counts().shaders, 0);
    }

    #[test]
    fn test_link_rejects_swapped_stages() {
        let mut gfx = HeadlessContext::new();
        let vs = gfx.compile_shader(ShaderStage::Vertex, VERTEX).unwrap();
        let fs = gfx.compile_shader(ShaderStage::Fragment, FRAGMENT).unwrap();
        assert!(gfx.link_program(fs, vs).is_err());
    }

    #[test]
    fn test_framebuffer_completeness() {
        let mut gfx = HeadlessContext::new();
        let fb = gfx.create_framebuffer().unwrap();
        assert_eq!(gfx.framebuffer_status(fb), FramebufferStatus::MissingAttachment);

        let color = gfx
            .create_texture(&TextureDesc::color_attachment(8, 8), None)
            .unwrap();
        let depth = gfx.create_texture(&TextureDesc::depth(8, 8), None).unwrap();
        gfx.attach_texture(fb, AttachmentPoint::COLOR0, color);
        gfx.attach_texture(fb, AttachmentPoint::Depth, depth);
        gfx.set_draw_buffers(fb, &[AttachmentPoint::COLOR0]);
        assert_eq!(gfx.framebuffer_status(fb), FramebufferStatus::Complete);

        gfx.set_draw_buffers(fb, &[AttachmentPoint::Color(1)]);
        assert_eq!(
            gfx.framebuffer_status(fb),
            FramebufferStatus::IncompleteDrawBuffer
        );
    }

    #[test]
    fn test_framebuffer_rejects_wrong_format_and_size() {
        let mut gfx = HeadlessContext::new();
        let fb = gfx.create_framebuffer().unwrap();
        let depth = gfx.create_texture(&TextureDesc::depth(8, 8), None).unwrap();
        gfx.attach_texture(fb, AttachmentPoint::COLOR0, depth);
        assert_eq!(
            gfx.framebuffer_status(fb),
            FramebufferStatus::IncompleteAttachment
        );

        let color = gfx
            .create_texture(&TextureDesc::color_attachment(4, 4), None)
            .unwrap();
        gfx.attach_texture(fb, AttachmentPoint::COLOR0, color);
        gfx.attach_texture(fb, AttachmentPoint::Depth, depth);
        assert_eq!(
            gfx.framebuffer_status(fb),
            FramebufferStatus::IncompleteDimensions
        );

        gfx.delete_texture(depth);
        assert_eq!(
            gfx.framebuffer_status(fb),
            FramebufferStatus::IncompleteAttachment
        );
    }

    #[test]
    fn test_draw_records_pass_and_textures() {
        let mut gfx = HeadlessContext::new();
        let program = program(&mut gfx);
        let texture = gfx
            .create_texture(
                &TextureDesc::point_sampled(1, 1, TextureFormat::Rgba8),
                None,
            )
            .unwrap();

        gfx.push_debug_group("lighting");
        gfx.use_program(program);
        gfx.bind_texture(0, texture);
        gfx.draw_indexed(36);
        gfx.bind_texture(0, TextureHandle::NULL);
        gfx.pop_debug_group();
        gfx.draw_indexed(6);

        let draws = gfx.draw_calls();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].pass, "lighting");
        assert_eq!(draws[0].textures, [(0, texture)]);
        assert_eq!(draws[1].pass, "");
        assert!(draws[1].textures.is_empty());
        assert_eq!(gfx.draws_in("lighting").count(), 1);

        gfx.clear_log();
        assert!(gfx.commands().is_empty());
    }

    #[test]
    fn test_resource_counts_track_deletes() {
        let mut gfx = HeadlessContext::new();
        let texture = gfx.create_texture(&TextureDesc::depth(2, 2), None).unwrap();
        let fb = gfx.create_framebuffer().unwrap();
        assert_eq!(gfx.resource_counts().total(), 2);

        gfx.delete_texture(texture);
        gfx.delete_framebuffer(fb);
        gfx.delete_framebuffer(fb);
        assert_eq!(gfx.resource_counts(), ResourceCounts::default());
        assert_eq!(
            gfx.commands(),
            [Command::DeleteTexture(texture), Command::DeleteFramebuffer(fb)]
        );
    }
}
