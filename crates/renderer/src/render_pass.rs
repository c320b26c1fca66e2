//! Render passes: a program plus up to four framebuffer configurations.
//!
//! # Ownership
//!
//! A subpass owns the attachments it allocated from a
//! [`AttachmentSource::Allocate`] descriptor and its framebuffer. Textures
//! named by [`AttachmentSource::Existing`] or listed as dependencies are
//! borrowed from earlier passes and never freed here.

use lumen_core::{DiagnosticKind, Diagnostics};
use lumen_rhi::texture::create_texture;
use lumen_rhi::{
    AttachmentPoint, ClearFlags, CompareOp, FramebufferHandle, FramebufferStatus,
    GraphicsContext, TextureDesc, TextureHandle,
};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, info};

use crate::shader::ShaderProgram;

/// Maximum number of textures a subpass samples.
pub const MAX_SUBPASS_DEPENDENCIES: usize = 8;
/// Maximum number of textures a subpass renders to.
pub const MAX_SUBPASS_ATTACHMENTS: usize = 8;
/// Maximum number of subpasses in a render pass.
pub const MAX_SUBPASSES: usize = 4;

/// A fixed-capacity list would overflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("too many {what}: capacity is {capacity}")]
pub struct CapacityError {
    pub what: &'static str,
    pub capacity: usize,
}

/// Where an attachment's texture comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachmentSource {
    /// Allocate a texture owned by the subpass.
    Allocate(TextureDesc),
    /// Render into a texture owned elsewhere.
    Existing(TextureHandle),
}

/// One render target of a subpass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttachmentDesc {
    pub point: AttachmentPoint,
    pub source: AttachmentSource,
}

impl AttachmentDesc {
    pub const fn allocate(point: AttachmentPoint, desc: TextureDesc) -> Self {
        Self {
            point,
            source: AttachmentSource::Allocate(desc),
        }
    }

    pub const fn existing(point: AttachmentPoint, texture: TextureHandle) -> Self {
        Self {
            point,
            source: AttachmentSource::Existing(texture),
        }
    }
}

/// Framebuffer and fixed-function state of one subpass.
///
/// Dependencies are bound to texture units `0..n` in order before drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct SubPassDescriptor {
    dependencies: SmallVec<[TextureHandle; MAX_SUBPASS_DEPENDENCIES]>,
    attachments: SmallVec<[AttachmentDesc; MAX_SUBPASS_ATTACHMENTS]>,
    pub clear_color: [f32; 4],
    pub clear_depth: f32,
    pub clear: ClearFlags,
    pub depth_test: bool,
    pub depth_func: CompareOp,
    pub color_write: bool,
    pub depth_write: bool,
}

impl Default for SubPassDescriptor {
    fn default() -> Self {
        Self {
            dependencies: SmallVec::new(),
            attachments: SmallVec::new(),
            clear_color: [0.0; 4],
            clear_depth: 1.0,
            clear: ClearFlags::default(),
            depth_test: true,
            depth_func: CompareOp::Always,
            color_write: false,
            depth_write: false,
        }
    }
}

impl SubPassDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a texture to sample.
    pub fn push_dependency(&mut self, texture: TextureHandle) -> Result<(), CapacityError> {
        if self.dependencies.len() == MAX_SUBPASS_DEPENDENCIES {
            return Err(CapacityError {
                what: "dependencies",
                capacity: MAX_SUBPASS_DEPENDENCIES,
            });
        }
        self.dependencies.push(texture);
        Ok(())
    }

    /// Append a render target.
    pub fn push_attachment(&mut self, attachment: AttachmentDesc) -> Result<(), CapacityError> {
        if self.attachments.len() == MAX_SUBPASS_ATTACHMENTS {
            return Err(CapacityError {
                what: "attachments",
                capacity: MAX_SUBPASS_ATTACHMENTS,
            });
        }
        self.attachments.push(attachment);
        Ok(())
    }

    pub fn with_dependency(mut self, texture: TextureHandle) -> Result<Self, CapacityError> {
        self.push_dependency(texture)?;
        Ok(self)
    }

    pub fn with_attachment(mut self, attachment: AttachmentDesc) -> Result<Self, CapacityError> {
        self.push_attachment(attachment)?;
        Ok(self)
    }

    /// Depth comparison and whether passing fragments write depth.
    pub fn with_depth(mut self, func: CompareOp, write: bool) -> Self {
        self.depth_func = func;
        self.depth_write = write;
        self
    }

    pub fn with_color_write(mut self, enabled: bool) -> Self {
        self.color_write = enabled;
        self
    }

    pub fn clearing_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self.clear.color = true;
        self
    }

    pub fn clearing_depth(mut self, depth: f32) -> Self {
        self.clear_depth = depth;
        self.clear.depth = true;
        self
    }

    pub fn dependencies(&self) -> &[TextureHandle] {
        &self.dependencies
    }

    pub fn attachments(&self) -> &[AttachmentDesc] {
        &self.attachments
    }

    /// Re-point dependency `index`. Returns `false` if there is no such slot.
    pub fn set_dependency(&mut self, index: usize, texture: TextureHandle) -> bool {
        match self.dependencies.get_mut(index) {
            Some(slot) => {
                *slot = texture;
                true
            }
            None => false,
        }
    }

    /// Exchange two dependency slots. Out of range indices are ignored.
    pub fn swap_dependencies(&mut self, a: usize, b: usize) {
        if a < self.dependencies.len() && b < self.dependencies.len() {
            self.dependencies.swap(a, b);
        }
    }

    /// Point a borrowed attachment at another texture.
    ///
    /// Returns `false` if `point` is not an [`AttachmentSource::Existing`]
    /// attachment.
    pub fn set_existing_attachment(&mut self, point: AttachmentPoint, texture: TextureHandle) -> bool {
        let slot = self
            .attachments
            .iter_mut()
            .find(|a| a.point == point && matches!(a.source, AttachmentSource::Existing(_)));
        match slot {
            Some(attachment) => {
                attachment.source = AttachmentSource::Existing(texture);
                true
            }
            None => false,
        }
    }
}

/// Whether a subpass frees an attachment when deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    Owned,
    Borrowed,
}

/// A resolved attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub point: AttachmentPoint,
    pub texture: TextureHandle,
    pub ownership: Ownership,
}

/// A descriptor realized as a framebuffer.
#[derive(Debug, PartialEq)]
pub struct SubPass {
    desc: SubPassDescriptor,
    attachments: SmallVec<[Attachment; MAX_SUBPASS_ATTACHMENTS]>,
    framebuffer: FramebufferHandle,
    status: FramebufferStatus,
    /// Inactive subpasses are skipped by the executor.
    pub active: bool,
}

impl SubPass {
    pub fn descriptor(&self) -> &SubPassDescriptor {
        &self.desc
    }

    /// Descriptor access for re-pointing dependencies between frames.
    pub fn descriptor_mut(&mut self) -> &mut SubPassDescriptor {
        &mut self.desc
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Texture attached at `point`, if any.
    pub fn attachment(&self, point: AttachmentPoint) -> Option<TextureHandle> {
        self.attachments
            .iter()
            .find(|a| a.point == point)
            .map(|a| a.texture)
    }

    pub fn framebuffer(&self) -> FramebufferHandle {
        self.framebuffer
    }

    pub fn status(&self) -> FramebufferStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    fn owned_textures(&self) -> impl Iterator<Item = TextureHandle> + '_ {
        self.attachments
            .iter()
            .filter(|a| a.ownership == Ownership::Owned)
            .map(|a| a.texture)
    }

    fn release<G: GraphicsContext + ?Sized>(&mut self, gfx: &mut G) {
        for texture in self.owned_textures() {
            gfx.delete_texture(texture);
        }
        gfx.delete_framebuffer(self.framebuffer);
        self.attachments.clear();
        self.framebuffer = FramebufferHandle::NULL;
        self.status = FramebufferStatus::Undefined;
        self.active = false;
    }
}

/// A named group of subpasses sharing one program and viewport size.
#[derive(Debug, PartialEq)]
pub struct RenderPass {
    name: String,
    subpasses: SmallVec<[SubPass; MAX_SUBPASSES]>,
    program: ShaderProgram,
    width: u32,
    height: u32,
}

impl RenderPass {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subpasses(&self) -> &[SubPass] {
        &self.subpasses
    }

    pub fn subpasses_mut(&mut self) -> &mut [SubPass] {
        &mut self.subpasses
    }

    pub fn subpass(&self, index: usize) -> Option<&SubPass> {
        self.subpasses.get(index)
    }

    pub fn subpass_mut(&mut self, index: usize) -> Option<&mut SubPass> {
        self.subpasses.get_mut(index)
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Texture written at `point` by subpass `index`.
    pub fn output(&self, index: usize, point: AttachmentPoint) -> TextureHandle {
        self.subpass(index)
            .and_then(|s| s.attachment(point))
            .unwrap_or(TextureHandle::NULL)
    }

    /// Recreate owned attachments and framebuffers at a new size.
    ///
    /// Allocated attachments sized to the pass follow it to
    /// `width`×`height`; allocated attachments of any other size keep it.
    /// Borrowed attachments and dependencies are taken from the current
    /// descriptors, so callers re-point them first. The program is kept.
    pub fn reallocate<G: GraphicsContext + ?Sized>(
        &mut self,
        gfx: &mut G,
        width: u32,
        height: u32,
    ) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for subpass in self.subpasses.iter_mut() {
            subpass.release(gfx);
            let mut desc = subpass.desc.clone();
            for attachment in desc.attachments.iter_mut() {
                match &mut attachment.source {
                    AttachmentSource::Allocate(texture)
                        if (texture.width, texture.height) == (self.width, self.height) =>
                    {
                        *texture = texture.resized(width, height);
                    }
                    _ => {}
                }
            }
            *subpass = build_subpass(gfx, &self.name, desc, &mut diagnostics);
        }
        self.width = width;
        self.height = height;
        debug!("Render pass {} reallocated at {}x{}", self.name, width, height);
        diagnostics
    }
}

/// Build a render pass from subpass descriptors.
///
/// Every subpass gets its own framebuffer. Subpasses whose framebuffer is
/// incomplete, or whose attachments could not be allocated, are returned
/// inactive with a [`DiagnosticKind::FramebufferIncomplete`] entry.
/// Descriptors past [`MAX_SUBPASSES`] are dropped with a
/// [`DiagnosticKind::CapacityExceeded`] entry.
pub fn create_render_pass<G: GraphicsContext + ?Sized>(
    gfx: &mut G,
    name: impl Into<String>,
    descriptors: impl IntoIterator<Item = SubPassDescriptor>,
    program: ShaderProgram,
    width: u32,
    height: u32,
) -> (RenderPass, Diagnostics) {
    let name = name.into();
    let mut diagnostics = Diagnostics::new();
    let mut subpasses = SmallVec::new();

    for (i, desc) in descriptors.into_iter().enumerate() {
        if i >= MAX_SUBPASSES {
            diagnostics.push(
                DiagnosticKind::CapacityExceeded,
                name.as_str(),
                format!("subpass {i} dropped: capacity is {MAX_SUBPASSES}"),
            );
            continue;
        }
        subpasses.push(build_subpass(gfx, &name, desc, &mut diagnostics));
    }

    info!(
        "Render pass {} created: {} subpasses, {}x{}",
        name,
        subpasses.len(),
        width,
        height
    );

    let pass = RenderPass {
        name,
        subpasses,
        program,
        width,
        height,
    };
    (pass, diagnostics)
}

fn build_subpass<G: GraphicsContext + ?Sized>(
    gfx: &mut G,
    pass: &str,
    desc: SubPassDescriptor,
    diagnostics: &mut Diagnostics,
) -> SubPass {
    let mut subpass = SubPass {
        desc,
        attachments: SmallVec::new(),
        framebuffer: FramebufferHandle::NULL,
        status: FramebufferStatus::Undefined,
        active: false,
    };

    subpass.framebuffer = match gfx.create_framebuffer() {
        Ok(framebuffer) => framebuffer,
        Err(e) => {
            diagnostics.push(DiagnosticKind::FramebufferIncomplete, pass, e.to_string());
            return subpass;
        }
    };

    let mut draw_buffers: SmallVec<[AttachmentPoint; MAX_SUBPASS_ATTACHMENTS]> = SmallVec::new();
    for attachment in subpass.desc.attachments.iter() {
        let (texture, ownership) = match attachment.source {
            AttachmentSource::Allocate(desc) => match create_texture(gfx, &desc, None) {
                Ok(texture) => (texture, Ownership::Owned),
                Err(e) => {
                    diagnostics.push(
                        DiagnosticKind::FramebufferIncomplete,
                        pass,
                        format!("{} attachment: {}", attachment.point, e),
                    );
                    continue;
                }
            },
            AttachmentSource::Existing(texture) => (texture, Ownership::Borrowed),
        };
        gfx.attach_texture(subpass.framebuffer, attachment.point, texture);
        subpass.attachments.push(Attachment {
            point: attachment.point,
            texture,
            ownership,
        });
        if attachment.point.is_color() {
            draw_buffers.push(attachment.point);
        }
    }
    gfx.set_draw_buffers(subpass.framebuffer, &draw_buffers);

    subpass.status = gfx.framebuffer_status(subpass.framebuffer);
    subpass.active = subpass.status.is_complete();
    if !subpass.active {
        diagnostics.push(
            DiagnosticKind::FramebufferIncomplete,
            pass,
            format!("{}: {}", subpass.framebuffer, subpass.status),
        );
    }
    subpass
}

/// Free everything the pass owns: the program and its stages, then the
/// allocated attachments of every subpass, then every framebuffer.
pub fn delete_render_pass<G: GraphicsContext + ?Sized>(gfx: &mut G, mut pass: RenderPass) {
    pass.program.delete(gfx);
    for subpass in pass.subpasses.iter() {
        for texture in subpass.owned_textures() {
            gfx.delete_texture(texture);
        }
    }
    for subpass in pass.subpasses.iter() {
        gfx.delete_framebuffer(subpass.framebuffer);
    }
    debug!("Render pass {} deleted", pass.name);
}

#[cfg(test)]
mod tests {
    use lumen_rhi::headless::Command;
    use lumen_rhi::TextureFormat;
    use lumen_rhi::HeadlessContext;

    use super::*;

    fn color(w: u32, h: u32) -> AttachmentDesc {
        AttachmentDesc::allocate(AttachmentPoint::COLOR0, TextureDesc::color_attachment(w, h))
    }

    fn depth(w: u32, h: u32) -> AttachmentDesc {
        AttachmentDesc::allocate(AttachmentPoint::Depth, TextureDesc::depth(w, h))
    }

    #[test]
    fn test_default_descriptor() {
        let desc = SubPassDescriptor::default();
        assert_eq!(desc.depth_func, CompareOp::Always);
        assert_eq!(desc.clear_depth, 1.0);
        assert!(!desc.clear.any());
        assert!(!desc.color_write && !desc.depth_write);
        assert!(desc.depth_test);
        assert!(desc.dependencies().is_empty());
    }

    #[test]
    fn test_descriptor_capacity() {
        let mut desc = SubPassDescriptor::new();
        for i in 0..MAX_SUBPASS_DEPENDENCIES {
            desc.push_dependency(TextureHandle(i as u32 + 1)).unwrap();
        }
        assert_eq!(
            desc.push_dependency(TextureHandle(99)),
            Err(CapacityError {
                what: "dependencies",
                capacity: 8
            })
        );
        for _ in 0..MAX_SUBPASS_ATTACHMENTS {
            desc.push_attachment(color(4, 4)).unwrap();
        }
        assert!(desc.push_attachment(color(4, 4)).is_err());
        assert_eq!(desc.attachments().len(), 8);
    }

    #[test]
    fn test_depth_only_target() {
        let mut gfx = HeadlessContext::new();
        let desc = SubPassDescriptor::new()
            .with_attachment(depth(64, 64))
            .unwrap()
            .with_depth(CompareOp::Less, true)
            .clearing_depth(1.0);

        let (pass, diagnostics) =
            create_render_pass(&mut gfx, "Depth", [desc], ShaderProgram::null("depth"), 64, 64);
        assert!(diagnostics.is_empty());

        let subpass = &pass.subpasses()[0];
        assert!(subpass.active);
        assert_eq!(gfx.draw_buffers(subpass.framebuffer()), Some(&[][..]));
        assert_eq!(gfx.live_textures(), 1);
        assert_eq!(gfx.live_framebuffers(), 1);

        delete_render_pass(&mut gfx, pass);
        assert_eq!(gfx.resource_counts().total(), 0);
    }

    #[test]
    fn test_draw_buffers_follow_declaration_order() {
        let mut gfx = HeadlessContext::new();
        let desc = SubPassDescriptor::new()
            .with_attachment(AttachmentDesc::allocate(
                AttachmentPoint::Color(1),
                TextureDesc::color_attachment(8, 8),
            ))
            .unwrap()
            .with_attachment(depth(8, 8))
            .unwrap()
            .with_attachment(color(8, 8))
            .unwrap();

        let (pass, _) = create_render_pass(&mut gfx, "MRT", [desc], ShaderProgram::null("mrt"), 8, 8);
        let fb = pass.subpasses()[0].framebuffer();
        assert_eq!(
            gfx.draw_buffers(fb),
            Some(&[AttachmentPoint::Color(1), AttachmentPoint::COLOR0][..])
        );
        delete_render_pass(&mut gfx, pass);
    }

    #[test]
    fn test_borrowed_attachments_survive_delete() {
        let mut gfx = HeadlessContext::new();
        let shared_depth = create_texture(&mut gfx, &TextureDesc::depth(32, 32), None).unwrap();
        let sampled = create_texture(
            &mut gfx,
            &TextureDesc::point_sampled(32, 32, TextureFormat::Rgba8),
            None,
        )
        .unwrap();

        let desc = SubPassDescriptor::new()
            .with_dependency(sampled)
            .unwrap()
            .with_attachment(color(32, 32))
            .unwrap()
            .with_attachment(AttachmentDesc::existing(AttachmentPoint::Depth, shared_depth))
            .unwrap();
        let (pass, diagnostics) =
            create_render_pass(&mut gfx, "Lighting", [desc], ShaderProgram::null("lighting"), 32, 32);
        assert!(diagnostics.is_empty());

        let subpass = &pass.subpasses()[0];
        assert_eq!(subpass.attachment(AttachmentPoint::Depth), Some(shared_depth));
        assert_eq!(subpass.attachments()[1].ownership, Ownership::Borrowed);
        assert_eq!(gfx.live_textures(), 3);

        delete_render_pass(&mut gfx, pass);
        assert_eq!(gfx.live_textures(), 2);
        assert!(gfx.is_texture_live(shared_depth));
        assert!(gfx.is_texture_live(sampled));
        assert_eq!(gfx.live_framebuffers(), 0);
    }

    #[test]
    fn test_delete_release_order() {
        let mut gfx = HeadlessContext::new();
        let mut diagnostics = Diagnostics::new();
        let program = ShaderProgram::from_sources(
            &mut gfx,
            "lighting",
            "void main() {}\n",
            "void main() {}\n",
            &mut diagnostics,
        );
        let (handle, vertex, fragment) = (program.handle(), program.vertex_shader(), program.fragment_shader());
        let shared_depth = create_texture(&mut gfx, &TextureDesc::depth(16, 16), None).unwrap();
        let with_depth = SubPassDescriptor::new()
            .with_attachment(color(16, 16))
            .unwrap()
            .with_attachment(AttachmentDesc::existing(AttachmentPoint::Depth, shared_depth))
            .unwrap();
        let color_only = SubPassDescriptor::new().with_attachment(color(16, 16)).unwrap();
        let (pass, _) = create_render_pass(&mut gfx, "Lighting", [with_depth, color_only], program, 16, 16);
        let owned = [pass.output(0, AttachmentPoint::COLOR0), pass.output(1, AttachmentPoint::COLOR0)];
        let framebuffers = [pass.subpasses()[0].framebuffer(), pass.subpasses()[1].framebuffer()];

        gfx.clear_log();
        delete_render_pass(&mut gfx, pass);

        assert_eq!(
            gfx.commands(),
            [
                Command::DeleteProgram(handle),
                Command::DeleteShader(vertex),
                Command::DeleteShader(fragment),
                Command::DeleteTexture(owned[0]),
                Command::DeleteTexture(owned[1]),
                Command::DeleteFramebuffer(framebuffers[0]),
                Command::DeleteFramebuffer(framebuffers[1]),
            ]
        );
        assert!(gfx.is_texture_live(shared_depth));
        assert_eq!(gfx.resource_counts().total(), 1);
    }

    #[test]
    fn test_incomplete_subpass_is_inactive() {
        let mut gfx = HeadlessContext::new();
        let mismatched = SubPassDescriptor::new()
            .with_attachment(color(16, 16))
            .unwrap()
            .with_attachment(depth(8, 8))
            .unwrap();
        let empty = SubPassDescriptor::new();
        let good = SubPassDescriptor::new().with_attachment(color(16, 16)).unwrap();

        let (pass, diagnostics) = create_render_pass(
            &mut gfx,
            "Broken",
            [mismatched, empty, good],
            ShaderProgram::null("broken"),
            16,
            16,
        );

        assert_eq!(diagnostics.of_kind(DiagnosticKind::FramebufferIncomplete).count(), 2);
        let active: Vec<_> = pass.subpasses().iter().map(|s| s.active).collect();
        assert_eq!(active, [false, false, true]);
        assert_eq!(pass.subpasses()[0].status(), FramebufferStatus::IncompleteDimensions);
        assert_eq!(pass.subpasses()[1].status(), FramebufferStatus::MissingAttachment);

        delete_render_pass(&mut gfx, pass);
        assert_eq!(gfx.resource_counts().total(), 0);
    }

    #[test]
    fn test_too_many_subpasses() {
        let mut gfx = HeadlessContext::new();
        let descs = (0..5).map(|_| SubPassDescriptor::new().with_attachment(color(4, 4)).unwrap());
        let (pass, diagnostics) =
            create_render_pass(&mut gfx, "Wide", descs, ShaderProgram::null("wide"), 4, 4);

        assert_eq!(pass.subpasses().len(), MAX_SUBPASSES);
        assert_eq!(diagnostics.of_kind(DiagnosticKind::CapacityExceeded).count(), 1);
        delete_render_pass(&mut gfx, pass);
        assert_eq!(gfx.resource_counts().total(), 0);
    }

    #[test]
    fn test_reallocate_resizes_owned_only() {
        let mut gfx = HeadlessContext::new();
        let shared_depth = create_texture(&mut gfx, &TextureDesc::depth(32, 32), None).unwrap();
        let desc = SubPassDescriptor::new()
            .with_attachment(color(32, 32))
            .unwrap()
            .with_attachment(AttachmentDesc::existing(AttachmentPoint::Depth, shared_depth))
            .unwrap();
        let (mut pass, _) =
            create_render_pass(&mut gfx, "Lighting", [desc], ShaderProgram::null("lighting"), 32, 32);
        let old_color = pass.output(0, AttachmentPoint::COLOR0);

        let new_depth = create_texture(&mut gfx, &TextureDesc::depth(64, 48), None).unwrap();
        pass.subpasses_mut()[0]
            .descriptor_mut()
            .set_existing_attachment(AttachmentPoint::Depth, new_depth);
        let diagnostics = pass.reallocate(&mut gfx, 64, 48);
        assert!(diagnostics.is_empty());

        let new_color = pass.output(0, AttachmentPoint::COLOR0);
        assert!(!gfx.is_texture_live(old_color));
        assert_eq!(gfx.texture_desc(new_color).map(|d| (d.width, d.height)), Some((64, 48)));
        assert!(pass.subpasses()[0].active);
        assert_eq!((pass.width(), pass.height()), (64, 48));
        assert!(gfx.is_texture_live(shared_depth));
        assert_eq!(gfx.live_textures(), 3);
        assert_eq!(gfx.live_framebuffers(), 1);
    }

    #[test]
    fn test_reallocate_keeps_off_size_attachments() {
        let mut gfx = HeadlessContext::new();
        let full = SubPassDescriptor::new().with_attachment(color(32, 32)).unwrap();
        let half = SubPassDescriptor::new().with_attachment(color(16, 16)).unwrap();
        let (mut pass, _) =
            create_render_pass(&mut gfx, "Bloom", [full, half], ShaderProgram::null("bloom"), 32, 32);

        let diagnostics = pass.reallocate(&mut gfx, 64, 64);
        assert!(diagnostics.is_empty());

        let size = |index| {
            gfx.texture_desc(pass.output(index, AttachmentPoint::COLOR0))
                .map(|d| (d.width, d.height))
        };
        assert_eq!(size(0), Some((64, 64)));
        assert_eq!(size(1), Some((16, 16)));
        assert!(pass.subpasses().iter().all(|s| s.active));

        delete_render_pass(&mut gfx, pass);
        assert_eq!(gfx.resource_counts().total(), 0);
    }

    #[test]
    fn test_dependency_editing() {
        let mut desc = SubPassDescriptor::new()
            .with_dependency(TextureHandle(1))
            .unwrap()
            .with_dependency(TextureHandle(2))
            .unwrap();
        desc.swap_dependencies(0, 1);
        assert_eq!(desc.dependencies(), [TextureHandle(2), TextureHandle(1)]);
        assert!(desc.set_dependency(1, TextureHandle(7)));
        assert!(!desc.set_dependency(5, TextureHandle(7)));
        assert_eq!(desc.dependencies()[1], TextureHandle(7));
        assert!(!desc.set_existing_attachment(AttachmentPoint::Depth, TextureHandle(3)));
    }
}
