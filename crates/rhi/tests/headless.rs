//! Property tests for the recording backend's framebuffer and program
//! bookkeeping.

use lumen_rhi::texture::create_texture;
use lumen_rhi::{
    AttachmentPoint, FramebufferStatus, GraphicsContext, HeadlessContext, ShaderStage, TextureDesc,
    UniformLocation,
};
use proptest::prelude::*;

fn uniform_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("u[A-Z][a-zA-Z0-9]{0,12}", 1..12)
        .prop_map(|names| names.into_iter().collect())
}

proptest! {
    #[test]
    fn test_matching_sizes_are_complete(
        colors in 1u8..=8,
        depth in any::<bool>(),
        width in 1u32..512,
        height in 1u32..512,
    ) {
        let mut gfx = HeadlessContext::new();
        let framebuffer = gfx.create_framebuffer().unwrap();
        let mut draw_buffers = Vec::new();
        for i in 0..colors {
            let texture = create_texture(&mut gfx, &TextureDesc::color_attachment(width, height), None).unwrap();
            gfx.attach_texture(framebuffer, AttachmentPoint::Color(i), texture);
            draw_buffers.push(AttachmentPoint::Color(i));
        }
        if depth {
            let texture = create_texture(&mut gfx, &TextureDesc::depth(width, height), None).unwrap();
            gfx.attach_texture(framebuffer, AttachmentPoint::Depth, texture);
        }
        gfx.set_draw_buffers(framebuffer, &draw_buffers);

        prop_assert_eq!(gfx.framebuffer_status(framebuffer), FramebufferStatus::Complete);
        prop_assert_eq!(gfx.draw_buffers(framebuffer), Some(&draw_buffers[..]));
    }

    #[test]
    fn test_mismatched_sizes_are_incomplete(width in 1u32..512, height in 1u32..512, grow in 1u32..64) {
        let mut gfx = HeadlessContext::new();
        let framebuffer = gfx.create_framebuffer().unwrap();
        let color = create_texture(&mut gfx, &TextureDesc::color_attachment(width, height), None).unwrap();
        let depth = create_texture(&mut gfx, &TextureDesc::depth(width + grow, height), None).unwrap();
        gfx.attach_texture(framebuffer, AttachmentPoint::COLOR0, color);
        gfx.attach_texture(framebuffer, AttachmentPoint::Depth, depth);

        prop_assert_eq!(gfx.framebuffer_status(framebuffer), FramebufferStatus::IncompleteDimensions);
    }

    #[test]
    fn test_every_declared_uniform_resolves(names in uniform_names(), split in 0usize..12) {
        let split = split.min(names.len());
        let declare = |names: &[String]| {
            let mut source: String = names.iter().map(|n| format!("uniform vec4 {n};\n")).collect();
            source.push_str("void main() {}\n");
            source
        };

        let mut gfx = HeadlessContext::new();
        let vertex = gfx.compile_shader(ShaderStage::Vertex, &declare(&names[..split])).unwrap();
        let fragment = gfx.compile_shader(ShaderStage::Fragment, &declare(&names[split..])).unwrap();
        let program = gfx.link_program(vertex, fragment).unwrap();

        let mut locations: Vec<UniformLocation> =
            names.iter().map(|n| gfx.uniform_location(program, n)).collect();
        prop_assert!(locations.iter().all(|l| l.is_bound()));
        locations.sort_by_key(|l| l.0);
        locations.dedup();
        prop_assert_eq!(locations.len(), names.len());
        prop_assert!(!gfx.uniform_location(program, "notDeclared").is_bound());
    }
}
