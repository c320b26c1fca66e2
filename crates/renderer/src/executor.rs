//! Records render passes into a [`GraphicsContext`].
//!
//! Execution is strictly nested: bind framebuffer, use program, bind
//! textures, draw, then unbind in reverse. Nothing is cached between
//! passes, so any pass can run after any other.

use lumen_rhi::{
    AttachmentPoint, DepthState, FramebufferHandle, GraphicsContext, ProgramHandle,
    TextureHandle, Viewport,
};
use tracing::trace;

use crate::frame_context::FrameUniforms;
use crate::model::MaterialTextures;
use crate::render_pass::RenderPass;
use crate::uniform::InstanceData;

/// Run every active subpass of `pass` over `instances.models`.
///
/// Dependencies are bound to units `0..n` and each model's material
/// textures to units `n..n + 5`, with `instances.placeholder` standing in
/// for null maps. A pass without a linked program still clears its targets
/// but issues no draws.
pub fn execute_render_pass<G: GraphicsContext + ?Sized>(
    gfx: &mut G,
    pass: &RenderPass,
    frame: &FrameUniforms,
    instances: &InstanceData<'_>,
) {
    gfx.push_debug_group(pass.name());

    let program = pass.program();
    let viewport = Viewport::sized(pass.width(), pass.height());

    for subpass in pass.subpasses().iter().filter(|s| s.active) {
        let desc = subpass.descriptor();

        gfx.bind_framebuffer(subpass.framebuffer());
        gfx.set_clear_color(desc.clear_color);
        gfx.set_color_mask(desc.color_write);
        gfx.set_clear_depth(desc.clear_depth);
        gfx.set_depth_state(DepthState {
            test: desc.depth_test,
            write: desc.depth_write,
            func: desc.depth_func,
        });
        gfx.set_viewport(viewport);
        if desc.clear.any() {
            gfx.clear(desc.clear);
        }

        if program.is_linked() {
            gfx.use_program(program.handle());
            program.bindings().push_globals(gfx, frame);

            let dependencies = desc.dependencies();
            for (unit, texture) in dependencies.iter().enumerate() {
                gfx.bind_texture(unit as u32, *texture);
            }

            let first_material_unit = dependencies.len() as u32;
            for (i, model) in instances.models.iter().enumerate() {
                program.bindings().push_instance(gfx, instances, i);
                let material = material_units(&model.textures, instances.placeholder, first_material_unit);
                for (unit, texture) in material.clone() {
                    gfx.bind_texture(unit, texture);
                }
                gfx.bind_vertex_array(model.vertex_array);
                gfx.draw_indexed(model.index_count);
                for (unit, _) in material {
                    gfx.bind_texture(unit, TextureHandle::NULL);
                }
            }

            for unit in 0..dependencies.len() {
                gfx.bind_texture(unit as u32, TextureHandle::NULL);
            }
            gfx.use_program(ProgramHandle::NULL);
        }

        gfx.bind_framebuffer(FramebufferHandle::NULL);
    }

    gfx.pop_debug_group();
    trace!("executed {}", pass.name());
}

fn material_units(
    textures: &MaterialTextures,
    placeholder: TextureHandle,
    first_unit: u32,
) -> impl Iterator<Item = (u32, TextureHandle)> + Clone {
    textures
        .as_array()
        .into_iter()
        .zip(first_unit..)
        .map(move |(texture, unit)| (unit, if texture.is_null() { placeholder } else { texture }))
        .filter(|(_, texture)| !texture.is_null())
}

/// Copy `point` of `framebuffer` to the back buffer at full size.
pub fn execute_back_buffer_blit<G: GraphicsContext + ?Sized>(
    gfx: &mut G,
    framebuffer: FramebufferHandle,
    point: AttachmentPoint,
    width: u32,
    height: u32,
) {
    gfx.push_debug_group("Blit framebuffer");
    gfx.bind_framebuffer(FramebufferHandle::NULL);
    gfx.set_viewport(Viewport::sized(width, height));
    gfx.blit_to_back_buffer(framebuffer, point, width, height);
    gfx.pop_debug_group();
}

#[cfg(test)]
mod tests {
    use std::mem::offset_of;

    use glam::{Mat4, Vec3};
    use lumen_core::Diagnostics;
    use lumen_rhi::headless::Command;
    use lumen_rhi::texture::{create_placeholder_texture, create_texture};
    use lumen_rhi::{ClearFlags, CompareOp, HeadlessContext, TextureDesc};

    use super::*;
    use crate::model::RenderModel;
    use crate::render_pass::{create_render_pass, delete_render_pass, AttachmentDesc, SubPassDescriptor};
    use crate::shader::ShaderProgram;
    use crate::uniform::{InstanceSource, UniformKind, UniformLayout};

    const VERTEX: &str = "uniform mat4 uViewMat;\nuniform mat4 uModelMat;\nvoid main() {}\n";
    const FRAGMENT: &str = "uniform uint uTaaEnabledUint;\nvoid main() {}\n";

    fn program(gfx: &mut HeadlessContext) -> ShaderProgram {
        let mut diagnostics = Diagnostics::new();
        let mut program = ShaderProgram::from_sources(gfx, "test", VERTEX, FRAGMENT, &mut diagnostics);
        let layout = UniformLayout::new()
            .global("uViewMat", offset_of!(FrameUniforms, view), UniformKind::Mat4)
            .global("uTaaEnabledUint", offset_of!(FrameUniforms, taa_enabled), UniformKind::Uint)
            .instance(
                "uModelMat",
                InstanceSource::Models,
                offset_of!(RenderModel, transform),
                UniformKind::Mat4,
            );
        program.bind_uniforms(&*gfx, &layout, &mut diagnostics);
        assert!(diagnostics.is_empty());
        program
    }

    fn target(dependency: TextureHandle) -> SubPassDescriptor {
        SubPassDescriptor::new()
            .with_dependency(dependency)
            .unwrap()
            .with_attachment(AttachmentDesc::allocate(
                AttachmentPoint::COLOR0,
                TextureDesc::color_attachment(16, 16),
            ))
            .unwrap()
            .with_color_write(true)
            .with_depth(CompareOp::LessEqual, false)
            .clearing_color([1.0; 4])
    }

    fn model(index_count: u32, albedo: TextureHandle) -> RenderModel {
        RenderModel {
            transform: Mat4::from_translation(Vec3::splat(index_count as f32)),
            vertex_array: lumen_rhi::VertexArrayHandle(100 + index_count),
            index_count,
            textures: MaterialTextures {
                albedo,
                ..MaterialTextures::default()
            },
            ..RenderModel::default()
        }
    }

    #[test]
    fn test_draws_each_model_with_bindings() {
        let mut gfx = HeadlessContext::new();
        let shadow = create_texture(&mut gfx, &TextureDesc::depth(16, 16), None).unwrap();
        let albedo = TextureHandle(500);
        let program = program(&mut gfx);
        let handle = program.handle();
        let (pass, _) = create_render_pass(&mut gfx, "Lighting", [target(shadow)], program, 16, 16);

        let models = [model(6, albedo), model(36, TextureHandle::NULL)];
        let frame = FrameUniforms {
            view: Mat4::from_scale(Vec3::splat(2.0)),
            taa_enabled: 1,
            ..FrameUniforms::default()
        };
        execute_render_pass(&mut gfx, &pass, &frame, &InstanceData::models(&models));

        let draws: Vec<_> = gfx.draws_in("Lighting").collect();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].index_count, 6);
        assert_eq!(draws[0].program, handle);
        assert_eq!(draws[0].framebuffer, pass.subpasses()[0].framebuffer());
        assert_eq!(draws[0].textures, [(0, shadow), (1, albedo)]);
        assert_eq!(draws[1].textures, [(0, shadow)]);

        let transform = models[1].transform.to_cols_array().map(f32::to_bits);
        assert_eq!(gfx.uniform_words_by_name(handle, "uModelMat"), Some(&transform[..]));
        assert_eq!(gfx.uniform_words_by_name(handle, "uTaaEnabledUint"), Some(&[1u32][..]));

        let state = gfx.state();
        assert!(state.framebuffer.is_null());
        assert!(state.program.is_null());
        assert!(state.textures.is_empty());
        assert!(!state.depth.write);
        assert_eq!(state.depth.func, CompareOp::LessEqual);
        assert_eq!(state.viewport, Viewport::sized(16, 16));

        delete_render_pass(&mut gfx, pass);
    }

    #[test]
    fn test_placeholder_fills_null_maps() {
        let mut gfx = HeadlessContext::new();
        let shadow = create_texture(&mut gfx, &TextureDesc::depth(16, 16), None).unwrap();
        let placeholder = create_placeholder_texture(&mut gfx).unwrap();
        let albedo = TextureHandle(500);
        let program = program(&mut gfx);
        let (pass, _) = create_render_pass(&mut gfx, "Lighting", [target(shadow)], program, 16, 16);

        let models = [model(6, TextureHandle::NULL), model(36, albedo)];
        let instances = InstanceData::models(&models).with_placeholder(placeholder);
        execute_render_pass(&mut gfx, &pass, &FrameUniforms::default(), &instances);

        let draws: Vec<_> = gfx.draws_in("Lighting").collect();
        let n = pass.subpasses()[0].descriptor().dependencies().len() as u32;
        let expected: Vec<_> = std::iter::once((0, shadow))
            .chain((n..n + MaterialTextures::COUNT as u32).map(|unit| (unit, placeholder)))
            .collect();
        assert_eq!(draws[0].textures, expected);
        assert_eq!(draws[1].textures[1], (n, albedo));
        assert!(draws[1].textures[2..].iter().all(|(_, t)| *t == placeholder));
        assert_eq!(draws[1].textures.len(), 1 + MaterialTextures::COUNT);
        assert!(gfx.state().textures.is_empty());

        delete_render_pass(&mut gfx, pass);
    }

    #[test]
    fn test_command_order() {
        let mut gfx = HeadlessContext::new();
        let shadow = create_texture(&mut gfx, &TextureDesc::depth(16, 16), None).unwrap();
        let program = program(&mut gfx);
        let (pass, _) = create_render_pass(&mut gfx, "Lighting", [target(shadow)], program, 16, 16);
        let fb = pass.subpasses()[0].framebuffer();

        execute_render_pass(&mut gfx, &pass, &FrameUniforms::default(), &InstanceData::models(&[model(3, TextureHandle::NULL)]));

        assert_eq!(
            gfx.commands(),
            [
                Command::PushDebugGroup("Lighting".into()),
                Command::Clear {
                    framebuffer: fb,
                    flags: ClearFlags {
                        color: true,
                        depth: false
                    }
                },
                Command::Draw(0),
                Command::PopDebugGroup,
            ]
        );
    }

    #[test]
    fn test_inactive_subpass_skipped() {
        let mut gfx = HeadlessContext::new();
        let shadow = create_texture(&mut gfx, &TextureDesc::depth(16, 16), None).unwrap();
        let program = program(&mut gfx);
        let (mut pass, _) = create_render_pass(
            &mut gfx,
            "Temporal",
            [target(shadow), target(shadow)],
            program,
            16,
            16,
        );
        pass.subpasses_mut()[1].active = false;

        execute_render_pass(&mut gfx, &pass, &FrameUniforms::default(), &InstanceData::models(&[model(3, TextureHandle::NULL)]));

        let draws: Vec<_> = gfx.draws_in("Temporal").collect();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].framebuffer, pass.subpasses()[0].framebuffer());
    }

    #[test]
    fn test_null_program_clears_without_drawing() {
        let mut gfx = HeadlessContext::new();
        let shadow = create_texture(&mut gfx, &TextureDesc::depth(16, 16), None).unwrap();
        let (pass, _) = create_render_pass(
            &mut gfx,
            "Velocity",
            [target(shadow)],
            ShaderProgram::null("velocity"),
            16,
            16,
        );

        execute_render_pass(&mut gfx, &pass, &FrameUniforms::default(), &InstanceData::models(&[model(3, TextureHandle::NULL)]));

        assert!(gfx.draw_calls().is_empty());
        assert!(gfx
            .commands()
            .iter()
            .any(|c| matches!(c, Command::Clear { .. })));
    }

    #[test]
    fn test_back_buffer_blit() {
        let mut gfx = HeadlessContext::new();
        let fb = FramebufferHandle(9);
        execute_back_buffer_blit(&mut gfx, fb, AttachmentPoint::COLOR0, 800, 600);

        assert_eq!(
            gfx.commands()[1],
            Command::Blit {
                source: fb,
                point: AttachmentPoint::COLOR0,
                width: 800,
                height: 600
            }
        );
        assert_eq!(gfx.state().viewport, Viewport::sized(800, 600));
    }
}
