//! Lumen - headless frame driver
//!
//! Builds the forward pipeline against the recording backend, renders a
//! small demo scene for a number of frames and reports what each pass drew.
//! Hot reloads and resizes can be scripted from the command line, which
//! makes the binary a quick smoke test for shader edits.
//!
//! # Usage
//! ```bash
//! lumen --frames 120 --reload-every 30 --resize-to 1920x1080
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use glam::{Mat4, Vec3};
use tracing::{error, info, warn};

use lumen_core::{Diagnostics, LumenConfig};
use lumen_renderer::{Brdf, MaterialTextures, PassId, RenderModel, Renderer};
use lumen_rhi::texture::TextureSource;
use lumen_rhi::HeadlessContext;
use lumen_scene::MeshData;

#[derive(Parser)]
#[command(version, about = "Headless frame driver for the lumen renderer")]
struct Args {
    /// TOML configuration file (defaults to ./lumen.toml when present)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Number of frames to render
    #[arg(long, short, default_value_t = 60)]
    frames: u32,

    /// Override the window width
    #[arg(long)]
    width: Option<u32>,

    /// Override the window height
    #[arg(long)]
    height: Option<u32>,

    /// Override the shader directory
    #[arg(long)]
    shader_dir: Option<PathBuf>,

    /// Hot reload every shader every N frames
    #[arg(long)]
    reload_every: Option<u32>,

    /// Resize to WIDTHxHEIGHT halfway through the run
    #[arg(long, value_parser = parse_size)]
    resize_to: Option<(u32, u32)>,
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (width, height) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let width = width.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let height = height.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok((width, height))
}

fn load_config(args: &Args) -> Result<LumenConfig> {
    let mut config = match &args.config {
        Some(path) => LumenConfig::load_from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => LumenConfig::load_or_default(),
    };
    config.merge_with_env();

    if let Some(width) = args.width {
        config.window.width = width;
    }
    if let Some(height) = args.height {
        config.window.height = height;
    }
    if let Some(dir) = &args.shader_dir {
        config.shaders.directory = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

/// A ground plane with a row of cubes standing on it.
/// Two-tone RGBA checkerboard, `cells`×`cells` texels.
fn checker(cells: u32) -> TextureSource {
    let pixels: Vec<u8> = (0..cells * cells)
        .flat_map(|i| {
            let lit = (i % cells + i / cells) % 2 == 0;
            if lit {
                [230u8, 230, 230, 255]
            } else {
                [60u8, 60, 60, 255]
            }
        })
        .collect();
    TextureSource {
        width: cells,
        height: cells,
        channels: 4,
        pixels: Arc::from(pixels),
    }
}

fn populate_scene(gfx: &mut HeadlessContext, renderer: &mut Renderer) -> Result<()> {
    let ground = RenderModel::upload(gfx, &MeshData::plane(2000.0), Mat4::IDENTITY)?
        .with_color(Vec3::splat(0.8))
        .with_brdf(Brdf::Lambert);
    renderer.add_model(ground);

    let checker = checker(8);
    let colors = [Vec3::new(0.9, 0.2, 0.2), Vec3::new(0.2, 0.9, 0.2), Vec3::new(0.2, 0.2, 0.9)];
    for (i, color) in colors.into_iter().enumerate() {
        let albedo = renderer.load_texture(gfx, &checker)?;
        let x = (i as f32 - 1.0) * 250.0;
        let transform = Mat4::from_translation(Vec3::new(x, 50.0, 0.0));
        let cube = RenderModel::upload(gfx, &MeshData::cube(100.0), transform)?
            .with_color(color)
            .with_brdf(Brdf::CookTorrance)
            .with_textures(MaterialTextures {
                albedo,
                ..MaterialTextures::default()
            });
        renderer.add_model(cube);
    }

    renderer.frame_context_mut().camera.look_at(Vec3::new(0.0, 50.0, 0.0));
    Ok(())
}

fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        warn!("{}", diagnostic);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    info!(
        "Starting lumen ({}x{}, shaders in {})",
        config.window.width,
        config.window.height,
        config.shaders.directory.display()
    );

    let mut gfx = HeadlessContext::new();
    let (mut renderer, diagnostics) = Renderer::new(&mut gfx, &config)?;
    report(&diagnostics);
    populate_scene(&mut gfx, &mut renderer)?;

    let resize_frame = args.frames / 2;
    for frame in 0..args.frames {
        if let Some(every) = args.reload_every.filter(|n| *n > 0) {
            if frame > 0 && frame % every == 0 {
                renderer.request_hot_reload();
            }
        }
        if frame == resize_frame {
            if let Some((width, height)) = args.resize_to {
                renderer.resize(width, height);
            }
        }

        match renderer.render_frame(&mut gfx) {
            Ok(diagnostics) => report(&diagnostics),
            Err(e) => error!("Frame {} skipped: {}", frame, e),
        }
    }

    for pass in PassId::ALL {
        info!("{:<16} {} draws", pass.name(), gfx.draws_in(pass.name()).count());
    }
    let timer = renderer.timer();
    info!(
        "{} frames, average {:?}, slowest {:?}",
        timer.frames(),
        timer.average_frame(),
        timer.slowest_frame()
    );

    renderer.shutdown(&mut gfx);
    let leaked = gfx.resource_counts();
    if leaked.total() != 0 {
        bail!("graphics objects leaked at shutdown: {:?}", leaked);
    }
    Ok(())
}

fn main() -> ExitCode {
    lumen_core::init_logging();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
