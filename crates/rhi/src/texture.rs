//! Texture descriptors and creation helpers.
//!
//! This module is the texture half of the resource factory: it turns plain
//! descriptors into backend textures and knows nothing about passes.
//!
//! # Overview
//!
//! - [`TextureDesc`] describes size, format and sampling of a texture
//! - [`TextureSource`] is decoded pixel data handed over by a loader
//! - [`TextureCache`] deduplicates GPU textures created from shared pixel buffers

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::context::GraphicsContext;
use crate::error::{RhiError, RhiResult};
use crate::handle::TextureHandle;

/// Texel format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8,
    Rgb8,
    Rgba8,
    Rgba32F,
    Depth32F,
}

impl TextureFormat {
    /// Bytes per texel.
    pub const fn texel_size(self) -> usize {
        match self {
            Self::R8 => 1,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
            Self::Rgba32F => 16,
            Self::Depth32F => 4,
        }
    }

    #[inline]
    pub const fn is_depth(self) -> bool {
        matches!(self, Self::Depth32F)
    }

    /// Format of an 8-bit image with `channels` channels.
    pub fn from_channels(channels: u32) -> RhiResult<Self> {
        match channels {
            1 => Ok(Self::R8),
            3 => Ok(Self::Rgb8),
            4 => Ok(Self::Rgba8),
            n => Err(RhiError::UnsupportedFormat(format!(
                "{n} channel images are not supported"
            ))),
        }
    }
}

/// Texture coordinate wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

/// Minification / magnification filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
    /// Trilinear filtering across the mip chain.
    LinearMipmapLinear,
}

/// Everything needed to allocate a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub wrap: WrapMode,
    pub filter: FilterMode,
    pub mipmapped: bool,
}

impl TextureDesc {
    /// Repeat-wrapped, nearest-filtered texture.
    pub const fn point_sampled(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
            wrap: WrapMode::Repeat,
            filter: FilterMode::Nearest,
            mipmapped: false,
        }
    }

    /// 32-bit float depth target.
    pub const fn depth(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: TextureFormat::Depth32F,
            wrap: WrapMode::ClampToEdge,
            filter: FilterMode::Nearest,
            mipmapped: false,
        }
    }

    /// 32-bit float RGBA color target.
    pub const fn color_attachment(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: TextureFormat::Rgba32F,
            wrap: WrapMode::ClampToEdge,
            filter: FilterMode::Nearest,
            mipmapped: false,
        }
    }

    /// Material texture with a full mip chain.
    pub const fn mipmapped(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
            wrap: WrapMode::Repeat,
            filter: FilterMode::LinearMipmapLinear,
            mipmapped: true,
        }
    }

    /// Size in bytes of the base level.
    pub const fn byte_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.texel_size()
    }

    /// Same descriptor at a different size.
    pub const fn resized(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Decoded 8-bit image data.
///
/// The pixel buffer is shared; its address identifies the image in
/// [`TextureCache`].
#[derive(Clone, Debug)]
pub struct TextureSource {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub pixels: Arc<[u8]>,
}

impl TextureSource {
    fn cache_key(&self) -> usize {
        Arc::as_ptr(&self.pixels) as *const u8 as usize
    }
}

/// Create a texture, validating the pixel payload size.
///
/// # Errors
/// [`RhiError::ResourceCreation`] for zero-sized textures or a pixel slice
/// whose length does not match the descriptor.
pub fn create_texture<G: GraphicsContext + ?Sized>(
    gfx: &mut G,
    desc: &TextureDesc,
    pixels: Option<&[u8]>,
) -> RhiResult<TextureHandle> {
    if desc.width == 0 || desc.height == 0 {
        return Err(RhiError::ResourceCreation(format!(
            "texture size {}x{} is empty",
            desc.width, desc.height
        )));
    }
    if let Some(pixels) = pixels {
        if pixels.len() != desc.byte_size() {
            return Err(RhiError::ResourceCreation(format!(
                "expected {} bytes of pixel data, got {}",
                desc.byte_size(),
                pixels.len()
            )));
        }
    }

    let texture = gfx.create_texture(desc, pixels)?;
    if desc.mipmapped {
        gfx.generate_mipmaps(texture)?;
    }
    debug!(
        "Created {:?} texture {} ({}x{})",
        desc.format, texture, desc.width, desc.height
    );
    Ok(texture)
}

/// 1×1 opaque black texture bound in place of missing material maps.
pub fn create_placeholder_texture<G: GraphicsContext + ?Sized>(
    gfx: &mut G,
) -> RhiResult<TextureHandle> {
    create_texture(
        gfx,
        &TextureDesc::point_sampled(1, 1, TextureFormat::Rgba8),
        Some(&[0u8, 0, 0, 255][..]),
    )
}

/// GPU textures keyed by the address of their decoded pixel buffer.
///
/// Materials that share an image share one texture. The cache holds a
/// reference to each source so an address cannot be reused while cached.
#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<usize, (Arc<[u8]>, TextureHandle)>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the texture for `source`, creating a mipmapped one on first use.
    pub fn get_or_create<G: GraphicsContext + ?Sized>(
        &mut self,
        gfx: &mut G,
        source: &TextureSource,
    ) -> RhiResult<TextureHandle> {
        let key = source.cache_key();
        if let Some((_, texture)) = self.entries.get(&key) {
            return Ok(*texture);
        }

        let format = TextureFormat::from_channels(source.channels)?;
        let desc = TextureDesc::mipmapped(source.width, source.height, format);
        let texture = create_texture(gfx, &desc, Some(&source.pixels[..]))?;
        self.entries
            .insert(key, (Arc::clone(&source.pixels), texture));
        Ok(texture)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delete every cached texture.
    pub fn release<G: GraphicsContext + ?Sized>(&mut self, gfx: &mut G) {
        for (_, (_, texture)) in self.entries.drain() {
            gfx.delete_texture(texture);
        }
    }
}
