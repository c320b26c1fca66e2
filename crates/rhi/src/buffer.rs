//! Vertex and index buffer creation.

use tracing::debug;

use crate::context::GraphicsContext;
use crate::error::{RhiError, RhiResult};
use crate::handle::BufferHandle;
use crate::vertex::Vertex;

/// What a buffer is bound as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Vertex buffer - stores vertex data
    Vertex,
    /// Index buffer - stores `u32` indices
    Index,
}

impl BufferKind {
    /// Returns a human-readable name for the buffer kind.
    pub fn name(self) -> &'static str {
        match self {
            BufferKind::Vertex => "vertex",
            BufferKind::Index => "index",
        }
    }
}

/// Create a buffer holding `data`.
///
/// # Errors
/// [`RhiError::ResourceCreation`] for empty data or an index buffer whose
/// length is not a whole number of `u32`s.
pub fn create_buffer<G: GraphicsContext + ?Sized>(
    gfx: &mut G,
    kind: BufferKind,
    data: &[u8],
) -> RhiResult<BufferHandle> {
    if data.is_empty() {
        return Err(RhiError::ResourceCreation(format!(
            "{} buffer has no data",
            kind.name()
        )));
    }
    if kind == BufferKind::Index && data.len() % std::mem::size_of::<u32>() != 0 {
        return Err(RhiError::ResourceCreation(format!(
            "index buffer of {} bytes is not u32 aligned",
            data.len()
        )));
    }

    let buffer = gfx.create_buffer(kind, data)?;
    debug!("Created {} buffer {} ({} bytes)", kind.name(), buffer, data.len());
    Ok(buffer)
}

/// Upload interleaved vertices.
pub fn create_vertex_buffer<G: GraphicsContext + ?Sized>(
    gfx: &mut G,
    vertices: &[Vertex],
) -> RhiResult<BufferHandle> {
    create_buffer(gfx, BufferKind::Vertex, bytemuck::cast_slice(vertices))
}

/// Upload triangle indices.
pub fn create_index_buffer<G: GraphicsContext + ?Sized>(
    gfx: &mut G,
    indices: &[u32],
) -> RhiResult<BufferHandle> {
    create_buffer(gfx, BufferKind::Index, bytemuck::cast_slice(indices))
}
