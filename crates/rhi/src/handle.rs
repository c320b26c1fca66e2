//! Typed GPU object names.
//!
//! Every backend object is identified by a `u32` name where `0` means
//! "none", mirroring how GL-style APIs hand out object ids. The newtypes
//! keep a framebuffer from being passed where a texture is expected while
//! staying `Pod`, so handles can live inside byte-addressable model records.

use std::fmt;

use bytemuck::{Pod, Zeroable};

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
        pub struct $name(pub u32);

        impl $name {
            /// The "no object" handle.
            pub const NULL: Self = Self(0);

            #[inline]
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

define_handle!(
    /// Texture object.
    TextureHandle
);
define_handle!(
    /// Framebuffer object. [`FramebufferHandle::NULL`] is the back buffer.
    FramebufferHandle
);
define_handle!(
    /// Linked shader program.
    ProgramHandle
);
define_handle!(
    /// Single compiled shader stage.
    ShaderHandle
);
define_handle!(
    /// Vertex or index buffer.
    BufferHandle
);
define_handle!(
    /// Vertex array object binding a vertex layout to its buffers.
    VertexArrayHandle
);

/// Location of a uniform inside a linked program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

impl UniformLocation {
    /// Returned when a program has no active uniform with the queried name.
    pub const UNBOUND: Self = Self(-1);

    #[inline]
    pub const fn is_bound(self) -> bool {
        self.0 >= 0
    }
}

impl Default for UniformLocation {
    fn default() -> Self {
        Self::UNBOUND
    }
}
