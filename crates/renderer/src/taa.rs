//! Temporal anti-aliasing history ping-pong.

/// Which texture of the TAA pair the next resolve writes.
///
/// The other texture holds the previous resolve and is read as history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TaaState {
    #[default]
    AWrites,
    BWrites,
}

impl TaaState {
    /// State after one resolve.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::AWrites => Self::BWrites,
            Self::BWrites => Self::AWrites,
        }
    }

    /// Index of the written texture and of the active TAA subpass.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::AWrites => 0,
            Self::BWrites => 1,
        }
    }

    /// Index of the history texture.
    #[inline]
    pub const fn history_index(self) -> usize {
        1 - self.index()
    }
}
