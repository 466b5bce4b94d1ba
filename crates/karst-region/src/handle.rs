//! Block handles.
//!
//! A [`BlockHandle`] names one block owned by one region. It is
//! generation-scoped: the `generation` field allows an O(log depth)
//! staleness check against the stack without any lookup table.

use std::fmt;

use karst_core::Generation;

/// Names a block owned by a region on the stack that issued the handle.
///
/// Handles are plain `Copy` values; holding one does not keep the block
/// alive. Once the owning region closes, every handle into it resolves
/// to [`RegionError::StaleHandle`](crate::RegionError::StaleHandle).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct BlockHandle {
    /// Generation of the owning region.
    pub(crate) generation: Generation,
    /// Index of the allocation record within the owning region.
    pub(crate) index: usize,
    /// Length of the block in bytes.
    pub(crate) len: usize,
}

impl BlockHandle {
    /// Create a new handle.
    pub(crate) fn new(generation: Generation, index: usize, len: usize) -> Self {
        Self {
            generation,
            index,
            len,
        }
    }

    /// The generation of the region that owns the block.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Length of the block in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this names a zero-length block.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BlockHandle(gen={}, index={}, len={})",
            self.generation, self.index, self.len
        )
    }
}
