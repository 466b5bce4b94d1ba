//! One open region and its allocation registry.
//!
//! A [`Region`] owns every block registered while it was the active
//! (topmost) region. The registry is an append-only `Vec<Box<[u8]>>`:
//! records are never removed individually, only enumerated once in bulk
//! when the region closes.

use karst_core::{BlockSource, Generation};

use crate::handle::BlockHandle;

/// One nested scope and the blocks it owns.
///
/// A region exists only while it occupies a slot on the
/// [`RegionStack`](crate::RegionStack). Popping it retires every owned
/// block through the stack's source exactly once, then discards the
/// registry itself.
pub struct Region {
    /// Generation assigned at open; never reused by the issuing stack.
    generation: Generation,
    /// Append-only allocation records.
    blocks: Vec<Box<[u8]>>,
}

impl Region {
    /// Create a new, empty region.
    pub(crate) fn new(generation: Generation) -> Self {
        Self {
            generation,
            blocks: Vec::new(),
        }
    }

    /// Take ownership of `block` and append a record for it.
    ///
    /// Returns a handle naming the new record. O(1).
    pub(crate) fn adopt(&mut self, block: Box<[u8]>) -> BlockHandle {
        let handle = BlockHandle::new(self.generation, self.blocks.len(), block.len());
        self.blocks.push(block);
        handle
    }

    /// Shared view of the block at `index`, or `None` if out of range.
    pub(crate) fn block(&self, index: usize) -> Option<&[u8]> {
        self.blocks.get(index).map(|b| &b[..])
    }

    /// Mutable view of the block at `index`, or `None` if out of range.
    pub(crate) fn block_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        self.blocks.get_mut(index).map(|b| &mut b[..])
    }

    /// Retire every owned block through `source`, newest first.
    ///
    /// Each record is visited exactly once; afterwards the registry is
    /// empty. The stack guarantees this runs once per region, at its pop.
    pub(crate) fn release_all<S: BlockSource>(&mut self, source: &mut S) {
        for block in self.blocks.drain(..).rev() {
            source.retire(block);
        }
    }

    /// The generation assigned when this region was opened.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Number of blocks currently registered.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total bytes owned by this region.
    pub fn memory_bytes(&self) -> usize {
        self.blocks.iter().map(|b| b.len()).sum()
    }
}
