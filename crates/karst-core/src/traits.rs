//! The memory-source abstraction behind the region stack.

/// Produces and reclaims the memory blocks owned by regions.
///
/// The region stack never frees a block directly: every block obtained
/// through a source is handed back to the same source exactly once, when
/// the owning region closes. Implementations can therefore maintain an
/// exact ledger of outstanding blocks — the default heap source uses this
/// for byte budgeting, and the test sources use it for leak detection.
pub trait BlockSource {
    /// Obtain a zero-initialised block of `len` bytes.
    ///
    /// Returns `None` if the source cannot satisfy the request (e.g. a
    /// byte budget would be exceeded). A `None` here surfaces to callers
    /// as an out-of-memory error; it must leave the source unchanged.
    fn obtain(&mut self, len: usize) -> Option<Box<[u8]>>;

    /// Record that an externally produced block entered the ledger.
    ///
    /// Called when a caller transfers ownership of a block it obtained
    /// elsewhere into a region. The block will later be handed to
    /// [`BlockSource::retire`] like any other.
    fn adopt_external(&mut self, block: &[u8]);

    /// Reclaim a block at region close.
    ///
    /// Called exactly once per live block; the source regains ownership
    /// and may drop, pool, or account for it.
    fn retire(&mut self, block: Box<[u8]>);
}
