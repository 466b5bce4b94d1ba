//! Region stack orchestrator.
//!
//! [`RegionStack`] is the top-level allocator type. It maintains the
//! ordered, depth-bounded stack of open regions, routes every allocation
//! to the active (topmost) region, and triggers bulk release when a
//! region is popped.
//!
//! The lifecycle per scope is:
//! 1. `open_region()` — push a new, empty region; it becomes active
//! 2. `alloc()` / `duplicate()` / `adopt()` — register blocks into it
//! 3. optionally open further nested regions, recursively
//! 4. `close_region()` — pop the top region, retiring all its blocks
//!
//! Closes are strictly last-opened-first-closed; there is no way to
//! close a non-top region.

use smallvec::SmallVec;

use karst_core::{BlockSource, Generation};

use crate::config::{MisusePolicy, StackConfig};
use crate::error::RegionError;
use crate::handle::BlockHandle;
use crate::region::Region;
use crate::source::HeapSource;

/// Depth-bounded stack of nested regions.
///
/// All allocation goes through the active region at the top of the
/// stack. Blocks come from the memory source `S` and return to it,
/// exactly once each, when their owning region closes.
///
/// Errors are raised before any mutation: a failed operation leaves the
/// stack exactly as it was, usable for subsequent valid operations.
pub struct RegionStack<S: BlockSource = HeapSource> {
    /// Open regions, bottom to top. Inline storage covers typical
    /// nesting depths; deeper stacks spill to the heap.
    regions: SmallVec<[Region; 8]>,
    /// Next generation to assign. Starts at 1 and never repeats.
    next_generation: u64,
    /// Memory source that produces and reclaims all blocks.
    source: S,
    /// Stack configuration.
    config: StackConfig,
}

impl RegionStack<HeapSource> {
    /// Create a stack backed by the default heap source.
    ///
    /// The source honours `config.max_total_bytes` when set.
    pub fn new(config: StackConfig) -> Self {
        let source = match config.max_total_bytes {
            Some(bytes) => HeapSource::with_budget(bytes),
            None => HeapSource::unbounded(),
        };
        Self::with_source(config, source)
    }
}

impl<S: BlockSource> RegionStack<S> {
    /// Create a stack backed by a caller-provided source.
    ///
    /// `config.max_total_bytes` is ignored here — budgeting is the
    /// provided source's concern.
    pub fn with_source(config: StackConfig, source: S) -> Self {
        Self {
            regions: SmallVec::new(),
            next_generation: 1,
            source,
            config,
        }
    }

    /// Open a new region; it becomes the active region.
    ///
    /// Returns the generation assigned to the region. Fails with
    /// [`RegionError::CapacityExceeded`] at the configured maximum
    /// nesting depth, without mutating the stack.
    pub fn open_region(&mut self) -> Result<Generation, RegionError> {
        if self.regions.len() >= self.config.max_depth as usize {
            return Err(self.misuse(RegionError::CapacityExceeded {
                depth: self.regions.len(),
                max_depth: self.config.max_depth,
            }));
        }
        let generation = Generation(self.next_generation);
        self.next_generation += 1;
        self.regions.push(Region::new(generation));
        Ok(generation)
    }

    /// Close the active region, retiring every block it owns.
    ///
    /// The previous region (if any) becomes active again. Fails with
    /// [`RegionError::NoOpenRegion`] at depth 0, without mutating the
    /// stack.
    pub fn close_region(&mut self) -> Result<(), RegionError> {
        match self.regions.pop() {
            Some(mut region) => {
                region.release_all(&mut self.source);
                Ok(())
            }
            None => Err(self.misuse(RegionError::NoOpenRegion)),
        }
    }

    /// Transfer ownership of an externally produced block into the
    /// active region.
    ///
    /// From this point the region is the block's sole owner; it is
    /// retired through the source like any block obtained via
    /// [`RegionStack::alloc`]. Fails with [`RegionError::NoOpenRegion`]
    /// if no region is open.
    pub fn adopt(&mut self, block: Box<[u8]>) -> Result<BlockHandle, RegionError> {
        if self.regions.is_empty() {
            return Err(self.misuse(RegionError::NoOpenRegion));
        }
        self.source.adopt_external(&block);
        let region = self.regions.last_mut().ok_or(RegionError::NoOpenRegion)?;
        Ok(region.adopt(block))
    }

    /// Allocate a zero-initialised block of `len` bytes owned by the
    /// active region.
    ///
    /// Fails with [`RegionError::NoOpenRegion`] if no region is open,
    /// or [`RegionError::OutOfMemory`] if the source declines the
    /// request. A failed allocation registers nothing.
    pub fn alloc(&mut self, len: usize) -> Result<BlockHandle, RegionError> {
        if self.regions.is_empty() {
            return Err(self.misuse(RegionError::NoOpenRegion));
        }
        let block = self
            .source
            .obtain(len)
            .ok_or(RegionError::OutOfMemory { requested: len })?;
        let region = self.regions.last_mut().ok_or(RegionError::NoOpenRegion)?;
        Ok(region.adopt(block))
    }

    /// Allocate an owned copy of `source_bytes` in the active region.
    ///
    /// The copy is a fresh, independently owned block; mutating it never
    /// affects the original, and vice versa. To duplicate a prefix, pass
    /// `&source_bytes[..n]`.
    pub fn duplicate(&mut self, source_bytes: &[u8]) -> Result<BlockHandle, RegionError> {
        let handle = self.alloc(source_bytes.len())?;
        let block = self.bytes_mut(handle)?;
        block.copy_from_slice(source_bytes);
        Ok(handle)
    }

    /// Resolve a handle to a shared view of its block.
    ///
    /// Fails with [`RegionError::StaleHandle`] once the owning region
    /// has closed. Blocks of any still-open region may be read, not
    /// just the active one.
    pub fn bytes(&self, handle: BlockHandle) -> Result<&[u8], RegionError> {
        let region = self.region_of(handle.generation)?;
        region.block(handle.index).ok_or(RegionError::StaleHandle {
            handle_generation: handle.generation,
        })
    }

    /// Resolve a handle to a mutable view of its block.
    ///
    /// Same staleness rules as [`RegionStack::bytes`].
    pub fn bytes_mut(&mut self, handle: BlockHandle) -> Result<&mut [u8], RegionError> {
        let index = self.region_index_of(handle.generation)?;
        self.regions[index]
            .block_mut(handle.index)
            .ok_or(RegionError::StaleHandle {
                handle_generation: handle.generation,
            })
    }

    /// Number of currently open regions.
    pub fn depth(&self) -> usize {
        self.regions.len()
    }

    /// Total blocks registered across all open regions.
    pub fn block_count(&self) -> usize {
        self.regions.iter().map(|r| r.block_count()).sum()
    }

    /// Total bytes owned across all open regions.
    pub fn memory_bytes(&self) -> usize {
        self.regions.iter().map(|r| r.memory_bytes()).sum()
    }

    /// The memory source, for inspection.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The stack configuration.
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Find the open region with the given generation.
    ///
    /// Generations increase strictly from bottom to top of the stack,
    /// so a binary search suffices.
    fn region_index_of(&self, generation: Generation) -> Result<usize, RegionError> {
        self.regions
            .binary_search_by_key(&generation, |r| r.generation())
            .map_err(|_| RegionError::StaleHandle {
                handle_generation: generation,
            })
    }

    fn region_of(&self, generation: Generation) -> Result<&Region, RegionError> {
        self.region_index_of(generation).map(|i| &self.regions[i])
    }

    /// Apply the configured misuse policy to a programmer-error
    /// condition. `Propagate` hands the error back; `Panic` fails fast
    /// with the diagnostic.
    fn misuse(&self, err: RegionError) -> RegionError {
        match self.config.on_misuse {
            MisusePolicy::Propagate => err,
            MisusePolicy::Panic => panic!("{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> RegionStack {
        RegionStack::new(StackConfig::default())
    }

    #[test]
    fn open_alloc_close_releases_everything() {
        let mut stack = stack();
        stack.open_region().unwrap();
        let p1 = stack.alloc(16).unwrap();
        let p2 = stack.alloc(32).unwrap();
        assert_eq!(stack.block_count(), 2);
        assert_eq!(stack.memory_bytes(), 48);
        assert_eq!(stack.source().outstanding_bytes(), 48);

        stack.close_region().unwrap();
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.source().outstanding_bytes(), 0);
        // Both handles are stale after the close.
        assert!(matches!(
            stack.bytes(p1),
            Err(RegionError::StaleHandle { .. })
        ));
        assert!(matches!(
            stack.bytes(p2),
            Err(RegionError::StaleHandle { .. })
        ));
    }

    #[test]
    fn nested_regions_close_innermost_first() {
        let mut stack = stack();
        stack.open_region().unwrap();
        stack.open_region().unwrap();
        let p = stack.alloc(8).unwrap();
        assert_eq!(stack.depth(), 2);

        stack.close_region().unwrap();
        // Inner close released p; the outer region is untouched.
        assert!(matches!(
            stack.bytes(p),
            Err(RegionError::StaleHandle { .. })
        ));
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.source().outstanding_bytes(), 0);

        stack.close_region().unwrap();
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn close_with_no_open_region_is_an_error() {
        let mut stack = stack();
        assert_eq!(stack.close_region(), Err(RegionError::NoOpenRegion));
        // The stack stays usable after the failed close.
        stack.open_region().unwrap();
        stack.alloc(4).unwrap();
        stack.close_region().unwrap();
    }

    #[test]
    fn alloc_with_no_open_region_is_an_error() {
        let mut stack = stack();
        assert_eq!(stack.alloc(8), Err(RegionError::NoOpenRegion));
        assert_eq!(
            stack.adopt(vec![0u8; 8].into_boxed_slice()),
            Err(RegionError::NoOpenRegion)
        );
    }

    #[test]
    fn open_past_max_depth_is_an_error_and_mutates_nothing() {
        let mut stack = RegionStack::new(StackConfig::new().with_max_depth(3));
        for _ in 0..3 {
            stack.open_region().unwrap();
        }
        let err = stack.open_region().unwrap_err();
        assert_eq!(
            err,
            RegionError::CapacityExceeded {
                depth: 3,
                max_depth: 3,
            }
        );
        assert_eq!(stack.depth(), 3);
        // Popping one slot makes room again.
        stack.close_region().unwrap();
        stack.open_region().unwrap();
    }

    #[test]
    fn duplicate_copies_bytes_to_a_distinct_block() {
        let mut stack = stack();
        stack.open_region().unwrap();
        let original = stack.duplicate(b"hello").unwrap();
        let src = stack.bytes(original).unwrap().to_vec();
        let copy = stack.duplicate(&src).unwrap();
        assert_ne!(original, copy);
        assert_eq!(stack.bytes(copy).unwrap(), b"hello");
        assert_ne!(
            stack.bytes(original).unwrap().as_ptr(),
            stack.bytes(copy).unwrap().as_ptr(),
        );

        // Writing the copy never changes the original.
        stack.bytes_mut(copy).unwrap()[0] = b'H';
        assert_eq!(stack.bytes(original).unwrap(), b"hello");
        assert_eq!(stack.bytes(copy).unwrap(), b"Hello");
    }

    #[test]
    fn duplicate_of_prefix_copies_exactly_n_bytes() {
        let mut stack = stack();
        stack.open_region().unwrap();
        let src = b"hello world";
        let h = stack.duplicate(&src[..5]).unwrap();
        assert_eq!(stack.bytes(h).unwrap(), b"hello");
        assert_eq!(h.len(), 5);
    }

    #[test]
    fn adopt_transfers_ownership_into_the_active_region() {
        let mut stack = stack();
        stack.open_region().unwrap();
        let external = vec![9u8; 24].into_boxed_slice();
        let h = stack.adopt(external).unwrap();
        assert_eq!(stack.bytes(h).unwrap(), &[9u8; 24][..]);
        assert_eq!(stack.source().outstanding_bytes(), 24);
        stack.close_region().unwrap();
        assert_eq!(stack.source().outstanding_bytes(), 0);
    }

    #[test]
    fn handles_of_outer_regions_survive_inner_cycles() {
        let mut stack = stack();
        stack.open_region().unwrap();
        let outer = stack.duplicate(b"keep").unwrap();

        stack.open_region().unwrap();
        let inner = stack.alloc(8).unwrap();
        stack.close_region().unwrap();

        assert!(matches!(
            stack.bytes(inner),
            Err(RegionError::StaleHandle { .. })
        ));
        assert_eq!(stack.bytes(outer).unwrap(), b"keep");

        // Writing through an outer handle while no inner region is open.
        stack.bytes_mut(outer).unwrap()[0] = b'K';
        assert_eq!(stack.bytes(outer).unwrap(), b"Keep");
        stack.close_region().unwrap();
    }

    #[test]
    fn zero_length_alloc_is_valid() {
        let mut stack = stack();
        stack.open_region().unwrap();
        let h = stack.alloc(0).unwrap();
        assert!(h.is_empty());
        assert_eq!(stack.bytes(h).unwrap(), &[] as &[u8]);
        stack.close_region().unwrap();
    }

    #[test]
    fn byte_budget_surfaces_out_of_memory() {
        let mut stack = RegionStack::new(StackConfig::new().with_max_total_bytes(64));
        stack.open_region().unwrap();
        stack.alloc(48).unwrap();
        let err = stack.alloc(32).unwrap_err();
        assert_eq!(err, RegionError::OutOfMemory { requested: 32 });
        // The failed request registered nothing.
        assert_eq!(stack.block_count(), 1);
        // Closing frees the budget for the next region.
        stack.close_region().unwrap();
        stack.open_region().unwrap();
        stack.alloc(64).unwrap();
        stack.close_region().unwrap();
    }

    #[test]
    fn alloc_is_registered_in_the_active_region_only() {
        let mut stack = stack();
        stack.open_region().unwrap();
        stack.alloc(4).unwrap();
        stack.open_region().unwrap();
        stack.alloc(4).unwrap();
        stack.alloc(4).unwrap();
        // 1 block in the outer region, 2 in the inner.
        assert_eq!(stack.block_count(), 3);
        stack.close_region().unwrap();
        assert_eq!(stack.block_count(), 1);
        stack.close_region().unwrap();
    }

    #[test]
    fn generations_are_never_reused() {
        let mut stack = stack();
        let g1 = stack.open_region().unwrap();
        stack.close_region().unwrap();
        let g2 = stack.open_region().unwrap();
        assert!(g2 > g1);
        stack.close_region().unwrap();
    }

    #[test]
    #[should_panic(expected = "no open region")]
    fn panic_policy_fails_fast_on_underflow() {
        let mut stack =
            RegionStack::new(StackConfig::new().with_misuse_policy(MisusePolicy::Panic));
        let _ = stack.close_region();
    }

    #[test]
    #[should_panic(expected = "capacity exceeded")]
    fn panic_policy_fails_fast_on_overflow() {
        let mut stack = RegionStack::new(
            StackConfig::new()
                .with_max_depth(1)
                .with_misuse_policy(MisusePolicy::Panic),
        );
        stack.open_region().unwrap();
        let _ = stack.open_region();
    }

    #[test]
    fn out_of_memory_propagates_even_under_panic_policy() {
        let mut stack = RegionStack::new(
            StackConfig::new()
                .with_max_total_bytes(8)
                .with_misuse_policy(MisusePolicy::Panic),
        );
        stack.open_region().unwrap();
        assert_eq!(
            stack.alloc(16),
            Err(RegionError::OutOfMemory { requested: 16 })
        );
        stack.close_region().unwrap();
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        /// One step of a region-stack workload.
        #[derive(Clone, Debug)]
        enum Op {
            Open,
            Close,
            Alloc(usize),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                2 => Just(Op::Open),
                2 => Just(Op::Close),
                3 => (0usize..256).prop_map(Op::Alloc),
            ]
        }

        proptest! {
            #[test]
            fn depth_tracks_successful_opens_and_closes(
                ops in proptest::collection::vec(op_strategy(), 0..64),
            ) {
                let mut stack = RegionStack::new(
                    StackConfig::new().with_max_depth(8),
                );
                let mut model_depth = 0usize;
                for op in &ops {
                    match op {
                        Op::Open => {
                            if stack.open_region().is_ok() {
                                model_depth += 1;
                            }
                        }
                        Op::Close => {
                            if stack.close_region().is_ok() {
                                model_depth -= 1;
                            }
                        }
                        Op::Alloc(len) => {
                            let result = stack.alloc(*len);
                            prop_assert_eq!(result.is_ok(), model_depth > 0);
                        }
                    }
                    prop_assert_eq!(stack.depth(), model_depth);
                    prop_assert!(model_depth <= 8);
                }
            }

            #[test]
            fn balanced_sequences_restore_depth_and_leak_nothing(
                block_lens in proptest::collection::vec(
                    proptest::collection::vec(0usize..128, 0..8),
                    1..8,
                ),
            ) {
                // Open one region per inner vec, allocating its blocks,
                // then close them all in reverse.
                let mut stack = RegionStack::new(StackConfig::default());
                for lens in &block_lens {
                    stack.open_region().unwrap();
                    for &len in lens {
                        stack.alloc(len).unwrap();
                    }
                }
                for _ in &block_lens {
                    stack.close_region().unwrap();
                }
                prop_assert_eq!(stack.depth(), 0);
                prop_assert_eq!(stack.block_count(), 0);
                prop_assert_eq!(stack.source().outstanding_bytes(), 0);
            }

            #[test]
            fn duplicate_always_matches_source_bytes(
                data in proptest::collection::vec(any::<u8>(), 0..512),
            ) {
                let mut stack = RegionStack::new(StackConfig::default());
                stack.open_region().unwrap();
                let h = stack.duplicate(&data).unwrap();
                prop_assert_eq!(stack.bytes(h).unwrap(), &data[..]);
                stack.close_region().unwrap();
            }
        }
    }
}
