//! Instrumented memory sources for Karst development.
//!
//! Provides [`CountingSource`] — a leak-detecting [`BlockSource`] that
//! keeps an exact ledger of live blocks — and [`FailingSource`], which
//! exhausts after a fixed number of requests to drive out-of-memory
//! paths deterministically.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use indexmap::IndexMap;

use karst_core::BlockSource;

/// Leak-detecting memory source.
///
/// Tracks every block by address: `obtain` and `adopt_external` insert
/// into a live ledger, `retire` removes. After a balanced workload the
/// ledger must be empty ([`live_count`](CountingSource::live_count) of
/// zero) and [`double_retires`](CountingSource::double_retires) must be
/// zero — together these verify "every block released exactly once".
pub struct CountingSource {
    /// Live blocks: address → length. Insertion-ordered so leak reports
    /// are deterministic. Zero-length blocks all share the dangling
    /// address, so they are counted in `live_empty` instead.
    live: IndexMap<usize, usize>,
    live_empty: usize,
    obtained: usize,
    adopted: usize,
    retired: usize,
    /// Retires of blocks not in the ledger. Always a bug in the caller.
    double_retires: usize,
}

impl CountingSource {
    pub fn new() -> Self {
        Self {
            live: IndexMap::new(),
            live_empty: 0,
            obtained: 0,
            adopted: 0,
            retired: 0,
            double_retires: 0,
        }
    }

    /// Blocks handed out via `obtain`.
    pub fn obtained(&self) -> usize {
        self.obtained
    }

    /// Blocks adopted from external producers.
    pub fn adopted(&self) -> usize {
        self.adopted
    }

    /// Blocks returned via `retire`.
    pub fn retired(&self) -> usize {
        self.retired
    }

    /// Blocks currently outstanding. Zero after a balanced workload.
    pub fn live_count(&self) -> usize {
        self.live.len() + self.live_empty
    }

    /// Bytes currently outstanding.
    pub fn live_bytes(&self) -> usize {
        self.live.values().sum()
    }

    /// Retires that did not match a live block. Must stay zero.
    pub fn double_retires(&self) -> usize {
        self.double_retires
    }
}

impl Default for CountingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockSource for CountingSource {
    fn obtain(&mut self, len: usize) -> Option<Box<[u8]>> {
        let block = vec![0u8; len].into_boxed_slice();
        if len == 0 {
            self.live_empty += 1;
        } else {
            self.live.insert(block.as_ptr() as usize, len);
        }
        self.obtained += 1;
        Some(block)
    }

    fn adopt_external(&mut self, block: &[u8]) {
        if block.is_empty() {
            self.live_empty += 1;
        } else {
            self.live.insert(block.as_ptr() as usize, block.len());
        }
        self.adopted += 1;
    }

    fn retire(&mut self, block: Box<[u8]>) {
        if block.is_empty() {
            if self.live_empty > 0 {
                self.live_empty -= 1;
                self.retired += 1;
            } else {
                self.double_retires += 1;
            }
            return;
        }
        match self.live.swap_remove(&(block.as_ptr() as usize)) {
            Some(_) => self.retired += 1,
            None => self.double_retires += 1,
        }
    }
}

/// Memory source that declines requests after a fixed count.
///
/// The first `succeed_for` calls to `obtain` return zeroed blocks; every
/// later call returns `None`. Useful for driving the out-of-memory path
/// at a precise point in a workload.
pub struct FailingSource {
    succeed_for: usize,
    requests: usize,
}

impl FailingSource {
    /// Succeed for the first `succeed_for` obtain calls, then decline.
    pub fn after(succeed_for: usize) -> Self {
        Self {
            succeed_for,
            requests: 0,
        }
    }

    /// Total obtain calls seen, successful or not.
    pub fn requests(&self) -> usize {
        self.requests
    }
}

impl BlockSource for FailingSource {
    fn obtain(&mut self, len: usize) -> Option<Box<[u8]>> {
        self.requests += 1;
        if self.requests > self.succeed_for {
            return None;
        }
        Some(vec![0u8; len].into_boxed_slice())
    }

    fn adopt_external(&mut self, _block: &[u8]) {}

    fn retire(&mut self, _block: Box<[u8]>) {}
}
