//! Default heap-backed memory source.

use karst_core::BlockSource;

/// Memory source backed by the global heap, with an optional byte budget.
///
/// Blocks are zero-initialised `Box<[u8]>` allocations. The source keeps
/// an exact count of outstanding bytes (obtained plus adopted, minus
/// retired); when a budget is set, requests that would push the count
/// past it are declined, which the stack surfaces as
/// [`RegionError::OutOfMemory`](crate::RegionError::OutOfMemory).
pub struct HeapSource {
    /// Maximum outstanding bytes, or `None` for unlimited.
    budget: Option<usize>,
    /// Bytes currently owned by open regions.
    outstanding: usize,
}

impl HeapSource {
    /// Create a source with no byte budget.
    pub fn unbounded() -> Self {
        Self {
            budget: None,
            outstanding: 0,
        }
    }

    /// Create a source that declines requests past `max_total_bytes`.
    pub fn with_budget(max_total_bytes: usize) -> Self {
        Self {
            budget: Some(max_total_bytes),
            outstanding: 0,
        }
    }

    /// Bytes currently outstanding across all open regions.
    pub fn outstanding_bytes(&self) -> usize {
        self.outstanding
    }

    /// The configured byte budget, if any.
    pub fn budget(&self) -> Option<usize> {
        self.budget
    }
}

impl Default for HeapSource {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl BlockSource for HeapSource {
    fn obtain(&mut self, len: usize) -> Option<Box<[u8]>> {
        let new_outstanding = self.outstanding.checked_add(len)?;
        if let Some(budget) = self.budget {
            if new_outstanding > budget {
                return None;
            }
        }
        self.outstanding = new_outstanding;
        Some(vec![0u8; len].into_boxed_slice())
    }

    fn adopt_external(&mut self, block: &[u8]) {
        // Adopted blocks count against the budget from this point on;
        // the allocation itself already happened elsewhere.
        self.outstanding = self.outstanding.saturating_add(block.len());
    }

    fn retire(&mut self, block: Box<[u8]>) {
        // Every retired block previously passed through obtain or
        // adopt_external, so the ledger cannot go negative.
        self.outstanding -= block.len();
    }
}
