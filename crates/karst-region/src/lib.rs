//! Nested region stack with bulk release.
//!
//! Callers open a region, allocate through it, and close the region to
//! release every allocation made inside it in one step. Regions nest;
//! closes happen in strict last-opened-first-closed order.
//!
//! # Architecture
//!
//! ```text
//! RegionStack<S: BlockSource> (orchestrator)
//! ├── SmallVec<[Region; 8]> (depth-bounded stack, top = active region)
//! │   └── Vec<Box<[u8]>> (append-only allocation records per region)
//! ├── S (memory source; HeapSource by default)
//! └── StackConfig (max depth, byte budget, misuse policy)
//! ```
//!
//! # Handle safety
//!
//! Blocks are addressed through [`BlockHandle`] — a `Copy` value tagged
//! with the owning region's generation. Generations are never reused, so
//! resolving a handle after its region has closed fails with
//! [`RegionError::StaleHandle`] instead of dangling.
//!
//! # Threading
//!
//! A `RegionStack` is an owned, single-threaded context object. All
//! mutating operations take `&mut self`; callers wanting cross-thread
//! use must wrap the stack in their own lock or give each thread its
//! own stack.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handle;
pub mod region;
pub mod source;
pub mod stack;

// Public re-exports for the primary API surface.
pub use config::{MisusePolicy, StackConfig};
pub use error::RegionError;
pub use handle::BlockHandle;
pub use source::HeapSource;
pub use stack::RegionStack;
