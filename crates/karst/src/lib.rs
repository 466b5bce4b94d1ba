//! Karst: scoped bulk memory management.
//!
//! This is the top-level facade crate that re-exports the public API
//! from the Karst sub-crates. For most users, adding `karst` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use karst::prelude::*;
//!
//! let mut stack = RegionStack::new(StackConfig::default());
//!
//! stack.open_region().unwrap();
//! let scratch = stack.alloc(64).unwrap();
//! let greeting = stack.duplicate(b"hello").unwrap();
//! assert_eq!(stack.bytes(greeting).unwrap(), b"hello");
//!
//! // Nested regions release independently, innermost first.
//! stack.open_region().unwrap();
//! let inner = stack.alloc(16).unwrap();
//! stack.close_region().unwrap();
//! assert!(matches!(
//!     stack.bytes(inner),
//!     Err(RegionError::StaleHandle { .. })
//! ));
//!
//! // The outer region's blocks are still live until its own close.
//! assert_eq!(stack.bytes(scratch).unwrap().len(), 64);
//! stack.close_region().unwrap();
//! assert_eq!(stack.depth(), 0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`region`] | `karst-region` | `RegionStack`, handles, config, errors |
//! | [`types`] | `karst-core` | `Generation`, the `BlockSource` trait |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Region stack, handles, configuration, and errors (`karst-region`).
pub use karst_region as region;

/// Core identifiers and the memory-source trait (`karst-core`).
pub use karst_core as types;

// Flat re-exports of the primary API surface.
pub use karst_core::{BlockSource, Generation};
pub use karst_region::{
    BlockHandle, HeapSource, MisusePolicy, RegionError, RegionStack, StackConfig,
};

/// Common imports for typical Karst usage.
///
/// ```rust
/// use karst::prelude::*;
/// ```
pub mod prelude {
    pub use karst_core::{BlockSource, Generation};
    pub use karst_region::{
        BlockHandle, HeapSource, MisusePolicy, RegionError, RegionStack, StackConfig,
    };
}
