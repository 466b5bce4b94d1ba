//! Core types and traits for the Karst region allocator.
//!
//! This is the leaf crate with zero dependencies. It defines the
//! [`Generation`] identifier used to tag regions and block handles,
//! and the [`BlockSource`] trait — the seam between the region stack
//! and whatever produces the underlying memory blocks.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod id;
pub mod traits;

pub use id::Generation;
pub use traits::BlockSource;
