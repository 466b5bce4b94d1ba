//! Benchmark profiles for the Karst region allocator.
//!
//! Provides pre-built [`StackConfig`] profiles shared by the criterion
//! benches:
//!
//! - [`reference_config`]: default depth (128), unlimited bytes
//! - [`shallow_config`]: depth 8, matching typical call-scoped nesting

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use karst_region::StackConfig;

/// Default-depth profile used by the throughput benches.
pub fn reference_config() -> StackConfig {
    StackConfig::default()
}

/// Shallow-nesting profile: depth 8, the inline capacity of the stack.
pub fn shallow_config() -> StackConfig {
    StackConfig::new().with_max_depth(8)
}
