//! Region-stack error types.

use std::error::Error;
use std::fmt;

use karst_core::Generation;

/// Errors that can occur during region-stack operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegionError {
    /// Attempted to open a region beyond the maximum nesting depth.
    CapacityExceeded {
        /// Current stack depth.
        depth: usize,
        /// Configured maximum depth.
        max_depth: u16,
    },
    /// Attempted to close, allocate, or adopt with no region open.
    NoOpenRegion,
    /// The memory source could not satisfy an allocation request.
    OutOfMemory {
        /// Number of bytes requested.
        requested: usize,
    },
    /// A `BlockHandle` whose owning region has already closed.
    StaleHandle {
        /// The generation encoded in the handle.
        handle_generation: Generation,
    },
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { depth, max_depth } => {
                write!(
                    f,
                    "region stack capacity exceeded: depth {depth}, max {max_depth}"
                )
            }
            Self::NoOpenRegion => write!(f, "no open region"),
            Self::OutOfMemory { requested } => {
                write!(f, "memory source exhausted: requested {requested} bytes")
            }
            Self::StaleHandle { handle_generation } => {
                write!(
                    f,
                    "stale handle: region generation {handle_generation} is no longer open"
                )
            }
        }
    }
}

impl Error for RegionError {}
