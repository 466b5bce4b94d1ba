//! Strongly-typed identifiers.

use std::fmt;

/// Identifies one region for the lifetime of a stack.
///
/// Generations are assigned from a monotonic counter when a region is
/// opened and are never reused, even after the region closes. A block
/// handle carrying the generation of a closed region can therefore be
/// detected as stale with a single lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Generation {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
