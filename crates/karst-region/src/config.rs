//! Region-stack configuration parameters.

/// How the stack reacts to misuse (capacity overflow, close with no
/// open region).
///
/// The two misuse conditions are programmer errors, not resource
/// conditions. Some programs want them surfaced as recoverable values;
/// others want the classic fail-fast stance where misuse ends the
/// program immediately. Out-of-memory is never subject to this policy —
/// it always propagates as a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MisusePolicy {
    /// Return the error to the caller (default).
    Propagate,
    /// Panic with the error's diagnostic message.
    Panic,
}

/// Configuration for a [`RegionStack`](crate::RegionStack).
///
/// All values are immutable after the stack is created.
#[derive(Clone, Debug)]
pub struct StackConfig {
    /// Maximum nesting depth of open regions.
    ///
    /// Default: 128. Opening a region at this depth fails with
    /// `CapacityExceeded`.
    pub max_depth: u16,

    /// Optional byte budget for the default heap source.
    ///
    /// Default: `None` (unlimited). When set, the total bytes outstanding
    /// across all open regions may not exceed this value; allocations
    /// past the budget fail with `OutOfMemory`. Ignored when the stack
    /// is built with a caller-provided source.
    pub max_total_bytes: Option<usize>,

    /// Reaction to capacity overflow and close-without-open.
    pub on_misuse: MisusePolicy,
}

impl StackConfig {
    /// Default maximum nesting depth.
    pub const DEFAULT_MAX_DEPTH: u16 = 128;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_total_bytes: None,
            on_misuse: MisusePolicy::Propagate,
        }
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: u16) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the byte budget for the default heap source.
    pub fn with_max_total_bytes(mut self, bytes: usize) -> Self {
        self.max_total_bytes = Some(bytes);
        self
    }

    /// Set the misuse policy.
    pub fn with_misuse_policy(mut self, policy: MisusePolicy) -> Self {
        self.on_misuse = policy;
        self
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self::new()
    }
}
