//! String and memory operations.
//!
//! Implements the `<string.h>` subset of klib as safe Rust operating on slices.

pub mod mem;
pub mod str;

// Re-export commonly used functions.
pub use mem::{memcmp, memcmp_with, memcpy, memmove, memset};
pub use str::{strcat, strcmp, strcpy, strlen, strncmp, strncmp_with, strncpy};

/// How many positions a bounded comparison (`strncmp`, `memcmp`) inspects.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CompareBound {
    /// klib's historical bound: at most `n - 1` positions. Existing callers
    /// depend on it, so it is the default.
    #[default]
    Inherited,
    /// ISO C bound: at most `n` positions.
    Standard,
}

impl CompareBound {
    /// Number of positions to compare for a caller-supplied `n`.
    #[must_use]
    pub const fn limit(self, n: usize) -> usize {
        match self {
            Self::Inherited => n.saturating_sub(1),
            Self::Standard => n,
        }
    }
}
