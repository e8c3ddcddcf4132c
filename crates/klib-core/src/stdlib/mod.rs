//! Standard library utilities.
//!
//! Implements the integer-to-string half of klib's `<stdlib.h>` subset.

pub mod conversion;

pub use conversion::{Digits, itoa, itoa_digits, uitoa, uitoa_digits};
