//! # klib-core
//!
//! Safe Rust implementations of the small C library slice a freestanding
//! kernel needs: `<string.h>` byte/string primitives, `itoa`/`uitoa`, and a
//! minimal `printf` family (`%d`, `%x`, `%c`, `%s`).
//!
//! The crate is `no_std` and never allocates. Every routine works on
//! caller-owned slices; a zero byte marks the logical end of a C string and
//! the end of the slice counts as one when no zero byte is present.
//! No `unsafe` code is permitted at the crate level.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod error;
pub mod stdio;
pub mod stdlib;
pub mod string;

pub use error::FormatError;
