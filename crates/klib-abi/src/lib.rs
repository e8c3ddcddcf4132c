#![feature(c_variadic)]
// This crate defines memcpy/memmove/memset; LLVM must not lower their loops
// back into calls to themselves.
#![no_builtins]
// All extern "C" ABI exports accept raw pointers from C callers; the contract
// is the C one, so per-function safety docs would restate it everywhere.
#![allow(clippy::missing_safety_doc)]
//! # klib-abi
//!
//! extern "C" boundary for klib.
//!
//! This crate produces a `cdylib` exposing the klib symbols (`strlen` ..
//! `memcmp`, `itoa`/`uitoa`, the `printf` family) to C callers. Each entry
//! point turns raw pointers into slices sized by the C contract and delegates
//! to the safe implementations in `klib-core`.
//!
//! # Architecture
//!
//! ```text
//! C caller -> ABI entry (this crate) -> klib-core -> return
//!                                        |
//!                 printf -> PutchConsole -> host putch()
//! ```
//!
//! In **strict** mode behaviour matches klib exactly, including the fatal
//! `snprintf` stub. In **hardened** mode the formatter echoes unknown
//! specifiers, truncates instead of overflowing, and `snprintf` performs real
//! bounded formatting. The mode is selected with `klib_set_safety_level`.

pub mod runtime_policy;

// Gated behind cfg(not(test)) because these modules export #[no_mangle]
// symbols (memcpy, strlen, printf, ...) that would shadow the host libc in the
// test binary, and printf needs the host `putch`.
#[cfg(not(test))]
pub mod stdio_abi;
#[cfg(not(test))]
pub mod stdlib_abi;
#[cfg(not(test))]
pub mod string_abi;

pub mod util;
