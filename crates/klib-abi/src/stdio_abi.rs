//! ABI layer for the klib `printf` family.
//!
//! Variadic arguments are pulled from the `va_list` one per conversion the
//! format string contains, converted to `FormatArg`s, and rendered by
//! `klib_core::stdio`. Formatter errors return `-1`. In strict mode
//! `snprintf`/`vsnprintf` keep klib's fatal stub and abort.

use std::ffi::{VaList, c_char, c_int, c_uint};
use std::slice;

use klib_core::stdio::{
    self as core_stdio, Conversion, FormatArg, FormatPolicy, FormatScanner, FormatSegment,
    PutchConsole,
};

use crate::util::c_str_with_nul;

unsafe extern "C" {
    /// Abstract-machine character output, provided by the host.
    fn putch(ch: c_char);
}

const NULL_STR: &[u8] = b"(null)\0";

/// Borrow a `%s` argument; a null pointer reads as `(null)`.
unsafe fn str_arg<'a>(ptr: *const c_char) -> &'a [u8] {
    if ptr.is_null() {
        NULL_STR
    } else {
        unsafe { c_str_with_nul(ptr) }
    }
}

/// Extract one variadic argument from `$args` per conversion in `$fmt`.
/// Works for both `...` and `VaList` parameters.
macro_rules! extract_va_args {
    ($fmt:expr, $args:expr) => {{
        let mut extracted = Vec::with_capacity(FormatScanner::conversion_count($fmt));
        for seg in FormatScanner::new($fmt) {
            if let FormatSegment::Conversion { conversion, .. } = seg {
                extracted.push(match conversion {
                    Conversion::Signed | Conversion::Char => {
                        FormatArg::Int(unsafe { $args.next_arg::<c_int>() })
                    }
                    Conversion::Hex => FormatArg::Uint(unsafe { $args.next_arg::<c_uint>() }),
                    Conversion::Str => {
                        FormatArg::Str(unsafe { str_arg($args.next_arg::<*const c_char>()) })
                    }
                });
            }
        }
        extracted
    }};
}

#[inline]
fn as_c_int(result: Result<usize, klib_core::FormatError>) -> c_int {
    match result {
        Ok(len) => c_int::try_from(len).unwrap_or(c_int::MAX),
        Err(_) => -1,
    }
}

/// Formats into a caller buffer whose capacity is, per the C contract, the
/// rendered length plus NUL.
unsafe fn sprintf_impl(out: *mut c_char, fmt: &[u8], args: &[FormatArg<'_>]) -> c_int {
    let policy = FormatPolicy::current();
    let total = match core_stdio::measure(fmt, args, policy) {
        Ok(total) => total,
        Err(_) => return -1,
    };
    let dst = unsafe { slice::from_raw_parts_mut(out.cast::<u8>(), total + 1) };
    as_c_int(core_stdio::vsprintf_with(dst, fmt, args, policy))
}

/// Bounded formatting into `n` bytes at `out`.
unsafe fn vsnprintf_impl(
    out: *mut c_char,
    n: usize,
    fmt: &[u8],
    args: &[FormatArg<'_>],
    snprintf_entry: bool,
) -> c_int {
    let mut empty = [0u8; 0];
    let dst: &mut [u8] = if out.is_null() || n == 0 {
        &mut empty
    } else {
        unsafe { slice::from_raw_parts_mut(out.cast::<u8>(), n) }
    };
    let n = dst.len();
    let result = if snprintf_entry {
        core_stdio::snprintf(dst, n, fmt, args)
    } else {
        core_stdio::vsnprintf(dst, n, fmt, args)
    };
    as_c_int(result)
}

// ---------------------------------------------------------------------------
// printf / sprintf / vsprintf
// ---------------------------------------------------------------------------

/// klib `printf`: formats into a 1024-byte buffer and writes it with `putch`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn printf(format: *const c_char, mut args: ...) -> c_int {
    if format.is_null() {
        return -1;
    }
    let fmt = unsafe { c_str_with_nul(format) };
    let va = extract_va_args!(fmt, &mut args);

    let mut console = PutchConsole::new(|byte: u8| unsafe { putch(byte as c_char) });
    as_c_int(core_stdio::printf(&mut console, fmt, &va))
}

/// klib `vsprintf`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vsprintf(
    out: *mut c_char,
    format: *const c_char,
    mut ap: VaList,
) -> c_int {
    if out.is_null() || format.is_null() {
        return -1;
    }
    let fmt = unsafe { c_str_with_nul(format) };
    let va = extract_va_args!(fmt, &mut ap);
    unsafe { sprintf_impl(out, fmt, &va) }
}

/// klib `sprintf`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sprintf(out: *mut c_char, format: *const c_char, mut args: ...) -> c_int {
    if out.is_null() || format.is_null() {
        return -1;
    }
    let fmt = unsafe { c_str_with_nul(format) };
    let va = extract_va_args!(fmt, &mut args);
    unsafe { sprintf_impl(out, fmt, &va) }
}

// ---------------------------------------------------------------------------
// snprintf / vsnprintf
// ---------------------------------------------------------------------------

/// klib `snprintf`. Aborts in strict mode.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn snprintf(
    out: *mut c_char,
    n: usize,
    format: *const c_char,
    mut args: ...
) -> c_int {
    if format.is_null() {
        return -1;
    }
    let fmt = unsafe { c_str_with_nul(format) };
    let va = extract_va_args!(fmt, &mut args);
    unsafe { vsnprintf_impl(out, n, fmt, &va, true) }
}

/// klib `vsnprintf`. Aborts in strict mode.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vsnprintf(
    out: *mut c_char,
    n: usize,
    format: *const c_char,
    mut ap: VaList,
) -> c_int {
    if format.is_null() {
        return -1;
    }
    let fmt = unsafe { c_str_with_nul(format) };
    let va = extract_va_args!(fmt, &mut ap);
    unsafe { vsnprintf_impl(out, n, fmt, &va, false) }
}
