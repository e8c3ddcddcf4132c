//! Integration tests for the exported `printf` family in hardened mode.
//!
//! Kept apart from the strict tests because the safety level is
//! process-wide.

use std::ffi::{c_char, c_int};

use klib_abi::runtime_policy::{
    LEVEL_HARDENED, klib_heal_count, klib_safety_level, klib_set_safety_level,
};
use klib_abi::stdio_abi::{snprintf, sprintf};

#[unsafe(no_mangle)]
pub extern "C" fn putch(_ch: c_char) {}

fn assert_bytes(actual: &[u8], expected: &[u8]) {
    let same = actual.len() == expected.len()
        && actual.iter().zip(expected).all(|(a, e)| a == e);
    assert!(
        same,
        "bytes differ: actual {:?}, expected {:?}",
        String::from_utf8_lossy(actual),
        String::from_utf8_lossy(expected)
    );
}

fn hardened() {
    klib_set_safety_level(LEVEL_HARDENED);
    assert_eq!(klib_safety_level(), LEVEL_HARDENED);
}

fn cstr(bytes: &[u8]) -> *const c_char {
    bytes.as_ptr().cast()
}

#[test]
fn snprintf_is_bounded_and_reports_full_length() {
    hardened();
    let mut out = [b'.'; 8];
    let n = unsafe { snprintf(out.as_mut_ptr().cast(), 6, cstr(b"hello %s\0"), cstr(b"world\0")) };
    assert_eq!(n, 11);
    assert_bytes(&out, b"hello\0..");
}

#[test]
fn snprintf_with_zero_size_writes_nothing() {
    hardened();
    let mut out = [b'.'; 4];
    let n = unsafe { snprintf(out.as_mut_ptr().cast(), 0, cstr(b"%d\0"), 1234 as c_int) };
    assert_eq!(n, 4);
    assert_bytes(&out, b"....");
}

#[test]
fn sprintf_escapes_percent_and_echoes_unknown() {
    hardened();
    let mut out = [b'.'; 16];
    let n = unsafe { sprintf(out.as_mut_ptr().cast(), cstr(b"100%%\0")) };
    assert_eq!(n, 4);
    assert_bytes(&out[..6], b"100%\0.");

    let before = klib_heal_count();
    let n = unsafe { sprintf(out.as_mut_ptr().cast(), cstr(b"a%qb\0")) };
    assert_eq!(n, 4);
    assert_bytes(&out[..5], b"a%qb\0");
    assert!(klib_heal_count() > before);
}

#[test]
fn sprintf_long_formats_in_hardened_mode() {
    hardened();
    let fmt = "%x".repeat(34) + "\0";
    let mut out = [b'.'; 40];
    let n = unsafe {
        sprintf(
            out.as_mut_ptr().cast(),
            cstr(fmt.as_bytes()),
            1u32, 2u32, 3u32, 4u32, 5u32, 6u32, 7u32, 8u32, 9u32, 10u32,
            11u32, 12u32, 13u32, 14u32, 15u32, 0u32, 1u32, 2u32, 3u32, 4u32,
            5u32, 6u32, 7u32, 8u32, 9u32, 10u32, 11u32, 12u32, 13u32, 14u32,
            15u32, 0u32, 1u32, 2u32,
        )
    };
    assert_eq!(n, 34);
    assert_bytes(&out[..35], b"123456789abcdef0123456789abcdef012\0");
}
