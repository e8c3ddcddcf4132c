//! Runtime safety level as seen from C.
//!
//! The embedding kernel selects the mode with `klib_set_safety_level`:
//! `0` strict, `1` hardened. Any other value selects strict.

use std::ffi::c_int;

use klib_membrane::{SafetyLevel, global_healing_policy, safety_level, set_safety_level};

pub const LEVEL_STRICT: c_int = 0;
pub const LEVEL_HARDENED: c_int = 1;

#[must_use]
pub const fn level_from_c(level: c_int) -> SafetyLevel {
    match level {
        LEVEL_HARDENED => SafetyLevel::Hardened,
        _ => SafetyLevel::Strict,
    }
}

#[must_use]
pub const fn level_to_c(level: SafetyLevel) -> c_int {
    match level {
        SafetyLevel::Strict => LEVEL_STRICT,
        SafetyLevel::Hardened => LEVEL_HARDENED,
    }
}

/// Sets the process-wide safety level and returns the previous one.
#[unsafe(no_mangle)]
pub extern "C" fn klib_set_safety_level(level: c_int) -> c_int {
    level_to_c(set_safety_level(level_from_c(level)))
}

/// Current process-wide safety level.
#[unsafe(no_mangle)]
pub extern "C" fn klib_safety_level() -> c_int {
    level_to_c(safety_level())
}

/// Number of hardened-mode repairs applied so far.
#[unsafe(no_mangle)]
pub extern "C" fn klib_heal_count() -> u64 {
    global_healing_policy().total()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_codes_roundtrip() {
        for level in [SafetyLevel::Strict, SafetyLevel::Hardened] {
            assert_eq!(level_from_c(level_to_c(level)), level);
        }
        assert_eq!(level_from_c(2), SafetyLevel::Strict);
        assert_eq!(level_from_c(-7), SafetyLevel::Strict);
        assert_eq!(level_from_c(99), SafetyLevel::Strict);
    }

    #[test]
    fn set_returns_previous_level() {
        let previous = klib_safety_level();
        klib_set_safety_level(LEVEL_HARDENED);
        assert_eq!(klib_safety_level(), LEVEL_HARDENED);
        assert_eq!(klib_set_safety_level(previous), LEVEL_HARDENED);
        assert_eq!(klib_safety_level(), previous);
    }
}
