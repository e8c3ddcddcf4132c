//! Runtime mode configuration.
//!
//! The runtime mode decides how klib treats the edge cases the classic
//! freestanding library left undefined or unimplemented:
//! - `strict` (default): behave exactly like classic klib. Unknown
//!   conversions are dropped, `%%` prints nothing, `snprintf`/`vsnprintf` halt,
//!   and an output overflow is reported instead of silently corrupting memory.
//! - `hardened`: repair instead of failing. `%%` prints `%`, unknown
//!   conversions are echoed, overflowing output is truncated and terminated,
//!   and the bounded formatters are real.
//!
//! Freestanding images have no environment, so the level starts as `strict`
//! (or `hardened` with the `hardened` cargo feature) and is changed with
//! [`set_safety_level`]. Hosted tooling maps `KLIB_MODE` onto it.

use core::sync::atomic::{AtomicU8, Ordering};

/// Runtime operating mode for the membrane.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyLevel {
    /// Original klib behaviour. Edge cases fail the way the C version did,
    /// except that overflows are detected rather than undefined.
    #[default]
    Strict,
    /// Deterministic repairs for edge cases (escape `%%`, truncate overflow,
    /// bounded `snprintf`).
    Hardened,
}

impl SafetyLevel {
    /// Parse from string (case-insensitive). Anything unrecognised is strict.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        let s = s.trim();
        if ["hardened", "repair", "full"]
            .iter()
            .any(|name| s.eq_ignore_ascii_case(name))
        {
            Self::Hardened
        } else {
            Self::Strict
        }
    }

    /// Lowercase name used in logs, fixtures and the CLI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Hardened => "hardened",
        }
    }
}

// 0 = unset (use the build default), otherwise level_to_u8().
static CACHED_LEVEL: AtomicU8 = AtomicU8::new(LEVEL_UNSET);

const LEVEL_UNSET: u8 = 0;
const LEVEL_STRICT: u8 = 1;
const LEVEL_HARDENED: u8 = 2;

const fn level_to_u8(level: SafetyLevel) -> u8 {
    match level {
        SafetyLevel::Strict => LEVEL_STRICT,
        SafetyLevel::Hardened => LEVEL_HARDENED,
    }
}

const fn u8_to_level(v: u8) -> SafetyLevel {
    match v {
        LEVEL_STRICT => SafetyLevel::Strict,
        LEVEL_HARDENED => SafetyLevel::Hardened,
        _ => build_default(),
    }
}

/// Level used until [`set_safety_level`] is called.
#[must_use]
pub const fn build_default() -> SafetyLevel {
    if cfg!(feature = "hardened") {
        SafetyLevel::Hardened
    } else {
        SafetyLevel::Strict
    }
}

/// Get the configured safety level.
#[must_use]
pub fn safety_level() -> SafetyLevel {
    u8_to_level(CACHED_LEVEL.load(Ordering::Relaxed))
}

/// Set the process-wide safety level. Returns the previous level.
pub fn set_safety_level(level: SafetyLevel) -> SafetyLevel {
    u8_to_level(CACHED_LEVEL.swap(level_to_u8(level), Ordering::SeqCst))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_safety_levels() {
        assert_eq!(SafetyLevel::from_str_loose("strict"), SafetyLevel::Strict);
        assert_eq!(SafetyLevel::from_str_loose("STRICT"), SafetyLevel::Strict);
        assert_eq!(SafetyLevel::from_str_loose("default"), SafetyLevel::Strict);
        assert_eq!(
            SafetyLevel::from_str_loose("hardened"),
            SafetyLevel::Hardened
        );
        assert_eq!(
            SafetyLevel::from_str_loose(" Hardened\n"),
            SafetyLevel::Hardened
        );
        assert_eq!(SafetyLevel::from_str_loose("repair"), SafetyLevel::Hardened);
        assert_eq!(SafetyLevel::from_str_loose("off"), SafetyLevel::Strict);
        assert_eq!(SafetyLevel::from_str_loose("bogus"), SafetyLevel::Strict);
    }

    #[test]
    fn names_round_trip_through_loose_parser() {
        for level in [SafetyLevel::Strict, SafetyLevel::Hardened] {
            assert_eq!(SafetyLevel::from_str_loose(level.as_str()), level);
        }
    }

    #[test]
    fn default_is_strict() {
        assert_eq!(SafetyLevel::default(), SafetyLevel::Strict);
    }

    #[test]
    fn set_level_is_sticky_and_returns_previous() {
        let previous = CACHED_LEVEL.swap(LEVEL_STRICT, Ordering::SeqCst);
        assert_eq!(safety_level(), SafetyLevel::Strict);

        assert_eq!(
            set_safety_level(SafetyLevel::Hardened),
            SafetyLevel::Strict
        );
        assert_eq!(safety_level(), SafetyLevel::Hardened);
        assert_eq!(safety_level(), SafetyLevel::Hardened);

        CACHED_LEVEL.store(previous, Ordering::SeqCst);
    }

    #[test]
    fn unset_level_falls_back_to_build_default() {
        assert_eq!(u8_to_level(LEVEL_UNSET), build_default());
        assert_eq!(u8_to_level(200), build_default());
    }
}
