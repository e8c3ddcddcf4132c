//! Runtime safety policy for klib.
//!
//! The membrane sits between the C entry points and the safe implementations
//! and answers one question: should an edge case behave like the classic
//! freestanding klib (strict), or be repaired (hardened)?
//!
//! - **Configuration** (`config`): process-wide safety level
//! - **Self-healing engine** (`heal`): deterministic repair actions and counters
//!
//! Everything here is lock-free and usable without `std`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod heal;

pub use config::{SafetyLevel, safety_level, set_safety_level};
pub use heal::{HealingAction, HealingPolicy, HealingSnapshot, global_healing_policy};
