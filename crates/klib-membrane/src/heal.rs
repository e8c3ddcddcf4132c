//! Self-healing policy engine.
//!
//! When hardened mode meets an operation classic klib would have
//! corrupted memory on, dropped silently, or refused to run, it applies a
//! deterministic healing action instead. Every action is counted so tooling
//! can report how often the repairs fired.

use core::sync::atomic::{AtomicU64, Ordering};

/// Actions the membrane can take to heal an unsafe operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealingAction {
    /// Truncate output and ensure null termination for string ops.
    TruncateWithNull { requested: usize, truncated: usize },
    /// Emit a `%` sequence literally instead of dropping it.
    /// `byte` is the character after the `%`, `None` for a trailing `%`.
    EchoSpecifier { byte: Option<u8> },
    /// Upgrade an unimplemented entry point to its bounded implementation
    /// (`snprintf`/`vsnprintf`).
    UpgradeToSafeVariant,
    /// No healing needed; the operation is valid.
    None,
}

impl HealingAction {
    /// Returns true if this action represents an actual healing (not None).
    #[must_use]
    pub const fn is_heal(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Point-in-time copy of the per-action counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealingSnapshot {
    pub null_truncations: u64,
    pub echoed_specifiers: u64,
    pub variant_upgrades: u64,
}

impl HealingSnapshot {
    /// Name of the action that fired between `earlier` and this snapshot,
    /// as used in structured logs. When several fired, the upgrade wins over
    /// truncation, which wins over echoing.
    #[must_use]
    pub const fn action_since(&self, earlier: &Self) -> Option<&'static str> {
        if self.variant_upgrades > earlier.variant_upgrades {
            Some("UpgradeToSafeVariant")
        } else if self.null_truncations > earlier.null_truncations {
            Some("TruncateWithNull")
        } else if self.echoed_specifiers > earlier.echoed_specifiers {
            Some("EchoSpecifier")
        } else {
            None
        }
    }
}

/// Policy engine that decides which healing action to apply.
pub struct HealingPolicy {
    /// Total heals applied.
    pub total_heals: AtomicU64,
    /// Null truncations applied.
    pub null_truncations: AtomicU64,
    /// `%` sequences echoed instead of dropped.
    pub echoed_specifiers: AtomicU64,
    /// Safe variant upgrades.
    pub variant_upgrades: AtomicU64,
}

impl HealingPolicy {
    /// Create a new policy with zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total_heals: AtomicU64::new(0),
            null_truncations: AtomicU64::new(0),
            echoed_specifiers: AtomicU64::new(0),
            variant_upgrades: AtomicU64::new(0),
        }
    }

    /// Record a healing action.
    pub fn record(&self, action: &HealingAction) {
        if action.is_heal() {
            self.total_heals.fetch_add(1, Ordering::Relaxed);
        }

        match action {
            HealingAction::TruncateWithNull { .. } => {
                self.null_truncations.fetch_add(1, Ordering::Relaxed);
            }
            HealingAction::EchoSpecifier { .. } => {
                self.echoed_specifiers.fetch_add(1, Ordering::Relaxed);
            }
            HealingAction::UpgradeToSafeVariant => {
                self.variant_upgrades.fetch_add(1, Ordering::Relaxed);
            }
            HealingAction::None => {}
        }
    }

    /// Decide healing for a string write of `src_len` bytes (plus terminator)
    /// into a destination with `dst_remaining` bytes of room.
    #[must_use]
    pub fn heal_string_bounds(
        &self,
        src_len: usize,
        dst_remaining: Option<usize>,
    ) -> HealingAction {
        match dst_remaining {
            Some(remaining) if src_len >= remaining => HealingAction::TruncateWithNull {
                requested: src_len,
                truncated: remaining.saturating_sub(1), // leave room for null
            },
            _ => HealingAction::None,
        }
    }

    /// Snapshot of the total heal count.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total_heals.load(Ordering::Relaxed)
    }

    /// Snapshot of the per-action counters.
    #[must_use]
    pub fn snapshot(&self) -> HealingSnapshot {
        HealingSnapshot {
            null_truncations: self.null_truncations.load(Ordering::Relaxed),
            echoed_specifiers: self.echoed_specifiers.load(Ordering::Relaxed),
            variant_upgrades: self.variant_upgrades.load(Ordering::Relaxed),
        }
    }
}

impl Default for HealingPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Global healing policy instance.
static GLOBAL_POLICY: HealingPolicy = HealingPolicy::new();

/// Access the global healing policy.
#[must_use]
pub fn global_healing_policy() -> &'static HealingPolicy {
    &GLOBAL_POLICY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_string_when_exceeding_dst() {
        let policy = HealingPolicy::new();
        let action = policy.heal_string_bounds(100, Some(50));
        assert_eq!(
            action,
            HealingAction::TruncateWithNull {
                requested: 100,
                truncated: 49
            }
        );
    }

    #[test]
    fn exact_fit_needs_room_for_terminator() {
        let policy = HealingPolicy::new();
        assert!(policy.heal_string_bounds(8, Some(8)).is_heal());
        assert_eq!(policy.heal_string_bounds(7, Some(8)), HealingAction::None);
    }

    #[test]
    fn no_heal_when_no_bounds_known() {
        let policy = HealingPolicy::new();
        assert_eq!(policy.heal_string_bounds(1000, None), HealingAction::None);
    }

    #[test]
    fn zero_room_truncates_to_zero() {
        let policy = HealingPolicy::new();
        assert_eq!(
            policy.heal_string_bounds(3, Some(0)),
            HealingAction::TruncateWithNull {
                requested: 3,
                truncated: 0
            }
        );
    }

    #[test]
    fn record_increments_counters() {
        let policy = HealingPolicy::new();
        policy.record(&HealingAction::EchoSpecifier { byte: Some(b'%') });
        policy.record(&HealingAction::EchoSpecifier { byte: None });
        policy.record(&HealingAction::UpgradeToSafeVariant);
        policy.record(&HealingAction::None);

        assert_eq!(policy.total(), 3);
        assert_eq!(policy.echoed_specifiers.load(Ordering::Relaxed), 2);
        assert_eq!(policy.variant_upgrades.load(Ordering::Relaxed), 1);
        assert_eq!(policy.null_truncations.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn none_is_not_a_heal() {
        assert!(!HealingAction::None.is_heal());
        assert!(HealingAction::UpgradeToSafeVariant.is_heal());
    }

    #[test]
    fn snapshot_names_the_action_that_fired() {
        let policy = HealingPolicy::new();
        let start = policy.snapshot();
        assert_eq!(policy.snapshot().action_since(&start), None);

        policy.record(&HealingAction::EchoSpecifier { byte: None });
        let echoed = policy.snapshot();
        assert_eq!(echoed.action_since(&start), Some("EchoSpecifier"));

        policy.record(&HealingAction::TruncateWithNull {
            requested: 9,
            truncated: 3,
        });
        assert_eq!(policy.snapshot().action_since(&echoed), Some("TruncateWithNull"));
        assert_eq!(policy.snapshot().action_since(&start), Some("TruncateWithNull"));

        policy.record(&HealingAction::UpgradeToSafeVariant);
        assert_eq!(policy.snapshot().action_since(&start), Some("UpgradeToSafeVariant"));
        assert_eq!(policy.snapshot().echoed_specifiers, 1);
    }
}
