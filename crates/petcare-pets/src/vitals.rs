//! Stat arithmetic applied to pets.
//!
//! Every stat lives in `0..=MAX_STAT_VALUE`. Decreases saturate at 0 and
//! increases saturate at the maximum, so no caller ever sees an out-of-range
//! value. A pet is depleted (and must die) as soon as any stat is at or
//! below 0; with unsigned values that means exactly 0.
//!
//! All arithmetic uses saturating operations. No panics, no silent overflow.

use petcare_types::{MAX_STAT_VALUE, StatKind, StatSnapshot};

/// Build a snapshot with every [`StatKind`] set to `value` (clamped).
pub fn filled(value: u32) -> StatSnapshot {
    let value = value.min(MAX_STAT_VALUE);
    StatKind::ALL.iter().map(|kind| (*kind, value)).collect()
}

/// Value after removing `amount`, floored at 0.
pub const fn decreased(value: u32, amount: u32) -> u32 {
    value.saturating_sub(amount)
}

/// Value after adding `amount`, capped at [`MAX_STAT_VALUE`].
pub fn increased(value: u32, amount: u32) -> u32 {
    value.saturating_add(amount).min(MAX_STAT_VALUE)
}

/// Whether any stat has run out.
pub fn is_depleted(stats: &StatSnapshot) -> bool {
    stats.values().any(|value| *value == 0)
}
