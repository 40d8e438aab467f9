//! Configuration defaults for pet stats and decay.
//!
//! The [`CareConfig`] struct bundles every tunable so that callers (the
//! manager, tests) can override defaults. The engine builds it from the
//! `care` section of `petcare-config.yaml`.

use std::time::Duration;

use petcare_types::MAX_STAT_VALUE;

/// Configuration for stat initialisation and periodic decay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareConfig {
    /// Value every stat starts at on adoption (default: 50).
    ///
    /// Values above the stat maximum are clamped.
    pub initial_stat_value: u32,

    /// Points removed from every stat per decay tick (default: 1).
    pub decay_amount: u32,

    /// Real-time milliseconds between decay ticks (default: 5000).
    pub decay_interval_ms: u64,
}

impl Default for CareConfig {
    fn default() -> Self {
        Self {
            initial_stat_value: 50,
            decay_amount: 1,
            decay_interval_ms: 5000,
        }
    }
}

impl CareConfig {
    /// The decay period as a [`Duration`].
    ///
    /// A zero interval is raised to one millisecond so the ticker can
    /// never spin.
    pub fn decay_interval(&self) -> Duration {
        Duration::from_millis(self.decay_interval_ms.max(1))
    }

    /// The initial stat value clamped to the valid stat range.
    pub fn clamped_initial_value(&self) -> u32 {
        self.initial_stat_value.min(MAX_STAT_VALUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = CareConfig::default();
        assert_eq!(cfg.initial_stat_value, 50);
        assert_eq!(cfg.decay_amount, 1);
        assert_eq!(cfg.decay_interval(), Duration::from_secs(5));
    }

    #[test]
    fn zero_interval_is_raised() {
        let cfg = CareConfig {
            decay_interval_ms: 0,
            ..CareConfig::default()
        };
        assert_eq!(cfg.decay_interval(), Duration::from_millis(1));
    }

    #[test]
    fn initial_value_is_clamped() {
        let cfg = CareConfig {
            initial_stat_value: 250,
            ..CareConfig::default()
        };
        assert_eq!(cfg.clamped_initial_value(), MAX_STAT_VALUE);
    }
}
