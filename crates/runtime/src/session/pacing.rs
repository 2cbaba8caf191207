//! Delays between battle events.

use std::time::Duration;

/// Pauses a session takes after each event so clients can animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// After `battle-start`.
    pub battle_start_delay: Duration,
    /// After `round-start`.
    pub round_start_delay: Duration,
    /// After each `card-reveal`.
    pub reveal_delay: Duration,
    /// After `battle-animation`.
    pub animation_delay: Duration,
    /// After `round-result`.
    pub result_delay: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            battle_start_delay: Duration::from_millis(1500),
            round_start_delay: Duration::from_millis(1000),
            reveal_delay: Duration::from_millis(1200),
            animation_delay: Duration::from_millis(1500),
            result_delay: Duration::from_millis(1800),
        }
    }
}

impl PacingConfig {
    /// No delays at all.
    pub const fn immediate() -> Self {
        Self {
            battle_start_delay: Duration::ZERO,
            round_start_delay: Duration::ZERO,
            reveal_delay: Duration::ZERO,
            animation_delay: Duration::ZERO,
            result_delay: Duration::ZERO,
        }
    }

    /// Multiply every delay by `factor`. Negative or non-finite factors
    /// collapse to zero.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        let scale = |delay: Duration| {
            if factor.is_finite() && factor > 0.0 {
                delay.mul_f64(factor)
            } else {
                Duration::ZERO
            }
        };
        Self {
            battle_start_delay: scale(self.battle_start_delay),
            round_start_delay: scale(self.round_start_delay),
            reveal_delay: scale(self.reveal_delay),
            animation_delay: scale(self.animation_delay),
            result_delay: scale(self.result_delay),
        }
    }

    /// Total pause of one round: start, two reveals, animation and result.
    pub fn per_round(&self) -> Duration {
        self.round_start_delay + self.reveal_delay * 2 + self.animation_delay + self.result_delay
    }
}
