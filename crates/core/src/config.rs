//! Session configuration.

use crate::error::ConfigError;
use crate::types::*;

/// Per-phase input lock durations in milliseconds
///
/// The engine never waits on a renderer. Instead each resolution keeps input locked
/// for the sum of its phase durations, drained by [`GameSession::tick`](crate::GameSession::tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTiming {
    pub swap_ms: u32,
    pub clear_ms: u32,
    pub fall_ms: u32,
    pub spawn_ms: u32,
}

impl AnimationTiming {
    /// Input unlocks as soon as a resolution completes
    pub const INSTANT: Self = Self {
        swap_ms: 0,
        clear_ms: 0,
        fall_ms: 0,
        spawn_ms: 0,
    };

    /// Durations matching the default animation lengths
    pub const STANDARD: Self = Self {
        swap_ms: SWAP_MS,
        clear_ms: CLEAR_MS,
        fall_ms: FALL_MS,
        spawn_ms: SPAWN_MS,
    };

    pub fn phase_ms(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Swapping | Phase::Reverting => self.swap_ms,
            Phase::Clearing | Phase::Detonating => self.clear_ms,
            Phase::Falling => self.fall_ms,
            Phase::Refilling | Phase::Reshuffling => self.spawn_ms,
            Phase::Idle => 0,
        }
    }
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self::INSTANT
    }
}

/// Everything a session needs at construction time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub cols: u16,
    pub rows: u16,
    /// Number of distinct tile kinds drawn at spawn/refill
    pub kind_count: u8,
    pub points_per_tile: u32,
    pub area_clear_multiplier: u32,
    pub mode: SessionMode,
    pub bomb_trigger: BombTrigger,
    /// Chance (per mille) that a refilled tile is an area-clear tile
    pub bomb_spawn_per_mille: u16,
    pub timing: AnimationTiming,
    pub max_cascade_rounds: u32,
    /// Shuffle the board when no move is left
    pub reshuffle_when_stuck: bool,
    /// Generate the opening board without runs
    pub stabilize_initial_board: bool,
}

impl GameConfig {
    /// Validate ranges that would otherwise break the engine
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dims = 1..=MAX_GRID_DIM;
        if !dims.contains(&self.cols) || !dims.contains(&self.rows) {
            return Err(ConfigError::Dimensions {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if !(MIN_KIND_COUNT..=MAX_KIND_COUNT).contains(&self.kind_count) {
            return Err(ConfigError::KindCount(self.kind_count));
        }
        if self.bomb_spawn_per_mille > 1000 {
            return Err(ConfigError::BombChance(self.bomb_spawn_per_mille));
        }
        if self.mode == (SessionMode::Timed { duration_ms: 0 }) {
            return Err(ConfigError::ZeroDuration);
        }
        if self.max_cascade_rounds == 0 {
            return Err(ConfigError::ZeroCascadeRounds);
        }
        Ok(())
    }

    /// Scoring rules derived from this configuration
    pub fn scoring(&self) -> crate::scoring::Scoring {
        crate::scoring::Scoring {
            points_per_tile: self.points_per_tile,
            area_clear_multiplier: self.area_clear_multiplier,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            kind_count: DEFAULT_KIND_COUNT,
            points_per_tile: POINTS_PER_TILE,
            area_clear_multiplier: AREA_CLEAR_MULTIPLIER,
            mode: SessionMode::Unlimited,
            bomb_trigger: BombTrigger::Tap,
            bomb_spawn_per_mille: 0,
            timing: AnimationTiming::INSTANT,
            max_cascade_rounds: DEFAULT_MAX_CASCADE_ROUNDS,
            reshuffle_when_stuck: true,
            stabilize_initial_board: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_single_kind() {
        let config = GameConfig {
            kind_count: 1,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::KindCount(1)));
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        let config = GameConfig {
            cols: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Dimensions { cols: 0, .. })
        ));

        let config = GameConfig {
            rows: MAX_GRID_DIM + 1,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timed_duration() {
        let config = GameConfig {
            mode: SessionMode::Timed { duration_ms: 0 },
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDuration));
    }

    #[test]
    fn test_phase_durations() {
        let timing = AnimationTiming::STANDARD;
        assert_eq!(timing.phase_ms(Phase::Reverting), SWAP_MS);
        assert_eq!(timing.phase_ms(Phase::Detonating), CLEAR_MS);
        assert_eq!(timing.phase_ms(Phase::Idle), 0);
        assert_eq!(AnimationTiming::default(), AnimationTiming::INSTANT);
    }
}
