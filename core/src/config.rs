//! Game configuration loaded from TOML.
//!
//! Every field has a default, so a configuration file only needs to list the
//! values it overrides. [`GameConfig::validate`] enforces the ranges the
//! engine relies on; [`GameConfig::from_toml_str`] parses and validates in one
//! step.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Difficulty, TileValue, TARGET_SUM};

const SUPPORTED_GRID_SIZES: [u32; 2] = [5, 6];
const SUPPORTED_MAX_VALUES: [TileValue; 2] = [5, 6];

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML source could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The target sum is fixed by the game rules.
    #[error("target sum must be 10, found {0}")]
    TargetSum(u32),
    /// A tier requested an unsupported board size.
    #[error("{difficulty:?}: grid size must be 5 or 6, found {found}")]
    GridSize {
        /// Tier carrying the invalid value.
        difficulty: Difficulty,
        /// Value found in the configuration.
        found: u32,
    },
    /// A tier requested an unsupported tile value range.
    #[error("{difficulty:?}: max tile value must be 5 or 6, found {found}")]
    MaxValue {
        /// Tier carrying the invalid value.
        difficulty: Difficulty,
        /// Value found in the configuration.
        found: TileValue,
    },
    /// A spawn weight table does not cover exactly `0..=max_value`.
    #[error("{difficulty:?}: expected {expected} spawn weights, found {found}")]
    WeightCount {
        /// Tier carrying the invalid table.
        difficulty: Difficulty,
        /// `max_value + 1`.
        expected: usize,
        /// Length of the configured table.
        found: usize,
    },
    /// A spawn weight is negative or not finite.
    #[error("{difficulty:?}: spawn weight {index} is invalid ({value})")]
    Weight {
        /// Tier carrying the invalid weight.
        difficulty: Difficulty,
        /// Position of the weight in the table.
        index: usize,
        /// Offending value.
        value: f32,
    },
    /// The fallback spawn value exceeds a tier's value range.
    #[error("{difficulty:?}: fallback spawn value {fallback} exceeds max value {max_value}")]
    FallbackValue {
        /// Tier whose range is exceeded.
        difficulty: Difficulty,
        /// Configured fallback.
        fallback: TileValue,
        /// Tier's maximum tile value.
        max_value: TileValue,
    },
    /// A timing or multiplier parameter is out of range.
    #[error("{field} is out of range ({value})")]
    Parameter {
        /// Name of the field.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
}

/// Probability distribution over tile values `0..=max_value`.
///
/// Weights are expected to sum to roughly `1.0`; they are not normalised.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpawnWeights(Vec<f32>);

impl SpawnWeights {
    /// Wraps a weight table indexed by tile value.
    #[must_use]
    pub fn new(weights: Vec<f32>) -> Self {
        Self(weights)
    }

    /// Raw weights indexed by tile value.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Maps a uniform roll in `[0, 1)` onto a tile value.
    ///
    /// Weights are accumulated in value order until the running total exceeds
    /// the roll. Returns `None` when rounding error or a degenerate table
    /// (for example all zeros) leaves the roll uncovered.
    #[must_use]
    pub fn sample(&self, roll: f32) -> Option<TileValue> {
        let mut cumulative = 0.0_f32;
        for (value, weight) in self.0.iter().enumerate() {
            cumulative += weight;
            if roll < cumulative {
                return TileValue::try_from(value).ok();
            }
        }
        None
    }
}

/// Board shape and spawn distribution for one difficulty tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    /// Width and height of the square board.
    pub grid_size: u32,
    /// Largest tile value that can spawn.
    pub max_value: TileValue,
    /// Distribution over `0..=max_value`.
    pub spawn_weights: SpawnWeights,
}

impl DifficultyConfig {
    fn validate(&self, difficulty: Difficulty, fallback: TileValue) -> Result<(), ConfigError> {
        if !SUPPORTED_GRID_SIZES.contains(&self.grid_size) {
            return Err(ConfigError::GridSize {
                difficulty,
                found: self.grid_size,
            });
        }
        if !SUPPORTED_MAX_VALUES.contains(&self.max_value) {
            return Err(ConfigError::MaxValue {
                difficulty,
                found: self.max_value,
            });
        }

        let expected = usize::from(self.max_value) + 1;
        let weights = self.spawn_weights.as_slice();
        if weights.len() != expected {
            return Err(ConfigError::WeightCount {
                difficulty,
                expected,
                found: weights.len(),
            });
        }
        if let Some((index, value)) = weights
            .iter()
            .enumerate()
            .find(|(_, weight)| !weight.is_finite() || **weight < 0.0)
        {
            return Err(ConfigError::Weight {
                difficulty,
                index,
                value: *value,
            });
        }

        if fallback > self.max_value {
            return Err(ConfigError::FallbackValue {
                difficulty,
                fallback,
                max_value: self.max_value,
            });
        }
        Ok(())
    }
}

/// Per-tier configuration table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTable {
    /// Easy tier.
    pub easy: DifficultyConfig,
    /// Normal tier.
    pub normal: DifficultyConfig,
    /// Hard tier.
    pub hard: DifficultyConfig,
}

impl DifficultyTable {
    /// Configuration for `difficulty`.
    #[must_use]
    pub fn get(&self, difficulty: Difficulty) -> &DifficultyConfig {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: DifficultyConfig {
                grid_size: 5,
                max_value: 5,
                spawn_weights: SpawnWeights::new(vec![0.10, 0.25, 0.25, 0.20, 0.12, 0.08]),
            },
            normal: DifficultyConfig {
                grid_size: 5,
                max_value: 6,
                spawn_weights: SpawnWeights::new(vec![0.08, 0.22, 0.22, 0.18, 0.14, 0.10, 0.06]),
            },
            hard: DifficultyConfig {
                grid_size: 6,
                max_value: 6,
                spawn_weights: SpawnWeights::new(vec![0.12, 0.18, 0.18, 0.16, 0.14, 0.12, 0.10]),
            },
        }
    }
}

/// Streak multiplier tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplierConfig {
    /// Multiplier granted by the second consecutive solve.
    pub starting: f32,
    /// Length of the multiplier window in seconds.
    pub duration_secs: f32,
    /// Window seconds drained per second of clock time.
    pub drain_rate: f32,
    /// Multiplier added by every solve inside the window.
    pub increment: f32,
    /// Seconds a single pending solve waits for a second before the streak
    /// is dropped.
    pub streak_timeout_secs: f32,
}

impl Default for MultiplierConfig {
    fn default() -> Self {
        Self {
            starting: 1.25,
            duration_secs: 10.0,
            drain_rate: 1.0,
            increment: 0.25,
            streak_timeout_secs: 3.0,
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Sum a line must reach to clear. Fixed at 10.
    pub target_sum: u32,
    /// Points for an unmultiplied solve.
    pub base_score: u32,
    /// Score that wins the session.
    pub win_score: u32,
    /// Length of a session in seconds.
    pub session_secs: f32,
    /// Grace period between reaching the win score and declaring the win.
    pub win_grace_secs: f32,
    /// Presentation delay between `GridUnsolvable` and regeneration.
    pub unsolvable_settle_secs: f32,
    /// Value spawned when a weight table leaves the roll uncovered.
    pub fallback_spawn_value: TileValue,
    /// Streak multiplier tuning.
    pub multiplier: MultiplierConfig,
    /// Per-tier board shapes and spawn weights.
    pub difficulties: DifficultyTable,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            target_sum: TARGET_SUM,
            base_score: 10,
            win_score: 500,
            session_secs: 120.0,
            win_grace_secs: 0.5,
            unsolvable_settle_secs: 0.75,
            fallback_spawn_value: 2,
            multiplier: MultiplierConfig::default(),
            difficulties: DifficultyTable::default(),
        }
    }
}

impl GameConfig {
    /// Parses a TOML document and validates the result.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field against the ranges the engine supports.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_sum != TARGET_SUM {
            return Err(ConfigError::TargetSum(self.target_sum));
        }

        for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            self.difficulties
                .get(difficulty)
                .validate(difficulty, self.fallback_spawn_value)?;
        }

        let multiplier = &self.multiplier;
        check_parameter("multiplier.starting", multiplier.starting, |v| v >= 1.0)?;
        check_parameter("multiplier.duration_secs", multiplier.duration_secs, |v| {
            v > 0.0
        })?;
        check_parameter("multiplier.drain_rate", multiplier.drain_rate, |v| v >= 0.0)?;
        check_parameter("multiplier.increment", multiplier.increment, |v| v >= 0.0)?;
        check_parameter(
            "multiplier.streak_timeout_secs",
            multiplier.streak_timeout_secs,
            |v| v > 0.0,
        )?;
        check_parameter("session_secs", self.session_secs, |v| v > 0.0)?;
        check_parameter("win_grace_secs", self.win_grace_secs, |v| v >= 0.0)?;
        check_parameter("unsolvable_settle_secs", self.unsolvable_settle_secs, |v| {
            v >= 0.0
        })?;
        Ok(())
    }

    /// Configuration for `difficulty`.
    #[must_use]
    pub fn difficulty(&self, difficulty: Difficulty) -> &DifficultyConfig {
        self.difficulties.get(difficulty)
    }
}

fn check_parameter(
    field: &'static str,
    value: f32,
    in_range: impl Fn(f32) -> bool,
) -> Result<(), ConfigError> {
    if value.is_finite() && in_range(value) {
        Ok(())
    } else {
        Err(ConfigError::Parameter { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weight_tables_sum_to_one() {
        let table = DifficultyTable::default();
        for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            let total: f32 = table.get(difficulty).spawn_weights.as_slice().iter().sum();
            assert!((total - 1.0).abs() < 1e-4, "{difficulty:?} sums to {total}");
        }
    }

    #[test]
    fn sample_walks_cumulative_distribution() {
        let weights = SpawnWeights::new(vec![0.5, 0.25, 0.25]);
        assert_eq!(weights.sample(0.0), Some(0));
        assert_eq!(weights.sample(0.49), Some(0));
        assert_eq!(weights.sample(0.5), Some(1));
        assert_eq!(weights.sample(0.99), Some(2));
    }

    #[test]
    fn sample_leaves_uncovered_rolls_to_caller() {
        let zeros = SpawnWeights::new(vec![0.0; 6]);
        assert_eq!(zeros.sample(0.0), None);

        let short = SpawnWeights::new(vec![0.3, 0.3]);
        assert_eq!(short.sample(0.75), None);
    }
}
