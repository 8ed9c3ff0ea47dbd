//! Match configuration supplied by the caller at match creation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_TICK_MS: u64 = 200;
const DEFAULT_BASE_HP: u32 = 100;
const DEFAULT_INITIAL_COST: f64 = 10.0;
const DEFAULT_MAX_COST: f64 = 20.0;
const DEFAULT_COST_RECOVERY: f64 = 0.6;

/// Tunables fixed for the lifetime of a match.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Length of one tick in milliseconds.
    pub tick_ms: u64,
    /// Hit points both bases start with.
    pub initial_base_hp: u32,
    /// Cost both sides start with.
    pub initial_cost: f64,
    /// Ceiling for either side's cost.
    pub max_cost: f64,
    /// Cost regenerated per tick for each side.
    pub cost_recovery_per_tick: f64,
}

impl MatchConfig {
    /// Length of one tick.
    #[must_use]
    pub const fn tick_duration(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Checks that the configuration can drive a match.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if self.initial_base_hp == 0 {
            return Err(ConfigError::ZeroBaseHp);
        }
        for (field, value) in [
            ("initial_cost", self.initial_cost),
            ("max_cost", self.max_cost),
            ("cost_recovery_per_tick", self.cost_recovery_per_tick),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidCost { field, value });
            }
        }
        if self.initial_cost > self.max_cost {
            return Err(ConfigError::InitialCostAboveMax {
                initial: self.initial_cost,
                max: self.max_cost,
            });
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            initial_base_hp: DEFAULT_BASE_HP,
            initial_cost: DEFAULT_INITIAL_COST,
            max_cost: DEFAULT_MAX_COST,
            cost_recovery_per_tick: DEFAULT_COST_RECOVERY,
        }
    }
}

/// Reasons a [`MatchConfig`] is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Ticks must advance the clock.
    #[error("tick_ms must be greater than zero")]
    ZeroTick,
    /// Bases must start alive.
    #[error("initial_base_hp must be greater than zero")]
    ZeroBaseHp,
    /// A cost field is negative or not finite.
    #[error("{field} must be a finite, non-negative number, got {value}")]
    InvalidCost {
        /// Name of the offending field.
        field: &'static str,
        /// Value supplied.
        value: f64,
    },
    /// The starting cost exceeds the ceiling.
    #[error("initial_cost {initial} exceeds max_cost {max}")]
    InitialCostAboveMax {
        /// Starting cost supplied.
        initial: f64,
        /// Ceiling supplied.
        max: f64,
    },
}
