#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure balance formulas that rate stat blocks and derive summon costs.
//!
//! Nothing here runs during a match. Templates pass through these functions
//! once, when they are created, so that every stored template carries a cost
//! consistent with its combat strength.

use lane_battle_core::{
    bounds, round_to_hundredths, RawStats, TemplateId, UnitStats, UnitTemplate,
};

/// Power granted per point of summon cost.
pub const POWER_PER_COST: f64 = 20.0;

/// Lowest power score considered playable.
pub const MIN_PLAYABLE_POWER: f64 = 10.0;

/// Highest power score considered playable.
pub const MAX_PLAYABLE_POWER: f64 = 180.0;

/// Largest cost surcharge applied for elaborate generation prompts.
pub const MAX_PROMPT_PENALTY: u8 = 3;

const HP_WEIGHT: f64 = 0.4;
const ATTACK_WEIGHT: f64 = 1.4;
const RANGE_EXPONENT: f64 = 1.5;
const RANGE_WEIGHT: f64 = 8.0;
const SPEED_WEIGHT: f64 = 6.0;
const ATTACK_RATE_WEIGHT: f64 = 10.0;
const RANGE_SCALE_EXPONENT: f64 = 0.667;

const LOW_RETARGET_COST: u8 = 4;
const HIGH_RETARGET_COST: u8 = 5;

/// Computes the composite power score of a stat block, rounded to two decimals.
///
/// Range contributes super-linearly and attack interval inversely; every other
/// stat contributes linearly.
#[must_use]
pub fn power_score(stats: &RawStats) -> f64 {
    let power = stats.max_hp * HP_WEIGHT
        + stats.attack * ATTACK_WEIGHT
        + stats.range.powf(RANGE_EXPONENT) * RANGE_WEIGHT
        + stats.speed * SPEED_WEIGHT
        + (1.0 / stats.attack_interval) * ATTACK_RATE_WEIGHT;
    round_to_hundredths(power)
}

/// Derives the summon cost for a power score: `ceil(power / 20)` clamped to the cost bounds.
#[must_use]
pub fn cost_from_power(power: f64) -> u8 {
    let cost = (power / POWER_PER_COST).ceil();
    if cost.is_nan() {
        return bounds::MIN_COST;
    }
    cost.clamp(f64::from(bounds::MIN_COST), f64::from(bounds::MAX_COST)) as u8
}

/// Rescales a stat block so its power approaches `target_cost * 20`.
///
/// Range scales with `scale^0.667` and attack interval with `1 / scale`; the
/// result is rounded and clamped like any stored stat block.
#[must_use]
pub fn adjust_stats_to_cost(stats: &RawStats, target_cost: u8) -> UnitStats {
    let target_cost = target_cost.clamp(bounds::MIN_COST, bounds::MAX_COST);
    let current_power = power_score(stats);
    let target_power = f64::from(target_cost) * POWER_PER_COST;
    let scale = if current_power == 0.0 {
        1.0
    } else {
        target_power / current_power
    };

    UnitStats::from_raw(&RawStats {
        max_hp: stats.max_hp * scale,
        attack: stats.attack * scale,
        speed: stats.speed * scale,
        range: stats.range * scale.powf(RANGE_SCALE_EXPONENT),
        attack_interval: stats.attack_interval / scale,
    })
}

/// Reports whether every field lies within its bound and the power score is playable.
#[must_use]
pub fn validate_balance(stats: &RawStats) -> bool {
    let within = |value: f64, min: f64, max: f64| (min..=max).contains(&value);

    if !within(stats.max_hp, f64::from(bounds::MIN_HP), f64::from(bounds::MAX_HP))
        || !within(
            stats.attack,
            f64::from(bounds::MIN_ATTACK),
            f64::from(bounds::MAX_ATTACK),
        )
        || !within(stats.range, bounds::MIN_RANGE, bounds::MAX_RANGE)
        || !within(stats.speed, bounds::MIN_SPEED, bounds::MAX_SPEED)
        || !within(
            stats.attack_interval,
            bounds::MIN_ATTACK_INTERVAL,
            bounds::MAX_ATTACK_INTERVAL,
        )
    {
        return false;
    }

    within(power_score(stats), MIN_PLAYABLE_POWER, MAX_PLAYABLE_POWER)
}

/// Cost surcharge for a generation prompt; longer requests cost more.
///
/// Words are runs of alphanumeric characters or underscores. Character count
/// is considered as well so that scripts without word separators are charged.
#[must_use]
pub fn prompt_penalty(prompt: &str) -> u8 {
    let words = prompt
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
        .count();
    let characters = prompt.trim().chars().count();

    let by_words: u8 = if words >= 30 {
        3
    } else if words >= 20 {
        2
    } else if words >= 10 {
        1
    } else {
        0
    };
    let by_characters: u8 = if characters >= 150 {
        3
    } else if characters >= 100 {
        2
    } else if characters >= 50 {
        1
    } else {
        0
    };

    by_words.max(by_characters).min(MAX_PROMPT_PENALTY)
}

/// Turns raw generator output into a stored template.
///
/// Out-of-balance blocks are first rescaled toward cost 4 (weak blocks) or 5
/// (strong blocks). The cost is then derived from the final stats and the
/// prompt surcharge is added, capped at the maximum cost.
#[must_use]
pub fn finalize_template(
    id: TemplateId,
    name: &str,
    raw: &RawStats,
    prompt: Option<&str>,
) -> UnitTemplate {
    let stats = if validate_balance(raw) {
        UnitStats::from_raw(raw)
    } else {
        let derived = cost_from_power(power_score(raw));
        let target = if derived < LOW_RETARGET_COST {
            LOW_RETARGET_COST
        } else {
            HIGH_RETARGET_COST
        };
        adjust_stats_to_cost(raw, target)
    };

    let base_cost = cost_from_power(power_score(&stats.to_raw()));
    let penalty = prompt.map_or(0, prompt_penalty);
    let cost = base_cost.saturating_add(penalty).min(bounds::MAX_COST);

    UnitTemplate::new(id, name, cost, stats)
}
