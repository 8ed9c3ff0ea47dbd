#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the lane battle engine.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative match world, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then returns [`TimedEvent`] values describing
//! what happened during the call. Systems operate on [`Combatant`] values and
//! read-only [`MatchSnapshot`] views and never own match state themselves.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

mod combatant;
mod config;
mod event;

pub use combatant::Combatant;
pub use config::{ConfigError, MatchConfig};
pub use event::{DeathReason, Event, EventKind, TimedEvent};

/// Lane coordinate of the player base; player units spawn here.
pub const LANE_START: f64 = 0.0;

/// Lane coordinate of the AI base; AI units spawn here.
pub const LANE_END: f64 = 20.0;

/// Smallest positional change that is reported as movement.
pub const MOVE_EPSILON: f64 = 0.001;

/// Number of templates that make up a deck.
pub const DECK_SIZE: usize = 5;

/// Inclusive bounds that every stored stat block satisfies.
pub mod bounds {
    /// Cheapest summon cost.
    pub const MIN_COST: u8 = 1;
    /// Most expensive summon cost.
    pub const MAX_COST: u8 = 8;
    /// Lowest maximum hit points.
    pub const MIN_HP: u32 = 5;
    /// Highest maximum hit points.
    pub const MAX_HP: u32 = 30;
    /// Lowest attack damage.
    pub const MIN_ATTACK: u32 = 1;
    /// Highest attack damage.
    pub const MAX_ATTACK: u32 = 15;
    /// Slowest movement speed in lane squares per second.
    pub const MIN_SPEED: f64 = 0.2;
    /// Fastest movement speed in lane squares per second.
    pub const MAX_SPEED: f64 = 2.0;
    /// Shortest attack range in lane squares.
    pub const MIN_RANGE: f64 = 1.0;
    /// Longest attack range in lane squares.
    pub const MAX_RANGE: f64 = 7.0;
    /// Shortest delay between attacks in seconds.
    pub const MIN_ATTACK_INTERVAL: f64 = 1.0;
    /// Longest delay between attacks in seconds.
    pub const MAX_ATTACK_INTERVAL: f64 = 5.0;
}

/// One of the two competing sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The human player, defending the base at [`LANE_START`].
    Player,
    /// The computer opponent, defending the base at [`LANE_END`].
    Ai,
}

impl Side {
    /// Both sides in deterministic resolution order.
    pub const ALL: [Side; 2] = [Side::Player, Side::Ai];

    /// Returns the opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Ai,
            Self::Ai => Self::Player,
        }
    }

    /// Lane coordinate where units of this side enter the match.
    #[must_use]
    pub const fn spawn_position(self) -> f64 {
        match self {
            Self::Player => LANE_START,
            Self::Ai => LANE_END,
        }
    }

    /// Direction of travel along the lane: `1.0` toward the AI base, `-1.0` toward the player base.
    #[must_use]
    pub const fn heading(self) -> f64 {
        match self {
            Self::Player => 1.0,
            Self::Ai => -1.0,
        }
    }

    /// Wire name of the side.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Ai => "ai",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identifier assigned to a spawned combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a unit template by the storage layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(u32);

impl TemplateId {
    /// Creates a new template identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template#{}", self.0)
    }
}

/// Unique identifier assigned to a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchId(Uuid);

impl MatchId {
    /// Allocates a fresh random match identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Unvalidated stat block, as produced by an external generator.
///
/// Values may lie outside [`bounds`]; convert with [`UnitStats::from_raw`]
/// before storing them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawStats {
    /// Maximum hit points.
    pub max_hp: f64,
    /// Damage dealt per attack.
    pub attack: f64,
    /// Movement speed in lane squares per second.
    pub speed: f64,
    /// Attack reach in lane squares.
    pub range: f64,
    /// Seconds between attacks.
    pub attack_interval: f64,
}

/// Stat block whose fields always lie within [`bounds`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawStats", into = "RawStats")]
pub struct UnitStats {
    max_hp: u32,
    attack: u32,
    speed: f64,
    range: f64,
    attack_interval: f64,
}

impl UnitStats {
    /// Creates a stat block, clamping every field into its bound.
    #[must_use]
    pub fn new(max_hp: u32, attack: u32, speed: f64, range: f64, attack_interval: f64) -> Self {
        Self {
            max_hp: max_hp.clamp(bounds::MIN_HP, bounds::MAX_HP),
            attack: attack.clamp(bounds::MIN_ATTACK, bounds::MAX_ATTACK),
            speed: clamp_finite(speed, bounds::MIN_SPEED, bounds::MAX_SPEED),
            range: clamp_finite(range, bounds::MIN_RANGE, bounds::MAX_RANGE),
            attack_interval: clamp_finite(
                attack_interval,
                bounds::MIN_ATTACK_INTERVAL,
                bounds::MAX_ATTACK_INTERVAL,
            ),
        }
    }

    /// Converts generator output into a stored stat block.
    ///
    /// Hit points and attack are rounded to whole numbers, the remaining
    /// fields to two decimals, and every field is then clamped.
    #[must_use]
    pub fn from_raw(raw: &RawStats) -> Self {
        Self::new(
            round_whole(raw.max_hp, bounds::MIN_HP, bounds::MAX_HP),
            round_whole(raw.attack, bounds::MIN_ATTACK, bounds::MAX_ATTACK),
            round_to_hundredths(raw.speed),
            round_to_hundredths(raw.range),
            round_to_hundredths(raw.attack_interval),
        )
    }

    /// Widens the stat block back into raw form.
    #[must_use]
    pub fn to_raw(&self) -> RawStats {
        RawStats {
            max_hp: f64::from(self.max_hp),
            attack: f64::from(self.attack),
            speed: self.speed,
            range: self.range,
            attack_interval: self.attack_interval,
        }
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max_hp(&self) -> u32 {
        self.max_hp
    }

    /// Damage dealt per attack.
    #[must_use]
    pub const fn attack(&self) -> u32 {
        self.attack
    }

    /// Movement speed in lane squares per second.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Attack reach in lane squares.
    #[must_use]
    pub const fn range(&self) -> f64 {
        self.range
    }

    /// Seconds between attacks.
    #[must_use]
    pub const fn attack_interval(&self) -> f64 {
        self.attack_interval
    }
}

impl From<RawStats> for UnitStats {
    fn from(raw: RawStats) -> Self {
        Self::from_raw(&raw)
    }
}

impl From<UnitStats> for RawStats {
    fn from(stats: UnitStats) -> Self {
        stats.to_raw()
    }
}

/// Rounds a value to two decimal places.
#[must_use]
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round_whole(value: f64, min: u32, max: u32) -> u32 {
    if value.is_nan() {
        return min;
    }
    let rounded = value.round().clamp(f64::from(min), f64::from(max));
    rounded as u32
}

fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Immutable blueprint for a unit type.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnitTemplate {
    id: TemplateId,
    name: String,
    cost: u8,
    stats: UnitStats,
}

impl UnitTemplate {
    /// Creates a template, clamping the cost into its bound.
    #[must_use]
    pub fn new(id: TemplateId, name: impl Into<String>, cost: u8, stats: UnitStats) -> Self {
        Self {
            id,
            name: name.into(),
            cost: cost.clamp(bounds::MIN_COST, bounds::MAX_COST),
            stats,
        }
    }

    /// Identifier assigned by the storage layer.
    #[must_use]
    pub const fn id(&self) -> TemplateId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Summon cost.
    #[must_use]
    pub const fn cost(&self) -> u8 {
        self.cost
    }

    /// Combat stats copied into every spawned combatant.
    #[must_use]
    pub const fn stats(&self) -> &UnitStats {
        &self.stats
    }
}

/// Fixed selection of templates a side may spawn during a match.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Deck {
    templates: Vec<UnitTemplate>,
}

impl Deck {
    /// Creates a deck from exactly [`DECK_SIZE`] templates.
    pub fn new(templates: Vec<UnitTemplate>) -> Result<Self, DeckError> {
        if templates.len() != DECK_SIZE {
            return Err(DeckError::WrongSize {
                found: templates.len(),
            });
        }
        Ok(Self { templates })
    }

    /// Looks up a template by identifier.
    #[must_use]
    pub fn get(&self, id: TemplateId) -> Option<&UnitTemplate> {
        self.templates.iter().find(|template| template.id() == id)
    }

    /// Iterator over the templates in deck order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitTemplate> {
        self.templates.iter()
    }
}

/// Reasons a deck cannot be assembled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DeckError {
    /// The deck did not contain exactly [`DECK_SIZE`] templates.
    #[error("deck must contain exactly {DECK_SIZE} templates, found {found}")]
    WrongSize {
        /// Number of templates supplied.
        found: usize,
    },
}

/// Hit points remaining on both bases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseHealth {
    player: u32,
    ai: u32,
}

impl BaseHealth {
    /// Creates both bases with the same starting hit points.
    #[must_use]
    pub const fn new(initial: u32) -> Self {
        Self {
            player: initial,
            ai: initial,
        }
    }

    /// Creates bases with explicit hit points per side.
    #[must_use]
    pub const fn from_parts(player: u32, ai: u32) -> Self {
        Self { player, ai }
    }

    /// Hit points remaining on the base owned by `side`.
    #[must_use]
    pub const fn hp(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player,
            Side::Ai => self.ai,
        }
    }

    /// Damages the base owned by `side`, saturating at zero, and returns the remaining hit points.
    pub fn damage(&mut self, side: Side, amount: u32) -> u32 {
        let slot = match side {
            Side::Player => &mut self.player,
            Side::Ai => &mut self.ai,
        };
        *slot = slot.saturating_sub(amount);
        *slot
    }
}

/// Commands that express all permissible match mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Advances the match by one fixed tick.
    Tick,
    /// Requests that a side summon a unit from its deck.
    Spawn {
        /// Side paying for and owning the new unit.
        side: Side,
        /// Template to instantiate.
        template: TemplateId,
        /// Rejects the spawn when the side cannot afford the template.
        /// Without the check the cost is drained, never below zero.
        cost_check: bool,
    },
}

/// Recoverable precondition failures reported by the match world.
///
/// A rejected command never mutates the match.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum MatchError {
    /// The match already has a winner.
    #[error("match already finished")]
    MatchFinished,
    /// The template is not part of the issuing side's deck.
    #[error("{template} is not in the {side} deck")]
    UnknownTemplate {
        /// Side that issued the spawn.
        side: Side,
        /// Template that was requested.
        template: TemplateId,
    },
    /// The issuing side cannot afford the template.
    #[error("insufficient cost for {side}: required {required}, available {available:.2}")]
    InsufficientCost {
        /// Side that issued the spawn.
        side: Side,
        /// Cost of the template.
        required: u8,
        /// Cost the side had available.
        available: f64,
    },
}

/// Immutable representation of a combatant used for queries and clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    /// Identifier assigned when the unit spawned.
    pub instance_id: UnitId,
    /// Template the unit was spawned from.
    pub template_id: TemplateId,
    /// Owning side.
    pub side: Side,
    /// Lane coordinate.
    pub position: f64,
    /// Remaining hit points.
    pub hp: u32,
    /// Seconds until the next attack is allowed.
    pub cooldown: f64,
    /// Stats frozen at spawn time.
    pub stats: UnitStats,
}

/// Read-only copy of an entire match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Identifier of the match.
    pub match_id: MatchId,
    /// Fixed tick length in milliseconds.
    pub tick_ms: u64,
    /// Simulated time elapsed in milliseconds.
    pub elapsed_ms: u64,
    /// Hit points remaining on the player base.
    pub player_base_hp: u32,
    /// Hit points remaining on the AI base.
    pub ai_base_hp: u32,
    /// Cost available to the player.
    pub player_cost: f64,
    /// Cost available to the AI.
    pub ai_cost: f64,
    /// Ceiling for either side's cost.
    pub max_cost: f64,
    /// Cost regenerated per tick for each side.
    pub cost_recovery_per_tick: f64,
    /// Live combatants in spawn order.
    pub units: Vec<CombatantSnapshot>,
    /// Winner, once decided.
    pub winner: Option<Side>,
}

impl MatchSnapshot {
    /// Cost available to `side`.
    #[must_use]
    pub fn cost(&self, side: Side) -> f64 {
        match side {
            Side::Player => self.player_cost,
            Side::Ai => self.ai_cost,
        }
    }

    /// Hit points remaining on the base owned by `side`.
    #[must_use]
    pub fn base_hp(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player_base_hp,
            Side::Ai => self.ai_base_hp,
        }
    }

    /// Iterator over the live combatants owned by `side`.
    pub fn units_of(&self, side: Side) -> impl Iterator<Item = &CombatantSnapshot> {
        self.units.iter().filter(move |unit| unit.side == side)
    }

    /// Reports whether a winner has been decided.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_are_clamped_into_bounds() {
        let stats = UnitStats::new(100, 0, 9.0, 0.1, 0.5);
        assert_eq!(stats.max_hp(), bounds::MAX_HP);
        assert_eq!(stats.attack(), bounds::MIN_ATTACK);
        assert!((stats.speed() - bounds::MAX_SPEED).abs() < f64::EPSILON);
        assert!((stats.range() - bounds::MIN_RANGE).abs() < f64::EPSILON);
        assert!((stats.attack_interval() - bounds::MIN_ATTACK_INTERVAL).abs() < f64::EPSILON);
    }

    #[test]
    fn raw_stats_round_before_clamping() {
        let stats = UnitStats::from_raw(&RawStats {
            max_hp: 12.6,
            attack: 4.4,
            speed: 1.234,
            range: 2.999,
            attack_interval: f64::NAN,
        });
        assert_eq!(stats.max_hp(), 13);
        assert_eq!(stats.attack(), 4);
        assert!((stats.speed() - 1.23).abs() < 1e-9);
        assert!((stats.range() - 3.0).abs() < 1e-9);
        assert!((stats.attack_interval() - bounds::MIN_ATTACK_INTERVAL).abs() < f64::EPSILON);
    }

    #[test]
    fn template_cost_is_clamped() {
        let stats = UnitStats::new(10, 5, 1.0, 2.0, 2.0);
        assert_eq!(UnitTemplate::new(TemplateId::new(1), "a", 0, stats).cost(), 1);
        assert_eq!(UnitTemplate::new(TemplateId::new(1), "a", 12, stats).cost(), 8);
    }

    #[test]
    fn deck_requires_exact_size() {
        let stats = UnitStats::new(10, 5, 1.0, 2.0, 2.0);
        let template = UnitTemplate::new(TemplateId::new(1), "a", 3, stats);
        let error = Deck::new(vec![template.clone(); 4]).expect_err("short deck rejected");
        assert_eq!(error, DeckError::WrongSize { found: 4 });
        assert!(Deck::new(vec![template; DECK_SIZE]).is_ok());
    }

    #[test]
    fn base_damage_saturates_at_zero() {
        let mut bases = BaseHealth::new(10);
        assert_eq!(bases.damage(Side::Ai, 4), 6);
        assert_eq!(bases.damage(Side::Ai, 40), 0);
        assert_eq!(bases.hp(Side::Player), 10);
    }

    #[test]
    fn sides_mirror_each_other() {
        for side in Side::ALL {
            assert_eq!(side.opponent().opponent(), side);
            assert!((side.heading() + side.opponent().heading()).abs() < f64::EPSILON);
        }
        assert!((Side::Player.spawn_position() - LANE_START).abs() < f64::EPSILON);
        assert!((Side::Ai.spawn_position() - LANE_END).abs() < f64::EPSILON);
    }

    #[test]
    fn combatant_snapshot_round_trips_through_bincode() {
        let snapshot = CombatantSnapshot {
            instance_id: UnitId::new(3),
            template_id: TemplateId::new(9),
            side: Side::Ai,
            position: 12.5,
            hp: 7,
            cooldown: 0.4,
            stats: UnitStats::new(10, 5, 1.0, 2.0, 2.0),
        };
        let bytes = bincode::serialize(&snapshot).expect("serialize");
        let restored: CombatantSnapshot = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn deserialized_stats_are_clamped() {
        let stats: UnitStats = serde_json::from_str(
            r#"{"max_hp":99,"attack":3,"speed":1.0,"range":2.0,"attack_interval":9.0}"#,
        )
        .expect("parse stats");
        assert_eq!(stats.max_hp(), bounds::MAX_HP);
        assert!((stats.attack_interval() - bounds::MAX_ATTACK_INTERVAL).abs() < f64::EPSILON);
    }
}
