//! Ordered phases that make up one tick.
//!
//! Each phase takes the battlefield by value and hands back the transformed
//! battlefield together with the events it produced. [`run`] threads a
//! battlefield through [`PHASES`] in order; the caller commits the result
//! only once every phase has completed.

use lane_battle_core::{BaseHealth, Combatant, Side, TimedEvent};
use lane_battle_system_combat as combat;
use lane_battle_system_victory as victory;

/// Mutable portion of a match that a tick transforms.
#[derive(Clone, Debug, PartialEq)]
pub struct Battlefield {
    /// Simulated time elapsed in milliseconds.
    pub elapsed_ms: u64,
    /// Hit points remaining on both bases.
    pub bases: BaseHealth,
    /// Cost available to the player.
    pub player_cost: f64,
    /// Cost available to the AI.
    pub ai_cost: f64,
    /// Live combatants in spawn order.
    pub units: Vec<Combatant>,
    /// Winner, once decided.
    pub winner: Option<Side>,
}

impl Battlefield {
    /// Creates an empty battlefield at time zero.
    #[must_use]
    pub fn new(initial_base_hp: u32, initial_cost: f64) -> Self {
        Self {
            elapsed_ms: 0,
            bases: BaseHealth::new(initial_base_hp),
            player_cost: initial_cost,
            ai_cost: initial_cost,
            units: Vec::new(),
            winner: None,
        }
    }

    /// Cost available to `side`.
    #[must_use]
    pub fn cost(&self, side: Side) -> f64 {
        match side {
            Side::Player => self.player_cost,
            Side::Ai => self.ai_cost,
        }
    }

    pub(crate) fn cost_mut(&mut self, side: Side) -> &mut f64 {
        match side {
            Side::Player => &mut self.player_cost,
            Side::Ai => &mut self.ai_cost,
        }
    }
}

/// Fixed parameters shared by every phase of one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickContext {
    /// Tick length in milliseconds.
    pub tick_ms: u64,
    /// Clock value stamped on every event of the tick.
    pub timestamp_ms: u64,
    /// Cost regenerated per tick for each side.
    pub cost_recovery_per_tick: f64,
    /// Ceiling for either side's cost.
    pub max_cost: f64,
}

impl TickContext {
    /// Tick length in seconds.
    #[must_use]
    pub fn tick_seconds(&self) -> f64 {
        self.tick_ms as f64 / 1000.0
    }
}

/// Signature shared by every phase.
pub type Phase = fn(Battlefield, &TickContext) -> (Battlefield, Vec<TimedEvent>);

/// Tick phases in execution order, paired with their names.
pub const PHASES: [(&str, Phase); 8] = [
    ("decay_cooldowns", decay_cooldowns),
    ("advance_units", advance_units),
    ("resolve_base_arrivals", resolve_base_arrivals),
    ("resolve_attacks", resolve_attacks),
    ("cull_dead", cull_dead),
    ("recover_cost", recover_cost),
    ("decide_winner", decide_winner),
    ("advance_clock", advance_clock),
];

/// Runs every phase in order and concatenates their events.
#[must_use]
pub fn run(mut field: Battlefield, ctx: &TickContext) -> (Battlefield, Vec<TimedEvent>) {
    let mut events = Vec::new();
    for (_, phase) in PHASES {
        let (next, mut emitted) = phase(field, ctx);
        events.append(&mut emitted);
        field = next;
    }
    (field, events)
}

/// Counts every combatant's attack cooldown down by one tick.
pub fn decay_cooldowns(
    mut field: Battlefield,
    ctx: &TickContext,
) -> (Battlefield, Vec<TimedEvent>) {
    let seconds = ctx.tick_seconds();
    for unit in &mut field.units {
        combat::update_cooldown(unit, seconds);
    }
    (field, Vec::new())
}

/// Moves combatants in roster order; each sees enemies where they stand at that moment.
pub fn advance_units(mut field: Battlefield, ctx: &TickContext) -> (Battlefield, Vec<TimedEvent>) {
    let seconds = ctx.tick_seconds();
    let mut events = Vec::new();

    for index in 0..field.units.len() {
        let (before, rest) = field.units.split_at_mut(index);
        let Some((unit, after)) = rest.split_first_mut() else {
            break;
        };

        let side = unit.side();
        let enemies = before
            .iter()
            .chain(after.iter())
            .filter(|other| other.side() != side);
        if let Some(event) = combat::move_unit(unit, enemies, seconds) {
            events.push(TimedEvent::new(ctx.timestamp_ms, event));
        }
    }

    (field, events)
}

/// Damages bases for combatants that reached them and removes those combatants.
pub fn resolve_base_arrivals(
    mut field: Battlefield,
    ctx: &TickContext,
) -> (Battlefield, Vec<TimedEvent>) {
    let mut events = Vec::new();
    let Battlefield { units, bases, .. } = &mut field;

    units.retain(|unit| !victory::check_base_reached(unit, bases, ctx.timestamp_ms, &mut events));

    (field, events)
}

/// Resolves attacks: player combatants first, then AI combatants, each in roster order.
///
/// Casualties stay on the roster until [`cull_dead`], so a combatant killed
/// earlier in the phase still attacks and can still be targeted.
pub fn resolve_attacks(
    mut field: Battlefield,
    ctx: &TickContext,
) -> (Battlefield, Vec<TimedEvent>) {
    let mut events = Vec::new();
    let player = indices_of(&field.units, Side::Player);
    let ai = indices_of(&field.units, Side::Ai);

    for (attackers, defenders) in [(&player, &ai), (&ai, &player)] {
        for &attacker in attackers {
            let candidates = defenders.iter().map(|&index| &field.units[index]);
            let Some(choice) = combat::nearest_enemy_index(&field.units[attacker], candidates)
            else {
                continue;
            };
            let (attacker, target) = pair_mut(&mut field.units, attacker, defenders[choice]);
            combat::try_attack(attacker, target, ctx.timestamp_ms, &mut events);
        }
    }

    (field, events)
}

/// Removes every combatant without hit points.
pub fn cull_dead(mut field: Battlefield, _ctx: &TickContext) -> (Battlefield, Vec<TimedEvent>) {
    combat::remove_dead(&mut field.units);
    (field, Vec::new())
}

/// Regenerates both sides' cost up to the ceiling.
pub fn recover_cost(mut field: Battlefield, ctx: &TickContext) -> (Battlefield, Vec<TimedEvent>) {
    for side in Side::ALL {
        let cost = field.cost_mut(side);
        *cost = (*cost + ctx.cost_recovery_per_tick).min(ctx.max_cost);
    }
    (field, Vec::new())
}

/// Records the winner once a base has fallen.
pub fn decide_winner(mut field: Battlefield, _ctx: &TickContext) -> (Battlefield, Vec<TimedEvent>) {
    if let Some(winner) = victory::determine_winner(&field.bases) {
        field.winner = Some(winner);
    }
    (field, Vec::new())
}

/// Advances the match clock by one tick.
pub fn advance_clock(mut field: Battlefield, ctx: &TickContext) -> (Battlefield, Vec<TimedEvent>) {
    field.elapsed_ms = field.elapsed_ms.saturating_add(ctx.tick_ms);
    (field, Vec::new())
}

fn indices_of(units: &[Combatant], side: Side) -> Vec<usize> {
    units
        .iter()
        .enumerate()
        .filter(|(_, unit)| unit.side() == side)
        .map(|(index, _)| index)
        .collect()
}

fn pair_mut(
    units: &mut [Combatant],
    first: usize,
    second: usize,
) -> (&mut Combatant, &mut Combatant) {
    debug_assert_ne!(first, second, "a combatant cannot fight itself");
    if first < second {
        let (before, after) = units.split_at_mut(second);
        (&mut before[first], &mut after[0])
    } else {
        let (before, after) = units.split_at_mut(first);
        (&mut after[0], &mut before[second])
    }
}
