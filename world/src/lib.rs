#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match state and the tick engine that advances it.
//!
//! A [`Match`] is only ever mutated through [`apply`]. Ticks run the
//! [`pipeline`] against a copy of the battlefield and commit it once every
//! phase has completed; spawns validate every precondition before touching
//! state. A rejected command therefore leaves the match exactly as it was.

pub mod pipeline;

use lane_battle_core::{
    Combatant, Command, ConfigError, Deck, Event, MatchConfig, MatchError, MatchId, Side,
    TemplateId, TimedEvent, UnitId,
};
use tracing::{debug, info};

use crate::pipeline::{Battlefield, TickContext};

/// One match between the player and the AI.
#[derive(Clone, Debug)]
pub struct Match {
    id: MatchId,
    config: MatchConfig,
    player_deck: Deck,
    ai_deck: Deck,
    battlefield: Battlefield,
    next_unit_id: u32,
}

impl Match {
    /// Creates a match with both bases and costs at their configured starting values.
    pub fn new(
        id: MatchId,
        config: MatchConfig,
        player_deck: Deck,
        ai_deck: Deck,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id,
            battlefield: Battlefield::new(config.initial_base_hp, config.initial_cost),
            config,
            player_deck,
            ai_deck,
            next_unit_id: 1,
        })
    }

    fn deck(&self, side: Side) -> &Deck {
        match side {
            Side::Player => &self.player_deck,
            Side::Ai => &self.ai_deck,
        }
    }

    fn tick_context(&self) -> TickContext {
        TickContext {
            tick_ms: self.config.tick_ms,
            timestamp_ms: self.battlefield.elapsed_ms,
            cost_recovery_per_tick: self.config.cost_recovery_per_tick,
            max_cost: self.config.max_cost,
        }
    }
}

/// Applies the provided command to the match, appending the resulting events to `out_events`.
///
/// Ticking a finished match is a no-op. Spawning fails with a [`MatchError`]
/// and leaves the match unchanged when any precondition is violated.
pub fn apply(
    world: &mut Match,
    command: Command,
    out_events: &mut Vec<TimedEvent>,
) -> Result<(), MatchError> {
    match command {
        Command::Tick => {
            step(world, out_events);
            Ok(())
        }
        Command::Spawn {
            side,
            template,
            cost_check,
        } => spawn(world, side, template, cost_check, out_events),
    }
}

fn step(world: &mut Match, out_events: &mut Vec<TimedEvent>) {
    if world.battlefield.winner.is_some() {
        return;
    }

    let ctx = world.tick_context();
    let (battlefield, mut events) = pipeline::run(world.battlefield.clone(), &ctx);
    world.battlefield = battlefield;

    debug!(
        match_id = %world.id,
        elapsed_ms = ctx.timestamp_ms,
        events = events.len(),
        units = world.battlefield.units.len(),
        "tick resolved"
    );
    if let Some(winner) = world.battlefield.winner {
        info!(
            match_id = %world.id,
            winner = %winner,
            elapsed_ms = world.battlefield.elapsed_ms,
            player_base_hp = world.battlefield.bases.hp(Side::Player),
            ai_base_hp = world.battlefield.bases.hp(Side::Ai),
            "match decided"
        );
    }

    out_events.append(&mut events);
}

fn spawn(
    world: &mut Match,
    side: Side,
    template_id: TemplateId,
    cost_check: bool,
    out_events: &mut Vec<TimedEvent>,
) -> Result<(), MatchError> {
    if world.battlefield.winner.is_some() {
        return Err(MatchError::MatchFinished);
    }

    let template = world
        .deck(side)
        .get(template_id)
        .ok_or(MatchError::UnknownTemplate {
            side,
            template: template_id,
        })?;
    let available = world.battlefield.cost(side);
    let required = template.cost();
    if cost_check && available < f64::from(required) {
        return Err(MatchError::InsufficientCost {
            side,
            required,
            available,
        });
    }

    let unit = Combatant::spawn(UnitId::new(world.next_unit_id), template, side);
    let stats = *unit.stats();
    let event = Event::Spawn {
        instance_id: unit.id(),
        template_id: unit.template_id(),
        side,
        position: unit.position(),
        hp: unit.hp(),
        max_hp: stats.max_hp(),
        attack: stats.attack(),
        speed: stats.speed(),
        range: stats.range(),
        attack_interval: stats.attack_interval(),
    };

    debug!(
        match_id = %world.id,
        side = %side,
        template = %template_id,
        instance_id = unit.id().get(),
        cost = required,
        "unit spawned"
    );

    world.next_unit_id = world.next_unit_id.saturating_add(1);
    world.battlefield.units.push(unit);
    *world.battlefield.cost_mut(side) = (available - f64::from(required)).max(0.0);
    out_events.push(TimedEvent::new(world.battlefield.elapsed_ms, event));
    Ok(())
}

/// Query functions that provide read-only access to the match state.
pub mod query {
    use lane_battle_core::{Combatant, Deck, MatchSnapshot, Side};

    use super::Match;

    /// Deck available to `side`.
    #[must_use]
    pub fn deck(world: &Match, side: Side) -> &Deck {
        world.deck(side)
    }

    /// Live combatants in spawn order.
    #[must_use]
    pub fn units(world: &Match) -> &[Combatant] {
        &world.battlefield.units
    }

    /// Simulated time elapsed in milliseconds.
    #[must_use]
    pub fn elapsed_ms(world: &Match) -> u64 {
        world.battlefield.elapsed_ms
    }

    /// Cost available to `side`.
    #[must_use]
    pub fn cost(world: &Match, side: Side) -> f64 {
        world.battlefield.cost(side)
    }

    /// Hit points remaining on the base owned by `side`.
    #[must_use]
    pub fn base_hp(world: &Match, side: Side) -> u32 {
        world.battlefield.bases.hp(side)
    }

    /// Winner, once decided.
    #[must_use]
    pub fn winner(world: &Match) -> Option<Side> {
        world.battlefield.winner
    }

    /// Reports whether the match has reached its terminal state.
    #[must_use]
    pub fn is_finished(world: &Match) -> bool {
        world.battlefield.winner.is_some()
    }

    /// Captures a serializable copy of the whole match.
    #[must_use]
    pub fn snapshot(world: &Match) -> MatchSnapshot {
        let field = &world.battlefield;
        MatchSnapshot {
            match_id: world.id,
            tick_ms: world.config.tick_ms,
            elapsed_ms: field.elapsed_ms,
            player_base_hp: field.bases.hp(Side::Player),
            ai_base_hp: field.bases.hp(Side::Ai),
            player_cost: field.player_cost,
            ai_cost: field.ai_cost,
            max_cost: world.config.max_cost,
            cost_recovery_per_tick: world.config.cost_recovery_per_tick,
            units: field.units.iter().map(Combatant::snapshot).collect(),
            winner: field.winner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_battle_core::{UnitStats, UnitTemplate, DECK_SIZE};

    fn deck(first_id: u32) -> Deck {
        let templates = (0..DECK_SIZE as u32)
            .map(|offset| {
                UnitTemplate::new(
                    TemplateId::new(first_id + offset),
                    "squire",
                    2,
                    UnitStats::new(10, 3, 1.0, 1.0, 2.0),
                )
            })
            .collect();
        Deck::new(templates).expect("valid deck")
    }

    #[test]
    fn new_match_rejects_invalid_config() {
        let config = MatchConfig {
            tick_ms: 0,
            ..MatchConfig::default()
        };
        let result = Match::new(MatchId::random(), config, deck(1), deck(10));
        assert_eq!(result.err(), Some(ConfigError::ZeroTick));
    }

    #[test]
    fn unit_ids_are_never_reused() {
        let mut world = Match::new(MatchId::random(), MatchConfig::default(), deck(1), deck(10))
            .expect("valid match");
        let mut events = Vec::new();
        for template in [1, 2, 3] {
            apply(
                &mut world,
                Command::Spawn {
                    side: Side::Player,
                    template: TemplateId::new(template),
                    cost_check: true,
                },
                &mut events,
            )
            .expect("affordable spawn");
        }

        let ids: Vec<u32> = query::units(&world).iter().map(|unit| unit.id().get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn spawns_use_the_issuing_side_deck() {
        let mut world = Match::new(MatchId::random(), MatchConfig::default(), deck(1), deck(10))
            .expect("valid match");
        let mut events = Vec::new();

        let error = apply(
            &mut world,
            Command::Spawn {
                side: Side::Ai,
                template: TemplateId::new(1),
                cost_check: true,
            },
            &mut events,
        )
        .expect_err("player template rejected for ai");

        assert_eq!(
            error,
            MatchError::UnknownTemplate {
                side: Side::Ai,
                template: TemplateId::new(1),
            }
        );
        assert!(events.is_empty());
    }
}
