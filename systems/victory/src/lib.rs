#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Base arrival and win-condition rules.

use lane_battle_core::{
    BaseHealth, Combatant, DeathReason, Event, Side, TimedEvent, LANE_END, LANE_START,
};

/// Reports whether `unit` has crossed into the opposing base.
#[must_use]
pub fn has_reached_base(unit: &Combatant) -> bool {
    match unit.side() {
        Side::Player => unit.position() >= LANE_END,
        Side::Ai => unit.position() <= LANE_START,
    }
}

/// Applies base damage for a unit that walked into the opposing base.
///
/// Emits [`Event::BaseDamage`] followed by a [`Event::Death`] with
/// [`DeathReason::ReachedBase`] and returns `true`; the caller removes the
/// unit from the roster. Units short of the base produce nothing.
pub fn check_base_reached(
    unit: &Combatant,
    bases: &mut BaseHealth,
    timestamp_ms: u64,
    out: &mut Vec<TimedEvent>,
) -> bool {
    if !has_reached_base(unit) {
        return false;
    }

    let defender = unit.side().opponent();
    let damage = unit.stats().attack();
    let remaining_hp = bases.damage(defender, damage);

    out.push(TimedEvent::new(
        timestamp_ms,
        Event::BaseDamage {
            side: defender,
            damage,
            remaining_hp,
            attacker_id: unit.id(),
            attacker_side: unit.side(),
        },
    ));
    out.push(TimedEvent::new(
        timestamp_ms,
        Event::Death {
            instance_id: unit.id(),
            template_id: unit.template_id(),
            side: unit.side(),
            position: unit.position(),
            reason: Some(DeathReason::ReachedBase),
        },
    ));

    true
}

/// Decides the winner from the remaining base hit points.
///
/// When both bases fall in the same tick the AI is awarded the win.
#[must_use]
pub fn determine_winner(bases: &BaseHealth) -> Option<Side> {
    let player_down = bases.hp(Side::Player) == 0;
    let ai_down = bases.hp(Side::Ai) == 0;

    match (player_down, ai_down) {
        (true, _) => Some(Side::Ai),
        (false, true) => Some(Side::Player),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standing_bases_produce_no_winner() {
        assert_eq!(determine_winner(&BaseHealth::new(100)), None);
    }

    #[test]
    fn fallen_player_base_hands_win_to_ai() {
        assert_eq!(
            determine_winner(&BaseHealth::from_parts(0, 50)),
            Some(Side::Ai)
        );
    }

    #[test]
    fn fallen_ai_base_hands_win_to_player() {
        assert_eq!(
            determine_winner(&BaseHealth::from_parts(12, 0)),
            Some(Side::Player)
        );
    }

    #[test]
    fn simultaneous_destruction_favours_ai() {
        assert_eq!(
            determine_winner(&BaseHealth::from_parts(0, 0)),
            Some(Side::Ai)
        );
    }
}
