#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure combat rules applied to one combatant, or one attacker and target, at a time.
//!
//! The functions in this crate never look at the match as a whole. The tick
//! engine decides which combatants to feed in and in which order; these rules
//! only decide what happens to the combatants they are given.

use lane_battle_core::{Combatant, Event, TimedEvent, MOVE_EPSILON};

/// Distance between two lane coordinates.
#[must_use]
pub fn distance(a: f64, b: f64) -> f64 {
    (a - b).abs()
}

/// Reports whether `target` lies within `attacker`'s reach.
#[must_use]
pub fn in_range(attacker: &Combatant, target: &Combatant) -> bool {
    distance(attacker.position(), target.position()) <= attacker.stats().range()
}

/// Finds the closest enemy within reach, returning its position in `enemies`.
///
/// Ties keep the enemy that appears first, so callers that pass enemies in
/// spawn order get a stable choice.
#[must_use]
pub fn nearest_enemy_index<'a, I>(unit: &Combatant, enemies: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a Combatant>,
{
    let mut best: Option<(usize, f64)> = None;

    for (index, enemy) in enemies.into_iter().enumerate() {
        if !in_range(unit, enemy) {
            continue;
        }

        let candidate = distance(unit.position(), enemy.position());
        match best {
            Some((_, closest)) if candidate >= closest => {}
            _ => best = Some((index, candidate)),
        }
    }

    best.map(|(index, _)| index)
}

/// Finds the closest enemy within reach.
#[must_use]
pub fn find_nearest_enemy<'a>(unit: &Combatant, enemies: &'a [Combatant]) -> Option<&'a Combatant> {
    nearest_enemy_index(unit, enemies).map(|index| &enemies[index])
}

/// Advances `unit` toward the opposing base unless an enemy is within reach.
///
/// Returns a [`Event::Move`] when the unit actually changed position.
pub fn move_unit<'a, I>(unit: &mut Combatant, enemies: I, tick_seconds: f64) -> Option<Event>
where
    I: IntoIterator<Item = &'a Combatant>,
{
    if nearest_enemy_index(unit, enemies).is_some() {
        return None;
    }

    let from_position = unit.position();
    let step = unit.stats().speed() * tick_seconds * unit.side().heading();
    let to_position = unit.move_to(from_position + step);

    if distance(from_position, to_position) <= MOVE_EPSILON {
        return None;
    }

    Some(Event::Move {
        instance_id: unit.id(),
        from_position,
        to_position,
        side: unit.side(),
    })
}

/// Counts down the attack cooldown by one tick.
pub fn update_cooldown(unit: &mut Combatant, tick_seconds: f64) {
    unit.decay_cooldown(tick_seconds);
}

/// Resolves one attack from `attacker` against `target` if the attacker is ready.
///
/// Range is not checked here; callers pick targets with
/// [`nearest_enemy_index`]. The attacker's cooldown restarts even when the
/// blow is lethal.
pub fn try_attack(
    attacker: &mut Combatant,
    target: &mut Combatant,
    timestamp_ms: u64,
    out: &mut Vec<TimedEvent>,
) {
    if attacker.cooldown() > 0.0 {
        return;
    }

    let damage = attacker.stats().attack();
    out.push(TimedEvent::new(
        timestamp_ms,
        Event::Attack {
            attacker_id: attacker.id(),
            attacker_side: attacker.side(),
            target_id: target.id(),
            target_side: target.side(),
            damage,
        },
    ));

    let previous_hp = target.take_damage(damage);
    out.push(TimedEvent::new(
        timestamp_ms,
        Event::Hit {
            target_id: target.id(),
            target_side: target.side(),
            damage,
            remaining_hp: target.hp(),
            previous_hp,
        },
    ));

    if !target.is_alive() {
        out.push(TimedEvent::new(
            timestamp_ms,
            Event::Death {
                instance_id: target.id(),
                template_id: target.template_id(),
                side: target.side(),
                position: target.position(),
                reason: None,
            },
        ));
    }

    attacker.reset_cooldown();
}

/// Drops every combatant without hit points, preserving the order of the rest.
pub fn remove_dead(units: &mut Vec<Combatant>) {
    units.retain(Combatant::is_alive);
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_battle_core::{Side, TemplateId, UnitId, UnitStats, UnitTemplate};

    fn unit(id: u32, side: Side, position: f64) -> Combatant {
        let template = UnitTemplate::new(
            TemplateId::new(1),
            "spear",
            2,
            UnitStats::new(10, 5, 1.0, 2.0, 2.0),
        );
        Combatant::spawn(UnitId::new(id), &template, side).with_position(position)
    }

    #[test]
    fn distance_is_symmetric() {
        assert!((distance(0.0, 5.0) - 5.0).abs() < f64::EPSILON);
        assert!((distance(5.0, 0.0) - 5.0).abs() < f64::EPSILON);
        assert!(distance(10.0, 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let attacker = unit(1, Side::Player, 4.0);
        assert!(in_range(&attacker, &unit(2, Side::Ai, 6.0)));
        assert!(!in_range(&attacker, &unit(3, Side::Ai, 6.5)));
    }

    #[test]
    fn equal_distances_keep_first_enemy() {
        let attacker = unit(1, Side::Player, 5.0);
        let enemies = vec![unit(7, Side::Ai, 6.0), unit(3, Side::Ai, 4.0)];
        assert_eq!(nearest_enemy_index(&attacker, &enemies), Some(0));
    }

    #[test]
    fn empty_enemy_list_has_no_target() {
        assert!(find_nearest_enemy(&unit(1, Side::Player, 0.0), &[]).is_none());
    }
}
