//! Live, mutable unit instances placed into a match.

use crate::{
    CombatantSnapshot, Side, TemplateId, UnitId, UnitStats, UnitTemplate, LANE_END, LANE_START,
};

/// A live instance of a [`UnitTemplate`] fighting in a match.
///
/// Position always lies within the lane and hit points never exceed the
/// maximum captured at spawn time; every mutator preserves both.
#[derive(Clone, Debug, PartialEq)]
pub struct Combatant {
    id: UnitId,
    template: TemplateId,
    side: Side,
    position: f64,
    hp: u32,
    cooldown: f64,
    stats: UnitStats,
}

impl Combatant {
    /// Spawns a fresh combatant at the side's entry point with full hit points.
    #[must_use]
    pub fn spawn(id: UnitId, template: &UnitTemplate, side: Side) -> Self {
        let stats = *template.stats();
        Self {
            id,
            template: template.id(),
            side,
            position: side.spawn_position(),
            hp: stats.max_hp(),
            cooldown: 0.0,
            stats,
        }
    }

    /// Places the combatant at `position`, clamped to the lane.
    #[must_use]
    pub fn with_position(mut self, position: f64) -> Self {
        self.position = clamp_to_lane(position);
        self
    }

    /// Sets the remaining hit points, capped at the maximum.
    #[must_use]
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = hp.min(self.stats.max_hp());
        self
    }

    /// Sets the remaining attack cooldown in seconds.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: f64) -> Self {
        self.cooldown = cooldown.max(0.0);
        self
    }

    /// Identifier assigned at spawn.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Template the combatant was spawned from.
    #[must_use]
    pub const fn template_id(&self) -> TemplateId {
        self.template
    }

    /// Owning side.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Lane coordinate.
    #[must_use]
    pub const fn position(&self) -> f64 {
        self.position
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn hp(&self) -> u32 {
        self.hp
    }

    /// Seconds remaining before the next attack.
    #[must_use]
    pub const fn cooldown(&self) -> f64 {
        self.cooldown
    }

    /// Stats frozen at spawn time.
    #[must_use]
    pub const fn stats(&self) -> &UnitStats {
        &self.stats
    }

    /// Reports whether the combatant still has hit points.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Moves to `position`, clamped to the lane, and returns the applied position.
    pub fn move_to(&mut self, position: f64) -> f64 {
        self.position = clamp_to_lane(position);
        self.position
    }

    /// Subtracts `amount` hit points, saturating at zero, and returns the hit points held before.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let previous = self.hp;
        self.hp = self.hp.saturating_sub(amount);
        previous
    }

    /// Reduces the attack cooldown by `seconds`, never below zero.
    pub fn decay_cooldown(&mut self, seconds: f64) {
        self.cooldown = (self.cooldown - seconds).max(0.0);
    }

    /// Restarts the attack cooldown from the full attack interval.
    pub fn reset_cooldown(&mut self) {
        self.cooldown = self.stats.attack_interval();
    }

    /// Captures an immutable snapshot of the combatant.
    #[must_use]
    pub fn snapshot(&self) -> CombatantSnapshot {
        CombatantSnapshot {
            instance_id: self.id,
            template_id: self.template,
            side: self.side,
            position: self.position,
            hp: self.hp,
            cooldown: self.cooldown,
            stats: self.stats,
        }
    }
}

fn clamp_to_lane(position: f64) -> f64 {
    if position.is_nan() {
        return LANE_START;
    }
    position.clamp(LANE_START, LANE_END)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> UnitTemplate {
        UnitTemplate::new(TemplateId::new(4), "pikeman", 3, UnitStats::new(12, 4, 1.0, 2.0, 1.5))
    }

    #[test]
    fn spawn_copies_template_stats_at_entry_point() {
        let unit = Combatant::spawn(UnitId::new(1), &template(), Side::Ai);
        assert_eq!(unit.hp(), 12);
        assert_eq!(unit.template_id(), TemplateId::new(4));
        assert!((unit.position() - LANE_END).abs() < f64::EPSILON);
        assert!(unit.cooldown().abs() < f64::EPSILON);
    }

    #[test]
    fn movement_is_clamped_to_lane() {
        let mut unit = Combatant::spawn(UnitId::new(1), &template(), Side::Player);
        assert!((unit.move_to(25.0) - LANE_END).abs() < f64::EPSILON);
        assert!((unit.move_to(-3.0) - LANE_START).abs() < f64::EPSILON);
    }

    #[test]
    fn damage_saturates_and_reports_previous_hp() {
        let mut unit = Combatant::spawn(UnitId::new(1), &template(), Side::Player);
        assert_eq!(unit.take_damage(5), 12);
        assert_eq!(unit.take_damage(50), 7);
        assert_eq!(unit.hp(), 0);
        assert!(!unit.is_alive());
    }

    #[test]
    fn cooldown_never_goes_negative() {
        let mut unit = Combatant::spawn(UnitId::new(1), &template(), Side::Player);
        unit.reset_cooldown();
        unit.decay_cooldown(0.2);
        assert!((unit.cooldown() - 1.3).abs() < 1e-9);
        unit.decay_cooldown(5.0);
        assert!(unit.cooldown().abs() < f64::EPSILON);
    }

    #[test]
    fn hp_override_is_capped_at_maximum() {
        let unit = Combatant::spawn(UnitId::new(1), &template(), Side::Player).with_hp(99);
        assert_eq!(unit.hp(), 12);
    }

    #[test]
    fn snapshot_mirrors_live_state() {
        let unit = Combatant::spawn(UnitId::new(8), &template(), Side::Player)
            .with_position(6.5)
            .with_hp(3)
            .with_cooldown(0.8);
        let snapshot = unit.snapshot();
        assert_eq!(snapshot.instance_id, UnitId::new(8));
        assert!((snapshot.position - 6.5).abs() < f64::EPSILON);
        assert_eq!(snapshot.hp, 3);
        assert!((snapshot.cooldown - 0.8).abs() < f64::EPSILON);
        assert_eq!(snapshot.stats, *unit.stats());
    }
}
