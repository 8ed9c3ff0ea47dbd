//! Event log entries emitted by the match world.

use serde::{Deserialize, Serialize};

use crate::{Side, TemplateId, UnitId};

/// Events describing everything that happened during a Step or Spawn.
///
/// Field names follow the wire format consumed by clients, so renaming a
/// field is a breaking change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    /// A unit entered the lane.
    Spawn {
        /// Identifier assigned to the new unit.
        instance_id: UnitId,
        /// Template the unit was created from.
        template_id: TemplateId,
        /// Owning side.
        side: Side,
        /// Entry coordinate.
        position: f64,
        /// Starting hit points.
        hp: u32,
        /// Maximum hit points.
        max_hp: u32,
        /// Damage per attack.
        attack: u32,
        /// Movement speed in lane squares per second.
        speed: f64,
        /// Attack reach in lane squares.
        range: f64,
        /// Seconds between attacks.
        attack_interval: f64,
    },
    /// A unit advanced along the lane.
    Move {
        /// Unit that moved.
        instance_id: UnitId,
        /// Coordinate before the move.
        from_position: f64,
        /// Coordinate after the move.
        to_position: f64,
        /// Owning side.
        side: Side,
    },
    /// A unit swung at an enemy.
    Attack {
        /// Unit that attacked.
        attacker_id: UnitId,
        /// Side of the attacker.
        attacker_side: Side,
        /// Unit that was attacked.
        target_id: UnitId,
        /// Side of the target.
        target_side: Side,
        /// Damage carried by the attack.
        damage: u32,
    },
    /// Damage landed on a unit.
    Hit {
        /// Unit that took damage.
        target_id: UnitId,
        /// Side of the damaged unit.
        target_side: Side,
        /// Damage applied.
        damage: u32,
        /// Hit points after the damage.
        remaining_hp: u32,
        /// Hit points before the damage.
        previous_hp: u32,
    },
    /// A unit left the lane.
    Death {
        /// Unit that died.
        instance_id: UnitId,
        /// Template the unit was created from.
        template_id: TemplateId,
        /// Owning side.
        side: Side,
        /// Coordinate at the time of death.
        position: f64,
        /// Why the unit left, when it was not killed in combat.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<DeathReason>,
    },
    /// A unit reached and damaged a base.
    BaseDamage {
        /// Side owning the damaged base.
        side: Side,
        /// Damage applied to the base.
        damage: u32,
        /// Base hit points after the damage.
        remaining_hp: u32,
        /// Unit that reached the base.
        attacker_id: UnitId,
        /// Side of that unit.
        attacker_side: Side,
    },
}

impl Event {
    /// Discriminant of the event, useful for comparing event sequences.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Spawn { .. } => EventKind::Spawn,
            Self::Move { .. } => EventKind::Move,
            Self::Attack { .. } => EventKind::Attack,
            Self::Hit { .. } => EventKind::Hit,
            Self::Death { .. } => EventKind::Death,
            Self::BaseDamage { .. } => EventKind::BaseDamage,
        }
    }
}

/// Payload-free discriminant of [`Event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// See [`Event::Spawn`].
    Spawn,
    /// See [`Event::Move`].
    Move,
    /// See [`Event::Attack`].
    Attack,
    /// See [`Event::Hit`].
    Hit,
    /// See [`Event::Death`].
    Death,
    /// See [`Event::BaseDamage`].
    BaseDamage,
}

/// Non-combat causes of a [`Event::Death`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathReason {
    /// The unit walked into the opposing base and was consumed.
    ReachedBase,
}

/// An [`Event`] stamped with the match clock at emission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Elapsed match time in milliseconds when the event was emitted.
    pub timestamp_ms: u64,
    /// What happened.
    #[serde(flatten)]
    pub event: Event,
}

impl TimedEvent {
    /// Stamps `event` with `timestamp_ms`.
    #[must_use]
    pub const fn new(timestamp_ms: u64, event: Event) -> Self {
        Self {
            timestamp_ms,
            event,
        }
    }

    /// Discriminant of the wrapped event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.event.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_damage_uses_wire_field_names() {
        let event = TimedEvent::new(
            400,
            Event::BaseDamage {
                side: Side::Ai,
                damage: 5,
                remaining_hp: 95,
                attacker_id: UnitId::new(2),
                attacker_side: Side::Player,
            },
        );
        let value = serde_json::to_value(&event).expect("serialize event");
        assert_eq!(
            value,
            json!({
                "type": "BASE_DAMAGE",
                "timestamp_ms": 400,
                "data": {
                    "side": "ai",
                    "damage": 5,
                    "remaining_hp": 95,
                    "attacker_id": 2,
                    "attacker_side": "player",
                },
            })
        );
    }

    #[test]
    fn death_reason_is_omitted_for_combat_deaths() {
        let killed = Event::Death {
            instance_id: UnitId::new(1),
            template_id: TemplateId::new(7),
            side: Side::Player,
            position: 3.5,
            reason: None,
        };
        let value = serde_json::to_value(&killed).expect("serialize death");
        assert!(value["data"].get("reason").is_none());

        let consumed = Event::Death {
            instance_id: UnitId::new(1),
            template_id: TemplateId::new(7),
            side: Side::Player,
            position: 20.0,
            reason: Some(DeathReason::ReachedBase),
        };
        let value = serde_json::to_value(&consumed).expect("serialize death");
        assert_eq!(value["data"]["reason"], json!("reached_base"));
    }

    #[test]
    fn timed_event_parses_from_wire_form() {
        let parsed: TimedEvent = serde_json::from_value(json!({
            "type": "MOVE",
            "timestamp_ms": 200,
            "data": {
                "instance_id": 3,
                "from_position": 1.0,
                "to_position": 1.2,
                "side": "player",
            },
        }))
        .expect("parse event");
        assert_eq!(parsed.kind(), EventKind::Move);
        assert_eq!(parsed.timestamp_ms, 200);
    }
}
