//! Rendering of a finished run.

use std::io::{self, Write};

use lane_battle_core::{EventKind, MatchSnapshot, Side, TimedEvent};
use serde::Serialize;

use crate::Format;

/// Everything observed while running a match.
#[derive(Clone, Debug)]
pub(crate) struct Report {
    /// Ticks executed.
    pub(crate) ticks: u64,
    /// Events in emission order.
    pub(crate) events: Vec<TimedEvent>,
    /// State after the last command.
    pub(crate) final_state: MatchSnapshot,
}

#[derive(Serialize)]
struct FinalLine<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    ticks: u64,
    state: &'a MatchSnapshot,
}

/// Writes `report` to `out` in the requested format.
pub(crate) fn write(report: &Report, format: Format, out: &mut impl Write) -> io::Result<()> {
    match format {
        Format::Json => write_json(report, out),
        Format::Summary => write_summary(report, out),
    }
}

fn write_json(report: &Report, out: &mut impl Write) -> io::Result<()> {
    for event in &report.events {
        serde_json::to_writer(&mut *out, event)?;
        writeln!(out)?;
    }
    serde_json::to_writer(
        &mut *out,
        &FinalLine {
            kind: "FINAL",
            ticks: report.ticks,
            state: &report.final_state,
        },
    )?;
    writeln!(out)
}

fn write_summary(report: &Report, out: &mut impl Write) -> io::Result<()> {
    let state = &report.final_state;
    let count = |kind: EventKind| report.events.iter().filter(|e| e.kind() == kind).count();

    match state.winner {
        Some(winner) => writeln!(out, "winner: {winner}")?,
        None => writeln!(out, "winner: none (tick limit)")?,
    }
    writeln!(
        out,
        "elapsed: {} ms over {} ticks",
        state.elapsed_ms, report.ticks
    )?;
    for side in Side::ALL {
        writeln!(
            out,
            "{side}: base {} hp, cost {:.1}, {} units on field",
            state.base_hp(side),
            state.cost(side),
            state.units_of(side).count()
        )?;
    }
    writeln!(
        out,
        "spawns: {}, attacks: {}, deaths: {}",
        count(EventKind::Spawn),
        count(EventKind::Attack),
        count(EventKind::Death)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_battle_core::{Event, MatchId, TemplateId, UnitId};

    fn report() -> Report {
        Report {
            ticks: 1,
            events: vec![TimedEvent::new(
                0,
                Event::Spawn {
                    instance_id: UnitId::new(1),
                    template_id: TemplateId::new(3),
                    side: Side::Player,
                    position: 0.0,
                    hp: 10,
                    max_hp: 10,
                    attack: 3,
                    speed: 1.0,
                    range: 1.0,
                    attack_interval: 2.0,
                },
            )],
            final_state: MatchSnapshot {
                match_id: MatchId::random(),
                tick_ms: 200,
                elapsed_ms: 200,
                player_base_hp: 100,
                ai_base_hp: 100,
                player_cost: 8.6,
                ai_cost: 10.6,
                max_cost: 20.0,
                cost_recovery_per_tick: 0.6,
                units: Vec::new(),
                winner: None,
            },
        }
    }

    #[test]
    fn json_emits_one_line_per_event_plus_final_state() {
        let mut buffer = Vec::new();
        write(&report(), Format::Json, &mut buffer).expect("written");
        let text = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        let spawn: serde_json::Value = serde_json::from_str(lines[0]).expect("json");
        assert_eq!(spawn["type"], "SPAWN");
        let last: serde_json::Value = serde_json::from_str(lines[1]).expect("json");
        assert_eq!(last["type"], "FINAL");
        assert_eq!(last["state"]["elapsed_ms"], 200);
    }

    #[test]
    fn summary_reports_undecided_run() {
        let mut buffer = Vec::new();
        write(&report(), Format::Summary, &mut buffer).expect("written");
        let text = String::from_utf8(buffer).expect("utf8");

        assert!(text.starts_with("winner: none (tick limit)"));
        assert!(text.contains("player: base 100 hp, cost 8.6, 0 units on field"));
        assert!(text.contains("spawns: 1, attacks: 0, deaths: 0"));
    }
}
