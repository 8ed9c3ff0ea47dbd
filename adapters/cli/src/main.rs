#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless battle runner: pits two greedy opponents against each other.

mod battle;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lane_battle_core::{Command, MatchSnapshot, Side};
use lane_battle_session::{MatchRegistry, MemoryStorage};
use lane_battle_system_opponent::{GreedyPolicy, Opponent};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{battle::BattleFile, output::Report};

/// Runs a lane battle between two greedy opponents and reports the result.
#[derive(Debug, Parser)]
#[command(name = "lane-battle", version)]
struct Args {
    /// Battle file with match settings, templates and decks. Uses a built-in battle when omitted.
    #[arg(long, value_name = "FILE")]
    battle: Option<PathBuf>,

    /// Maximum number of ticks before the run stops undecided.
    #[arg(long, default_value_t = 3000)]
    max_ticks: u64,

    /// How the run is reported on stdout.
    #[arg(long, value_enum, default_value_t = Format::Summary)]
    format: Format,
}

/// Output formats supported by the runner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// One JSON object per event followed by the final state.
    Json,
    /// Human readable summary of the outcome.
    Summary,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let battle = BattleFile::load(args.battle.as_deref())?;
    let report = run(&battle, args.max_ticks)?;
    output::write(&report, args.format, &mut std::io::stdout().lock())
        .context("failed to write report")
}

/// Drives one match to completion or until `max_ticks` have elapsed.
fn run(battle: &BattleFile, max_ticks: u64) -> Result<Report> {
    let templates = battle.finalize_templates();
    for template in &templates {
        info!(
            template = %template.id(),
            name = template.name(),
            cost = template.cost(),
            "template ready"
        );
    }

    let registry = MatchRegistry::new(MemoryStorage::with_templates(templates));
    let initial = registry
        .create_match(&battle.decks.player, &battle.decks.ai, battle.config)
        .context("failed to create match")?;
    let id = initial.match_id;
    let decks = [
        registry.deck(id, Side::Player)?,
        registry.deck(id, Side::Ai)?,
    ];
    let mut opponents = [
        Opponent::new(Side::Player, GreedyPolicy::default()),
        Opponent::new(Side::Ai, GreedyPolicy::default()),
    ];

    let mut events = Vec::new();
    let mut view: MatchSnapshot = initial;
    let mut ticks = 0;

    while ticks < max_ticks && !view.is_finished() {
        let mut commands = Vec::new();
        for (opponent, deck) in opponents.iter_mut().zip(&decks) {
            opponent.handle(&view, deck, &mut commands);
        }

        for command in commands {
            if let Command::Spawn { side, template, .. } = command {
                let outcome = registry.spawn(id, side, template)?;
                events.extend(outcome.events);
                view = outcome.snapshot;
            }
        }

        let outcome = registry.step(id)?;
        events.extend(outcome.events);
        view = outcome.snapshot;
        ticks += 1;
    }

    match view.winner {
        Some(winner) => info!(match_id = %id, %winner, ticks, "battle decided"),
        None => {
            info!(match_id = %id, ticks, "tick limit reached");
            let _ = registry.end(id)?;
        }
    }

    Ok(Report {
        ticks,
        events,
        final_state: view,
    })
}
