//! Battle files describing the match configuration, templates and decks.

use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use lane_battle_core::{MatchConfig, RawStats, TemplateId, UnitTemplate};
use lane_battle_system_balance::finalize_template;
use serde::Deserialize;

/// Battle used when no file is supplied on the command line.
pub(crate) const DEFAULT_BATTLE: &str = include_str!("../battle.toml");

/// Parsed contents of a battle file.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct BattleFile {
    /// Match tunables; omitted keys fall back to their defaults.
    #[serde(rename = "match", default)]
    pub(crate) config: MatchConfig,
    /// Template identifiers making up each side's deck.
    pub(crate) decks: DeckLists,
    /// Raw templates as a generator would produce them.
    pub(crate) templates: Vec<TemplateEntry>,
}

/// Deck composition for both sides.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct DeckLists {
    /// Player deck.
    pub(crate) player: Vec<TemplateId>,
    /// AI deck.
    pub(crate) ai: Vec<TemplateId>,
}

/// One template before balancing.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct TemplateEntry {
    /// Identifier referenced by the decks.
    pub(crate) id: TemplateId,
    /// Display name.
    pub(crate) name: String,
    /// Generation prompt, charged as a cost surcharge when present.
    #[serde(default)]
    pub(crate) prompt: Option<String>,
    /// Unclamped stats.
    #[serde(flatten)]
    pub(crate) stats: RawStats,
}

impl BattleFile {
    /// Loads a battle from `path`, or the built-in battle when `path` is `None`.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("failed to read battle file {}", path.display()))?;
                Self::parse(&contents)
                    .with_context(|| format!("invalid battle file {}", path.display()))
            }
            None => Self::parse(DEFAULT_BATTLE).context("invalid built-in battle"),
        }
    }

    /// Parses a battle from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let battle: Self = toml::from_str(contents)?;
        battle.config.validate()?;
        for (position, entry) in battle.templates.iter().enumerate() {
            ensure!(
                !battle.templates[..position]
                    .iter()
                    .any(|earlier| earlier.id == entry.id),
                "duplicate template id {}",
                entry.id.get()
            );
        }
        Ok(battle)
    }

    /// Runs every raw template through the balance calculator.
    pub(crate) fn finalize_templates(&self) -> Vec<UnitTemplate> {
        self.templates
            .iter()
            .map(|entry| {
                finalize_template(entry.id, &entry.name, &entry.stats, entry.prompt.as_deref())
            })
            .collect()
    }
}
