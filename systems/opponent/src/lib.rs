#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Opponent system that turns spawn decisions into commands.
//!
//! A [`SpawnPolicy`] chooses what to summon from a read-only snapshot; the
//! [`Opponent`] system paces those decisions against the simulated match
//! clock and emits [`Command::Spawn`] exactly like a human client would.

use std::time::Duration;

use lane_battle_core::{Command, Deck, MatchSnapshot, Side, TemplateId, UnitTemplate};
use tracing::debug;

/// Delay between consecutive decisions used by [`GreedyPolicy`].
pub const DEFAULT_DECISION_WAIT: Duration = Duration::from_millis(600);

/// Outcome of a single policy consultation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Template to summon, if any.
    pub template: Option<TemplateId>,
    /// Simulated time to wait before consulting the policy again.
    pub wait: Duration,
    /// Short human-readable justification.
    pub reason: String,
}

impl Decision {
    /// Decision that summons `template`.
    #[must_use]
    pub fn spawn(template: TemplateId, wait: Duration, reason: impl Into<String>) -> Self {
        Self {
            template: Some(template),
            wait,
            reason: reason.into(),
        }
    }

    /// Decision that summons nothing.
    #[must_use]
    pub fn hold(wait: Duration, reason: impl Into<String>) -> Self {
        Self {
            template: None,
            wait,
            reason: reason.into(),
        }
    }
}

/// Chooses which template, if any, a side should summon next.
pub trait SpawnPolicy {
    /// Inspects the match and the side's deck and returns a decision.
    fn decide(&mut self, side: Side, view: &MatchSnapshot, deck: &Deck) -> Decision;
}

impl<P: SpawnPolicy + ?Sized> SpawnPolicy for Box<P> {
    fn decide(&mut self, side: Side, view: &MatchSnapshot, deck: &Deck) -> Decision {
        (**self).decide(side, view, deck)
    }
}

/// Summons the most expensive affordable template.
///
/// Ties resolve to the template listed first in the deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GreedyPolicy {
    wait: Duration,
}

impl GreedyPolicy {
    /// Creates a greedy policy that waits `wait` between decisions.
    #[must_use]
    pub const fn new(wait: Duration) -> Self {
        Self { wait }
    }
}

impl Default for GreedyPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DECISION_WAIT)
    }
}

impl SpawnPolicy for GreedyPolicy {
    fn decide(&mut self, side: Side, view: &MatchSnapshot, deck: &Deck) -> Decision {
        let available = view.cost(side);
        let mut selected: Option<&UnitTemplate> = None;
        for template in deck
            .iter()
            .filter(|template| f64::from(template.cost()) <= available)
        {
            if selected.map_or(true, |best| template.cost() > best.cost()) {
                selected = Some(template);
            }
        }

        match selected {
            Some(template) => Decision::spawn(
                template.id(),
                self.wait,
                format!("spawning highest cost unit ({})", template.name()),
            ),
            None => Decision::hold(self.wait, "no units available in cost range"),
        }
    }
}

/// Paces a [`SpawnPolicy`] against the match clock on behalf of one side.
#[derive(Debug)]
pub struct Opponent<P> {
    side: Side,
    policy: P,
    next_decision_ms: u64,
}

impl<P: SpawnPolicy> Opponent<P> {
    /// Creates an opponent that consults `policy` for `side`, starting immediately.
    #[must_use]
    pub const fn new(side: Side, policy: P) -> Self {
        Self {
            side,
            policy,
            next_decision_ms: 0,
        }
    }

    /// Side this opponent plays.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Simulated time at which the policy is consulted next.
    #[must_use]
    pub const fn next_decision_ms(&self) -> u64 {
        self.next_decision_ms
    }

    /// Consults the policy when its wait has elapsed and emits at most one spawn command.
    pub fn handle(&mut self, view: &MatchSnapshot, deck: &Deck, out: &mut Vec<Command>) {
        if view.is_finished() || view.elapsed_ms < self.next_decision_ms {
            return;
        }

        let decision = self.policy.decide(self.side, view, deck);
        let wait_ms = u64::try_from(decision.wait.as_millis()).unwrap_or(u64::MAX);
        self.next_decision_ms = view.elapsed_ms.saturating_add(wait_ms);

        debug!(
            match_id = %view.match_id,
            side = %self.side,
            elapsed_ms = view.elapsed_ms,
            template = ?decision.template,
            reason = %decision.reason,
            "opponent decision"
        );

        if let Some(template) = decision.template {
            out.push(Command::Spawn {
                side: self.side,
                template,
                cost_check: true,
            });
        }
    }
}
