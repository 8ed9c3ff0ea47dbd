#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Registry of live matches shared by every caller of the engine.
//!
//! Each match sits behind its own mutex, so one Step or Spawn holds exactly
//! one match and calls for different matches never contend. The map lock is
//! held only long enough to find, insert, or remove an entry and is never
//! requested while a match mutex is held.

mod storage;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
    time::{Duration, Instant},
};

use lane_battle_core::{
    Command, ConfigError, Deck, DeckError, MatchConfig, MatchError, MatchId, MatchSnapshot, Side,
    TemplateId, TimedEvent,
};
use lane_battle_world::{self as world, query, Match};
use thiserror::Error;
use tracing::{info, warn};

pub use storage::{MemoryStorage, Storage};

/// Failures reported by [`MatchRegistry`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The engine rejected the command.
    #[error(transparent)]
    Match(#[from] MatchError),
    /// No live match carries the identifier; it may have ended or expired.
    #[error("match {0} not found")]
    MatchNotFound(MatchId),
    /// A deck references a template missing from storage.
    #[error("{0} not found")]
    TemplateNotFound(TemplateId),
    /// A deck could not be assembled.
    #[error(transparent)]
    InvalidDeck(#[from] DeckError),
    /// The match configuration was rejected.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
    /// A thread panicked while holding a registry lock.
    #[error("registry lock poisoned")]
    LockPoisoned,
}

/// Result of a Step or Spawn issued through the registry.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    /// Match state after the command.
    pub snapshot: MatchSnapshot,
    /// Events produced by the command.
    pub events: Vec<TimedEvent>,
}

#[derive(Debug)]
struct Session {
    world: Match,
    last_activity: Instant,
}

type SharedSession = Arc<Mutex<Session>>;

/// Owns every live match and the storage collaborator.
#[derive(Debug)]
pub struct MatchRegistry<S> {
    storage: S,
    sessions: RwLock<HashMap<MatchId, SharedSession>>,
}

impl<S: Storage> MatchRegistry<S> {
    /// Creates an empty registry backed by `storage`.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Storage collaborator used by the registry.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Starts a match between the two decks and returns its initial state.
    pub fn create_match(
        &self,
        player_templates: &[TemplateId],
        ai_templates: &[TemplateId],
        config: MatchConfig,
    ) -> Result<MatchSnapshot, SessionError> {
        let player_deck = self.assemble_deck(player_templates)?;
        let ai_deck = self.assemble_deck(ai_templates)?;
        let id = MatchId::random();
        let world = Match::new(id, config, player_deck, ai_deck)?;
        let snapshot = query::snapshot(&world);

        let session = Arc::new(Mutex::new(Session {
            world,
            last_activity: Instant::now(),
        }));
        let _ = self.write_sessions()?.insert(id, session);

        info!(match_id = %id, tick_ms = config.tick_ms, "match created");
        Ok(snapshot)
    }

    /// Advances the match by one tick.
    ///
    /// Once a tick decides the winner the result is recorded in storage and
    /// the match leaves the registry; the returned outcome still carries the
    /// final state and events.
    pub fn step(&self, id: MatchId) -> Result<Outcome, SessionError> {
        let (outcome, decided) = self.execute(id, Command::Tick)?;
        if let Some(winner) = outcome.snapshot.winner.filter(|_| decided) {
            self.storage.record_result(id, winner);
            let _ = self.write_sessions()?.remove(&id);
            info!(match_id = %id, winner = %winner, "match ended with a winner");
        }
        Ok(outcome)
    }

    /// Summons a unit for `side` from its deck.
    pub fn spawn(
        &self,
        id: MatchId,
        side: Side,
        template: TemplateId,
    ) -> Result<Outcome, SessionError> {
        let command = Command::Spawn {
            side,
            template,
            cost_check: true,
        };
        self.execute(id, command).map(|(outcome, _)| outcome)
    }

    /// Reports whether the match has been decided.
    pub fn is_finished(&self, id: MatchId) -> Result<bool, SessionError> {
        let session = self.session(id)?;
        let guard = session.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(query::is_finished(&guard.world))
    }

    /// Captures the current state of the match.
    pub fn snapshot(&self, id: MatchId) -> Result<MatchSnapshot, SessionError> {
        let session = self.session(id)?;
        let guard = session.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(query::snapshot(&guard.world))
    }

    /// Deck assigned to `side` in the match.
    pub fn deck(&self, id: MatchId, side: Side) -> Result<Deck, SessionError> {
        let session = self.session(id)?;
        let guard = session.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(query::deck(&guard.world, side).clone())
    }

    /// Discards the match; returns whether it was still registered.
    pub fn end(&self, id: MatchId) -> Result<bool, SessionError> {
        let removed = self.write_sessions()?.remove(&id).is_some();
        if removed {
            info!(match_id = %id, "match ended");
        }
        Ok(removed)
    }

    /// Discards every match idle for at least `timeout` and returns how many were removed.
    pub fn cleanup_inactive(&self, timeout: Duration) -> Result<usize, SessionError> {
        self.cleanup_inactive_at(Instant::now(), timeout)
    }

    /// Same as [`Self::cleanup_inactive`], measured against `now`.
    pub fn cleanup_inactive_at(
        &self,
        now: Instant,
        timeout: Duration,
    ) -> Result<usize, SessionError> {
        let mut sessions = self.write_sessions()?;
        let before = sessions.len();
        sessions.retain(|id, session| {
            let Ok(guard) = session.lock() else {
                return false;
            };
            let idle = now.saturating_duration_since(guard.last_activity);
            let keep = idle < timeout;
            if !keep {
                info!(match_id = %id, idle_ms = idle.as_millis() as u64, "match expired");
            }
            keep
        });
        Ok(before - sessions.len())
    }

    /// Number of live matches.
    pub fn len(&self) -> Result<usize, SessionError> {
        Ok(self.read_sessions()?.len())
    }

    /// Reports whether no match is live.
    pub fn is_empty(&self) -> Result<bool, SessionError> {
        Ok(self.read_sessions()?.is_empty())
    }

    /// Applies `command` under the match lock.
    ///
    /// The flag is `true` only for the call whose command decided the match.
    fn execute(&self, id: MatchId, command: Command) -> Result<(Outcome, bool), SessionError> {
        let session = self.session(id)?;
        let mut guard = session.lock().map_err(|_| SessionError::LockPoisoned)?;
        let mut events = Vec::new();
        let was_finished = query::is_finished(&guard.world);

        if let Err(error) = world::apply(&mut guard.world, command, &mut events) {
            warn!(match_id = %id, ?command, %error, "command rejected");
            return Err(error.into());
        }
        guard.last_activity = Instant::now();
        let decided = !was_finished && query::is_finished(&guard.world);

        Ok((
            Outcome {
                snapshot: query::snapshot(&guard.world),
                events,
            },
            decided,
        ))
    }

    fn assemble_deck(&self, ids: &[TemplateId]) -> Result<Deck, SessionError> {
        let templates = ids
            .iter()
            .map(|&id| {
                self.storage.template(id).ok_or_else(|| {
                    warn!(template = %id, "deck references unknown template");
                    SessionError::TemplateNotFound(id)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Deck::new(templates)?)
    }

    fn session(&self, id: MatchId) -> Result<SharedSession, SessionError> {
        self.read_sessions()?.get(&id).cloned().ok_or_else(|| {
            warn!(match_id = %id, "unknown match");
            SessionError::MatchNotFound(id)
        })
    }

    fn read_sessions(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<MatchId, SharedSession>>, SessionError> {
        self.sessions.read().map_err(|_| SessionError::LockPoisoned)
    }

    fn write_sessions(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<MatchId, SharedSession>>, SessionError> {
        self.sessions.write().map_err(|_| SessionError::LockPoisoned)
    }
}
