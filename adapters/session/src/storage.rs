//! Storage seam consulted before a match starts and after it ends.

use std::{
    collections::HashMap,
    sync::{Mutex, RwLock},
};

use lane_battle_core::{MatchId, Side, TemplateId, UnitTemplate};

/// Persistent collaborator holding templates and match outcomes.
///
/// The registry only reads templates while assembling decks and only writes
/// once a match is decided, never during a tick.
pub trait Storage: Send + Sync {
    /// Looks up a stored template.
    fn template(&self, id: TemplateId) -> Option<UnitTemplate>;

    /// Records the outcome of a decided match.
    fn record_result(&self, match_id: MatchId, winner: Side);
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn template(&self, id: TemplateId) -> Option<UnitTemplate> {
        (**self).template(id)
    }

    fn record_result(&self, match_id: MatchId, winner: Side) {
        (**self).record_result(match_id, winner);
    }
}

/// In-process [`Storage`] backed by hash maps.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    templates: RwLock<HashMap<TemplateId, UnitTemplate>>,
    results: Mutex<Vec<(MatchId, Side)>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with `templates`.
    #[must_use]
    pub fn with_templates(templates: impl IntoIterator<Item = UnitTemplate>) -> Self {
        let storage = Self::new();
        for template in templates {
            storage.insert(template);
        }
        storage
    }

    /// Stores `template`, replacing any template with the same identifier.
    pub fn insert(&self, template: UnitTemplate) {
        if let Ok(mut templates) = self.templates.write() {
            let _ = templates.insert(template.id(), template);
        }
    }

    /// Outcomes recorded so far, in recording order.
    #[must_use]
    pub fn results(&self) -> Vec<(MatchId, Side)> {
        self.results
            .lock()
            .map(|results| results.clone())
            .unwrap_or_default()
    }
}

impl Storage for MemoryStorage {
    fn template(&self, id: TemplateId) -> Option<UnitTemplate> {
        self.templates.read().ok()?.get(&id).cloned()
    }

    fn record_result(&self, match_id: MatchId, winner: Side) {
        if let Ok(mut results) = self.results.lock() {
            results.push((match_id, winner));
        }
    }
}
