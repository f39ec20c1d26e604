// ── Entity cache ──
//
// Holds features, server identification and entities for the lifetime of a
// client. Populated lazily per kind; only explicit re-fetches change what
// is already cached. Merges are serialized by the caller (the client holds
// its dispatch guard across fetch and merge); lookups run concurrently.

mod collection;

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use dashmap::DashSet;

use crate::model::{Entity, EntityId, EntityKey, EntityKind, Feature, ServerInfo};
use collection::KeyedCollection;

/// Lock-free cache of everything fetched from one server.
pub struct EntityStore {
    entities: KeyedCollection<EntityKey, Entity>,
    features: KeyedCollection<String, Feature>,
    server_info: ArcSwapOption<ServerInfo>,
    /// Kinds fetched at least once, even if the server listed nothing.
    loaded: DashSet<EntityKind>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: KeyedCollection::new(),
            features: KeyedCollection::new(),
            server_info: ArcSwapOption::empty(),
            loaded: DashSet::new(),
        }
    }

    // ── Features ─────────────────────────────────────────────────────

    /// Whether the feature list has been fetched, even if it was empty.
    pub fn features_loaded(&self) -> bool {
        self.server_info.load().is_some()
    }

    /// Features sorted by name.
    pub fn features(&self) -> Vec<Arc<Feature>> {
        let mut features: Vec<_> = self.features.snapshot().iter().cloned().collect();
        features.sort_by(|a, b| a.name().cmp(b.name()));
        features
    }

    pub(crate) fn set_features(&self, features: Vec<Feature>, info: ServerInfo) {
        self.features
            .upsert_many(features.into_iter().map(|f| (f.name().to_owned(), f)));
        self.server_info.store(Some(Arc::new(info)));
    }

    pub fn server_info(&self) -> Option<Arc<ServerInfo>> {
        self.server_info.load_full()
    }

    /// Entity kinds backed by a cached feature, in a stable order.
    pub fn supported_kinds(&self) -> Vec<EntityKind> {
        let mut kinds: Vec<_> = self
            .features
            .snapshot()
            .iter()
            .filter_map(|f| f.entity_kind())
            .collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    // ── Entities ─────────────────────────────────────────────────────

    /// Whether `kind` has been fetched at least once.
    pub fn is_loaded(&self, kind: EntityKind) -> bool {
        self.loaded.contains(&kind)
    }

    /// Merge freshly fetched entities of one kind. Returns how many were new.
    pub(crate) fn merge(&self, kind: EntityKind, entities: Vec<Entity>) -> usize {
        let added = self
            .entities
            .upsert_many(entities.into_iter().map(|e| (e.key(), e)));
        self.loaded.insert(kind);
        added
    }

    /// Cached entities, optionally restricted to one kind, ordered by
    /// kind then id.
    pub fn entities(&self, kind: Option<EntityKind>) -> Vec<Arc<Entity>> {
        let mut entities: Vec<_> = self
            .entities
            .snapshot()
            .iter()
            .filter(|e| kind.is_none_or(|k| e.kind() == k))
            .cloned()
            .collect();
        entities.sort_by_key(|e| e.key());
        entities
    }

    pub fn get(&self, kind: EntityKind, id: EntityId) -> Option<Arc<Entity>> {
        self.entities.get(&EntityKey::new(kind, id))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityStatus, Light, LightType, Scenario, ScenarioIcon, ScenarioStatus};

    fn light(id: EntityId, status: EntityStatus) -> Entity {
        Entity::Light(Light {
            id,
            name: format!("Light {id}"),
            status,
            light_type: LightType::StepStep,
            brightness: 100,
            floor_index: None,
            room_index: None,
        })
    }

    fn scenario(id: EntityId) -> Entity {
        Entity::Scenario(Scenario {
            id,
            name: format!("Scenario {id}"),
            status: EntityStatus::OffStopped,
            scenario_status: ScenarioStatus::NotApplied,
            icon: ScenarioIcon::Generic,
            icon_id: 0,
            user_defined: false,
        })
    }

    #[test]
    fn merge_is_keyed_by_kind_and_id() {
        let store = EntityStore::new();
        store.merge(EntityKind::Light, vec![light(1, EntityStatus::OffStopped)]);
        store.merge(EntityKind::Scenario, vec![scenario(1)]);

        assert_eq!(store.entity_count(), 2);
        assert_eq!(store.entities(Some(EntityKind::Light)).len(), 1);
        assert_eq!(store.entities(None).len(), 2);
    }

    #[test]
    fn merge_replaces_existing_identity() {
        let store = EntityStore::new();
        store.merge(EntityKind::Light, vec![light(1, EntityStatus::OffStopped)]);
        let added = store.merge(
            EntityKind::Light,
            vec![light(1, EntityStatus::OnOpenTriggered), light(2, EntityStatus::OffStopped)],
        );

        assert_eq!(added, 1);
        assert_eq!(
            store.get(EntityKind::Light, 1).unwrap().status(),
            EntityStatus::OnOpenTriggered
        );
    }

    #[test]
    fn empty_fetch_still_marks_kind_loaded() {
        let store = EntityStore::new();
        assert!(!store.is_loaded(EntityKind::Opening));
        store.merge(EntityKind::Opening, Vec::new());
        assert!(store.is_loaded(EntityKind::Opening));
        assert_eq!(store.entity_count(), 0);
    }

    #[test]
    fn supported_kinds_ignore_unknown_features() {
        let store = EntityStore::new();
        store.set_features(
            vec![
                Feature::from("scenarios"),
                Feature::from("energy"),
                Feature::from("lights"),
            ],
            ServerInfo::default(),
        );
        assert_eq!(
            store.supported_kinds(),
            vec![EntityKind::Light, EntityKind::Scenario]
        );
        assert_eq!(store.features().len(), 3);
        assert!(store.features_loaded());
    }
}
