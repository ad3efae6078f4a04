use std::collections::BTreeMap;

use crate::models::{Entity, EntityId};

use super::{Filters, Repository};

/// Map-backed repository with a monotonically increasing id counter.
///
/// Ids grow with every insertion, so iterating the map in key order yields
/// records in insertion order.
#[derive(Debug, Clone)]
pub struct InMemoryRepository<E> {
    entities: BTreeMap<EntityId, E>,
    next_id: EntityId,
}

impl<E> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next `add` will assign.
    pub fn next_id(&self) -> EntityId {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entities.values()
    }

    /// Replace the whole contents, keeping each record's own id.
    ///
    /// The counter restarts at `max(id) + 1`, or 1 for an empty set.
    /// Callers reject `EntityId::MAX` beforehand; the counter saturates.
    pub fn replace_all(&mut self, entities: impl IntoIterator<Item = E>) {
        self.entities = entities.into_iter().map(|e| (e.id(), e)).collect();
        self.next_id = self
            .entities
            .keys()
            .next_back()
            .map_or(1, |max| max.saturating_add(1));
    }

    /// Insert or overwrite a record under its own id.
    pub fn restore(&mut self, entity: E) {
        let id = entity.id();
        self.next_id = self.next_id.max(id.saturating_add(1));
        self.entities.insert(id, entity);
    }
}

impl<E: Entity> Repository for InMemoryRepository<E> {
    type Entity = E;

    fn add(&mut self, mut entity: E) -> EntityId {
        let id = self.next_id;
        entity.set_id(id);
        self.entities.insert(id, entity);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn get(&self, id: EntityId) -> Option<&E> {
        self.entities.get(&id)
    }

    fn get_all(&self) -> Vec<E> {
        self.entities.values().cloned().collect()
    }

    fn update(&mut self, entity: E) -> bool {
        match self.entities.get_mut(&entity.id()) {
            Some(stored) => {
                *stored = entity;
                true
            }
            None => false,
        }
    }

    fn delete(&mut self, id: EntityId) -> Option<E> {
        self.entities.remove(&id)
    }

    fn search(&self, filters: &Filters<E::Field>) -> Vec<E> {
        self.entities
            .values()
            .filter(|e| filters.matches(*e))
            .cloned()
            .collect()
    }
}
