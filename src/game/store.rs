use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Anything kept in an [`EntityStore`].
pub trait Entity {
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display;

    fn id(&self) -> Self::Id;
}

/// Insertion-ordered arena with an id index.
///
/// Every cross-reference between entities is an id looked up here, never a
/// pointer. Iteration follows insertion order, which the engine relies on for
/// tie-breaking (pope election) and for the order wars resolve in.
#[derive(Debug, Clone)]
pub struct EntityStore<T: Entity> {
    entries: Vec<T>,
    index: HashMap<T::Id, usize>,
}

impl<T: Entity> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn from_entries(entries: Vec<T>) -> Result<Self, DuplicateId<T::Id>> {
        let mut store = Self::new();
        for entity in entries {
            let id = entity.id();
            if store.index.contains_key(&id) {
                return Err(DuplicateId(id));
            }
            store.insert(entity);
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.index.get(&id).map(|&pos| &self.entries[pos])
    }

    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        match self.index.get(&id) {
            Some(&pos) => Some(&mut self.entries[pos]),
            None => None,
        }
    }

    /// Inserts a new entity at the end, or replaces one with the same id in place.
    pub fn insert(&mut self, entity: T) {
        let id = entity.id();
        match self.index.get(&id) {
            Some(&pos) => self.entries[pos] = entity,
            None => {
                self.index.insert(id, self.entries.len());
                self.entries.push(entity);
            }
        }
    }

    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        let pos = self.index.remove(&id)?;
        let removed = self.entries.remove(pos);
        for entity in &self.entries[pos..] {
            if let Some(slot) = self.index.get_mut(&entity.id()) {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.entries.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = T::Id> + '_ {
        self.entries.iter().map(Entity::id)
    }

    /// The entity at insertion position `pos`.
    pub fn nth(&self, pos: usize) -> Option<&T> {
        self.entries.get(pos)
    }
}

impl<'a, T: Entity> IntoIterator for &'a EntityStore<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<T: Entity + PartialEq> PartialEq for EntityStore<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<T: Entity + Serialize> Serialize for EntityStore<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de, T: Entity + Deserialize<'de>> Deserialize<'de> for EntityStore<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<T>::deserialize(deserializer)?;
        Self::from_entries(entries).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicate entity id {0}")]
pub struct DuplicateId<I: fmt::Debug + fmt::Display>(pub I);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Thing {
        id: u32,
        label: &'static str,
    }

    impl Entity for Thing {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }
    }

    fn thing(id: u32, label: &'static str) -> Thing {
        Thing { id, label }
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut store = EntityStore::new();
        store.insert(thing(30, "c"));
        store.insert(thing(10, "a"));
        store.insert(thing(20, "b"));
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![30, 10, 20]);
    }

    #[test]
    fn insert_existing_id_replaces_in_place() {
        let mut store = EntityStore::new();
        store.insert(thing(1, "a"));
        store.insert(thing(2, "b"));
        store.insert(thing(1, "z"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.nth(0).map(|t| t.label), Some("z"));
    }

    #[test]
    fn remove_keeps_index_consistent() {
        let mut store = EntityStore::new();
        for id in 0..5 {
            store.insert(thing(id, "x"));
        }
        assert_eq!(store.remove(1).map(|t| t.id), Some(1));
        assert!(store.remove(1).is_none());
        for id in [0, 2, 3, 4] {
            assert_eq!(store.get(id).map(|t| t.id), Some(id));
        }
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![0, 2, 3, 4]);
    }

    #[test]
    fn from_entries_rejects_duplicates() {
        let err = EntityStore::from_entries(vec![thing(1, "a"), thing(1, "b")]).unwrap_err();
        assert_eq!(err, DuplicateId(1));
    }
}
