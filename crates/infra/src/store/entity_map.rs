use std::collections::HashMap;
use std::sync::RwLock;

use innkeep_core::Entity;

use super::{StoreError, StoreResult};

#[derive(Debug)]
struct Inner<E: Entity> {
    next_seq: u64,
    rows: HashMap<E::Id, (u64, E)>,
}

/// Lock-guarded in-memory map of entities keyed by their id.
///
/// Remembers insertion order so listings are stable. Intended for tests/dev.
#[derive(Debug)]
pub struct EntityMap<E: Entity> {
    inner: RwLock<Inner<E>>,
}

impl<E: Entity> Default for EntityMap<E> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_seq: 0,
                rows: HashMap::new(),
            }),
        }
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

impl<E> EntityMap<E>
where
    E: Entity + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, entity: E) -> StoreResult<E> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let id = entity.id().clone();
        if inner.rows.contains_key(&id) {
            return Err(StoreError::Duplicate(format!("{id:?}")));
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.rows.insert(id, (seq, entity.clone()));
        Ok(entity)
    }

    pub fn get(&self, id: &E::Id) -> StoreResult<Option<E>> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.rows.get(id).map(|(_, e)| e.clone()))
    }

    pub fn list(&self) -> StoreResult<Vec<E>> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let mut rows: Vec<&(u64, E)> = inner.rows.values().collect();
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, e)| e.clone()).collect())
    }

    /// Replace an entity in place under the write lock.
    ///
    /// `f` sees the current value and decides the next one; returning an error leaves
    /// the stored value untouched. The check and the write happen under one lock.
    pub fn update<F>(&self, id: &E::Id, f: F) -> StoreResult<Option<E>>
    where
        F: FnOnce(&E) -> StoreResult<E>,
    {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let Some((_, current)) = inner.rows.get_mut(id) else {
            return Ok(None);
        };

        let next = f(current)?;
        *current = next.clone();
        Ok(Some(next))
    }

    pub fn remove(&self, id: &E::Id) -> StoreResult<bool> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        Ok(inner.rows.remove(id).is_some())
    }

    pub fn clear(&self) -> StoreResult<u64> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let removed = inner.rows.len() as u64;
        inner.rows.clear();
        Ok(removed)
    }
}
