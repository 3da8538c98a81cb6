use std::collections::HashMap;

use crate::level::EntityKind;

use super::collision::{detect_overlaps, Side};
use super::entity::{Contact, Entity, EntityId, EntitySpawn};

/// Overlapping pair produced by one registry update. `side` is the side of
/// `a` that `b` touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub a: EntityId,
    pub b: EntityId,
    pub side: Side,
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Owns every live entity of a session. Removal tombstones immediately and
/// storage is compacted once per tick, so ids handed out earlier in a tick
/// stay valid to look up (they just resolve to nothing).
#[derive(Debug, Default)]
pub struct EntityRegistry {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
    /// Storage slot of every entity, tombstoned ones included. Rebuilt by
    /// `compact`.
    slots: HashMap<EntityId, usize>,
    pending_removals: Vec<EntityId>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, spawn: EntitySpawn) -> EntityId {
        let id = self.allocator.allocate();
        self.slots.insert(id, self.entities.len());
        self.entities.push(Entity::from_spawn(id, spawn));
        id
    }

    /// Marks an entity removed. It stops updating and colliding at once and is
    /// dropped from storage at the next [`EntityRegistry::compact`].
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.get_mut(id) else {
            return false;
        };
        entity.tombstoned = true;
        entity.active = false;
        self.pending_removals.push(id);
        true
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let index = self.live_index(id)?;
        self.entities.get(index)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let index = self.live_index(id)?;
        self.entities.get_mut(index)
    }

    pub fn get_all(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter().filter(|entity| !entity.tombstoned)
    }

    pub fn first_of_kind(&self, kind: EntityKind) -> Option<EntityId> {
        self.get_all()
            .find(|entity| entity.kind == kind)
            .map(|entity| entity.id)
    }

    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.get_all().filter(|entity| entity.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.get_all().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending_removal_count(&self) -> usize {
        self.pending_removals.len()
    }

    /// Runs every active entity's update hook, then tests the post-update
    /// snapshot for overlaps. Both collision hooks of each pair fire before
    /// the pair is returned for response.
    pub fn update(&mut self, dt: f32) -> Vec<CollisionPair> {
        for entity in self.entities.iter_mut() {
            if entity.active && !entity.tombstoned {
                entity.update(dt);
            }
        }

        let overlaps = detect_overlaps(&self.entities);
        let mut pairs = Vec::with_capacity(overlaps.len());
        for overlap in overlaps {
            let a_id = self.entities[overlap.a].id;
            let a_kind = self.entities[overlap.a].kind;
            let b_id = self.entities[overlap.b].id;
            let b_kind = self.entities[overlap.b].kind;

            self.entities[overlap.a].on_collision(Contact {
                other: b_id,
                other_kind: b_kind,
                side: overlap.side,
            });
            self.entities[overlap.b].on_collision(Contact {
                other: a_id,
                other_kind: a_kind,
                side: overlap.side.opposite(),
            });
            pairs.push(CollisionPair {
                a: a_id,
                b: b_id,
                side: overlap.side,
            });
        }
        pairs
    }

    /// Mutable access to two distinct live entities at once.
    pub fn pair_mut(&mut self, a: EntityId, b: EntityId) -> Option<(&mut Entity, &mut Entity)> {
        if a == b {
            return None;
        }
        let index_a = self.live_index(a)?;
        let index_b = self.live_index(b)?;
        if index_a < index_b {
            let (head, tail) = self.entities.split_at_mut(index_b);
            Some((&mut head[index_a], &mut tail[0]))
        } else {
            let (head, tail) = self.entities.split_at_mut(index_a);
            Some((&mut tail[0], &mut head[index_b]))
        }
    }

    /// Physically drops tombstoned entities.
    pub fn compact(&mut self) {
        if self.pending_removals.is_empty() {
            return;
        }
        self.pending_removals.sort_by_key(|id| id.0);
        self.pending_removals.dedup();
        let pending = &self.pending_removals;
        self.entities.retain(|entity| {
            pending
                .binary_search_by_key(&entity.id.0, |id| id.0)
                .is_err()
        });
        self.pending_removals.clear();
        self.slots = self
            .entities
            .iter()
            .enumerate()
            .map(|(index, entity)| (entity.id, index))
            .collect();
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.slots.clear();
        self.pending_removals.clear();
    }

    fn live_index(&self, id: EntityId) -> Option<usize> {
        let index = *self.slots.get(&id)?;
        self.entities
            .get(index)
            .filter(|entity| entity.id == id && !entity.tombstoned)
            .map(|_| index)
    }
}
