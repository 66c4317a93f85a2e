//! Capacity-bounded object store with free-list slot reuse
//!
//! Slots are reused through a free-list so allocation stays O(1), but ids
//! are handed out from a monotonic counter and never reused — debris
//! spawned in the tick that consumed an object can never alias it.

use std::collections::HashMap;

use glam::DVec3;
use orbit_physics::{ObjectClass, ObjectId, OrbitClass, SpaceObject};

use crate::error::CapacityExceeded;

/// Everything needed to create an object except its id and timestamp,
/// which the store assigns.
#[derive(Clone, Debug)]
pub struct ObjectSeed {
    pub position: DVec3,
    pub velocity: DVec3,
    pub mass: f64,
    pub radius: f64,
    pub class: ObjectClass,
    pub orbit: OrbitClass,
}

/// Flat table of live objects, bounded by `capacity`.
pub struct ObjectStore {
    slots: Vec<Option<SpaceObject>>,
    free: Vec<usize>,
    index: HashMap<ObjectId, usize>,
    next_id: u32,
    capacity: usize,
}

impl ObjectStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::with_capacity(capacity),
            next_id: 0,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Slots still available before the capacity invariant bites.
    pub fn free_slots(&self) -> usize {
        self.capacity - self.len()
    }

    /// Insert a new object, reusing a freed slot when one exists.
    pub fn allocate(
        &mut self,
        seed: ObjectSeed,
        created_at: f64,
    ) -> Result<ObjectId, CapacityExceeded> {
        if self.len() >= self.capacity {
            return Err(CapacityExceeded {
                capacity: self.capacity,
            });
        }
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        let object = SpaceObject {
            id,
            position: seed.position,
            velocity: seed.velocity,
            mass: seed.mass,
            radius: seed.radius,
            class: seed.class,
            orbit: seed.orbit,
            created_at,
        };

        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(object);
                slot
            }
            None => {
                self.slots.push(Some(object));
                self.slots.len() - 1
            }
        };
        self.index.insert(id, slot);
        Ok(id)
    }

    /// Remove an object, returning its final state.
    pub fn free(&mut self, id: ObjectId) -> Option<SpaceObject> {
        let slot = self.index.remove(&id)?;
        let object = self.slots[slot].take();
        self.free.push(slot);
        object
    }

    pub fn get(&self, id: ObjectId) -> Option<&SpaceObject> {
        let slot = *self.index.get(&id)?;
        self.slots[slot].as_ref()
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SpaceObject> {
        let slot = *self.index.get(&id)?;
        self.slots[slot].as_mut()
    }

    /// Iterate live objects in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &SpaceObject> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }

    /// Ids of all live objects, in slot order. Taken as an owned list so
    /// callers can mutate the store while walking it.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|obj| obj.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> ObjectSeed {
        ObjectSeed {
            position: DVec3::new(7000.0, 0.0, 0.0),
            velocity: DVec3::new(0.0, 7.5, 0.0),
            mass: 1000.0,
            radius: 0.01,
            class: ObjectClass::Satellite,
            orbit: OrbitClass::Leo,
        }
    }

    #[test]
    fn allocate_up_to_capacity_then_reject() {
        let mut store = ObjectStore::new(3);
        for _ in 0..3 {
            store.allocate(seed(), 0.0).unwrap();
        }
        assert_eq!(store.len(), 3);
        assert_eq!(store.free_slots(), 0);
        assert!(store.allocate(seed(), 0.0).is_err());
    }

    #[test]
    fn freed_slot_is_reused_but_id_is_not() {
        let mut store = ObjectStore::new(2);
        let a = store.allocate(seed(), 0.0).unwrap();
        let b = store.allocate(seed(), 0.0).unwrap();
        store.free(a);

        let c = store.allocate(seed(), 1.0).unwrap();
        assert_ne!(c, a, "ids must never be reused");
        assert_ne!(c, b);
        assert_eq!(store.len(), 2);
        assert!(store.get(a).is_none());
        assert!(store.get(c).is_some());
    }

    #[test]
    fn free_returns_final_state() {
        let mut store = ObjectStore::new(1);
        let id = store.allocate(seed(), 5.0).unwrap();
        let object = store.free(id).unwrap();
        assert_eq!(object.id, id);
        assert_eq!(object.created_at, 5.0);
        assert!(store.free(id).is_none(), "double free is a no-op");
    }

    #[test]
    fn iteration_skips_freed_slots() {
        let mut store = ObjectStore::new(4);
        let ids: Vec<_> = (0..4)
            .map(|_| store.allocate(seed(), 0.0).unwrap())
            .collect();
        store.free(ids[1]);
        store.free(ids[3]);

        let alive: Vec<_> = store.iter().map(|obj| obj.id).collect();
        assert_eq!(alive, vec![ids[0], ids[2]]);
        assert_eq!(store.ids(), alive);
    }
}
