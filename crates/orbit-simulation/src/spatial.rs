//! Spatial hash broad phase
//!
//! Positions are bucketed into a fixed 3D grid; only objects sharing a
//! cell become candidate pairs. Cell size is chosen well above typical
//! per-tick motion so candidates are not missed at normal time scales.

use std::collections::HashMap;

use glam::DVec3;
use orbit_physics::ObjectId;

/// Grid cell coordinates for a position.
#[inline]
pub fn cell_key(position: DVec3, cell_size: f64) -> (i32, i32, i32) {
    (
        (position.x / cell_size).floor() as i32,
        (position.y / cell_size).floor() as i32,
        (position.z / cell_size).floor() as i32,
    )
}

/// Fixed-grid spatial hash over object positions.
pub struct SpatialHash {
    cell_size: f64,
    buckets: HashMap<(i32, i32, i32), Vec<ObjectId>>,
}

impl SpatialHash {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            buckets: HashMap::new(),
        }
    }

    /// Build from an iterator of live `(id, position)` pairs.
    pub fn build(cell_size: f64, objects: impl Iterator<Item = (ObjectId, DVec3)>) -> Self {
        let mut hash = Self::new(cell_size);
        for (id, position) in objects {
            hash.insert(id, position);
        }
        hash
    }

    pub fn insert(&mut self, id: ObjectId, position: DVec3) {
        self.buckets
            .entry(cell_key(position, self.cell_size))
            .or_default()
            .push(id);
    }

    /// Buckets holding at least two objects — the only ones that can
    /// produce candidate pairs.
    pub fn crowded_buckets(&self) -> impl Iterator<Item = &[ObjectId]> {
        self.buckets
            .values()
            .filter(|ids| ids.len() > 1)
            .map(|ids| ids.as_slice())
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearby_objects_share_a_cell() {
        let a = DVec3::new(7000.0, 10.0, -20.0);
        let b = DVec3::new(7040.0, 55.0, -90.0);
        assert_eq!(cell_key(a, 100.0), cell_key(b, 100.0));
    }

    #[test]
    fn negative_coordinates_floor_correctly() {
        assert_eq!(cell_key(DVec3::new(-1.0, 0.0, 0.0), 100.0), (-1, 0, 0));
        assert_eq!(cell_key(DVec3::new(-101.0, 0.0, 0.0), 100.0), (-2, 0, 0));
    }

    #[test]
    fn only_shared_buckets_are_crowded() {
        let objects = [
            (ObjectId(0), DVec3::new(7000.0, 0.0, 0.0)),
            (ObjectId(1), DVec3::new(7010.0, 0.0, 0.0)),
            (ObjectId(2), DVec3::new(-7000.0, 0.0, 0.0)),
        ];
        let hash = SpatialHash::build(100.0, objects.into_iter());
        let crowded: Vec<_> = hash.crowded_buckets().collect();
        assert_eq!(crowded.len(), 1);
        assert_eq!(crowded[0], &[ObjectId(0), ObjectId(1)]);
    }
}
