//! Collision detection: spatial-hash broad phase, distance narrow phase
//!
//! The narrow phase pads the contact distance with half the relative
//! motion of one sub-step, so fast converging pairs register before they
//! tunnel through each other. True continuous collision detection is
//! deliberately not attempted.

use std::collections::HashSet;

use orbit_physics::{ObjectId, CELL_SIZE_KM};

use crate::events::CollisionEvent;
use crate::spatial::SpatialHash;
use crate::store::ObjectStore;

/// Detect this tick's collisions among live objects.
///
/// First-match-wins: an object consumed by one collision is excluded from
/// every later candidate pair in the same tick.
pub fn detect(store: &ObjectStore, sub_step: f64) -> Vec<CollisionEvent> {
    let hash = SpatialHash::build(
        CELL_SIZE_KM,
        store.iter().map(|obj| (obj.id, obj.position)),
    );

    let mut events = Vec::new();
    let mut consumed: HashSet<ObjectId> = HashSet::new();

    for bucket in hash.crowded_buckets() {
        for (i, &id_a) in bucket.iter().enumerate() {
            if consumed.contains(&id_a) {
                continue;
            }
            for &id_b in &bucket[i + 1..] {
                if consumed.contains(&id_b) {
                    continue;
                }
                let (Some(a), Some(b)) = (store.get(id_a), store.get(id_b)) else {
                    continue;
                };

                let relative_speed = (a.velocity - b.velocity).length();
                // Fast-mover allowance: half a sub-step of relative travel
                let margin = 0.5 * relative_speed * sub_step;
                let distance = a.position.distance(b.position);

                if distance < a.radius + b.radius + margin {
                    events.push(CollisionEvent {
                        a: id_a,
                        b: id_b,
                        position: (a.position + b.position) * 0.5,
                        relative_speed,
                        combined_mass: a.mass + b.mass,
                    });
                    consumed.insert(id_a);
                    consumed.insert(id_b);
                    log::debug!(
                        "collision {id_a} x {id_b} at {:.2} km/s",
                        relative_speed
                    );
                    break;
                }
            }
        }
    }
    events
}
