//! Debris emission: turns collision events into new store entries
//!
//! Capacity policy is drop-newest: fragments that do not fit in the free
//! slots are simply not created, and the shortfall is reported. Parent
//! objects are always consumed, even when no fragment fits.

use rand::Rng;

use orbit_physics::{
    breakup, classify, BreakupConfig, ObjectClass,
};

use crate::events::{CollisionEvent, RemovalEvent, RemovalReason};
use crate::store::{ObjectSeed, ObjectStore};

/// Result of one tick's debris pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebrisOutcome {
    /// Fragments actually inserted
    pub created: usize,
    /// Fragments dropped because the store was full
    pub truncated: usize,
}

/// Consume collision parents and insert their fragment clouds.
pub fn generate(
    store: &mut ObjectStore,
    events: &[CollisionEvent],
    sim_time: f64,
    rng: &mut impl Rng,
    config: &BreakupConfig,
    removals: &mut Vec<RemovalEvent>,
) -> DebrisOutcome {
    let mut outcome = DebrisOutcome::default();

    for event in events {
        // First-match-wins upstream guarantees both parents are distinct
        // and still present; guard anyway so a stale event cannot panic.
        let (Some(a), Some(b)) = (store.get(event.a), store.get(event.b)) else {
            continue;
        };
        let smaller_mass = a.mass.min(b.mass);
        let catastrophic =
            breakup::is_catastrophic(event.relative_speed, smaller_mass, event.combined_mass);

        for id in [event.a, event.b] {
            if let Some(parent) = store.free(id) {
                removals.push(RemovalEvent {
                    id,
                    position: parent.position,
                    reason: RemovalReason::Consumed,
                });
            }
        }

        let ideal =
            breakup::fragment_count(event.relative_speed, config.fragment_density_factor);
        let budget = ideal.min(store.free_slots());
        outcome.truncated += ideal - budget;

        let fragments = breakup::fragment_cloud(
            rng,
            event.position,
            event.relative_speed,
            event.combined_mass,
            catastrophic,
            budget,
            config,
        );

        for fragment in fragments {
            let seed = ObjectSeed {
                position: fragment.position,
                velocity: fragment.velocity,
                mass: fragment.mass,
                radius: fragment.radius,
                class: ObjectClass::Debris,
                orbit: classify(fragment.position, fragment.velocity),
            };
            match store.allocate(seed, sim_time) {
                Ok(_) => outcome.created += 1,
                // Cannot happen within budget; count it rather than panic
                Err(_) => outcome.truncated += 1,
            }
        }
    }
    outcome
}
