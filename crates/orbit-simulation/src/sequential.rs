//! Sequential backend: the full-richness single-threaded solver
//!
//! Runs the complete per-tick pipeline in order on one thread: sub-stepped
//! integration with per-sub-step lifecycle checks, spatial-hash collision
//! detection, and per-fragment debris generation. The intended operating
//! range is up to roughly ten thousand objects.

use rand::rngs::StdRng;
use rand::SeedableRng;

use glam::DVec3;
use orbit_physics::{
    altitude_km, integrate_sub_step, BreakupConfig, ForceConfig, IntegratorConfig, ObjectClass,
    ObjectId, StepOutcome,
};

use crate::collision;
use crate::debris;
use crate::engine::{
    Backend, CoreStats, EngineConfig, FrameSnapshot, ObjectSample, SnapshotEntry, TickReport,
};
use crate::error::EngineError;
use crate::events::{RemovalEvent, RemovalReason};
use crate::store::{ObjectSeed, ObjectStore};

pub(crate) struct SequentialBackend {
    store: ObjectStore,
    sim_time: f64,
    forces: ForceConfig,
    integrator: IntegratorConfig,
    breakup: BreakupConfig,
    rng: StdRng,
}

impl SequentialBackend {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            store: ObjectStore::new(config.capacity),
            sim_time: 0.0,
            forces: config.forces,
            integrator: config.integrator,
            breakup: config.breakup,
            rng: match config.rng_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            },
        }
    }

    fn sample(obj: &orbit_physics::SpaceObject) -> ObjectSample {
        ObjectSample {
            id: obj.id,
            position: obj.position,
            velocity: obj.velocity,
            altitude_km: altitude_km(obj.position),
            class: obj.class,
        }
    }
}

impl Backend for SequentialBackend {
    fn seed(&mut self, seeds: Vec<ObjectSeed>) -> Vec<ObjectId> {
        let mut ids = Vec::with_capacity(seeds.len());
        for seed in seeds {
            match self.store.allocate(seed, self.sim_time) {
                Ok(id) => ids.push(id),
                Err(_) => break,
            }
        }
        ids
    }

    fn step(&mut self, dt: f64) -> Result<TickReport, EngineError> {
        let plan = self.integrator.plan(dt);
        let mut removals: Vec<RemovalEvent> = Vec::new();

        let ids = self.store.ids();
        for sub in 0..plan.count {
            let t = self.sim_time + sub as f64 * plan.step;
            for &id in &ids {
                let Some(obj) = self.store.get_mut(id) else {
                    continue; // removed in an earlier sub-step
                };
                let outcome = integrate_sub_step(
                    &mut obj.position,
                    &mut obj.velocity,
                    t,
                    plan.step,
                    &self.forces,
                );
                let reason = match outcome {
                    StepOutcome::Alive => continue,
                    StepOutcome::Reentered => RemovalReason::Reentry,
                    StepOutcome::Anomaly => RemovalReason::NumericalAnomaly,
                };
                if let Some(lost) = self.store.free(id) {
                    log::debug!("{} removed: {:?}", id, reason);
                    removals.push(RemovalEvent {
                        id,
                        position: lost.position,
                        reason,
                    });
                }
            }
        }
        self.sim_time += plan.count as f64 * plan.step;

        // Removed objects are already out of the store, so they cannot
        // participate in this tick's collision pass.
        let events = collision::detect(&self.store, self.integrator.sub_step);
        let outcome = debris::generate(
            &mut self.store,
            &events,
            self.sim_time,
            &mut self.rng,
            &self.breakup,
            &mut removals,
        );

        Ok(TickReport {
            sim_time: self.sim_time,
            sub_steps: plan.count,
            collision_count: events.len() as u32,
            removed_count: removals.len() as u32,
            debris_created: outcome.created as u32,
            debris_truncated: outcome.truncated as u32,
            collisions: events,
            removals,
        })
    }

    fn snapshot(&mut self) -> Result<FrameSnapshot, EngineError> {
        Ok(FrameSnapshot {
            sim_time: self.sim_time,
            objects: self
                .store
                .iter()
                .map(|obj| SnapshotEntry {
                    id: obj.id,
                    position: obj.position,
                    class: obj.class,
                })
                .collect(),
        })
    }

    fn object(&self, id: ObjectId) -> Option<ObjectSample> {
        self.store.get(id).map(Self::sample)
    }

    fn live_satellites(&self) -> Vec<ObjectSample> {
        self.store
            .iter()
            .filter(|obj| obj.class == ObjectClass::Satellite)
            .map(Self::sample)
            .collect()
    }

    fn set_object_state(&mut self, id: ObjectId, position: DVec3, velocity: DVec3) -> bool {
        match self.store.get_mut(id) {
            Some(obj) => {
                obj.position = position;
                obj.velocity = velocity;
                true
            }
            None => false,
        }
    }

    fn core_stats(&self) -> CoreStats {
        let mut stats = CoreStats::default();
        let mut altitude_sum = 0.0;
        for obj in self.store.iter() {
            stats.active += 1;
            match obj.class {
                ObjectClass::Satellite => stats.satellites += 1,
                ObjectClass::Debris => stats.debris += 1,
            }
            altitude_sum += altitude_km(obj.position);
        }
        if stats.active > 0 {
            stats.average_altitude_km = altitude_sum / stats.active as f64;
        }
        stats
    }

    fn sim_time(&self) -> f64 {
        self.sim_time
    }
}
