//! Engine handle and backend abstraction
//!
//! The engine is an owned handle: no globals, no ambient state. It
//! validates commands (time multiplier allow-list, capacity clamping),
//! owns the cascade controller, and delegates the physics to one of two
//! interchangeable backends behind the [`Backend`] trait.

use glam::DVec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use orbit_physics::{
    BreakupConfig, ForceConfig, IntegratorConfig, ObjectClass, ObjectId, TIME_MULTIPLIERS,
};

use crate::cascade::{CascadeController, CascadeState};
use crate::error::EngineError;
use crate::events::{CollisionEvent, RemovalEvent, RemovalReason};
use crate::gpu::GpuBackend;
use crate::populate::{apportion, sample_seed, ClassDistribution, SEED_CLASSES};
use crate::sequential::SequentialBackend;
use crate::store::ObjectSeed;

/// Which concurrency strategy runs the physics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Single-threaded solver with full collision/debris richness.
    /// Comfortable up to roughly 10⁴ objects.
    Sequential,
    /// Data-parallel GPU compute over a flat object buffer, collision
    /// bookkeeping reduced to counters. For 10⁵–10⁶ objects.
    Gpu,
}

/// Engine construction parameters.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Hard cap on live objects
    pub capacity: usize,
    pub backend: BackendKind,
    pub forces: ForceConfig,
    pub integrator: IntegratorConfig,
    pub breakup: BreakupConfig,
    /// Fixed seed for deterministic runs; `None` seeds from the OS
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            backend: BackendKind::Sequential,
            forces: ForceConfig::default(),
            integrator: IntegratorConfig::default(),
            breakup: BreakupConfig::default(),
            rng_seed: None,
        }
    }
}

/// Read-only view of one live object.
#[derive(Clone, Debug)]
pub struct ObjectSample {
    pub id: ObjectId,
    pub position: DVec3,
    pub velocity: DVec3,
    pub altitude_km: f64,
    pub class: ObjectClass,
}

/// One renderable entry of a frame snapshot.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotEntry {
    pub id: ObjectId,
    pub position: DVec3,
    pub class: ObjectClass,
}

/// Owned per-tick state handed to the renderer; never a live reference
/// into engine storage.
#[derive(Clone, Debug, Default)]
pub struct FrameSnapshot {
    pub sim_time: f64,
    pub objects: Vec<SnapshotEntry>,
}

/// What one `step` did.
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    /// Simulation time after the tick (s)
    pub sim_time: f64,
    /// Sub-steps actually integrated
    pub sub_steps: u32,
    /// Full collision events (sequential backend; empty on GPU, which
    /// reports `collision_count` only)
    pub collisions: Vec<CollisionEvent>,
    /// Removals with reasons (sequential backend; empty on GPU)
    pub removals: Vec<RemovalEvent>,
    pub collision_count: u32,
    pub removed_count: u32,
    pub debris_created: u32,
    /// Fragments dropped by the capacity policy
    pub debris_truncated: u32,
}

/// Population seeding outcome; `seeded < requested` means the request was
/// clamped to capacity.
#[derive(Clone, Copy, Debug)]
pub struct PopulateReport {
    pub requested: usize,
    pub seeded: usize,
}

/// Aggregate telemetry for external panels.
#[derive(Clone, Debug)]
pub struct EngineStats {
    pub active_objects: usize,
    pub satellite_count: usize,
    pub debris_count: usize,
    pub average_altitude_km: f64,
    pub cascade: CascadeState,
    pub removed_total: u64,
    pub anomalies: u64,
}

/// Backend-agnostic aggregate counts.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct CoreStats {
    pub active: usize,
    pub satellites: usize,
    pub debris: usize,
    pub average_altitude_km: f64,
}

/// The two physics implementations share this seam. Both run the same
/// force and integration formulas from `orbit-physics`; they differ only
/// in concurrency strategy and in how much collision richness they keep.
pub(crate) trait Backend {
    fn seed(&mut self, seeds: Vec<ObjectSeed>) -> Vec<ObjectId>;
    fn step(&mut self, dt: f64) -> Result<TickReport, EngineError>;
    fn snapshot(&mut self) -> Result<FrameSnapshot, EngineError>;
    fn object(&self, id: ObjectId) -> Option<ObjectSample>;
    fn live_satellites(&self) -> Vec<ObjectSample>;
    fn set_object_state(&mut self, id: ObjectId, position: DVec3, velocity: DVec3) -> bool;
    fn core_stats(&self) -> CoreStats;
    fn sim_time(&self) -> f64;
}

/// The simulation engine. Owns all object state; external collaborators
/// drive it through commands and receive owned snapshots back.
pub struct Engine {
    backend: Box<dyn Backend>,
    capacity: usize,
    time_multiplier: f64,
    cascade: CascadeController,
    rng: StdRng,
    removed_total: u64,
    anomalies: u64,
}

impl Engine {
    /// Build an engine for the requested backend. GPU initialization
    /// failure is fatal here; there is no silent sequential fallback.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let backend: Box<dyn Backend> = match config.backend {
            BackendKind::Sequential => Box::new(SequentialBackend::new(&config)),
            BackendKind::Gpu => Box::new(GpuBackend::new(&config)?),
        };
        log::info!(
            "engine ready: {:?} backend, capacity {}",
            config.backend,
            config.capacity
        );
        Ok(Self {
            backend,
            capacity: config.capacity,
            time_multiplier: 1.0,
            cascade: CascadeController::new(),
            rng,
            removed_total: 0,
            anomalies: 0,
        })
    }

    /// Seed `count` objects with the requested class mix. Clamped to the
    /// remaining capacity; the report carries the shortfall.
    pub fn populate(&mut self, count: usize, distribution: &ClassDistribution) -> PopulateReport {
        let free = self.capacity - self.backend.core_stats().active;
        let target = count.min(free);
        if target < count {
            log::warn!(
                "populate clamped from {} to {} (capacity {})",
                count,
                target,
                self.capacity
            );
        }

        let counts = apportion(target, distribution);
        let mut seeds = Vec::with_capacity(target);
        for (class, &n) in SEED_CLASSES.iter().zip(counts.iter()) {
            for _ in 0..n {
                seeds.push(sample_seed(&mut self.rng, *class));
            }
        }
        let seeded = self.backend.seed(seeds).len();
        log::info!("seeded {seeded} objects ({count} requested)");
        PopulateReport {
            requested: count,
            seeded,
        }
    }

    /// Insert a single object (scenario setups, tests). Returns `None`
    /// when the store is at capacity.
    pub fn spawn(&mut self, seed: ObjectSeed) -> Option<ObjectId> {
        self.backend.seed(vec![seed]).into_iter().next()
    }

    /// Advance the simulation by `delta_seconds * time_multiplier`.
    pub fn step(&mut self, delta_seconds: f64) -> Result<TickReport, EngineError> {
        let dt = delta_seconds * self.time_multiplier;
        let report = self.backend.step(dt)?;

        self.removed_total += report.removed_count as u64;
        self.anomalies += report
            .removals
            .iter()
            .filter(|r| r.reason == RemovalReason::NumericalAnomaly)
            .count() as u64;
        if self.cascade.is_active() {
            self.cascade
                .observe(report.collision_count, report.debris_created);
        }
        Ok(report)
    }

    /// Change the time acceleration. Values outside the allow-list are
    /// ignored with a warning.
    pub fn set_time_multiplier(&mut self, value: f64) {
        if TIME_MULTIPLIERS.contains(&value) {
            self.time_multiplier = value;
        } else {
            log::warn!("rejected time multiplier {value}: not in {TIME_MULTIPLIERS:?}");
        }
    }

    pub fn time_multiplier(&self) -> f64 {
        self.time_multiplier
    }

    /// Force two satellites onto a collision course and start tracking
    /// cascade statistics.
    pub fn trigger_cascade(&mut self) {
        let satellites = self.backend.live_satellites();
        if let Some((a, b)) = self.cascade.trigger(&satellites, self.backend.sim_time()) {
            self.backend.set_object_state(a.id, a.position, a.velocity);
            self.backend.set_object_state(b.id, b.position, b.velocity);
        }
    }

    pub fn stats(&self) -> EngineStats {
        let core = self.backend.core_stats();
        EngineStats {
            active_objects: core.active,
            satellite_count: core.satellites,
            debris_count: core.debris,
            average_altitude_km: core.average_altitude_km,
            cascade: self.cascade.state(),
            removed_total: self.removed_total,
            anomalies: self.anomalies,
        }
    }

    /// Position/velocity/altitude of one object, if alive.
    pub fn object(&self, id: ObjectId) -> Option<ObjectSample> {
        self.backend.object(id)
    }

    /// Per-tick render data. On the GPU backend this resolves the
    /// in-flight read-back (and unblocks the next `step`).
    pub fn snapshot(&mut self) -> Result<FrameSnapshot, EngineError> {
        self.backend.snapshot()
    }

    pub fn sim_time(&self) -> f64 {
        self.backend.sim_time()
    }
}
