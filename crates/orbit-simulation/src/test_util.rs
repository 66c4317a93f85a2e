//! Test utilities: orbit fixtures and invariant assertions
//!
//! Used by the unit and integration tests; kept in the library so both
//! can share them.

use glam::DVec3;
use orbit_physics::{
    circular_speed, ObjectClass, OrbitClass, CELL_SIZE_KM, EARTH_RADIUS_KM,
};

use crate::store::ObjectSeed;

/// Fixtures for building deterministic object seeds.
pub mod fixtures {
    use super::*;

    /// A satellite on a circular equatorial orbit at the given altitude.
    pub fn circular_satellite(altitude_km: f64) -> ObjectSeed {
        let r = EARTH_RADIUS_KM + altitude_km;
        ObjectSeed {
            position: DVec3::new(r, 0.0, 0.0),
            velocity: DVec3::new(0.0, circular_speed(r), 0.0),
            mass: 1000.0,
            radius: 0.01,
            class: ObjectClass::Satellite,
            orbit: OrbitClass::Leo,
        }
    }

    /// Two satellites centered on a broad-phase cell, closing head-on at
    /// `rel_speed` km/s, `gap_km` apart. Collides on the first tick.
    pub fn head_on_pair(altitude_km: f64, rel_speed: f64, gap_km: f64) -> (ObjectSeed, ObjectSeed) {
        // Put the pair at a cell center so the broad phase pairs them
        let r = EARTH_RADIUS_KM + altitude_km;
        let x = ((r / CELL_SIZE_KM).floor() + 0.5) * CELL_SIZE_KM;
        let y = 0.5 * CELL_SIZE_KM;
        let half = rel_speed * 0.5;
        let a = ObjectSeed {
            position: DVec3::new(x, y - gap_km * 0.5, 0.0),
            velocity: DVec3::new(0.0, half, 0.0),
            mass: 1000.0,
            radius: 0.01,
            class: ObjectClass::Satellite,
            orbit: OrbitClass::Leo,
        };
        let b = ObjectSeed {
            position: DVec3::new(x, y + gap_km * 0.5, 0.0),
            velocity: DVec3::new(0.0, -half, 0.0),
            mass: 500.0,
            radius: 0.01,
            class: ObjectClass::Satellite,
            orbit: OrbitClass::Leo,
        };
        (a, b)
    }

    /// An object already below the burnup threshold.
    pub fn reentering_object(altitude_km: f64) -> ObjectSeed {
        assert!(altitude_km < 100.0, "fixture expects a doomed altitude");
        let r = EARTH_RADIUS_KM + altitude_km;
        ObjectSeed {
            position: DVec3::new(r, 0.0, 0.0),
            velocity: DVec3::new(0.0, 7.8, 0.0),
            mass: 800.0,
            radius: 0.005,
            class: ObjectClass::Satellite,
            orbit: OrbitClass::Leo,
        }
    }
}

/// Assertions over engine-level invariants.
pub mod assertions {
    use crate::engine::{Engine, EngineStats};

    /// Panics if more objects are alive than the configured capacity.
    pub fn assert_capacity_invariant(engine: &Engine, capacity: usize) {
        let EngineStats { active_objects, .. } = engine.stats();
        assert!(
            active_objects <= capacity,
            "capacity invariant violated: {active_objects} > {capacity}"
        );
    }
}
