//! Forced-collision cascade orchestration ("Kessler syndrome" demo)
//!
//! A cascade is a deterministic, operator-triggered event: two live
//! satellites are put on a guaranteed collision course, and from then on
//! every detected collision feeds the cascade statistics.

use glam::DVec3;
use orbit_physics::{
    tangent_basis, ObjectId, CASCADE_CLOSING_SPEED_KM_S, CASCADE_OFFSET_KM, CELL_SIZE_KM,
    COLLISIONS_PER_CASCADE_LEVEL,
};

use crate::engine::ObjectSample;
use crate::spatial::cell_key;

/// Cascade telemetry, read by external panels.
#[derive(Clone, Copy, Debug, Default)]
pub struct CascadeState {
    pub active: bool,
    pub collision_count: u32,
    pub debris_generated: u32,
    /// Simulation time the cascade was triggered (s)
    pub started_at: f64,
}

impl CascadeState {
    /// Derived severity tier.
    pub fn cascade_level(&self) -> u32 {
        self.collision_count / COLLISIONS_PER_CASCADE_LEVEL
    }
}

/// New kinematic state for one satellite of the forced pair.
#[derive(Clone, Copy, Debug)]
pub struct ForcedState {
    pub id: ObjectId,
    pub position: DVec3,
    pub velocity: DVec3,
}

/// Separation beyond which the pair is teleported to a shared midpoint.
const TELEPORT_DISTANCE_KM: f64 = 50.0;

/// Center of the broad-phase grid cell containing `position`.
fn cell_center(position: DVec3) -> DVec3 {
    let (x, y, z) = cell_key(position, CELL_SIZE_KM);
    DVec3::new(
        (x as f64 + 0.5) * CELL_SIZE_KM,
        (y as f64 + 0.5) * CELL_SIZE_KM,
        (z as f64 + 0.5) * CELL_SIZE_KM,
    )
}

pub struct CascadeController {
    state: CascadeState,
}

impl CascadeController {
    pub fn new() -> Self {
        Self {
            state: CascadeState::default(),
        }
    }

    pub fn state(&self) -> CascadeState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Record a tick's collisions and debris while the cascade runs.
    /// Counters only grow.
    pub fn observe(&mut self, collisions: u32, debris_generated: u32) {
        if !self.state.active {
            return;
        }
        self.state.collision_count += collisions;
        self.state.debris_generated += debris_generated;
    }

    /// Pick the forced pair and compute their converging states.
    ///
    /// Prefers the two satellites closest in altitude — the most
    /// believable seed for a cascade. Returns `None` (with a warning)
    /// when fewer than two satellites are alive.
    pub fn trigger(
        &mut self,
        satellites: &[ObjectSample],
        sim_time: f64,
    ) -> Option<(ForcedState, ForcedState)> {
        if satellites.len() < 2 {
            log::warn!(
                "cascade trigger ignored: {} live satellite(s)",
                satellites.len()
            );
            return None;
        }

        let mut by_altitude: Vec<&ObjectSample> = satellites.iter().collect();
        by_altitude.sort_by(|a, b| a.altitude_km.total_cmp(&b.altitude_km));

        let (first, second) = by_altitude
            .windows(2)
            .min_by(|w1, w2| {
                let d1 = w1[1].altitude_km - w1[0].altitude_km;
                let d2 = w2[1].altitude_km - w2[0].altitude_km;
                d1.total_cmp(&d2)
            })
            .map(|w| (w[0], w[1]))?;

        let midpoint = (first.position + second.position) * 0.5;

        // Teleport when far apart, and also when a close pair straddles a
        // broad-phase cell boundary: the bucket-only broad phase would
        // never pair them. Snapping the midpoint to its cell center puts
        // both offset points deep inside one bucket, which is what makes
        // the collision guaranteed rather than merely likely.
        let far_apart = first.position.distance(second.position) > TELEPORT_DISTANCE_KM;
        let split_cell = cell_key(first.position, CELL_SIZE_KM)
            != cell_key(second.position, CELL_SIZE_KM);
        let (pos_a, pos_b, axis) = if far_apart || split_cell {
            // The raw midpoint of two opposed orbits can sit inside the
            // planet; rebuild it on the pair's mean orbital radius first.
            let mean_radius = 0.5 * (first.position.length() + second.position.length());
            let direction = if midpoint.length() > 1.0 {
                midpoint.normalize()
            } else {
                first.position.normalize()
            };
            let center = cell_center(direction * mean_radius);
            // Converge tangentially so neither body is aimed at the
            // atmosphere while closing.
            let axis = tangent_basis(center).0;
            (
                center - axis * CASCADE_OFFSET_KM,
                center + axis * CASCADE_OFFSET_KM,
                axis,
            )
        } else {
            let separation = second.position - first.position;
            let axis = if separation.length() > 1e-6 {
                separation.normalize()
            } else {
                tangent_basis(midpoint).0
            };
            (first.position, second.position, axis)
        };

        self.state.active = true;
        self.state.started_at = sim_time;
        log::info!(
            "cascade triggered: {} vs {} at {:.0} km altitude",
            first.id,
            second.id,
            (first.altitude_km + second.altitude_km) * 0.5
        );

        Some((
            ForcedState {
                id: first.id,
                position: pos_a,
                velocity: axis * CASCADE_CLOSING_SPEED_KM_S,
            },
            ForcedState {
                id: second.id,
                position: pos_b,
                velocity: -axis * CASCADE_CLOSING_SPEED_KM_S,
            },
        ))
    }
}

impl Default for CascadeController {
    fn default() -> Self {
        Self::new()
    }
}
