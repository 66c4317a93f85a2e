//! Per-tick events surfaced to collaborators
//!
//! Collision events drive debris generation and visual/audio effects;
//! removal events let the renderer drop meshes and play burn effects.
//! Both are ephemeral: emitted in a tick report, then discarded.

use glam::DVec3;
use orbit_physics::ObjectId;

/// Two objects collided this tick. Consumed immediately by the debris
/// generator; also reported outward for effects.
#[derive(Clone, Debug)]
pub struct CollisionEvent {
    pub a: ObjectId,
    pub b: ObjectId,
    /// Contact position (km), midpoint of the two bodies
    pub position: DVec3,
    /// Relative velocity magnitude (km/s)
    pub relative_speed: f64,
    /// Combined parent mass (kg)
    pub combined_mass: f64,
}

/// Why an object left the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalReason {
    /// Altitude dropped below the burnup threshold
    Reentry,
    /// Non-finite state after integration, removed to protect neighbors
    NumericalAnomaly,
    /// Consumed as a collision parent
    Consumed,
}

/// An object was destroyed and its slot reclaimed.
#[derive(Clone, Debug)]
pub struct RemovalEvent {
    pub id: ObjectId,
    /// Last known position (km)
    pub position: DVec3,
    pub reason: RemovalReason,
}
