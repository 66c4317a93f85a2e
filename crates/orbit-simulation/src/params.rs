//! GPU simulation parameters
//!
//! Packed into vec4 groups so the WGSL uniform layout is trivially
//! compatible; rewritten every tick with the sub-step plan.

use bytemuck::{Pod, Zeroable};

use orbit_physics::{ForceConfig, SubStepPlan, CELL_SIZE_KM, FRAGMENT_DENSITY_FACTOR};

/// Number of spatial hash buckets on the GPU grid.
pub const GRID_BUCKETS: u32 = 1 << 17;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SimParams {
    // Group 1: Stepping
    // x: sub-step seconds, y: sub-step count, z: sim time at tick start, w: object capacity
    pub step: [f32; 4],

    // Group 2: Forces
    // x: drag coefficient, y: drag enabled, z: moon attenuation, w: moon enabled
    pub forces: [f32; 4],

    // Group 3: Collision
    // x: cell size (km), y: grid buckets, z: fragment density factor, w: padding
    pub collision: [f32; 4],
}

impl SimParams {
    pub fn for_tick(plan: SubStepPlan, sim_time: f64, capacity: u32, forces: &ForceConfig) -> Self {
        Self {
            step: [
                plan.step as f32,
                plan.count as f32,
                sim_time as f32,
                capacity as f32,
            ],
            forces: [
                forces.drag_coefficient as f32,
                if forces.drag_enabled { 1.0 } else { 0.0 },
                forces.moon_attenuation as f32,
                if forces.moon_enabled { 1.0 } else { 0.0 },
            ],
            collision: [
                CELL_SIZE_KM as f32,
                GRID_BUCKETS as f32,
                FRAGMENT_DENSITY_FACTOR as f32,
                0.0,
            ],
        }
    }
}
