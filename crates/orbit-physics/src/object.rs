//! Object types shared by the sequential and GPU backends

use bytemuck::Zeroable;
use glam::DVec3;

/// Stable identifier of a tracked object. Unique while the object is
/// alive; never reassigned to debris spawned in the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of body an object is
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectClass {
    Satellite = 1,
    Debris = 2,
}

/// Presentation grouping by orbital regime. Assigned at spawn, carried
/// through for the renderer; never consulted by the physics.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrbitClass {
    Leo = 0,
    Meo = 1,
    Geo = 2,
    Heo = 3,
}

impl OrbitClass {
    pub const ALL: [OrbitClass; 4] = [
        OrbitClass::Leo,
        OrbitClass::Meo,
        OrbitClass::Geo,
        OrbitClass::Heo,
    ];
}

/// Full-precision object state used by the sequential backend.
#[derive(Debug, Clone)]
pub struct SpaceObject {
    pub id: ObjectId,
    /// Position (km), Earth-centered inertial
    pub position: DVec3,
    /// Velocity (km/s)
    pub velocity: DVec3,
    /// Mass (kg), > 0 while alive
    pub mass: f64,
    /// Effective collision radius (km), > 0 while alive
    pub radius: f64,
    pub class: ObjectClass,
    pub orbit: OrbitClass,
    /// Simulation time at creation (s)
    pub created_at: f64,
}

// Slot status values shared with the WGSL side. A zeroed buffer reads as
// all-free, so freshly created storage needs no seeding pass.
pub const STATUS_FREE: u32 = 0;
pub const STATUS_SATELLITE: u32 = 1;
pub const STATUS_DEBRIS: u32 = 2;
pub const STATUS_BURNED: u32 = 3;

/// GPU-compatible object record, aligned for WGSL struct compatibility.
/// One slot per object in the flat state buffer; `status == STATUS_FREE`
/// marks an unused slot.
#[repr(C)]
#[derive(Clone, Copy, Debug, Zeroable)]
pub struct GpuObject {
    /// Position in km
    pub position: [f32; 3],
    /// Slot status (STATUS_* above)
    pub status: u32,

    /// Velocity in km/s
    pub velocity: [f32; 3],
    /// Mass in kg
    pub mass: f32,

    /// Collision radius in km
    pub radius: f32,
    /// Stable object id
    pub id: u32,
    /// Simulation time at creation (s)
    pub created_at: f32,
    /// OrbitClass as u32
    pub orbit_class: u32,
}

// Safety: GpuObject is repr(C) and all fields are Pod-safe f32/u32 with no
// implicit padding (48 bytes total).
unsafe impl bytemuck::Pod for GpuObject {}

impl GpuObject {
    pub fn from_object(obj: &SpaceObject) -> Self {
        Self {
            position: obj.position.as_vec3().to_array(),
            status: match obj.class {
                ObjectClass::Satellite => STATUS_SATELLITE,
                ObjectClass::Debris => STATUS_DEBRIS,
            },
            velocity: obj.velocity.as_vec3().to_array(),
            mass: obj.mass as f32,
            radius: obj.radius as f32,
            id: obj.id.0,
            created_at: obj.created_at as f32,
            orbit_class: obj.orbit as u32,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status == STATUS_SATELLITE || self.status == STATUS_DEBRIS
    }

    pub fn class(&self) -> Option<ObjectClass> {
        match self.status {
            STATUS_SATELLITE => Some(ObjectClass::Satellite),
            STATUS_DEBRIS => Some(ObjectClass::Debris),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_object_layout_matches_wgsl() {
        // The WGSL struct is three vec4-sized rows.
        assert_eq!(std::mem::size_of::<GpuObject>(), 48);
        assert_eq!(std::mem::align_of::<GpuObject>(), 4);

        let obj = GpuObject {
            position: [1.0, 2.0, 3.0],
            status: STATUS_SATELLITE,
            velocity: [4.0, 5.0, 6.0],
            mass: 100.0,
            radius: 0.01,
            id: 42,
            created_at: 0.0,
            orbit_class: OrbitClass::Leo as u32,
        };
        let bytes = bytemuck::bytes_of(&obj);
        // status sits at offset 12, id at offset 36
        assert_eq!(&bytes[12..16], &STATUS_SATELLITE.to_le_bytes());
        assert_eq!(&bytes[36..40], &42u32.to_le_bytes());
    }

    #[test]
    fn zeroed_slot_is_free() {
        let slot = GpuObject::zeroed();
        assert_eq!(slot.status, STATUS_FREE);
        assert!(!slot.is_alive());
        assert!(slot.class().is_none());
    }
}
