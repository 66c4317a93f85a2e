//! Physical constants for the orbital simulation
//!
//! Lengths are kilometers, velocities km/s, masses kg, times seconds.
//! Positions are expressed in an Earth-centered inertial frame.

/// Earth gravitational parameter GM (km³/s²)
pub const MU_EARTH: f64 = 398600.4418;

/// Mean Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Moon gravitational parameter GM (km³/s²)
pub const MU_MOON: f64 = 4902.800066;

/// Mean Earth-Moon distance (km)
pub const MOON_DISTANCE_KM: f64 = 384_400.0;

/// Moon angular rate on its simplified circular orbit (rad/s),
/// one revolution per sidereal month
pub const MOON_ANGULAR_RATE: f64 = std::f64::consts::TAU / (27.321661 * 86400.0);

/// Default scaling applied to the lunar term. The Moon is modeled as a
/// point mass on a fixed circular orbit, not a full ephemeris, so its
/// contribution is attenuated rather than taken at face value.
pub const MOON_ATTENUATION: f64 = 0.6;

/// Altitude below which atmospheric drag applies (km)
pub const DRAG_ALTITUDE_KM: f64 = 200.0;

/// Altitude below which an object burns up and is removed (km)
pub const BURNUP_ALTITUDE_KM: f64 = 100.0;

/// Density coefficient `k` in the drag law `exp(-(alt-100)/50) * k * v²`
pub const DRAG_DENSITY_COEFFICIENT: f64 = 2.5e-4;

/// Fixed physics sub-step (seconds). Tick deltas are subdivided so no
/// single integration step exceeds this.
pub const SUB_STEP_SECONDS: f64 = 1.0;

/// Maximum simulated seconds a single tick may advance; larger requests
/// are clamped before sub-stepping.
pub const MAX_TICK_SECONDS: f64 = 300.0;

/// Accepted time multipliers. Anything else is rejected with a warning.
pub const TIME_MULTIPLIERS: [f64; 6] = [1.0, 10.0, 60.0, 100.0, 1000.0, 10000.0];

/// GEO altitude (km)
pub const GEO_ALTITUDE_KM: f64 = 35_786.0;

/// Half-width of the altitude band classified as GEO (km)
pub const GEO_BAND_KM: f64 = 1500.0;

/// Upper edge of LEO (km altitude)
pub const LEO_CEILING_KM: f64 = 2000.0;

/// Eccentricity above which an orbit is tagged HEO
pub const HEO_ECCENTRICITY: f64 = 0.25;

/// Fragments generated per km/s of impact speed
pub const FRAGMENT_DENSITY_FACTOR: f64 = 10.0;

/// Dispersion of the log-normal fragment delta-v distribution
pub const DELTA_V_SIGMA: f64 = 0.4;

/// Specific impact energy (J/kg) separating catastrophic from
/// non-catastrophic breakups, per the NASA standard breakup model
pub const CATASTROPHIC_ENERGY_J_PER_KG: f64 = 40_000.0;

/// Cap on sampled fragment delta-v (km/s); keeps fragments bound
pub const MAX_FRAGMENT_DV_KM_S: f64 = 2.0;

/// Radius of the initial fragment cloud around the impact point (km)
pub const FRAGMENT_SCATTER_KM: f64 = 0.5;

/// Assumed fragment material density (kg/m³), roughly aluminum
pub const FRAGMENT_MATERIAL_DENSITY: f64 = 2700.0;

/// Collisions per cascade level while a cascade is active
pub const COLLISIONS_PER_CASCADE_LEVEL: u32 = 5;

/// Spatial hash cell edge for the collision broad phase (km)
pub const CELL_SIZE_KM: f64 = 100.0;

/// Closing speed applied to each satellite of a forced cascade pair (km/s)
pub const CASCADE_CLOSING_SPEED_KM_S: f64 = 7.5;

/// Half-separation of a forced cascade pair after teleport (km)
pub const CASCADE_OFFSET_KM: f64 = 2.5;
