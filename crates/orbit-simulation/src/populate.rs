//! Bulk population seeding
//!
//! Seeds objects from per-class orbital parameter ranges instead of real
//! orbital elements: each class maps to an altitude/eccentricity regime,
//! orientation is sampled uniformly, and class counts are apportioned by
//! largest remainder so the requested ratios are hit exactly.

use glam::DVec3;
use rand::Rng;

use orbit_physics::{
    circular_speed, vis_viva_speed, ObjectClass, OrbitClass, EARTH_RADIUS_KM, GEO_ALTITUDE_KM,
};

use crate::store::ObjectSeed;

/// Requested mix of seeded classes. Weights are relative; they do not
/// need to sum to one.
#[derive(Clone, Copy, Debug)]
pub struct ClassDistribution {
    pub leo: f64,
    pub meo: f64,
    pub geo: f64,
    pub heo: f64,
    pub debris: f64,
}

impl Default for ClassDistribution {
    fn default() -> Self {
        // Roughly the real LEO-heavy population
        Self {
            leo: 0.6,
            meo: 0.25,
            geo: 0.1,
            heo: 0.04,
            debris: 0.01,
        }
    }
}

/// One seeding bin: an orbit class, or pre-existing debris.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedClass {
    Leo,
    Meo,
    Geo,
    Heo,
    Debris,
}

pub const SEED_CLASSES: [SeedClass; 5] = [
    SeedClass::Leo,
    SeedClass::Meo,
    SeedClass::Geo,
    SeedClass::Heo,
    SeedClass::Debris,
];

/// Split `count` across the five bins by largest remainder, so the totals
/// always sum to exactly `count`.
pub fn apportion(count: usize, distribution: &ClassDistribution) -> [usize; 5] {
    let weights = [
        distribution.leo.max(0.0),
        distribution.meo.max(0.0),
        distribution.geo.max(0.0),
        distribution.heo.max(0.0),
        distribution.debris.max(0.0),
    ];
    let total: f64 = weights.iter().sum();
    if total <= 0.0 || count == 0 {
        let mut counts = [0; 5];
        counts[0] = count;
        return counts;
    }

    let mut counts = [0usize; 5];
    let mut remainders = [(0.0f64, 0usize); 5];
    let mut assigned = 0;
    for (i, weight) in weights.iter().enumerate() {
        let quota = count as f64 * weight / total;
        counts[i] = quota.floor() as usize;
        assigned += counts[i];
        remainders[i] = (quota - quota.floor(), i);
    }
    remainders.sort_by(|a, b| b.0.total_cmp(&a.0));
    for &(_, i) in remainders.iter().take(count - assigned) {
        counts[i] += 1;
    }
    counts
}

/// Random position/velocity for a circular orbit of radius `r` with the
/// given inclination: uniform ascending node and phase, prograde.
fn circular_state(rng: &mut impl Rng, r: f64, inclination: f64) -> (DVec3, DVec3) {
    let raan = rng.random::<f64>() * std::f64::consts::TAU;
    let phase = rng.random::<f64>() * std::f64::consts::TAU;

    // Node axis in the equatorial plane (y is Earth's polar axis), orbit
    // normal tilted off +y by the inclination
    let node = DVec3::new(raan.cos(), 0.0, raan.sin());
    let normal = DVec3::new(
        -raan.sin() * inclination.sin(),
        inclination.cos(),
        raan.cos() * inclination.sin(),
    );
    let in_plane = normal.cross(node);

    let position = (node * phase.cos() + in_plane * phase.sin()) * r;
    let direction = in_plane * phase.cos() - node * phase.sin();
    (position, direction * circular_speed(r))
}

/// Sample one object seed for a bin.
pub fn sample_seed(rng: &mut impl Rng, class: SeedClass) -> ObjectSeed {
    match class {
        SeedClass::Leo => {
            let altitude = rng.random_range(300.0..2000.0);
            let inclination = rng.random_range(0.0..std::f64::consts::PI);
            let (position, velocity) =
                circular_state(rng, EARTH_RADIUS_KM + altitude, inclination);
            satellite_seed(rng, position, velocity, OrbitClass::Leo)
        }
        SeedClass::Meo => {
            let altitude = rng.random_range(2000.0..30_000.0);
            let inclination = rng.random_range(0.0..1.2);
            let (position, velocity) =
                circular_state(rng, EARTH_RADIUS_KM + altitude, inclination);
            satellite_seed(rng, position, velocity, OrbitClass::Meo)
        }
        SeedClass::Geo => {
            // Geostationary belt: equatorial, tight altitude band
            let altitude = GEO_ALTITUDE_KM + rng.random_range(-50.0..50.0);
            let inclination = rng.random_range(0.0..0.05);
            let (position, velocity) =
                circular_state(rng, EARTH_RADIUS_KM + altitude, inclination);
            satellite_seed(rng, position, velocity, OrbitClass::Geo)
        }
        SeedClass::Heo => {
            // Molniya-style: low perigee, high apogee, seeded at perigee
            let perigee = EARTH_RADIUS_KM + rng.random_range(400.0..1200.0);
            let apogee = EARTH_RADIUS_KM + rng.random_range(35_000.0..45_000.0);
            let a = 0.5 * (perigee + apogee);
            let inclination = rng.random_range(0.8..1.2);
            let (position, direction) = circular_state(rng, perigee, inclination);
            let velocity = direction.normalize() * vis_viva_speed(perigee, a);
            satellite_seed(rng, position, velocity, OrbitClass::Heo)
        }
        SeedClass::Debris => {
            let altitude = rng.random_range(300.0..2000.0);
            let inclination = rng.random_range(0.0..std::f64::consts::PI);
            let (position, mut velocity) =
                circular_state(rng, EARTH_RADIUS_KM + altitude, inclination);
            // Old breakup remnants: slightly perturbed off circular
            velocity += DVec3::new(
                rng.random_range(-0.05..0.05),
                rng.random_range(-0.05..0.05),
                rng.random_range(-0.05..0.05),
            );
            let mass = rng.random_range(0.1..50.0);
            ObjectSeed {
                position,
                velocity,
                mass,
                radius: orbit_physics::radius_from_mass(mass),
                class: ObjectClass::Debris,
                orbit: OrbitClass::Leo,
            }
        }
    }
}

fn satellite_seed(
    rng: &mut impl Rng,
    position: DVec3,
    velocity: DVec3,
    orbit: OrbitClass,
) -> ObjectSeed {
    ObjectSeed {
        position,
        velocity,
        mass: rng.random_range(200.0..8000.0),
        radius: rng.random_range(0.002..0.02),
        class: ObjectClass::Satellite,
        orbit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit_physics::{altitude_km, orbital_energy};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn apportionment_is_exact() {
        let counts = apportion(100_000, &ClassDistribution::default());
        assert_eq!(counts.iter().sum::<usize>(), 100_000);
        assert_eq!(counts, [60_000, 25_000, 10_000, 4_000, 1_000]);
    }

    #[test]
    fn apportionment_handles_awkward_counts() {
        let distribution = ClassDistribution {
            leo: 1.0,
            meo: 1.0,
            geo: 1.0,
            heo: 0.0,
            debris: 0.0,
        };
        let counts = apportion(100, &distribution);
        assert_eq!(counts.iter().sum::<usize>(), 100);
        // 33.3 each, two bins rounded up
        assert!(counts[..3].iter().all(|&c| c == 33 || c == 34));
    }

    #[test]
    fn zero_weight_distribution_defaults_to_leo() {
        let distribution = ClassDistribution {
            leo: 0.0,
            meo: 0.0,
            geo: 0.0,
            heo: 0.0,
            debris: 0.0,
        };
        assert_eq!(apportion(10, &distribution), [10, 0, 0, 0, 0]);
    }

    #[test]
    fn seeded_orbits_are_bound_and_in_band() {
        let mut rng = StdRng::seed_from_u64(11);
        for class in SEED_CLASSES {
            for _ in 0..50 {
                let seed = sample_seed(&mut rng, class);
                assert!(seed.mass > 0.0);
                assert!(seed.radius > 0.0);
                assert!(
                    orbital_energy(seed.position, seed.velocity) < 0.0,
                    "{class:?} seed must be bound"
                );
                let alt = altitude_km(seed.position);
                match class {
                    SeedClass::Leo | SeedClass::Debris => {
                        assert!((300.0..2000.0).contains(&alt))
                    }
                    SeedClass::Meo => assert!((2000.0..30_000.0).contains(&alt)),
                    SeedClass::Geo => assert!((alt - GEO_ALTITUDE_KM).abs() <= 50.0),
                    SeedClass::Heo => assert!((400.0..1200.0).contains(&alt)),
                }
            }
        }
    }

    #[test]
    fn circular_state_velocity_is_tangential() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let r = rng.random_range(6700.0..45_000.0);
            let inclination = rng.random_range(0.0..std::f64::consts::PI);
            let (pos, vel) = circular_state(&mut rng, r, inclination);
            assert!((pos.length() - r).abs() < 1e-6);
            assert!(pos.normalize().dot(vel.normalize()).abs() < 1e-9);
            assert!((vel.length() - circular_speed(r)).abs() < 1e-9);
        }
    }
}
