//! Orbital geometry helpers: vis-viva, classification, tangent frames

use glam::DVec3;

use crate::constants::*;
use crate::object::OrbitClass;

/// Altitude above the mean Earth surface (km).
#[inline]
pub fn altitude_km(position: DVec3) -> f64 {
    position.length() - EARTH_RADIUS_KM
}

/// Circular orbital speed at radius `r` km: `v = sqrt(μ/r)` (km/s).
#[inline]
pub fn circular_speed(r: f64) -> f64 {
    (MU_EARTH / r).sqrt()
}

/// Vis-viva speed at radius `r` on an orbit with semi-major axis `a`:
/// `v² = μ(2/r − 1/a)` (km/s).
#[inline]
pub fn vis_viva_speed(r: f64, a: f64) -> f64 {
    (MU_EARTH * (2.0 / r - 1.0 / a)).max(0.0).sqrt()
}

/// Orbital period of a bound orbit with semi-major axis `a` (s).
#[inline]
pub fn orbital_period(a: f64) -> f64 {
    std::f64::consts::TAU * (a.powi(3) / MU_EARTH).sqrt()
}

/// Specific orbital energy: `E = v²/2 − μ/r` (km²/s²). Negative for
/// bound orbits.
#[inline]
pub fn orbital_energy(position: DVec3, velocity: DVec3) -> f64 {
    0.5 * velocity.length_squared() - MU_EARTH / position.length()
}

/// Eccentricity vector magnitude from a state vector.
pub fn eccentricity(position: DVec3, velocity: DVec3) -> f64 {
    let r = position.length();
    let v_squared = velocity.length_squared();
    let rdotv = position.dot(velocity);
    let e_vec = (position * (v_squared - MU_EARTH / r) - velocity * rdotv) / MU_EARTH;
    e_vec.length()
}

/// Derive the presentation orbit class from a state vector.
///
/// Eccentric orbits are HEO; the rest are binned by semi-major-axis
/// altitude: LEO below 2000 km, a band around GEO, MEO between.
pub fn classify(position: DVec3, velocity: DVec3) -> OrbitClass {
    let e = eccentricity(position, velocity);
    if e > HEO_ECCENTRICITY {
        return OrbitClass::Heo;
    }
    let energy = orbital_energy(position, velocity);
    // Unbound states only occur transiently (fragment kicks); tag by
    // current altitude instead of semi-major axis.
    let mean_alt = if energy < 0.0 {
        -MU_EARTH / (2.0 * energy) - EARTH_RADIUS_KM
    } else {
        altitude_km(position)
    };
    if mean_alt < LEO_CEILING_KM {
        OrbitClass::Leo
    } else if (mean_alt - GEO_ALTITUDE_KM).abs() <= GEO_BAND_KM {
        OrbitClass::Geo
    } else {
        OrbitClass::Meo
    }
}

/// Build an orthonormal tangent basis `(t1, t2)` perpendicular to the
/// radial direction at `position`. `t1` is the in-plane "along-track"
/// direction used for local circular velocity.
pub fn tangent_basis(position: DVec3) -> (DVec3, DVec3) {
    let r_hat = position.normalize();
    let reference = if r_hat.y.abs() < 0.9 {
        DVec3::Y
    } else {
        DVec3::X
    };
    let t1 = r_hat.cross(reference).normalize();
    let t2 = r_hat.cross(t1);
    (t1, t2)
}

/// Velocity of a circular orbit through `position`, tangential to the
/// radial direction (km/s).
pub fn local_circular_velocity(position: DVec3) -> DVec3 {
    let (t1, _) = tangent_basis(position);
    t1 * circular_speed(position.length())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn vis_viva_at_iss_altitude() {
        // r = 6771 km circular: expected ≈ 7.6686 km/s
        let v = circular_speed(6771.0);
        assert_relative_eq!(v, 7.6686, epsilon = 0.01);
        assert_relative_eq!(v, vis_viva_speed(6771.0, 6771.0), max_relative = 1e-12);
    }

    #[test]
    fn circular_orbit_classifies_leo() {
        let r = EARTH_RADIUS_KM + 400.0;
        let pos = DVec3::new(r, 0.0, 0.0);
        let vel = DVec3::new(0.0, circular_speed(r), 0.0);
        assert_eq!(classify(pos, vel), OrbitClass::Leo);
    }

    #[test]
    fn geo_band_classifies_geo() {
        let r = EARTH_RADIUS_KM + GEO_ALTITUDE_KM;
        let pos = DVec3::new(r, 0.0, 0.0);
        let vel = DVec3::new(0.0, circular_speed(r), 0.0);
        assert_eq!(classify(pos, vel), OrbitClass::Geo);
    }

    #[test]
    fn eccentric_orbit_classifies_heo() {
        // Perigee 500 km, apogee ~40000 km
        let r_p = EARTH_RADIUS_KM + 500.0;
        let r_a = EARTH_RADIUS_KM + 40_000.0;
        let a = 0.5 * (r_p + r_a);
        let pos = DVec3::new(r_p, 0.0, 0.0);
        let vel = DVec3::new(0.0, vis_viva_speed(r_p, a), 0.0);
        assert_eq!(classify(pos, vel), OrbitClass::Heo);
    }

    #[test]
    fn tangent_basis_is_orthonormal() {
        let pos = DVec3::new(3000.0, 5000.0, -2000.0);
        let (t1, t2) = tangent_basis(pos);
        let r_hat = pos.normalize();
        assert_relative_eq!(t1.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(t2.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(t1.dot(r_hat), 0.0, epsilon = 1e-12);
        assert_relative_eq!(t2.dot(r_hat), 0.0, epsilon = 1e-12);
        assert_relative_eq!(t1.dot(t2), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn local_circular_velocity_is_perpendicular() {
        let pos = DVec3::new(EARTH_RADIUS_KM + 800.0, 123.0, -456.0);
        let vel = local_circular_velocity(pos);
        assert_relative_eq!(vel.dot(pos.normalize()), 0.0, epsilon = 1e-9);
        assert_relative_eq!(
            vel.length(),
            circular_speed(pos.length()),
            max_relative = 1e-12
        );
    }

    #[test]
    fn circular_orbit_has_near_zero_eccentricity() {
        let r = EARTH_RADIUS_KM + 1000.0;
        let pos = DVec3::new(r, 0.0, 0.0);
        let vel = DVec3::new(0.0, 0.0, circular_speed(r));
        assert!(eccentricity(pos, vel) < 1e-10);
    }
}
