//! End-to-end engine tests on the sequential backend.

use glam::DVec3;
use orbit_physics::{circular_speed, orbital_period, ForceConfig, EARTH_RADIUS_KM};
use orbit_simulation::test_util::{assertions, fixtures};
use orbit_simulation::{
    BackendKind, ClassDistribution, Engine, EngineConfig, ObjectSeed, RemovalReason,
};

fn engine(capacity: usize) -> Engine {
    Engine::new(EngineConfig {
        capacity,
        backend: BackendKind::Sequential,
        rng_seed: Some(1234),
        ..EngineConfig::default()
    })
    .expect("sequential engine never fails to initialize")
}

fn two_body_engine(capacity: usize) -> Engine {
    Engine::new(EngineConfig {
        capacity,
        backend: BackendKind::Sequential,
        forces: ForceConfig::two_body(),
        rng_seed: Some(1234),
        ..EngineConfig::default()
    })
    .unwrap()
}

#[test]
fn circular_orbit_returns_home_after_one_period() {
    let mut engine = two_body_engine(4);
    let seed = fixtures::circular_satellite(400.0);
    let r = seed.position.length();
    let id = engine.spawn(seed).unwrap();

    // Drive through the public API at 100x: each step advances 100 s of
    // simulation in 100 sub-steps.
    engine.set_time_multiplier(100.0);
    let period = orbital_period(r);
    let ticks = (period / 100.0).floor() as usize;
    for _ in 0..ticks {
        engine.step(1.0).unwrap();
    }
    let remainder = period - ticks as f64 * 100.0;
    engine.set_time_multiplier(1.0);
    engine.step(remainder).unwrap();

    let sample = engine.object(id).expect("satellite must survive an orbit");
    let radius_error = (sample.position.length() - r).abs() / r;
    assert!(
        radius_error < 0.01,
        "altitude drifted {:.3}% over one orbit",
        radius_error * 100.0
    );
}

#[test]
fn visviva_circular_speed_matches_reference() {
    // r = 6771 km, the ISS-altitude reference value
    assert!((circular_speed(6771.0) - 7.6686).abs() < 0.01);
}

#[test]
fn object_at_fifty_km_burns_up_in_one_step() {
    let mut engine = engine(4);
    let id = engine.spawn(fixtures::reentering_object(50.0)).unwrap();

    let report = engine.step(1.0 / 60.0).unwrap();

    assert!(engine.object(id).is_none());
    assert_eq!(engine.stats().active_objects, 0);
    assert_eq!(report.removed_count, 1);
    assert_eq!(report.removals[0].reason, RemovalReason::Reentry);
    assert_eq!(report.removals[0].id, id);
}

#[test]
fn forced_impact_yields_full_fragment_count() {
    let mut engine = two_body_engine(200);
    let (a, b) = fixtures::head_on_pair(680.0, 7.5, 1.0);
    engine.spawn(a).unwrap();
    engine.spawn(b).unwrap();

    let report = engine.step(0.001).unwrap();

    assert_eq!(report.collision_count, 1);
    // impactVelocity 7.5 km/s * fragmentDensityFactor 10 = 75
    assert_eq!(report.debris_created, 75);
    assert_eq!(report.debris_truncated, 0);
    let stats = engine.stats();
    assert_eq!(stats.debris_count, 75);
    assert_eq!(stats.satellite_count, 0);
}

#[test]
fn fragment_yield_clamps_to_free_slots() {
    // Capacity 10: the two parents free their slots, leaving 10
    let mut engine = two_body_engine(10);
    let (a, b) = fixtures::head_on_pair(680.0, 7.5, 1.0);
    engine.spawn(a).unwrap();
    engine.spawn(b).unwrap();

    let report = engine.step(0.001).unwrap();

    assert_eq!(report.debris_created, 10);
    assert_eq!(report.debris_truncated, 65);
    assert_eq!(engine.stats().active_objects, 10);
}

#[test]
fn populate_is_clamped_to_capacity() {
    let mut engine = engine(50);
    let report = engine.populate(100, &ClassDistribution::default());
    assert_eq!(report.requested, 100);
    assert_eq!(report.seeded, 50);
    assert_eq!(engine.stats().active_objects, 50);
}

#[test]
fn capacity_invariant_survives_cascade() {
    let capacity = 60;
    let mut engine = engine(capacity);
    engine.populate(
        40,
        &ClassDistribution {
            leo: 1.0,
            meo: 0.0,
            geo: 0.0,
            heo: 0.0,
            debris: 0.0,
        },
    );
    engine.trigger_cascade();

    for _ in 0..25 {
        engine.step(1.0 / 60.0).unwrap();
        assertions::assert_capacity_invariant(&engine, capacity);
    }
}

#[test]
fn invalid_time_multiplier_is_ignored() {
    let mut engine = engine(4);
    assert_eq!(engine.time_multiplier(), 1.0);
    engine.set_time_multiplier(37.0);
    assert_eq!(engine.time_multiplier(), 1.0);
    engine.set_time_multiplier(10_000.0);
    assert_eq!(engine.time_multiplier(), 10_000.0);
    engine.set_time_multiplier(-1.0);
    assert_eq!(engine.time_multiplier(), 10_000.0);
}

#[test]
fn time_multiplier_scales_simulated_time() {
    let mut engine = two_body_engine(4);
    engine.spawn(fixtures::circular_satellite(800.0)).unwrap();
    engine.set_time_multiplier(60.0);
    let report = engine.step(1.0).unwrap();
    assert_eq!(report.sub_steps, 60);
    assert!((engine.sim_time() - 60.0).abs() < 1e-9);
}

#[test]
fn cascade_statistics_are_monotonic() {
    let mut engine = engine(500);
    engine.populate(
        30,
        &ClassDistribution {
            leo: 1.0,
            meo: 0.0,
            geo: 0.0,
            heo: 0.0,
            debris: 0.0,
        },
    );
    engine.trigger_cascade();
    assert!(engine.stats().cascade.active);

    let mut last_collisions = 0;
    let mut last_debris = 0;
    for _ in 0..10 {
        engine.step(1.0 / 60.0).unwrap();
        let cascade = engine.stats().cascade;
        assert!(cascade.collision_count >= last_collisions);
        assert!(cascade.debris_generated >= last_debris);
        last_collisions = cascade.collision_count;
        last_debris = cascade.debris_generated;
    }
    // The forced pair is guaranteed to have hit by now
    assert!(last_collisions >= 1, "forced collision never happened");
    assert!(last_debris > 0);
}

#[test]
fn populate_hits_requested_class_ratios() {
    let mut engine = engine(100_000);
    let report = engine.populate(100_000, &ClassDistribution::default());
    assert_eq!(report.seeded, 100_000);

    let stats = engine.stats();
    assert_eq!(stats.active_objects, 100_000);
    // 1% debris bin, the rest satellites
    assert_eq!(stats.debris_count, 1000);
    assert_eq!(stats.satellite_count, 99_000);
}

#[test]
fn snapshot_is_an_owned_copy() {
    let mut engine = engine(8);
    engine.populate(5, &ClassDistribution::default());
    let before = engine.snapshot().unwrap();
    assert_eq!(before.objects.len(), 5);

    engine.step(1.0).unwrap();
    let after = engine.snapshot().unwrap();

    // The first snapshot is unaffected by later steps
    let moved = before
        .objects
        .iter()
        .zip(after.objects.iter())
        .any(|(b, a)| b.position != a.position);
    assert!(moved, "objects should have moved between snapshots");
}

#[test]
fn removed_objects_do_not_collide_in_the_same_tick() {
    let mut engine = two_body_engine(8);
    // A doomed object sitting right next to a live one: it burns during
    // the sub-step phase and must not appear in a collision event.
    let doomed = fixtures::reentering_object(50.0);
    let mut neighbor = fixtures::reentering_object(50.0);
    neighbor.position += DVec3::new(0.5, 0.0, 0.0);
    let a = engine.spawn(doomed).unwrap();
    let b = engine.spawn(neighbor).unwrap();

    let report = engine.step(1.0).unwrap();
    assert_eq!(report.collision_count, 0);
    assert_eq!(report.removed_count, 2);
    assert!(engine.object(a).is_none());
    assert!(engine.object(b).is_none());
}

#[test]
fn average_altitude_tracks_population() {
    let mut engine = two_body_engine(4);
    engine.spawn(fixtures::circular_satellite(400.0)).unwrap();
    engine.spawn(fixtures::circular_satellite(800.0)).unwrap();
    let stats = engine.stats();
    assert!((stats.average_altitude_km - 600.0).abs() < 1.0);
}

#[test]
fn object_lookup_reports_altitude() {
    let mut engine = two_body_engine(4);
    let id = engine.spawn(fixtures::circular_satellite(400.0)).unwrap();
    let sample = engine.object(id).unwrap();
    assert!((sample.altitude_km - 400.0).abs() < 1e-6);
    assert!((sample.velocity.length() - circular_speed(EARTH_RADIUS_KM + 400.0)).abs() < 1e-9);
    assert!(engine.object(orbit_physics::ObjectId(9999)).is_none());
}

#[test]
fn debris_decays_under_drag() {
    // An object skimming the drag layer loses energy every pass
    let mut engine = engine(4);
    let r = EARTH_RADIUS_KM + 150.0;
    let id = engine
        .spawn(ObjectSeed {
            position: DVec3::new(r, 0.0, 0.0),
            velocity: DVec3::new(0.0, circular_speed(r), 0.0),
            mass: 100.0,
            radius: 0.005,
            class: orbit_physics::ObjectClass::Debris,
            orbit: orbit_physics::OrbitClass::Leo,
        })
        .unwrap();

    engine.set_time_multiplier(100.0);
    let initial_speed = circular_speed(r);
    let mut burned = false;
    for _ in 0..200 {
        let report = engine.step(1.0).unwrap();
        if report.removed_count > 0 {
            burned = true;
            break;
        }
    }
    if !burned {
        let sample = engine.object(id).unwrap();
        assert!(
            sample.altitude_km < 150.0 || sample.velocity.length() < initial_speed,
            "drag should bleed altitude or speed"
        );
    }
}
