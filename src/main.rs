//! Orbital Debris Simulation Driver
//!
//! Headless stand-in for the renderer: builds an engine, seeds a
//! population, then drives the tick loop and prints telemetry. The real
//! front end calls the same engine API once per frame.

use std::time::Instant;

use orbit_simulation::{BackendKind, ClassDistribution, Engine, EngineConfig};

/// Simulated frame cadence of the driver loop (s)
const FRAME_SECONDS: f64 = 1.0 / 60.0;

struct Options {
    backend: BackendKind,
    count: usize,
    capacity: usize,
    ticks: u64,
    time_multiplier: f64,
    cascade_at: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            backend: BackendKind::Sequential,
            count: 5000,
            capacity: 10_000,
            ticks: 600,
            time_multiplier: 60.0,
            cascade_at: Some(120),
        }
    }
}

fn parse_options() -> Options {
    let mut options = Options::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--gpu" => {
                options.backend = BackendKind::Gpu;
                options.count = 200_000;
                options.capacity = 1_000_000;
            }
            "--count" => {
                if let Some(v) = args.next().and_then(|v| v.parse().ok()) {
                    options.count = v;
                }
            }
            "--capacity" => {
                if let Some(v) = args.next().and_then(|v| v.parse().ok()) {
                    options.capacity = v;
                }
            }
            "--ticks" => {
                if let Some(v) = args.next().and_then(|v| v.parse().ok()) {
                    options.ticks = v;
                }
            }
            "--speed" => {
                if let Some(v) = args.next().and_then(|v| v.parse().ok()) {
                    options.time_multiplier = v;
                }
            }
            "--no-cascade" => options.cascade_at = None,
            other => {
                eprintln!("unknown argument: {other}");
                eprintln!(
                    "usage: kessler [--gpu] [--count N] [--capacity N] [--ticks N] \
                     [--speed X] [--no-cascade]"
                );
                std::process::exit(2);
            }
        }
    }
    options
}

fn main() {
    env_logger::init();
    let options = parse_options();

    let mut engine = match Engine::new(EngineConfig {
        capacity: options.capacity,
        backend: options.backend,
        ..EngineConfig::default()
    }) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("engine initialization failed: {e}");
            std::process::exit(1);
        }
    };

    let report = engine.populate(options.count, &ClassDistribution::default());
    log::info!("✓ Seeded {} of {} objects", report.seeded, report.requested);

    engine.set_time_multiplier(options.time_multiplier);

    let started = Instant::now();
    for tick in 0..options.ticks {
        if options.cascade_at == Some(tick) {
            log::info!("Triggering collision cascade");
            engine.trigger_cascade();
        }

        let report = match engine.step(FRAME_SECONDS) {
            Ok(report) => report,
            Err(e) => {
                log::error!("step failed: {e}");
                std::process::exit(1);
            }
        };
        // Resolve the read-back every frame, as a renderer would
        let snapshot = match engine.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("snapshot failed: {e}");
                std::process::exit(1);
            }
        };

        if tick % 60 == 0 {
            let stats = engine.stats();
            log::info!(
                "t={:>9.0}s active={} (sat {} / debris {}) avg_alt={:.0} km \
                 collisions={} cascade_level={}",
                report.sim_time,
                stats.active_objects,
                stats.satellite_count,
                stats.debris_count,
                stats.average_altitude_km,
                stats.cascade.collision_count,
                stats.cascade.cascade_level(),
            );
            debug_assert_eq!(snapshot.objects.len(), stats.active_objects);
        }
    }

    let stats = engine.stats();
    log::info!(
        "✓ Done: {} ticks in {:.2?}, {} objects alive, {} removed, {} anomalies",
        options.ticks,
        started.elapsed(),
        stats.active_objects,
        stats.removed_total,
        stats.anomalies,
    );
}
