//! # Orbit Simulation Engine
//!
//! Owns all orbital object state and advances it tick by tick: gravity
//! and drag, reentry lifecycle, spatial-hash collision detection,
//! statistical debris generation, and a deliberately triggerable
//! collision cascade. Two interchangeable backends implement the same
//! physical model: a sequential solver with full collision richness, and
//! a GPU compute backend for up to a million objects.
//!
//! External collaborators (a renderer, telemetry panels) drive the engine
//! through [`Engine`] commands and receive owned snapshots back; nothing
//! outside this crate ever holds a reference into the object store.

pub mod cascade;
pub mod collision;
pub mod debris;
pub mod engine;
pub mod error;
pub mod events;
mod gpu;
pub mod params;
pub mod populate;
mod sequential;
pub mod spatial;
pub mod store;
pub mod test_util;

pub use cascade::CascadeState;
pub use engine::{
    BackendKind, Engine, EngineConfig, EngineStats, FrameSnapshot, ObjectSample, PopulateReport,
    SnapshotEntry, TickReport,
};
pub use error::{CapacityExceeded, EngineError};
pub use events::{CollisionEvent, RemovalEvent, RemovalReason};
pub use populate::ClassDistribution;
pub use store::{ObjectSeed, ObjectStore};
