//! Shared simulation building blocks
//!
//! Everything the titles have in common lives here:
//! - Fixed per-tick displacement (no delta-time scaling)
//! - Seeded RNG only, owned by each game
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies beyond `Color` for particles

pub mod collision;
pub mod entity;
pub mod particles;
pub mod phase;
pub mod spawn;

pub use collision::{Aabb, Circle, circles_overlap, claim_hits, within};
pub use entity::{Boundary, Bounds, Entity, EntityStore};
pub use particles::{Particle, ParticleField, Trail};
pub use phase::{Deadline, Outcome, Phase};
pub use spawn::{Edge, Spawner, edge_entry, falling_x};
