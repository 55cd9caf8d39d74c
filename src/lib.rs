//! Chaos Arcade - arcade mini-games on a shared 2D game loop
//!
//! Core modules:
//! - `sim`: Entity store, spawning, collisions, particles and phase timers
//! - `controller`: The `Game` policy trait and the generic tick/lifecycle driver
//! - `games`: The four playable titles, each a thin policy over `sim`
//! - `renderer`: Immediate-mode drawing surface and procedural shapes
//! - `clock`: Frame scheduling (animation frames on the web, manual in tests)
//! - `input`: Pointer/keyboard translation into game input
//! - `host`: Catalog dispatch, entitlement gate, mount/unmount
//! - `tuning`: Data-driven game balance

pub mod catalog;
pub mod clock;
pub mod controller;
pub mod error;
pub mod games;
pub mod host;
pub mod hud;
pub mod input;
pub mod progress;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use controller::{ControllerHandle, GameController, Status};
pub use error::GameError;
pub use games::{GameContext, TitleId};
pub use progress::Progress;
pub use settings::{QualityPreset, Settings};

/// Engine-wide constants
pub mod consts {
    /// Logical surface resolution, independent of the displayed size
    pub const SURFACE_WIDTH: f32 = 800.0;
    pub const SURFACE_HEIGHT: f32 = 600.0;

    /// Nominal display refresh rate the per-tick speeds are tuned for
    pub const NOMINAL_TICK_HZ: f64 = 60.0;
    /// Milliseconds between ticks at the nominal rate
    pub const NOMINAL_FRAME_MS: f64 = 1000.0 / NOMINAL_TICK_HZ;

    /// Upper bound on cosmetic particles alive per game
    pub const MAX_PARTICLES: usize = 256;
}

/// Wrap an angle into [0, τ)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(std::f32::consts::TAU)
}
