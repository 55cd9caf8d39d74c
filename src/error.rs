//! Error taxonomy shared by the engine and the host

use thiserror::Error;

/// Everything that can go wrong between mounting a title and ticking it
#[derive(Debug, Error)]
pub enum GameError {
    /// Catalog id with no controller implementation behind it
    #[error("no game controller for title `{0}`")]
    UnsupportedTitle(String),

    /// Drawing context could not be acquired or the surface is unusable
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// Simulation produced state that cannot be rendered (NaN positions, ...)
    #[error("{title}: invalid simulation state: {detail}")]
    InvalidState { title: &'static str, detail: String },

    /// Tuning/settings JSON failed to parse
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Catalog data violates its own constraints
    #[error("invalid catalog entry `{id}`: {reason}")]
    InvalidCatalog { id: String, reason: String },
}
