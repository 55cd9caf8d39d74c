//! Playable titles
//!
//! Each title is a `Game` policy over the shared `sim` building blocks.
//! `create` is the single dispatch point from a catalog id to a controller.

pub mod bubble;
pub mod dance;
pub mod nugget;
pub mod snail;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::controller::{Controller, GameController};
use crate::error::GameError;
use crate::hud::Hud;
use crate::renderer::Surface;
use crate::settings::Settings;
use crate::sim::Bounds;
use crate::tuning::Tuning;

pub use bubble::BubbleGumBlitz;
pub use dance::DanceBattle;
pub use nugget::NuggetChaos;
pub use snail::SnailRace;

/// Titles with a controller implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TitleId {
    #[serde(rename = "chicken-nugget-chaos")]
    Nugget,
    #[serde(rename = "bubble-gum-blitz")]
    Bubble,
    #[serde(rename = "snail-racing-league")]
    Snail,
    #[serde(rename = "dance-battle-objects")]
    Dance,
}

impl TitleId {
    pub const ALL: [TitleId; 4] = [
        TitleId::Nugget,
        TitleId::Bubble,
        TitleId::Snail,
        TitleId::Dance,
    ];

    /// Catalog id
    pub const fn as_str(&self) -> &'static str {
        match self {
            TitleId::Nugget => "chicken-nugget-chaos",
            TitleId::Bubble => "bubble-gum-blitz",
            TitleId::Snail => "snail-racing-league",
            TitleId::Dance => "dance-battle-objects",
        }
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TitleId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TitleId::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GameError::UnsupportedTitle(s.to_string()))
    }
}

/// Everything a title needs besides its surface and HUD
#[derive(Debug, Clone)]
pub struct GameContext {
    pub seed: u64,
    pub tuning: Tuning,
    pub settings: Settings,
}

impl GameContext {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            tuning: Tuning::default(),
            settings: Settings::default(),
        }
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }
}

/// Build the controller for `title` on `surface`
pub fn create(
    title: TitleId,
    surface: Box<dyn Surface>,
    hud: Hud,
    ctx: &GameContext,
) -> Result<Box<dyn GameController>, GameError> {
    let size = surface.size();
    let bounds = Bounds::new(size.x, size.y);
    log::info!("creating {} (seed {})", title, ctx.seed);
    Ok(match title {
        TitleId::Nugget => Box::new(Controller::new(
            NuggetChaos::new(bounds, ctx),
            surface,
            hud,
        )?),
        TitleId::Bubble => Box::new(Controller::new(
            BubbleGumBlitz::new(bounds, ctx),
            surface,
            hud,
        )?),
        TitleId::Snail => Box::new(Controller::new(SnailRace::new(bounds, ctx), surface, hud)?),
        TitleId::Dance => Box::new(Controller::new(
            DanceBattle::new(bounds, ctx),
            surface,
            hud,
        )?),
    })
}
