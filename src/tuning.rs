//! Data-driven game balance
//!
//! Every spawn interval, speed range and score value lives here instead of
//! being scattered through the titles. Defaults reproduce the shipped
//! balance; `Tuning::from_json` overlays a partial JSON document.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Inclusive-exclusive numeric range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform sample; a degenerate span always yields `min`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.random_range(self.min..self.max)
        } else {
            self.min
        }
    }
}

/// Rate limit for one entity class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRule {
    /// Minimum milliseconds between two spawns of the class (exclusive)
    pub interval_ms: f64,
}

impl SpawnRule {
    pub const fn every_ms(interval_ms: f64) -> Self {
        Self { interval_ms }
    }
}

/// Particle burst emitted on a game event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    pub count: usize,
    /// Maximum velocity component, pixels per tick
    pub speed: f32,
    pub life_ticks: u32,
}

impl Burst {
    pub const fn new(count: usize, speed: f32, life_ticks: u32) -> Self {
        Self {
            count,
            speed,
            life_ticks,
        }
    }
}

/// Balance for every title
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub nugget: NuggetTuning,
    pub bubble: BubbleTuning,
    pub snail: SnailTuning,
    pub dance: DanceTuning,
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let tuning = serde_json::from_str(json)?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One falling item class (nugget or sauce)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallingItem {
    pub spawn: SpawnRule,
    /// Pixels per tick
    pub speed: Span,
    /// Box edge length
    pub size: Span,
    /// Score on catch; ignored for lethal items
    pub points: u64,
}

impl Default for FallingItem {
    fn default() -> Self {
        Self {
            spawn: SpawnRule::every_ms(1500.0),
            speed: Span::new(2.0, 5.0),
            size: Span::new(20.0, 35.0),
            points: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NuggetTuning {
    pub basket_width: f32,
    pub basket_height: f32,
    pub basket_y: f32,
    pub basket_start_x: f32,
    /// Pixels moved per arrow key press
    pub key_step: f32,
    pub nugget: FallingItem,
    pub sauce: FallingItem,
    /// Spawn x is drawn from `[0, width - spawn_inset)`
    pub spawn_inset: f32,
    pub spawn_y: f32,
    pub cull_margin: f32,
    pub catch_burst: Burst,
}

impl Default for NuggetTuning {
    fn default() -> Self {
        Self {
            basket_width: 60.0,
            basket_height: 40.0,
            basket_y: 550.0,
            basket_start_x: 400.0,
            key_step: 20.0,
            nugget: FallingItem::default(),
            sauce: FallingItem {
                spawn: SpawnRule::every_ms(3000.0),
                speed: Span::new(1.5, 3.5),
                size: Span::new(25.0, 35.0),
                points: 0,
            },
            spawn_inset: 30.0,
            spawn_y: -30.0,
            cull_margin: 50.0,
            catch_burst: Burst::new(6, 3.0, 30),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleTuning {
    pub enemy_spawn: SpawnRule,
    /// How far outside the edge enemies appear
    pub edge_offset: f32,
    /// Speed toward the playfield, pixels per tick
    pub inward_speed: Span,
    /// Maximum sideways speed, pixels per tick
    pub lateral_drift: f32,
    pub enemy_size: Span,
    pub trap_points: u64,
    /// Trapped enemies are consumed after this many ticks
    pub trapped_ttl_ticks: u32,
    pub bubble_start_size: f32,
    pub bubble_growth: f32,
    pub bubble_shrink: f32,
    pub bubble_max_size: Span,
    /// Round is lost once this many untrapped enemies are on the field
    pub max_free_enemies: usize,
    /// Untrapped enemies are dropped once this far outside the field
    pub stray_margin: f32,
    pub trap_burst: Burst,
}

impl Default for BubbleTuning {
    fn default() -> Self {
        Self {
            enemy_spawn: SpawnRule::every_ms(2000.0),
            edge_offset: 20.0,
            inward_speed: Span::new(1.0, 3.0),
            lateral_drift: 2.0,
            enemy_size: Span::new(15.0, 25.0),
            trap_points: 50,
            trapped_ttl_ticks: 120,
            bubble_start_size: 10.0,
            bubble_growth: 2.0,
            bubble_shrink: 1.0,
            bubble_max_size: Span::new(60.0, 100.0),
            max_free_enemies: 12,
            stray_margin: 100.0,
            trap_burst: Burst::new(5, 2.0, 20),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnailTuning {
    pub start_x: f32,
    pub first_lane_y: f32,
    pub lane_spacing: f32,
    /// Base speed per snail, pixels per tick
    pub speed: Span,
    /// Per-tick multiplier applied to the base speed
    pub jitter: Span,
    /// Finish line sits this far from the right edge
    pub finish_inset: f32,
    pub trail_length: usize,
    pub setup_ms: f64,
    pub countdown_from: u32,
    pub countdown_step_ms: f64,
    pub go_banner_ticks: u32,
    pub win_points: u64,
    pub placement_base: u64,
    pub placement_step: u64,
}

impl Default for SnailTuning {
    fn default() -> Self {
        Self {
            start_x: 50.0,
            first_lane_y: 100.0,
            lane_spacing: 60.0,
            speed: Span::new(0.2, 0.5),
            jitter: Span::new(0.8, 1.2),
            finish_inset: 100.0,
            trail_length: 20,
            setup_ms: 1000.0,
            countdown_from: 3,
            countdown_step_ms: 1000.0,
            go_banner_ticks: 30,
            win_points: 1000,
            placement_base: 600,
            placement_step: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DanceTuning {
    pub intro_ms: f64,
    pub result_ms: f64,
    /// Ticks between two revealed moves while watching
    pub beat_ticks: u32,
    pub initial_length: usize,
    pub length_increment: usize,
    pub max_length: usize,
    /// Minimum positional accuracy that advances the round
    pub pass_accuracy: f32,
    pub points_per_round: f32,
    pub move_burst: Burst,
}

impl Default for DanceTuning {
    fn default() -> Self {
        Self {
            intro_ms: 2000.0,
            result_ms: 3000.0,
            beat_ticks: 60,
            initial_length: 4,
            length_increment: 1,
            max_length: 8,
            pass_accuracy: 0.8,
            points_per_round: 100.0,
            move_burst: Burst::new(8, 5.0, 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{"bubble": {"trap_points": 75}}"#).unwrap();
        assert_eq!(tuning.bubble.trap_points, 75);
        assert_eq!(tuning.bubble.enemy_spawn.interval_ms, 2000.0);
        assert_eq!(tuning.nugget.sauce.spawn.interval_ms, 3000.0);
        assert_eq!(tuning.dance.max_length, 8);
        assert_eq!(tuning.bubble.trap_burst, Burst::new(5, 2.0, 20));
    }

    #[test]
    fn test_burst_override() {
        let json = r#"{"nugget": {"catch_burst": {"count": 2, "speed": 1.0, "life_ticks": 5}}}"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.nugget.catch_burst, Burst::new(2, 1.0, 5));
        assert_eq!(tuning.nugget.cull_margin, 50.0);
        assert_eq!(tuning.bubble.stray_margin, 100.0);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = Tuning::from_json("{ nope").unwrap_err();
        assert!(matches!(err, GameError::Config(_)));
    }

    #[test]
    fn test_json_roundtrip_of_defaults() {
        let json = Tuning::default().to_json().unwrap();
        let back = Tuning::from_json(&json).unwrap();
        assert_eq!(back.snail.win_points, 1000);
        assert_eq!(back.nugget.basket_y, 550.0);
    }

    #[test]
    fn test_span_sampling_stays_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        let span = Span::new(2.0, 5.0);
        for _ in 0..500 {
            let v = span.sample(&mut rng);
            assert!((2.0..5.0).contains(&v));
        }
        assert_eq!(Span::new(3.0, 3.0).sample(&mut rng), 3.0);
    }
}
