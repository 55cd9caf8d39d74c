//! Time-gated entity creation
//!
//! Each entity class has its own `SpawnRule`. A class that has never
//! spawned (or was re-armed by a restart) is ready immediately.

use glam::Vec2;
use rand::Rng;

use super::entity::Bounds;
use crate::tuning::{Span, SpawnRule};

/// Per-class rate limiter
#[derive(Debug, Clone)]
pub struct Spawner<C> {
    classes: Vec<ClassTimer<C>>,
}

#[derive(Debug, Clone)]
struct ClassTimer<C> {
    class: C,
    rule: SpawnRule,
    last_spawn: Option<f64>,
}

impl<C: Copy + PartialEq + std::fmt::Debug> Spawner<C> {
    /// Every class must be declared up front with its rule
    pub fn new(rules: impl IntoIterator<Item = (C, SpawnRule)>) -> Self {
        Self {
            classes: rules
                .into_iter()
                .map(|(class, rule)| ClassTimer {
                    class,
                    rule,
                    last_spawn: None,
                })
                .collect(),
        }
    }

    /// Returns true (and records `now`) if the class may spawn at `now`
    pub fn maybe_spawn(&mut self, class: C, now: f64) -> bool {
        let Some(timer) = self.classes.iter_mut().find(|t| t.class == class) else {
            log::warn!("spawn requested for undeclared class {:?}", class);
            return false;
        };
        let ready = match timer.last_spawn {
            None => true,
            Some(last) => now - last > timer.rule.interval_ms,
        };
        if ready {
            timer.last_spawn = Some(now);
        }
        ready
    }

    /// Forget all spawn times so every class is ready again
    pub fn rearm(&mut self) {
        for timer in &mut self.classes {
            timer.last_spawn = None;
        }
    }
}

/// Edge of the playfield an entity enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// X coordinate for an item falling from the top, uniform over the width
pub fn falling_x<R: Rng + ?Sized>(rng: &mut R, bounds: Bounds, inset: f32) -> f32 {
    Span::new(0.0, (bounds.width - inset).max(0.0)).sample(rng)
}

/// Position just outside `edge` and a velocity pointing into the playfield
///
/// The inward component is drawn from `inward`; the component along the
/// edge is uniform in `[-drift, drift)`.
pub fn edge_entry<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: Bounds,
    edge: Edge,
    offset: f32,
    inward: Span,
    drift: f32,
) -> (Vec2, Vec2) {
    let along = Span::new(-drift, drift);
    let speed = inward.sample(rng);
    match edge {
        Edge::Top => (
            Vec2::new(rng.random::<f32>() * bounds.width, -offset),
            Vec2::new(along.sample(rng), speed),
        ),
        Edge::Right => (
            Vec2::new(bounds.width + offset, rng.random::<f32>() * bounds.height),
            Vec2::new(-speed, along.sample(rng)),
        ),
        Edge::Bottom => (
            Vec2::new(rng.random::<f32>() * bounds.width, bounds.height + offset),
            Vec2::new(along.sample(rng), -speed),
        ),
        Edge::Left => (
            Vec2::new(-offset, rng.random::<f32>() * bounds.height),
            Vec2::new(speed, along.sample(rng)),
        ),
    }
}
