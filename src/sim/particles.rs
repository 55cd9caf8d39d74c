//! Cosmetic trails and particles
//!
//! Purely visual: nothing in here is ever read by collision resolution.
//! Both containers are bounded and drop their oldest element first.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use crate::renderer::Color;

/// Bounded position history (newest at the back)
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<Vec2>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a position, dropping the oldest when full
    pub fn record(&mut self, pos: Vec2) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(pos);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest to newest
    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().copied()
    }
}

/// A decaying point
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    /// Ticks left to live
    pub life: u32,
    pub max_life: u32,
}

impl Particle {
    /// Remaining life in [0, 1]
    pub fn fade(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        }
    }
}

/// Bounded particle pool
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: VecDeque<Particle>,
    capacity: usize,
}

impl ParticleField {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: VecDeque::new(),
            capacity,
        }
    }

    /// Emit `count` particles at `origin` with velocity components uniform
    /// in `[-speed, speed)`
    pub fn burst<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        origin: Vec2,
        count: usize,
        speed: f32,
        life: u32,
        color: Color,
    ) {
        for _ in 0..count {
            let vel = Vec2::new(
                (rng.random::<f32>() - 0.5) * 2.0 * speed,
                (rng.random::<f32>() - 0.5) * 2.0 * speed,
            );
            self.push(Particle {
                pos: origin,
                vel,
                color,
                life,
                max_life: life,
            });
        }
    }

    pub fn push(&mut self, particle: Particle) {
        if self.capacity == 0 {
            return;
        }
        if self.particles.len() == self.capacity {
            self.particles.pop_front();
        }
        self.particles.push_back(particle);
    }

    /// Move, damp and age every particle; expired ones are removed
    pub fn step(&mut self, damping: f32) {
        for p in self.particles.iter_mut() {
            p.pos += p.vel;
            p.vel *= damping;
            p.life = p.life.saturating_sub(1);
        }
        self.particles.retain(|p| p.life > 0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}
