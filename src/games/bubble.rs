//! Bubble Gum Blitz
//!
//! Click to blow a bubble that grows, peaks and shrinks away. Critters drift
//! in from the edges; one that touches a bubble is trapped (+50), stops, fades
//! and is consumed. Too many free critters at once ends the round.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{GameContext, TitleId};
use crate::controller::{Game, ensure_finite};
use crate::error::GameError;
use crate::input::InputEvent;
use crate::renderer::{Color, Frame, Layer, TextStyle, shapes};
use crate::sim::{
    Boundary, Bounds, Circle, Edge, EntityStore, Outcome, ParticleField, Phase, Spawner,
    circles_overlap, claim_hits, edge_entry,
};
use crate::tuning::BubbleTuning;

const PALETTE: [Color; 5] = [
    Color::hex(0xFF69B4),
    Color::hex(0x00CED1),
    Color::hex(0x98FB98),
    Color::hex(0xFFB6C1),
    Color::hex(0x87CEEB),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bubble {
    pub growing: bool,
    pub max_size: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Critter {
    pub trapped: bool,
    /// Ticks since trapped
    pub held: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EnemyClass;

pub struct BubbleGumBlitz {
    tuning: BubbleTuning,
    bounds: Bounds,
    rng: Pcg32,
    /// `pos` is the center, `size` the diameter
    bubbles: EntityStore<Bubble>,
    /// `pos` is the center, `size` the body radius, drawn and hit alike
    critters: EntityStore<Critter>,
    spawner: Spawner<EnemyClass>,
    particles: ParticleField,
    score: u64,
    phase: Phase,
}

impl BubbleGumBlitz {
    pub fn new(bounds: Bounds, ctx: &GameContext) -> Self {
        let tuning = ctx.tuning.bubble.clone();
        Self {
            spawner: Spawner::new([(EnemyClass, tuning.enemy_spawn)]),
            bounds,
            rng: Pcg32::seed_from_u64(ctx.seed),
            bubbles: EntityStore::new(),
            critters: EntityStore::new(),
            particles: ParticleField::new(ctx.settings.max_particles()),
            score: 0,
            phase: Phase::Active,
            tuning,
        }
    }

    pub fn bubbles(&self) -> &EntityStore<Bubble> {
        &self.bubbles
    }

    pub fn critters(&self) -> &EntityStore<Critter> {
        &self.critters
    }

    pub fn free_critters(&self) -> usize {
        self.critters.count_where(|e| !e.kind.trapped)
    }

    /// Blow a new bubble at `at`
    pub fn blow(&mut self, at: Vec2) -> u32 {
        let color = PALETTE[self.rng.random_range(0..PALETTE.len())];
        let max_size = self.tuning.bubble_max_size.sample(&mut self.rng);
        self.bubbles.spawn(
            Bubble {
                growing: true,
                max_size,
                color,
            },
            at,
            Vec2::ZERO,
            self.tuning.bubble_start_size,
        )
    }

    /// Put a critter on the field
    pub fn release(&mut self, pos: Vec2, vel: Vec2, radius: f32) -> u32 {
        self.critters.spawn(Critter::default(), pos, vel, radius)
    }

    fn spawn_critter(&mut self) {
        let edge = Edge::random(&mut self.rng);
        let (pos, vel) = edge_entry(
            &mut self.rng,
            self.bounds,
            edge,
            self.tuning.edge_offset,
            self.tuning.inward_speed,
            self.tuning.lateral_drift,
        );
        let radius = self.tuning.enemy_size.sample(&mut self.rng);
        self.release(pos, vel, radius);
    }

    fn grow_bubbles(&mut self) {
        let (growth, shrink) = (self.tuning.bubble_growth, self.tuning.bubble_shrink);
        for bubble in self.bubbles.alive_mut() {
            if bubble.kind.growing {
                bubble.size += growth;
                if bubble.size >= bubble.kind.max_size {
                    bubble.kind.growing = false;
                }
            } else {
                bubble.size = (bubble.size - shrink).max(0.0);
                if bubble.size <= 0.0 {
                    bubble.alive = false;
                }
            }
        }
        self.bubbles.compact();
    }

    /// Trap free critters touching any bubble; each scores once
    fn trap(&mut self) {
        let sources: Vec<(Circle, Color)> = self
            .bubbles
            .alive()
            .map(|b| (Circle::new(b.pos, b.size / 2.0), b.kind.color))
            .collect();
        let mut pops = Vec::new();
        let trapped = claim_hits(
            self.critters.alive_mut(),
            &sources,
            |c| c.kind.trapped,
            |c, (bubble, _)| circles_overlap(&Circle::new(c.pos, c.size), bubble),
            |c, &(_, color)| {
                c.kind.trapped = true;
                c.vel = Vec2::ZERO;
                pops.push((c.pos, color));
            },
        );
        self.score += u64::from(trapped) * self.tuning.trap_points;
        let burst = self.tuning.trap_burst;
        for (at, color) in pops {
            self.particles.burst(
                &mut self.rng,
                at,
                burst.count,
                burst.speed,
                burst.life_ticks,
                color,
            );
        }
    }

    fn expire_trapped(&mut self) {
        let ttl = self.tuning.trapped_ttl_ticks;
        for critter in self.critters.alive_mut() {
            if critter.kind.trapped {
                critter.kind.held += 1;
                if critter.kind.held >= ttl {
                    critter.alive = false;
                }
            }
        }
    }

    fn fade(&self, critter: &Critter) -> f32 {
        if !critter.trapped || self.tuning.trapped_ttl_ticks == 0 {
            return 1.0;
        }
        1.0 - critter.held as f32 / self.tuning.trapped_ttl_ticks as f32
    }
}

impl Game for BubbleGumBlitz {
    const TITLE: TitleId = TitleId::Bubble;

    fn update(&mut self, now: f64) {
        if self.phase.is_final() {
            return;
        }

        if self.spawner.maybe_spawn(EnemyClass, now) {
            self.spawn_critter();
        }

        self.grow_bubbles();
        self.critters.step();
        self.trap();
        self.critters.apply_boundary(self.bounds, Boundary::Reflect);
        self.critters.apply_boundary(
            self.bounds,
            Boundary::Cull {
                margin: self.tuning.stray_margin,
            },
        );
        self.expire_trapped();
        self.critters.compact();
        self.particles.step(0.95);

        let free = self.free_critters();
        if free >= self.tuning.max_free_enemies {
            log::info!(
                "{}: overrun by {} critters, final score {}",
                Self::TITLE,
                free,
                self.score
            );
            self.phase = Phase::Terminal(Outcome::Lost);
        }
    }

    fn render(&self, frame: &mut Frame<'_>) {
        shapes::vertical_gradient(
            frame.layer(Layer::Background),
            &[(0.0, Color::hex(0x4B0082)), (1.0, Color::hex(0x9400D3))],
        );

        let s = frame.layer(Layer::Entities);
        for bubble in self.bubbles.alive() {
            shapes::bubble(s, bubble.pos, bubble.size, bubble.kind.color);
        }
        for critter in self.critters.alive() {
            shapes::critter(
                s,
                critter.pos,
                critter.size,
                critter.kind.trapped,
                self.fade(&critter.kind),
            );
        }

        shapes::particles(frame.layer(Layer::Particles), &self.particles, 3.0);

        let s = frame.layer(Layer::Hud);
        let pink = Color::hex(0xFFB6C1);
        shapes::title(s, "BUBBLE GUM BLITZ", 40.0, pink);
        s.fill_text(
            &format!(
                "Free critters: {}/{}",
                self.free_critters(),
                self.tuning.max_free_enemies
            ),
            Vec2::new(20.0, 30.0),
            &TextStyle::new(14.0, Color::WHITE).left(),
        );
        shapes::instructions(s, "Click to create bubbles and trap the enemies!");

        if self.phase.is_final() {
            shapes::game_over(frame.layer(Layer::Overlay), self.score);
        }
    }

    fn handle_input(&mut self, event: InputEvent) {
        if self.phase.is_final() {
            return;
        }
        if let InputEvent::PointerDown(at) = event {
            self.blow(at);
        }
    }

    fn reset(&mut self) {
        self.bubbles.clear();
        self.critters.clear();
        self.spawner.rearm();
        self.particles.clear();
        self.score = 0;
        self.phase = Phase::Active;
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn check(&self) -> Result<(), GameError> {
        ensure_finite(Self::TITLE, &self.bubbles)?;
        ensure_finite(Self::TITLE, &self.critters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{NOMINAL_FRAME_MS, SURFACE_HEIGHT, SURFACE_WIDTH};

    fn game(seed: u64) -> BubbleGumBlitz {
        BubbleGumBlitz::new(
            Bounds::new(SURFACE_WIDTH, SURFACE_HEIGHT),
            &GameContext::new(seed),
        )
    }

    #[test]
    fn test_trap_scores_exactly_once() {
        let mut g = game(1);
        g.handle_input(InputEvent::PointerDown(Vec2::new(100.0, 100.0)));
        let id = g.release(Vec2::new(105.0, 104.0), Vec2::ZERO, 15.0);
        g.update(0.0);
        assert_eq!(g.score(), 50);
        assert!(g.critters().get(id).unwrap().kind.trapped);

        // Few enough ticks that the edge spawn cannot reach the bubble
        for i in 1..6 {
            g.update(i as f64 * NOMINAL_FRAME_MS);
        }
        assert_eq!(g.score(), 50);
    }

    #[test]
    fn test_contact_uses_drawn_body_radius() {
        let mut g = game(8);
        g.blow(Vec2::new(200.0, 200.0));
        // Bubble radius 6 after the first tick; body reaches 20 past center
        let grazing = g.release(Vec2::new(225.0, 200.0), Vec2::ZERO, 20.0);
        let clear = g.release(Vec2::new(200.0, 230.0), Vec2::ZERO, 20.0);
        g.update(0.0);
        assert!(g.critters().get(grazing).unwrap().kind.trapped);
        assert!(!g.critters().get(clear).unwrap().kind.trapped);
        assert_eq!(g.score(), 50);
    }

    #[test]
    fn test_trap_burst_follows_tuning() {
        let mut ctx = GameContext::new(9);
        ctx.tuning.bubble.trap_burst.count = 11;
        let mut g = BubbleGumBlitz::new(Bounds::new(SURFACE_WIDTH, SURFACE_HEIGHT), &ctx);
        g.blow(Vec2::new(400.0, 300.0));
        g.release(Vec2::new(400.0, 300.0), Vec2::ZERO, 15.0);
        g.update(0.0);
        assert_eq!(g.particles.len(), 11);
    }

    #[test]
    fn test_trapped_critter_stops_and_expires() {
        let mut g = game(2);
        g.blow(Vec2::new(400.0, 300.0));
        let id = g.release(Vec2::new(400.0, 300.0), Vec2::new(1.0, 1.0), 20.0);
        g.update(0.0);
        let pos = g.critters().get(id).unwrap().pos;
        g.update(1.0);
        assert_eq!(g.critters().get(id).unwrap().pos, pos);

        for i in 2..=120 {
            g.update(i as f64);
        }
        assert!(g.critters().get(id).is_none());
    }

    #[test]
    fn test_bubble_grows_then_shrinks_away() {
        let mut g = game(3);
        let id = g.blow(Vec2::new(400.0, 300.0));
        g.update(0.0);
        assert_eq!(g.bubbles().get(id).unwrap().size, 12.0);

        let mut peak: f32 = 0.0;
        for i in 1..200 {
            g.update(i as f64);
            if let Some(b) = g.bubbles().get(id) {
                peak = peak.max(b.size);
            }
        }
        assert!(g.bubbles().get(id).is_none());
        assert!((60.0..102.0).contains(&peak), "peak {}", peak);
    }

    #[test]
    fn test_enemy_spawns_rate_limited() {
        let mut g = game(4);
        g.update(0.0);
        assert_eq!(g.critters().len(), 1);
        g.update(2000.0);
        assert_eq!(g.critters().len(), 1);
        g.update(2001.0);
        assert_eq!(g.critters().len(), 2);
    }

    #[test]
    fn test_overrun_loses_round() {
        let mut g = game(5);
        for i in 0..10 {
            g.release(Vec2::new(300.0 + i as f32 * 10.0, 300.0), Vec2::ZERO, 15.0);
        }
        g.update(0.0);
        assert_eq!(g.free_critters(), 11);
        assert_eq!(g.phase(), Phase::Active);

        g.release(Vec2::new(500.0, 500.0), Vec2::ZERO, 15.0);
        g.update(1.0);
        assert_eq!(g.phase(), Phase::Terminal(Outcome::Lost));

        g.handle_input(InputEvent::PointerDown(Vec2::new(300.0, 300.0)));
        assert!(g.bubbles().is_empty(), "no bubbles after the round ends");
    }

    #[test]
    fn test_critters_reflect_inside_field() {
        let mut g = game(6);
        let id = g.release(Vec2::new(799.0, 300.0), Vec2::new(3.0, 0.0), 15.0);
        g.update(0.0);
        let c = g.critters().get(id).unwrap();
        assert!(c.vel.x < 0.0);
        g.update(1.0);
        assert!(g.critters().get(id).unwrap().pos.x < 802.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut g = game(7);
        g.blow(Vec2::new(100.0, 100.0));
        g.release(Vec2::new(105.0, 104.0), Vec2::ZERO, 15.0);
        g.update(0.0);
        g.reset();
        assert_eq!(g.score(), 0);
        assert!(g.bubbles().is_empty() && g.critters().is_empty());
        assert_eq!(g.phase(), Phase::Active);
    }
}
