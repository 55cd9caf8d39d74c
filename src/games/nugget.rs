//! Chicken Nugget Chaos
//!
//! Catch falling nuggets in the basket, never catch the sauce. Catching
//! sauce ends the round; the field freezes under a GAME OVER overlay until
//! restart.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::{GameContext, TitleId};
use crate::controller::{Game, ensure_finite};
use crate::error::GameError;
use crate::input::{Direction, InputEvent};
use crate::renderer::{Color, Frame, Layer, shapes};
use crate::sim::{
    Aabb, Boundary, Bounds, EntityStore, Outcome, ParticleField, Phase, Spawner, falling_x,
};
use crate::tuning::NuggetTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Falling {
    Nugget,
    Sauce,
}

const GOLD: Color = Color::hex(0xFFD700);

pub struct NuggetChaos {
    tuning: NuggetTuning,
    bounds: Bounds,
    rng: Pcg32,
    basket: Aabb,
    /// `pos` is the top-left corner, `size` the edge length
    items: EntityStore<Falling>,
    spawner: Spawner<Falling>,
    particles: ParticleField,
    score: u64,
    phase: Phase,
}

impl NuggetChaos {
    pub fn new(bounds: Bounds, ctx: &GameContext) -> Self {
        let tuning = ctx.tuning.nugget.clone();
        let spawner = Spawner::new([
            (Falling::Nugget, tuning.nugget.spawn),
            (Falling::Sauce, tuning.sauce.spawn),
        ]);
        Self {
            basket: Self::start_basket(&tuning),
            bounds,
            rng: Pcg32::seed_from_u64(ctx.seed),
            items: EntityStore::new(),
            spawner,
            particles: ParticleField::new(ctx.settings.max_particles()),
            score: 0,
            phase: Phase::Active,
            tuning,
        }
    }

    fn start_basket(tuning: &NuggetTuning) -> Aabb {
        Aabb::new(
            tuning.basket_start_x,
            tuning.basket_y,
            tuning.basket_width,
            tuning.basket_height,
        )
    }

    pub fn basket(&self) -> &Aabb {
        &self.basket
    }

    pub fn items(&self) -> &EntityStore<Falling> {
        &self.items
    }

    /// Put an item on the field; `pos` is its top-left corner
    pub fn drop_item(&mut self, kind: Falling, pos: Vec2, vel: Vec2, size: f32) -> u32 {
        self.items.spawn(kind, pos, vel, size)
    }

    fn spawn(&mut self, kind: Falling) {
        let spec = match kind {
            Falling::Nugget => &self.tuning.nugget,
            Falling::Sauce => &self.tuning.sauce,
        };
        let (speed, size) = (spec.speed, spec.size);
        let x = falling_x(&mut self.rng, self.bounds, self.tuning.spawn_inset);
        let vel = Vec2::new(0.0, speed.sample(&mut self.rng));
        let size = size.sample(&mut self.rng);
        self.drop_item(kind, Vec2::new(x, self.tuning.spawn_y), vel, size);
    }

    /// Move the basket so its left edge is at `x`, kept on the surface
    fn place_basket(&mut self, x: f32) {
        let max_x = (self.bounds.width - self.basket.size.x).max(0.0);
        self.basket.min.x = x.clamp(0.0, max_x);
    }

    /// Catches in spawn order; returns true if sauce was caught
    fn resolve_catches(&mut self) -> bool {
        let points = self.tuning.nugget.points;
        let mut caught = Vec::new();
        let mut lethal = false;
        for item in self.items.alive_mut() {
            if !self.basket.overlaps(&Aabb::square(item.pos, item.size)) {
                continue;
            }
            match item.kind {
                Falling::Nugget => {
                    item.alive = false;
                    self.score += points;
                    caught.push(item.pos + Vec2::splat(item.size / 2.0));
                }
                Falling::Sauce => {
                    lethal = true;
                    break;
                }
            }
        }
        let burst = self.tuning.catch_burst;
        for at in caught {
            self.particles.burst(
                &mut self.rng,
                at,
                burst.count,
                burst.speed,
                burst.life_ticks,
                GOLD,
            );
        }
        lethal
    }
}

impl Game for NuggetChaos {
    const TITLE: TitleId = TitleId::Nugget;

    fn update(&mut self, now: f64) {
        if self.phase.is_final() {
            return;
        }

        for kind in [Falling::Nugget, Falling::Sauce] {
            if self.spawner.maybe_spawn(kind, now) {
                self.spawn(kind);
            }
        }

        self.items.step();

        if self.resolve_catches() {
            log::info!("{}: sauce caught, final score {}", Self::TITLE, self.score);
            self.phase = Phase::Terminal(Outcome::Lost);
            return;
        }

        self.items.apply_boundary(
            self.bounds,
            Boundary::Cull {
                margin: self.tuning.cull_margin,
            },
        );
        self.items.compact();
        self.particles.step(0.95);
    }

    fn render(&self, frame: &mut Frame<'_>) {
        shapes::vertical_gradient(
            frame.layer(Layer::Background),
            &[(0.0, Color::hex(0x1a1a2e)), (1.0, Color::hex(0x16213e))],
        );

        let s = frame.layer(Layer::Entities);
        for item in self.items.alive() {
            match item.kind {
                Falling::Nugget => shapes::nugget(s, item.pos, item.size),
                Falling::Sauce => shapes::sauce(s, item.pos, item.size),
            }
        }

        shapes::basket(frame.layer(Layer::Player), &self.basket);
        shapes::particles(frame.layer(Layer::Particles), &self.particles, 3.0);

        let s = frame.layer(Layer::Hud);
        shapes::title(s, "CHICKEN NUGGET CHAOS", 40.0, GOLD);
        shapes::instructions(s, "Move to collect nuggets! Avoid the sauce!");

        if self.phase.is_final() {
            shapes::game_over(frame.layer(Layer::Overlay), self.score);
        }
    }

    fn handle_input(&mut self, event: InputEvent) {
        if self.phase.is_final() {
            return;
        }
        match event {
            InputEvent::PointerMove(p) | InputEvent::PointerDown(p) => {
                self.place_basket(p.x - self.basket.size.x / 2.0);
            }
            InputEvent::Key(Direction::Left) => {
                self.place_basket(self.basket.min.x - self.tuning.key_step);
            }
            InputEvent::Key(Direction::Right) => {
                self.place_basket(self.basket.min.x + self.tuning.key_step);
            }
            InputEvent::Key(_) => {}
        }
    }

    fn reset(&mut self) {
        self.items.clear();
        self.spawner.rearm();
        self.particles.clear();
        self.score = 0;
        self.phase = Phase::Active;
        self.basket = Self::start_basket(&self.tuning);
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn check(&self) -> Result<(), GameError> {
        if !(self.basket.min.is_finite() && self.basket.size.is_finite()) {
            return Err(GameError::InvalidState {
                title: Self::TITLE.as_str(),
                detail: format!("basket at {:?}", self.basket.min),
            });
        }
        ensure_finite(Self::TITLE, &self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{NOMINAL_FRAME_MS, SURFACE_HEIGHT, SURFACE_WIDTH};
    use crate::renderer::RecordingSurface;
    use crate::tuning::{SpawnRule, Tuning};

    fn game(seed: u64) -> NuggetChaos {
        NuggetChaos::new(
            Bounds::new(SURFACE_WIDTH, SURFACE_HEIGHT),
            &GameContext::new(seed),
        )
    }

    fn nuggets(g: &NuggetChaos) -> usize {
        g.items().count_where(|e| e.kind == Falling::Nugget)
    }

    #[test]
    fn test_catch_scores_and_removes_same_tick() {
        let mut g = game(1);
        // Spend the initial spawns so only the placed item is near the basket
        g.update(0.0);
        let id = g.drop_item(Falling::Nugget, Vec2::new(420.0, 560.0), Vec2::ZERO, 20.0);
        g.update(1.0);
        assert_eq!(g.score(), 10);
        assert!(g.items().get(id).is_none());
        assert_eq!(g.phase(), Phase::Active);
    }

    #[test]
    fn test_sauce_is_lethal_and_freezes_field() {
        let mut g = game(2);
        g.update(0.0);
        g.drop_item(Falling::Sauce, Vec2::new(410.0, 555.0), Vec2::ZERO, 30.0);
        g.update(1.0);
        assert_eq!(g.phase(), Phase::Terminal(Outcome::Lost));

        let before: Vec<Vec2> = g.items().iter().map(|e| e.pos).collect();
        g.update(5000.0);
        let after: Vec<Vec2> = g.items().iter().map(|e| e.pos).collect();
        assert_eq!(before, after);

        g.handle_input(InputEvent::PointerMove(Vec2::new(0.0, 0.0)));
        assert_eq!(g.basket().min.x, 400.0);
    }

    #[test]
    fn test_spawn_rate_limited_per_class() {
        let mut g = game(3);
        g.update(0.0);
        assert_eq!(nuggets(&g), 1);
        g.update(1500.0);
        assert_eq!(nuggets(&g), 1, "interval is exclusive");
        g.update(1501.0);
        assert_eq!(nuggets(&g), 2);
        assert_eq!(g.items().count_where(|e| e.kind == Falling::Sauce), 1);
    }

    #[test]
    fn test_store_stays_bounded_without_catches() {
        let mut ctx = GameContext::new(4);
        ctx.tuning = Tuning::default();
        ctx.tuning.nugget.sauce.spawn = SpawnRule::every_ms(f64::MAX);
        let mut g = NuggetChaos::new(Bounds::new(SURFACE_WIDTH, SURFACE_HEIGHT), &ctx);

        // Slowest nugget: 680 px at 2 px/tick is 340 ticks, about 5667 ms
        let bound = (340.0 * NOMINAL_FRAME_MS / 1500.0).ceil() as usize + 1;
        let mut now = 0.0;
        for _ in 0..3600 {
            g.update(now);
            assert!(nuggets(&g) <= bound, "{} > {}", nuggets(&g), bound);
            now += NOMINAL_FRAME_MS;
        }
        assert_eq!(g.phase(), Phase::Active);
    }

    #[test]
    fn test_basket_follows_pointer_and_keys_clamped() {
        let mut g = game(5);
        g.handle_input(InputEvent::PointerMove(Vec2::new(100.0, 300.0)));
        assert_eq!(g.basket().min.x, 70.0);
        g.handle_input(InputEvent::PointerMove(Vec2::new(10_000.0, 300.0)));
        assert_eq!(g.basket().min.x, 740.0);
        g.handle_input(InputEvent::Key(Direction::Right));
        assert_eq!(g.basket().min.x, 740.0);
        g.handle_input(InputEvent::Key(Direction::Left));
        assert_eq!(g.basket().min.x, 720.0);
    }

    #[test]
    fn test_reset_clears_field() {
        let mut g = game(6);
        g.update(0.0);
        g.drop_item(Falling::Nugget, Vec2::new(420.0, 560.0), Vec2::ZERO, 20.0);
        g.update(1.0);
        assert!(g.score() > 0);
        g.reset();
        assert_eq!(g.score(), 0);
        assert!(g.items().is_empty());
        g.update(2.0);
        assert_eq!(nuggets(&g), 1, "spawn timers re-armed");
    }

    #[test]
    fn test_game_over_overlay_every_frame() {
        let mut g = game(7);
        g.update(0.0);
        g.drop_item(Falling::Sauce, Vec2::new(410.0, 555.0), Vec2::ZERO, 30.0);
        g.update(1.0);
        let mut surface = RecordingSurface::new(SURFACE_WIDTH, SURFACE_HEIGHT);
        for _ in 0..3 {
            g.update(2.0);
            let mut frame = Frame::begin(&mut surface);
            g.render(&mut frame);
            drop(frame);
            assert!(surface.has_text("GAME OVER!"));
        }
    }

    #[test]
    fn test_non_finite_item_fails_check() {
        let mut g = game(8);
        g.drop_item(Falling::Nugget, Vec2::new(f32::NAN, 0.0), Vec2::ZERO, 20.0);
        assert!(matches!(g.check(), Err(GameError::InvalidState { .. })));
    }
}
