//! Snail Racing League
//!
//! A spectator race: five snails crawl across their lanes after a short
//! setup pause and a 3-2-1 countdown. The player backs Speedy; the result is
//! scored by where Speedy placed when the first snail crossed the line.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::{GameContext, TitleId};
use crate::controller::{Game, ensure_finite};
use crate::error::GameError;
use crate::input::InputEvent;
use crate::renderer::{Color, Frame, Layer, shapes};
use crate::sim::{Bounds, Deadline, EntityStore, Outcome, Phase, Trail};
use crate::tuning::SnailTuning;

const FIELD: [(&str, u32); 5] = [
    ("Speedy", 0xFF6B6B),
    ("Turbo", 0x4ECDC4),
    ("Lightning", 0x45B7D1),
    ("Flash", 0x96CEB4),
    ("Rocket", 0xFECA57),
];

const GOLD: Color = Color::hex(0xFFD700);

#[derive(Debug, Clone)]
pub struct Racer {
    pub name: &'static str,
    pub color: Color,
    pub is_player: bool,
    pub trail: Trail,
}

pub struct SnailRace {
    tuning: SnailTuning,
    bounds: Bounds,
    rng: Pcg32,
    /// `pos` is the snail's anchor in its lane, `vel.x` its base speed
    snails: EntityStore<Racer>,
    trail_length: usize,
    phase: Phase,
    setup: Deadline,
    step: Deadline,
    countdown: u32,
    go_ticks: u32,
    winner: Option<u32>,
    score: u64,
}

impl SnailRace {
    pub fn new(bounds: Bounds, ctx: &GameContext) -> Self {
        let tuning = ctx.tuning.snail.clone();
        let mut race = Self {
            bounds,
            rng: Pcg32::seed_from_u64(ctx.seed),
            snails: EntityStore::new(),
            trail_length: ctx.settings.trail_length(tuning.trail_length),
            phase: Phase::Setup,
            setup: Deadline::after(tuning.setup_ms),
            step: Deadline::after(tuning.countdown_step_ms),
            countdown: tuning.countdown_from,
            go_ticks: 0,
            winner: None,
            score: 0,
            tuning,
        };
        race.line_up();
        race
    }

    fn line_up(&mut self) {
        self.snails.clear();
        for (i, (name, color)) in FIELD.into_iter().enumerate() {
            let racer = Racer {
                name,
                color: Color::hex(color),
                is_player: i == 0,
                trail: Trail::new(self.trail_length),
            };
            let pos = Vec2::new(
                self.tuning.start_x,
                self.tuning.first_lane_y + i as f32 * self.tuning.lane_spacing,
            );
            let speed = self.tuning.speed.sample(&mut self.rng);
            self.snails.spawn(racer, pos, Vec2::new(speed, 0.0), 0.0);
        }
    }

    pub fn snails(&self) -> &EntityStore<Racer> {
        &self.snails
    }

    /// Digit currently shown while counting down
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn winner(&self) -> Option<&Racer> {
        self.winner
            .and_then(|id| self.snails.get(id))
            .map(|e| &e.kind)
    }

    fn finish_x(&self) -> f32 {
        self.bounds.width - self.tuning.finish_inset
    }

    fn crawl(&mut self) {
        for snail in self.snails.alive_mut() {
            let jitter = self.tuning.jitter.sample(&mut self.rng);
            snail.pos.x += snail.vel.x * jitter;
            snail.kind.trail.record(snail.pos);
        }
    }

    /// Settle the race once any snail is past the line
    fn judge(&mut self) {
        let finish = self.finish_x();
        let mut leader: Option<(u32, f32)> = None;
        for snail in self.snails.alive().filter(|s| s.pos.x >= finish) {
            if leader.is_none_or(|(_, x)| snail.pos.x > x) {
                leader = Some((snail.id, snail.pos.x));
            }
        }
        let Some((winner, _)) = leader else {
            return;
        };

        let Some((player, player_x)) = self
            .snails
            .alive()
            .find(|s| s.kind.is_player)
            .map(|s| (s.id, s.pos.x))
        else {
            return;
        };
        let player_won = player == winner;
        self.score = if player_won {
            self.tuning.win_points
        } else {
            let ahead = self.snails.count_where(|s| s.pos.x > player_x);
            let placement = ahead as u64 + 1;
            self.tuning
                .placement_base
                .saturating_sub(placement * self.tuning.placement_step)
        };
        self.winner = Some(winner);
        self.phase = Phase::Terminal(if player_won {
            Outcome::Won
        } else {
            Outcome::Lost
        });
        if let Some(racer) = self.winner() {
            log::info!("{}: {} wins, score {}", Self::TITLE, racer.name, self.score);
        }
    }
}

impl Game for SnailRace {
    const TITLE: TitleId = TitleId::Snail;

    fn update(&mut self, now: f64) {
        match self.phase {
            Phase::Setup => {
                if self.setup.poll(now) {
                    self.phase = Phase::Countdown;
                    self.countdown = self.tuning.countdown_from;
                    self.step = Deadline::after(self.tuning.countdown_step_ms);
                    self.step.poll(now);
                }
            }
            Phase::Countdown => {
                if self.step.poll(now) {
                    self.countdown = self.countdown.saturating_sub(1);
                    if self.countdown == 0 {
                        self.phase = Phase::Active;
                        self.go_ticks = self.tuning.go_banner_ticks;
                    } else {
                        self.step = Deadline::after(self.tuning.countdown_step_ms);
                        self.step.poll(now);
                    }
                }
            }
            Phase::Active => {
                self.go_ticks = self.go_ticks.saturating_sub(1);
                self.crawl();
                self.judge();
            }
            Phase::Watching | Phase::Terminal(_) => {}
        }
    }

    fn render(&self, frame: &mut Frame<'_>) {
        shapes::vertical_gradient(
            frame.layer(Layer::Background),
            &[
                (0.0, Color::hex(0x87CEEB)),
                (0.7, Color::hex(0x98FB98)),
                (1.0, Color::hex(0x228B22)),
            ],
        );

        let lanes = FIELD.len();
        let top = self.tuning.first_lane_y - 40.0;
        let s = frame.layer(Layer::Entities);
        shapes::race_lanes(
            s,
            self.tuning.first_lane_y,
            self.tuning.lane_spacing,
            lanes,
        );
        shapes::finish_line(
            s,
            self.finish_x(),
            top,
            top + lanes as f32 * self.tuning.lane_spacing,
        );
        for snail in self.snails.alive() {
            shapes::trail(
                s,
                snail.kind.trail.points(),
                Vec2::new(0.0, 15.0),
                snail.kind.color,
            );
        }

        let s = frame.layer(Layer::Player);
        for snail in self.snails.alive() {
            shapes::snail(
                s,
                snail.pos,
                snail.kind.color,
                snail.kind.name,
                snail.kind.is_player,
            );
        }

        let s = frame.layer(Layer::Hud);
        let mid = self.bounds.height / 2.0;
        match self.phase {
            Phase::Countdown => {
                shapes::banner(
                    s,
                    &self.countdown.to_string(),
                    mid,
                    48.0,
                    Color::hex(0xFF0000),
                );
            }
            Phase::Active if self.go_ticks > 0 => {
                shapes::banner(s, "GO!", mid, 48.0, Color::hex(0x00FF00));
            }
            _ => {}
        }
        if let Some(racer) = self.winner() {
            let color = if racer.is_player {
                GOLD
            } else {
                Color::hex(0xFF6B6B)
            };
            shapes::banner(s, &format!("{} WINS!", racer.name), 50.0, 36.0, color);
        }
        shapes::title(s, "SNAIL RACING LEAGUE", 30.0, Color::hex(0x4B0082));
        if self.winner.is_none() {
            shapes::instructions(
                s,
                "Cheer for Speedy (your snail)! The thrill of slow-motion racing!",
            );
        }
    }

    fn handle_input(&mut self, _event: InputEvent) {}

    fn reset(&mut self) {
        self.phase = Phase::Setup;
        self.setup = Deadline::after(self.tuning.setup_ms);
        self.step = Deadline::after(self.tuning.countdown_step_ms);
        self.countdown = self.tuning.countdown_from;
        self.go_ticks = 0;
        self.winner = None;
        self.score = 0;
        self.line_up();
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn check(&self) -> Result<(), GameError> {
        ensure_finite(Self::TITLE, &self.snails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{NOMINAL_FRAME_MS, SURFACE_HEIGHT, SURFACE_WIDTH};
    use crate::renderer::RecordingSurface;

    fn race(seed: u64) -> SnailRace {
        SnailRace::new(
            Bounds::new(SURFACE_WIDTH, SURFACE_HEIGHT),
            &GameContext::new(seed),
        )
    }

    /// Jump straight to the race with every snail parked at `xs`
    fn parked(xs: [f32; 5]) -> SnailRace {
        let mut g = race(1);
        g.phase = Phase::Active;
        for (snail, x) in g.snails.iter_mut().zip(xs) {
            snail.pos.x = x;
            snail.vel = Vec2::ZERO;
        }
        g
    }

    fn texts(g: &SnailRace) -> RecordingSurface {
        let mut surface = RecordingSurface::new(SURFACE_WIDTH, SURFACE_HEIGHT);
        let mut frame = Frame::begin(&mut surface);
        g.render(&mut frame);
        drop(frame);
        surface
    }

    #[test]
    fn test_setup_then_countdown_then_race() {
        let mut g = race(1);
        g.update(0.0);
        g.update(999.0);
        assert_eq!(g.phase(), Phase::Setup);
        g.update(1000.0);
        assert_eq!(g.phase(), Phase::Countdown);
        assert_eq!(g.countdown(), 3);
        g.update(1999.0);
        assert_eq!(g.countdown(), 3);
        g.update(2000.0);
        assert_eq!(g.countdown(), 2);
        g.update(3000.0);
        assert_eq!(g.countdown(), 1);
        assert!(g.snails().iter().all(|s| s.pos.x == 50.0));
        g.update(4000.0);
        assert_eq!(g.phase(), Phase::Active);
        assert!(texts(&g).has_text("GO!"));
    }

    #[test]
    fn test_race_ends_with_a_winner() {
        let mut g = race(2);
        let mut now = 0.0;
        for _ in 0..10_000 {
            g.update(now);
            now += NOMINAL_FRAME_MS;
            if g.phase().is_final() {
                break;
            }
        }
        assert!(g.phase().is_final());
        assert!([1000, 400, 300, 200, 100].contains(&g.score()));
        let winner = g.winner().unwrap();
        let best = g
            .snails()
            .iter()
            .map(|s| s.pos.x)
            .fold(f32::MIN, f32::max);
        let winner_x = g
            .snails()
            .iter()
            .find(|s| s.kind.name == winner.name)
            .unwrap()
            .pos
            .x;
        assert_eq!(winner_x, best);
        assert!(winner_x >= 700.0);

        // Finished races stay frozen
        let before: Vec<f32> = g.snails().iter().map(|s| s.pos.x).collect();
        g.update(now + 1000.0);
        let after: Vec<f32> = g.snails().iter().map(|s| s.pos.x).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_speedy_win_scores_bonus() {
        let mut g = parked([705.0, 650.0, 600.0, 300.0, 100.0]);
        g.update(0.0);
        assert_eq!(g.phase(), Phase::Terminal(Outcome::Won));
        assert_eq!(g.score(), 1000);
        assert!(texts(&g).has_text("Speedy WINS!"));
    }

    #[test]
    fn test_placement_score_when_speedy_loses() {
        let mut g = parked([600.0, 720.0, 710.0, 300.0, 100.0]);
        g.update(0.0);
        assert_eq!(g.phase(), Phase::Terminal(Outcome::Lost));
        assert_eq!(g.winner().unwrap().name, "Turbo");
        assert_eq!(g.score(), 300);
        // Judging never reorders the field
        let names: Vec<&str> = g.snails().iter().map(|s| s.kind.name).collect();
        assert_eq!(names, ["Speedy", "Turbo", "Lightning", "Flash", "Rocket"]);
    }

    #[test]
    fn test_last_place_floors_at_zero() {
        let mut tuning = crate::tuning::Tuning::default();
        tuning.snail.placement_base = 300;
        let ctx = GameContext::new(3).with_tuning(tuning);
        let mut g = SnailRace::new(Bounds::new(SURFACE_WIDTH, SURFACE_HEIGHT), &ctx);
        g.phase = Phase::Active;
        for (snail, x) in g.snails.iter_mut().zip([10.0, 720.0, 710.0, 300.0, 100.0]) {
            snail.pos.x = x;
            snail.vel = Vec2::ZERO;
        }
        g.update(0.0);
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn test_trails_are_bounded_by_settings() {
        let mut g = parked([50.0; 5]);
        for snail in g.snails.iter_mut() {
            snail.vel.x = 0.2;
        }
        for i in 0..100 {
            g.update(i as f64);
        }
        for snail in g.snails().iter() {
            assert_eq!(snail.kind.trail.len(), 12);
        }
    }

    #[test]
    fn test_reset_lines_up_again() {
        let mut g = parked([705.0, 650.0, 600.0, 300.0, 100.0]);
        g.update(0.0);
        g.reset();
        assert_eq!(g.phase(), Phase::Setup);
        assert_eq!(g.score(), 0);
        assert!(g.winner().is_none());
        assert_eq!(g.snails().len(), 5);
        assert!(g.snails().iter().all(|s| s.pos.x == 50.0));
        assert!(
            texts(&g)
                .has_text("Cheer for Speedy (your snail)! The thrill of slow-motion racing!")
        );
    }
}
