//! Dance Battle: Objects
//!
//! A household object shows a sequence of arrow moves one beat at a time,
//! then the player repeats it with the arrow keys. Accuracy is positional.
//! Passing a round brings a new opponent and a longer sequence; failing
//! replays the same sequence.
//!
//! Phase mapping: `Setup` is the round intro, `Watching` the opponent's
//! demonstration, `Active` the player's turn and `Terminal(Scored)` the
//! result pause. There is no countdown.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{GameContext, TitleId};
use crate::controller::Game;
use crate::error::GameError;
use crate::input::{Direction, InputEvent, Push, SequenceBuffer, positional_accuracy};
use crate::renderer::shapes::{self, Prop};
use crate::renderer::{Color, Frame, Layer, TextStyle};
use crate::sim::{Bounds, Deadline, Outcome, ParticleField, Phase};
use crate::tuning::DanceTuning;
use crate::wrap_angle;

const PLAYER_AT: Vec2 = Vec2::new(150.0, 400.0);
const OPPONENT_AT: Vec2 = Vec2::new(550.0, 400.0);
/// Figures are drawn and burst around this offset from their anchor
const BODY_OFFSET: Vec2 = Vec2::new(50.0, 50.0);

const GOLD: Color = Color::hex(0xFFD700);
const PINK: Color = Color::hex(0xFF69B4);
const GREEN: Color = Color::hex(0x32CD32);

pub struct DanceBattle {
    tuning: DanceTuning,
    rng: Pcg32,
    motion: f32,
    round: u32,
    length: usize,
    sequence: Vec<Direction>,
    attempt: SequenceBuffer,
    /// Moves shown so far while the opponent demonstrates
    revealed: usize,
    beat: u32,
    opponent: Prop,
    player_dance: f32,
    opponent_dance: f32,
    floor_beat: u64,
    particles: ParticleField,
    intro: Deadline,
    result: Deadline,
    last_accuracy: f32,
    score: u64,
    phase: Phase,
}

impl DanceBattle {
    pub fn new(_bounds: Bounds, ctx: &GameContext) -> Self {
        let tuning = ctx.tuning.dance.clone();
        let mut battle = Self {
            rng: Pcg32::seed_from_u64(ctx.seed),
            motion: ctx.settings.motion_scale(),
            round: 1,
            length: tuning.initial_length,
            sequence: Vec::new(),
            attempt: SequenceBuffer::new(tuning.initial_length),
            revealed: 0,
            beat: 0,
            opponent: Prop::Lamp,
            player_dance: 0.0,
            opponent_dance: 0.0,
            floor_beat: 0,
            particles: ParticleField::new(ctx.settings.max_particles()),
            intro: Deadline::after(tuning.intro_ms),
            result: Deadline::after(tuning.result_ms),
            last_accuracy: 0.0,
            score: 0,
            phase: Phase::Setup,
            tuning,
        };
        battle.start_round();
        battle
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn sequence(&self) -> &[Direction] {
        &self.sequence
    }

    pub fn opponent(&self) -> Prop {
        self.opponent
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    /// Accuracy of the most recently judged attempt
    pub fn last_accuracy(&self) -> f32 {
        self.last_accuracy
    }

    fn start_round(&mut self) {
        self.opponent = Prop::ALL[self.rng.random_range(0..Prop::ALL.len())];
        self.sequence = (0..self.length)
            .map(|_| Direction::ALL[self.rng.random_range(0..Direction::ALL.len())])
            .collect();
        self.intro = Deadline::after(self.tuning.intro_ms);
        self.phase = Phase::Setup;
        self.revealed = 0;
        self.beat = 0;
        self.attempt.reset(self.length);
        log::info!(
            "{}: round {} vs {} ({} moves)",
            Self::TITLE,
            self.round,
            self.opponent.name(),
            self.length
        );
    }

    /// Show the current sequence again from the first move
    fn watch(&mut self) {
        self.phase = Phase::Watching;
        self.revealed = 0;
        self.beat = 0;
        self.attempt.reset(self.length);
    }

    fn demonstrate(&mut self) {
        self.beat += 1;
        if self.beat % self.tuning.beat_ticks.max(1) != 0 {
            return;
        }
        if self.revealed < self.sequence.len() {
            self.revealed += 1;
            self.sparkle(OPPONENT_AT, PINK);
        } else {
            self.phase = Phase::Active;
            self.beat = 0;
            self.attempt.reset(self.sequence.len());
        }
    }

    fn sparkle(&mut self, anchor: Vec2, color: Color) {
        let burst = self.tuning.move_burst;
        self.particles.burst(
            &mut self.rng,
            anchor + BODY_OFFSET,
            burst.count,
            burst.speed,
            burst.life_ticks,
            color,
        );
    }

    fn judge(&mut self) {
        let accuracy = positional_accuracy(&self.sequence, self.attempt.moves());
        let points = (accuracy * self.tuning.points_per_round * self.round as f32).floor();
        self.score += points as u64;
        self.last_accuracy = accuracy;
        self.result = Deadline::after(self.tuning.result_ms);
        self.phase = Phase::Terminal(Outcome::Scored);
        log::debug!(
            "{}: accuracy {:.2}, +{} points",
            Self::TITLE,
            accuracy,
            points
        );
    }

    fn advance(&mut self) {
        if self.last_accuracy >= self.tuning.pass_accuracy {
            self.round += 1;
            self.length =
                (self.length + self.tuning.length_increment).min(self.tuning.max_length);
            self.start_round();
        } else {
            self.watch();
        }
    }

    fn phase_line(&self) -> (String, Color) {
        match self.phase {
            Phase::Setup | Phase::Countdown => {
                (format!("Round {} - Get Ready!", self.round), GOLD)
            }
            Phase::Watching => ("Watch the moves!".to_string(), Color::hex(0x00CED1)),
            Phase::Active => ("Your turn! Use arrow keys!".to_string(), PINK),
            Phase::Terminal(_) => ("Nice moves!".to_string(), GREEN),
        }
    }

    fn move_color(&self, i: usize, want: Direction) -> Color {
        match self.phase {
            Phase::Watching if i < self.revealed => PINK,
            Phase::Active => match self.attempt.moves().get(i) {
                Some(got) if *got == want => GREEN,
                Some(_) => Color::hex(0xFF6B6B),
                None => Color::hex(0xCCCCCC),
            },
            _ => Color::hex(0xCCCCCC),
        }
    }
}

impl Game for DanceBattle {
    const TITLE: TitleId = TitleId::Dance;

    fn update(&mut self, now: f64) {
        match self.phase {
            Phase::Setup => {
                if self.intro.poll(now) {
                    self.watch();
                }
            }
            Phase::Watching => self.demonstrate(),
            Phase::Countdown | Phase::Active => {}
            Phase::Terminal(_) => {
                if self.result.poll(now) {
                    self.advance();
                }
            }
        }

        self.particles.step(0.98);
        self.player_dance = wrap_angle(self.player_dance + 0.2 * self.motion);
        self.opponent_dance = wrap_angle(self.opponent_dance + 0.15 * self.motion);
        if self.motion > 0.0 {
            self.floor_beat += 1;
        }
    }

    fn render(&self, frame: &mut Frame<'_>) {
        let s = frame.layer(Layer::Background);
        shapes::diagonal_gradient(
            s,
            &[
                (0.0, Color::hex(0x4B0082)),
                (0.5, Color::hex(0x8B008B)),
                (1.0, Color::hex(0x9400D3)),
            ],
        );
        shapes::disco_floor(s, 400.0, self.floor_beat);

        let s = frame.layer(Layer::Player);
        shapes::stick_figure(s, PLAYER_AT + BODY_OFFSET, self.player_dance);
        shapes::prop(s, self.opponent, OPPONENT_AT + BODY_OFFSET, self.opponent_dance);

        shapes::particles(frame.layer(Layer::Particles), &self.particles, 3.0);

        let s = frame.layer(Layer::Hud);
        let mid = s.size().x / 2.0;
        shapes::title(s, "DANCE BATTLE: OBJECTS", 40.0, Color::WHITE);
        s.fill_text(
            &format!("VS {}", self.opponent.name()),
            Vec2::new(mid, 70.0),
            &TextStyle::new(16.0, Color::WHITE),
        );
        let (line, color) = self.phase_line();
        s.fill_text(
            &line,
            Vec2::new(mid, 100.0),
            &TextStyle::new(18.0, color).bold(),
        );
        if matches!(self.phase, Phase::Watching | Phase::Active) {
            for (i, want) in self.sequence.iter().enumerate() {
                s.fill_text(
                    want.glyph(),
                    Vec2::new(50.0 + i as f32 * 50.0, 150.0),
                    &TextStyle::new(32.0, self.move_color(i, *want))
                        .bold()
                        .left(),
                );
            }
        }
        shapes::instructions(s, "Challenge everyday objects to epic dance battles!");
    }

    fn handle_input(&mut self, event: InputEvent) {
        let InputEvent::Key(dir) = event else {
            return;
        };
        if self.phase != Phase::Active {
            return;
        }
        match self.attempt.push(dir) {
            Push::Accepted => self.sparkle(PLAYER_AT, GOLD),
            Push::Complete => {
                self.sparkle(PLAYER_AT, GOLD);
                self.judge();
            }
            Push::Ignored => {}
        }
    }

    fn reset(&mut self) {
        self.score = 0;
        self.round = 1;
        self.length = self.tuning.initial_length;
        self.last_accuracy = 0.0;
        self.particles.clear();
        self.start_round();
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn level(&self) -> u32 {
        self.round
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn check(&self) -> Result<(), GameError> {
        if self.player_dance.is_finite() && self.opponent_dance.is_finite() {
            Ok(())
        } else {
            Err(GameError::InvalidState {
                title: Self::TITLE.as_str(),
                detail: format!(
                    "dance angles {} / {}",
                    self.player_dance, self.opponent_dance
                ),
            })
        }
    }
}
