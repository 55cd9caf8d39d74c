//! Procedural shapes shared by the titles
//!
//! All art is built from rects, circles, polygons and strokes; there is no
//! asset pipeline. Helpers take positions in surface coordinates.

use glam::Vec2;
use std::f32::consts::TAU;

use super::{Color, Paint, Stroke, Surface, TextStyle};
use crate::sim::{Aabb, ParticleField};

/// Fill the whole surface with a vertical gradient
pub fn vertical_gradient(s: &mut dyn Surface, stops: &[(f32, Color)]) {
    let size = s.size();
    let paint = Paint::Linear {
        from: Vec2::ZERO,
        to: Vec2::new(0.0, size.y),
        stops: stops.to_vec(),
    };
    s.fill_rect(Vec2::ZERO, size, &paint);
}

/// Fill the whole surface with a top-left to bottom-right gradient
pub fn diagonal_gradient(s: &mut dyn Surface, stops: &[(f32, Color)]) {
    let size = s.size();
    let paint = Paint::Linear {
        from: Vec2::ZERO,
        to: size,
        stops: stops.to_vec(),
    };
    s.fill_rect(Vec2::ZERO, size, &paint);
}

/// Bold banner centered near the top
pub fn title(s: &mut dyn Surface, text: &str, y: f32, color: Color) {
    let x = s.size().x / 2.0;
    s.fill_text(text, Vec2::new(x, y), &TextStyle::new(24.0, color).bold());
}

/// One line of help text along the bottom edge
pub fn instructions(s: &mut dyn Surface, text: &str) {
    let size = s.size();
    s.fill_text(
        text,
        Vec2::new(size.x / 2.0, size.y - 20.0),
        &TextStyle::new(14.0, Color::WHITE),
    );
}

/// Big centered text, used for countdown digits and banners
pub fn banner(s: &mut dyn Surface, text: &str, y: f32, size: f32, color: Color) {
    let x = s.size().x / 2.0;
    s.fill_text(text, Vec2::new(x, y), &TextStyle::new(size, color).bold());
}

/// Dimmed full-surface overlay with a heading and final score
pub fn game_over(s: &mut dyn Surface, score: u64) {
    let size = s.size();
    let mid = size / 2.0;
    s.fill_rect(Vec2::ZERO, size, &Color::BLACK.with_alpha(0.8).into());
    s.fill_text(
        "GAME OVER!",
        Vec2::new(mid.x, mid.y - 50.0),
        &TextStyle::new(48.0, Color::hex(0xFF6B6B)).bold(),
    );
    s.fill_text(
        &format!("Final Score: {score}"),
        mid,
        &TextStyle::new(24.0, Color::WHITE),
    );
    s.fill_text(
        "Click the restart button to play again!",
        Vec2::new(mid.x, mid.y + 50.0),
        &TextStyle::new(16.0, Color::WHITE),
    );
}

pub fn basket(s: &mut dyn Surface, rect: &Aabb) {
    s.fill_rect(rect.min, rect.size, &Color::hex(0x8B4513).into());
    let inset = Vec2::splat(5.0);
    s.fill_rect(
        rect.min + inset,
        (rect.size - inset * 2.0).max(Vec2::ZERO),
        &Color::hex(0xD2691E).into(),
    );
}

/// Golden nugget with a highlight; `min` is the top-left of its square
pub fn nugget(s: &mut dyn Surface, min: Vec2, size: f32) {
    let center = min + Vec2::splat(size / 2.0);
    s.fill_circle(center, size / 2.0, &Color::hex(0xDAA520).into());
    s.fill_circle(center - Vec2::splat(3.0), 3.0, &Color::hex(0xFFD700).into());
}

/// Sauce blob with a drip underneath
pub fn sauce(s: &mut dyn Surface, min: Vec2, size: f32) {
    let center = min + Vec2::splat(size / 2.0);
    s.fill_circle(center, size / 2.0, &Color::hex(0xDC143C).into());
    s.fill_rect(
        Vec2::new(center.x - 2.0, min.y + size),
        Vec2::new(4.0, 10.0),
        &Color::hex(0xB22222).into(),
    );
}

/// Translucent bubble with a glint; `size` is the diameter
pub fn bubble(s: &mut dyn Surface, center: Vec2, size: f32, color: Color) {
    let radius = size / 2.0;
    if radius <= 0.0 {
        return;
    }
    let paint = Paint::Radial {
        center,
        radius,
        stops: vec![
            (0.0, color.with_alpha(0.5)),
            (0.8, color.with_alpha(0.25)),
            (1.0, color.with_alpha(0.06)),
        ],
    };
    s.fill_circle(center, radius, &paint);
    s.fill_circle(
        center - Vec2::splat(size / 6.0),
        size / 8.0,
        &Color::WHITE.with_alpha(0.3).into(),
    );
}

/// Round critter with two eyes; `fade` in [0, 1] dims trapped ones
pub fn critter(s: &mut dyn Surface, center: Vec2, size: f32, trapped: bool, fade: f32) {
    let body = if trapped {
        Color::hex(0x32CD32)
    } else {
        Color::hex(0xFF4500)
    };
    let a = fade.clamp(0.0, 1.0);
    s.fill_circle(center, size, &body.with_alpha(a).into());
    for side in [-1.0, 1.0] {
        let eye = center + Vec2::new(side * size / 3.0, -size / 3.0);
        s.fill_circle(eye, size / 4.0, &Color::WHITE.with_alpha(a).into());
        s.fill_circle(eye, size / 8.0, &Color::BLACK.with_alpha(a).into());
    }
}

/// Alternating sand-coloured lanes with brown borders
pub fn race_lanes(s: &mut dyn Surface, first_y: f32, spacing: f32, count: usize) {
    let width = s.size().x;
    let border = Stroke::solid(Color::hex(0x8B4513), 2.0);
    for i in 0..count {
        let y = first_y + i as f32 * spacing;
        let fill = if i % 2 == 0 { 0xF0E68C } else { 0xDEB887 };
        s.fill_rect(
            Vec2::new(30.0, y),
            Vec2::new(width - 60.0, 40.0),
            &Color::hex(fill).into(),
        );
        s.stroke_polyline(&[Vec2::new(30.0, y), Vec2::new(width - 30.0, y)], &border);
        s.stroke_polyline(
            &[Vec2::new(30.0, y + 40.0), Vec2::new(width - 30.0, y + 40.0)],
            &border,
        );
    }
}

pub fn finish_line(s: &mut dyn Surface, x: f32, top: f32, bottom: f32) {
    s.stroke_polyline(
        &[Vec2::new(x, top), Vec2::new(x, bottom)],
        &Stroke::dashed(Color::hex(0xFF0000), 4.0, 10.0, 10.0),
    );
}

/// Faint polyline through recorded positions, offset to the body's centre
pub fn trail(s: &mut dyn Surface, points: impl Iterator<Item = Vec2>, offset: Vec2, color: Color) {
    let points: Vec<Vec2> = points.map(|p| p + offset).collect();
    if points.len() < 2 {
        return;
    }
    s.stroke_polyline(&points, &Stroke::solid(color.with_alpha(0.25), 3.0));
}

/// Snail with a spiral shell and its name above
pub fn snail(s: &mut dyn Surface, pos: Vec2, color: Color, name: &str, is_player: bool) {
    let gold = Color::hex(0xFFD700);
    s.fill_circle(pos + Vec2::new(10.0, 20.0), 15.0, &color.into());
    let shell = pos + Vec2::splat(15.0);
    let shell_color = if is_player { gold } else { Color::hex(0x8B4513) };
    s.fill_circle(shell, 12.0, &shell_color.into());
    s.stroke_arc(
        shell,
        8.0,
        0.0,
        TAU * 2.0,
        &Stroke::solid(Color::hex(0x654321), 2.0),
    );
    for eye in [pos + Vec2::new(5.0, 10.0), pos + Vec2::new(12.0, 8.0)] {
        s.fill_circle(eye, 3.0, &Color::WHITE.into());
        s.fill_circle(eye, 1.0, &Color::BLACK.into());
    }
    let label = if is_player { gold } else { Color::BLACK };
    s.fill_text(
        name,
        pos + Vec2::new(15.0, -5.0),
        &TextStyle::new(12.0, label).bold(),
    );
}

/// Animated tiles across the lower part of the surface
pub fn disco_floor(s: &mut dyn Surface, top: f32, beat: u64) {
    let size = s.size();
    let tile = 40.0;
    let mut y = top;
    while y < size.y {
        let mut x = 0.0;
        while x < size.x {
            let phase = x + y + beat as f32;
            let brightness = (phase * 0.05).sin() * 0.5 + 0.5;
            let color = Color::hsl(phase % 360.0, 0.5, 0.2 + brightness * 0.3);
            s.fill_rect(Vec2::new(x, y), Vec2::splat(tile), &color.into());
            x += tile;
        }
        y += tile;
    }
}

/// Dancing stick figure; `dance` is the animation angle
pub fn stick_figure(s: &mut dyn Surface, origin: Vec2, dance: f32) {
    let gold = Color::hex(0xFFD700);
    let limb = Stroke::solid(gold, 4.0);
    s.push_transform(origin, dance.sin() * 0.1);
    s.fill_circle(Vec2::new(0.0, -40.0), 12.0, &gold.into());
    s.stroke_polyline(&[Vec2::new(0.0, -28.0), Vec2::new(0.0, 20.0)], &limb);

    let arm = (dance * 2.0).sin() * 0.5;
    let shoulder = Vec2::new(0.0, -10.0);
    for side in [-1.0, 1.0] {
        let hand = shoulder + Vec2::new(side * 20.0 * arm.cos(), 20.0 * arm.sin());
        s.stroke_polyline(&[shoulder, hand], &limb);
    }

    let leg = (dance * 1.5).sin() * 0.3;
    let hip = Vec2::new(0.0, 20.0);
    for side in [-1.0, 1.0] {
        let foot = Vec2::new(side * 15.0 * leg.cos(), 45.0 + 15.0 * leg.sin());
        s.stroke_polyline(&[hip, foot], &limb);
    }
    s.pop_transform();
}

/// Household objects that challenge the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prop {
    Lamp,
    Chair,
    Toaster,
    Cactus,
    RubberDuck,
}

impl Prop {
    pub const ALL: [Prop; 5] = [
        Prop::Lamp,
        Prop::Chair,
        Prop::Toaster,
        Prop::Cactus,
        Prop::RubberDuck,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Prop::Lamp => "Disco Lamp",
            Prop::Chair => "Funky Chair",
            Prop::Toaster => "Toaster Groove",
            Prop::Cactus => "Dancing Cactus",
            Prop::RubberDuck => "Rubber Ducky",
        }
    }
}

/// Draw a prop swaying around `origin`
pub fn prop(s: &mut dyn Surface, kind: Prop, origin: Vec2, dance: f32) {
    let brown = Color::hex(0x8B4513);
    let gold = Color::hex(0xFFD700);

    s.push_transform(origin, dance.sin() * 0.2);
    match kind {
        Prop::Lamp => {
            rect(s, -15.0, 20.0, 30.0, 40.0, brown);
            s.fill_polygon(
                &[
                    Vec2::new(-30.0, 20.0),
                    Vec2::new(30.0, 20.0),
                    Vec2::new(20.0, -20.0),
                    Vec2::new(-20.0, -20.0),
                ],
                &gold.into(),
            );
        }
        Prop::Chair => {
            rect(s, -25.0, 10.0, 50.0, 15.0, brown);
            rect(s, -25.0, -30.0, 50.0, 40.0, brown);
            rect(s, -20.0, 25.0, 8.0, 30.0, brown);
            rect(s, 12.0, 25.0, 8.0, 30.0, brown);
        }
        Prop::Toaster => {
            rect(s, -20.0, -10.0, 40.0, 30.0, Color::hex(0xC0C0C0));
            rect(s, -15.0, -5.0, 12.0, 20.0, Color::BLACK);
            rect(s, 3.0, -5.0, 12.0, 20.0, Color::BLACK);
        }
        Prop::Cactus => {
            let green = Color::hex(0x228B22);
            rect(s, -8.0, -20.0, 16.0, 50.0, green);
            rect(s, -25.0, 0.0, 15.0, 8.0, green);
            rect(s, 10.0, -10.0, 15.0, 8.0, green);
            for i in 0..6 {
                rect(s, -2.0, -15.0 + i as f32 * 8.0, 4.0, 2.0, Color::hex(0xFFFF00));
            }
        }
        Prop::RubberDuck => {
            s.fill_circle(Vec2::ZERO, 25.0, &gold.into());
            s.fill_circle(Vec2::new(-5.0, -15.0), 15.0, &gold.into());
            s.fill_circle(Vec2::new(-18.0, -12.0), 5.0, &Color::hex(0xFF8C00).into());
            s.fill_circle(Vec2::new(-8.0, -18.0), 3.0, &Color::BLACK.into());
        }
    }
    s.pop_transform();
}

fn rect(s: &mut dyn Surface, x: f32, y: f32, w: f32, h: f32, color: Color) {
    s.fill_rect(Vec2::new(x, y), Vec2::new(w, h), &color.into());
}

/// Particles as small dots fading with remaining life
pub fn particles(s: &mut dyn Surface, field: &ParticleField, radius: f32) {
    for p in field.iter() {
        s.fill_circle(p.pos, radius, &p.color.with_alpha(p.fade()).into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, RecordingSurface};

    #[test]
    fn test_props_keep_transforms_balanced() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        surface.begin_frame();
        for kind in Prop::ALL {
            prop(&mut surface, kind, Vec2::new(600.0, 450.0), 1.0);
        }
        stick_figure(&mut surface, Vec2::new(200.0, 450.0), 0.5);
        assert!(surface.transforms_balanced());
    }

    #[test]
    fn test_game_over_shows_final_score() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        surface.begin_frame();
        game_over(&mut surface, 120);
        assert!(surface.has_text("GAME OVER!"));
        assert!(surface.has_text("Final Score: 120"));
    }

    #[test]
    fn test_short_trail_draws_nothing() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        surface.begin_frame();
        trail(&mut surface, [Vec2::ZERO].into_iter(), Vec2::ZERO, Color::WHITE);
        assert!(surface.commands().is_empty());
        trail(
            &mut surface,
            [Vec2::ZERO, Vec2::ONE].into_iter(),
            Vec2::new(0.0, 15.0),
            Color::WHITE,
        );
        assert!(matches!(
            &surface.commands()[0],
            DrawCommand::Polyline { points, .. } if points[0] == Vec2::new(0.0, 15.0)
        ));
    }

    #[test]
    fn test_disco_floor_tiles_lower_area() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        surface.begin_frame();
        disco_floor(&mut surface, 400.0, 0);
        // 20 columns by 5 rows
        assert_eq!(surface.commands().len(), 100);
    }
}
