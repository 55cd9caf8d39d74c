//! Input translation
//!
//! Platform events are converted to `InputEvent`s in surface coordinates
//! before they reach a game.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
            Direction::Left => "←",
            Direction::Right => "→",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown(Vec2),
    PointerMove(Vec2),
    Key(Direction),
}

/// Where the surface is displayed on the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Top-left corner of the displayed element in client coordinates
    pub origin: Vec2,
    /// Displayed size in client pixels
    pub displayed: Vec2,
    /// Logical surface size
    pub surface: Vec2,
}

impl Viewport {
    pub fn new(origin: Vec2, displayed: Vec2, surface: Vec2) -> Self {
        Self {
            origin,
            displayed,
            surface,
        }
    }

    /// Client coordinates to surface coordinates
    ///
    /// A collapsed element (zero displayed size) maps to the unscaled offset.
    pub fn to_surface(&self, client: Vec2) -> Vec2 {
        let local = client - self.origin;
        let scale = Vec2::new(
            if self.displayed.x > 0.0 {
                self.surface.x / self.displayed.x
            } else {
                1.0
            },
            if self.displayed.y > 0.0 {
                self.surface.y / self.displayed.y
            } else {
                1.0
            },
        );
        local * scale
    }
}

/// A platform listener owned by a controller
pub trait InputBinding {
    /// Remove the listener; calling twice is harmless
    fn detach(&mut self);
    fn is_attached(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Push {
    Accepted,
    /// Buffer just reached the expected length
    Complete,
    /// Buffer was already full
    Ignored,
}

/// Player's attempt at repeating a sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceBuffer {
    moves: Vec<Direction>,
    expected: usize,
}

impl SequenceBuffer {
    pub fn new(expected: usize) -> Self {
        Self {
            moves: Vec::with_capacity(expected),
            expected,
        }
    }

    pub fn push(&mut self, dir: Direction) -> Push {
        if self.moves.len() >= self.expected {
            return Push::Ignored;
        }
        self.moves.push(dir);
        if self.moves.len() == self.expected {
            Push::Complete
        } else {
            Push::Accepted
        }
    }

    pub fn reset(&mut self, expected: usize) {
        self.moves.clear();
        self.expected = expected;
    }

    pub fn moves(&self) -> &[Direction] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Fraction of positions where `attempt` matches `target`
///
/// Missing moves count as misses; an empty target scores 0.
pub fn positional_accuracy(target: &[Direction], attempt: &[Direction]) -> f32 {
    if target.is_empty() {
        return 0.0;
    }
    let correct = target
        .iter()
        .zip(attempt)
        .filter(|(want, got)| want == got)
        .count();
    correct as f32 / target.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::*;

    #[test]
    fn test_viewport_rescales_client_coordinates() {
        // 800x600 surface shown at 400x300, offset (10, 20)
        let vp = Viewport::new(
            Vec2::new(10.0, 20.0),
            Vec2::new(400.0, 300.0),
            Vec2::new(800.0, 600.0),
        );
        assert_eq!(vp.to_surface(Vec2::new(210.0, 170.0)), Vec2::new(400.0, 300.0));
        assert_eq!(vp.to_surface(Vec2::new(10.0, 20.0)), Vec2::ZERO);
    }

    #[test]
    fn test_collapsed_viewport_does_not_divide_by_zero() {
        let vp = Viewport::new(Vec2::ZERO, Vec2::ZERO, Vec2::new(800.0, 600.0));
        assert_eq!(vp.to_surface(Vec2::new(5.0, 6.0)), Vec2::new(5.0, 6.0));
    }

    #[test]
    fn test_sequence_buffer_completes_then_ignores() {
        let mut buf = SequenceBuffer::new(2);
        assert_eq!(buf.push(Up), Push::Accepted);
        assert_eq!(buf.push(Left), Push::Complete);
        assert_eq!(buf.push(Right), Push::Ignored);
        assert_eq!(buf.moves(), &[Up, Left]);
        buf.reset(3);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_positional_accuracy() {
        let target = [Up, Down, Left, Right];
        assert_eq!(positional_accuracy(&target, &[Up, Down, Left, Right]), 1.0);
        assert_eq!(positional_accuracy(&target, &[Up, Down, Left, Up]), 0.75);
        // Shifted by one scores nothing even though the moves are present
        assert_eq!(positional_accuracy(&target, &[Right, Up, Down, Left]), 0.0);
        assert_eq!(positional_accuracy(&target, &[Up]), 0.25);
        assert_eq!(positional_accuracy(&[], &[Up]), 0.0);
    }

    #[test]
    fn test_arrow_keys_only() {
        assert_eq!(Direction::from_key("ArrowUp"), Some(Up));
        assert_eq!(Direction::from_key("w"), None);
        assert_eq!(Up.glyph(), "↑");
    }
}
