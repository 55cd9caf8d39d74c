//! Headless surface that records draw calls
//!
//! Used by the native demo and by tests to observe what a frame painted.

use glam::Vec2;

use super::{Paint, Stroke, Surface, TextStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect { min: Vec2, size: Vec2, paint: Paint },
    Circle { center: Vec2, radius: f32, paint: Paint },
    Polygon { points: Vec<Vec2>, paint: Paint },
    Polyline { points: Vec<Vec2>, stroke: Stroke },
    Arc { center: Vec2, radius: f32, start: f32, end: f32, stroke: Stroke },
    Text { text: String, pos: Vec2, style: TextStyle },
    PushTransform { translate: Vec2, rotate: f32 },
    PopTransform,
}

/// Keeps the commands of the most recent frame only
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Vec2,
    commands: Vec<DrawCommand>,
    frames: u64,
    attached: bool,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
            frames: 0,
            attached: true,
        }
    }

    /// Simulate the backing element being removed from the page
    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of `begin_frame` calls so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// All text drawn in the last frame, in order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }

    /// True if every push has a matching pop
    pub fn transforms_balanced(&self) -> bool {
        let mut depth: i64 = 0;
        for c in &self.commands {
            match c {
                DrawCommand::PushTransform { .. } => depth += 1,
                DrawCommand::PopTransform => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn begin_frame(&mut self) {
        self.commands.clear();
        self.frames += 1;
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, paint: &Paint) {
        self.commands.push(DrawCommand::Rect {
            min,
            size,
            paint: paint.clone(),
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            paint: paint.clone(),
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            paint: paint.clone(),
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], stroke: &Stroke) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            stroke: *stroke,
        });
    }

    fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, stroke: &Stroke) {
        self.commands.push(DrawCommand::Arc {
            center,
            radius,
            start,
            end,
            stroke: *stroke,
        });
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            style: *style,
        });
    }

    fn push_transform(&mut self, translate: Vec2, rotate: f32) {
        self.commands.push(DrawCommand::PushTransform { translate, rotate });
    }

    fn pop_transform(&mut self) {
        self.commands.push(DrawCommand::PopTransform);
    }
}
