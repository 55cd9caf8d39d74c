//! Immediate-mode 2D rendering
//!
//! Every tick repaints the whole surface; nothing is retained between
//! frames except what the entity stores hold. Titles draw through a `Frame`
//! which enforces the Z-order of layers.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod recording;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use recording::{DrawCommand, RecordingSurface};

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

/// RGBA colour, alpha in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::hex(0xFFFFFF);
    pub const BLACK: Color = Color::hex(0x000000);

    /// Opaque colour from 0xRRGGBB
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
            a: 1.0,
        }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Hue in degrees, saturation and lightness in [0, 1]
    pub fn hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(360.0) / 60.0;
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        let to_u8 = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8;
        Self {
            r: to_u8(r),
            g: to_u8(g),
            b: to_u8(b),
            a: 1.0,
        }
    }

    /// CSS colour string for canvas APIs
    pub fn css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                self.a.clamp(0.0, 1.0)
            )
        }
    }
}

/// How a shape is filled
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Linear {
        from: Vec2,
        to: Vec2,
        stops: Vec<(f32, Color)>,
    },
    Radial {
        center: Vec2,
        radius: f32,
        stops: Vec<(f32, Color)>,
    },
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    /// Dash and gap lengths
    pub dash: Option<(f32, f32)>,
}

impl Stroke {
    pub const fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub const fn dashed(color: Color, width: f32, dash: f32, gap: f32) -> Self {
        Self {
            color,
            width,
            dash: Some((dash, gap)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub align: Align,
    pub color: Color,
}

impl TextStyle {
    pub const fn new(size: f32, color: Color) -> Self {
        Self {
            size,
            bold: false,
            align: Align::Center,
            color,
        }
    }

    pub const fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub const fn left(self) -> Self {
        Self {
            align: Align::Left,
            ..self
        }
    }

    /// CSS font shorthand
    pub fn font(&self) -> String {
        if self.bold {
            format!("bold {}px Arial", self.size)
        } else {
            format!("{}px Arial", self.size)
        }
    }
}

/// A drawing target with a fixed logical resolution
pub trait Surface {
    /// Logical size, independent of the displayed size
    fn size(&self) -> Vec2;

    /// False once the backing element is gone; ticks then do nothing
    fn is_attached(&self) -> bool {
        true
    }

    /// Called once before each full repaint
    fn begin_frame(&mut self) {}

    fn fill_rect(&mut self, min: Vec2, size: Vec2, paint: &Paint);
    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint);
    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint);
    fn stroke_polyline(&mut self, points: &[Vec2], stroke: &Stroke);
    fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, stroke: &Stroke);
    fn fill_text(&mut self, text: &str, pos: Vec2, style: &TextStyle);

    /// Translate then rotate subsequent drawing until `pop_transform`
    fn push_transform(&mut self, translate: Vec2, rotate: f32);
    fn pop_transform(&mut self);
}

/// Shared surfaces let the host (or a test) inspect what a controller drew
impl<S: Surface + ?Sized> Surface for Rc<RefCell<S>> {
    fn size(&self) -> Vec2 {
        self.borrow().size()
    }

    fn is_attached(&self) -> bool {
        self.borrow().is_attached()
    }

    fn begin_frame(&mut self) {
        self.borrow_mut().begin_frame();
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, paint: &Paint) {
        self.borrow_mut().fill_rect(min, size, paint);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.borrow_mut().fill_circle(center, radius, paint);
    }

    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint) {
        self.borrow_mut().fill_polygon(points, paint);
    }

    fn stroke_polyline(&mut self, points: &[Vec2], stroke: &Stroke) {
        self.borrow_mut().stroke_polyline(points, stroke);
    }

    fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, stroke: &Stroke) {
        self.borrow_mut().stroke_arc(center, radius, start, end, stroke);
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, style: &TextStyle) {
        self.borrow_mut().fill_text(text, pos, style);
    }

    fn push_transform(&mut self, translate: Vec2, rotate: f32) {
        self.borrow_mut().push_transform(translate, rotate);
    }

    fn pop_transform(&mut self) {
        self.borrow_mut().pop_transform();
    }
}

/// Z-order of a frame, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Background,
    Entities,
    Player,
    Particles,
    Hud,
    Overlay,
}

/// One full repaint in layer order
pub struct Frame<'a> {
    surface: &'a mut dyn Surface,
    layer: Layer,
}

impl<'a> Frame<'a> {
    pub fn begin(surface: &'a mut dyn Surface) -> Self {
        surface.begin_frame();
        Self {
            surface,
            layer: Layer::Background,
        }
    }

    /// Switch to `layer`; layers only ever move toward the front
    pub fn layer(&mut self, layer: Layer) -> &mut (dyn Surface + 'a) {
        debug_assert!(
            layer >= self.layer,
            "layer {:?} drawn after {:?}",
            layer,
            self.layer
        );
        self.layer = layer;
        &mut *self.surface
    }

    pub fn current_layer(&self) -> Layer {
        self.layer
    }

    pub fn size(&self) -> Vec2 {
        self.surface.size()
    }
}
