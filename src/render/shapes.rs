//! Plot primitives handed to the host's drawing surface.

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceived brightness: `0.299 R + 0.587 G + 0.114 B`.
    pub fn luminance(&self) -> f32 {
        (self.r as f32 * 0.299) + (self.g as f32 * 0.587) + (self.b as f32 * 0.114)
    }
}

/// A four-cornered shape. Corners go clockwise from the top left:
///
/// ```text
/// 0----------3
/// |          |
/// 1----------2
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rectangle {
    pub points: [Point; 4],
    pub color: Color,
    pub fill: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub a: Point,
    pub b: Point,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextBox {
    pub text: String,
    pub color: Color,
    pub anchor: Point,
    pub font_size: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    Rectangle(Rectangle),
    Line(Line),
    Text(TextBox),
}

/// The host's plotting surface.
pub trait PlotSurface {
    fn draw_shape(&mut self, shape: Shape);
}

/// A surface that just keeps what was drawn on it.
#[derive(Debug, Default)]
pub struct ShapeList {
    pub shapes: Vec<Shape>,
}

impl ShapeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rectangles(&self) -> impl Iterator<Item = &Rectangle> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Rectangle(r) => Some(r),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Line(l) => Some(l),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextBox> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Text(t) => Some(t),
            _ => None,
        })
    }
}

impl PlotSurface for ShapeList {
    fn draw_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }
}
