//! Drawing abstraction shared by the visualizer and the game overlay

use glam::Vec2;

use crate::consts::MIN_EXTENT;
use crate::sim::Color;
use crate::sim::geom::Rect;

/// Per-call paint parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawStyle {
    pub color: Color,
    /// Multiplied into the color's own alpha
    pub alpha: f32,
    /// Halo radius in pixels; zero draws a hard edge
    pub glow: f32,
}

impl DrawStyle {
    pub const fn solid(color: Color) -> Self {
        Self {
            color,
            alpha: 1.0,
            glow: 0.0,
        }
    }

    pub const fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub const fn with_glow(mut self, glow: f32) -> Self {
        self.glow = glow;
        self
    }

    /// Final RGBA after applying `alpha`
    pub fn rgba(&self) -> Color {
        let [r, g, b, a] = self.color;
        [r, g, b, (a * self.alpha).clamp(0.0, 1.0)]
    }
}

/// A 2D target in pixel coordinates (origin top-left, +y down)
pub trait RenderSurface {
    /// Drop everything drawn so far and fill with `color`
    fn clear(&mut self, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, style: DrawStyle);
    /// Circle outline of the given stroke width
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, style: DrawStyle);
    fn fill_rect(&mut self, min: Vec2, size: Vec2, style: DrawStyle);
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, style: DrawStyle);
}

/// Draws a fixed logical field into a viewport of any size
///
/// The field is scaled uniformly to fit and centered; the leftover bands
/// keep whatever `clear` painted.
pub struct FieldView<'a, S: RenderSurface + ?Sized> {
    inner: &'a mut S,
    scale: f32,
    offset: Vec2,
}

impl<'a, S: RenderSurface + ?Sized> FieldView<'a, S> {
    pub fn fit(inner: &'a mut S, field: Rect, viewport: Vec2) -> Self {
        let field = Rect {
            min: field.min,
            size: field.size.max(Vec2::splat(MIN_EXTENT)),
        };
        let viewport = viewport.max(Vec2::splat(MIN_EXTENT));
        let scale = (viewport.x / field.width()).min(viewport.y / field.height());
        let offset = (viewport - field.size * scale) / 2.0 - field.min * scale;
        Self { inner, scale, offset }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Field point to viewport pixel
    pub fn map(&self, p: Vec2) -> Vec2 {
        p * self.scale + self.offset
    }

    fn scaled(&self, style: DrawStyle) -> DrawStyle {
        style.with_glow(style.glow * self.scale)
    }
}

impl<S: RenderSurface + ?Sized> RenderSurface for FieldView<'_, S> {
    fn clear(&mut self, color: Color) {
        self.inner.clear(color);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, style: DrawStyle) {
        let (center, style) = (self.map(center), self.scaled(style));
        self.inner.fill_circle(center, radius * self.scale, style);
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, style: DrawStyle) {
        let (center, style) = (self.map(center), self.scaled(style));
        self.inner.stroke_circle(center, radius * self.scale, width * self.scale, style);
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, style: DrawStyle) {
        let (min, style) = (self.map(min), self.scaled(style));
        self.inner.fill_rect(min, size * self.scale, style);
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, style: DrawStyle) {
        let (from, to, style) = (self.map(from), self.map(to), self.scaled(style));
        self.inner.line(from, to, width * self.scale, style);
    }
}
