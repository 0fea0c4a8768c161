//! CPU-side triangle batch implementing `RenderSurface`

use glam::Vec2;

use super::shapes;
use super::surface::{DrawStyle, RenderSurface};
use super::vertex::Vertex;
use crate::sim::Color;

/// Peak opacity of a glow halo relative to the shape it surrounds
const GLOW_STRENGTH: f32 = 0.35;

/// Collects one frame's worth of triangles for upload
#[derive(Debug, Clone, Default)]
pub struct VertexBatch {
    vertices: Vec<Vertex>,
    clear_color: Color,
}

impl VertexBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn halo(&mut self, center: Vec2, radius: f32, style: &DrawStyle) {
        if style.glow <= 0.0 {
            return;
        }
        let mut inner = style.rgba();
        inner[3] *= GLOW_STRENGTH;
        let outer = [inner[0], inner[1], inner[2], 0.0];
        let r = radius + style.glow;
        shapes::radial(&mut self.vertices, center, r, inner, outer, shapes::segments_for(r));
    }
}

impl RenderSurface for VertexBatch {
    fn clear(&mut self, color: Color) {
        self.vertices.clear();
        self.clear_color = color;
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, style: DrawStyle) {
        self.halo(center, radius, &style);
        shapes::circle(&mut self.vertices, center, radius, style.rgba(), shapes::segments_for(radius));
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, style: DrawStyle) {
        let half = width / 2.0;
        self.halo(center, radius + half, &style);
        shapes::ring(
            &mut self.vertices,
            center,
            radius - half,
            radius + half,
            style.rgba(),
            shapes::segments_for(radius + half),
        );
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, style: DrawStyle) {
        if style.glow > 0.0 {
            let mut soft = style.rgba();
            soft[3] *= GLOW_STRENGTH * 0.5;
            let pad = Vec2::splat(style.glow * 0.5);
            shapes::rect(&mut self.vertices, min - pad, size + pad * 2.0, soft);
        }
        shapes::rect(&mut self.vertices, min, size, style.rgba());
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, style: DrawStyle) {
        shapes::line(&mut self.vertices, from, to, width, style.rgba());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_resets_and_records_color() {
        let mut batch = VertexBatch::new();
        batch.fill_rect(Vec2::ZERO, Vec2::ONE, DrawStyle::solid([1.0; 4]));
        assert_eq!(batch.len(), 6);
        batch.clear([0.1, 0.2, 0.3, 1.0]);
        assert!(batch.is_empty());
        assert_eq!(batch.clear_color(), [0.1, 0.2, 0.3, 1.0]);
    }

    #[test]
    fn test_glow_adds_halo() {
        let mut plain = VertexBatch::new();
        let mut glowing = VertexBatch::new();
        plain.fill_circle(Vec2::ZERO, 4.0, DrawStyle::solid([1.0; 4]));
        glowing.fill_circle(Vec2::ZERO, 4.0, DrawStyle::solid([1.0; 4]).with_glow(10.0));
        assert!(glowing.len() > plain.len());
    }

    #[test]
    fn test_alpha_applied() {
        let mut batch = VertexBatch::new();
        batch.fill_rect(Vec2::ZERO, Vec2::ONE, DrawStyle::solid([1.0, 1.0, 1.0, 0.5]).with_alpha(0.5));
        assert!(batch.vertices().iter().all(|v| v.color[3] == 0.25));
    }
}
