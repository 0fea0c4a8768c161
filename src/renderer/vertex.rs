//! Vertex layout shared by the batch and the GPU pipeline

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::sim::Color;

/// Colored 2D vertex; `position` is in pixels until `to_ndc` maps it
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(pos: Vec2, color: Color) -> Self {
        Self {
            position: [pos.x, pos.y],
            color,
        }
    }

    /// Pixel space (origin top-left, +y down) to clip space
    pub fn to_ndc(self, width: f32, height: f32) -> Self {
        let [x, y] = self.position;
        Self {
            position: [x / width * 2.0 - 1.0, 1.0 - y / height * 2.0],
            color: self.color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndc_corners() {
        let c = [1.0; 4];
        assert_eq!(Vertex::new(Vec2::ZERO, c).to_ndc(800.0, 600.0).position, [-1.0, 1.0]);
        assert_eq!(Vertex::new(Vec2::new(800.0, 600.0), c).to_ndc(800.0, 600.0).position, [1.0, -1.0]);
        assert_eq!(Vertex::new(Vec2::new(400.0, 300.0), c).to_ndc(800.0, 600.0).position, [0.0, 0.0]);
    }
}
