//! Rendering module
//!
//! Scenes are painted onto any `RenderSurface`. `VertexBatch` tessellates the
//! calls into triangles, which `RenderState` uploads and draws with WebGPU.

pub mod batch;
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod surface;
pub mod vertex;

pub use batch::VertexBatch;
pub use pipeline::{RenderError, RenderState};
pub use scene::{draw_game, draw_visualizer};
pub use surface::{DrawStyle, FieldView, RenderSurface};
pub use vertex::Vertex;
