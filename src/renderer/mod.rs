//! WebGPU rendering module
//!
//! The scene is tessellated on the CPU into flat-colored triangles in canvas
//! pixels; the pipeline maps them to NDC and draws them in one pass.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::build_scene;
pub use vertex::Vertex;
