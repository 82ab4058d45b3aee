//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
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

/// `0xRRGGBB` to an opaque RGBA color
pub const fn hex(rgb: u32) -> [f32; 4] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// Colors for game elements
pub mod colors {
    use super::hex;

    pub const BACKGROUND: [f32; 4] = hex(0x0d1117);
    pub const SHOULDER: [f32; 4] = hex(0x0f1724);
    pub const TREE_CANOPY: [f32; 4] = hex(0x1f3b21);
    pub const TREE_TRUNK: [f32; 4] = hex(0x5c3b1e);
    pub const ROAD: [f32; 4] = hex(0x1e293b);
    pub const CENTER_LINE: [f32; 4] = hex(0xffd65a);
    pub const TIRE: [f32; 4] = hex(0x20242f);
    pub const TIRE_RIM: [f32; 4] = hex(0x697a8a);
    pub const PEDESTRIAN: [f32; 4] = hex(0xf97316);
    pub const VISOR: [f32; 4] = hex(0x0f172a);
    pub const TRAFFIC: [f32; 4] = hex(0xe11d48);
    pub const PLAYER: [f32; 4] = hex(0x38bdf8);
    pub const WINDOW: [f32; 4] = hex(0x1f2937);
    pub const ROOF: [f32; 4] = hex(0x0f172a);
}
