//! The single hexagon mesh shared by every tile.
//!
//! [`HexGeometry`] builds the CPU-side data: a center vertex plus six rim vertices,
//! flat `+z` normals and a six-triangle fan. [`Mesh`] uploads it once into three GPU
//! buffers (positions, normals, indices). Every hexagon in the grid is drawn from
//! these same buffers; placement, depth and scale arrive as per-draw uniforms.
//!
//! # Vertex Layout
//!
//! Positions and normals live in separate buffers:
//!
//! | Attribute | Format    | Buffer slot | Shader Location |
//! |-----------|-----------|-------------|-----------------|
//! | position  | Float32x3 | 0           | 0               |
//! | normal    | Float32x3 | 1           | 1               |

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

use crate::gpu::GpuContext;

/// Vertices in one hexagon: the center plus six rim points.
pub const HEX_VERTEX_COUNT: usize = 7;

/// Indices in one hexagon: six triangles fanned from the center.
pub const HEX_INDEX_COUNT: usize = 18;

/// CPU-side geometry of a regular hexagon centered at the origin.
#[derive(Clone, Debug, PartialEq)]
pub struct HexGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u16>,
}

impl HexGeometry {
    /// Builds a hexagon with the given circumradius.
    ///
    /// The first rim vertex sits at -90 degrees and the rest follow at 60 degree steps,
    /// so rows offset by half a width interlock into a honeycomb. Triangle `i` is
    /// `(0, (i + 1) % 6 + 1, i + 1)`.
    pub fn new(radius: f32) -> Self {
        let mut positions = Vec::with_capacity(HEX_VERTEX_COUNT);
        positions.push([0.0, 0.0, 0.0]);
        for i in 0..6 {
            let angle = FRAC_PI_3 * i as f32 - FRAC_PI_2;
            positions.push([radius * angle.cos(), radius * angle.sin(), 0.0]);
        }

        let normals = vec![[0.0, 0.0, 1.0]; HEX_VERTEX_COUNT];

        let indices = (0..6u16)
            .flat_map(|i| [0, (i + 1) % 6 + 1, i + 1])
            .collect();

        Self {
            positions,
            normals,
            indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Layout of the position buffer (slot 0).
pub const POSITION_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    }],
};

/// Layout of the normal buffer (slot 1).
pub const NORMAL_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[wgpu::VertexAttribute {
        offset: 0,
        shader_location: 1,
        format: wgpu::VertexFormat::Float32x3,
    }],
};

/// GPU-resident hexagon, uploaded once and immutable afterwards.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) position_buffer: wgpu::Buffer,
    pub(crate) normal_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

impl Mesh {
    pub fn new(gpu: &GpuContext, geometry: &HexGeometry) -> Self {
        use wgpu::util::DeviceExt;

        let position_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Hex Position Buffer"),
                contents: bytemuck::cast_slice(&geometry.positions),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let normal_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Hex Normal Buffer"),
                contents: bytemuck::cast_slice(&geometry.normals),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Hex Index Buffer"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            position_buffer,
            normal_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
        }
    }

    /// Binds all three buffers on a render pass.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.position_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.normal_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
    }
}
