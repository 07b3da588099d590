//! Hexagon shading pipeline.
//!
//! [`HexPass`] owns the one render pipeline used for both the drop-shadow and the solid
//! pass. The shader branches on the per-draw `is_shadow` uniform instead of switching
//! programs.
//!
//! # Architecture
//!
//! The pipeline uses two bind groups:
//! - **Group 0**: Frame uniforms (projection, time, hexagon radius, camera z)
//! - **Group 1**: Draw uniforms (model-view, z offset, base gray, shadow flag, scale),
//!   bound with a dynamic offset so each draw reads its own slot
//!
//! Every frame, [`HexPass::prepare`] writes all draw slots in one upload and
//! [`HexPass::draw`] issues one indexed draw per slot against the shared [`Mesh`].
//! Draw storage is sized to the frame and never exceeds the device's
//! `max_buffer_size`; hexagons past that budget are skipped with a warning.

use glam::{Mat4, Vec3};

use crate::error::HexError;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, NORMAL_LAYOUT, POSITION_LAYOUT};

/// WGSL source for the hexagon program.
pub const HEX_SHADER: &str = include_str!("shaders/hex.wgsl");

/// Depth format of the canvas the pass renders into.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Footprint of a solid tile relative to the mesh. Must match `TILE_INSET` in `hex.wgsl`.
pub const TILE_INSET: f32 = 0.97;

/// Footprint of a shadow copy relative to the mesh. Must match `SHADOW_GROWTH` in `hex.wgsl`.
pub const SHADOW_GROWTH: f32 = 1.05;

/// View-space displacement of a shadow copy. Must match `SHADOW_OFFSET` in `hex.wgsl`.
pub const SHADOW_OFFSET: Vec3 = Vec3::new(0.02, -0.02, -0.1);

/// Uniforms shared by every draw in a frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub projection_matrix: [[f32; 4]; 4],
    pub time: f32,
    pub hex_radius: f32,
    pub camera_z: f32,
    pub _padding: f32,
}

/// Uniforms for a single draw.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    pub model_view_matrix: [[f32; 4]; 4],
    pub z_offset: f32,
    pub base_gray: f32,
    /// `1.0` for the shadow copy, `0.0` for the solid tile.
    pub is_shadow: f32,
    pub scale: f32,
}

/// Everything one hexagon needs for a frame.
///
/// Built fresh each tick by the render loop and handed to the pass by value; nothing
/// about a draw is stored between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HexDraw {
    pub model_view: Mat4,
    pub z_offset: f32,
    pub base_gray: f32,
    pub scale: f32,
}

/// Which copy of a hexagon a draw produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassKind {
    Shadow,
    Solid,
}

impl HexDraw {
    pub fn uniforms(&self, kind: PassKind) -> DrawUniforms {
        DrawUniforms {
            model_view_matrix: self.model_view.to_cols_array_2d(),
            z_offset: self.z_offset,
            base_gray: self.base_gray,
            is_shadow: match kind {
                PassKind::Shadow => 1.0,
                PassKind::Solid => 0.0,
            },
            scale: self.scale,
        }
    }
}

/// View-space position of mesh vertex `local` for one draw, as the vertex stage of
/// `hex.wgsl` computes it.
pub fn view_position(local: Vec3, draw: &HexDraw, kind: PassKind) -> Vec3 {
    let footprint = match kind {
        PassKind::Shadow => SHADOW_GROWTH,
        PassKind::Solid => TILE_INSET,
    };
    let scaled = (local.truncate() * draw.scale * footprint).extend(local.z);

    let mut view = draw.model_view.transform_point3(scaled);
    view.z += draw.z_offset;
    if kind == PassKind::Shadow {
        view += SHADOW_OFFSET;
    }
    view
}

/// How many hexagons can be drawn when every draw slot takes `stride` bytes and draw
/// storage may not exceed `max_buffer_size`. With `shadows`, each hexagon uses two slots.
pub fn drawable_hexagons(
    hexagons: usize,
    shadows: bool,
    stride: u64,
    max_buffer_size: u64,
) -> usize {
    let passes = if shadows { 2 } else { 1 };
    let max_slots = usize::try_from(max_buffer_size / stride).unwrap_or(usize::MAX);
    hexagons.min(max_slots / passes)
}

/// Lays draws out back to back at `stride` bytes: every shadow copy first when
/// `shadows` is set, then every solid copy.
pub fn pack_draws(draws: &[HexDraw], shadows: bool, stride: usize) -> Vec<u8> {
    let passes: &[PassKind] = if shadows {
        &[PassKind::Shadow, PassKind::Solid]
    } else {
        &[PassKind::Solid]
    };

    let mut bytes = vec![0u8; stride * draws.len() * passes.len()];
    let size = std::mem::size_of::<DrawUniforms>();
    for (slot, uniforms) in passes
        .iter()
        .flat_map(|&kind| draws.iter().map(move |d| d.uniforms(kind)))
        .enumerate()
    {
        let offset = slot * stride;
        bytes[offset..offset + size].copy_from_slice(bytemuck::bytes_of(&uniforms));
    }
    bytes
}

/// Rounds `size` up to a multiple of `alignment`.
pub fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// The hexagon render pipeline and its uniform storage.
pub struct HexPass {
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draw_layout: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_stride: u64,
    draw_capacity: usize,
    queued: u32,
    /// Hexagons left out of the last frame for lack of draw storage.
    skipped: usize,
}

impl HexPass {
    /// Compiles the hexagon shader and builds the pipeline for `color_format` targets.
    ///
    /// Shader and pipeline creation run inside a validation error scope; any error
    /// aborts construction and no pipeline is kept.
    pub fn new(gpu: &GpuContext, color_format: wgpu::TextureFormat) -> Result<Self, HexError> {
        let device = &gpu.device;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Hex Shader"),
            source: wgpu::ShaderSource::Wgsl(HEX_SHADER.into()),
        });

        // Frame uniform buffer (group 0)
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Hex Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Hex Frame Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Hex Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        // Draw uniform buffer (group 1), one aligned slot per draw
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Hex Draw Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<DrawUniforms>() as u64
                    ),
                },
                count: None,
            }],
        });

        let draw_stride = align_to(
            std::mem::size_of::<DrawUniforms>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let draw_capacity = 1;
        let (draw_buffer, draw_bind_group) =
            Self::create_draw_storage(gpu, &draw_layout, draw_stride, draw_capacity);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Hex Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &draw_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Hex Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[POSITION_LAYOUT, NORMAL_LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(HexError::Shader(error.to_string()));
        }

        log::info!("hex pipeline ready (draw stride {draw_stride} bytes)");

        Ok(Self {
            pipeline,
            frame_buffer,
            frame_bind_group,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            draw_stride,
            draw_capacity,
            queued: 0,
            skipped: 0,
        })
    }

    fn create_draw_storage(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Hex Draw Uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Hex Draw Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });

        (buffer, bind_group)
    }

    /// Grows draw storage to exactly `slots` draws. Callers keep `slots` within
    /// [`drawable_hexagons`].
    fn ensure_capacity(&mut self, gpu: &GpuContext, slots: usize) {
        if slots <= self.draw_capacity {
            return;
        }
        let (buffer, bind_group) =
            Self::create_draw_storage(gpu, &self.draw_layout, self.draw_stride, slots);
        self.draw_buffer = buffer;
        self.draw_bind_group = bind_group;
        self.draw_capacity = slots;
        log::debug!("hex draw storage grown to {slots} slots");
    }

    /// Uploads this frame's uniforms. With `shadows`, each hexagon gets a shadow draw
    /// ahead of the solid draws.
    pub fn prepare(
        &mut self,
        gpu: &GpuContext,
        frame: FrameUniforms,
        draws: &[HexDraw],
        shadows: bool,
    ) {
        gpu.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));

        let max_buffer_size = gpu.device.limits().max_buffer_size;
        let fit = drawable_hexagons(draws.len(), shadows, self.draw_stride, max_buffer_size);
        let skipped = draws.len() - fit;
        if skipped != self.skipped {
            if skipped > 0 {
                log::warn!(
                    "draw storage limit reached, skipping {skipped} of {} hexagons",
                    draws.len()
                );
            }
            self.skipped = skipped;
        }
        let draws = &draws[..fit];

        let slots = draws.len() * if shadows { 2 } else { 1 };
        self.queued = slots as u32;
        if slots == 0 {
            return;
        }

        self.ensure_capacity(gpu, slots);
        let bytes = pack_draws(draws, shadows, self.draw_stride as usize);
        gpu.queue.write_buffer(&self.draw_buffer, 0, &bytes);
    }

    /// Records one indexed draw per prepared slot.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, mesh: &Mesh) {
        if self.queued == 0 {
            return;
        }

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
        mesh.bind(render_pass);

        for slot in 0..self.queued {
            let offset = (slot as u64 * self.draw_stride) as wgpu::DynamicOffset;
            render_pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
            render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn sample_draw(gray: f32) -> HexDraw {
        HexDraw {
            model_view: Mat4::from_translation(Vec3::new(1.0, 2.0, -20.0)),
            z_offset: 0.1,
            base_gray: gray,
            scale: 1.0,
        }
    }

    fn slot(bytes: &[u8], stride: usize, index: usize) -> DrawUniforms {
        let size = std::mem::size_of::<DrawUniforms>();
        let start = index * stride;
        bytemuck::pod_read_unaligned(&bytes[start..start + size])
    }

    #[test]
    fn uniform_structs_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 80);
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 80);
    }

    #[test]
    fn alignment_rounds_up() {
        assert_eq!(align_to(80, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
    }

    #[test]
    fn solid_only_packs_one_slot_per_hexagon() {
        let draws = [sample_draw(0.05), sample_draw(0.1)];
        let bytes = pack_draws(&draws, false, 256);
        assert_eq!(bytes.len(), 512);
        let second = slot(&bytes, 256, 1);
        assert_eq!(second.is_shadow, 0.0);
        assert_eq!(second.base_gray, 0.1);
        assert_eq!(second.model_view_matrix[3], [1.0, 2.0, -20.0, 1.0]);
    }

    #[test]
    fn shadows_are_packed_before_solids() {
        let draws = [sample_draw(0.05), sample_draw(0.1)];
        let bytes = pack_draws(&draws, true, 256);
        assert_eq!(bytes.len(), 4 * 256);
        let kinds: Vec<f32> = (0..4).map(|i| slot(&bytes, 256, i).is_shadow).collect();
        assert_eq!(kinds, vec![1.0, 1.0, 0.0, 0.0]);
        assert_eq!(slot(&bytes, 256, 2).base_gray, 0.05);
    }

    #[test]
    fn draw_storage_stays_within_buffer_limit() {
        use crate::canvas::canvas_size;
        use crate::config::HexConfig;
        use crate::layout::GridDimensions;

        let stride = align_to(std::mem::size_of::<DrawUniforms>() as u64, 256);
        let limit = wgpu::Limits::default().max_buffer_size;

        // A very wide, very thin window produces tens of thousands of columns.
        let (w, h) = canvas_size(2560, 2, 0.8);
        let dims = GridDimensions::for_viewport(w, h, &HexConfig::default()).unwrap();
        let hexagons = dims.cell_count();
        assert!(hexagons as u64 * 2 * stride > limit);

        for shadows in [false, true] {
            let fit = drawable_hexagons(hexagons, shadows, stride, limit);
            let slots = fit as u64 * if shadows { 2 } else { 1 };
            assert!(fit > 0 && fit <= hexagons);
            assert!(slots * stride <= limit);
            if fit < hexagons {
                // Clipped frames use all the storage that is available.
                assert!((slots + 2) * stride > limit);
            }
        }
        assert!(drawable_hexagons(hexagons, true, stride, limit) < hexagons);
    }

    #[test]
    fn ordinary_grids_draw_every_hexagon() {
        let stride = 256;
        let limit = wgpu::Limits::default().max_buffer_size;
        assert_eq!(drawable_hexagons(378, true, stride, limit), 378);
        assert_eq!(drawable_hexagons(0, true, stride, limit), 0);
        assert_eq!(drawable_hexagons(10, true, stride, 5 * stride), 2);
        assert_eq!(drawable_hexagons(10, false, stride, 5 * stride), 5);
    }

    #[test]
    fn solid_tiles_are_inset_and_shadows_grow_and_sink() {
        let draw = HexDraw {
            model_view: crate::transform::model_view(Vec3::new(1.0, -1.0, 0.0), -20.0),
            z_offset: 0.2,
            base_gray: 0.1,
            scale: 1.0,
        };
        let rim = Vec3::new(0.0, -0.192, 0.0);

        let solid = view_position(rim, &draw, PassKind::Solid);
        assert!((solid - Vec3::new(1.0, -1.0 - 0.192 * 0.97, -19.8)).length() < 1e-5);

        let shadow = view_position(rim, &draw, PassKind::Shadow);
        let expected = Vec3::new(1.02, -1.02 - 0.192 * 1.05, -19.9);
        assert!((shadow - expected).length() < 1e-5);
        assert!(shadow.z < solid.z);

        // The center vertex only moves by the shadow offset.
        let center = view_position(Vec3::ZERO, &draw, PassKind::Shadow)
            - view_position(Vec3::ZERO, &draw, PassKind::Solid);
        assert!((center - SHADOW_OFFSET).length() < 1e-6);
    }

    #[test]
    fn hover_scale_multiplies_the_footprint() {
        let draw = HexDraw {
            model_view: Mat4::IDENTITY,
            z_offset: 0.0,
            base_gray: 0.1,
            scale: 1.5,
        };
        let p = view_position(Vec3::new(0.2, 0.0, 0.0), &draw, PassKind::Solid);
        assert!((p.x - 0.2 * 1.5 * TILE_INSET).abs() < 1e-6);
    }

    /// Reads a scalar or vector `const` from a parsed shader.
    fn shader_const(module: &naga::Module, name: &str) -> Vec<f64> {
        fn values(module: &naga::Module, expr: naga::Handle<naga::Expression>) -> Vec<f64> {
            match &module.global_expressions[expr] {
                naga::Expression::Literal(naga::Literal::F32(v)) => vec![*v as f64],
                naga::Expression::Literal(naga::Literal::AbstractFloat(v)) => vec![*v],
                naga::Expression::Literal(naga::Literal::F64(v)) => vec![*v],
                naga::Expression::Unary {
                    op: naga::UnaryOperator::Negate,
                    expr,
                } => values(module, *expr).into_iter().map(|v| -v).collect(),
                naga::Expression::Compose { components, .. } => components
                    .iter()
                    .flat_map(|&c| values(module, c))
                    .collect(),
                other => panic!("unexpected constant expression {other:?}"),
            }
        }

        let (_, constant) = module
            .constants
            .iter()
            .find(|(_, c)| c.name.as_deref() == Some(name))
            .unwrap_or_else(|| panic!("hex.wgsl has no const {name}"));
        values(module, constant.init)
    }

    #[test]
    fn shader_displacement_constants_match_cpu_mirror() {
        let module = naga::front::wgsl::parse_str(HEX_SHADER).expect("hex.wgsl parses");
        let close = |a: f64, b: f32| (a - b as f64).abs() < 1e-6;

        assert!(close(shader_const(&module, "TILE_INSET")[0], TILE_INSET));
        assert!(close(shader_const(&module, "SHADOW_GROWTH")[0], SHADOW_GROWTH));

        let offset = shader_const(&module, "SHADOW_OFFSET");
        assert_eq!(offset.len(), 3);
        for (shader, cpu) in offset.iter().zip(SHADOW_OFFSET.to_array()) {
            assert!(close(*shader, cpu));
        }
    }

    #[test]
    fn rim_edge_is_measured_from_the_apothem() {
        assert!(HEX_SHADER.contains("let apothem = frame.hex_radius * cos(HALF_SECTOR);"));
        assert!(HEX_SHADER.contains("apothem / cos(sector_angle - HALF_SECTOR)"));

        // At a sector's middle the edge sits at the apothem, inside the circumradius.
        let radius = 0.192f32;
        let apothem = radius * std::f32::consts::FRAC_PI_6.cos();
        assert!(apothem < radius);
        let corner = apothem / (0.0f32 - std::f32::consts::FRAC_PI_6).cos();
        assert!((corner - radius).abs() < 1e-6);
    }

    #[test]
    fn hex_shader_validates() {
        let module = naga::front::wgsl::parse_str(HEX_SHADER).expect("hex.wgsl parses");
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        );
        validator.validate(&module).expect("hex.wgsl validates");

        let entries: Vec<&str> = module
            .entry_points
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert!(entries.contains(&"vs"));
        assert!(entries.contains(&"fs"));
    }
}
