//! The hex field: a grid of animated hexagons and everything needed to draw it.
//!
//! [`HexField`] is the render loop's unit of work. It owns the GPU-side pieces (mesh,
//! shading pass, canvas, blit), the current [`Grid`], the animation clock, and a
//! handle to the pointer tracker. The host calls [`HexField::render`] once per
//! redraw and forwards resize and pointer events as they arrive.
//!
//! The CPU half of a frame is [`instance_draws`], a pure function from grid, pointer
//! state and time to one [`HexDraw`] per hexagon, so it can be exercised without a GPU.

use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::animation::{AnimationClock, oscillation};
use crate::canvas::{CANVAS_FORMAT, Canvas, CanvasBlit, canvas_size};
use crate::config::HexConfig;
use crate::error::HexError;
use crate::gpu::GpuContext;
use crate::hex_pass::{FrameUniforms, HexDraw, HexPass};
use crate::interaction::{PointerTracker, SharedTracker};
use crate::layout::Grid;
use crate::mesh::{HexGeometry, Mesh};
use crate::transform::{camera_projection, model_view};

/// Builds this frame's draw list: every hexagon's oscillator depth plus its
/// proximity lift, in grid order.
pub fn instance_draws(
    grid: &Grid,
    tracker: &PointerTracker,
    config: &HexConfig,
    time: f32,
) -> Vec<HexDraw> {
    grid.hexagons()
        .iter()
        .map(|hex| {
            let base_z = oscillation(
                time,
                hex.phase_offset,
                config.animation_speed,
                config.z_range,
            );
            let hover = tracker.hover_effect(hex.position.truncate(), base_z);

            HexDraw {
                model_view: model_view(hex.position, config.camera.camera_z),
                z_offset: base_z + hover.z_boost,
                base_gray: hex.base_gray,
                scale: hover.scale,
            }
        })
        .collect()
}

/// New canvas size after the window became `window`, or `None` when the grid should be
/// kept: the window has no area (minimized) or the canvas size did not change.
///
/// `current` is the canvas's allocated size, which is never below one pixel.
pub fn regenerated_canvas(
    current: (u32, u32),
    window: (u32, u32),
    fraction: f32,
) -> Option<(u32, u32)> {
    if window.0 == 0 || window.1 == 0 {
        return None;
    }
    let (width, height) = canvas_size(window.0, window.1, fraction);
    ((width.max(1), height.max(1)) != current).then_some((width, height))
}

/// A viewport-filling field of hexagons.
pub struct HexField {
    config: HexConfig,
    mesh: Mesh,
    pass: HexPass,
    canvas: Canvas,
    blit: CanvasBlit,
    grid: Grid,
    tracker: SharedTracker,
    clock: AnimationClock,
    rng: StdRng,
}

impl HexField {
    /// Creates a field with its own pointer tracker.
    pub fn new(gpu: &GpuContext, config: HexConfig) -> Result<Self, HexError> {
        let tracker = PointerTracker::shared(&config);
        Self::with_tracker(gpu, config, tracker)
    }

    /// Creates a field reading pointer state from `tracker`, which may be shared with
    /// other fields.
    pub fn with_tracker(
        gpu: &GpuContext,
        config: HexConfig,
        tracker: SharedTracker,
    ) -> Result<Self, HexError> {
        let pass = HexPass::new(gpu, CANVAS_FORMAT)?;
        let blit = CanvasBlit::new(gpu)?;
        let mesh = Mesh::new(gpu, &HexGeometry::new(config.hex_radius));

        let (width, height) = canvas_size(gpu.width(), gpu.height(), config.canvas_fraction);
        let canvas = Canvas::new(gpu, width, height);

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let grid = Grid::for_viewport(width, height, &config, &mut rng);
        log_grid(&grid, width, height);

        Ok(Self {
            clock: AnimationClock::new(config.time_step),
            config,
            mesh,
            pass,
            canvas,
            blit,
            grid,
            tracker,
            rng,
        })
    }

    /// Follows a window resize: reconfigures the surface, resizes the canvas and
    /// replaces the grid. Zero-sized windows (minimized) are ignored.
    pub fn resize(&mut self, gpu: &mut GpuContext, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("ignoring resize to {width}x{height}");
            return;
        }

        gpu.resize(width, height);

        let current = (self.canvas.width(), self.canvas.height());
        let Some((canvas_w, canvas_h)) =
            regenerated_canvas(current, (width, height), self.config.canvas_fraction)
        else {
            return;
        };

        self.canvas = Canvas::new(gpu, canvas_w, canvas_h);
        self.grid = Grid::for_viewport(canvas_w, canvas_h, &self.config, &mut self.rng);
        log_grid(&self.grid, canvas_w, canvas_h);
    }

    /// Forwards a pointer position relative to the window's top-left corner.
    /// `element` is the window's inner size.
    pub fn pointer_moved(&mut self, pointer: Vec2, element: Vec2) {
        let canvas = Vec2::new(self.canvas.width() as f32, self.canvas.height() as f32);
        self.tracker
            .borrow_mut()
            .pointer_moved(pointer, element, canvas, &self.config.camera);
    }

    pub fn pointer_left(&mut self) {
        self.tracker.borrow_mut().pointer_left();
    }

    /// Advances the clock and draws one frame.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped; any other
    /// acquisition failure is logged and the frame skipped.
    pub fn render(&mut self, gpu: &GpuContext) {
        let time = self.clock.tick();

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                gpu.reconfigure();
                return;
            }
            Err(e) => {
                log::warn!("skipping frame: {e}");
                return;
            }
        };
        let screen_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let projection = camera_projection(&self.config.camera, self.canvas.aspect());
        let frame = FrameUniforms {
            projection_matrix: projection.to_cols_array_2d(),
            time,
            hex_radius: self.config.hex_radius,
            camera_z: self.config.camera.camera_z,
            _padding: 0.0,
        };
        let draws = instance_draws(&self.grid, &self.tracker.borrow(), &self.config, time);
        self.pass
            .prepare(gpu, frame, &draws, self.config.shadow_pass);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Hex Field Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Hex Canvas Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.canvas.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.canvas.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.pass.draw(&mut render_pass, &self.mesh);
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Canvas Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &screen_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.blit.draw(gpu, &mut render_pass, &self.canvas);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tracker(&self) -> SharedTracker {
        self.tracker.clone()
    }

    pub fn time(&self) -> f32 {
        self.clock.time()
    }

    pub fn config(&self) -> &HexConfig {
        &self.config
    }
}

fn log_grid(grid: &Grid, width: u32, height: u32) {
    let dims = grid.dimensions();
    log::info!(
        "grid {}x{} ({} hexagons) for {}x{} canvas",
        dims.cols,
        dims.rows,
        grid.len(),
        width,
        height
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn seeded_grid(config: &HexConfig) -> Grid {
        let mut rng = StdRng::seed_from_u64(9);
        Grid::for_viewport(800, 600, config, &mut rng)
    }

    #[test]
    fn minimized_window_keeps_the_grid() {
        assert_eq!(regenerated_canvas((800, 480), (0, 600), 0.8), None);
        assert_eq!(regenerated_canvas((800, 480), (1000, 0), 0.8), None);
    }

    #[test]
    fn unchanged_canvas_keeps_the_grid() {
        assert_eq!(regenerated_canvas((800, 480), (1000, 600), 0.8), None);
        // Sub-pixel window changes floor to the same canvas.
        assert_eq!(regenerated_canvas((800, 480), (1001, 601), 0.8), None);
    }

    #[test]
    fn resized_canvas_regenerates() {
        assert_eq!(
            regenerated_canvas((800, 480), (1280, 720), 0.8),
            Some((1024, 576))
        );
        assert_eq!(
            regenerated_canvas((800, 480), (1000, 600), 1.0),
            Some((1000, 600))
        );
        // A window too small for a whole canvas pixel regenerates with the fallback.
        assert_eq!(regenerated_canvas((800, 480), (1, 1), 0.8), Some((0, 0)));
        assert_eq!(regenerated_canvas((1, 1), (1, 1), 0.8), None);
    }

    #[test]
    fn one_draw_per_hexagon_in_grid_order() {
        let config = HexConfig::default();
        let grid = seeded_grid(&config);
        let tracker = PointerTracker::new(&config);
        let draws = instance_draws(&grid, &tracker, &config, 1.5);

        assert_eq!(draws.len(), grid.len());
        for (draw, hex) in draws.iter().zip(grid.hexagons()) {
            assert_eq!(draw.base_gray, hex.base_gray);
            let origin = draw.model_view.transform_point3(Vec3::ZERO);
            assert!((origin - (hex.position + Vec3::new(0.0, 0.0, -20.0))).length() < 1e-5);
        }
    }

    #[test]
    fn idle_pointer_leaves_only_oscillation() {
        let config = HexConfig::default();
        let grid = seeded_grid(&config);
        let tracker = PointerTracker::new(&config);
        let time = 4.2;
        let draws = instance_draws(&grid, &tracker, &config, time);

        for (draw, hex) in draws.iter().zip(grid.hexagons()) {
            let expected = oscillation(time, hex.phase_offset, 0.3, 0.25);
            assert!((draw.z_offset - expected).abs() < 1e-6);
            assert!(draw.z_offset.abs() <= config.z_range + 1e-6);
            assert_eq!(draw.scale, 1.0);
        }
    }

    #[test]
    fn hexagon_under_pointer_rises_to_full_height() {
        let config = HexConfig::default();
        let grid = seeded_grid(&config);
        let (index, target) = grid
            .hexagons()
            .iter()
            .copied()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.position
                    .length()
                    .total_cmp(&b.position.length())
            })
            .unwrap();

        let canvas = Vec2::new(800.0, 600.0);
        let element = Vec2::new(1000.0, 750.0);
        let projection = camera_projection(&config.camera, canvas.x / canvas.y);
        let ndc = crate::transform::world_to_ndc(
            target.position,
            projection,
            config.camera.camera_z,
        );
        let pointer = crate::transform::ndc_to_screen(ndc.truncate(), canvas) / canvas * element;

        let mut tracker = PointerTracker::new(&config);
        tracker.pointer_moved(pointer, element, canvas, &config.camera);

        let draws = instance_draws(&grid, &tracker, &config, 0.7);
        let lifted = draws[index].z_offset;
        assert!((lifted - (config.z_range + config.hover_z_boost)).abs() < 1e-3);

        // Hexagons far outside the hover radius are untouched.
        let far = grid
            .hexagons()
            .iter()
            .position(|h| h.position.truncate().distance(target.position.truncate()) > 3.5)
            .unwrap();
        let expected = oscillation(0.7, grid.hexagons()[far].phase_offset, 0.3, 0.25);
        assert!((draws[far].z_offset - expected).abs() < 1e-6);
    }
}
