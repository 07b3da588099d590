//! Tunable parameters for a hex field.
//!
//! [`HexConfig`] follows the builder style used throughout the crate:
//!
//! ```
//! use hexfield::{HexConfig, TimeStep};
//!
//! let config = HexConfig::new()
//!     .title("Honeycomb")
//!     .size(1280, 720)
//!     .hover(2.5, 0.6)
//!     .shadow_pass(true)
//!     .time_step(TimeStep::Measured { units_per_second: 0.48 });
//! ```
//!
//! The camera is deliberately absent from the builder: [`CameraParams::DEFAULT`] is
//! fixed for the lifetime of a field.

use std::f32::consts::PI;

/// Fixed camera and projection constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraParams {
    /// View-space z of the hexagon plane. The camera sits at the origin looking down -z.
    pub camera_z: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
}

impl CameraParams {
    /// A very narrow field of view (~12 degrees) 20 units away, which flattens the
    /// perspective so the grid reads almost orthographic.
    pub const DEFAULT: Self = Self {
        camera_z: -20.0,
        fov: PI / 15.0,
        near: 0.1,
        far: 100.0,
    };

    /// Distance from the camera to the hexagon plane.
    pub fn distance(&self) -> f32 {
        self.camera_z.abs()
    }
}

impl Default for CameraParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// How the animation clock advances each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeStep {
    /// Add a constant per frame. Animation speed follows the display refresh rate.
    Fixed(f32),
    /// Add measured wall-clock time scaled to animation units.
    Measured {
        /// Animation units per real second. `0.48` matches `Fixed(0.008)` at 60 Hz.
        units_per_second: f32,
    },
}

impl Default for TimeStep {
    fn default() -> Self {
        TimeStep::Fixed(0.008)
    }
}

/// Configuration for a hex field and the window hosting it.
#[derive(Clone, Debug)]
pub struct HexConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Fraction of the window's inner size used for the render canvas.
    pub canvas_fraction: f32,
    /// Circumradius of one hexagon in world units.
    pub hex_radius: f32,
    /// Lower bound of the per-cell base gray.
    pub min_gray: f32,
    /// Upper bound of the per-cell base gray.
    pub max_gray: f32,
    /// Amplitude of the depth oscillation.
    pub z_range: f32,
    /// Angular speed of the depth oscillation.
    pub animation_speed: f32,
    /// World-space radius of the pointer's influence.
    pub hover_radius: f32,
    /// Extra forward lift on top of `z_range` for a hexagon directly under the pointer.
    pub hover_z_boost: f32,
    pub time_step: TimeStep,
    /// Draw offset drop shadows before the solid tiles.
    pub shadow_pass: bool,
    /// Stop the proximity lift when the pointer leaves the window.
    pub deactivate_on_leave: bool,
    pub clear_color: wgpu::Color,
    /// Oversize factor applied to the visible area when sizing the grid.
    pub grid_padding: f32,
    /// Grid used while the canvas has no area yet, as `(rows, cols)`.
    pub fallback_grid: (u32, u32),
    /// Seed for per-cell shade and phase. `None` draws from entropy.
    pub seed: Option<u64>,
    /// Always [`CameraParams::DEFAULT`]; read it through [`HexConfig::camera`].
    pub(crate) camera: CameraParams,
}

impl Default for HexConfig {
    fn default() -> Self {
        Self {
            title: "Hexfield".to_string(),
            width: 1280,
            height: 720,
            canvas_fraction: 0.8,
            hex_radius: 0.192,
            // 0.033..0.132, bottom raised 10% and top lowered 10%
            min_gray: 0.033 * 1.1,
            max_gray: (0.033 + 0.099) * 0.9,
            z_range: 0.25,
            animation_speed: 0.3,
            hover_radius: 3.0,
            hover_z_boost: 0.5,
            time_step: TimeStep::default(),
            shadow_pass: false,
            deactivate_on_leave: false,
            clear_color: wgpu::Color {
                r: 0.05,
                g: 0.05,
                b: 0.05,
                a: 1.0,
            },
            grid_padding: 1.2,
            fallback_grid: (30, 40),
            seed: None,
            camera: CameraParams::DEFAULT,
        }
    }
}

impl HexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Canvas size relative to the window, clamped into `(0, 1]`.
    pub fn canvas_fraction(mut self, fraction: f32) -> Self {
        self.canvas_fraction = fraction.clamp(f32::EPSILON, 1.0);
        self
    }

    pub fn hex_radius(mut self, radius: f32) -> Self {
        self.hex_radius = radius.max(f32::EPSILON);
        self
    }

    /// Luminance band for per-cell base gray. The bounds may be given in either order.
    pub fn gray_band(mut self, a: f32, b: f32) -> Self {
        self.min_gray = a.min(b).clamp(0.0, 1.0);
        self.max_gray = a.max(b).clamp(0.0, 1.0);
        self
    }

    pub fn oscillation(mut self, amplitude: f32, speed: f32) -> Self {
        self.z_range = amplitude.abs();
        self.animation_speed = speed;
        self
    }

    pub fn hover(mut self, radius: f32, z_boost: f32) -> Self {
        self.hover_radius = radius.max(f32::EPSILON);
        self.hover_z_boost = z_boost;
        self
    }

    pub fn time_step(mut self, step: TimeStep) -> Self {
        self.time_step = step;
        self
    }

    pub fn shadow_pass(mut self, enabled: bool) -> Self {
        self.shadow_pass = enabled;
        self
    }

    pub fn deactivate_on_leave(mut self, enabled: bool) -> Self {
        self.deactivate_on_leave = enabled;
        self
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The fixed camera every field is viewed through.
    pub fn camera(&self) -> &CameraParams {
        &self.camera
    }

    /// Distance between neighbouring column centers.
    pub fn hex_width(&self) -> f32 {
        self.hex_radius * 3f32.sqrt()
    }

    /// Distance between neighbouring row centers; rows interlock.
    pub fn hex_height(&self) -> f32 {
        self.hex_radius * 1.5
    }
}
