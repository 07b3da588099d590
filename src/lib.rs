//! # Hexfield
//!
//! **A honeycomb of shaded hexagons that breathes and leans toward the pointer.**
//!
//! Each hexagon sits on a plane in front of a narrow perspective camera, bobs in depth on
//! its own phase-shifted oscillator, and lifts toward the viewer when the pointer comes
//! near. The grid is sized to cover the window and rebuilt whenever the window resizes.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> Result<(), hexfield::HexError> {
//!     hexfield::run_with_config(hexfield::HexConfig::new().title("Honeycomb"))
//! }
//! ```
//!
//! ## Layers
//!
//! - [`HexGeometry`] / [`Mesh`]: the single seven-vertex hexagon shared by every draw
//! - [`Grid`]: how many hexagons cover the viewport and where they sit
//! - [`transform`]: projection, model-view and screen/world conversion
//! - [`PointerTracker`]: pointer position on the hexagon plane and the proximity lift
//! - [`HexField`]: the per-frame driver tying them to the GPU
//!
//! Hosts that manage their own window can skip [`run`] and drive a [`HexField`]
//! directly from their event loop.

mod animation;
mod app;
mod canvas;
mod config;
mod error;
mod field;
mod gpu;
mod hex_pass;
mod interaction;
mod layout;
mod mesh;
pub mod transform;

pub use animation::{AnimationClock, oscillation};
pub use app::{run, run_with_config};
pub use canvas::{Canvas, CanvasBlit, canvas_size};
pub use config::{CameraParams, HexConfig, TimeStep};
pub use error::HexError;
pub use field::{HexField, instance_draws, regenerated_canvas};
pub use gpu::GpuContext;
pub use hex_pass::{
    DrawUniforms, FrameUniforms, HexDraw, HexPass, PassKind, drawable_hexagons, view_position,
};
pub use interaction::{HoverEffect, PointerTracker, SharedTracker};
pub use layout::{Grid, GridDimensions, Hexagon, visible_world_extent};
pub use mesh::{HEX_INDEX_COUNT, HEX_VERTEX_COUNT, HexGeometry, Mesh};

// Re-export math types so callers don't need to depend on glam directly
pub use glam::{Mat4, Vec2, Vec3};
