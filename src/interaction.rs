//! Pointer tracking and the proximity lift.
//!
//! A [`PointerTracker`] turns window-relative pointer pixels into world coordinates on
//! the hexagon plane and answers, per hexagon, how far it should rise toward the
//! camera. Trackers are plain values; wrap one in a [`SharedTracker`] to feed several
//! fields from a single pointer.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::config::{CameraParams, HexConfig};
use crate::transform::{camera_projection, ndc_to_world, screen_to_ndc};

/// A tracker shared between fields living on the same thread.
pub type SharedTracker = Rc<RefCell<PointerTracker>>;

/// Extra depth and scale applied to one hexagon this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverEffect {
    pub z_boost: f32,
    pub scale: f32,
}

impl HoverEffect {
    /// No lift, unit scale.
    pub const NONE: Self = Self {
        z_boost: 0.0,
        scale: 1.0,
    };
}

/// Last known pointer position on the hexagon plane.
#[derive(Clone, Debug)]
pub struct PointerTracker {
    world: Vec2,
    active: bool,
    deactivate_on_leave: bool,
    hover_radius: f32,
    hover_z_boost: f32,
    z_range: f32,
}

impl PointerTracker {
    pub fn new(config: &HexConfig) -> Self {
        Self {
            world: Vec2::ZERO,
            active: false,
            deactivate_on_leave: config.deactivate_on_leave,
            hover_radius: config.hover_radius,
            hover_z_boost: config.hover_z_boost,
            z_range: config.z_range,
        }
    }

    pub fn shared(config: &HexConfig) -> SharedTracker {
        Rc::new(RefCell::new(Self::new(config)))
    }

    /// Records a pointer move.
    ///
    /// `pointer` is relative to the element's top-left corner and is clamped to the
    /// element before being mapped onto the canvas, so movement outside the element
    /// pins to its border. The first move activates the tracker.
    pub fn pointer_moved(
        &mut self,
        pointer: Vec2,
        element: Vec2,
        canvas: Vec2,
        camera: &CameraParams,
    ) {
        if element.x <= 0.0 || element.y <= 0.0 || canvas.x <= 0.0 || canvas.y <= 0.0 {
            return;
        }

        let clamped = pointer.clamp(Vec2::ZERO, element);
        let canvas_px = clamped / element * canvas;
        let ndc = screen_to_ndc(canvas_px, canvas);

        let projection = camera_projection(camera, canvas.x / canvas.y);
        self.world = ndc_to_world(ndc, projection, camera.camera_z);
        self.active = true;
    }

    /// The pointer left the window. Only deactivates when configured to.
    pub fn pointer_left(&mut self) {
        if self.deactivate_on_leave {
            self.active = false;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn world_position(&self) -> Vec2 {
        self.world
    }

    /// Lift for a hexagon at `hex` whose oscillator currently sits at `base_z`.
    ///
    /// Inside the hover radius the lift closes a cubed fraction of the gap between
    /// `base_z` and the highest reachable depth, `z_range + hover_z_boost`.
    pub fn hover_effect(&self, hex: Vec2, base_z: f32) -> HoverEffect {
        if !self.active {
            return HoverEffect::NONE;
        }

        let distance = self.world.distance(hex);
        if distance >= self.hover_radius {
            return HoverEffect::NONE;
        }

        let factor = 1.0 - distance / self.hover_radius;
        let eased = factor * factor * factor;
        let target_z = self.z_range + self.hover_z_boost;

        HoverEffect {
            z_boost: (target_z - base_z) * eased,
            scale: 1.0,
        }
    }
}
