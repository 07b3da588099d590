//! Matrix constructors and the screen/world conversions built on them.
//!
//! Everything here is a pure function. Projection matrices use wgpu's clip
//! convention (right-handed view space, depth in `[0, 1]`).

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::config::CameraParams;

/// Symmetric perspective frustum.
pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov, aspect, near, far)
}

/// Off-center-free orthographic projection.
///
/// Not used by the hex field itself, but kept alongside [`perspective`] so callers can
/// swap projections without pulling in their own math.
pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    Mat4::orthographic_rh(left, right, bottom, top, near, far)
}

/// Places a unit-scaled hexagon at `position`, pushed out to the camera plane.
///
/// Only translation: scale and the animated z lift are separate uniforms so they can
/// change every frame without rebuilding placement.
pub fn model_view(position: Vec3, camera_z: f32) -> Mat4 {
    Mat4::from_translation(position + Vec3::new(0.0, 0.0, camera_z))
}

/// The projection used for a frame with the given aspect ratio.
pub fn camera_projection(camera: &CameraParams, aspect: f32) -> Mat4 {
    perspective(camera.fov, aspect, camera.near, camera.far)
}

/// Pixel position (origin top-left, y down) to normalized device coordinates.
pub fn screen_to_ndc(pixel: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(pixel.x / size.x * 2.0 - 1.0, 1.0 - pixel.y / size.y * 2.0)
}

/// Normalized device coordinates to pixels, inverse of [`screen_to_ndc`].
pub fn ndc_to_screen(ndc: Vec2, size: Vec2) -> Vec2 {
    Vec2::new((ndc.x + 1.0) * 0.5 * size.x, (1.0 - ndc.y) * 0.5 * size.y)
}

/// Intersects the view ray through `ndc` with the hexagon plane and returns world `(x, y)`.
///
/// Unprojects the near and far points like a picking ray, then walks the ray to
/// view-space `z = camera_z`, which is world `z = 0`.
pub fn ndc_to_world(ndc: Vec2, projection: Mat4, camera_z: f32) -> Vec2 {
    let inverse = projection.inverse();

    let near = inverse * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
    let far = inverse * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
    let near = near.truncate() / near.w;
    let far = far.truncate() / far.w;

    let direction = far - near;
    if direction.z.abs() <= f32::EPSILON {
        return near.truncate();
    }
    let t = (camera_z - near.z) / direction.z;
    (near + direction * t).truncate()
}

/// Projects a world point to normalized device coordinates.
pub fn world_to_ndc(world: Vec3, projection: Mat4, camera_z: f32) -> Vec3 {
    let clip = projection * model_view(world, camera_z) * Vec4::W;
    clip.truncate() / clip.w
}
