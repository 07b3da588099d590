//! Grid layout: how many hexagons cover the viewport, and where they go.
//!
//! Sizing works in world space at `z = 0`. The camera sees a rectangle of height
//! `2 · tan(fov / 2) · |camera_z|` and width `height · aspect`; the grid is made
//! [`HexConfig::grid_padding`] times larger so edges never show a seam.
//!
//! Tiling is a honeycomb: odd rows shift right by half a hexagon width and rows are
//! packed `1.5 · radius` apart so they interlock. The whole comb is centered on the
//! world origin.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::config::{CameraParams, HexConfig};

/// Grid size and cell spacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridDimensions {
    pub rows: u32,
    pub cols: u32,
    /// Horizontal distance between neighbouring centers.
    pub hex_width: f32,
    /// Vertical distance between neighbouring rows.
    pub hex_height: f32,
}

impl GridDimensions {
    /// Rows and columns needed to cover a `width × height` pixel viewport.
    ///
    /// Returns `None` when either dimension is zero.
    pub fn for_viewport(width: u32, height: u32, config: &HexConfig) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let visible = visible_world_extent(width as f32 / height as f32, &config.camera);
        let hex_width = config.hex_width();
        let hex_height = config.hex_height();
        let padding = config.grid_padding;

        Some(Self {
            rows: (visible.y * padding / hex_height).ceil() as u32,
            cols: (visible.x * padding / hex_width).ceil() as u32,
            hex_width,
            hex_height,
        })
    }

    /// The fixed grid used before the viewport has any area.
    pub fn fallback(config: &HexConfig) -> Self {
        let (rows, cols) = config.fallback_grid;
        Self {
            rows,
            cols,
            hex_width: config.hex_width(),
            hex_height: config.hex_height(),
        }
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// World position of the cell at `(row, col)`.
    pub fn cell_center(&self, row: u32, col: u32) -> Vec2 {
        let row_shift = if row % 2 == 1 { self.hex_width / 2.0 } else { 0.0 };
        // Odd rows only widen the comb when there is more than one row.
        let comb_shift = if self.rows > 1 { self.hex_width / 2.0 } else { 0.0 };
        let span_x = self.cols.saturating_sub(1) as f32 * self.hex_width + comb_shift;
        let span_y = self.rows.saturating_sub(1) as f32 * self.hex_height;

        Vec2::new(
            col as f32 * self.hex_width + row_shift - span_x / 2.0,
            row as f32 * self.hex_height - span_y / 2.0,
        )
    }
}

/// Size of the world rectangle visible at `z = 0`.
pub fn visible_world_extent(aspect: f32, camera: &CameraParams) -> Vec2 {
    let height = 2.0 * (camera.fov / 2.0).tan() * camera.distance();
    Vec2::new(height * aspect, height)
}

/// One tile of the comb. Never mutated by animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hexagon {
    /// World position at rest (`z` is always zero).
    pub position: Vec3,
    pub base_gray: f32,
    /// Oscillator phase in `[0, 2π)`.
    pub phase_offset: f32,
}

/// Row-major collection of hexagons, replaced wholesale on resize.
#[derive(Clone, Debug)]
pub struct Grid {
    dimensions: GridDimensions,
    hexagons: Vec<Hexagon>,
}

impl Grid {
    /// Lays out a comb with the given dimensions, drawing shade and phase per cell.
    pub fn generate<R: Rng>(
        dimensions: GridDimensions,
        min_gray: f32,
        max_gray: f32,
        rng: &mut R,
    ) -> Self {
        let mut hexagons = Vec::with_capacity(dimensions.cell_count());

        for row in 0..dimensions.rows {
            for col in 0..dimensions.cols {
                let center = dimensions.cell_center(row, col);
                let base_gray = if min_gray < max_gray {
                    rng.gen_range(min_gray..max_gray)
                } else {
                    min_gray
                };
                hexagons.push(Hexagon {
                    position: center.extend(0.0),
                    base_gray,
                    phase_offset: rng.gen_range(0.0..TAU),
                });
            }
        }

        Self {
            dimensions,
            hexagons,
        }
    }

    /// Grid covering a `width × height` pixel canvas, or the fallback grid when the
    /// canvas has no area yet.
    pub fn for_viewport<R: Rng>(
        width: u32,
        height: u32,
        config: &HexConfig,
        rng: &mut R,
    ) -> Self {
        let dimensions = GridDimensions::for_viewport(width, height, config)
            .unwrap_or_else(|| GridDimensions::fallback(config));
        Self::generate(dimensions, config.min_gray, config.max_gray, rng)
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    pub fn hexagons(&self) -> &[Hexagon] {
        &self.hexagons
    }

    pub fn len(&self) -> usize {
        self.hexagons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hexagons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Point-in-hexagon for the comb's orientation (vertices at ±90°).
    fn inside_hexagon(point: Vec2, center: Vec2, radius: f32) -> bool {
        let apothem = radius * 3f32.sqrt() / 2.0;
        let d = (point - center).abs();
        let eps = 1e-4;
        d.x <= apothem + eps && d.x * 0.5 + d.y * 3f32.sqrt() / 2.0 <= apothem + eps
    }

    fn assert_covers(width: u32, height: u32) {
        let config = HexConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let grid = Grid::for_viewport(width, height, &config, &mut rng);
        let visible = visible_world_extent(width as f32 / height as f32, &config.camera);

        let steps = 24;
        for i in 0..=steps {
            for j in 0..=steps {
                let point = Vec2::new(
                    -visible.x / 2.0 + visible.x * i as f32 / steps as f32,
                    -visible.y / 2.0 + visible.y * j as f32 / steps as f32,
                );
                let covered = grid
                    .hexagons()
                    .iter()
                    .any(|h| inside_hexagon(point, h.position.truncate(), config.hex_radius));
                assert!(covered, "{width}x{height}: gap at {point:?}");
            }
        }
    }

    #[test]
    fn scenario_800_by_600() {
        let config = HexConfig::default();
        let dims = GridDimensions::for_viewport(800, 600, &config).unwrap();

        let visible = visible_world_extent(800.0 / 600.0, &config.camera);
        assert!((visible.y - 4.2042).abs() < 1e-3);
        assert!((visible.x - 5.6056).abs() < 1e-3);

        assert_eq!(dims.cols, 21);
        assert_eq!(dims.rows, 18);
        assert!((dims.hex_width - 0.192 * 3f32.sqrt()).abs() < 1e-6);
        assert!((dims.hex_height - 0.288).abs() < 1e-6);
    }

    #[test]
    fn count_is_rows_times_cols() {
        let config = HexConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let grid = Grid::for_viewport(1280, 720, &config, &mut rng);
        let dims = grid.dimensions();
        assert_eq!(grid.len(), (dims.rows * dims.cols) as usize);
    }

    #[test]
    fn covers_visible_rectangle() {
        for (w, h) in [
            (800, 600),
            (1920, 1080),
            (600, 800),
            (300, 300),
            (2560, 1080),
            (1000, 10),
            (10, 1000),
            (1, 1),
        ] {
            assert_covers(w, h);
        }
    }

    #[test]
    fn layout_is_idempotent_for_same_viewport() {
        let config = HexConfig::default();
        let a = GridDimensions::for_viewport(1024, 768, &config);
        let b = GridDimensions::for_viewport(1024, 768, &config);
        assert_eq!(a, b);

        let mut rng = StdRng::seed_from_u64(3);
        let first = Grid::for_viewport(1024, 768, &config, &mut rng);
        let second = Grid::for_viewport(1024, 768, &config, &mut rng);
        assert_eq!(first.dimensions(), second.dimensions());
        for (x, y) in first.hexagons().iter().zip(second.hexagons()) {
            assert_eq!(x.position, y.position);
        }
    }

    #[test]
    fn zero_viewport_falls_back_to_default_grid() {
        let config = HexConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        assert!(GridDimensions::for_viewport(0, 600, &config).is_none());

        let grid = Grid::for_viewport(0, 0, &config, &mut rng);
        assert_eq!(grid.dimensions().rows, 30);
        assert_eq!(grid.dimensions().cols, 40);
        assert_eq!(grid.len(), 1200);
    }

    #[test]
    fn odd_rows_shift_half_a_width() {
        let config = HexConfig::default();
        let dims = GridDimensions::for_viewport(800, 600, &config).unwrap();
        let even = dims.cell_center(0, 3);
        let odd = dims.cell_center(1, 3);
        assert!((odd.x - even.x - dims.hex_width / 2.0).abs() < 1e-5);
        assert!((odd.y - even.y - dims.hex_height).abs() < 1e-5);
    }

    #[test]
    fn comb_is_centered_on_origin() {
        let config = HexConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let grid = Grid::for_viewport(800, 600, &config, &mut rng);
        let (min, max) = grid.hexagons().iter().fold(
            (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
            |(lo, hi), h| (lo.min(h.position.truncate()), hi.max(h.position.truncate())),
        );
        assert!((min + max).length() < 1e-4);
        assert!(grid.hexagons().iter().all(|h| h.position.z == 0.0));
    }

    #[test]
    fn shade_and_phase_stay_in_range() {
        let config = HexConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let grid = Grid::for_viewport(800, 600, &config, &mut rng);
        for hex in grid.hexagons() {
            assert!(hex.base_gray >= config.min_gray && hex.base_gray < config.max_gray);
            assert!(hex.phase_offset >= 0.0 && hex.phase_offset < TAU);
        }
        // Phases must not all match, or the field breathes in unison.
        let first = grid.hexagons()[0].phase_offset;
        assert!(grid.hexagons().iter().any(|h| h.phase_offset != first));
    }

    #[test]
    fn degenerate_gray_band_uses_lower_bound() {
        let dims = GridDimensions::fallback(&HexConfig::default());
        let mut rng = StdRng::seed_from_u64(0);
        let grid = Grid::generate(dims, 0.1, 0.1, &mut rng);
        assert!(grid.hexagons().iter().all(|h| h.base_gray == 0.1));
    }
}
