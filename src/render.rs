use std::time::Instant;

use image::{Rgba, RgbaImage};

use crate::camera::Camera;
use crate::scene::Scene;
use crate::tracer;

/// Rays closer than this along the view direction are near-plane artifacts
/// and are excluded from every primary ray.
const T_MIN: f32 = 1.0;

/// Virtual rectangle the rays are projected through, sitting `distance` in
/// front of the camera along view-space +z.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub size: f32,
    pub distance: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            size: 1.0,
            distance: 1.0,
        }
    }
}

impl Viewport {
    /// Maps a centered pixel coordinate (x right, y up) to a view-space ray
    /// direction.
    pub fn ray_direction(&self, x: i32, y: i32, width: u32, height: u32) -> glam::Vec3 {
        glam::Vec3::new(
            x as f32 * self.size / width as f32,
            y as f32 * self.size / height as f32,
            self.distance,
        )
    }
}

/// Buffer coordinate (top-left origin, y down) to centered ray coordinate
/// (center origin, y up). Inverse of the classic `putPixel` offset, iterated
/// from the buffer side so each pixel is written exactly once per pass.
pub fn centered_coord(bx: u32, by: u32, width: u32, height: u32) -> (i32, i32) {
    let x = bx as i32 - width as i32 / 2;
    let y = height as i32 / 2 - by as i32 - 1;
    (x, y)
}

/// One full synchronous render pass: every pixel swept, traced, and written.
/// There is no partial or incremental mode; a camera change re-runs the whole
/// sweep. Runs to completion before returning, so a single-threaded event
/// loop serializes passes by construction.
pub fn render_pass(scene: &Scene, camera: &Camera, viewport: Viewport, img: &mut RgbaImage) {
    let started = Instant::now();
    let (width, height) = img.dimensions();
    let rotation = camera.rotation();
    let origin = camera.origin();

    for by in 0..height {
        for bx in 0..width {
            let (x, y) = centered_coord(bx, by, width, height);
            let dir = rotation * viewport.ray_direction(x, y, width, height);
            let [r, g, b] = tracer::trace_ray(scene, origin, dir, T_MIN, f32::INFINITY);
            img.put_pixel(bx, by, Rgba([r, g, b, 255]));
        }
    }

    tracing::debug!(
        width,
        height,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "render pass complete"
    );
}
