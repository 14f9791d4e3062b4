//! Core rendering functions
//! Triangle rasterization, line drawing and whole-mesh passes

use std::path::Path;

use thiserror::Error;

use super::math::{barycentric, Vec3};
use super::shader::{ContextState, Fragment, Shader};
use super::transform::Transforms;
use super::types::{Color, LineAlgorithm, MeshSource};

/// Contract violations between the vertex and fragment stages
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RasterError {
    #[error("triangle rasterized before its vertex stage completed (context {state:?})")]
    IncompleteTriangle { state: ContextState },
}

/// Color and depth targets for software rendering.
///
/// Row 0 is the bottom of the image; flip before writing it out.
pub struct Framebuffer {
    pub pixels: Vec<Color>,
    /// Larger values win; seeded with negative infinity
    pub zbuffer: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![Color::BLACK; width * height],
            zbuffer: vec![f32::NEG_INFINITY; width * height],
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
        self.clear_depth();
    }

    pub fn clear_depth(&mut self) {
        self.zbuffer.fill(f32::NEG_INFINITY);
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Color::default()
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    pub fn depth(&self, x: usize, y: usize) -> f32 {
        self.zbuffer[y * self.width + x]
    }

    /// Plot with signed coordinates; anything off the buffer is dropped
    fn plot(&mut self, x: i64, y: i64, color: Color) {
        if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
            self.set_pixel(x, y, color);
        }
    }

    /// Part of `x0..=x1` on the major axis that lands inside the buffer
    fn major_span(&self, x0: i64, x1: i64, steep: bool) -> Option<(i64, i64)> {
        let limit = if steep { self.height as i64 } else { self.width as i64 };
        let (start, end) = (x0.max(0), x1.min(limit - 1));
        (start <= end).then_some((start, end))
    }

    /// Draw a line from (x0, y0) to (x1, y1), endpoints included, by
    /// stepping a float parameter along the major axis
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let (x0, y0, x1, y1, steep) = major_axis_order(x0, y0, x1, y1);
        let Some((start, end)) = self.major_span(x0, x1, steep) else {
            return;
        };

        for x in start..=end {
            let t = if x1 == x0 { 0.0 } else { (x - x0) as f64 / (x1 - x0) as f64 };
            // Rounded, not truncated: 13.0 * (3.0 / 13.0) lands just under 3
            let y = (y0 as f64 + (y1 - y0) as f64 * t).round() as i64;
            if steep {
                self.plot(y, x, color);
            } else {
                self.plot(x, y, color);
            }
        }
    }

    /// Draw a line from (x0, y0) to (x1, y1), endpoints included, with
    /// Bresenham's integer error term
    pub fn draw_line_bresenham(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let (x0, y0, x1, y1, steep) = major_axis_order(x0, y0, x1, y1);
        let Some((start, end)) = self.major_span(x0, x1, steep) else {
            return;
        };

        let dx = x1 - x0;
        let dy = (y1 - y0).abs();
        let step = if y1 > y0 { 1 } else { -1 };
        let mut err = 0;
        let mut y = y0;

        // Jump the error term over the clipped head in one go
        let skipped = start - x0;
        if skipped > 0 {
            let (dx2, rise) = (2 * dx as i128, 2 * dy as i128 * skipped as i128);
            let climbs = (-(-(rise - dx as i128)).div_euclid(dx2)).max(0);
            y += step * climbs as i64;
            err = (rise - dx2 * climbs) as i64;
        }

        for x in start..=end {
            if steep {
                self.plot(y, x, color);
            } else {
                self.plot(x, y, color);
            }
            err += dy * 2;
            if err > dx {
                y += step;
                err -= dx * 2;
            }
        }
    }

    pub fn line(&mut self, algorithm: LineAlgorithm, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        match algorithm {
            LineAlgorithm::Parametric => self.draw_line(x0, y0, x1, y1, color),
            LineAlgorithm::Bresenham => self.draw_line_bresenham(x0, y0, x1, y1, color),
        }
    }

    pub fn flip_vertically(&mut self) {
        let w = self.width;
        for y in 0..self.height / 2 {
            let mirror = self.height - 1 - y;
            for x in 0..w {
                self.pixels.swap(y * w + x, mirror * w + x);
                self.zbuffer.swap(y * w + x, mirror * w + x);
            }
        }
    }

    pub fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Rgb(self.get_pixel(x as usize, y as usize).to_rgb())
        })
    }

    /// Write the color buffer; the format follows the file extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.to_rgb_image().save(path)
    }
}

/// Transpose steep lines and order endpoints so x runs upward.
/// Returns (x0, y0, x1, y1, transposed), widened so deltas cannot overflow.
fn major_axis_order(x0: i32, y0: i32, x1: i32, y1: i32) -> (i64, i64, i64, i64, bool) {
    let (mut x0, mut y0, mut x1, mut y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
    let steep = (x1 - x0).abs() < (y1 - y0).abs();
    if steep {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
    }
    if x0 > x1 {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
    }
    (x0, y0, x1, y1, steep)
}

/// Rasterize one triangle whose corners already went through
/// `shader.vertex`.
///
/// Every pixel of the clamped bounding box with non-negative barycentric
/// weights and an interpolated depth strictly above the stored one is
/// shaded; discarded fragments are painted black. Depth is written either
/// way. Returns the number of pixels that passed the depth test.
pub fn rasterize_triangle<S: Shader + ?Sized>(
    fb: &mut Framebuffer,
    verts: &[Vec3; 3],
    shader: &S,
) -> Result<usize, RasterError> {
    let state = shader.context().state();
    if state != ContextState::Ready {
        return Err(RasterError::IncompleteTriangle { state });
    }
    if fb.width == 0 || fb.height == 0 {
        return Ok(0);
    }

    // Bounding box, clamped to the buffer
    let limit_x = (fb.width - 1) as f32;
    let limit_y = (fb.height - 1) as f32;
    let (mut min_x, mut min_y) = (limit_x, limit_y);
    let (mut max_x, mut max_y) = (0.0f32, 0.0f32);
    for v in verts {
        min_x = v.x.min(min_x).max(0.0);
        min_y = v.y.min(min_y).max(0.0);
        max_x = v.x.max(max_x).min(limit_x);
        max_y = v.y.max(max_y).min(limit_y);
    }

    let mut written = 0;
    for x in min_x as usize..=max_x as usize {
        for y in min_y as usize..=max_y as usize {
            let p = Vec3::new(x as f32, y as f32, 0.0);
            let bc = barycentric(verts[0], verts[1], verts[2], p);
            if bc.x < 0.0 || bc.y < 0.0 || bc.z < 0.0 {
                continue;
            }

            let z = verts[0].z * bc.x + verts[1].z * bc.y + verts[2].z * bc.z;
            let idx = y * fb.width + x;
            if !(z > fb.zbuffer[idx]) {
                continue;
            }
            fb.zbuffer[idx] = z;

            let color = match shader.fragment(bc) {
                Fragment::Color(c) => c,
                Fragment::Discard => Color::BLACK,
            };
            fb.pixels[idx] = color;
            written += 1;
        }
    }

    Ok(written)
}

/// Counters from one mesh pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub faces: usize,
    /// Faces that won at least one pixel
    pub faces_drawn: usize,
    pub pixels: usize,
}

/// Run every face of `mesh` through `shader` into `fb`
pub fn render_mesh<M, S>(fb: &mut Framebuffer, mesh: &M, shader: &mut S) -> Result<RenderStats, RasterError>
where
    M: MeshSource + ?Sized,
    S: Shader + ?Sized,
{
    render_mesh_with(fb, mesh, shader, |_| {})
}

/// Like [`render_mesh`], calling `on_face` with each face index once it is done
pub fn render_mesh_with<M, S, F>(
    fb: &mut Framebuffer,
    mesh: &M,
    shader: &mut S,
    mut on_face: F,
) -> Result<RenderStats, RasterError>
where
    M: MeshSource + ?Sized,
    S: Shader + ?Sized,
    F: FnMut(usize),
{
    let mut stats = RenderStats::default();

    for face in 0..mesh.face_count() {
        let mut screen = [Vec3::ZERO; 3];
        for (corner, slot) in screen.iter_mut().enumerate() {
            *slot = shader.vertex(mesh.vertex(face, corner), corner);
        }

        let written = rasterize_triangle(fb, &screen, &*shader)?;
        stats.faces += 1;
        if written > 0 {
            stats.faces_drawn += 1;
        }
        stats.pixels += written;
        on_face(face);
    }

    Ok(stats)
}

/// Draw the projected edges of every face, ignoring depth
pub fn draw_wireframe<M: MeshSource + ?Sized>(
    fb: &mut Framebuffer,
    mesh: &M,
    transforms: &Transforms,
    algorithm: LineAlgorithm,
    color: Color,
) {
    for face in 0..mesh.face_count() {
        let corners: [Vec3; 3] =
            std::array::from_fn(|corner| transforms.project(mesh.vertex(face, corner).pos));
        for i in 0..3 {
            let a = corners[i];
            let b = corners[(i + 1) % 3];
            // Points on the camera plane project to infinity
            if ![a.x, a.y, b.x, b.y].iter().all(|c| c.is_finite()) {
                continue;
            }
            fb.line(algorithm, a.x as i32, a.y as i32, b.x as i32, b.y as i32, color);
        }
    }
}
