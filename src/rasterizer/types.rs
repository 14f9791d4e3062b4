//! Core types for the rasterizer

use serde::{Serialize, Deserialize};
use super::math::{Vec2, Vec3};

/// Color with 0-255 channels.
///
/// Fields are laid out in TGA byte order (B, G, R, A); [`Color::channel`]
/// indexes in that same order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    /// Base color of the toon shader
    pub const PINK: Color = Color { r: 255, g: 105, b: 180, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channel by index: 0 = blue, 1 = green, 2 = red, 3 = alpha
    pub fn channel(self, i: usize) -> u8 {
        match i {
            0 => self.b,
            1 => self.g,
            2 => self.r,
            3 => self.a,
            _ => panic!("color channel out of range: {}", i),
        }
    }

    pub fn set_channel(&mut self, i: usize, value: u8) {
        match i {
            0 => self.b = value,
            1 => self.g = value,
            2 => self.r = value,
            3 => self.a = value,
            _ => panic!("color channel out of range: {}", i),
        }
    }

    /// Multiply the color channels by `intensity`, saturating at 0 and 255.
    /// Alpha is left alone.
    pub fn shade(self, intensity: f32) -> Self {
        Self {
            r: clamp_channel(self.r as f32 * intensity),
            g: clamp_channel(self.g as f32 * intensity),
            b: clamp_channel(self.b as f32 * intensity),
            a: self.a,
        }
    }

    pub fn to_rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Convert a shaded channel value to a byte, clamped to [0, 255]
pub fn clamp_channel(value: f32) -> u8 {
    // NaN falls through `clamp` and casts to 0
    value.clamp(0.0, 255.0) as u8
}

/// A vertex as handed out by a mesh: position, texel-space uv and normal
#[derive(Debug, Clone, Copy, Default)]
pub struct Vertex {
    pub pos: Vec3,
    pub uv: Vec2,
    pub normal: Vec3,
}

impl Vertex {
    pub fn new(pos: Vec3, uv: Vec2, normal: Vec3) -> Self {
        Self { pos, uv, normal }
    }

    pub fn from_pos(x: f32, y: f32, z: f32) -> Self {
        Self {
            pos: Vec3::new(x, y, z),
            uv: Vec2::default(),
            normal: Vec3::ZERO,
        }
    }
}

/// Triangle geometry the pipeline can draw
pub trait MeshSource {
    fn face_count(&self) -> usize;

    /// Vertex `corner` (0..3) of face `face`
    fn vertex(&self, face: usize, corner: usize) -> Vertex;
}

/// Plain vertex/triangle lists, mostly for tests and generated geometry
#[derive(Debug, Clone, Default)]
pub struct TriangleList {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<[usize; 3]>,
}

impl MeshSource for TriangleList {
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertex(&self, face: usize, corner: usize) -> Vertex {
        self.vertices[self.faces[face][corner]]
    }
}

/// Image grid used for diffuse, specular and normal maps
#[derive(Debug, Clone, Default)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Texture {
    /// A texture with no pixels; every lookup returns `Color::default()`
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn solid(width: usize, height: usize, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
            name: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Load texture from any format the `image` crate decodes (TGA, PNG, ...)
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, image::ImageError> {
        let path = path.as_ref();
        let img = image::open(path)?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self::from_image(img, name))
    }

    /// Load texture from raw encoded bytes
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_image(img, name))
    }

    fn from_image(img: image::DynamicImage, name: String) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        }
    }

    /// Get pixel at x,y; anything out of range reads as zero
    pub fn get(&self, x: i32, y: i32) -> Color {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Color::default();
        }
        self.pixels[y as usize * self.width + x as usize]
    }

    /// Sample at texel coordinates (truncated, no filtering)
    pub fn sample(&self, uv: Vec2) -> Color {
        self.get(uv.x as i32, uv.y as i32)
    }

    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    pub fn flip_vertically(&mut self) {
        let w = self.width;
        for y in 0..self.height / 2 {
            let mirror = self.height - 1 - y;
            for x in 0..w {
                self.pixels.swap(y * w + x, mirror * w + x);
            }
        }
    }
}

/// Lighting model used for a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadingMode {
    Flat,       // One normal per face
    Gouraud,    // Per-vertex intensity, interpolated
    Toon,       // Gouraud intensity quantized into bands
    Phong,      // Normal-mapped, mirror-reflection specular
    BlinnPhong, // Normal-mapped, half-vector specular
}

/// Line algorithm used for wireframe overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineAlgorithm {
    /// Float parameter per column
    Parametric,
    /// Integer error accumulation
    Bresenham,
}
